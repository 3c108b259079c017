//! Colour palettes: a curated corpus and the bounded re-roll that picks one.
//!
//! A palette is a background colour plus a non-empty list of fill colours.
//! The active palette must never use its background as a fill, otherwise
//! shapes would vanish into the canvas.  Some corpus entries list their
//! background among their colours, so selection re-rolls until the invariant
//! holds, up to a fixed number of draws.
//!
//! The built-in corpus can be replaced by `assets/palettes.toml`:
//!
//! ```toml
//! [[palette]]
//! name = "dusk"
//! background = "#1b1b2f"
//! colors = ["#e43f5a", "#f9d56e", "#3ec1d3"]
//! ```

use crate::error::{ArtError, ArtResult};
use bevy::prelude::*;
use rand::Rng;
use serde::Deserialize;
use std::path::Path;

/// Default location of the optional palette file.
pub const PALETTES_PATH: &str = "assets/palettes.toml";

/// A named palette as authored: hex colour strings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Palette {
    pub name: String,
    pub background: String,
    pub colors: Vec<String>,
}

impl Palette {
    pub fn new(name: &str, background: &str, colors: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            background: background.to_string(),
            colors: colors.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Check every colour parses and there is at least one fill colour.
    pub fn validate(&self) -> ArtResult<()> {
        if self.colors.is_empty() {
            return Err(ArtError::EmptyPalette {
                name: self.name.clone(),
            });
        }
        parse_hex(&self.background)?;
        for c in &self.colors {
            parse_hex(c)?;
        }
        Ok(())
    }

    /// True when the background does not appear among the fill colours.
    /// Colours are compared by value, so `#FFF` equals `#ffffff`.
    pub fn has_distinct_background(&self) -> bool {
        let Ok(background) = parse_hex(&self.background) else {
            return false;
        };
        let bg = background.to_u8_array();
        !self
            .colors
            .iter()
            .filter_map(|c| parse_hex(c).ok())
            .any(|c| c.to_u8_array() == bg)
    }

    /// Usable as the active palette.
    pub fn is_usable(&self) -> bool {
        self.validate().is_ok() && self.has_distinct_background()
    }
}

/// Parse a `#rgb` / `#rrggbb` / `#rrggbbaa` string.
pub fn parse_hex(value: &str) -> ArtResult<Srgba> {
    Srgba::hex(value.trim()).map_err(|_| ArtError::InvalidColor {
        value: value.to_string(),
    })
}

// ── Sources ───────────────────────────────────────────────────────────────────

/// Anything that can hand out a random palette on demand.
pub trait PaletteSource {
    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Palette;
}

/// Draw palettes from `source` until one has a distinct background.
///
/// Gives up after `max_attempts` draws with [`ArtError::PaletteExhausted`].
pub fn choose_palette<S, R>(source: &S, rng: &mut R, max_attempts: u32) -> ArtResult<Palette>
where
    S: PaletteSource,
    R: Rng + ?Sized,
{
    for _ in 0..max_attempts {
        let candidate = source.draw(rng);
        if candidate.is_usable() {
            return Ok(candidate);
        }
    }
    Err(ArtError::PaletteExhausted {
        attempts: max_attempts,
    })
}

#[derive(Deserialize)]
struct PaletteFile {
    #[serde(default)]
    palette: Vec<Palette>,
}

/// The curated palette corpus.  Never empty.
#[derive(Resource, Debug, Clone)]
pub struct PaletteCorpus {
    palettes: Vec<Palette>,
}

impl Default for PaletteCorpus {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PaletteCorpus {
    /// Build a corpus, rejecting an empty list or any invalid palette.
    pub fn new(palettes: Vec<Palette>) -> ArtResult<Self> {
        if palettes.is_empty() {
            return Err(ArtError::ConfigParse("palette list is empty".into()));
        }
        for p in &palettes {
            p.validate()?;
        }
        Ok(Self { palettes })
    }

    pub fn from_toml_str(contents: &str) -> ArtResult<Self> {
        let file: PaletteFile =
            toml::from_str(contents).map_err(|e| ArtError::ConfigParse(e.to_string()))?;
        Self::new(file.palette)
    }

    /// Load `path`, falling back to the built-in corpus when the file is
    /// missing or invalid.
    pub fn load_or_builtin(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let Ok(contents) = std::fs::read_to_string(path) else {
            return Self::builtin();
        };
        match Self::from_toml_str(&contents) {
            Ok(corpus) => {
                println!(
                    "✓ Loaded {} palettes from {}",
                    corpus.len(),
                    path.display()
                );
                corpus
            }
            Err(e) => {
                eprintln!("⚠ Ignoring {}: {e}; using built-in palettes", path.display());
                Self::builtin()
            }
        }
    }

    pub fn palettes(&self) -> &[Palette] {
        &self.palettes
    }

    pub fn len(&self) -> usize {
        self.palettes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.palettes.is_empty()
    }

    /// The built-in corpus.
    pub fn builtin() -> Self {
        Self {
            palettes: vec![
                Palette::new(
                    "frozen-rose",
                    "#f2e8e4",
                    &["#29368f", "#e9697b", "#1b164d", "#f7d996"],
                ),
                Palette::new(
                    "winter-night",
                    "#ebebeb",
                    &["#122438", "#dd672e", "#87c7ca", "#ebebeb"],
                ),
                Palette::new(
                    "saami",
                    "#e7e6e4",
                    &["#eab700", "#e64818", "#2c6393", "#eecfca"],
                ),
                Palette::new(
                    "knotberry",
                    "#e5ded8",
                    &["#20342a", "#f74713", "#686d2c", "#e9b4a6"],
                ),
                Palette::new(
                    "tricolor",
                    "#f7f2df",
                    &["#ec643b", "#56b7ab", "#f8cb57", "#1f1e43"],
                ),
                Palette::new(
                    "foxshelter",
                    "#dddddd",
                    &["#ff3931", "#007861", "#311f27", "#bab9a4"],
                ),
                Palette::new(
                    "cc239",
                    "#e0eff0",
                    &["#e3dd34", "#78496b", "#f0527f", "#a7e0e2"],
                ),
                Palette::new(
                    "jung-bird",
                    "#ffffff",
                    &["#fc3032", "#fed530", "#33c3fb", "#ff7bac", "#fda929"],
                ),
                Palette::new(
                    "system-05",
                    "#1c1c1c",
                    &["#db4f54", "#1c1c1c", "#f9d3c3", "#33a4d2"],
                ),
                Palette::new(
                    "rohlfs",
                    "#fff8e7",
                    &["#004996", "#567bae", "#ff4c48", "#ffbcb3"],
                ),
                Palette::new(
                    "kov-06",
                    "#dbd4c2",
                    &["#a87c2a", "#bdc9b1", "#f14616", "#ecbfaf", "#017724", "#0e2733"],
                ),
                Palette::new(
                    "miradors",
                    "#020202",
                    &["#ff6936", "#fddc3f", "#0075ca", "#00bb70"],
                ),
                Palette::new("spatial", "#f6f6f4", &["#ff5937", "#f6f6f4", "#4169ff"]),
                Palette::new(
                    "tundra",
                    "#f3f2f2",
                    &["#87c3ca", "#7b7377", "#b2475d", "#7d3e3e", "#eb7f64", "#d9c67a"],
                ),
            ],
        }
    }
}

impl PaletteSource for PaletteCorpus {
    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Palette {
        self.palettes[rng.gen_range(0..self.palettes.len())].clone()
    }
}

// ── Active palette ────────────────────────────────────────────────────────────

/// The palette currently in use, with its colours parsed once.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct ActivePalette {
    pub name: String,
    pub background: Color,
    pub colors: Vec<Color>,
}

impl Default for ActivePalette {
    fn default() -> Self {
        Self {
            name: "unset".into(),
            background: Color::BLACK,
            colors: vec![Color::WHITE],
        }
    }
}

impl ActivePalette {
    pub fn from_palette(palette: &Palette) -> ArtResult<Self> {
        palette.validate()?;
        Ok(Self {
            name: palette.name.clone(),
            background: Color::from(parse_hex(&palette.background)?),
            colors: palette
                .colors
                .iter()
                .map(|c| parse_hex(c).map(Color::from))
                .collect::<ArtResult<Vec<_>>>()?,
        })
    }

    /// A fill colour chosen uniformly from the palette.
    pub fn pick_fill<R: Rng + ?Sized>(&self, rng: &mut R) -> Color {
        match self.colors.len() {
            0 => Color::WHITE,
            n => self.colors[rng.gen_range(0..n)],
        }
    }
}
