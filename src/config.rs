//! Runtime art configuration loaded from `assets/art.toml`.
//!
//! [`ArtConfig`] is a Bevy [`Resource`] that mirrors the tunable subset of
//! [`crate::constants`].  `main` reads `assets/art.toml` before the app is
//! built (window size and resolution mode are needed up front) and inserts
//! the result.  Missing keys fall back to the compile-time defaults, so a
//! minimal TOML can override just the values you care about:
//!
//! ```toml
//! density = 0.0004
//! max_scale = 1.5
//! seed = 42
//! ```
//!
//! Keep `src/constants.rs` in sync: it remains the **authoritative default**
//! source used by `ArtConfig::default()`.

use crate::constants::*;
use crate::error::{ArtError, ArtResult};
use bevy::prelude::*;
use serde::Deserialize;
use std::path::Path;

/// Default location of the configuration file, relative to the working directory.
pub const CONFIG_PATH: &str = "assets/art.toml";

/// Runtime-tunable art and physics configuration.
#[derive(Resource, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ArtConfig {
    // ── Window ───────────────────────────────────────────────────────────────
    pub window_width: u32,
    pub window_height: u32,
    /// Render at the display's native pixel ratio.  When false the window is
    /// forced to a scale factor of 1.
    pub hidpi: bool,

    // ── Placement ────────────────────────────────────────────────────────────
    pub density: f32,
    pub min_scale: f32,
    pub max_scale: f32,
    pub max_placement_attempts: u32,

    // ── Walls ────────────────────────────────────────────────────────────────
    pub wall_padding: f32,

    // ── Physics ──────────────────────────────────────────────────────────────
    pub physics_hz: f32,
    pub solver_iterations: usize,
    pub restitution: f32,
    pub friction: f32,

    // ── Input ────────────────────────────────────────────────────────────────
    pub drag_stiffness: f32,
    /// Emulate device tilt with the arrow keys.
    pub tilt_keys: bool,

    // ── Palette ──────────────────────────────────────────────────────────────
    pub palette_max_attempts: u32,

    /// Seed for the composition RNG.  `None` draws a fresh seed per run.
    pub seed: Option<u64>,
}

impl Default for ArtConfig {
    fn default() -> Self {
        Self {
            window_width: WINDOW_WIDTH,
            window_height: WINDOW_HEIGHT,
            hidpi: true,
            density: SHAPE_DENSITY,
            min_scale: MIN_SHAPE_SCALE,
            max_scale: MAX_SHAPE_SCALE,
            max_placement_attempts: MAX_PLACEMENT_ATTEMPTS,
            wall_padding: WALL_PADDING,
            physics_hz: PHYSICS_HZ,
            solver_iterations: SOLVER_ITERATIONS,
            restitution: SHAPE_RESTITUTION,
            friction: SHAPE_FRICTION,
            drag_stiffness: DRAG_STIFFNESS,
            tilt_keys: true,
            palette_max_attempts: PALETTE_MAX_ATTEMPTS,
            seed: None,
        }
    }
}

impl ArtConfig {
    /// Parse a configuration from TOML text.  Unknown keys are ignored.
    pub fn from_toml_str(contents: &str) -> ArtResult<Self> {
        let parsed: Self =
            toml::from_str(contents).map_err(|e| ArtError::ConfigParse(e.to_string()))?;
        Ok(parsed.sanitized())
    }

    /// Replace out-of-range values with their defaults, reporting each one.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.density > 0.0) {
            eprintln!("⚠ density must be positive; using {}", defaults.density);
            self.density = defaults.density;
        }
        if !(self.min_scale > 0.0) || !(self.max_scale >= self.min_scale) {
            eprintln!(
                "⚠ scale range [{}, {}] is invalid; using [{}, {}]",
                self.min_scale, self.max_scale, defaults.min_scale, defaults.max_scale
            );
            self.min_scale = defaults.min_scale;
            self.max_scale = defaults.max_scale;
        }
        if self.max_placement_attempts == 0 {
            eprintln!(
                "⚠ max_placement_attempts must be at least 1; using {}",
                defaults.max_placement_attempts
            );
            self.max_placement_attempts = defaults.max_placement_attempts;
        }
        if !(self.physics_hz > 0.0) {
            eprintln!("⚠ physics_hz must be positive; using {}", defaults.physics_hz);
            self.physics_hz = defaults.physics_hz;
        }
        if self.solver_iterations == 0 {
            self.solver_iterations = defaults.solver_iterations;
        }
        if self.palette_max_attempts == 0 {
            self.palette_max_attempts = defaults.palette_max_attempts;
        }
        self.drag_stiffness = self.drag_stiffness.clamp(0.0, 1.0);
        self
    }

    /// Fixed physics time step in seconds.
    pub fn physics_dt(&self) -> f32 {
        1.0 / self.physics_hz
    }
}

/// Load `path` into an [`ArtConfig`].
///
/// A missing file is silently replaced by the compiled defaults; a parse
/// error is printed to stderr and also falls back to defaults.  Runs before
/// the Bevy log plugin exists, so it reports through stdout/stderr.
pub fn load_art_config(path: impl AsRef<Path>) -> ArtConfig {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(contents) => match ArtConfig::from_toml_str(&contents) {
            Ok(loaded) => {
                println!("✓ Loaded art config from {}", path.display());
                loaded
            }
            Err(e) => {
                eprintln!("⚠ Failed to parse {}: {e}; using defaults", path.display());
                ArtConfig::default()
            }
        },
        Err(_) => {
            println!("ℹ No {} found; using compiled defaults", path.display());
            ArtConfig::default()
        }
    }
}
