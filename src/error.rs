//! Error types for outline parsing, palette selection and sensor access.
//!
//! Startup code propagates these through [`ArtResult`]; runtime systems log
//! them and degrade (keep the previous palette, disable the tilt sensor)
//! instead of panicking.

use std::fmt;

/// Top-level error enum for the art piece.
#[derive(Debug, Clone, PartialEq)]
pub enum ArtError {
    /// SVG path data could not be parsed.
    PathSyntax(String),

    /// Path data parsed, but contained no drawable segment.
    EmptyOutline,

    /// A flattened sub-path has too few distinct vertices to form a polygon.
    DegenerateRing {
        /// Vertex count after flattening and closing-vertex removal.
        vertices: usize,
    },

    /// lyon failed to tessellate the silhouette fill.
    Tessellation(String),

    /// A palette has no foreground colours.
    EmptyPalette {
        /// Name of the offending palette.
        name: String,
    },

    /// A colour string is not a valid hex colour.
    InvalidColor {
        /// The rejected colour string.
        value: String,
    },

    /// No palette satisfying the background/colour invariant was drawn within
    /// the retry budget.
    PaletteExhausted {
        /// Number of draws attempted.
        attempts: u32,
    },

    /// A configuration or palette file failed to parse.
    ConfigParse(String),

    /// The platform's motion-sensor permission request failed.
    SensorRequest(String),
}

impl fmt::Display for ArtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtError::PathSyntax(msg) => write!(f, "path data error: {}", msg),
            ArtError::EmptyOutline => write!(f, "path data contains no drawable segment"),
            ArtError::DegenerateRing { vertices } => write!(
                f,
                "outline ring has {} distinct vertices (need at least 3)",
                vertices
            ),
            ArtError::Tessellation(msg) => write!(f, "silhouette tessellation failed: {}", msg),
            ArtError::EmptyPalette { name } => {
                write!(f, "palette '{}' has no foreground colours", name)
            }
            ArtError::InvalidColor { value } => write!(f, "'{}' is not a hex colour", value),
            ArtError::PaletteExhausted { attempts } => write!(
                f,
                "no palette with a distinct background found after {} draws",
                attempts
            ),
            ArtError::ConfigParse(msg) => write!(f, "configuration parse error: {}", msg),
            ArtError::SensorRequest(msg) => {
                write!(f, "motion sensor permission request failed: {}", msg)
            }
        }
    }
}

impl std::error::Error for ArtError {}

/// Convenience alias: a `Result` using `ArtError` as the error type.
pub type ArtResult<T> = Result<T, ArtError>;
