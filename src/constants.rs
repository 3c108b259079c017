//! Centralised art, physics and input constants.
//!
//! All tuneable values live here so they can be found and adjusted in one
//! place.  [`crate::config::ArtConfig`] mirrors the runtime-tunable subset and
//! uses these values as its defaults.

// ── Silhouette ────────────────────────────────────────────────────────────────

/// SVG path data of the silhouette drawn for every shape instance.
///
/// Coordinates are in the path's own space: origin top-left, y down.
pub const SILHOUETTE_PATH: &str = "m20.6 43.5-10.3 6.2L.1 43.6l-.1-25L31.3 0v12.5l10.3 6.2.2 25-10.4 6-10-6.1 10-6.1-.2-12.5-10.6 6.3-10-6.3v12.4z";

/// Bounding width of [`SILHOUETTE_PATH`].
pub const SILHOUETTE_WIDTH: f32 = 41.8;

/// Bounding height of [`SILHOUETTE_PATH`].
pub const SILHOUETTE_HEIGHT: f32 = 49.7;

/// Maximum distance between a flattened curve and its polyline approximation.
pub const FLATTEN_TOLERANCE: f32 = 0.25;

// ── Placement ─────────────────────────────────────────────────────────────────

/// Shapes requested per square logical pixel of viewport.
///
/// 800×600 requests 120 shapes.
pub const SHAPE_DENSITY: f32 = 0.00025;

/// Smallest per-instance scale factor applied to the silhouette.
pub const MIN_SHAPE_SCALE: f32 = 0.25;

/// Largest per-instance scale factor applied to the silhouette.
pub const MAX_SHAPE_SCALE: f32 = 2.0;

/// Random positions tried per shape before it is dropped.
///
/// Higher values pack the viewport more densely at the cost of startup time.
pub const MAX_PLACEMENT_ATTEMPTS: u32 = 10;

/// Largest initial rotation magnitude (radians) of a placed shape.
pub const MAX_INITIAL_ANGLE: f32 = 1.0;

// ── Walls ─────────────────────────────────────────────────────────────────────

/// How far each wall reaches into the viewport (logical pixels).
pub const WALL_PADDING: f32 = 10.0;

// ── Physics ───────────────────────────────────────────────────────────────────

/// Fixed physics step rate (steps per second).
pub const PHYSICS_HZ: f32 = 60.0;

/// Constraint solver iterations per step.  One is enough for a resting pile.
pub const SOLVER_ITERATIONS: usize = 1;

/// Shape bounciness.  0.0 = shapes never bounce.
pub const SHAPE_RESTITUTION: f32 = 0.0;

/// Shape-to-shape and shape-to-wall friction coefficient.
pub const SHAPE_FRICTION: f32 = 0.1;

/// Converts a gravity scale (pixels per squared millisecond) into pixels per
/// squared second for Rapier.
pub const GRAVITY_SCALE_TO_PIXELS: f32 = 1.0e6;

// ── Gravity ───────────────────────────────────────────────────────────────────

/// Gravity scale used when no tilt data is available.
pub const DEFAULT_GRAVITY_SCALE: f32 = 0.001;

/// Gravity scale used while the device tilt drives gravity.
pub const TILT_GRAVITY_SCALE: f32 = 0.0025;

/// Tilt angles are clamped to ±this many degrees before normalisation.
pub const MAX_TILT_DEGREES: f32 = 90.0;

/// Emulated tilt (degrees) applied per held arrow key on desktop.
pub const KEYBOARD_TILT_DEGREES: f32 = 45.0;

// ── Pointer ───────────────────────────────────────────────────────────────────

/// Fraction of the anchor-to-pointer gap closed per physics step while dragging.
pub const DRAG_STIFFNESS: f32 = 0.2;

/// Squared lever arm (px²) below which a grab produces no spin.
pub const MIN_DRAG_LEVER_SQ: f32 = 1.0;

// ── Palette ───────────────────────────────────────────────────────────────────

/// Palette draws attempted before giving up on the background/colour invariant.
pub const PALETTE_MAX_ATTEMPTS: u32 = 32;

// ── Rendering ─────────────────────────────────────────────────────────────────

/// Depth gap between consecutive shapes; later shapes draw on top.
pub const SHAPE_DEPTH_STEP: f32 = 0.001;

/// Default window size (logical pixels).
pub const WINDOW_WIDTH: u32 = 1200;
pub const WINDOW_HEIGHT: u32 = 680;
