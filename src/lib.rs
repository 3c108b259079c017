//! Tumble: a generative physics art piece.
//!
//! Scaled copies of one fixed silhouette are scattered over the window
//! without overlapping, fall and settle under Rapier physics, can be dragged
//! with the pointer and are redrawn every tick in a random colour palette.
//! Tilting the device (or holding the arrow keys) steers gravity.

pub mod config;
pub mod constants;
pub mod error;
pub mod gravity;
pub mod lifecycle;
pub mod outline;
pub mod palette;
pub mod placement;
pub mod pointer;
pub mod rendering;
pub mod shape;
pub mod viewport;
