//! Canvas ⇄ world coordinate conversion.
//!
//! Placement, walls and the draw transform are expressed in **canvas**
//! coordinates: origin at the top-left corner of the window, y pointing down,
//! logical pixels.  Bevy and Rapier use **world** coordinates: origin at the
//! window centre, y pointing up.  A canvas rotation by `a` is a world rotation
//! by `-a`.

use bevy::math::Affine2;
use bevy::prelude::*;

/// Current window size in logical pixels.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: crate::constants::WINDOW_WIDTH as f32,
            height: crate::constants::WINDOW_HEIGHT as f32,
        }
    }
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Canvas point → world point.
    pub fn to_world(&self, canvas: Vec2) -> Vec2 {
        Vec2::new(canvas.x - self.width / 2.0, self.height / 2.0 - canvas.y)
    }

    /// World point → canvas point.
    pub fn to_canvas(&self, world: Vec2) -> Vec2 {
        Vec2::new(world.x + self.width / 2.0, self.height / 2.0 - world.y)
    }

    /// The affine map equivalent to [`Viewport::to_world`] (a reflection plus
    /// a translation).
    pub fn canvas_to_world(&self) -> Affine2 {
        Affine2::from_cols(
            Vec2::X,
            Vec2::NEG_Y,
            Vec2::new(-self.width / 2.0, self.height / 2.0),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_map_to_world_extremes() {
        let vp = Viewport::new(800.0, 600.0);
        assert_eq!(vp.to_world(Vec2::ZERO), Vec2::new(-400.0, 300.0));
        assert_eq!(vp.to_world(Vec2::new(800.0, 600.0)), Vec2::new(400.0, -300.0));
        assert_eq!(vp.to_world(Vec2::new(400.0, 300.0)), Vec2::ZERO);
    }

    #[test]
    fn to_canvas_inverts_to_world() {
        let vp = Viewport::new(1024.0, 768.0);
        let p = Vec2::new(123.5, 700.25);
        assert!(vp.to_canvas(vp.to_world(p)).abs_diff_eq(p, 1e-4));
    }

    #[test]
    fn affine_matches_point_conversion() {
        let vp = Viewport::new(640.0, 480.0);
        let p = Vec2::new(10.0, 470.0);
        assert!(vp
            .canvas_to_world()
            .transform_point2(p)
            .abs_diff_eq(vp.to_world(p), 1e-4));
    }
}
