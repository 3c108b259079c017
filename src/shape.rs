//! Shape and wall bodies.
//!
//! Every placed instance is a dynamic Rapier body whose collider is the
//! silhouette outline scaled by the instance's factor and split into convex
//! parts.  Four fixed cuboids around the viewport keep the pile on screen.

use crate::config::ArtConfig;
use crate::outline::Silhouette;
use crate::palette::ActivePalette;
use crate::placement::Placement;
use crate::viewport::Viewport;
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;
use rand::Rng;

/// One scattered copy of the silhouette.  Lives on the physics body entity.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct ShapeInstance {
    pub scale: f32,
    pub fill: Color,
    /// Acceptance index.  Draw order and pick priority follow it.
    pub order: u32,
}

/// Marker for the four boundary bodies.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wall;

/// A wall as a canvas-space rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallRect {
    pub center: Vec2,
    pub size: Vec2,
}

/// Left, right, top and bottom walls for `viewport`.
///
/// Each wall is as large as the viewport and overlaps it by `padding`, so a
/// fast shape cannot tunnel through a thin edge.
pub fn wall_rects(viewport: &Viewport, padding: f32) -> [WallRect; 4] {
    let (w, h) = (viewport.width, viewport.height);
    let size = Vec2::new(w, h);
    [
        WallRect {
            center: Vec2::new(-w / 2.0 + padding, h / 2.0),
            size,
        },
        WallRect {
            center: Vec2::new(1.5 * w - padding, h / 2.0),
            size,
        },
        WallRect {
            center: Vec2::new(w / 2.0, -h / 2.0 + padding),
            size,
        },
        WallRect {
            center: Vec2::new(w / 2.0, 1.5 * h - padding),
            size,
        },
    ]
}

/// Spawn the four fixed walls.
pub fn spawn_walls(commands: &mut Commands, viewport: &Viewport, config: &ArtConfig) {
    for rect in wall_rects(viewport, config.wall_padding) {
        commands.spawn((
            Wall,
            Transform::from_translation(viewport.to_world(rect.center).extend(0.0)),
            RigidBody::Fixed,
            Collider::cuboid(rect.size.x / 2.0, rect.size.y / 2.0),
            Friction::coefficient(config.friction),
        ));
    }
}

/// Register one dynamic body per placement.  Returns the spawned entities in
/// placement order.
pub fn spawn_shape_instances<R: Rng + ?Sized>(
    commands: &mut Commands,
    placements: &[Placement],
    silhouette: &Silhouette,
    palette: &ActivePalette,
    viewport: &Viewport,
    config: &ArtConfig,
    rng: &mut R,
) -> Vec<Entity> {
    placements
        .iter()
        .enumerate()
        .map(|(order, placement)| {
            let world = viewport.to_world(placement.center);
            commands
                .spawn((
                    (
                        ShapeInstance {
                            scale: placement.scale,
                            fill: palette.pick_fill(&mut *rng),
                            order: order as u32,
                        },
                        Transform::from_translation(world.extend(0.0))
                            .with_rotation(Quat::from_rotation_z(-placement.angle)),
                    ),
                    (
                        RigidBody::Dynamic,
                        silhouette.collider(placement.scale),
                        Restitution::coefficient(config.restitution),
                        Friction::coefficient(config.friction),
                        Velocity::zero(),
                        Sleeping::default(),
                    ),
                ))
                .id()
        })
        .collect()
}

/// World pose of a body as (position, rotation angle).
pub fn body_pose(transform: &Transform) -> (Vec2, f32) {
    (
        transform.translation.truncate(),
        transform.rotation.to_euler(EulerRot::ZYX).0,
    )
}

/// Convert a world point into the body-local frame of `transform`.
pub fn world_to_local(transform: &Transform, world: Vec2) -> Vec2 {
    let (position, angle) = body_pose(transform);
    Vec2::from_angle(-angle).rotate(world - position)
}

/// Of the instances under the pointer, the one drawn on top.
pub fn topmost<I>(hits: I) -> Option<Entity>
where
    I: IntoIterator<Item = (Entity, u32)>,
{
    hits.into_iter()
        .max_by_key(|(_, order)| *order)
        .map(|(entity, _)| entity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walls_seal_the_viewport() {
        let vp = Viewport::new(800.0, 600.0);
        let [left, right, top, bottom] = wall_rects(&vp, 10.0);
        assert_eq!(left.center, Vec2::new(-390.0, 300.0));
        assert_eq!(right.center, Vec2::new(1190.0, 300.0));
        assert_eq!(top.center, Vec2::new(400.0, -290.0));
        assert_eq!(bottom.center, Vec2::new(400.0, 890.0));

        // Inner faces sit `padding` inside each edge.
        assert_eq!(left.center.x + left.size.x / 2.0, 10.0);
        assert_eq!(right.center.x - right.size.x / 2.0, 790.0);
        assert_eq!(top.center.y + top.size.y / 2.0, 10.0);
        assert_eq!(bottom.center.y - bottom.size.y / 2.0, 590.0);
    }

    #[test]
    fn world_to_local_undoes_rotation() {
        let t = Transform::from_xyz(100.0, 50.0, 0.0)
            .with_rotation(Quat::from_rotation_z(std::f32::consts::FRAC_PI_2));
        let local = world_to_local(&t, Vec2::new(100.0, 60.0));
        assert!(local.abs_diff_eq(Vec2::new(10.0, 0.0), 1e-4), "{local:?}");
    }

    #[test]
    fn body_pose_reads_z_rotation() {
        let t = Transform::from_xyz(3.0, 4.0, 0.0).with_rotation(Quat::from_rotation_z(-0.7));
        let (pos, angle) = body_pose(&t);
        assert_eq!(pos, Vec2::new(3.0, 4.0));
        assert!((angle + 0.7).abs() < 1e-5);
    }

    #[test]
    fn topmost_prefers_highest_order() {
        let mut world = World::new();
        let [low, high, mid] = [(); 3].map(|_| world.spawn_empty().id());
        assert_eq!(topmost([(low, 0), (high, 7), (mid, 3)]), Some(high));
        assert_eq!(topmost([(mid, 3)]), Some(mid));
        assert_eq!(topmost(std::iter::empty()), None);
    }
}
