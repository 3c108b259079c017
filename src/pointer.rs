//! Pointer drag constraint.
//!
//! Pressing the left button over a shape grabs the topmost one at a fixed
//! point in its local frame; Rapier's point query finds the shapes under the
//! cursor.  While the button is held the grabbed body's velocity is set each
//! frame so the grab point closes `stiffness` of its gap to the cursor per
//! physics step.  Releasing the button lets go.

use crate::config::ArtConfig;
use crate::constants::MIN_DRAG_LEVER_SQ;
use crate::shape::{topmost, world_to_local, ShapeInstance};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_rapier2d::prelude::{QueryFilter, ReadRapierContext, Sleeping, Velocity};

/// A held shape and the grip point in its local frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grab {
    pub body: Entity,
    pub local_anchor: Vec2,
}

/// State of the pointer constraint.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerDrag {
    pub grab: Option<Grab>,
    /// Last known cursor position in world space.
    pub target: Option<Vec2>,
}

impl PointerDrag {
    pub fn release(&mut self) {
        self.grab = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.grab.is_some()
    }
}

/// Velocities that move `anchor` by `stiffness · (target - anchor)` within
/// one step of `dt` seconds.
///
/// The part of the correction along the lever arm is pure translation; the
/// part across it is shared equally between translation and spin about
/// `center`.  A grip closer than `sqrt(MIN_DRAG_LEVER_SQ)` to the centre only
/// translates.
pub fn drag_velocity(
    anchor: Vec2,
    center: Vec2,
    target: Vec2,
    stiffness: f32,
    dt: f32,
) -> (Vec2, f32) {
    let delta = (target - anchor) * stiffness;
    let lever = anchor - center;
    let lever_sq = lever.length_squared();
    if lever_sq < MIN_DRAG_LEVER_SQ {
        return (delta / dt, 0.0);
    }
    let len = lever_sq.sqrt();
    let across_dir = lever.perp() / len;
    let across = delta.dot(across_dir);
    let along = delta - across_dir * across;

    let linvel = (along + across_dir * (across * 0.5)) / dt;
    let angvel = (across * 0.5 / len) / dt;
    (linvel, angvel)
}

/// Cursor position in world space, if the cursor is over the window.
pub fn cursor_world_position(
    windows: &Query<&Window, With<PrimaryWindow>>,
    cameras: &Query<(&Camera, &GlobalTransform)>,
) -> Option<Vec2> {
    let cursor = windows.single().ok()?.cursor_position()?;
    let (camera, camera_transform) = cameras.iter().next()?;
    camera.viewport_to_world_2d(camera_transform, cursor).ok()
}

/// Track the cursor and grab the topmost shape under it on press.
pub fn pointer_grab_system(
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform)>,
    rapier_context: ReadRapierContext,
    mut drag: ResMut<PointerDrag>,
    shapes: Query<(&Transform, &ShapeInstance)>,
) {
    if let Some(cursor) = cursor_world_position(&windows, &cameras) {
        drag.target = Some(cursor);
    }
    if !buttons.just_pressed(MouseButton::Left) {
        return;
    }
    let Some(target) = drag.target else {
        return;
    };
    let Ok(rapier) = rapier_context.single() else {
        return;
    };

    let mut hits = Vec::new();
    rapier.intersect_point(target, QueryFilter::only_dynamic(), |entity| {
        if let Ok((_, instance)) = shapes.get(entity) {
            hits.push((entity, instance.order));
        }
        true
    });

    drag.grab = topmost(hits).and_then(|body| {
        let (transform, _) = shapes.get(body).ok()?;
        Some(Grab {
            body,
            local_anchor: world_to_local(transform, target),
        })
    });
    if let Some(grab) = drag.grab {
        debug!("grabbed {:?} at {:?}", grab.body, grab.local_anchor);
    }
}

/// Follow the cursor while held, let go on release.
pub fn pointer_drag_system(
    buttons: Res<ButtonInput<MouseButton>>,
    config: Res<ArtConfig>,
    mut drag: ResMut<PointerDrag>,
    mut bodies: Query<(&Transform, &mut Velocity, Option<&mut Sleeping>), With<ShapeInstance>>,
) {
    if buttons.just_released(MouseButton::Left) {
        drag.release();
        return;
    }

    let (Some(grab), Some(target)) = (drag.grab, drag.target) else {
        return;
    };
    let Ok((transform, mut velocity, sleeping)) = bodies.get_mut(grab.body) else {
        drag.release();
        return;
    };

    let center = transform.translation.truncate();
    let anchor = transform.transform_point(grab.local_anchor.extend(0.0)).truncate();
    let (linvel, angvel) = drag_velocity(
        anchor,
        center,
        target,
        config.drag_stiffness,
        config.physics_dt(),
    );
    velocity.linvel = linvel;
    velocity.angvel = angvel;
    if let Some(mut sleeping) = sleeping {
        sleeping.sleeping = false;
    }
}
