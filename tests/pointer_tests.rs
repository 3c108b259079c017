//! Headless tests for the pointer drag constraint.
//!
//! There is no window or camera, so the cursor never moves; each test sets
//! [`PointerDrag::target`] directly and drives `ButtonInput<MouseButton>`.
//!
//! Covered scenarios:
//! 1. A press over overlapping shapes grabs the one drawn on top.
//! 2. A press over empty space grabs nothing.
//! 3. While held, the grabbed body's velocity is driven and it is woken.
//! 4. Releasing the button lets go.
//! 5. A grabbed body that disappears is let go.

use bevy::input::ButtonInput;
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;
use tumble::config::ArtConfig;
use tumble::pointer::{
    drag_velocity, pointer_drag_system, pointer_grab_system, Grab, PointerDrag,
};
use tumble::shape::ShapeInstance;

// ── Helpers ───────────────────────────────────────────────────────────────────

fn base_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .init_resource::<ButtonInput<MouseButton>>()
        .insert_resource(ArtConfig::default())
        .init_resource::<PointerDrag>();
    app
}

/// Pointer systems over a real Rapier world, so point queries see colliders.
fn physics_app() -> App {
    let mut app = base_app();
    app.add_plugins((
        TransformPlugin,
        RapierPhysicsPlugin::<NoUserData>::pixels_per_meter(1.0),
    ))
    .insert_resource(TimestepMode::Fixed {
        dt: 1.0 / 60.0,
        substeps: 1,
    })
    .add_systems(Update, (pointer_grab_system, pointer_drag_system).chain());
    // Startup creates the default Rapier context.
    app.update();
    app
}

/// Drag system only; bodies are plain entities.
fn drag_app() -> App {
    let mut app = base_app();
    app.add_systems(Update, pointer_drag_system);
    app
}

fn instance(order: u32) -> ShapeInstance {
    ShapeInstance {
        scale: 1.0,
        fill: Color::WHITE,
        order,
    }
}

/// A dynamic disc that collides with nothing, so overlapping discs stay put.
fn spawn_disc(app: &mut App, at: Vec2, order: u32) -> Entity {
    app.world_mut()
        .spawn((
            instance(order),
            Transform::from_translation(at.extend(0.0)),
            RigidBody::Dynamic,
            Collider::ball(20.0),
            CollisionGroups::new(Group::GROUP_1, Group::NONE),
            Velocity::zero(),
        ))
        .id()
}

fn spawn_sleeping_body(app: &mut App, at: Vec2) -> Entity {
    app.world_mut()
        .spawn((
            instance(0),
            Transform::from_translation(at.extend(0.0)),
            Velocity::zero(),
            Sleeping {
                sleeping: true,
                ..Sleeping::default()
            },
        ))
        .id()
}

fn aim(app: &mut App, target: Vec2) {
    app.world_mut().resource_mut::<PointerDrag>().target = Some(target);
}

fn press(app: &mut App) {
    app.world_mut()
        .resource_mut::<ButtonInput<MouseButton>>()
        .press(MouseButton::Left);
}

fn release(app: &mut App) {
    let mut buttons = app.world_mut().resource_mut::<ButtonInput<MouseButton>>();
    buttons.clear();
    buttons.release(MouseButton::Left);
}

fn drag(app: &App) -> PointerDrag {
    *app.world().resource::<PointerDrag>()
}

// ── Grabbing ──────────────────────────────────────────────────────────────────

#[test]
fn press_grabs_the_topmost_shape_under_the_cursor() {
    let mut app = physics_app();
    let _below = spawn_disc(&mut app, Vec2::new(0.0, 0.0), 2);
    let above = spawn_disc(&mut app, Vec2::new(15.0, 0.0), 5);
    let _elsewhere = spawn_disc(&mut app, Vec2::new(300.0, 0.0), 9);
    for _ in 0..3 {
        app.update();
    }

    aim(&mut app, Vec2::new(8.0, 0.0));
    press(&mut app);
    app.update();

    let grab = drag(&app).grab.expect("cursor is over two discs");
    assert_eq!(grab.body, above);
    assert!(
        grab.local_anchor.abs_diff_eq(Vec2::new(-7.0, 0.0), 0.5),
        "anchor {:?}",
        grab.local_anchor
    );
}

#[test]
fn press_over_empty_space_grabs_nothing() {
    let mut app = physics_app();
    spawn_disc(&mut app, Vec2::ZERO, 0);
    for _ in 0..3 {
        app.update();
    }

    aim(&mut app, Vec2::new(150.0, 0.0));
    press(&mut app);
    app.update();

    assert!(!drag(&app).is_dragging());
}

// ── Dragging ──────────────────────────────────────────────────────────────────

#[test]
fn held_grab_drives_velocity_and_wakes_the_body() {
    let mut app = drag_app();
    let body = spawn_sleeping_body(&mut app, Vec2::ZERO);
    app.world_mut().resource_mut::<PointerDrag>().grab = Some(Grab {
        body,
        local_anchor: Vec2::new(10.0, 0.0),
    });
    aim(&mut app, Vec2::new(40.0, 30.0));
    press(&mut app);
    app.update();

    let config = ArtConfig::default();
    let (linvel, angvel) = drag_velocity(
        Vec2::new(10.0, 0.0),
        Vec2::ZERO,
        Vec2::new(40.0, 30.0),
        config.drag_stiffness,
        config.physics_dt(),
    );
    let velocity = app.world().get::<Velocity>(body).expect("body has a velocity");
    assert!(velocity.linvel.abs_diff_eq(linvel, 1e-3), "{:?}", velocity.linvel);
    assert!((velocity.angvel - angvel).abs() < 1e-4);
    assert!(velocity.angvel > 0.0, "sideways pull spins the body");

    let sleeping = app.world().get::<Sleeping>(body).expect("body can sleep");
    assert!(!sleeping.sleeping);
    assert!(drag(&app).is_dragging());
}

#[test]
fn release_lets_go() {
    let mut app = drag_app();
    let body = spawn_sleeping_body(&mut app, Vec2::ZERO);
    app.world_mut().resource_mut::<PointerDrag>().grab = Some(Grab {
        body,
        local_anchor: Vec2::ZERO,
    });
    aim(&mut app, Vec2::new(5.0, 5.0));
    press(&mut app);
    app.update();
    assert!(drag(&app).is_dragging());

    release(&mut app);
    app.update();
    assert!(!drag(&app).is_dragging());
    assert_eq!(drag(&app).target, Some(Vec2::new(5.0, 5.0)));
}

#[test]
fn vanished_body_is_let_go() {
    let mut app = drag_app();
    let body = spawn_sleeping_body(&mut app, Vec2::ZERO);
    app.world_mut().resource_mut::<PointerDrag>().grab = Some(Grab {
        body,
        local_anchor: Vec2::ZERO,
    });
    aim(&mut app, Vec2::new(5.0, 5.0));
    press(&mut app);
    app.world_mut().despawn(body);
    app.update();

    assert!(!drag(&app).is_dragging());
}
