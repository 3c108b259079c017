//! Device tilt → physics gravity.
//!
//! Orientation readings carry the usual `alpha`/`beta`/`gamma` angles in
//! degrees.  `beta` and `gamma` are clamped to ±90°, divided by 90 and routed
//! to the gravity axes according to the screen rotation, so "down" on screen
//! stays down however the device is held.  A reading with neither angle
//! restores the default downward gravity.
//!
//! Some platforms only expose the motion sensor after the user grants
//! permission, and only allow asking from inside a user gesture.  The
//! [`SensorGate`] tracks that: it starts in `AwaitingGesture`, the first
//! pointer press asks the [`MotionSensorPlatform`], and the answer moves it to
//! `Enabled` or `Disabled` for the rest of the session.  Readings are ignored
//! unless the gate is `Enabled`.
//!
//! The platform also reports the screen rotation; [`ScreenOrientation`]
//! follows it every frame.  On desktop there is no tilt sensor and the screen
//! never rotates; the arrow keys stand in for the sensor.

use crate::config::ArtConfig;
use crate::constants::{
    DEFAULT_GRAVITY_SCALE, GRAVITY_SCALE_TO_PIXELS, KEYBOARD_TILT_DEGREES, MAX_TILT_DEGREES,
    TILT_GRAVITY_SCALE,
};
use crate::error::ArtResult;
use bevy::prelude::*;
use bevy_rapier2d::prelude::RapierConfiguration;

/// Gravity direction in canvas orientation (y down) and its strength in
/// pixels per squared millisecond.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct GravityVector {
    pub x: f32,
    pub y: f32,
    pub scale: f32,
}

impl Default for GravityVector {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 1.0,
            scale: DEFAULT_GRAVITY_SCALE,
        }
    }
}

impl GravityVector {
    /// World-space acceleration for Rapier, in px/s².
    pub fn to_world(&self) -> Vec2 {
        Vec2::new(self.x, -self.y) * self.scale * GRAVITY_SCALE_TO_PIXELS
    }
}

/// One device orientation reading, in degrees.  Any angle may be missing.
#[derive(Message, Debug, Clone, Copy, PartialEq, Default)]
pub struct DeviceOrientation {
    pub alpha: Option<f32>,
    pub beta: Option<f32>,
    pub gamma: Option<f32>,
}

/// Screen rotation in degrees: 0, 90, 180 or -90.  Written from the active
/// [`MotionPlatform`].
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScreenOrientation(pub i32);

fn tilt(angle: f32) -> f32 {
    angle.clamp(-MAX_TILT_DEGREES, MAX_TILT_DEGREES) / MAX_TILT_DEGREES
}

/// Gravity after applying `reading` with the screen rotated by `screen`
/// degrees.
///
/// An unrecognised rotation keeps the current direction but still switches
/// to the tilt scale.
pub fn apply_orientation(
    current: GravityVector,
    reading: &DeviceOrientation,
    screen: i32,
) -> GravityVector {
    if reading.beta.is_none() && reading.gamma.is_none() {
        return GravityVector::default();
    }
    let beta = reading.beta.unwrap_or(0.0);
    let gamma = reading.gamma.unwrap_or(0.0);
    let (x, y) = match screen {
        0 => (tilt(gamma), tilt(beta)),
        180 => (tilt(gamma), tilt(-beta)),
        90 => (tilt(beta), tilt(-gamma)),
        -90 => (tilt(-beta), tilt(gamma)),
        _ => (current.x, current.y),
    };
    GravityVector {
        x,
        y,
        scale: TILT_GRAVITY_SCALE,
    }
}

// ── Permission ────────────────────────────────────────────────────────────────

/// Outcome of asking the platform for motion-sensor access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorPermission {
    Granted,
    Denied,
    Unsupported,
}

/// Whether orientation readings drive gravity.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SensorGate {
    #[default]
    AwaitingGesture,
    Enabled,
    Disabled,
}

impl SensorGate {
    /// Settle the gate from a permission request.  Only a pending gate moves.
    pub fn resolve(self, outcome: &ArtResult<SensorPermission>) -> Self {
        match (self, outcome) {
            (SensorGate::AwaitingGesture, Ok(SensorPermission::Granted)) => SensorGate::Enabled,
            (SensorGate::AwaitingGesture, _) => SensorGate::Disabled,
            (settled, _) => settled,
        }
    }
}

/// Access to the host's motion sensor.
pub trait MotionSensorPlatform: Send + Sync + 'static {
    /// True if access must be requested from inside a user gesture.
    fn requires_permission(&self) -> bool;

    fn request_permission(&mut self) -> ArtResult<SensorPermission>;

    /// Current screen rotation in degrees.
    fn screen_orientation(&self) -> i32 {
        0
    }
}

/// The active platform.
#[derive(Resource)]
pub struct MotionPlatform(pub Box<dyn MotionSensorPlatform>);

/// Desktop: the keyboard stands in for the sensor and needs no permission.
#[derive(Debug, Default)]
pub struct DesktopTilt;

impl MotionSensorPlatform for DesktopTilt {
    fn requires_permission(&self) -> bool {
        false
    }

    fn request_permission(&mut self) -> ArtResult<SensorPermission> {
        Ok(SensorPermission::Granted)
    }
}

fn settle_gate(gate: &mut SensorGate, outcome: ArtResult<SensorPermission>) {
    match &outcome {
        Ok(permission) => info!("motion sensor permission: {permission:?}"),
        Err(e) => error!("{e}; tilt gravity disabled"),
    }
    *gate = gate.resolve(&outcome);
}

/// Platforms that need no gesture are asked straight away.
pub fn init_sensor_gate(mut platform: ResMut<MotionPlatform>, mut gate: ResMut<SensorGate>) {
    if *gate == SensorGate::AwaitingGesture && !platform.0.requires_permission() {
        let outcome = platform.0.request_permission();
        settle_gate(&mut gate, outcome);
    }
}

/// Ask for permission on the first pointer press.
pub fn sensor_gesture_system(
    mouse: Res<ButtonInput<MouseButton>>,
    mut platform: ResMut<MotionPlatform>,
    mut gate: ResMut<SensorGate>,
) {
    if *gate != SensorGate::AwaitingGesture || mouse.get_just_pressed().next().is_none() {
        return;
    }
    let outcome = platform.0.request_permission();
    settle_gate(&mut gate, outcome);
}

// ── Systems ───────────────────────────────────────────────────────────────────

/// Arrow keys emulate tilt: each held axis leans the device by 45°.
pub fn keyboard_tilt_system(
    keys: Res<ButtonInput<KeyCode>>,
    mut orientation: MessageWriter<DeviceOrientation>,
) {
    const ARROWS: [KeyCode; 4] = [
        KeyCode::ArrowUp,
        KeyCode::ArrowDown,
        KeyCode::ArrowLeft,
        KeyCode::ArrowRight,
    ];
    if !ARROWS
        .iter()
        .any(|k| keys.just_pressed(*k) || keys.just_released(*k))
    {
        return;
    }

    let axis = |neg: KeyCode, pos: KeyCode| -> Option<f32> {
        let lean = keys.pressed(pos) as i32 - keys.pressed(neg) as i32;
        (keys.pressed(neg) || keys.pressed(pos)).then_some(lean as f32 * KEYBOARD_TILT_DEGREES)
    };
    let beta = axis(KeyCode::ArrowUp, KeyCode::ArrowDown);
    let gamma = axis(KeyCode::ArrowLeft, KeyCode::ArrowRight);

    orientation.write(DeviceOrientation {
        alpha: None,
        beta,
        gamma,
    });
}

pub fn screen_orientation_system(
    platform: Res<MotionPlatform>,
    mut screen: ResMut<ScreenOrientation>,
) {
    let rotation = platform.0.screen_orientation();
    if screen.0 != rotation {
        debug!("screen rotation {} → {}", screen.0, rotation);
        screen.0 = rotation;
    }
}

/// Fold orientation readings into the gravity vector while the gate is open.
pub fn orientation_gravity_system(
    mut readings: MessageReader<DeviceOrientation>,
    gate: Res<SensorGate>,
    screen: Res<ScreenOrientation>,
    mut gravity: ResMut<GravityVector>,
) {
    if *gate != SensorGate::Enabled {
        readings.clear();
        return;
    }
    for reading in readings.read() {
        let next = apply_orientation(*gravity, reading, screen.0);
        if next != *gravity {
            debug!("gravity → ({:.3}, {:.3}) × {}", next.x, next.y, next.scale);
            *gravity = next;
        }
    }
}

/// Push the gravity vector into every Rapier world.
pub fn apply_gravity_system(
    gravity: Res<GravityVector>,
    mut worlds: Query<&mut RapierConfiguration>,
) {
    let target = gravity.to_world();
    for mut world in worlds.iter_mut() {
        if world.gravity != target {
            world.gravity = target;
        }
    }
}

pub struct GravityPlugin;

impl Plugin for GravityPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<MotionPlatform>() {
            app.insert_resource(MotionPlatform(Box::new(DesktopTilt)));
        }
        app.init_resource::<GravityVector>()
            .init_resource::<ScreenOrientation>()
            .init_resource::<SensorGate>()
            .add_message::<DeviceOrientation>()
            .add_systems(Startup, init_sensor_gate)
            .add_systems(
                Update,
                (
                    sensor_gesture_system,
                    keyboard_tilt_system.run_if(|config: Res<ArtConfig>| config.tilt_keys),
                    screen_orientation_system,
                    orientation_gravity_system,
                    apply_gravity_system,
                )
                    .chain(),
            );
    }
}
