//! App wiring and the reseed cycle.
//!
//! A reseed tears the whole composition down and builds it again in one
//! system run: shapes, visuals and walls are despawned, the palette is
//! re-rolled, walls are rebuilt for the current viewport, the pointer grab is
//! dropped and placement runs again.  All of it goes through one `Commands`
//! queue, so the next physics step sees either the old world or the new one.
//!
//! Reseeds are requested at startup, when the window is resized, from the
//! "new palette" button and with the `R` key.

use crate::config::ArtConfig;
use crate::gravity::GravityPlugin;
use crate::outline::Silhouette;
use crate::palette::{choose_palette, ActivePalette, PaletteCorpus};
use crate::placement::{place_shapes, ArtRng, PlacementParams};
use crate::pointer::{pointer_drag_system, pointer_grab_system, PointerDrag};
use crate::rendering::ShapeVisual;
use crate::shape::{spawn_shape_instances, spawn_walls, ShapeInstance, Wall};
use crate::viewport::Viewport;
use bevy::prelude::*;
use bevy::window::{PrimaryWindow, WindowResized};
use bevy_rapier2d::prelude::RapierContextSimulation;

/// Why a reseed was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReseedReason {
    Startup,
    Resize,
    PaletteRequest,
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReseedRequest(pub ReseedReason);

/// Outcome of the most recent reseed.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedStats {
    pub requested: usize,
    pub accepted: usize,
    pub reseeds: u32,
}

/// Marker for the "new palette" button.
#[derive(Component)]
pub struct RerollButton;

fn reroll_bg() -> Color {
    Color::srgba(0.0, 0.0, 0.0, 0.35)
}
fn reroll_border() -> Color {
    Color::srgba(1.0, 1.0, 1.0, 0.45)
}
fn reroll_text() -> Color {
    Color::srgba(1.0, 1.0, 1.0, 0.8)
}

// ── Startup ───────────────────────────────────────────────────────────────────

/// Take the real window size, if there is a window.
pub fn sync_viewport_to_window(
    windows: Query<&Window, With<PrimaryWindow>>,
    mut viewport: ResMut<Viewport>,
) {
    if let Ok(window) = windows.single() {
        *viewport = Viewport::new(window.width(), window.height());
    }
}

pub fn request_initial_seed(mut requests: MessageWriter<ReseedRequest>) {
    requests.write(ReseedRequest(ReseedReason::Startup));
}

pub fn setup_reroll_button(mut commands: Commands) {
    commands
        .spawn((
            Button,
            Node {
                position_type: PositionType::Absolute,
                top: Val::Px(12.0),
                right: Val::Px(12.0),
                padding: UiRect::axes(Val::Px(14.0), Val::Px(6.0)),
                border: UiRect::all(Val::Px(1.0)),
                ..default()
            },
            BackgroundColor(reroll_bg()),
            BorderColor::all(reroll_border()),
            RerollButton,
        ))
        .with_children(|btn| {
            btn.spawn((
                Text::new("new palette"),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(reroll_text()),
            ));
        });
}

/// Reduce solver iterations on every new Rapier world.
pub fn configure_physics_system(
    config: Res<ArtConfig>,
    mut worlds: Query<&mut RapierContextSimulation, Added<RapierContextSimulation>>,
) {
    for mut world in worlds.iter_mut() {
        if let Ok(iterations) = config.solver_iterations.try_into() {
            world.integration_parameters.num_solver_iterations = iterations;
            info!("physics solver iterations: {}", config.solver_iterations);
        }
    }
}

// ── Requests ──────────────────────────────────────────────────────────────────

/// Follow the window size; every real change reseeds.
pub fn window_resize_system(
    mut resized: MessageReader<WindowResized>,
    mut viewport: ResMut<Viewport>,
    mut requests: MessageWriter<ReseedRequest>,
) {
    let Some(last) = resized.read().last() else {
        return;
    };
    let next = Viewport::new(last.width, last.height);
    if next == *viewport || next.width <= 0.0 || next.height <= 0.0 {
        return;
    }
    *viewport = next;
    requests.write(ReseedRequest(ReseedReason::Resize));
}

/// "New palette" button and the `R` key.
#[allow(clippy::type_complexity)]
pub fn reroll_input_system(
    buttons: Query<(&Interaction, &Children), (Changed<Interaction>, With<RerollButton>)>,
    mut btn_text: Query<&mut TextColor>,
    keys: Res<ButtonInput<KeyCode>>,
    mut requests: MessageWriter<ReseedRequest>,
) {
    let mut pressed = keys.just_pressed(KeyCode::KeyR);
    for (interaction, children) in buttons.iter() {
        let text = match interaction {
            Interaction::Pressed => {
                pressed = true;
                Color::WHITE
            }
            Interaction::Hovered => Color::WHITE,
            Interaction::None => reroll_text(),
        };
        for child in children.iter() {
            if let Ok(mut color) = btn_text.get_mut(child) {
                *color = TextColor(text);
            }
        }
    }
    if pressed {
        requests.write(ReseedRequest(ReseedReason::PaletteRequest));
    }
}

// ── Reseed ────────────────────────────────────────────────────────────────────

/// Tear down and rebuild the composition.  Several requests in one frame
/// collapse into one reseed.
#[allow(clippy::too_many_arguments, clippy::type_complexity)]
pub fn reseed_system(
    mut commands: Commands,
    mut requests: MessageReader<ReseedRequest>,
    existing: Query<Entity, Or<(With<ShapeInstance>, With<ShapeVisual>, With<Wall>)>>,
    config: Res<ArtConfig>,
    viewport: Res<Viewport>,
    silhouette: Res<Silhouette>,
    corpus: Res<PaletteCorpus>,
    mut palette: ResMut<ActivePalette>,
    mut rng: ResMut<ArtRng>,
    mut drag: ResMut<PointerDrag>,
    mut stats: ResMut<SeedStats>,
) {
    let Some(ReseedRequest(reason)) = requests.read().last().copied() else {
        return;
    };

    for entity in existing.iter() {
        commands.entity(entity).despawn();
    }

    match choose_palette(&*corpus, &mut rng.0, config.palette_max_attempts)
        .and_then(|chosen| ActivePalette::from_palette(&chosen))
    {
        Ok(next) => *palette = next,
        Err(e) => warn!("{e}; keeping palette '{}'", palette.name),
    }

    spawn_walls(&mut commands, &viewport, &config);
    drag.release();

    let params = PlacementParams::from_config(&config, viewport.size(), silhouette.ref_size());
    let placements = place_shapes(&mut rng.0, &params);
    spawn_shape_instances(
        &mut commands,
        &placements,
        &silhouette,
        &palette,
        &viewport,
        &config,
        &mut rng.0,
    );

    let reseeds = stats.reseeds + 1;
    *stats = SeedStats {
        requested: params.target,
        accepted: placements.len(),
        reseeds,
    };
    info!(
        "reseed ({reason:?}): {}×{} viewport, palette '{}', placed {}/{} shapes",
        viewport.width,
        viewport.height,
        palette.name,
        placements.len(),
        params.target
    );
}

pub struct ArtPlugin;

impl Plugin for ArtPlugin {
    fn build(&self, app: &mut App) {
        let config = app
            .world()
            .get_resource::<ArtConfig>()
            .cloned()
            .unwrap_or_default();
        if !app.world().contains_resource::<ArtRng>() {
            app.insert_resource(ArtRng::from_config(&config));
        }
        if !app.world().contains_resource::<ArtConfig>() {
            app.insert_resource(config);
        }

        app.add_plugins(GravityPlugin)
            .init_resource::<Viewport>()
            .init_resource::<PaletteCorpus>()
            .init_resource::<ActivePalette>()
            .init_resource::<PointerDrag>()
            .init_resource::<SeedStats>()
            .add_message::<ReseedRequest>()
            .add_message::<WindowResized>()
            .add_systems(
                Startup,
                (
                    sync_viewport_to_window,
                    request_initial_seed,
                    setup_reroll_button,
                ),
            )
            .add_systems(
                Update,
                (
                    configure_physics_system,
                    window_resize_system,
                    reroll_input_system,
                    reseed_system,
                    pointer_grab_system,
                    pointer_drag_system,
                )
                    .chain(),
            );
    }
}
