use bevy::prelude::*;
use bevy::window::WindowResolution;
use bevy_rapier2d::prelude::*;
use tumble::config::{load_art_config, CONFIG_PATH};
use tumble::lifecycle::ArtPlugin;
use tumble::outline::Silhouette;
use tumble::palette::{PaletteCorpus, PALETTES_PATH};
use tumble::rendering::ShapeRenderPlugin;
use tumble::viewport::Viewport;

fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}

fn main() {
    // Window size and resolution mode are needed before the app exists, so the
    // config is read here rather than in a startup system.
    let config = load_art_config(CONFIG_PATH);

    let silhouette = match Silhouette::builtin() {
        Ok(silhouette) => silhouette,
        Err(e) => {
            eprintln!("✗ Built-in silhouette is unusable: {e}");
            std::process::exit(1);
        }
    };
    let corpus = PaletteCorpus::load_or_builtin(PALETTES_PATH);

    let mut resolution = WindowResolution::new(config.window_width, config.window_height);
    if !config.hidpi {
        resolution = resolution.with_scale_factor_override(1.0);
    }
    let physics_dt = config.physics_dt();

    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Tumble".into(),
            resolution,
            ..Default::default()
        }),
        ..Default::default()
    }))
    .insert_resource(ClearColor(Color::BLACK))
    .insert_resource(Viewport::new(
        config.window_width as f32,
        config.window_height as f32,
    ))
    .insert_resource(silhouette)
    .insert_resource(corpus)
    .insert_resource(config)
    // pixels_per_meter(1.0) keeps physics units equal to logical pixels, so
    // gravity and drag velocities are written in px/s.
    .add_plugins(RapierPhysicsPlugin::<NoUserData>::pixels_per_meter(1.0))
    .insert_resource(TimestepMode::Fixed {
        dt: physics_dt,
        substeps: 1,
    })
    .add_plugins((ArtPlugin, ShapeRenderPlugin))
    .add_systems(Startup, setup_camera);

    app.run();
}
