//! Per-tick drawing of the shape instances.
//!
//! The silhouette is tessellated once into a shared `Mesh2d` in path
//! coordinates.  Each shape gets its own visual entity whose `Transform` is
//! recomputed every frame from the body's live pose:
//!
//! ```text
//! canvas_to_world · translate(position) · rotate(angle) · scale(s) · translate(-extent / 2)
//! ```
//!
//! The canvas part is composed in [`compose_frame`] as plain data, so a frame
//! can be inspected (and compared) without a renderer.
//!
//! ## System Responsibilities
//!
//! | System                         | Schedule   | Purpose                                  |
//! |--------------------------------|------------|------------------------------------------|
//! | `setup_silhouette_mesh`        | Startup    | Tessellate and upload the shared mesh    |
//! | `attach_shape_visual_system`   | PostUpdate | Spawn a fill visual for each new body    |
//! | `draw_shapes_system`           | PostUpdate | Write live poses into visual transforms  |
//! | `sync_clear_color_system`      | PostUpdate | Clear colour follows the palette         |

use crate::constants::SHAPE_DEPTH_STEP;
use crate::outline::{Silhouette, SilhouetteGeometry};
use crate::palette::ActivePalette;
use crate::shape::{body_pose, ShapeInstance};
use crate::viewport::Viewport;
use bevy::math::Affine2;
use bevy::platform::collections::HashMap;
use bevy::prelude::*;
use bevy::transform::TransformSystems;
use bevy_asset::RenderAssetUsages;
use bevy_mesh::{Indices, PrimitiveTopology};
use bevy_rapier2d::plugin::PhysicsSet;

/// Handle to the shared silhouette fill mesh.
#[derive(Resource, Debug, Clone)]
pub struct SilhouetteMesh(pub Handle<Mesh>);

/// The visual for one shape body.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeVisual {
    pub body: Entity,
}

// ── Frame composition ─────────────────────────────────────────────────────────

/// `T(position) · R(angle) · S(scale) · T(-extent / 2)` in canvas space.
pub fn shape_transform(position: Vec2, angle: f32, scale: f32, extent: Vec2) -> Affine2 {
    Affine2::from_translation(position)
        * Affine2::from_angle(angle)
        * Affine2::from_scale(Vec2::splat(scale))
        * Affine2::from_translation(-extent / 2.0)
}

/// A body's pose as the canvas sees it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapePose {
    pub body: Entity,
    pub position: Vec2,
    pub angle: f32,
    pub scale: f32,
    pub fill: Color,
    pub order: u32,
}

/// One filled silhouette.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall {
    pub body: Entity,
    pub transform: Affine2,
    pub fill: Color,
    pub depth: f32,
}

/// Everything painted in one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub background: Color,
    pub draws: Vec<DrawCall>,
}

/// Build the draw list: one call per pose, in `order`, no culling.
pub fn compose_frame(background: Color, extent: Vec2, poses: &[ShapePose]) -> Frame {
    let mut sorted: Vec<&ShapePose> = poses.iter().collect();
    sorted.sort_by_key(|pose| pose.order);
    Frame {
        background,
        draws: sorted
            .into_iter()
            .map(|pose| DrawCall {
                body: pose.body,
                transform: shape_transform(pose.position, pose.angle, pose.scale, extent),
                fill: pose.fill,
                depth: pose.order as f32 * SHAPE_DEPTH_STEP,
            })
            .collect(),
    }
}

/// Lift a canvas draw into a world `Transform` at the draw's depth.
pub fn world_transform(viewport: &Viewport, draw: &DrawCall) -> Transform {
    let a = viewport.canvas_to_world() * draw.transform;
    let m = a.matrix2;
    let t = a.translation;
    Transform::from_matrix(Mat4::from_cols(
        Vec4::new(m.x_axis.x, m.x_axis.y, 0.0, 0.0),
        Vec4::new(m.y_axis.x, m.y_axis.y, 0.0, 0.0),
        Vec4::Z,
        Vec4::new(t.x, t.y, draw.depth, 1.0),
    ))
}

// ── Mesh ──────────────────────────────────────────────────────────────────────

/// Upload tessellated silhouette geometry as a triangle-list [`Mesh`].
///
/// UVs span the geometry's bounding box.
pub fn silhouette_mesh(geometry: &SilhouetteGeometry, extent: Vec2) -> Mesh {
    let n = geometry.positions.len();
    let positions: Vec<[f32; 3]> = geometry.positions.iter().map(|p| [p[0], p[1], 0.0]).collect();
    let normals: Vec<[f32; 3]> = vec![[0.0, 0.0, 1.0]; n];
    let uvs: Vec<[f32; 2]> = geometry
        .positions
        .iter()
        .map(|p| [p[0] / extent.x, p[1] / extent.y])
        .collect();

    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::RENDER_WORLD,
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
    mesh.insert_indices(Indices::U32(geometry.indices.clone()));
    mesh
}

// ── Systems ───────────────────────────────────────────────────────────────────

pub fn setup_silhouette_mesh(
    mut commands: Commands,
    silhouette: Res<Silhouette>,
    mut meshes: ResMut<Assets<Mesh>>,
) {
    match silhouette.tessellate() {
        Ok(geometry) => {
            debug!(
                "silhouette tessellated: {} vertices, {} triangles",
                geometry.positions.len(),
                geometry.indices.len() / 3
            );
            let handle = meshes.add(silhouette_mesh(&geometry, silhouette.extent()));
            commands.insert_resource(SilhouetteMesh(handle));
        }
        Err(e) => error!("{e}; shapes will simulate without fills"),
    }
}

/// Spawn a fill visual for every shape body added since the last run.
pub fn attach_shape_visual_system(
    mut commands: Commands,
    added: Query<(Entity, &ShapeInstance), Added<ShapeInstance>>,
    mesh: Option<Res<SilhouetteMesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    let Some(mesh) = mesh else {
        return;
    };
    for (body, instance) in added.iter() {
        commands.spawn((
            ShapeVisual { body },
            Mesh2d(mesh.0.clone()),
            MeshMaterial2d(materials.add(ColorMaterial::from_color(instance.fill))),
            Transform::default(),
            Visibility::Visible,
        ));
    }
}

/// Redraw every shape from its body's current pose.
pub fn draw_shapes_system(
    viewport: Res<Viewport>,
    silhouette: Res<Silhouette>,
    palette: Res<ActivePalette>,
    bodies: Query<(Entity, &Transform, &ShapeInstance), Without<ShapeVisual>>,
    mut visuals: Query<(&ShapeVisual, &mut Transform), Without<ShapeInstance>>,
) {
    let poses: Vec<ShapePose> = bodies
        .iter()
        .map(|(body, transform, instance)| {
            let (position, angle) = body_pose(transform);
            ShapePose {
                body,
                position: viewport.to_canvas(position),
                angle: -angle,
                scale: instance.scale,
                fill: instance.fill,
                order: instance.order,
            }
        })
        .collect();

    let frame = compose_frame(palette.background, silhouette.extent(), &poses);
    let by_body: HashMap<Entity, &DrawCall> =
        frame.draws.iter().map(|draw| (draw.body, draw)).collect();

    for (visual, mut transform) in visuals.iter_mut() {
        if let Some(draw) = by_body.get(&visual.body) {
            let next = world_transform(&viewport, draw);
            if *transform != next {
                *transform = next;
            }
        }
    }
}

pub fn sync_clear_color_system(palette: Res<ActivePalette>, mut clear: ResMut<ClearColor>) {
    if palette.is_changed() {
        clear.0 = palette.background;
    }
}

pub struct ShapeRenderPlugin;

impl Plugin for ShapeRenderPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ClearColor>()
            .add_systems(Startup, setup_silhouette_mesh)
            .add_systems(
                PostUpdate,
                (
                    attach_shape_visual_system,
                    draw_shapes_system,
                    sync_clear_color_system,
                )
                    .chain()
                    .after(PhysicsSet::Writeback)
                    .before(TransformSystems::Propagate),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{SILHOUETTE_HEIGHT, SILHOUETTE_WIDTH};

    fn extent() -> Vec2 {
        Vec2::new(SILHOUETTE_WIDTH, SILHOUETTE_HEIGHT)
    }

    fn poses(world: &mut World) -> Vec<ShapePose> {
        [(2, 0.3), (0, -0.5), (1, 1.0)]
            .into_iter()
            .map(|(order, angle)| ShapePose {
                body: world.spawn_empty().id(),
                position: Vec2::new(100.0 + order as f32 * 40.0, 200.0),
                angle,
                scale: 0.5 + order as f32 * 0.25,
                fill: Color::srgb(0.2, 0.4, 0.6),
                order,
            })
            .collect()
    }

    #[test]
    fn pivot_is_the_extent_centre() {
        let t = shape_transform(Vec2::new(300.0, 200.0), 0.8, 1.7, extent());
        let centre = t.transform_point2(extent() / 2.0);
        assert!(centre.abs_diff_eq(Vec2::new(300.0, 200.0), 1e-4), "{centre:?}");
    }

    #[test]
    fn transform_composes_translate_rotate_scale() {
        let t = shape_transform(
            Vec2::new(10.0, 20.0),
            std::f32::consts::FRAC_PI_2,
            2.0,
            Vec2::new(4.0, 6.0),
        );
        // Path origin sits at (-2, -3) from the pivot; scaled to (-4, -6),
        // then a quarter turn maps (x, y) to (-y, x).
        let origin = t.transform_point2(Vec2::ZERO);
        assert!(origin.abs_diff_eq(Vec2::new(16.0, 16.0), 1e-4), "{origin:?}");
    }

    #[test]
    fn draws_follow_order_with_rising_depth() {
        let mut world = World::new();
        let frame = compose_frame(Color::BLACK, extent(), &poses(&mut world));
        assert_eq!(frame.draws.len(), 3);
        for pair in frame.draws.windows(2) {
            assert!(pair[0].depth < pair[1].depth);
        }
        assert_eq!(frame.draws[0].depth, 0.0);
    }

    #[test]
    fn identical_poses_compose_identical_frames() {
        let mut world = World::new();
        let poses = poses(&mut world);
        let background = Color::srgb(0.9, 0.9, 0.85);
        assert_eq!(
            compose_frame(background, extent(), &poses),
            compose_frame(background, extent(), &poses)
        );
    }

    #[test]
    fn offscreen_shapes_are_still_drawn() {
        let mut world = World::new();
        let mut poses = poses(&mut world);
        poses[0].position = Vec2::new(-5000.0, 9000.0);
        assert_eq!(compose_frame(Color::BLACK, extent(), &poses).draws.len(), 3);
    }

    #[test]
    fn world_transform_matches_canvas_to_world() {
        let viewport = Viewport::new(800.0, 600.0);
        let draw = DrawCall {
            body: World::new().spawn_empty().id(),
            transform: shape_transform(Vec2::new(100.0, 150.0), 0.4, 1.5, extent()),
            fill: Color::WHITE,
            depth: 0.25,
        };
        let t = world_transform(&viewport, &draw);
        for p in [Vec2::ZERO, extent(), Vec2::new(5.0, 30.0)] {
            let expected = viewport.to_world(draw.transform.transform_point2(p));
            let got = t.transform_point(p.extend(0.0));
            assert!(got.truncate().abs_diff_eq(expected, 1e-2), "{got:?} vs {expected:?}");
            assert!((got.z - 0.25).abs() < 1e-5);
        }
    }

    #[test]
    fn mesh_has_one_uv_and_normal_per_vertex() {
        let silhouette = Silhouette::builtin().unwrap();
        let geometry = silhouette.tessellate().unwrap();
        let mesh = silhouette_mesh(&geometry, silhouette.extent());
        assert_eq!(mesh.count_vertices(), geometry.positions.len());
        assert_eq!(mesh.indices().map(|i| i.len()), Some(geometry.indices.len()));
    }
}
