//! The fixed silhouette shared by every shape instance.
//!
//! The silhouette comes from a hand-authored SVG path.  lyon parses the path
//! data, flattens it into vertex rings for the physics collider, and
//! tessellates it into triangles for the filled mesh.
//!
//! ## Coordinate spaces
//!
//! | Space       | Origin                | y axis | Used by                  |
//! |-------------|-----------------------|--------|--------------------------|
//! | Path        | top-left of extent    | down   | rings, mesh, renderer    |
//! | Body-local  | centre of extent      | up     | collider                 |

use crate::constants::{FLATTEN_TOLERANCE, SILHOUETTE_HEIGHT, SILHOUETTE_PATH, SILHOUETTE_WIDTH};
use crate::error::{ArtError, ArtResult};
use bevy::prelude::*;
use bevy_rapier2d::prelude::Collider;
use lyon::extra::parser::{ParserOptions, PathParser, Source};
use lyon::path::iterator::PathIterator;
use lyon::path::{Path, PathEvent};
use lyon::tessellation::{BuffersBuilder, FillOptions, FillTessellator, FillVertex, VertexBuffers};

/// Vertices closer than this are treated as one when closing a ring.
const RING_DEDUP_DIST: f32 = 1e-4;

/// Parse SVG path data into a lyon [`Path`].
///
/// Returns [`ArtError::EmptyOutline`] when the data holds no drawing segment.
pub fn parse_path_data(data: &str) -> ArtResult<Path> {
    let mut builder = Path::builder_with_attributes(0);
    PathParser::new()
        .parse(
            &ParserOptions::DEFAULT,
            &mut Source::new(data.chars()),
            &mut builder,
        )
        .map_err(|e| ArtError::PathSyntax(e.to_string()))?;
    let path = builder.build();

    let drawable = path
        .iter()
        .any(|event| !matches!(event, PathEvent::Begin { .. } | PathEvent::End { .. }));
    if !drawable {
        return Err(ArtError::EmptyOutline);
    }
    Ok(path)
}

// ── Silhouette ────────────────────────────────────────────────────────────────

/// Triangulated fill of the silhouette in path coordinates.
#[derive(Debug, Clone, Default)]
pub struct SilhouetteGeometry {
    pub positions: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

/// The parsed, flattened silhouette.
#[derive(Resource, Debug, Clone)]
pub struct Silhouette {
    path: Path,
    /// One closed vertex ring per sub-path, in path coordinates.
    rings: Vec<Vec<Vec2>>,
    /// Fixed bounding size the renderer pivots around.
    extent: Vec2,
}

impl Silhouette {
    /// Parse and flatten `data`.  `extent` is the authored bounding size.
    pub fn from_path_data(data: &str, extent: Vec2) -> ArtResult<Self> {
        let path = parse_path_data(data)?;
        let rings = flatten_rings(&path)?;
        Ok(Self {
            path,
            rings,
            extent,
        })
    }

    /// The built-in silhouette.
    pub fn builtin() -> ArtResult<Self> {
        Self::from_path_data(
            SILHOUETTE_PATH,
            Vec2::new(SILHOUETTE_WIDTH, SILHOUETTE_HEIGHT),
        )
    }

    pub fn rings(&self) -> &[Vec<Vec2>] {
        &self.rings
    }

    pub fn extent(&self) -> Vec2 {
        self.extent
    }

    /// The larger side of the extent; placement spacing scales with it.
    pub fn ref_size(&self) -> f32 {
        self.extent.x.max(self.extent.y)
    }

    /// Axis-aligned bounds of the flattened rings in path coordinates.
    pub fn bounds(&self) -> Rect {
        let mut min = Vec2::splat(f32::INFINITY);
        let mut max = Vec2::splat(f32::NEG_INFINITY);
        for v in self.rings.iter().flatten() {
            min = min.min(*v);
            max = max.max(*v);
        }
        Rect::from_corners(min, max)
    }

    /// Rings in body-local space: centred on the extent centre, y up, and
    /// multiplied by `scale`.
    pub fn body_outline(&self, scale: f32) -> Vec<Vec<Vec2>> {
        let half = self.extent / 2.0;
        self.rings
            .iter()
            .map(|ring| {
                ring.iter()
                    .map(|v| Vec2::new(v.x - half.x, half.y - v.y) * scale)
                    .collect()
            })
            .collect()
    }

    /// Collider for one instance.  Each ring is a concave polyline, so it is
    /// decomposed into convex parts.
    pub fn collider(&self, scale: f32) -> Collider {
        let mut parts: Vec<Collider> = self
            .body_outline(scale)
            .iter()
            .map(|ring| Collider::convex_decomposition(ring, &ring_indices(ring.len())))
            .collect();
        if parts.len() == 1 {
            if let Some(part) = parts.pop() {
                return part;
            }
        }
        Collider::compound(
            parts
                .into_iter()
                .map(|part| (Vec2::ZERO, 0.0, part))
                .collect(),
        )
    }

    /// Triangulate the silhouette fill with lyon.
    pub fn tessellate(&self) -> ArtResult<SilhouetteGeometry> {
        let mut buffers: VertexBuffers<[f32; 2], u32> = VertexBuffers::new();
        FillTessellator::new()
            .tessellate_path(
                &self.path,
                &FillOptions::tolerance(FLATTEN_TOLERANCE),
                &mut BuffersBuilder::new(&mut buffers, |vertex: FillVertex| {
                    vertex.position().to_array()
                }),
            )
            .map_err(|e| ArtError::Tessellation(format!("{e:?}")))?;
        Ok(SilhouetteGeometry {
            positions: buffers.vertices,
            indices: buffers.indices,
        })
    }
}

/// Segment index pairs closing a ring of `len` vertices.
fn ring_indices(len: usize) -> Vec<[u32; 2]> {
    let n = len as u32;
    (0..n).map(|i| [i, (i + 1) % n]).collect()
}

fn flatten_rings(path: &Path) -> ArtResult<Vec<Vec<Vec2>>> {
    let mut rings = Vec::new();
    let mut current: Vec<Vec2> = Vec::new();

    for event in path.iter().flattened(FLATTEN_TOLERANCE) {
        match event {
            PathEvent::Begin { at } => {
                current.clear();
                current.push(Vec2::new(at.x, at.y));
            }
            PathEvent::Line { to, .. } => current.push(Vec2::new(to.x, to.y)),
            PathEvent::End { .. } => {
                let ring = dedup_ring(std::mem::take(&mut current));
                if ring.len() < 3 {
                    return Err(ArtError::DegenerateRing {
                        vertices: ring.len(),
                    });
                }
                rings.push(ring);
            }
            _ => {}
        }
    }

    if rings.is_empty() {
        return Err(ArtError::EmptyOutline);
    }
    Ok(rings)
}

/// Drop consecutive duplicates and a closing vertex that repeats the first.
fn dedup_ring(raw: Vec<Vec2>) -> Vec<Vec2> {
    let mut ring: Vec<Vec2> = Vec::with_capacity(raw.len());
    for v in raw {
        if ring
            .last()
            .is_none_or(|last| last.distance(v) > RING_DEDUP_DIST)
        {
            ring.push(v);
        }
    }
    while ring.len() > 1 && ring[0].distance(ring[ring.len() - 1]) <= RING_DEDUP_DIST {
        ring.pop();
    }
    ring
}
