//! Collision-aware scatter of shape instances by rejection sampling.
//!
//! Every instance is approximated by a circle of diameter `ref_size · scale`.
//! A candidate position is kept only if its circle does not overlap any
//! circle already accepted; otherwise another position is drawn, up to a
//! fixed attempt budget, after which the candidate is dropped.  Dropping is
//! expected at high density and is not an error.

use crate::config::ArtConfig;
use crate::constants::MAX_INITIAL_ANGLE;
use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Composition RNG shared by placement, palette re-rolls and fill choice.
#[derive(Resource)]
pub struct ArtRng(pub StdRng);

impl ArtRng {
    /// Seeded from `config.seed`, or from OS entropy when unset.
    pub fn from_config(config: &ArtConfig) -> Self {
        match config.seed {
            Some(seed) => Self(StdRng::seed_from_u64(seed)),
            None => Self(StdRng::from_entropy()),
        }
    }
}

/// Number of instances requested for a `width × height` canvas.
pub fn target_count(width: f32, height: f32, density: f32) -> usize {
    (width * height * density).round().max(0.0) as usize
}

/// Inputs to [`place_shapes`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementParams {
    /// Canvas size; positions are drawn from `[0, w) × [0, h)`.
    pub bounds: Vec2,
    pub target: usize,
    /// Larger side of the silhouette's bounding box.
    pub ref_size: f32,
    pub min_scale: f32,
    pub max_scale: f32,
    pub max_attempts: u32,
}

impl PlacementParams {
    pub fn from_config(config: &ArtConfig, bounds: Vec2, ref_size: f32) -> Self {
        Self {
            bounds,
            target: target_count(bounds.x, bounds.y, config.density),
            ref_size,
            min_scale: config.min_scale,
            max_scale: config.max_scale,
            max_attempts: config.max_placement_attempts,
        }
    }
}

/// One accepted instance, in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub center: Vec2,
    pub scale: f32,
    /// Canvas rotation in radians, within `[-1, 1]`.
    pub angle: f32,
}

impl Placement {
    pub fn radius(&self, ref_size: f32) -> f32 {
        ref_size * self.scale / 2.0
    }
}

/// Place up to `params.target` instances.  Order of the result is acceptance
/// order, which is also the draw order.
pub fn place_shapes<R: Rng + ?Sized>(rng: &mut R, params: &PlacementParams) -> Vec<Placement> {
    let mut accepted: Vec<Placement> = Vec::with_capacity(params.target);
    if params.bounds.x <= 0.0 || params.bounds.y <= 0.0 {
        return accepted;
    }

    for _ in 0..params.target {
        let scale = if params.max_scale > params.min_scale {
            rng.gen_range(params.min_scale..=params.max_scale)
        } else {
            params.min_scale
        };
        let radius = params.ref_size * scale / 2.0;

        for _ in 0..params.max_attempts {
            let center = Vec2::new(
                rng.gen_range(0.0..params.bounds.x),
                rng.gen_range(0.0..params.bounds.y),
            );
            let clear = accepted
                .iter()
                .all(|other| center.distance(other.center) >= radius + other.radius(params.ref_size));
            if clear {
                accepted.push(Placement {
                    center,
                    scale,
                    angle: rng.gen_range(-MAX_INITIAL_ANGLE..=MAX_INITIAL_ANGLE),
                });
                break;
            }
        }
    }

    accepted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{
        MAX_PLACEMENT_ATTEMPTS, MAX_SHAPE_SCALE, MIN_SHAPE_SCALE, SHAPE_DENSITY, SILHOUETTE_HEIGHT,
    };

    fn params(w: f32, h: f32) -> PlacementParams {
        PlacementParams {
            bounds: Vec2::new(w, h),
            target: target_count(w, h, SHAPE_DENSITY),
            ref_size: SILHOUETTE_HEIGHT,
            min_scale: MIN_SHAPE_SCALE,
            max_scale: MAX_SHAPE_SCALE,
            max_attempts: MAX_PLACEMENT_ATTEMPTS,
        }
    }

    #[test]
    fn target_count_rounds_area_times_density() {
        assert_eq!(target_count(800.0, 600.0, 0.00025), 120);
        assert_eq!(target_count(1200.0, 680.0, 0.00025), 204);
        assert_eq!(target_count(10.0, 10.0, 0.00025), 0);
        assert_eq!(target_count(0.0, 600.0, 0.00025), 0);
    }

    #[test]
    fn accepted_instances_never_overlap() {
        let p = params(800.0, 600.0);
        for seed in 0..25 {
            let mut rng = StdRng::seed_from_u64(seed);
            let placed = place_shapes(&mut rng, &p);
            for (i, a) in placed.iter().enumerate() {
                for b in &placed[i + 1..] {
                    let min = a.radius(p.ref_size) + b.radius(p.ref_size);
                    assert!(
                        a.center.distance(b.center) >= min,
                        "seed {seed}: centres {:?} and {:?} closer than {min}",
                        a.center,
                        b.center
                    );
                }
            }
        }
    }

    #[test]
    fn count_never_exceeds_target() {
        let p = params(800.0, 600.0);
        assert_eq!(p.target, 120);
        for seed in 0..25 {
            let mut rng = StdRng::seed_from_u64(seed);
            let placed = place_shapes(&mut rng, &p);
            assert!(!placed.is_empty());
            assert!(placed.len() <= p.target);
        }
    }

    #[test]
    fn sampled_values_stay_in_range() {
        let p = params(800.0, 600.0);
        let mut rng = StdRng::seed_from_u64(3);
        for placement in place_shapes(&mut rng, &p) {
            assert!((0.0..800.0).contains(&placement.center.x));
            assert!((0.0..600.0).contains(&placement.center.y));
            assert!((MIN_SHAPE_SCALE..=MAX_SHAPE_SCALE).contains(&placement.scale));
            assert!((-1.0..=1.0).contains(&placement.angle));
        }
    }

    /// Compared over many seeds, not per seed: every candidate draws from one
    /// stream, so extra attempts shift all later draws and a single seed can
    /// come out either way.
    #[test]
    fn larger_attempt_budget_places_more_on_average() {
        let mut tight = params(400.0, 300.0);
        tight.target = 200;
        tight.max_attempts = 1;
        let generous = PlacementParams {
            max_attempts: 50,
            ..tight
        };
        let total = |p: &PlacementParams| -> usize {
            (0..20)
                .map(|seed| place_shapes(&mut StdRng::seed_from_u64(seed), p).len())
                .sum()
        };
        assert!(total(&generous) > total(&tight));
    }

    #[test]
    fn sparse_canvas_accepts_every_candidate() {
        let p = PlacementParams {
            bounds: Vec2::new(4000.0, 4000.0),
            target: 3,
            ref_size: 10.0,
            min_scale: 1.0,
            max_scale: 1.0,
            max_attempts: 10,
        };
        let mut rng = StdRng::seed_from_u64(11);
        assert_eq!(place_shapes(&mut rng, &p).len(), 3);
    }

    #[test]
    fn zero_attempts_or_empty_canvas_places_nothing() {
        let mut p = params(800.0, 600.0);
        p.max_attempts = 0;
        assert!(place_shapes(&mut StdRng::seed_from_u64(0), &p).is_empty());

        let mut p = params(800.0, 600.0);
        p.bounds = Vec2::new(0.0, 600.0);
        assert!(place_shapes(&mut StdRng::seed_from_u64(0), &p).is_empty());
    }

    #[test]
    fn same_seed_same_composition() {
        let p = params(640.0, 480.0);
        let a = place_shapes(&mut StdRng::seed_from_u64(42), &p);
        let b = place_shapes(&mut StdRng::seed_from_u64(42), &p);
        assert_eq!(a, b);
    }
}
