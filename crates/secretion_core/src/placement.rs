//! Rejection-sampling placement of vesicles near the nucleus.

use crate::error::{Result, SimError};
use glam::DVec3;
use rand::Rng;
use secretion_data::{EntityId, EntityRef, Sphere, Vesicle};

/// Attempts above which a placement is logged as slow.
const SLOW_PLACEMENT_ATTEMPTS: usize = 1000;

/// Uniform random point inside `sphere`, by rejection from the bounding cube.
pub fn random_point_in_sphere<R: Rng + ?Sized>(rng: &mut R, sphere: &Sphere) -> DVec3 {
    loop {
        let u = DVec3::new(
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
        );
        if u.length_squared() <= 1.0 {
            return sphere.center + u * sphere.radius;
        }
    }
}

/// A successful placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placed {
    pub position: DVec3,
    /// Candidate points drawn, including the accepted one.
    pub attempts: usize,
}

/// Bounded retry policy for repositioning a vesicle after secretion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub max_attempts: usize,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            max_attempts: 10_000,
        }
    }
}

impl Placement {
    pub fn new(max_attempts: usize) -> Self {
        Self { max_attempts }
    }

    /// Finds a position for `vesicle` within `cut_off` of the nucleus surface
    /// that is strictly outside the nucleus (with clearance for the vesicle's
    /// radius) and overlaps no other vesicle in `vesicles`.
    pub fn place<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        nucleus: &Sphere,
        cut_off: f64,
        vesicle: EntityId,
        vesicles: &[Vesicle],
    ) -> Result<Placed> {
        let radius = vesicles
            .get(vesicle.index())
            .map(|v| v.body.radius)
            .ok_or(SimError::UnknownEntity(EntityRef::Vesicle(vesicle)))?;
        let target = Sphere::new(nucleus.center, nucleus.radius + cut_off - radius);
        let clearance = nucleus.radius + radius;

        if target.radius <= clearance {
            return Err(SimError::PlacementExhausted {
                vesicle,
                attempts: 0,
            });
        }

        for attempt in 1..=self.max_attempts {
            let candidate = random_point_in_sphere(rng, &target);
            if candidate.distance(nucleus.center) <= clearance {
                continue;
            }
            let overlaps = vesicles.iter().any(|w| {
                w.id != vesicle && candidate.distance(w.body.position) <= radius + w.body.radius
            });
            if overlaps {
                continue;
            }
            if attempt > SLOW_PLACEMENT_ATTEMPTS {
                tracing::warn!(
                    vesicle = vesicle.0,
                    attempts = attempt,
                    "Slow vesicle placement, cytoplasm near nucleus is crowded"
                );
            }
            return Ok(Placed {
                position: candidate,
                attempts: attempt,
            });
        }

        Err(SimError::PlacementExhausted {
            vesicle,
            attempts: self.max_attempts,
        })
    }
}
