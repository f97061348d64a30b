//! Overdamped motion of the mobile vesicles.
//!
//! Each tick a mobile vesicle draws a uniform displacement of at most `step`
//! per axis and drifts down the gradient of the configured potentials. The
//! drift is capped at `step` so a stiff potential cannot throw a vesicle
//! across the cell. A move that would leave the cytoplasm, or overlap another
//! vesicle, is rejected and the vesicle stays where it was.

use crate::model::config::AppConfig;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use secretion_core::potential::{PeripheralPull, RadialDistributionPotential, SingletonScore};
use secretion_core::proximity::UniformGrid;
use secretion_data::{Body, Cell, DVec3, Sphere};

pub struct Integrator {
    step: f64,
    mobility: f64,
    potentials: Vec<Box<dyn SingletonScore>>,
}

impl Integrator {
    pub fn new(step: f64, mobility: f64) -> Self {
        Self {
            step,
            mobility,
            potentials: Vec::new(),
        }
    }

    /// Integrator with the potentials whose strength is non-zero in `config`.
    pub fn from_config(config: &AppConfig) -> Self {
        let mut integrator = Self::new(config.vesicles.step, config.vesicles.mobility);
        let p = &config.potentials;
        if p.k_traffic != 0.0 {
            integrator = integrator.with_potential(PeripheralPull::new(DVec3::ZERO, p.k_traffic));
        }
        if p.k_rdf != 0.0 {
            integrator = integrator.with_potential(RadialDistributionPotential::new(
                Sphere::new(DVec3::ZERO, config.cell.radius),
                Sphere::new(DVec3::ZERO, config.cell.nucleus_radius),
                p.rdf_coefficients,
                p.k_rdf,
            ));
        }
        integrator
    }

    pub fn with_potential<S: SingletonScore + 'static>(mut self, score: S) -> Self {
        self.potentials.push(Box::new(score));
        self
    }

    pub fn potential_count(&self) -> usize {
        self.potentials.len()
    }

    /// Total potential energy of `body` and its gradient.
    pub fn energy(&self, body: &Body) -> (f64, DVec3) {
        let mut gradient = DVec3::ZERO;
        let energy = self
            .potentials
            .iter()
            .map(|p| p.score(body, Some(&mut gradient)))
            .sum();
        (energy, gradient)
    }

    /// Largest distance a vesicle can cover in one move.
    fn reach(&self) -> f64 {
        self.step * (1.0 + 3f64.sqrt())
    }

    /// Moves every mobile vesicle once. Proposals are drawn in parallel, each
    /// vesicle on its own stream of a generator seeded with `seed`; they are
    /// then accepted in index order against the current positions of all
    /// other vesicles, so the result does not depend on scheduling. Returns
    /// the number of accepted moves.
    pub fn advance(&self, seed: u64, cell: &mut Cell) -> usize {
        let boundary = cell.boundary;
        let nucleus = cell.nucleus;
        let proposals: Vec<Option<DVec3>> = cell
            .vesicles
            .par_iter()
            .enumerate()
            .map(|(i, v)| {
                if !v.body.mobile {
                    return None;
                }
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                rng.set_stream(i as u64);
                let target = self.propose(&mut rng, &v.body);
                let inside = target.distance(nucleus.center) > nucleus.radius + v.body.radius
                    && target.distance(boundary.center) < boundary.radius - v.body.radius;
                inside.then_some(target)
            })
            .collect();

        // Every accepted target is within `reach` of a grid position, so a
        // cell edge of two radii plus `reach` sees every possible overlap.
        let max_radius = cell
            .vesicles
            .iter()
            .map(|v| v.body.radius)
            .fold(0.0_f64, f64::max);
        let positions: Vec<DVec3> = cell.vesicles.iter().map(|v| v.body.position).collect();
        let grid = UniformGrid::build(&positions, 2.0 * max_radius + self.reach());

        let mut moved = 0;
        for (i, target) in proposals.into_iter().enumerate() {
            let Some(target) = target else {
                continue;
            };
            let radius = cell.vesicles[i].body.radius;
            let mut blocked = false;
            grid.query_neighbors(target, |j| {
                if j != i {
                    let other = &cell.vesicles[j].body;
                    blocked |= target.distance(other.position) <= radius + other.radius;
                }
            });
            if !blocked {
                cell.vesicles[i].body.position = target;
                moved += 1;
            }
        }
        moved
    }

    fn propose<R: Rng>(&self, rng: &mut R, body: &Body) -> DVec3 {
        let noise = if self.step > 0.0 {
            DVec3::new(
                rng.gen_range(-self.step..=self.step),
                rng.gen_range(-self.step..=self.step),
                rng.gen_range(-self.step..=self.step),
            )
        } else {
            DVec3::ZERO
        };
        let (_, gradient) = self.energy(body);
        let drift = (-self.mobility * gradient).clamp_length_max(self.step);
        body.position + noise + drift
    }
}
