//! Initial population of a cell from the configuration.

use crate::model::config::AppConfig;
use rand::seq::SliceRandom;
use rand::Rng;
use secretion_core::placement::random_point_in_sphere;
use secretion_core::{Result, SimError};
use secretion_data::{Body, Cell, ChannelState, DVec3, EntityId, Sphere};

/// Points spread evenly over the surface of `sphere` along a golden spiral.
pub fn surface_cover(sphere: &Sphere, n: usize) -> Vec<DVec3> {
    let golden_angle = std::f64::consts::PI * (3.0 - 5f64.sqrt());
    (0..n)
        .map(|i| {
            let y = 1.0 - 2.0 * (i as f64 + 0.5) / n as f64;
            let ring = (1.0 - y * y).max(0.0).sqrt();
            let phi = golden_angle * i as f64;
            sphere.center + sphere.radius * DVec3::new(ring * phi.cos(), y, ring * phi.sin())
        })
        .collect()
}

fn out_of_ids(kind: &str, index: usize) -> SimError {
    SimError::invalid(format!("{kind} #{index} is past the entity id range"))
}

pub struct CellFactory<'a> {
    config: &'a AppConfig,
}

impl<'a> CellFactory<'a> {
    pub fn new(config: &'a AppConfig) -> Self {
        Self { config }
    }

    /// Builds a cell with vesicles scattered through the cytoplasm and
    /// channels covering the membrane. The first `trough` channels of the
    /// shuffled cover start open.
    pub fn build<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Cell> {
        let cfg = self.config;
        let boundary = Sphere::new(DVec3::ZERO, cfg.cell.radius);
        let nucleus = Sphere::new(DVec3::ZERO, cfg.cell.nucleus_radius);
        let mut cell = Cell::new(boundary, nucleus);

        let rv = cfg.vesicles.radius;
        let interior = Sphere::new(boundary.center, boundary.radius - rv);
        let clearance = nucleus.radius + rv;
        for i in 0..cfg.vesicles.count {
            let next = EntityId::try_from(i).map_err(|_| out_of_ids("vesicle", i))?;
            let position = self.scatter(rng, &interior, clearance, &cell, next)?;
            cell.add_vesicle(Body::new(position, rv))
                .ok_or_else(|| out_of_ids("vesicle", i))?;
        }

        let mut cover = surface_cover(&boundary, cfg.channels.count);
        cover.shuffle(rng);
        for (i, position) in cover.into_iter().enumerate() {
            let state = if i < cfg.channels.trough {
                ChannelState::Open
            } else {
                ChannelState::Closed(0)
            };
            let mut body = Body::new(position, cfg.channels.radius);
            body.mobile = false;
            cell.add_channel(body, state)
                .ok_or_else(|| out_of_ids("channel", i))?;
        }

        tracing::info!(
            vesicles = cell.vesicles.len(),
            channels = cell.channels.len(),
            open = cell.open_channel_count(),
            "Cell populated"
        );
        Ok(cell)
    }

    fn scatter<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        interior: &Sphere,
        clearance: f64,
        cell: &Cell,
        next: EntityId,
    ) -> Result<DVec3> {
        let rv = self.config.vesicles.radius;
        let max_attempts = self.config.secretion.max_placement_attempts;
        for _ in 0..max_attempts {
            let candidate = random_point_in_sphere(rng, interior);
            if candidate.distance(cell.nucleus.center) <= clearance {
                continue;
            }
            if cell
                .vesicles
                .iter()
                .all(|w| candidate.distance(w.body.position) > rv + w.body.radius)
            {
                return Ok(candidate);
            }
        }
        Err(SimError::PlacementExhausted {
            vesicle: next,
            attempts: max_attempts,
        })
    }
}
