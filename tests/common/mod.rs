pub mod macros;

use secretion_data::{Body, Cell, ChannelState, DVec3, DockingState, Sphere};
use secretion_lib::model::config::AppConfig;

/// Builds small hand-placed cells for scenario tests.
#[allow(dead_code)]
pub struct CellBuilder {
    cell: Cell,
}

#[allow(dead_code)]
impl CellBuilder {
    /// A cell of radius 1000 Å around a nucleus of 400 Å.
    pub fn new() -> Self {
        Self::with_geometry(1000.0, 400.0)
    }

    pub fn from_cell(cell: Cell) -> Self {
        Self { cell }
    }

    pub fn with_geometry(radius: f64, nucleus_radius: f64) -> Self {
        Self {
            cell: Cell::new(
                Sphere::new(DVec3::ZERO, radius),
                Sphere::new(DVec3::ZERO, nucleus_radius),
            ),
        }
    }

    /// One channel on the membrane per state, spaced along the equator.
    pub fn with_channels(mut self, states: &[ChannelState]) -> Self {
        let n = states.len().max(1) as f64;
        let radius = self.cell.boundary.radius;
        for (i, &state) in states.iter().enumerate() {
            let angle = std::f64::consts::TAU * i as f64 / n;
            let mut body = Body::new(
                DVec3::new(radius * angle.cos(), radius * angle.sin(), 0.0),
                10.0,
            );
            body.mobile = false;
            self.cell.add_channel(body, state);
        }
        self
    }

    /// `total` channels of which the first `open` are open.
    pub fn with_population(self, total: usize, open: usize) -> Self {
        let states: Vec<ChannelState> = (0..total)
            .map(|i| {
                if i < open {
                    ChannelState::Open
                } else {
                    ChannelState::Closed(0)
                }
            })
            .collect();
        self.with_channels(&states)
    }

    pub fn with_vesicle(mut self, position: DVec3, radius: f64) -> Self {
        self.cell.add_vesicle(Body::new(position, radius));
        self
    }

    /// A vesicle whose surface is `gap` Å from the surface of channel `index`,
    /// on the inner side of the membrane.
    pub fn with_vesicle_at_channel(self, index: usize, radius: f64, gap: f64) -> Self {
        let channel = &self.cell.channels[index].body;
        let inward = -channel.position.normalize();
        let position = channel.position + inward * (channel.radius + radius + gap);
        self.with_vesicle(position, radius)
    }

    pub fn with_docking(mut self, vesicle: usize, state: DockingState) -> Self {
        self.cell.vesicles[vesicle].docking = state;
        self
    }

    pub fn build(self) -> Cell {
        self.cell
    }
}

/// Configuration for a fast run: a small cell, few entities, short period.
#[allow(dead_code)]
pub fn small_config(seed: u64) -> AppConfig {
    let mut config = AppConfig::default();
    config.cell.radius = 4000.0;
    config.cell.nucleus_radius = 2000.0;
    config.vesicles.count = 40;
    config.vesicles.radius = 120.0;
    config.vesicles.step = 60.0;
    config.channels.count = 60;
    config.channels.radius = 100.0;
    config.channels.trough = 3;
    config.channels.peak = 45;
    config.channels.oscillation = 8;
    config.docking.contact_range = 100.0;
    config.secretion.ready_state = 4;
    config.secretion.cut_off = 600.0;
    config.run.periodicity = 2;
    config.run.record_interval = 4;
    config.run.seed = Some(seed);
    config
}

/// Configuration matching a hand-built cell: no motion and no potentials,
/// so only the tasks change state.
#[allow(dead_code)]
pub fn frozen_config(cell: &Cell, trough: usize, peak: usize, ready_state: u32) -> AppConfig {
    let mut config = AppConfig::default();
    config.cell.radius = cell.boundary.radius;
    config.cell.nucleus_radius = cell.nucleus.radius;
    config.vesicles.count = cell.vesicles.len();
    config.vesicles.radius = cell.vesicles.first().map_or(10.0, |v| v.body.radius);
    config.vesicles.step = 0.0;
    config.channels.count = cell.channels.len();
    config.channels.trough = trough;
    config.channels.peak = peak;
    config.channels.oscillation = 1_000;
    config.secretion.ready_state = ready_state;
    config.secretion.cut_off = (cell.boundary.radius - cell.nucleus.radius) / 3.0;
    config.run.periodicity = 1;
    config.run.record_interval = 1;
    config
}
