//! The stepping driver that ties the cell, the integrator and the three
//! periodic tasks together.

use crate::model::config::AppConfig;
use crate::model::factory::CellFactory;
use crate::model::integrator::Integrator;
use crate::model::recorder::Recorder;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use secretion_core::tasks::{
    ChannelOscillation, DockingReport, PeriodicTask, PhaseSwitch, SecretionCycle,
    SecretionReport, VesicleDocking,
};
use secretion_core::{Metrics, Placement, Result};
use secretion_data::{Cell, Frame, FrameStats};
use std::time::Instant;

/// What the tasks did during one tick. A field is `None` when its task was
/// off period.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepOutcome {
    pub tick: u64,
    pub phase_switch: Option<PhaseSwitch>,
    pub docking: Option<DockingReport>,
    pub secretion: Option<SecretionReport>,
}

pub struct Simulation {
    pub cell: Cell,
    pub tick: u64,
    pub metrics: Metrics,
    config: AppConfig,
    seed: u64,
    oscillation: ChannelOscillation,
    docking: VesicleDocking,
    secretion: SecretionCycle,
    integrator: Integrator,
    rng: ChaCha8Rng,
}

impl Simulation {
    /// Populates a cell from `config` and wires the tasks up.
    ///
    /// Without a configured seed the run is seeded from entropy; the seed in
    /// use is available from [`Simulation::seed`].
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let seed = config.run.seed.unwrap_or_else(rand::random);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let cell = CellFactory::new(&config).build(&mut rng)?;
        Self::assemble(config, cell, seed, rng)
    }

    /// Drives an existing cell. Every channel and vesicle in it takes part.
    pub fn with_cell(config: AppConfig, cell: Cell, seed: u64) -> anyhow::Result<Self> {
        config.validate()?;
        Self::assemble(config, cell, seed, ChaCha8Rng::seed_from_u64(seed))
    }

    fn assemble(
        config: AppConfig,
        cell: Cell,
        seed: u64,
        mut rng: ChaCha8Rng,
    ) -> anyhow::Result<Self> {
        let channels: Vec<_> = cell.channels.iter().map(|c| c.id).collect();
        let vesicles: Vec<_> = cell.vesicles.iter().map(|v| v.id).collect();
        let period = config.run.periodicity;

        let oscillation = ChannelOscillation::new(
            channels.clone(),
            config.channels.oscillation,
            config.channels.trough,
            config.channels.peak,
            period,
            ChaCha8Rng::seed_from_u64(rng.gen()),
        )?;
        let docking = VesicleDocking::new(
            vesicles.clone(),
            channels,
            config.docking.contact_range,
            config.docking.slack,
            config.secretion.ready_state,
            period,
        )?;
        let secretion = SecretionCycle::new(
            vesicles,
            cell.nucleus,
            config.secretion.ready_state,
            config.secretion.cut_off,
            period,
            Placement::new(config.secretion.max_placement_attempts),
            ChaCha8Rng::seed_from_u64(rng.gen()),
        )?;
        let integrator = Integrator::from_config(&config);

        tracing::info!(
            seed,
            fingerprint = %config.fingerprint(),
            vesicles = cell.vesicles.len(),
            channels = cell.channels.len(),
            "Simulation ready"
        );
        Ok(Self {
            cell,
            tick: 0,
            metrics: Metrics::new(),
            config,
            seed,
            oscillation,
            docking,
            secretion,
            integrator,
            rng,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn docking(&self) -> &VesicleDocking {
        &self.docking
    }

    pub fn stats(&self) -> FrameStats {
        FrameStats::capture(self.tick, &self.cell)
    }

    /// Summary plus per-vesicle state, as written by [`Simulation::run`].
    pub fn frame(&self) -> Frame {
        Frame::capture(self.tick, &self.cell)
    }

    /// Advances by one tick: move the mobile vesicles, carry the docked ones
    /// with their channels, then run channel oscillation, docking and
    /// secretion in that order. A task error stops the tick where it happened.
    pub fn step(&mut self) -> Result<StepOutcome> {
        let start = Instant::now();
        self.tick += 1;
        let tick = self.tick;

        self.integrator.advance(self.rng.gen(), &mut self.cell);
        self.docking.clusters().carry(&mut self.cell);

        let phase_switch = self.oscillation.advance(tick, &mut self.cell)?.flatten();
        if phase_switch.is_some() {
            self.metrics.record_phase_switch();
        }
        let docking = self.docking.advance(tick, &mut self.cell)?;
        if let Some(report) = &docking {
            self.metrics
                .record_docking(report.docked, report.released, report.rebuilt);
        }
        let secretion = self.secretion.advance(tick, &mut self.cell)?;
        if let Some(report) = &secretion {
            self.metrics.record_secretions(report.events.len());
        }

        let docked = self.docking.clusters().len();
        self.metrics
            .record_tick(start.elapsed(), self.cell.open_channel_count(), docked);
        Ok(StepOutcome {
            tick,
            phase_switch,
            docking,
            secretion,
        })
    }

    /// Steps `ticks` times, recording a frame every `record_interval` ticks.
    pub fn run(&mut self, ticks: u64, recorder: &mut Recorder) -> anyhow::Result<()> {
        let interval = self.config.run.record_interval;
        for _ in 0..ticks {
            self.step()?;
            if self.tick % interval == 0 {
                recorder.record(&self.frame())?;
            }
        }
        recorder.flush()?;
        Ok(())
    }
}
