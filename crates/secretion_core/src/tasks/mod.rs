//! The three periodic tasks that drive channel gating and the vesicle cycle.
//!
//! The driver calls [`PeriodicTask::advance`] once per tick, always in the
//! order channel oscillation, docking, secretion. A task only does work on
//! ticks that are multiples of its period, and each update runs to completion
//! before the next task starts.

pub mod docking;
pub mod oscillation;
pub mod secretion;

pub use docking::{DockingReport, VesicleDocking};
pub use oscillation::{ChannelOscillation, Phase, PhaseSwitch};
pub use secretion::{SecretionCycle, SecretionEvent, SecretionReport};

use crate::error::{Result, SimError};
use secretion_data::Cell;

pub trait PeriodicTask {
    type Report;

    /// Ticks between two updates; at least 1.
    fn period(&self) -> u64;

    /// Runs one update unconditionally.
    fn update(&mut self, cell: &mut Cell) -> Result<Self::Report>;

    /// Runs [`Self::update`] if `tick` is a multiple of the period.
    fn advance(&mut self, tick: u64, cell: &mut Cell) -> Result<Option<Self::Report>> {
        if tick % self.period() != 0 {
            return Ok(None);
        }
        self.update(cell).map(Some)
    }
}

pub(crate) fn check_period(periodicity: u64) -> Result<u64> {
    if periodicity == 0 {
        return Err(SimError::invalid("periodicity must be at least 1"));
    }
    Ok(periodicity)
}
