//! Population-level oscillation of Ca2+ channel opening.
//!
//! Closed channels age by one per update. Once any closed channel has reached
//! the `oscillation` age, the population switches phase: every channel is
//! reset to closed age 0 and a contiguous, randomly placed window of channels
//! is opened. The window is `troughn` channels wide when leaving the peak and
//! `peakn` wide when leaving the trough.

use super::{check_period, PeriodicTask};
use crate::error::{Result, SimError};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use secretion_data::{Cell, ChannelState, EntityId, EntityRef};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Trough,
    Peak,
}

/// Outcome of an update that switched phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseSwitch {
    /// Phase the population entered.
    pub phase: Phase,
    /// Position in the channel list of the first opened channel.
    pub window_start: usize,
    /// Channels now open.
    pub open: usize,
}

pub struct ChannelOscillation {
    channels: Vec<EntityId>,
    oscillation: u32,
    trough: usize,
    peak: usize,
    periodicity: u64,
    rng: ChaCha8Rng,
}

impl ChannelOscillation {
    pub fn new(
        channels: Vec<EntityId>,
        oscillation: u32,
        trough: usize,
        peak: usize,
        periodicity: u64,
        rng: ChaCha8Rng,
    ) -> Result<Self> {
        let periodicity = check_period(periodicity)?;
        if trough > channels.len() || peak > channels.len() {
            return Err(SimError::invalid(format!(
                "phase sizes trough={trough}, peak={peak} exceed {} channels",
                channels.len()
            )));
        }
        Ok(Self {
            channels,
            oscillation,
            trough,
            peak,
            periodicity,
            rng,
        })
    }

    pub fn channels(&self) -> &[EntityId] {
        &self.channels
    }

    fn switch_to(&mut self, cell: &mut Cell, phase: Phase, width: usize) -> PhaseSwitch {
        let total = self.channels.len();
        let window_start = if total > width && width > 0 {
            self.rng.gen_range(0..=total - width)
        } else {
            0
        };
        for (pos, &id) in self.channels.iter().enumerate() {
            if let Some(ch) = cell.channel_mut(id) {
                ch.state = if (window_start..window_start + width).contains(&pos) {
                    ChannelState::Open
                } else {
                    ChannelState::Closed(0)
                };
            }
        }
        PhaseSwitch {
            phase,
            window_start,
            open: width,
        }
    }
}

impl PeriodicTask for ChannelOscillation {
    type Report = Option<PhaseSwitch>;

    fn period(&self) -> u64 {
        self.periodicity
    }

    fn update(&mut self, cell: &mut Cell) -> Result<Option<PhaseSwitch>> {
        if let Some(&missing) = self.channels.iter().find(|&&id| cell.channel(id).is_none()) {
            return Err(SimError::UnknownEntity(EntityRef::Channel(missing)));
        }

        let mut open = 0;
        let mut ready = false;
        for &id in &self.channels {
            let Some(ch) = cell.channel_mut(id) else {
                continue;
            };
            match ch.state {
                ChannelState::Open => open += 1,
                ChannelState::Closed(age) if age == self.oscillation => ready = true,
                ChannelState::Closed(age) => {
                    ch.state = ChannelState::Closed(age.saturating_add(1));
                }
            }
        }
        tracing::debug!(open, ready, "Channel oscillation scan");

        if !ready {
            return Ok(None);
        }

        let switch = if open == self.peak {
            self.switch_to(cell, Phase::Trough, self.trough)
        } else if open == self.trough {
            self.switch_to(cell, Phase::Peak, self.peak)
        } else {
            tracing::error!(
                open,
                trough = self.trough,
                peak = self.peak,
                "Incorrect number of Ca2+ channels in the open state"
            );
            return Err(SimError::OpenChannelMismatch {
                open,
                trough: self.trough,
                peak: self.peak,
            });
        };

        tracing::info!(
            phase = ?switch.phase,
            window_start = switch.window_start,
            open = switch.open,
            "Ca2+ channel phase switch"
        );
        Ok(Some(switch))
    }
}
