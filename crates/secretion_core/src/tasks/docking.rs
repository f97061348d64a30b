//! Docking of vesicles to open Ca2+ channels.
//!
//! Every update refreshes the vesicle/channel close-pair list and walks it
//! once. An undocked vesicle close to an open channel joins that channel's
//! rigid cluster and is flagged as just docked; a member whose countdown has
//! reached `ready_state` leaves the cluster again, whether or not its pair is
//! still in the list. Advancing the docking state past the flag is the
//! secretion cycle's job.

use super::{check_period, PeriodicTask};
use crate::cluster::RigidClusters;
use crate::error::{Result, SimError};
use crate::proximity::ClosePairIndex;
use glam::DVec3;
use secretion_data::{Cell, DockingState, EntityId, EntityRef};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DockingReport {
    pub docked: usize,
    pub released: usize,
    /// Whether the close-pair list had to be rebuilt this update.
    pub rebuilt: bool,
    pub close_pairs: usize,
}

pub struct VesicleDocking {
    vesicles: Vec<EntityId>,
    channels: Vec<EntityId>,
    index: ClosePairIndex,
    clusters: RigidClusters,
    ready_state: u32,
    periodicity: u64,
    vesicle_spheres: Vec<(DVec3, f64)>,
    channel_spheres: Vec<(DVec3, f64)>,
}

impl VesicleDocking {
    /// `contact_range` is the surface distance (Å) under which a vesicle can
    /// dock; `slack` trades a longer pair list for fewer rebuilds.
    pub fn new(
        vesicles: Vec<EntityId>,
        channels: Vec<EntityId>,
        contact_range: f64,
        slack: f64,
        ready_state: u32,
        periodicity: u64,
    ) -> Result<Self> {
        let periodicity = check_period(periodicity)?;
        if !(contact_range.is_finite() && contact_range >= 0.0) {
            return Err(SimError::invalid("contact_range must be a non-negative distance"));
        }
        if !(slack.is_finite() && slack >= 0.0) {
            return Err(SimError::invalid("slack must be a non-negative distance"));
        }
        if ready_state == 0 {
            return Err(SimError::invalid("ready_state must be at least 1"));
        }
        Ok(Self {
            vesicle_spheres: Vec::with_capacity(vesicles.len()),
            channel_spheres: Vec::with_capacity(channels.len()),
            vesicles,
            channels,
            index: ClosePairIndex::new(contact_range, slack),
            clusters: RigidClusters::new(),
            ready_state,
            periodicity,
        })
    }

    pub fn clusters(&self) -> &RigidClusters {
        &self.clusters
    }

    pub fn index(&self) -> &ClosePairIndex {
        &self.index
    }

    fn gather(&mut self, cell: &Cell) -> Result<()> {
        self.vesicle_spheres.clear();
        for &id in &self.vesicles {
            let v = cell
                .vesicle(id)
                .ok_or(SimError::UnknownEntity(EntityRef::Vesicle(id)))?;
            self.vesicle_spheres.push((v.body.position, v.body.radius));
        }
        self.channel_spheres.clear();
        for &id in &self.channels {
            let c = cell
                .channel(id)
                .ok_or(SimError::UnknownEntity(EntityRef::Channel(id)))?;
            self.channel_spheres.push((c.body.position, c.body.radius));
        }
        Ok(())
    }
}

impl PeriodicTask for VesicleDocking {
    type Report = DockingReport;

    fn period(&self) -> u64 {
        self.periodicity
    }

    fn update(&mut self, cell: &mut Cell) -> Result<DockingReport> {
        self.gather(cell)?;
        let rebuilt = self
            .index
            .refresh(&self.vesicle_spheres, &self.channel_spheres);

        let mut report = DockingReport {
            rebuilt,
            close_pairs: self.index.len(),
            ..DockingReport::default()
        };
        let ready = DockingState::Countdown(self.ready_state);

        for &(vi, ci) in self.index.pairs() {
            let (v_id, c_id) = (self.vesicles[vi], self.channels[ci]);
            let Some(channel) = cell.channel(c_id) else {
                continue;
            };
            let (anchor, open) = (channel.body.position, channel.state.is_open());
            let Some(vesicle) = cell.vesicle_mut(v_id) else {
                continue;
            };

            if self.clusters.is_member(c_id, v_id) {
                if vesicle.docking == ready && self.clusters.ungroup(c_id, v_id) {
                    vesicle.body.mobile = true;
                    report.released += 1;
                    tracing::debug!(vesicle = v_id.0, channel = c_id.0, "Vesicle released");
                }
            } else if vesicle.docking == DockingState::Undocked
                && open
                && self.clusters.group(c_id, v_id, vesicle.body.position - anchor)
            {
                vesicle.body.mobile = false;
                vesicle.docking = DockingState::JustDocked;
                report.docked += 1;
                tracing::debug!(vesicle = v_id.0, channel = c_id.0, "Vesicle docked");
            }
        }

        // A member can dock against positions up to `slack` old and then drop
        // out of the list on the next rebuild. It still has to be released
        // before the secretion cycle resets it.
        let mut overdue: Vec<(EntityId, EntityId)> = self
            .clusters
            .memberships()
            .filter(|&(v_id, _)| cell.vesicle(v_id).is_some_and(|v| v.docking == ready))
            .collect();
        overdue.sort_unstable();
        for (v_id, c_id) in overdue {
            if !self.clusters.ungroup(c_id, v_id) {
                continue;
            }
            if let Some(vesicle) = cell.vesicle_mut(v_id) {
                vesicle.body.mobile = true;
            }
            report.released += 1;
            tracing::debug!(
                vesicle = v_id.0,
                channel = c_id.0,
                "Vesicle released outside the close pair list"
            );
        }

        tracing::debug!(
            docked = report.docked,
            released = report.released,
            pairs = report.close_pairs,
            rebuilt = report.rebuilt,
            "Vesicle docking update"
        );
        Ok(report)
    }
}
