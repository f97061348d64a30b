//! Rigid clusters: vesicles carried by a channel as one unit.
//!
//! Membership is indexed by vesicle, so membership tests and exclusivity
//! checks are O(1). Each channel keeps its members in docking order.

use glam::DVec3;
use secretion_data::{Cell, EntityId};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Membership {
    channel: EntityId,
    /// Vesicle position relative to the channel at docking time.
    offset: DVec3,
}

#[derive(Debug, Clone, Default)]
pub struct RigidClusters {
    by_vesicle: HashMap<EntityId, Membership>,
    members: HashMap<EntityId, Vec<EntityId>>,
}

impl RigidClusters {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_member(&self, channel: EntityId, vesicle: EntityId) -> bool {
        self.by_vesicle
            .get(&vesicle)
            .is_some_and(|m| m.channel == channel)
    }

    #[inline]
    pub fn cluster_of(&self, vesicle: EntityId) -> Option<EntityId> {
        self.by_vesicle.get(&vesicle).map(|m| m.channel)
    }

    pub fn members(&self, channel: EntityId) -> &[EntityId] {
        self.members.get(&channel).map_or(&[], Vec::as_slice)
    }

    /// `(vesicle, channel)` for every grouped vesicle, in no particular order.
    pub fn memberships(&self) -> impl Iterator<Item = (EntityId, EntityId)> + '_ {
        self.by_vesicle.iter().map(|(&v, m)| (v, m.channel))
    }

    /// Number of grouped vesicles over all channels.
    pub fn len(&self) -> usize {
        self.by_vesicle.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_vesicle.is_empty()
    }

    /// Adds `vesicle` to `channel`'s cluster. Returns `false`, changing
    /// nothing, if the vesicle already belongs to any cluster.
    pub fn group(&mut self, channel: EntityId, vesicle: EntityId, offset: DVec3) -> bool {
        if self.by_vesicle.contains_key(&vesicle) {
            return false;
        }
        self.by_vesicle.insert(vesicle, Membership { channel, offset });
        self.members.entry(channel).or_default().push(vesicle);
        true
    }

    /// Removes `vesicle` from `channel`'s cluster. Returns `false` if it was
    /// not a member of that channel.
    pub fn ungroup(&mut self, channel: EntityId, vesicle: EntityId) -> bool {
        if !self.is_member(channel, vesicle) {
            return false;
        }
        self.by_vesicle.remove(&vesicle);
        if let Some(list) = self.members.get_mut(&channel) {
            list.retain(|&v| v != vesicle);
            if list.is_empty() {
                self.members.remove(&channel);
            }
        }
        true
    }

    /// Moves every member to its channel's position plus its docking offset.
    pub fn carry(&self, cell: &mut Cell) {
        for (&vesicle, m) in &self.by_vesicle {
            let Some(anchor) = cell.channel(m.channel).map(|c| c.body.position) else {
                continue;
            };
            if let Some(v) = cell.vesicle_mut(vesicle) {
                v.body.position = anchor + m.offset;
            }
        }
    }

    /// Radius around the channel center that covers the channel and all of its
    /// members. Derived on demand; the channel's own radius is never changed
    /// by grouping.
    pub fn envelope_radius(&self, channel: EntityId, cell: &Cell) -> Option<f64> {
        let anchor = cell.channel(channel)?;
        let center = anchor.body.position;
        let radius = self
            .members(channel)
            .iter()
            .filter_map(|&v| cell.vesicle(v))
            .map(|v| v.body.position.distance(center) + v.body.radius)
            .fold(anchor.body.radius, f64::max);
        Some(radius)
    }
}
