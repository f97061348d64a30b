use super::entity::{AttributeKey, Body, CaChannel, ChannelState, DockingState, EntityId, Vesicle};
use super::geometry::Sphere;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to an entity in one of the cell's two tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityRef {
    Channel(EntityId),
    Vesicle(EntityId),
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Channel(id) => write!(f, "channel {id}"),
            Self::Vesicle(id) => write!(f, "vesicle {id}"),
        }
    }
}

/// The simulated cell: boundary, nucleus and the entity tables.
///
/// Entities are created before any task runs and are never removed by the
/// core; ids are positions in `channels` / `vesicles`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    pub boundary: Sphere,
    pub nucleus: Sphere,
    pub channels: Vec<CaChannel>,
    pub vesicles: Vec<Vesicle>,
}

impl Cell {
    pub fn new(boundary: Sphere, nucleus: Sphere) -> Self {
        Self {
            boundary,
            nucleus,
            channels: Vec::new(),
            vesicles: Vec::new(),
        }
    }

    /// Appends a channel. Returns `None`, leaving the table unchanged, once
    /// the table holds `u32::MAX + 1` channels and no id is left.
    pub fn add_channel(&mut self, body: Body, state: ChannelState) -> Option<EntityId> {
        let id = EntityId::try_from(self.channels.len()).ok()?;
        let mut channel = CaChannel::new(id, body.position, body.radius, state);
        channel.body.mobile = body.mobile;
        self.channels.push(channel);
        Some(id)
    }

    /// Appends a vesicle; `None` when the id range is exhausted.
    pub fn add_vesicle(&mut self, body: Body) -> Option<EntityId> {
        let id = EntityId::try_from(self.vesicles.len()).ok()?;
        let mut vesicle = Vesicle::new(id, body.position, body.radius);
        vesicle.body.mobile = body.mobile;
        self.vesicles.push(vesicle);
        Some(id)
    }

    #[inline]
    pub fn channel(&self, id: EntityId) -> Option<&CaChannel> {
        self.channels.get(id.index())
    }

    #[inline]
    pub fn channel_mut(&mut self, id: EntityId) -> Option<&mut CaChannel> {
        self.channels.get_mut(id.index())
    }

    #[inline]
    pub fn vesicle(&self, id: EntityId) -> Option<&Vesicle> {
        self.vesicles.get(id.index())
    }

    #[inline]
    pub fn vesicle_mut(&mut self, id: EntityId) -> Option<&mut Vesicle> {
        self.vesicles.get_mut(id.index())
    }

    pub fn body(&self, entity: EntityRef) -> Option<&Body> {
        match entity {
            EntityRef::Channel(id) => self.channel(id).map(|c| &c.body),
            EntityRef::Vesicle(id) => self.vesicle(id).map(|v| &v.body),
        }
    }

    pub fn body_mut(&mut self, entity: EntityRef) -> Option<&mut Body> {
        match entity {
            EntityRef::Channel(id) => self.channel_mut(id).map(|c| &mut c.body),
            EntityRef::Vesicle(id) => self.vesicle_mut(id).map(|v| &mut v.body),
        }
    }

    pub fn open_channel_count(&self) -> usize {
        self.channels.iter().filter(|c| c.state.is_open()).count()
    }

    pub fn total_secretions(&self) -> u64 {
        self.vesicles.iter().map(|v| v.secretions).sum()
    }

    pub fn has_attribute(&self, entity: EntityRef, key: AttributeKey) -> bool {
        let exists = self.body(entity).is_some();
        exists
            && matches!(
                (entity, key),
                (EntityRef::Channel(_), AttributeKey::ChannelState)
                    | (EntityRef::Vesicle(_), AttributeKey::DockingState)
                    | (EntityRef::Vesicle(_), AttributeKey::Maturation)
                    | (EntityRef::Vesicle(_), AttributeKey::SecretionCount)
            )
    }

    /// Reads an attribute in its raw integer encoding.
    pub fn attribute(&self, entity: EntityRef, key: AttributeKey) -> Option<i64> {
        match (entity, key) {
            (EntityRef::Channel(id), AttributeKey::ChannelState) => {
                self.channel(id).map(|c| c.state.to_raw())
            }
            (EntityRef::Vesicle(id), AttributeKey::DockingState) => {
                self.vesicle(id).map(|v| v.docking.to_raw())
            }
            (EntityRef::Vesicle(id), AttributeKey::Maturation) => {
                self.vesicle(id).map(|v| v.maturation as i64)
            }
            (EntityRef::Vesicle(id), AttributeKey::SecretionCount) => {
                self.vesicle(id).map(|v| v.secretions as i64)
            }
            _ => None,
        }
    }

    /// Writes an attribute from its raw integer encoding. Returns `false` when
    /// the entity does not exist, does not carry `key`, or `value` cannot be
    /// encoded.
    pub fn set_attribute(&mut self, entity: EntityRef, key: AttributeKey, value: i64) -> bool {
        match (entity, key) {
            (EntityRef::Channel(id), AttributeKey::ChannelState) => {
                match (self.channel_mut(id), ChannelState::from_raw(value)) {
                    (Some(c), Some(state)) => {
                        c.state = state;
                        true
                    }
                    _ => false,
                }
            }
            (EntityRef::Vesicle(id), AttributeKey::DockingState) => {
                match (self.vesicle_mut(id), DockingState::from_raw(value)) {
                    (Some(v), Some(state)) => {
                        v.docking = state;
                        true
                    }
                    _ => false,
                }
            }
            (EntityRef::Vesicle(id), AttributeKey::Maturation) => {
                match (self.vesicle_mut(id), u64::try_from(value)) {
                    (Some(v), Ok(n)) => {
                        v.maturation = n;
                        true
                    }
                    _ => false,
                }
            }
            (EntityRef::Vesicle(id), AttributeKey::SecretionCount) => {
                match (self.vesicle_mut(id), u64::try_from(value)) {
                    (Some(v), Ok(n)) => {
                        v.secretions = n;
                        true
                    }
                    _ => false,
                }
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    fn small_cell() -> Cell {
        let mut cell = Cell::new(
            Sphere::new(DVec3::ZERO, 100.0),
            Sphere::new(DVec3::ZERO, 40.0),
        );
        cell.add_channel(Body::new(DVec3::new(100.0, 0.0, 0.0), 1.0), ChannelState::Open);
        cell.add_vesicle(Body::new(DVec3::new(60.0, 0.0, 0.0), 5.0));
        cell
    }

    #[test]
    fn test_ids_are_table_positions() {
        let mut cell = small_cell();
        let id = cell.add_vesicle(Body::new(DVec3::new(0.0, 70.0, 0.0), 5.0));
        assert_eq!(id, Some(EntityId(1)));
        let id = EntityId(1);
        assert_eq!(cell.vesicle(id).map(|v| v.id), Some(id));
    }

    #[test]
    fn test_attribute_facade_uses_raw_encoding() {
        let mut cell = small_cell();
        let ch = EntityRef::Channel(EntityId(0));
        let v = EntityRef::Vesicle(EntityId(0));
        assert_eq!(cell.attribute(ch, AttributeKey::ChannelState), Some(-1));
        assert_eq!(cell.attribute(v, AttributeKey::DockingState), Some(0));

        assert!(cell.set_attribute(v, AttributeKey::DockingState, -1));
        assert_eq!(cell.vesicles[0].docking, DockingState::JustDocked);
        assert!(cell.set_attribute(ch, AttributeKey::ChannelState, 4));
        assert_eq!(cell.channels[0].state, ChannelState::Closed(4));
    }

    #[test]
    fn test_attribute_facade_rejects_foreign_keys_and_bad_values() {
        let mut cell = small_cell();
        let ch = EntityRef::Channel(EntityId(0));
        let v = EntityRef::Vesicle(EntityId(0));
        assert!(!cell.has_attribute(ch, AttributeKey::DockingState));
        assert!(cell.has_attribute(v, AttributeKey::SecretionCount));
        assert!(!cell.has_attribute(EntityRef::Vesicle(EntityId(9)), AttributeKey::Maturation));
        assert_eq!(cell.attribute(ch, AttributeKey::Maturation), None);
        assert!(!cell.set_attribute(v, AttributeKey::Maturation, -4));
        assert!(!cell.set_attribute(v, AttributeKey::DockingState, -2));
        assert!(!cell.set_attribute(ch, AttributeKey::ChannelState, -7));
    }

    #[test]
    fn test_counts() {
        let mut cell = small_cell();
        cell.vesicles[0].secretions = 3;
        assert_eq!(cell.open_channel_count(), 1);
        assert_eq!(cell.total_secretions(), 3);
    }
}
