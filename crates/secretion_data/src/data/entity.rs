use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Dense index into the channel or vesicle table of a [`crate::Cell`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Fails for table positions past `u32::MAX`.
impl TryFrom<usize> for EntityId {
    type Error = std::num::TryFromIntError;

    fn try_from(idx: usize) -> Result<Self, Self::Error> {
        u32::try_from(idx).map(Self)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Geometry of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub position: DVec3,
    pub radius: f64,
    /// `false` while the position is carried by a rigid cluster instead of
    /// being integrated on its own.
    pub mobile: bool,
}

impl Body {
    pub fn new(position: DVec3, radius: f64) -> Self {
        Self {
            position,
            radius,
            mobile: true,
        }
    }
}

/// Open/closed state of a calcium channel.
///
/// Raw encoding: `-1` is open, `n >= 0` is the age of a closed channel in
/// task invocations since the last phase switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelState {
    Open,
    Closed(u32),
}

impl Default for ChannelState {
    fn default() -> Self {
        Self::Closed(0)
    }
}

impl ChannelState {
    #[inline]
    pub fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }

    pub fn to_raw(self) -> i64 {
        match self {
            Self::Open => -1,
            Self::Closed(age) => i64::from(age),
        }
    }

    pub fn from_raw(raw: i64) -> Option<Self> {
        match raw {
            -1 => Some(Self::Open),
            n if n >= 0 => u32::try_from(n).ok().map(Self::Closed),
            _ => None,
        }
    }
}

/// Docking progress of a vesicle.
///
/// Raw encoding: `0` undocked, `-1` just docked, `n >= 1` counting toward
/// secretion at `ready_state`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DockingState {
    #[default]
    Undocked,
    JustDocked,
    Countdown(u32),
}

impl DockingState {
    pub fn to_raw(self) -> i64 {
        match self {
            Self::Undocked => 0,
            Self::JustDocked => -1,
            Self::Countdown(n) => i64::from(n),
        }
    }

    /// Decodes a raw value. `Countdown` is returned for any positive value;
    /// whether it is within `ready_state` is for the caller to judge.
    pub fn from_raw(raw: i64) -> Option<Self> {
        match raw {
            0 => Some(Self::Undocked),
            -1 => Some(Self::JustDocked),
            n if n >= 1 => u32::try_from(n).ok().map(Self::Countdown),
            _ => None,
        }
    }

    #[inline]
    pub fn is_docked(self) -> bool {
        !matches!(self, Self::Undocked)
    }
}

/// A voltage-gated Ca2+ channel (microdomain) on the cell membrane.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaChannel {
    pub id: EntityId,
    pub name: String,
    pub body: Body,
    pub state: ChannelState,
}

impl CaChannel {
    pub fn new(id: EntityId, position: DVec3, radius: f64, state: ChannelState) -> Self {
        Self {
            id,
            name: format!("CaChannel_{}", id.0),
            body: Body::new(position, radius),
            state,
        }
    }
}

/// An insulin vesicle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vesicle {
    pub id: EntityId,
    pub name: String,
    pub body: Body,
    pub docking: DockingState,
    /// Task invocations since creation or the last secretion.
    pub maturation: u64,
    /// Completed secretion events.
    pub secretions: u64,
}

impl Vesicle {
    pub fn new(id: EntityId, position: DVec3, radius: f64) -> Self {
        Self {
            id,
            name: format!("Vesicle_{}", id.0),
            body: Body::new(position, radius),
            docking: DockingState::Undocked,
            maturation: 0,
            secretions: 0,
        }
    }
}

/// Named integer attributes, addressable by key for drivers and recorders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeKey {
    ChannelState,
    DockingState,
    Maturation,
    SecretionCount,
}

impl AttributeKey {
    pub fn name(self) -> &'static str {
        match self {
            Self::ChannelState => "ChannelState",
            Self::DockingState => "DockingState",
            Self::Maturation => "MaturationState",
            Self::SecretionCount => "SecretionCounter",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_state_raw_encoding() {
        assert_eq!(ChannelState::Open.to_raw(), -1);
        assert_eq!(ChannelState::Closed(7).to_raw(), 7);
        assert_eq!(ChannelState::from_raw(-1), Some(ChannelState::Open));
        assert_eq!(ChannelState::from_raw(0), Some(ChannelState::Closed(0)));
        assert_eq!(ChannelState::from_raw(-2), None);
    }

    #[test]
    fn test_docking_state_raw_encoding() {
        assert_eq!(DockingState::from_raw(0), Some(DockingState::Undocked));
        assert_eq!(DockingState::from_raw(-1), Some(DockingState::JustDocked));
        assert_eq!(DockingState::from_raw(5), Some(DockingState::Countdown(5)));
        assert_eq!(DockingState::from_raw(-3), None);
        assert_eq!(DockingState::Countdown(3).to_raw(), 3);
    }

    #[test]
    fn test_entity_id_conversion_is_checked() {
        assert_eq!(EntityId::try_from(7usize), Ok(EntityId(7)));
        assert_eq!(EntityId::try_from(u32::MAX as usize), Ok(EntityId(u32::MAX)));
        assert!(EntityId::try_from(u32::MAX as usize + 1).is_err());
        assert_eq!(EntityId(12).index(), 12);
    }

    #[test]
    fn test_defaults_match_fresh_entities() {
        let v = Vesicle::new(EntityId(3), DVec3::ZERO, 1.0);
        assert_eq!(v.docking, DockingState::Undocked);
        assert_eq!(v.maturation, 0);
        assert_eq!(v.secretions, 0);
        assert!(v.body.mobile);
        assert_eq!(v.name, "Vesicle_3");
        assert_eq!(ChannelState::default(), ChannelState::Closed(0));
    }

    #[test]
    fn test_vesicle_serde_roundtrip_keeps_state() {
        let mut v = Vesicle::new(EntityId(1), DVec3::new(1.0, 2.0, 3.0), 4.0);
        v.docking = DockingState::Countdown(2);
        let json = serde_json::to_string(&v).unwrap();
        let back: Vesicle = serde_json::from_str(&json).unwrap();
        assert_eq!(back.docking, DockingState::Countdown(2));
        assert_eq!(back.body.position, v.body.position);
    }
}
