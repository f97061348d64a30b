//! Plain data shared by the secretion core and its drivers: entity identities,
//! geometry, per-entity state, the cell that stores them and the per-frame
//! statistics written by a run.

pub mod data;

pub use data::cell::{Cell, EntityRef};
pub use data::entity::{
    AttributeKey, Body, CaChannel, ChannelState, DockingState, EntityId, Vesicle,
};
pub use data::geometry::{surface_distance, Sphere};
pub use data::stats::{Frame, FrameStats, VesicleFrame};
pub use glam::DVec3;
