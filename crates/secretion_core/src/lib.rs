//! # Secretion Core
//!
//! The state machines of the insulin secretion model:
//! - Population-level oscillation of Ca2+ channel opening
//! - Docking of vesicles to open channels through a close-pair index
//! - The vesicle cycle of maturation, countdown, secretion and reset
//! - Rejection-sampling placement of secreted vesicles
//! - Single-body potentials for the integrator
//!
//! ## Example
//!
//! ```
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//! use secretion_core::tasks::{ChannelOscillation, PeriodicTask};
//! use secretion_data::{Body, Cell, ChannelState, DVec3, Sphere};
//!
//! let mut cell = Cell::new(
//!     Sphere::new(DVec3::ZERO, 100.0),
//!     Sphere::new(DVec3::ZERO, 40.0),
//! );
//! for i in 0..4 {
//!     let state = if i == 0 { ChannelState::Open } else { ChannelState::Closed(0) };
//!     cell.add_channel(Body::new(DVec3::new(100.0, 0.0, i as f64), 1.0), state);
//! }
//! let ids = cell.channels.iter().map(|c| c.id).collect();
//! let mut task =
//!     ChannelOscillation::new(ids, 2, 1, 3, 1, ChaCha8Rng::seed_from_u64(42)).unwrap();
//!
//! // Two updates age the closed channels to the threshold, the third switches.
//! for _ in 0..2 {
//!     assert!(task.update(&mut cell).unwrap().is_none());
//! }
//! assert!(task.update(&mut cell).unwrap().is_some());
//! assert_eq!(cell.open_channel_count(), 3);
//! ```

/// Rigid grouping of vesicles with the channel they docked to
pub mod cluster;
/// Configuration management for model and run parameters
pub mod config;
/// Error types shared by the tasks
pub mod error;
/// Run metrics and structured logging
pub mod metrics;
/// Bounded random placement near the nucleus
pub mod placement;
/// Single-body potentials
pub mod potential;
/// Uniform grid and close-pair index between two sphere sets
pub mod proximity;
/// Channel oscillation, docking and secretion tasks
pub mod tasks;

pub use cluster::RigidClusters;
pub use config::AppConfig;
pub use error::{Result, SimError};
pub use metrics::{init_logging, Metrics, MetricsSnapshot};
pub use placement::{Placed, Placement};
pub use potential::{PeripheralPull, RadialDistributionPotential, SingletonScore};
pub use proximity::ClosePairIndex;
pub use tasks::PeriodicTask;
