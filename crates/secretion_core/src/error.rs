//! Error types for the secretion core.
//!
//! The first two variants are the fatal invariant violations of the state
//! machines. They carry the offending entity and the observed value so the
//! driver can report them before stopping the run; nothing in the core tries
//! to repair the state that produced them.

use secretion_data::{EntityId, EntityRef};
use thiserror::Error;

/// Main error type for secretion core operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    /// A phase switch was due but the population matches neither phase size.
    #[error(
        "incorrect number of Ca2+ channels in the open state: {open} open, expected trough {trough} or peak {peak}"
    )]
    OpenChannelMismatch {
        open: usize,
        trough: usize,
        peak: usize,
    },

    /// A vesicle's docking state left `{-1, 0} ∪ [1, ready_state]`.
    #[error(
        "incorrect docking state of vesicle {vesicle}: observed {observed}, expected -1, 0 or 1..={ready_state}"
    )]
    DockingStateOutOfRange {
        vesicle: EntityId,
        observed: i64,
        ready_state: u32,
    },

    /// The bounded rejection sampler gave up.
    #[error("no free position found for vesicle {vesicle} after {attempts} attempts")]
    PlacementExhausted { vesicle: EntityId, attempts: usize },

    /// Construction parameters that cannot drive a consistent state machine.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A task was handed an id that is not in the cell.
    #[error("unknown entity: {0}")]
    UnknownEntity(EntityRef),
}

/// Result type alias for secretion core operations.
pub type Result<T> = std::result::Result<T, SimError>;

impl SimError {
    /// Creates a new invalid-parameter error.
    #[must_use]
    pub fn invalid<S: Into<String>>(msg: S) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Whether the error is one of the invariant violations that must end the
    /// run.
    #[must_use]
    pub fn is_fatal_inconsistency(&self) -> bool {
        matches!(
            self,
            Self::OpenChannelMismatch { .. } | Self::DockingStateOutOfRange { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_names_entity_and_domain() {
        let err = SimError::DockingStateOutOfRange {
            vesicle: EntityId(4),
            observed: 6,
            ready_state: 5,
        };
        let msg = err.to_string();
        assert!(msg.contains("#4"));
        assert!(msg.contains("observed 6"));
        assert!(msg.contains("1..=5"));
        assert!(err.is_fatal_inconsistency());
    }

    #[test]
    fn test_placement_exhausted_is_not_an_inconsistency() {
        let err = SimError::PlacementExhausted {
            vesicle: EntityId(0),
            attempts: 10,
        };
        assert!(!err.is_fatal_inconsistency());
        assert_eq!(
            SimError::invalid("periodicity").to_string(),
            "invalid parameter: periodicity"
        );
    }
}
