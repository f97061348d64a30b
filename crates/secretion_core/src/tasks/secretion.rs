//! Maturation, docking countdown and secretion of vesicles.

use super::{check_period, PeriodicTask};
use crate::error::{Result, SimError};
use crate::placement::Placement;
use glam::DVec3;
use rand_chacha::ChaCha8Rng;
use secretion_data::{Cell, DockingState, EntityId, EntityRef, Sphere};
use serde::Serialize;

/// A vesicle that released its content and was put back near the nucleus.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SecretionEvent {
    pub vesicle: EntityId,
    pub from: DVec3,
    pub to: DVec3,
    /// Candidate points drawn to find `to`.
    pub attempts: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SecretionReport {
    /// Vesicles whose docking was confirmed and started counting.
    pub promoted: usize,
    /// Vesicles whose countdown moved by one.
    pub advanced: usize,
    pub events: Vec<SecretionEvent>,
}

pub struct SecretionCycle {
    vesicles: Vec<EntityId>,
    nucleus: Sphere,
    ready_state: u32,
    cut_off: f64,
    periodicity: u64,
    placement: Placement,
    rng: ChaCha8Rng,
}

impl SecretionCycle {
    pub fn new(
        vesicles: Vec<EntityId>,
        nucleus: Sphere,
        ready_state: u32,
        cut_off: f64,
        periodicity: u64,
        placement: Placement,
        rng: ChaCha8Rng,
    ) -> Result<Self> {
        let periodicity = check_period(periodicity)?;
        if ready_state == 0 {
            return Err(SimError::invalid("ready_state must be at least 1"));
        }
        if !(cut_off.is_finite() && cut_off > 0.0) {
            return Err(SimError::invalid(format!(
                "cut_off must be a positive distance, got {cut_off}"
            )));
        }
        Ok(Self {
            vesicles,
            nucleus,
            ready_state,
            cut_off,
            periodicity,
            placement,
            rng,
        })
    }

    pub fn ready_state(&self) -> u32 {
        self.ready_state
    }

    fn secrete(&mut self, cell: &mut Cell, id: EntityId) -> Result<SecretionEvent> {
        let placed = self.placement.place(
            &mut self.rng,
            &self.nucleus,
            self.cut_off,
            id,
            &cell.vesicles,
        )?;
        let vesicle = cell
            .vesicle_mut(id)
            .ok_or(SimError::UnknownEntity(EntityRef::Vesicle(id)))?;
        let from = vesicle.body.position;

        vesicle.secretions += 1;
        vesicle.maturation = 0;
        vesicle.docking = DockingState::Undocked;
        vesicle.body.position = placed.position;
        vesicle.body.mobile = true;

        tracing::info!(
            vesicle = id.0,
            secretions = vesicle.secretions,
            attempts = placed.attempts,
            "Vesicle secreted"
        );
        Ok(SecretionEvent {
            vesicle: id,
            from,
            to: placed.position,
            attempts: placed.attempts,
        })
    }
}

impl PeriodicTask for SecretionCycle {
    type Report = SecretionReport;

    fn period(&self) -> u64 {
        self.periodicity
    }

    fn update(&mut self, cell: &mut Cell) -> Result<SecretionReport> {
        if let Some(&missing) = self.vesicles.iter().find(|&&id| cell.vesicle(id).is_none()) {
            return Err(SimError::UnknownEntity(EntityRef::Vesicle(missing)));
        }

        let mut report = SecretionReport::default();
        for i in 0..self.vesicles.len() {
            let id = self.vesicles[i];
            let Some(vesicle) = cell.vesicle_mut(id) else {
                continue;
            };
            vesicle.maturation = vesicle.maturation.saturating_add(1);

            let state = vesicle.docking;
            match state {
                DockingState::Undocked => {}
                DockingState::JustDocked => {
                    vesicle.docking = DockingState::Countdown(1);
                    report.promoted += 1;
                }
                DockingState::Countdown(n) if n == self.ready_state => {
                    report.events.push(self.secrete(cell, id)?);
                }
                DockingState::Countdown(n) if (1..self.ready_state).contains(&n) => {
                    vesicle.docking = DockingState::Countdown(n + 1);
                    report.advanced += 1;
                }
                DockingState::Countdown(n) => {
                    tracing::error!(
                        vesicle = id.0,
                        docking_state = n,
                        ready_state = self.ready_state,
                        "Docking state outside of the countdown range"
                    );
                    return Err(SimError::DockingStateOutOfRange {
                        vesicle: id,
                        observed: i64::from(n),
                        ready_state: self.ready_state,
                    });
                }
            }
        }

        tracing::debug!(
            promoted = report.promoted,
            advanced = report.advanced,
            secreted = report.events.len(),
            "Secretion cycle update"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use secretion_data::{AttributeKey, Body};

    fn cell() -> Cell {
        let mut cell = Cell::new(
            Sphere::new(DVec3::ZERO, 1000.0),
            Sphere::new(DVec3::ZERO, 300.0),
        );
        cell.add_vesicle(Body::new(DVec3::new(800.0, 0.0, 0.0), 20.0));
        cell.add_vesicle(Body::new(DVec3::new(0.0, 800.0, 0.0), 20.0));
        cell
    }

    fn cycle(cell: &Cell, ready_state: u32) -> SecretionCycle {
        SecretionCycle::new(
            cell.vesicles.iter().map(|v| v.id).collect(),
            cell.nucleus,
            ready_state,
            200.0,
            1,
            Placement::default(),
            ChaCha8Rng::seed_from_u64(9),
        )
        .unwrap()
    }

    #[test]
    fn test_countdown_from_just_docked_to_secretion() {
        let mut cell = cell();
        cell.vesicles[0].docking = DockingState::JustDocked;
        cell.vesicles[0].body.mobile = false;
        cell.vesicles[0].maturation = 40;
        let mut task = cycle(&cell, 5);

        let mut seen = Vec::new();
        for _ in 0..6 {
            let report = task.update(&mut cell).unwrap();
            seen.push(cell.vesicles[0].docking.to_raw());
            if seen.len() < 6 {
                assert!(report.events.is_empty());
                assert_eq!(cell.vesicles[0].secretions, 0);
            } else {
                assert_eq!(report.events.len(), 1);
                assert_eq!(report.events[0].vesicle, EntityId(0));
            }
        }
        assert_eq!(seen, vec![1, 2, 3, 4, 5, 0]);
        let v = &cell.vesicles[0];
        assert_eq!(v.secretions, 1);
        assert_eq!(v.maturation, 0);
        assert!(v.body.mobile);
    }

    #[test]
    fn test_maturation_counts_every_update() {
        let mut cell = cell();
        let mut task = cycle(&cell, 5);
        for _ in 0..4 {
            task.update(&mut cell).unwrap();
        }
        assert!(cell.vesicles.iter().all(|v| v.maturation == 4));
        assert!(cell.vesicles.iter().all(|v| v.docking == DockingState::Undocked));
    }

    #[test]
    fn test_reset_position_is_valid() {
        let mut cell = cell();
        cell.vesicles[1].docking = DockingState::Countdown(3);
        let mut task = cycle(&cell, 3);
        let report = task.update(&mut cell).unwrap();

        let event = report.events[0];
        assert_eq!(event.from, DVec3::new(0.0, 800.0, 0.0));
        let v = &cell.vesicles[1];
        assert_eq!(v.body.position, event.to);
        let d = v.body.position.distance(cell.nucleus.center);
        assert!(d > 320.0);
        assert!(d <= 480.0 + 1e-9);
        assert!(v.body.position.distance(cell.vesicles[0].body.position) > 40.0);
    }

    #[test]
    fn test_state_above_ready_is_fatal() {
        let mut cell = cell();
        assert!(cell.set_attribute(
            EntityRef::Vesicle(EntityId(1)),
            AttributeKey::DockingState,
            6
        ));
        let mut task = cycle(&cell, 5);
        let err = task.update(&mut cell).unwrap_err();
        assert!(err.is_fatal_inconsistency());
        assert_eq!(
            err,
            SimError::DockingStateOutOfRange {
                vesicle: EntityId(1),
                observed: 6,
                ready_state: 5
            }
        );
        // Not clamped.
        assert_eq!(cell.vesicles[1].docking, DockingState::Countdown(6));
    }

    #[test]
    fn test_zero_countdown_is_fatal() {
        let mut cell = cell();
        cell.vesicles[0].docking = DockingState::Countdown(0);
        let mut task = cycle(&cell, 5);
        assert!(matches!(
            task.update(&mut cell),
            Err(SimError::DockingStateOutOfRange { observed: 0, .. })
        ));
    }

    #[test]
    fn test_exhausted_placement_is_surfaced() {
        let mut cell = cell();
        cell.vesicles[0].docking = DockingState::Countdown(1);
        let mut task = SecretionCycle::new(
            vec![EntityId(0)],
            cell.nucleus,
            1,
            30.0,
            1,
            Placement::default(),
            ChaCha8Rng::seed_from_u64(0),
        )
        .unwrap();
        assert!(matches!(
            task.update(&mut cell),
            Err(SimError::PlacementExhausted { attempts: 0, .. })
        ));
    }

    #[test]
    fn test_rejects_bad_parameters() {
        let nucleus = Sphere::new(DVec3::ZERO, 1.0);
        let rng = || ChaCha8Rng::seed_from_u64(0);
        let p = Placement::default();
        assert!(SecretionCycle::new(vec![], nucleus, 0, 1.0, 1, p, rng()).is_err());
        assert!(SecretionCycle::new(vec![], nucleus, 1, 0.0, 1, p, rng()).is_err());
        assert!(SecretionCycle::new(vec![], nucleus, 1, 1.0, 0, p, rng()).is_err());
    }
}
