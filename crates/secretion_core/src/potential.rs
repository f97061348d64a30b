//! Continuous single-body potentials evaluated by the integrator.
//!
//! Both are pure functions of the body's position (and radius) and their own
//! fixed configuration; they never read or write task state.

use glam::DVec3;
use secretion_data::{Body, Sphere};
use serde::{Deserialize, Serialize};

/// A potential on a single body.
pub trait SingletonScore: Send + Sync {
    /// Returns the potential energy of `body`. When `derivative` is given, the
    /// gradient with respect to the body's position is added to it.
    fn score(&self, body: &Body, derivative: Option<&mut DVec3>) -> f64;
}

/// Linear pull of vesicles toward the periphery: `U = -k * |x - center|`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeripheralPull {
    pub center: DVec3,
    /// kcal/mol/Å; negative values push toward the center.
    pub k: f64,
}

impl PeripheralPull {
    pub fn new(center: DVec3, k: f64) -> Self {
        Self { center, k }
    }
}

impl SingletonScore for PeripheralPull {
    fn score(&self, body: &Body, derivative: Option<&mut DVec3>) -> f64 {
        let delta = body.position - self.center;
        let distance = delta.length();
        if let Some(d) = derivative {
            *d += -self.k * delta.normalize_or_zero();
        }
        -self.k * distance
    }
}

/// Potential fitted to the radial distribution of vesicles around the
/// nucleus: `U = k * P(r)` with a fifth-order polynomial `P`, where `r` is the
/// gap between the vesicle surface and the nuclear envelope.
///
/// Outside the shell `0 <= r <= R_cell - R_nucleus - 2 * r_vesicle` the
/// potential is flat zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadialDistributionPotential {
    pub cell: Sphere,
    pub nucleus: Sphere,
    /// Highest order first: `c0 * r^5 + c1 * r^4 + ... + c5`.
    pub coefficients: [f64; 6],
    pub k: f64,
}

impl RadialDistributionPotential {
    pub fn new(cell: Sphere, nucleus: Sphere, coefficients: [f64; 6], k: f64) -> Self {
        Self {
            cell,
            nucleus,
            coefficients,
            k,
        }
    }

    /// `(P(r), P'(r))` by Horner's rule.
    fn polynomial(&self, r: f64) -> (f64, f64) {
        let mut value = 0.0;
        let mut slope = 0.0;
        for &c in &self.coefficients {
            slope = slope * r + value;
            value = value * r + c;
        }
        (value, slope)
    }
}

impl SingletonScore for RadialDistributionPotential {
    fn score(&self, body: &Body, derivative: Option<&mut DVec3>) -> f64 {
        let delta = body.position - self.cell.center;
        let gap = delta.length() - self.nucleus.radius - body.radius;
        let shell = self.cell.radius - self.nucleus.radius - 2.0 * body.radius;
        if !(0.0..=shell).contains(&gap) {
            return 0.0;
        }
        let (value, slope) = self.polynomial(gap);
        if let Some(d) = derivative {
            *d += self.k * slope * delta.normalize_or_zero();
        }
        self.k * value
    }
}
