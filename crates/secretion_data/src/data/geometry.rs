use glam::DVec3;
use serde::{Deserialize, Serialize};

/// A sphere in world space (Å).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    pub center: DVec3,
    pub radius: f64,
}

impl Sphere {
    pub fn new(center: DVec3, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Distance of `point` from the center.
    #[inline]
    pub fn distance_from_center(&self, point: DVec3) -> f64 {
        point.distance(self.center)
    }

    /// Strict containment: points on the surface are outside.
    #[inline]
    pub fn contains(&self, point: DVec3) -> bool {
        self.distance_from_center(point) < self.radius
    }

    /// Same center, radius grown (or shrunk, for negative `delta`).
    pub fn inflated(&self, delta: f64) -> Self {
        Self::new(self.center, self.radius + delta)
    }
}

/// Surface-to-surface distance between two spheres; negative when they overlap.
#[inline]
pub fn surface_distance(a: DVec3, ra: f64, b: DVec3, rb: f64) -> f64 {
    a.distance(b) - ra - rb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_strict() {
        let s = Sphere::new(DVec3::ZERO, 10.0);
        assert!(s.contains(DVec3::new(9.999, 0.0, 0.0)));
        assert!(!s.contains(DVec3::new(10.0, 0.0, 0.0)));
    }

    #[test]
    fn test_surface_distance_overlap_is_negative() {
        let d = surface_distance(DVec3::ZERO, 2.0, DVec3::new(3.0, 0.0, 0.0), 2.0);
        assert!((d + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_inflated_keeps_center() {
        let s = Sphere::new(DVec3::new(1.0, 2.0, 3.0), 5.0).inflated(-2.0);
        assert_eq!(s.center, DVec3::new(1.0, 2.0, 3.0));
        assert_eq!(s.radius, 3.0);
    }
}
