//! Four-vectors, three-vectors and angular distances
//!
//! Momenta are stored in collider coordinates (pt, η, φ, m). Cartesian
//! components are derived on demand.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::ops::{Add, Sub};

/// Four-momentum in (pt, η, φ, m) coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct P4 {
    /// Transverse momentum (GeV)
    pub pt: f64,
    /// Pseudorapidity
    pub eta: f64,
    /// Azimuthal angle (rad)
    pub phi: f64,
    /// Invariant mass (GeV)
    #[serde(default)]
    pub mass: f64,
}

impl P4 {
    /// Create a new four-momentum
    pub fn new(pt: f64, eta: f64, phi: f64, mass: f64) -> Self {
        Self { pt, eta, phi, mass }
    }

    /// Massless four-momentum
    pub fn massless(pt: f64, eta: f64, phi: f64) -> Self {
        Self::new(pt, eta, phi, 0.0)
    }

    pub fn px(&self) -> f64 {
        self.pt * self.phi.cos()
    }

    pub fn py(&self) -> f64 {
        self.pt * self.phi.sin()
    }

    pub fn pz(&self) -> f64 {
        self.pt * self.eta.sinh()
    }

    /// Magnitude of the three-momentum: |p| = pt · cosh η
    pub fn p(&self) -> f64 {
        self.pt * self.eta.cosh()
    }

    /// Energy: E = √(|p|² + m²)
    pub fn energy(&self) -> f64 {
        (self.p().powi(2) + self.mass.powi(2)).sqrt()
    }

    pub fn abs_eta(&self) -> f64 {
        self.eta.abs()
    }

    /// Angular separation from another four-momentum
    pub fn delta_r(&self, other: &P4) -> f64 {
        delta_r(self.eta, self.phi, other.eta, other.phi)
    }
}

/// Azimuthal difference wrapped into (-π, π]
pub fn delta_phi(phi1: f64, phi2: f64) -> f64 {
    let dphi = phi1 - phi2;
    if dphi > -PI && dphi <= PI {
        return dphi;
    }
    let two_pi = 2.0 * PI;
    // fmod is exact, so this stays in range for any finite input
    let reduced = (dphi + PI).rem_euclid(two_pi) - PI;
    if reduced <= -PI {
        reduced + two_pi
    } else {
        reduced
    }
}

/// ΔR = √(Δη² + Δφ²)
pub fn delta_r(eta1: f64, phi1: f64, eta2: f64, phi2: f64) -> f64 {
    let deta = eta1 - eta2;
    let dphi = delta_phi(phi1, phi2);
    (deta * deta + dphi * dphi).sqrt()
}

/// Cartesian three-vector, used for positions (cm) and directions
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ORIGIN: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Transverse component √(x² + y²)
    pub fn perp(&self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn phi(&self) -> f64 {
        self.y.atan2(self.x)
    }

    /// Pseudorapidity of the direction from the origin
    pub fn eta(&self) -> f64 {
        let perp = self.perp();
        if perp == 0.0 {
            return if self.z >= 0.0 { f64::INFINITY } else { f64::NEG_INFINITY };
        }
        (self.z / perp).asinh()
    }

    pub fn scale(&self, k: f64) -> Vec3 {
        Vec3::new(self.x * k, self.y * k, self.z * k)
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_delta_phi_wraps() {
        let d = delta_phi(3.1, -3.1);
        assert!((d - (6.2 - 2.0 * PI)).abs() < 1e-12);
        assert!(delta_phi(0.5, 0.2) > 0.0);
        assert!(delta_phi(PI, -PI).abs() < 1e-12);
    }

    #[test]
    fn test_delta_phi_of_huge_angles_is_finite() {
        let d = delta_phi(1e20, 0.0);
        assert!(d.is_finite());
        assert!(d > -PI && d <= PI);

        let r = delta_r(0.0, 1e20, 0.0, 0.0);
        assert!(r.is_finite());
        assert!(r <= PI);

        assert!((delta_phi(7.0 * PI + 0.5, 0.0) - (0.5 - PI)).abs() < 1e-9);
    }

    #[test]
    fn test_delta_r_same_direction_is_zero() {
        let a = P4::massless(20.0, 1.2, -0.4);
        assert_eq!(a.delta_r(&a), 0.0);
    }

    #[test]
    fn test_momentum_components() {
        let a = P4::new(10.0, 0.0, 0.0, 0.0);
        assert!((a.px() - 10.0).abs() < 1e-12);
        assert!(a.py().abs() < 1e-12);
        assert!(a.pz().abs() < 1e-12);
        assert!((a.p() - 10.0).abs() < 1e-12);

        let b = P4::new(3.0, 0.0, 0.0, 4.0);
        assert!((b.energy() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_vec3_eta_matches_p4_eta() {
        let a = P4::massless(15.0, 2.1, 0.7);
        let v = Vec3::new(a.px(), a.py(), a.pz());
        assert!((v.eta() - 2.1).abs() < 1e-9);
        assert!((v.phi() - 0.7).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn delta_r_is_symmetric(
            eta1 in -5.0f64..5.0, phi1 in -PI..PI,
            eta2 in -5.0f64..5.0, phi2 in -PI..PI,
        ) {
            let a = delta_r(eta1, phi1, eta2, phi2);
            let b = delta_r(eta2, phi2, eta1, phi1);
            prop_assert!((a - b).abs() < 1e-9);
            prop_assert!(a >= 0.0);
        }

        #[test]
        fn delta_phi_stays_in_range(phi1 in -1e18f64..1e18, phi2 in -10.0f64..10.0) {
            let d = delta_phi(phi1, phi2);
            prop_assert!(d > -PI - 1e-12 && d <= PI + 1e-12);
        }
    }
}
