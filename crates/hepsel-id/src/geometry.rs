//! Muon chamber geometry lookup
//!
//! The lookup is refreshed once per processing run and shared read-only by
//! every event of that run.

use hepsel_core::{delta_phi, Error, Result, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Local-to-global placement of one chamber
pub trait ChamberGeometry: Send + Sync {
    /// Convert a local point to global coordinates
    fn to_global(&self, local: &Vec3) -> Vec3;

    /// Global φ swept by a local track stub across the chamber depth
    fn compute_delta_phi(&self, position: &Vec3, direction: &Vec3) -> f64;
}

/// Chamber lookup keyed by chamber identifier
pub trait GeometryLookup: Send + Sync {
    fn chamber(&self, id: u32) -> Option<&dyn ChamberGeometry>;
}

/// Flat chamber placed by an origin and a rotation.
///
/// `global = origin + rotation · local`, with `rotation` row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanarChamber {
    pub origin: Vec3,
    #[serde(default = "identity")]
    pub rotation: [[f64; 3]; 3],
    /// Half of the chamber depth along local z (cm)
    #[serde(default)]
    pub half_thickness: f64,
}

fn identity() -> [[f64; 3]; 3] {
    [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]
}

impl PlanarChamber {
    /// Chamber with axes parallel to the global frame
    pub fn aligned(origin: Vec3, half_thickness: f64) -> Self {
        Self {
            origin,
            rotation: identity(),
            half_thickness,
        }
    }

    fn rotate(&self, v: &Vec3) -> Vec3 {
        let r = &self.rotation;
        Vec3::new(
            r[0][0] * v.x + r[0][1] * v.y + r[0][2] * v.z,
            r[1][0] * v.x + r[1][1] * v.y + r[1][2] * v.z,
            r[2][0] * v.x + r[2][1] * v.y + r[2][2] * v.z,
        )
    }
}

impl ChamberGeometry for PlanarChamber {
    fn to_global(&self, local: &Vec3) -> Vec3 {
        self.origin + self.rotate(local)
    }

    fn compute_delta_phi(&self, position: &Vec3, direction: &Vec3) -> f64 {
        if direction.z == 0.0 || self.half_thickness <= 0.0 {
            return 0.0;
        }
        let extrapolate = |ext_z: f64| {
            Vec3::new(
                position.x + ext_z * direction.x / direction.z,
                position.y + ext_z * direction.y / direction.z,
                ext_z,
            )
        };
        // Outer face is the one further from the interaction point
        let sign = if self.origin.z < 0.0 { -1.0 } else { 1.0 };
        let high = self.to_global(&extrapolate(sign * self.half_thickness));
        let low = self.to_global(&extrapolate(-sign * self.half_thickness));
        delta_phi(high.phi(), low.phi())
    }
}

/// Chamber geometry table loaded from YAML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeometryMap {
    #[serde(default)]
    pub chambers: HashMap<u32, PlanarChamber>,
}

impl GeometryMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: u32, chamber: PlanarChamber) {
        self.chambers.insert(id, chamber);
    }

    pub fn len(&self) -> usize {
        self.chambers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chambers.is_empty()
    }

    /// Load a geometry table from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| Error::geometry(format!("Failed to parse geometry: {}", e)))
    }

    /// Load a geometry table from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }
}

impl GeometryLookup for GeometryMap {
    fn chamber(&self, id: u32) -> Option<&dyn ChamberGeometry> {
        self.chambers.get(&id).map(|c| c as &dyn ChamberGeometry)
    }
}
