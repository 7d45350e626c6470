//! Reconstructed and generator-level physics objects
//!
//! Field names follow the miniAOD accessors they are extracted from. Every
//! optional field defaults when absent from the input so that missing data
//! degrades to "fails the cut" rather than to an error.

use crate::kinematics::{Vec3, P4};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// PDG code of the electron
pub const PDG_ELECTRON: i32 = 11;

/// PDG code of the muon
pub const PDG_MUON: i32 = 13;

/// `MuonChamberMatch::detector()` value of the ME0 extended forward detector
pub const ME0_DETECTOR_ID: i32 = 5;

/// Value returned for a b-tag discriminator the jet does not carry
pub const MISSING_DISCRIMINATOR: f64 = -1000.0;

/// True for |pdg| ∈ {11, 13}
pub fn is_light_lepton(pdg_id: i32) -> bool {
    matches!(pdg_id.abs(), PDG_ELECTRON | PDG_MUON)
}

/// Reconstructed interaction vertex
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Vertex {
    #[serde(default)]
    pub position: Vec3,
    #[serde(default)]
    pub ndof: f64,
    #[serde(default)]
    pub is_fake: bool,
}

/// Luminous region centre
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BeamSpot {
    #[serde(default)]
    pub position: Vec3,
}

/// Charged-particle track
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Track {
    /// Identifier shared with conversions that reference this track
    #[serde(default)]
    pub id: u64,
    /// Point of closest approach used as the track reference point
    #[serde(default)]
    pub reference_point: Vec3,
    #[serde(default)]
    pub momentum: Vec3,
    #[serde(default)]
    pub normalized_chi2: f64,
    #[serde(default)]
    pub valid_pixel_hits: u32,
    #[serde(default)]
    pub tracker_layers_with_measurement: u32,
    /// Fraction of valid hits on the track
    #[serde(default)]
    pub valid_fraction: f64,
    #[serde(default)]
    pub high_purity: bool,
}

impl Track {
    pub fn pt(&self) -> f64 {
        self.momentum.perp()
    }

    /// Transverse impact parameter with respect to `point`
    pub fn dxy(&self, point: &Vec3) -> f64 {
        let pt = self.pt();
        if pt <= 0.0 {
            return f64::INFINITY;
        }
        let r = self.reference_point;
        let p = self.momentum;
        (-(r.x - point.x) * p.y + (r.y - point.y) * p.x) / pt
    }

    /// Longitudinal impact parameter with respect to `point`
    pub fn dz(&self, point: &Vec3) -> f64 {
        let pt = self.pt();
        if pt <= 0.0 {
            return f64::INFINITY;
        }
        let r = self.reference_point;
        let p = self.momentum;
        (r.z - point.z) - ((r.x - point.x) * p.x + (r.y - point.y) * p.y) / pt * (p.z / pt)
    }
}

/// PUPPI isolation sums computed without leptons
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PuppiIsolation {
    #[serde(default)]
    pub charged_hadron: f64,
    #[serde(default)]
    pub neutral_hadron: f64,
    #[serde(default)]
    pub photon: f64,
}

impl PuppiIsolation {
    pub fn sum(&self) -> f64 {
        self.charged_hadron + self.neutral_hadron + self.photon
    }
}

/// Track extrapolation to a muon chamber
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChamberMatch {
    /// Muon subdetector; 5 is ME0
    pub detector: i32,
    #[serde(default)]
    pub chamber_id: u32,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub x_err: f64,
    #[serde(default)]
    pub y_err: f64,
    #[serde(default)]
    pub dxdz: f64,
    #[serde(default)]
    pub dydz: f64,
    /// ME0 segments associated with this extrapolation
    #[serde(default)]
    pub me0_matches: Vec<SegmentMatch>,
}

/// Reconstructed segment observed in a muon chamber
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SegmentMatch {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub x_err: f64,
    #[serde(default)]
    pub y_err: f64,
    #[serde(default)]
    pub dxdz: f64,
    #[serde(default)]
    pub dydz: f64,
}

/// Reconstructed muon
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Muon {
    pub p4: P4,
    #[serde(default)]
    pub charge: i32,
    /// Tagged as reconstructed in the ME0 extended forward detector
    #[serde(default)]
    pub is_me0: bool,
    #[serde(default)]
    pub is_global: bool,
    #[serde(default)]
    pub is_tracker: bool,
    #[serde(default)]
    pub is_pf: bool,
    #[serde(default)]
    pub inner_track: Option<Track>,
    /// Best track; falls back to the inner track when absent
    #[serde(default)]
    pub best_track: Option<Track>,
    #[serde(default)]
    pub global_normalized_chi2: f64,
    #[serde(default)]
    pub valid_muon_hits: u32,
    #[serde(default)]
    pub matched_stations: u32,
    #[serde(default)]
    pub segment_compatibility: f64,
    #[serde(default)]
    pub chi2_local_position: f64,
    #[serde(default)]
    pub track_kink: f64,
    #[serde(default)]
    pub puppi_no_leptons: PuppiIsolation,
    #[serde(default)]
    pub matches: Vec<ChamberMatch>,
}

impl Muon {
    pub fn muon_best_track(&self) -> Option<&Track> {
        self.best_track.as_ref().or(self.inner_track.as_ref())
    }

    /// PUPPI relative isolation
    pub fn rel_iso(&self) -> f64 {
        self.puppi_no_leptons.sum() / self.p4.pt
    }

    pub fn pdg_id(&self) -> i32 {
        self.charge * PDG_MUON
    }
}

/// Reconstructed (GSF) electron
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Electron {
    pub p4: P4,
    #[serde(default)]
    pub charge: i32,
    pub supercluster_eta: f64,
    #[serde(default)]
    pub full5x5_sigma_ieta_ieta: f64,
    #[serde(default)]
    pub delta_eta_sc_track: f64,
    #[serde(default)]
    pub delta_phi_sc_track: f64,
    #[serde(default)]
    pub hcal_over_ecal: f64,
    #[serde(default)]
    pub sum_charged_hadron_pt: f64,
    /// `null` in the input stands for a non-finite energy
    #[serde(default, deserialize_with = "nullable_f64")]
    pub ecal_energy: f64,
    #[serde(default)]
    pub e_supercluster_over_p: f64,
    #[serde(default)]
    pub gsf_track_id: u64,
    #[serde(default)]
    pub puppi_no_leptons: PuppiIsolation,
}

impl Electron {
    /// PUPPI relative isolation
    pub fn rel_iso(&self) -> f64 {
        self.puppi_no_leptons.sum() / self.p4.pt
    }

    pub fn pdg_id(&self) -> i32 {
        self.charge * PDG_ELECTRON
    }
}

fn nullable_f64<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

/// Reconstructed photon conversion
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Conversion {
    #[serde(default)]
    pub vertex: Vec3,
    #[serde(default)]
    pub vertex_probability: f64,
    /// Conversion pair momentum; only the transverse part is used
    #[serde(default)]
    pub momentum: Vec3,
    #[serde(default)]
    pub n_hits_before_vertex: u32,
    /// Ids of the tracks (and GSF tracks) attached to this conversion
    #[serde(default)]
    pub track_ids: Vec<u64>,
}

/// Reconstructed particle-flow jet
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Jet {
    pub p4: P4,
    #[serde(default)]
    pub neutral_hadron_fraction: f64,
    #[serde(default)]
    pub neutral_em_fraction: f64,
    #[serde(default)]
    pub charged_hadron_fraction: f64,
    #[serde(default)]
    pub charged_em_fraction: f64,
    #[serde(default)]
    pub charged_multiplicity: u32,
    #[serde(default)]
    pub n_constituents: u32,
    #[serde(default)]
    pub b_discriminators: BTreeMap<String, f64>,
    #[serde(default)]
    pub parton_flavour: i32,
    #[serde(default)]
    pub hadron_flavour: i32,
    #[serde(default)]
    pub gen_parton_pdg_id: Option<i32>,
}

impl Jet {
    /// Discriminator value by tagger name, or -1000 when not stored
    pub fn b_discriminator(&self, name: &str) -> f64 {
        self.b_discriminators
            .get(name)
            .copied()
            .unwrap_or(MISSING_DISCRIMINATOR)
    }
}

/// Missing transverse momentum
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Met {
    pub pt: f64,
    pub phi: f64,
}

/// Packed particle-flow candidate
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PfCandidate {
    pub p4: P4,
    pub pdg_id: i32,
    #[serde(default)]
    pub track_high_purity: bool,
}

/// Packed generator-level particle
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenParticle {
    pub p4: P4,
    pub pdg_id: i32,
}

/// Generator-level jet with its constituents
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenJet {
    pub p4: P4,
    #[serde(default)]
    pub pdg_id: i32,
    #[serde(default)]
    pub constituents: Vec<P4>,
}
