//! Electron identification
//!
//! Cut-based working points. Every cut rejects when the measured value
//! exceeds the threshold, so a NaN-valued variable never rejects by itself.

use crate::capability::ConversionVeto;
use crate::tier::TierClassification;
use hepsel_core::{Conversion, Electron, Vec3};

/// Lower edge of the barrel/endcap transition in |η_SC|
pub const GAP_ETA_LOW: f64 = 1.479;

/// Upper edge of the barrel/endcap transition in |η_SC|
pub const GAP_ETA_HIGH: f64 = 1.556;

/// `|1/E - 1/p|` substitute for a non-finite ECAL energy
pub const NON_FINITE_ENERGY_RESIDUAL: f64 = 998.0;

/// Upper bounds for one electron working point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElectronWorkingPoint {
    pub sigma_ieta_ieta: f64,
    pub delta_eta_in: f64,
    pub delta_phi_in: f64,
    pub hcal_over_ecal: f64,
    pub rel_charged_iso: f64,
    pub inverse_energy_residual: f64,
}

pub const LOOSE: ElectronWorkingPoint = ElectronWorkingPoint {
    sigma_ieta_ieta: 0.02992,
    delta_eta_in: 0.004119,
    delta_phi_in: 0.05176,
    hcal_over_ecal: 6.741,
    rel_charged_iso: 2.5,
    inverse_energy_residual: 73.76,
};

pub const MEDIUM: ElectronWorkingPoint = ElectronWorkingPoint {
    sigma_ieta_ieta: 0.01609,
    delta_eta_in: 0.001766,
    delta_phi_in: 0.03130,
    hcal_over_ecal: 7.371,
    rel_charged_iso: 1.325,
    inverse_energy_residual: 22.6,
};

pub const TIGHT: ElectronWorkingPoint = ElectronWorkingPoint {
    sigma_ieta_ieta: 0.01614,
    delta_eta_in: 0.001322,
    delta_phi_in: 0.06129,
    hcal_over_ecal: 4.492,
    rel_charged_iso: 1.255,
    inverse_energy_residual: 18.26,
};

/// Supercluster inside the barrel/endcap transition (edges excluded)
pub fn in_transition_gap(supercluster_eta: f64) -> bool {
    let abs_eta = supercluster_eta.abs();
    abs_eta > GAP_ETA_LOW && abs_eta < GAP_ETA_HIGH
}

/// `|1/E - (E_SC/p)/E|` with E the ECAL energy
pub fn inverse_energy_residual(electron: &Electron) -> f64 {
    let energy = electron.ecal_energy;
    if energy == 0.0 {
        0.0
    } else if !energy.is_finite() {
        NON_FINITE_ENERGY_RESIDUAL
    } else {
        (1.0 / energy - electron.e_supercluster_over_p / energy).abs()
    }
}

pub fn passes_working_point(
    electron: &Electron,
    wp: &ElectronWorkingPoint,
    conversions: &[Conversion],
    beamspot: &Vec3,
    veto: &dyn ConversionVeto,
) -> bool {
    if in_transition_gap(electron.supercluster_eta) {
        return false;
    }
    if electron.full5x5_sigma_ieta_ieta > wp.sigma_ieta_ieta
        || electron.delta_eta_sc_track.abs() > wp.delta_eta_in
        || electron.delta_phi_sc_track.abs() > wp.delta_phi_in
        || electron.hcal_over_ecal > wp.hcal_over_ecal
        || electron.sum_charged_hadron_pt / electron.p4.pt > wp.rel_charged_iso
        || inverse_energy_residual(electron) > wp.inverse_energy_residual
    {
        return false;
    }
    !veto.has_matched_conversion(electron, conversions, beamspot)
}

/// Loose/medium/tight flags, each evaluated independently
pub fn electron_tiers(
    electron: &Electron,
    conversions: &[Conversion],
    beamspot: &Vec3,
    veto: &dyn ConversionVeto,
) -> TierClassification {
    let passes = |wp| passes_working_point(electron, wp, conversions, beamspot, veto);
    TierClassification {
        loose: passes(&LOOSE),
        medium: passes(&MEDIUM),
        tight: passes(&TIGHT),
    }
}

/// Conversion veto matching the electron's GSF track against good conversions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StandardConversionVeto {
    pub min_vertex_probability: f64,
    /// Minimum transverse decay length from the beam spot (cm)
    pub min_lxy: f64,
    pub max_hits_before_vertex: u32,
}

impl Default for StandardConversionVeto {
    fn default() -> Self {
        Self {
            min_vertex_probability: 1e-6,
            min_lxy: 2.0,
            max_hits_before_vertex: 1,
        }
    }
}

impl StandardConversionVeto {
    /// Signed transverse displacement of the conversion vertex along its momentum
    fn lxy(conversion: &Conversion, beamspot: &Vec3) -> f64 {
        let pt = conversion.momentum.perp();
        if pt <= 0.0 {
            return f64::NEG_INFINITY;
        }
        let d = conversion.vertex - *beamspot;
        (d.x * conversion.momentum.x + d.y * conversion.momentum.y) / pt
    }

    pub fn is_good_conversion(&self, conversion: &Conversion, beamspot: &Vec3) -> bool {
        conversion.vertex_probability >= self.min_vertex_probability
            && Self::lxy(conversion, beamspot) > self.min_lxy
            && conversion.n_hits_before_vertex <= self.max_hits_before_vertex
    }
}

impl ConversionVeto for StandardConversionVeto {
    fn has_matched_conversion(
        &self,
        electron: &Electron,
        conversions: &[Conversion],
        beamspot: &Vec3,
    ) -> bool {
        conversions.iter().any(|conv| {
            conv.track_ids.contains(&electron.gsf_track_id)
                && self.is_good_conversion(conv, beamspot)
        })
    }
}
