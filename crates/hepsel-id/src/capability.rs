//! Capability traits injected into the identification rules
//!
//! Standard implementations live next to the rules that use them
//! (`muon::StandardMuonSelectors`, `jet::PfJetId`,
//! `electron::StandardConversionVeto`); tests substitute their own.

use crate::jet::JetIdBits;
use hepsel_core::{Conversion, Electron, Jet, Muon, Vec3, Vertex};

/// Central-detector muon quality predicates
pub trait MuonQuality: Send + Sync {
    fn is_loose(&self, muon: &Muon) -> bool;

    fn is_medium(&self, muon: &Muon) -> bool;

    fn is_tight(&self, muon: &Muon, vertex: &Vertex) -> bool;
}

/// Jet identification functor for one working point
pub trait JetQuality: Send + Sync {
    /// Fresh diagnostic bitset with every bit cleared
    fn bit_template(&self) -> JetIdBits;

    /// Evaluate the jet, recording each passed cut in `bits`
    fn check(&self, jet: &Jet, bits: &mut JetIdBits) -> bool;
}

/// Photon-conversion rejection for electrons
pub trait ConversionVeto: Send + Sync {
    fn has_matched_conversion(
        &self,
        electron: &Electron,
        conversions: &[Conversion],
        beamspot: &Vec3,
    ) -> bool;
}
