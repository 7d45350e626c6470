//! hepsel Identification
//!
//! Tiered object identification for muons, electrons and jets.
//!
//! Muons beyond |η| = 2.4 are identified by matching their ME0 chamber
//! extrapolation against reconstructed segments, either in chamber-local
//! coordinates (legacy) or in global coordinates through a chamber geometry
//! lookup. Central-detector quality, jet id and the conversion veto are
//! injected as capabilities so tests and alternative calibrations can swap
//! them.

pub mod capability;
pub mod electron;
pub mod geometry;
pub mod jet;
pub mod me0;
pub mod muon;
pub mod tier;

pub use capability::{ConversionVeto, JetQuality, MuonQuality};
pub use electron::{electron_tiers, ElectronWorkingPoint, StandardConversionVeto};
pub use geometry::{ChamberGeometry, GeometryLookup, GeometryMap, PlanarChamber};
pub use jet::{jet_tiers, BTagWorkingPoint, JetIdBits, JetIdQuality, PfJetId};
pub use me0::{me0_geometry_match, me0_legacy_match, GlobalCuts, LegacyCuts};
pub use muon::{
    filter_muon_tiers, momentum_scaled_cut, ntuple_muon_tiers, StandardMuonSelectors, TrackGates,
};
pub use tier::{JetTiers, Tier, TierClassification};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::capability::{ConversionVeto, JetQuality, MuonQuality};
    pub use crate::electron::StandardConversionVeto;
    pub use crate::geometry::{GeometryLookup, GeometryMap};
    pub use crate::jet::PfJetId;
    pub use crate::muon::StandardMuonSelectors;
    pub use crate::tier::{Tier, TierClassification};
}
