//! hepsel Core
//!
//! Core types and utilities shared across the hepsel crates.
//!
//! This crate provides:
//! - Kinematics (`P4`, `Vec3`, ΔR / Δφ)
//! - Reconstructed and generator-level object records
//! - Raw labelled events and their typed view
//! - Error types and result handling
//! - Fixed-capacity row storage for flat records

pub mod error;
pub mod event;
pub mod kinematics;
pub mod rows;
pub mod types;

pub use error::{Error, Result};
pub use event::{primary_vertex_index, CollectionLabels, EventData, EventId, RawEvent};
pub use kinematics::{delta_phi, delta_r, Vec3, P4};
pub use rows::{BoundedRows, Pushed};
pub use types::{
    is_light_lepton, BeamSpot, ChamberMatch, Conversion, Electron, GenJet, GenParticle, Jet,
    Met, Muon, PfCandidate, PuppiIsolation, SegmentMatch, Track, Vertex, ME0_DETECTOR_ID,
    MISSING_DISCRIMINATOR, PDG_ELECTRON, PDG_MUON,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::event::{CollectionLabels, EventData, EventId, RawEvent};
    pub use crate::kinematics::{delta_r, Vec3, P4};
    pub use crate::types::{Electron, GenJet, GenParticle, Jet, Muon, PfCandidate, Vertex};
}
