//! Per-event input: raw labelled collections and their typed view

use crate::types::{
    BeamSpot, Conversion, Electron, GenJet, GenParticle, Jet, Met, Muon, PfCandidate, Vertex,
};
use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::trace;

/// Run / luminosity block / event number
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventId {
    pub run: u32,
    pub lumi: u32,
    pub event: u64,
}

/// Input-collection identifiers, one per collection the selectors consume
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionLabels {
    pub vertices: String,
    pub muons: String,
    pub electrons: String,
    pub jets: String,
    pub mets: String,
    pub pf_candidates: String,
    pub beamspot: String,
    pub conversions: String,
    pub gen_jets: String,
    pub gen_particles: String,
}

impl Default for CollectionLabels {
    fn default() -> Self {
        Self {
            vertices: "offlineSlimmedPrimaryVertices".to_string(),
            muons: "slimmedMuons".to_string(),
            electrons: "slimmedElectrons".to_string(),
            jets: "slimmedJets".to_string(),
            mets: "slimmedMETs".to_string(),
            pf_candidates: "packedPFCandidates".to_string(),
            beamspot: "offlineBeamSpot".to_string(),
            conversions: "reducedEgamma:reducedConversions".to_string(),
            gen_jets: "slimmedGenJets".to_string(),
            gen_particles: "packedGenParticles".to_string(),
        }
    }
}

/// One event as read from the input stream, collections still untyped
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawEvent {
    #[serde(flatten)]
    pub id: EventId,
    #[serde(default)]
    pub is_real_data: bool,
    #[serde(default)]
    pub collections: HashMap<String, serde_json::Value>,
}

impl RawEvent {
    /// Resolve the labelled collections into a typed event.
    ///
    /// A label absent from the event yields an empty collection (or the
    /// origin for the beamspot); a present but malformed collection is an
    /// input error.
    pub fn resolve(&self, labels: &CollectionLabels) -> Result<EventData> {
        Ok(EventData {
            id: self.id,
            is_real_data: self.is_real_data,
            vertices: self.collection(&labels.vertices)?,
            muons: self.collection(&labels.muons)?,
            electrons: self.collection(&labels.electrons)?,
            jets: self.collection(&labels.jets)?,
            mets: self.collection(&labels.mets)?,
            pf_candidates: self.collection(&labels.pf_candidates)?,
            beamspot: self.beamspot(&labels.beamspot)?,
            conversions: self.collection(&labels.conversions)?,
            gen_jets: self.collection(&labels.gen_jets)?,
            gen_particles: self.collection(&labels.gen_particles)?,
        })
    }

    fn collection<T: DeserializeOwned>(&self, label: &str) -> Result<Vec<T>> {
        match self.collections.get(label) {
            None => {
                trace!(label, event = self.id.event, "Collection absent, treated as empty");
                Ok(Vec::new())
            }
            Some(serde_json::Value::Null) => Ok(Vec::new()),
            Some(value) => serde_json::from_value(value.clone()).map_err(|e| {
                Error::input(format!("collection '{}' in event {}: {}", label, self.id.event, e))
            }),
        }
    }

    fn beamspot(&self, label: &str) -> Result<BeamSpot> {
        match self.collections.get(label) {
            None | Some(serde_json::Value::Null) => Ok(BeamSpot::default()),
            Some(serde_json::Value::Array(items)) => match items.first() {
                Some(first) => serde_json::from_value(first.clone()).map_err(Error::from),
                None => Ok(BeamSpot::default()),
            },
            Some(value) => serde_json::from_value(value.clone()).map_err(Error::from),
        }
    }
}

/// Typed, read-only view of one event's collections
#[derive(Debug, Clone, Default)]
pub struct EventData {
    pub id: EventId,
    /// Generator-level collections are only read for simulated events
    pub is_real_data: bool,
    pub vertices: Vec<Vertex>,
    pub muons: Vec<Muon>,
    pub electrons: Vec<Electron>,
    pub jets: Vec<Jet>,
    pub mets: Vec<Met>,
    pub pf_candidates: Vec<PfCandidate>,
    pub beamspot: BeamSpot,
    pub conversions: Vec<Conversion>,
    pub gen_jets: Vec<GenJet>,
    pub gen_particles: Vec<GenParticle>,
}

/// Minimum number of degrees of freedom for a primary vertex candidate
pub const PRIMARY_VERTEX_MIN_NDOF: f64 = 4.0;

/// Index of the first non-fake vertex with ndof > 4
pub fn primary_vertex_index(vertices: &[Vertex]) -> Option<usize> {
    vertices
        .iter()
        .position(|v| !v.is_fake && v.ndof > PRIMARY_VERTEX_MIN_NDOF)
}

impl EventData {
    /// The selected primary vertex, if any
    pub fn primary_vertex(&self) -> Option<&Vertex> {
        primary_vertex_index(&self.vertices).map(|i| &self.vertices[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex(ndof: f64, is_fake: bool) -> Vertex {
        Vertex {
            ndof,
            is_fake,
            ..Default::default()
        }
    }

    #[test]
    fn test_primary_vertex_skips_fake_and_low_ndof() {
        let vertices = vec![vertex(10.0, true), vertex(4.0, false), vertex(4.5, false), vertex(20.0, false)];
        assert_eq!(primary_vertex_index(&vertices), Some(2));
    }

    #[test]
    fn test_no_primary_vertex() {
        assert_eq!(primary_vertex_index(&[]), None);
        assert_eq!(primary_vertex_index(&[vertex(3.0, false)]), None);
    }

    #[test]
    fn test_resolve_with_custom_labels() {
        let json = r#"{
            "run": 1, "lumi": 2, "event": 3,
            "collections": {
                "myMuons": [{"p4": {"pt": 15.0, "eta": 1.0, "phi": 0.0}, "charge": -1}],
                "offlineBeamSpot": {"position": {"x": 0.1, "y": 0.0, "z": 0.0}}
            }
        }"#;
        let raw: RawEvent = serde_json::from_str(json).unwrap();
        let labels = CollectionLabels {
            muons: "myMuons".to_string(),
            ..Default::default()
        };
        let event = raw.resolve(&labels).unwrap();
        assert_eq!(event.id, EventId { run: 1, lumi: 2, event: 3 });
        assert!(!event.is_real_data);
        assert_eq!(event.muons.len(), 1);
        assert_eq!(event.muons[0].pdg_id(), -13);
        assert!(event.electrons.is_empty());
        assert_eq!(event.beamspot.position.x, 0.1);
    }

    #[test]
    fn test_malformed_collection_is_input_error() {
        let json = r#"{"run": 1, "lumi": 1, "event": 9,
                       "collections": {"slimmedMuons": [{"charge": "x"}]}}"#;
        let raw: RawEvent = serde_json::from_str(json).unwrap();
        let err = raw.resolve(&CollectionLabels::default()).unwrap_err();
        assert!(matches!(err, Error::Input(_)));
    }
}
