//! End-to-end record building from JSON events
//!
//! Events are written in the same JSON-lines shape the binary reads and go
//! through label resolution before reaching the builder.

use hepsel_core::{CollectionLabels, EventData, Muon, RawEvent, Vertex};
use hepsel_id::MuonQuality;
use hepsel_ntuple::{BuildOutcome, EventRecordBuilder, FlatColumns, MuonFilter};
use serde_json::json;
use std::sync::Arc;

/// Muon quality that accepts loose only
struct LooseOnly;

impl MuonQuality for LooseOnly {
    fn is_loose(&self, _muon: &Muon) -> bool {
        true
    }

    fn is_medium(&self, _muon: &Muon) -> bool {
        false
    }

    fn is_tight(&self, _muon: &Muon, _vertex: &Vertex) -> bool {
        false
    }
}

fn resolve(value: serde_json::Value) -> EventData {
    let raw: RawEvent = serde_json::from_value(value).unwrap();
    raw.resolve(&CollectionLabels::default()).unwrap()
}

fn columns(builder: &EventRecordBuilder, event: &EventData) -> (FlatColumns, BuildOutcome) {
    let (record, outcome) = builder.build(event);
    let json = serde_json::to_value(&record).unwrap();
    (serde_json::from_value(json).unwrap(), outcome)
}

#[test]
fn test_single_loose_muon_without_gen() {
    let event = resolve(json!({
        "run": 1, "lumi": 1, "event": 42,
        "is_real_data": false,
        "collections": {
            "offlineSlimmedPrimaryVertices": [
                { "position": { "x": 0.0, "y": 0.0, "z": 0.0 }, "ndof": 10.0, "is_fake": false }
            ],
            "slimmedMuons": [
                { "p4": { "pt": 15.0, "eta": 1.0, "phi": 0.3 }, "charge": -1 }
            ]
        }
    }));

    let builder = EventRecordBuilder::new().with_muon_quality(Arc::new(LooseOnly));
    let (cols, outcome) = columns(&builder, &event);

    assert_eq!(outcome, BuildOutcome::Populated);
    assert_eq!(cols.event, 42);
    assert_eq!(cols.nl, 1);
    assert_eq!(cols.l_id, vec![4]);
    assert_eq!(cols.l_pid, vec![-13]);
    assert_eq!(cols.l_g, vec![-1]);
    assert_eq!(cols.ngl, 0);
}

#[test]
fn test_event_without_valid_vertex_is_still_emitted() {
    let event = resolve(json!({
        "run": 1, "lumi": 2, "event": 7,
        "is_real_data": true,
        "collections": {
            "offlineSlimmedPrimaryVertices": [
                { "position": { "x": 0.0, "y": 0.0, "z": 0.0 }, "ndof": 50.0, "is_fake": true },
                { "position": { "x": 0.0, "y": 0.0, "z": 1.0 }, "ndof": 3.0, "is_fake": false }
            ],
            "slimmedMuons": [
                { "p4": { "pt": 25.0, "eta": 0.2, "phi": 0.0 }, "charge": 1, "is_pf": true, "is_global": true }
            ],
            "slimmedJets": [
                { "p4": { "pt": 60.0, "eta": 1.0, "phi": 2.0 } }
            ],
            "slimmedMETs": [ { "pt": 40.0, "phi": 1.0 } ]
        }
    }));

    let (cols, outcome) = columns(&EventRecordBuilder::new(), &event);
    assert_eq!(outcome, BuildOutcome::NoPrimaryVertex);
    assert_eq!(cols.event, 7);
    assert_eq!((cols.nl, cols.nj, cols.nmet, cols.npf), (0, 0, 0, 0));
    assert!(cols.l_pt.is_empty());
}

#[test]
fn test_electron_in_transition_gap_fails_every_tier() {
    let event = resolve(json!({
        "run": 1, "lumi": 1, "event": 3,
        "is_real_data": true,
        "collections": {
            "offlineSlimmedPrimaryVertices": [
                { "position": { "x": 0.0, "y": 0.0, "z": 0.0 }, "ndof": 10.0, "is_fake": false }
            ],
            "slimmedElectrons": [
                {
                    "p4": { "pt": 35.0, "eta": 1.5, "phi": -1.0 },
                    "charge": 1,
                    "supercluster_eta": 1.5,
                    "ecal_energy": 80.0,
                    "e_supercluster_over_p": 1.0
                }
            ]
        }
    }));

    let (cols, _) = columns(&EventRecordBuilder::new(), &event);
    assert_eq!(cols.nl, 1);
    assert_eq!(cols.l_id, vec![0]);
    assert_eq!(cols.l_pid, vec![11]);
}

#[test]
fn test_electron_with_null_energy() {
    let event = resolve(json!({
        "run": 1, "lumi": 1, "event": 4,
        "is_real_data": true,
        "collections": {
            "offlineSlimmedPrimaryVertices": [
                { "position": { "x": 0.0, "y": 0.0, "z": 0.0 }, "ndof": 10.0, "is_fake": false }
            ],
            "slimmedElectrons": [
                { "p4": { "pt": 35.0, "eta": 0.5, "phi": 0.0 }, "charge": -1, "supercluster_eta": 0.5, "ecal_energy": null }
            ]
        }
    }));

    let (cols, _) = columns(&EventRecordBuilder::new(), &event);
    // A residual of 998 exceeds every working-point bound
    assert_eq!(cols.l_id, vec![0]);
}

#[test]
fn test_simulated_event_links_reco_to_gen() {
    let event = resolve(json!({
        "run": 2, "lumi": 5, "event": 11,
        "is_real_data": false,
        "collections": {
            "offlineSlimmedPrimaryVertices": [
                { "position": { "x": 0.0, "y": 0.0, "z": 0.0 }, "ndof": 10.0, "is_fake": false }
            ],
            "packedGenParticles": [
                { "p4": { "pt": 30.0, "eta": 0.1, "phi": 0.0 }, "pdg_id": 13 },
                { "p4": { "pt": 28.0, "eta": 0.2, "phi": 0.1 }, "pdg_id": -13 },
                { "p4": { "pt": 50.0, "eta": -1.0, "phi": 2.0 }, "pdg_id": 22 }
            ],
            "slimmedGenJets": [
                { "p4": { "pt": 30.0, "eta": 0.1, "phi": 0.0 } },
                { "p4": { "pt": 70.0, "eta": -2.0, "phi": -2.0 },
                  "constituents": [ { "pt": 40.0, "eta": -2.0, "phi": -2.0 } ] }
            ],
            "slimmedMuons": [
                { "p4": { "pt": 29.0, "eta": 0.15, "phi": 0.05 }, "charge": 1, "is_pf": true, "is_tracker": true }
            ],
            "slimmedJets": [
                { "p4": { "pt": 68.0, "eta": -2.05, "phi": -2.0 } }
            ]
        }
    }));

    let (cols, _) = columns(&EventRecordBuilder::new(), &event);
    // The first gen jet is the gen muon itself and is removed
    assert_eq!(cols.ngj, 1);
    assert_eq!(cols.ngl, 2);
    // Both gen muons are in the window; the later one wins
    assert_eq!(cols.l_g, vec![1]);
    assert_eq!(cols.j_g, vec![0]);
    assert_eq!(cols.j_id, vec![0]);
}

#[test]
fn test_filter_from_json() {
    let event = resolve(json!({
        "run": 1, "lumi": 1, "event": 9,
        "collections": {
            "slimmedMuons": [
                { "p4": { "pt": 3.0, "eta": 0.5, "phi": 0.0 }, "is_pf": true, "is_global": true },
                { "p4": { "pt": 3.0, "eta": 2.8, "phi": 0.0 }, "is_me0": true }
            ]
        }
    }));

    let filter = MuonFilter::new(Arc::new(hepsel_id::GeometryMap::new()));
    let out = filter.produce_event(&event);
    assert_eq!(out.id.event, 9);
    assert_eq!(out.muons.loose.len(), 1);
    assert_eq!(out.muons.loose[0].p4.eta, 0.5);
}
