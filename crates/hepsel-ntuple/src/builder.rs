//! Event record builder
//!
//! Fills one [`FlatEventRecord`] per event, in a fixed order:
//!
//! 1. generator-level jets, leptons and their isolation (simulation only)
//! 2. primary vertex; without one the reco columns stay empty
//! 3. muons then electrons into the shared lepton columns
//! 4. jets, after removing lepton duplicates
//! 5. missing transverse momentum (first entry only)
//! 6. particle-flow leptons
//!
//! Gen links point into the gen columns already filled for the event, so a
//! link is always -1 or a populated slot.

use crate::cuts::{
    GEN_JET_ACCEPTANCE, GEN_LEPTON_ACCEPTANCE, JET_ACCEPTANCE, LEPTON_ACCEPTANCE,
    PF_LEPTON_ACCEPTANCE,
};
use crate::matching::{
    clean_gen_jets, encode_link, gen_isolation, gen_match, jet_overlaps_lepton, pf_isolation,
    MatchPolicy,
};
use crate::record::{
    FlatEventRecord, GenJetRow, GenLeptonRow, JetRow, LeptonRow, MetRow, PfLeptonRow,
};
use hepsel_core::{is_light_lepton, EventData, Vertex};
use hepsel_id::electron::electron_tiers;
use hepsel_id::jet::{csvv2, deepcsv, jet_tiers};
use hepsel_id::muon::ntuple_muon_tiers;
use hepsel_id::{
    ConversionVeto, JetQuality, MuonQuality, PfJetId, StandardConversionVeto,
    StandardMuonSelectors,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// How an event's record was populated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    /// All reco columns were filled
    Populated,
    /// No primary vertex; reco columns left empty
    NoPrimaryVertex,
}

/// Builds flat records from typed events using injected capabilities
#[derive(Clone)]
pub struct EventRecordBuilder {
    muon_quality: Arc<dyn MuonQuality>,
    jet_loose: Arc<dyn JetQuality>,
    jet_tight: Arc<dyn JetQuality>,
    conversion_veto: Arc<dyn ConversionVeto>,
    lepton_match: MatchPolicy,
    jet_match: MatchPolicy,
}

impl Default for EventRecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EventRecordBuilder {
    /// Builder with the standard selectors, PF jet id and conversion veto
    pub fn new() -> Self {
        Self {
            muon_quality: Arc::new(StandardMuonSelectors),
            jet_loose: Arc::new(PfJetId::loose()),
            jet_tight: Arc::new(PfJetId::tight()),
            conversion_veto: Arc::new(StandardConversionVeto::default()),
            lepton_match: MatchPolicy::LastQualifying,
            // First match wins: the jet loop exits on its first gen hit
            jet_match: MatchPolicy::FirstQualifying,
        }
    }

    pub fn with_muon_quality(mut self, quality: Arc<dyn MuonQuality>) -> Self {
        self.muon_quality = quality;
        self
    }

    pub fn with_jet_quality(mut self, loose: Arc<dyn JetQuality>, tight: Arc<dyn JetQuality>) -> Self {
        self.jet_loose = loose;
        self.jet_tight = tight;
        self
    }

    pub fn with_conversion_veto(mut self, veto: Arc<dyn ConversionVeto>) -> Self {
        self.conversion_veto = veto;
        self
    }

    /// Override the lepton and jet gen-match tie-breaks
    pub fn with_match_policies(mut self, lepton: MatchPolicy, jet: MatchPolicy) -> Self {
        self.lepton_match = lepton;
        self.jet_match = jet;
        self
    }

    /// Build a fresh record for `event`
    pub fn build(&self, event: &EventData) -> (FlatEventRecord, BuildOutcome) {
        let mut record = FlatEventRecord::new(event.id);
        let outcome = self.populate(event, &mut record);
        (record, outcome)
    }

    /// Reset `record` and fill it from `event`
    pub fn populate(&self, event: &EventData, record: &mut FlatEventRecord) -> BuildOutcome {
        record.reset(event.id);

        if !event.is_real_data {
            self.fill_gen(event, record);
        }

        let outcome = match event.primary_vertex() {
            Some(pv) => {
                self.fill_leptons(event, pv, record);
                self.fill_jets(event, record);
                Self::fill_met(event, record);
                Self::fill_pf_leptons(event, record);
                BuildOutcome::Populated
            }
            None => {
                debug!(
                    run = event.id.run,
                    event = event.id.event,
                    vertices = event.vertices.len(),
                    "No primary vertex, reco columns left empty"
                );
                metrics::counter!("hepsel_events_skipped_total", "reason" => "no_primary_vertex")
                    .increment(1);
                BuildOutcome::NoPrimaryVertex
            }
        };

        for (column, dropped) in record.truncations() {
            warn!(
                column,
                dropped,
                event = event.id.event,
                "Object count exceeds record capacity, truncating"
            );
            metrics::counter!("hepsel_truncated_objects_total", "column" => column)
                .increment(dropped as u64);
        }

        outcome
    }

    fn fill_gen(&self, event: &EventData, record: &mut FlatEventRecord) {
        let accepted = event
            .gen_jets
            .iter()
            .filter(|jet| GEN_JET_ACCEPTANCE.accepts(&jet.p4));
        let clean = clean_gen_jets(accepted, &event.gen_particles);

        for jet in &clean {
            record.gen_jets.push(GenJetRow {
                pt: jet.p4.pt,
                eta: jet.p4.eta,
                phi: jet.p4.phi,
                mass: jet.p4.mass,
                pid: jet.pdg_id,
            });
        }

        for particle in &event.gen_particles {
            if !is_light_lepton(particle.pdg_id) || !GEN_LEPTON_ACCEPTANCE.accepts(&particle.p4) {
                continue;
            }
            record.gen_leptons.push(GenLeptonRow {
                pid: particle.pdg_id,
                pt: particle.p4.pt,
                eta: particle.p4.eta,
                phi: particle.p4.phi,
                mass: particle.p4.mass,
                rel_iso: gen_isolation(particle, &clean),
            });
        }
    }

    /// Slot of the gen lepton linked to a reco lepton with this pid and direction
    fn lepton_gen_link(&self, record: &FlatEventRecord, pid: i32, eta: f64, phi: f64) -> i32 {
        let candidates = record
            .gen_leptons
            .iter()
            .enumerate()
            .filter(|(_, gen)| gen.pid.abs() == pid.abs())
            .map(|(index, gen)| (index, gen.eta, gen.phi));
        encode_link(gen_match(eta, phi, candidates, self.lepton_match))
    }

    fn fill_leptons(&self, event: &EventData, pv: &Vertex, record: &mut FlatEventRecord) {
        for muon in &event.muons {
            if !LEPTON_ACCEPTANCE.accepts(&muon.p4) {
                continue;
            }
            let tiers = ntuple_muon_tiers(muon, self.muon_quality.as_ref(), Some(pv));
            let pid = muon.pdg_id();
            let row = LeptonRow {
                id: tiers.bitmask(),
                pid,
                pt: muon.p4.pt,
                eta: muon.p4.eta,
                phi: muon.p4.phi,
                rel_iso: muon.rel_iso(),
                gen: self.lepton_gen_link(record, pid, muon.p4.eta, muon.p4.phi),
            };
            record.leptons.push(row);
        }

        for electron in &event.electrons {
            if !LEPTON_ACCEPTANCE.accepts(&electron.p4) {
                continue;
            }
            let tiers = electron_tiers(
                electron,
                &event.conversions,
                &event.beamspot.position,
                self.conversion_veto.as_ref(),
            );
            let pid = electron.pdg_id();
            let row = LeptonRow {
                id: tiers.bitmask(),
                pid,
                pt: electron.p4.pt,
                eta: electron.p4.eta,
                phi: electron.p4.phi,
                rel_iso: electron.rel_iso(),
                gen: self.lepton_gen_link(record, pid, electron.p4.eta, electron.p4.phi),
            };
            record.leptons.push(row);
        }
    }

    fn fill_jets(&self, event: &EventData, record: &mut FlatEventRecord) {
        for jet in &event.jets {
            if !JET_ACCEPTANCE.accepts(&jet.p4) {
                continue;
            }
            let electrons = event.electrons.iter().map(|e| &e.p4);
            let muons = event.muons.iter().map(|m| &m.p4);
            if jet_overlaps_lepton(&jet.p4, electrons, muons) {
                continue;
            }

            let tiers = jet_tiers(jet, self.jet_loose.as_ref(), self.jet_tight.as_ref());
            let candidates = record
                .gen_jets
                .iter()
                .enumerate()
                .map(|(index, gen)| (index, gen.eta, gen.phi));
            let gen = encode_link(gen_match(jet.p4.eta, jet.p4.phi, candidates, self.jet_match));

            record.jets.push(JetRow {
                id: tiers.bitmask(),
                pt: jet.p4.pt,
                eta: jet.p4.eta,
                phi: jet.p4.phi,
                mass: jet.p4.mass,
                csvv2: csvv2(jet),
                deepcsv: deepcsv(jet),
                flavour: jet.parton_flavour,
                hadron_flavour: jet.hadron_flavour,
                parton_pid: jet.gen_parton_pdg_id.unwrap_or(0),
                gen,
            });
        }
    }

    fn fill_met(event: &EventData, record: &mut FlatEventRecord) {
        if let Some(met) = event.mets.first() {
            record.mets.push(MetRow {
                pt: met.pt,
                phi: met.phi,
            });
        }
    }

    fn fill_pf_leptons(event: &EventData, record: &mut FlatEventRecord) {
        for candidate in &event.pf_candidates {
            if !is_light_lepton(candidate.pdg_id) || !PF_LEPTON_ACCEPTANCE.accepts(&candidate.p4) {
                continue;
            }
            record.pf_leptons.push(PfLeptonRow {
                pid: candidate.pdg_id,
                pt: candidate.p4.pt,
                eta: candidate.p4.eta,
                phi: candidate.p4.phi,
                mass: candidate.p4.mass,
                rel_iso: pf_isolation(candidate, &event.pf_candidates),
                high_purity: candidate.track_high_purity,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hepsel_core::{GenJet, GenParticle, Jet, Met, Muon, PfCandidate, Vec3, P4};

    fn good_vertex() -> Vertex {
        Vertex {
            position: Vec3::ORIGIN,
            ndof: 10.0,
            is_fake: false,
        }
    }

    fn pf_muon(pt: f64) -> Muon {
        Muon {
            p4: P4::massless(pt, 0.5, 1.0),
            charge: 1,
            is_pf: true,
            is_tracker: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_real_data_skips_gen() {
        let event = EventData {
            is_real_data: true,
            vertices: vec![good_vertex()],
            gen_particles: vec![GenParticle {
                p4: P4::massless(20.0, 0.0, 0.0),
                pdg_id: 13,
            }],
            ..Default::default()
        };
        let (record, outcome) = EventRecordBuilder::new().build(&event);
        assert_eq!(outcome, BuildOutcome::Populated);
        assert!(record.gen_leptons.is_empty());
    }

    #[test]
    fn test_gen_filled_without_vertex() {
        let event = EventData {
            gen_particles: vec![GenParticle {
                p4: P4::massless(20.0, 0.0, 0.0),
                pdg_id: 13,
            }],
            muons: vec![pf_muon(20.0)],
            ..Default::default()
        };
        let (record, outcome) = EventRecordBuilder::new().build(&event);
        assert_eq!(outcome, BuildOutcome::NoPrimaryVertex);
        assert_eq!(record.gen_leptons.len(), 1);
        assert!(record.has_no_reco());
    }

    #[test]
    fn test_muon_pid_and_gen_link() {
        let event = EventData {
            vertices: vec![good_vertex()],
            gen_particles: vec![
                GenParticle {
                    p4: P4::massless(20.0, 0.5, 1.0),
                    pdg_id: -13,
                },
                // Electron at the same spot is never linked to a muon
                GenParticle {
                    p4: P4::massless(20.0, 0.5, 1.0),
                    pdg_id: 11,
                },
            ],
            muons: vec![pf_muon(20.0)],
            ..Default::default()
        };
        let (record, _) = EventRecordBuilder::new().build(&event);
        let lepton = record.leptons.get(0).copied().unwrap();
        assert_eq!(lepton.pid, 13);
        assert_eq!(lepton.gen, 0);
        assert_eq!(lepton.id, 4);
    }

    #[test]
    fn test_soft_and_far_forward_leptons_dropped() {
        let mut forward = pf_muon(20.0);
        forward.p4 = P4::massless(20.0, 3.2, 0.0);
        let event = EventData {
            vertices: vec![good_vertex()],
            muons: vec![pf_muon(9.0), forward],
            ..Default::default()
        };
        let (record, _) = EventRecordBuilder::new().build(&event);
        assert!(record.leptons.is_empty());
    }

    #[test]
    fn test_jet_overlapping_muon_removed() {
        let event = EventData {
            vertices: vec![good_vertex()],
            muons: vec![pf_muon(30.0)],
            jets: vec![
                Jet {
                    p4: P4::massless(30.1, 0.5, 1.0),
                    ..Default::default()
                },
                Jet {
                    p4: P4::massless(45.0, -1.0, 2.0),
                    gen_parton_pdg_id: Some(5),
                    parton_flavour: 5,
                    hadron_flavour: 5,
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let (record, _) = EventRecordBuilder::new().build(&event);
        assert_eq!(record.jets.len(), 1);
        let jet = record.jets.get(0).copied().unwrap();
        assert_eq!(jet.pt, 45.0);
        assert_eq!(jet.parton_pid, 5);
        assert_eq!(jet.gen, -1);
        assert_eq!(jet.csvv2, hepsel_core::MISSING_DISCRIMINATOR);
    }

    #[test]
    fn test_jet_links_first_gen_jet() {
        let gen_jet = |eta: f64| GenJet {
            p4: P4::massless(40.0, eta, 0.0),
            ..Default::default()
        };
        let event = EventData {
            vertices: vec![good_vertex()],
            gen_jets: vec![gen_jet(0.1), gen_jet(0.0), gen_jet(3.0)],
            jets: vec![Jet {
                p4: P4::massless(40.0, 0.0, 0.0),
                ..Default::default()
            }],
            ..Default::default()
        };
        let (record, _) = EventRecordBuilder::new().build(&event);
        assert_eq!(record.gen_jets.len(), 3);
        assert_eq!(record.jets.get(0).map(|j| j.gen), Some(0));
    }

    #[test]
    fn test_only_first_met_kept() {
        let event = EventData {
            vertices: vec![good_vertex()],
            mets: vec![Met { pt: 35.0, phi: 1.0 }, Met { pt: 80.0, phi: 2.0 }],
            ..Default::default()
        };
        let (record, _) = EventRecordBuilder::new().build(&event);
        assert_eq!(record.mets.len(), 1);
        assert_eq!(record.mets.get(0).map(|m| m.pt), Some(35.0));
        assert!(record.truncations().is_empty());
    }

    #[test]
    fn test_pf_leptons_selected_by_flavour() {
        let pf = |pdg_id: i32, pt: f64| PfCandidate {
            p4: P4::massless(pt, 0.0, 0.0),
            pdg_id,
            track_high_purity: true,
        };
        let event = EventData {
            vertices: vec![good_vertex()],
            pf_candidates: vec![pf(211, 50.0), pf(-11, 12.0), pf(13, 5.0)],
            ..Default::default()
        };
        let (record, _) = EventRecordBuilder::new().build(&event);
        assert_eq!(record.pf_leptons.len(), 1);
        let row = record.pf_leptons.get(0).copied().unwrap();
        assert_eq!(row.pid, -11);
        assert!(row.high_purity);
        // All three candidates sit on top of each other
        assert!((row.rel_iso - 67.0 / 12.0).abs() < 1e-12);
    }

    #[test]
    fn test_lepton_overflow_truncates() {
        let event = EventData {
            vertices: vec![good_vertex()],
            muons: (0..crate::record::MAX_OBJECTS + 5).map(|_| pf_muon(20.0)).collect(),
            ..Default::default()
        };
        let (record, _) = EventRecordBuilder::new().build(&event);
        assert_eq!(record.leptons.len(), crate::record::MAX_OBJECTS);
        assert_eq!(record.truncations(), vec![("leptons", 5)]);
    }

    #[test]
    fn test_populate_resets_previous_event() {
        let builder = EventRecordBuilder::new();
        let full = EventData {
            vertices: vec![good_vertex()],
            muons: vec![pf_muon(20.0)],
            ..Default::default()
        };
        let empty = EventData::default();
        let (mut record, _) = builder.build(&full);
        assert_eq!(record.leptons.len(), 1);
        assert_eq!(builder.populate(&empty, &mut record), BuildOutcome::NoPrimaryVertex);
        assert!(record.has_no_reco());
    }
}
