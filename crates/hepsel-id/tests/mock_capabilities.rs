//! Mock capabilities for testing
//!
//! Configurable implementations of the muon quality, jet quality and
//! conversion veto capabilities, used to drive the identification rules
//! through each branch.

use hepsel_core::{Conversion, Electron, Jet, Muon, Vec3, Vertex};
use hepsel_id::{ConversionVeto, JetIdBits, JetQuality, MuonQuality};
use std::sync::atomic::{AtomicU32, Ordering};

/// A configurable muon quality capability
pub struct MockMuonQuality {
    loose: bool,
    medium: bool,
    tight: bool,
    tight_calls: AtomicU32,
}

impl MockMuonQuality {
    /// Create a mock that rejects every tier
    pub fn new() -> Self {
        Self {
            loose: false,
            medium: false,
            tight: false,
            tight_calls: AtomicU32::new(0),
        }
    }

    pub fn with_loose(mut self, value: bool) -> Self {
        self.loose = value;
        self
    }

    pub fn with_medium(mut self, value: bool) -> Self {
        self.medium = value;
        self
    }

    pub fn with_tight(mut self, value: bool) -> Self {
        self.tight = value;
        self
    }

    /// Number of times the tight predicate was consulted
    pub fn tight_calls(&self) -> u32 {
        self.tight_calls.load(Ordering::Relaxed)
    }
}

impl MuonQuality for MockMuonQuality {
    fn is_loose(&self, _muon: &Muon) -> bool {
        self.loose
    }

    fn is_medium(&self, _muon: &Muon) -> bool {
        self.medium
    }

    fn is_tight(&self, _muon: &Muon, _vertex: &Vertex) -> bool {
        self.tight_calls.fetch_add(1, Ordering::Relaxed);
        self.tight
    }
}

/// A jet quality capability with a fixed answer
pub struct MockJetQuality {
    pass: bool,
}

impl MockJetQuality {
    const LABELS: &'static [&'static str] = &["mock"];

    pub fn passing() -> Self {
        Self { pass: true }
    }

    pub fn failing() -> Self {
        Self { pass: false }
    }
}

impl JetQuality for MockJetQuality {
    fn bit_template(&self) -> JetIdBits {
        JetIdBits::new(Self::LABELS)
    }

    fn check(&self, _jet: &Jet, bits: &mut JetIdBits) -> bool {
        bits.set("mock", self.pass);
        self.pass
    }
}

/// A conversion veto that flags a fixed set of GSF track ids
pub struct MockConversionVeto {
    converted_tracks: Vec<u64>,
}

impl MockConversionVeto {
    pub fn none() -> Self {
        Self {
            converted_tracks: Vec::new(),
        }
    }

    pub fn with_converted(mut self, track_id: u64) -> Self {
        self.converted_tracks.push(track_id);
        self
    }
}

impl ConversionVeto for MockConversionVeto {
    fn has_matched_conversion(
        &self,
        electron: &Electron,
        _conversions: &[Conversion],
        _beamspot: &Vec3,
    ) -> bool {
        self.converted_tracks.contains(&electron.gsf_track_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hepsel_core::P4;
    use hepsel_id::{electron_tiers, filter_muon_tiers, jet_tiers, ntuple_muon_tiers};
    use hepsel_id::{GeometryMap, TierClassification};

    fn vertex() -> Vertex {
        Vertex {
            position: Vec3::ORIGIN,
            ndof: 20.0,
            is_fake: false,
        }
    }

    fn barrel_electron(track: u64) -> Electron {
        Electron {
            p4: P4::massless(40.0, 0.2, 1.0),
            supercluster_eta: 0.2,
            ecal_energy: 40.0,
            e_supercluster_over_p: 1.0,
            gsf_track_id: track,
            ..Default::default()
        }
    }

    #[test]
    fn test_loose_only_central_muon() {
        let quality = MockMuonQuality::new().with_loose(true);
        let muon = Muon {
            p4: P4::massless(20.0, 1.2, 0.0),
            ..Default::default()
        };
        let tiers = ntuple_muon_tiers(&muon, &quality, Some(&vertex()));
        assert_eq!(tiers.bitmask(), 4);
    }

    #[test]
    fn test_tight_not_consulted_without_vertex() {
        let quality = MockMuonQuality::new().with_tight(true);
        let muon = Muon {
            p4: P4::massless(20.0, 0.0, 0.0),
            ..Default::default()
        };
        let tiers = ntuple_muon_tiers(&muon, &quality, None);
        assert!(!tiers.tight);
        assert_eq!(quality.tight_calls(), 0);

        let tiers = ntuple_muon_tiers(&muon, &quality, Some(&vertex()));
        assert!(tiers.tight);
        assert_eq!(quality.tight_calls(), 1);
    }

    #[test]
    fn test_forward_muon_without_me0_fails_in_ntuple_but_not_filter() {
        let quality = MockMuonQuality::new().with_loose(true).with_medium(true);
        let muon = Muon {
            p4: P4::massless(20.0, 2.7, 0.0),
            ..Default::default()
        };
        let geometry = GeometryMap::new();
        assert_eq!(ntuple_muon_tiers(&muon, &quality, None), TierClassification::none());
        assert_eq!(
            filter_muon_tiers(&muon, &quality, &geometry, None),
            TierClassification::new(true, true, false)
        );
    }

    #[test]
    fn test_conversion_veto_capability() {
        let veto = MockConversionVeto::none().with_converted(9);
        let clean = electron_tiers(&barrel_electron(1), &[], &Vec3::ORIGIN, &veto);
        let converted = electron_tiers(&barrel_electron(9), &[], &Vec3::ORIGIN, &veto);
        assert_eq!(clean.bitmask(), 7);
        assert_eq!(converted.bitmask(), 0);
    }

    #[test]
    fn test_jet_quality_capability() {
        let jet = Jet::default();
        let tiers = jet_tiers(&jet, &MockJetQuality::passing(), &MockJetQuality::failing());
        assert!(tiers.loose);
        assert!(!tiers.tight);
        assert_eq!(tiers.bitmask(), 2);
    }
}
