//! Muon identification
//!
//! A muon's tier combines the central-detector predicates with the ME0
//! extended forward selection, which only applies beyond |η| = 2.4. The
//! flat-record pipeline and the collection filter parameterize the forward
//! branch differently:
//!
//! | pipeline | forward evaluator | track gates             | central gated by η |
//! |----------|-------------------|-------------------------|--------------------|
//! | ntuple   | legacy (local)    | none                    | yes                |
//! | filter   | geometry-aware    | medium and tight        | no                 |

use crate::capability::MuonQuality;
use crate::geometry::GeometryLookup;
use crate::me0::{me0_geometry_match, me0_legacy_match, GlobalCuts, LegacyCuts};
use crate::tier::TierClassification;
use hepsel_core::{Muon, Vertex};

/// Edge of the central muon system acceptance
pub const FORWARD_ETA_BOUNDARY: f64 = 2.4;

/// Transverse impact parameter gate (cm)
pub const MAX_DXY: f64 = 0.2;

/// Longitudinal impact parameter gate (cm)
pub const MAX_DZ: f64 = 0.5;

/// Legacy forward cuts used by the flat-record pipeline (loose, medium, tight)
pub const NTUPLE_FORWARD_CUTS: [LegacyCuts; 3] = [
    LegacyCuts {
        pull_x: 3.0,
        dx: 4.0,
        pull_y: 3.0,
        dy: 4.0,
        dphi: 0.5,
    },
    LegacyCuts {
        pull_x: 3.0,
        dx: 4.0,
        pull_y: 3.0,
        dy: 4.0,
        dphi: 0.3,
    },
    LegacyCuts {
        pull_x: 3.0,
        dx: 4.0,
        pull_y: 3.0,
        dy: 4.0,
        dphi: 0.1,
    },
];

/// `clamp(k/p, k/100, ceiling)`: tighter at high momentum, bounded on both sides
pub fn momentum_scaled_cut(k: f64, p: f64, ceiling: f64) -> f64 {
    (k / p).max(k / 100.0).min(ceiling)
}

/// Momentum-dependent geometry-aware cuts used by the collection filter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForwardCuts {
    pub loose: GlobalCuts,
    pub medium: GlobalCuts,
    pub tight: GlobalCuts,
}

impl ForwardCuts {
    pub fn for_momentum(p: f64) -> Self {
        let loose = GlobalCuts {
            deta: 0.077,
            dphi: momentum_scaled_cut(1.2, p, 0.056),
            dphi_bend: momentum_scaled_cut(0.2, p, 0.0096),
        };
        let tight = GlobalCuts {
            deta: 0.048,
            dphi: momentum_scaled_cut(1.2, p, 0.032),
            dphi_bend: momentum_scaled_cut(0.2, p, 0.0041),
        };
        // Medium is loose plus track requirements for now
        Self {
            loose,
            medium: loose,
            tight,
        }
    }
}

/// Track-quality gates measured against the primary vertex
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackGates {
    pub ipxy: bool,
    pub ipz: bool,
    pub valid_pixel_hit: bool,
    pub high_purity: bool,
}

impl TrackGates {
    /// All gates default to false without an inner track; the impact
    /// parameter gates also need a primary vertex.
    pub fn evaluate(muon: &Muon, primary_vertex: Option<&Vertex>) -> Self {
        let Some(inner) = muon.inner_track.as_ref() else {
            return Self::default();
        };
        let (ipxy, ipz) = match (primary_vertex, muon.muon_best_track()) {
            (Some(pv), Some(best)) => (
                best.dxy(&pv.position).abs() < MAX_DXY,
                best.dz(&pv.position).abs() < MAX_DZ,
            ),
            _ => (false, false),
        };
        Self {
            ipxy,
            ipz,
            valid_pixel_hit: inner.valid_pixel_hits > 0,
            high_purity: inner.high_purity,
        }
    }

    pub fn medium(&self) -> bool {
        self.ipxy && self.valid_pixel_hit && self.high_purity
    }

    pub fn tight(&self) -> bool {
        self.medium() && self.ipz
    }
}

pub fn in_forward_region(muon: &Muon) -> bool {
    muon.p4.abs_eta() > FORWARD_ETA_BOUNDARY
}

/// Central-detector tiers; tight needs a primary vertex
pub fn central_tiers(
    muon: &Muon,
    quality: &dyn MuonQuality,
    primary_vertex: Option<&Vertex>,
) -> TierClassification {
    TierClassification {
        loose: quality.is_loose(muon),
        medium: quality.is_medium(muon),
        tight: primary_vertex.is_some_and(|pv| quality.is_tight(muon, pv)),
    }
}

/// Legacy ME0 tiers with the flat-record cut set
pub fn forward_tiers_legacy(muon: &Muon) -> TierClassification {
    let [loose, medium, tight] = &NTUPLE_FORWARD_CUTS;
    TierClassification {
        loose: me0_legacy_match(muon, loose),
        medium: me0_legacy_match(muon, medium),
        tight: me0_legacy_match(muon, tight),
    }
}

/// Geometry-aware ME0 tiers with momentum-scaled cuts and track gates
pub fn forward_tiers_geometry(
    muon: &Muon,
    geometry: &dyn GeometryLookup,
    primary_vertex: Option<&Vertex>,
) -> TierClassification {
    let cuts = ForwardCuts::for_momentum(muon.p4.p());
    let gates = TrackGates::evaluate(muon, primary_vertex);
    TierClassification {
        loose: me0_geometry_match(muon, geometry, &cuts.loose),
        medium: gates.medium() && me0_geometry_match(muon, geometry, &cuts.medium),
        tight: gates.tight() && me0_geometry_match(muon, geometry, &cuts.tight),
    }
}

/// Muon tiers for the flat-record pipeline.
///
/// Up to |η| = 2.4 only the central predicates count; beyond it only the
/// legacy ME0 selection does.
pub fn ntuple_muon_tiers(
    muon: &Muon,
    quality: &dyn MuonQuality,
    primary_vertex: Option<&Vertex>,
) -> TierClassification {
    if in_forward_region(muon) {
        forward_tiers_legacy(muon)
    } else {
        central_tiers(muon, quality, primary_vertex)
    }
}

/// Muon tiers for the collection filter: central OR (forward AND ME0)
pub fn filter_muon_tiers(
    muon: &Muon,
    quality: &dyn MuonQuality,
    geometry: &dyn GeometryLookup,
    primary_vertex: Option<&Vertex>,
) -> TierClassification {
    let central = central_tiers(muon, quality, primary_vertex);
    if !in_forward_region(muon) {
        return central;
    }
    central.or(forward_tiers_geometry(muon, geometry, primary_vertex))
}

/// Standard CMS muon selectors (loose / medium / tight)
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardMuonSelectors;

impl StandardMuonSelectors {
    fn is_good_global(muon: &Muon) -> bool {
        muon.is_global
            && muon.global_normalized_chi2 < 3.0
            && muon.chi2_local_position < 12.0
            && muon.track_kink < 20.0
    }
}

impl MuonQuality for StandardMuonSelectors {
    fn is_loose(&self, muon: &Muon) -> bool {
        muon.is_pf && (muon.is_global || muon.is_tracker)
    }

    fn is_medium(&self, muon: &Muon) -> bool {
        if !self.is_loose(muon) {
            return false;
        }
        let Some(inner) = muon.inner_track.as_ref() else {
            return false;
        };
        let compatibility = if Self::is_good_global(muon) { 0.303 } else { 0.451 };
        inner.valid_fraction > 0.8 && muon.segment_compatibility > compatibility
    }

    fn is_tight(&self, muon: &Muon, vertex: &Vertex) -> bool {
        let (Some(inner), Some(best)) = (muon.inner_track.as_ref(), muon.muon_best_track()) else {
            return false;
        };
        muon.is_global
            && muon.is_pf
            && muon.global_normalized_chi2 < 10.0
            && muon.valid_muon_hits > 0
            && muon.matched_stations > 1
            && best.dxy(&vertex.position).abs() < MAX_DXY
            && best.dz(&vertex.position).abs() < MAX_DZ
            && inner.valid_pixel_hits > 0
            && inner.tracker_layers_with_measurement > 5
    }
}
