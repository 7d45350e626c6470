//! ME0 chamber/segment matching for extended forward muons
//!
//! Two evaluators exist:
//! - the legacy one works in local chamber coordinates and only looks at
//!   the residuals of the last ME0 chamber/segment pair it iterates over;
//! - the geometry-aware one converts both positions to global coordinates
//!   and accepts the muon as soon as any pair passes all three cuts.
//!
//! Both reject muons not tagged as ME0 muons without looking at their
//! chamber matches.

use crate::geometry::{ChamberGeometry, GeometryLookup};
use hepsel_core::{ChamberMatch, Muon, SegmentMatch, Vec3, ME0_DETECTOR_ID};
use tracing::debug;

/// Residual value used before any ME0 pair has been seen
pub const UNSET_RESIDUAL: f64 = 999.0;

/// Cuts of the local-coordinate evaluator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegacyCuts {
    pub pull_x: f64,
    pub dx: f64,
    pub pull_y: f64,
    pub dy: f64,
    pub dphi: f64,
}

/// Local-coordinate residuals of one chamber/segment pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalResiduals {
    pub dx: f64,
    pub dy: f64,
    pub pull_x: f64,
    pub pull_y: f64,
    pub dphi: f64,
}

impl LocalResiduals {
    pub const UNSET: LocalResiduals = LocalResiduals {
        dx: UNSET_RESIDUAL,
        dy: UNSET_RESIDUAL,
        pull_x: UNSET_RESIDUAL,
        pull_y: UNSET_RESIDUAL,
        dphi: UNSET_RESIDUAL,
    };

    pub fn between(chamber: &ChamberMatch, segment: &SegmentMatch) -> Self {
        let dx = (chamber.x - segment.x).abs();
        let dy = (chamber.y - segment.y).abs();
        Self {
            dx,
            dy,
            pull_x: dx / (chamber.x_err + segment.x_err).sqrt(),
            pull_y: dy / (chamber.y_err + segment.y_err).sqrt(),
            dphi: (chamber.dxdz.atan() - segment.dxdz.atan()).abs(),
        }
    }

    pub fn passes(&self, cuts: &LegacyCuts) -> bool {
        let x_match = self.pull_x < cuts.pull_x || self.dx < cuts.dx;
        let y_match = self.pull_y < cuts.pull_y || self.dy < cuts.dy;
        let dir_match = self.dphi < cuts.dphi;
        x_match && y_match && dir_match
    }
}

/// Residuals of the last ME0 chamber/segment pair in iteration order
pub fn last_local_residuals(muon: &Muon) -> Option<LocalResiduals> {
    muon.matches
        .iter()
        .filter(|chamber| chamber.detector == ME0_DETECTOR_ID)
        .flat_map(|chamber| {
            chamber
                .me0_matches
                .iter()
                .map(move |segment| LocalResiduals::between(chamber, segment))
        })
        .last()
}

/// Local-coordinate ME0 selection.
///
/// Only the final ME0 pair is tested, even if an earlier one would pass.
pub fn me0_legacy_match(muon: &Muon, cuts: &LegacyCuts) -> bool {
    if !muon.is_me0 {
        return false;
    }
    last_local_residuals(muon)
        .unwrap_or(LocalResiduals::UNSET)
        .passes(cuts)
}

/// Cuts of the geometry-aware evaluator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalCuts {
    pub deta: f64,
    pub dphi: f64,
    pub dphi_bend: f64,
}

/// Global-frame residuals of one chamber/segment pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalResiduals {
    pub deta: f64,
    pub dphi: f64,
    pub dphi_bend: f64,
}

impl GlobalResiduals {
    pub fn between(
        chamber: &ChamberMatch,
        segment: &SegmentMatch,
        geometry: &dyn ChamberGeometry,
    ) -> Self {
        let track_local = Vec3::new(chamber.x, chamber.y, 0.0);
        let segment_local = Vec3::new(segment.x, segment.y, 0.0);
        let track_direction = Vec3::new(chamber.dxdz, chamber.dydz, 1.0);

        let track_global = geometry.to_global(&track_local);
        let segment_global = geometry.to_global(&segment_local);

        let segment_bend = (chamber.dxdz.atan() - segment.dxdz.atan()).abs();
        let track_bend = geometry.compute_delta_phi(&track_local, &track_direction);

        Self {
            deta: (track_global.eta() - segment_global.eta()).abs(),
            // Unwrapped: a pair straddling φ = ±π does not match
            dphi: (track_global.phi() - segment_global.phi()).abs(),
            dphi_bend: (segment_bend - track_bend).abs(),
        }
    }

    pub fn passes(&self, cuts: &GlobalCuts) -> bool {
        self.deta < cuts.deta && self.dphi < cuts.dphi && self.dphi_bend < cuts.dphi_bend
    }
}

/// Geometry-aware ME0 selection: true if any ME0 pair passes.
///
/// Pairs whose chamber is unknown to the geometry are skipped.
pub fn me0_geometry_match(muon: &Muon, geometry: &dyn GeometryLookup, cuts: &GlobalCuts) -> bool {
    if !muon.is_me0 {
        return false;
    }

    let mut result = false;
    for chamber in muon.matches.iter().filter(|c| c.detector == ME0_DETECTOR_ID) {
        let Some(placement) = geometry.chamber(chamber.chamber_id) else {
            debug!(chamber_id = chamber.chamber_id, "ME0 chamber not in geometry, skipping");
            continue;
        };
        for segment in &chamber.me0_matches {
            if GlobalResiduals::between(chamber, segment, placement).passes(cuts) {
                result = true;
            }
        }
    }
    result
}
