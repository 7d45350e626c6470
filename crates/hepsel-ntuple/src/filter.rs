//! Muon collection filter
//!
//! Splits each event's muons into loose, medium and tight collections, each
//! with a parallel relative-isolation sequence. Forward muons are identified
//! with the geometry-aware ME0 evaluator; the chamber geometry is swapped at
//! run boundaries and shared read-only by every event in between.

use crate::cuts::FILTER_MUON_ACCEPTANCE;
use hepsel_core::{EventData, EventId, Muon};
use hepsel_id::muon::filter_muon_tiers;
use hepsel_id::{GeometryLookup, MuonQuality, StandardMuonSelectors, Tier};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Per-tier muon collections, each preserving input order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilteredMuons {
    pub loose: Vec<Muon>,
    pub loose_rel_iso: Vec<f64>,
    pub medium: Vec<Muon>,
    pub medium_rel_iso: Vec<f64>,
    pub tight: Vec<Muon>,
    pub tight_rel_iso: Vec<f64>,
}

impl FilteredMuons {
    fn push(&mut self, tier: Tier, muon: &Muon, rel_iso: f64) {
        let (muons, isolation) = match tier {
            Tier::Loose => (&mut self.loose, &mut self.loose_rel_iso),
            Tier::Medium => (&mut self.medium, &mut self.medium_rel_iso),
            Tier::Tight => (&mut self.tight, &mut self.tight_rel_iso),
        };
        muons.push(muon.clone());
        isolation.push(rel_iso);
    }

    pub fn len(&self, tier: Tier) -> usize {
        match tier {
            Tier::Loose => self.loose.len(),
            Tier::Medium => self.medium.len(),
            Tier::Tight => self.tight.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        Tier::ALL.iter().all(|tier| self.len(*tier) == 0)
    }
}

/// Filter output tagged with its event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilteredEvent {
    #[serde(flatten)]
    pub id: EventId,
    #[serde(flatten)]
    pub muons: FilteredMuons,
}

/// Produces [`FilteredMuons`] per event
#[derive(Clone)]
pub struct MuonFilter {
    quality: Arc<dyn MuonQuality>,
    geometry: Arc<dyn GeometryLookup>,
}

impl MuonFilter {
    /// Filter with the standard muon selectors
    pub fn new(geometry: Arc<dyn GeometryLookup>) -> Self {
        Self {
            quality: Arc::new(StandardMuonSelectors),
            geometry,
        }
    }

    pub fn with_muon_quality(mut self, quality: Arc<dyn MuonQuality>) -> Self {
        self.quality = quality;
        self
    }

    /// Replace the chamber geometry at a run boundary
    pub fn begin_run(&mut self, geometry: Arc<dyn GeometryLookup>) {
        self.geometry = geometry;
    }

    pub fn produce(&self, event: &EventData) -> FilteredMuons {
        let pv = event.primary_vertex();
        if pv.is_none() {
            debug!(event = event.id.event, "No primary vertex, tight and track gates disabled");
        }

        let mut output = FilteredMuons::default();
        for muon in &event.muons {
            if !FILTER_MUON_ACCEPTANCE.accepts(&muon.p4) {
                continue;
            }
            let tiers = filter_muon_tiers(muon, self.quality.as_ref(), self.geometry.as_ref(), pv);
            let rel_iso = muon.rel_iso();
            for tier in Tier::ALL {
                if tiers.passes(tier) {
                    output.push(tier, muon, rel_iso);
                }
            }
        }

        for tier in Tier::ALL {
            let selected = output.len(tier) as u64;
            if selected > 0 {
                metrics::counter!("hepsel_selected_objects_total", "kind" => "muon", "tier" => tier.as_str())
                    .increment(selected);
            }
        }
        output
    }

    /// Produce and tag with the event id
    pub fn produce_event(&self, event: &EventData) -> FilteredEvent {
        FilteredEvent {
            id: event.id,
            muons: self.produce(event),
        }
    }
}
