//! Jet identification and b-tagging constants

use crate::capability::JetQuality;
use crate::tier::JetTiers;
use hepsel_core::Jet;
use serde::{Deserialize, Serialize};

/// Combined secondary-vertex v2 discriminator name
pub const CSVV2_DISCRIMINATOR: &str = "pfCombinedInclusiveSecondaryVertexV2BJetTags";

/// DeepCSV discriminator names; the b-tag score is their sum
pub const DEEPCSV_DISCRIMINATORS: [&str; 2] = ["pfDeepCSVJetTags:probb", "pfDeepCSVJetTags:probbb"];

/// Charged-component cuts only apply inside the tracker acceptance
pub const TRACKER_ETA_LIMIT: f64 = 2.4;

/// Named pass/fail bits recorded while a jet is evaluated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JetIdBits {
    labels: &'static [&'static str],
    bits: u32,
}

impl JetIdBits {
    pub fn new(labels: &'static [&'static str]) -> Self {
        Self { labels, bits: 0 }
    }

    fn index(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| *l == label)
    }

    /// Set a named bit; unknown labels are ignored
    pub fn set(&mut self, label: &str, value: bool) {
        if let Some(i) = self.index(label) {
            if value {
                self.bits |= 1 << i;
            } else {
                self.bits &= !(1 << i);
            }
        }
    }

    pub fn test(&self, label: &str) -> bool {
        self.index(label).is_some_and(|i| self.bits & (1 << i) != 0)
    }

    pub fn reset(&mut self) {
        self.bits = 0;
    }

    pub fn count(&self) -> u32 {
        self.bits.count_ones()
    }

    pub fn all(&self) -> bool {
        self.count() as usize == self.labels.len()
    }

    pub fn labels(&self) -> &'static [&'static str] {
        self.labels
    }
}

/// Particle-flow jet id working point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JetIdQuality {
    Loose,
    Tight,
}

/// Particle-flow jet id, first-data version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PfJetId {
    quality: JetIdQuality,
}

impl PfJetId {
    pub const LABELS: &'static [&'static str] = &["CHF", "NHF", "CEF", "NEF", "NCH", "nConstituents"];

    pub fn new(quality: JetIdQuality) -> Self {
        Self { quality }
    }

    pub fn loose() -> Self {
        Self::new(JetIdQuality::Loose)
    }

    pub fn tight() -> Self {
        Self::new(JetIdQuality::Tight)
    }

    pub fn quality(&self) -> JetIdQuality {
        self.quality
    }

    /// Upper bound on the neutral hadron and neutral EM fractions
    fn max_neutral_fraction(&self) -> f64 {
        match self.quality {
            JetIdQuality::Loose => 0.99,
            JetIdQuality::Tight => 0.90,
        }
    }
}

impl JetQuality for PfJetId {
    fn bit_template(&self) -> JetIdBits {
        JetIdBits::new(Self::LABELS)
    }

    fn check(&self, jet: &Jet, bits: &mut JetIdBits) -> bool {
        let outside_tracker = jet.p4.abs_eta() > TRACKER_ETA_LIMIT;
        let max_neutral = self.max_neutral_fraction();

        bits.set("CHF", outside_tracker || jet.charged_hadron_fraction > 0.0);
        bits.set("NHF", jet.neutral_hadron_fraction < max_neutral);
        bits.set("CEF", outside_tracker || jet.charged_em_fraction < 0.99);
        bits.set("NEF", jet.neutral_em_fraction < max_neutral);
        bits.set("NCH", outside_tracker || jet.charged_multiplicity > 0);
        bits.set("nConstituents", jet.n_constituents > 1);

        bits.all()
    }
}

/// Run both jet id functors on fresh bitsets
pub fn jet_tiers(jet: &Jet, loose: &dyn JetQuality, tight: &dyn JetQuality) -> JetTiers {
    let mut loose_bits = loose.bit_template();
    let mut tight_bits = tight.bit_template();
    JetTiers {
        loose: loose.check(jet, &mut loose_bits),
        tight: tight.check(jet, &mut tight_bits),
    }
}

/// CSVv2 discriminator, or -1000 when absent
pub fn csvv2(jet: &Jet) -> f64 {
    jet.b_discriminator(CSVV2_DISCRIMINATOR)
}

/// DeepCSV b + bb probability
pub fn deepcsv(jet: &Jet) -> f64 {
    DEEPCSV_DISCRIMINATORS
        .iter()
        .map(|name| jet.b_discriminator(name))
        .sum()
}

/// Published b-tagging working points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BTagWorkingPoint {
    Loose,
    Medium,
    Tight,
}

impl BTagWorkingPoint {
    pub fn csvv2_threshold(&self) -> f64 {
        match self {
            Self::Loose => 0.5426,
            Self::Medium => 0.8484,
            Self::Tight => 0.9535,
        }
    }

    pub fn deepcsv_threshold(&self) -> f64 {
        match self {
            Self::Loose => 0.2219,
            Self::Medium => 0.6324,
            Self::Tight => 0.8958,
        }
    }

    pub fn passes_csvv2(&self, jet: &Jet) -> bool {
        csvv2(jet) > self.csvv2_threshold()
    }

    pub fn passes_deepcsv(&self, jet: &Jet) -> bool {
        deepcsv(jet) > self.deepcsv_threshold()
    }
}
