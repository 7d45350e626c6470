//! Identification tiers and their bitmask encodings

use serde::{Deserialize, Serialize};

/// Identification strictness level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Loose,
    Medium,
    Tight,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Loose, Tier::Medium, Tier::Tight];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Loose => "loose",
            Self::Medium => "medium",
            Self::Tight => "tight",
        }
    }
}

/// Independent loose/medium/tight flags for one object.
///
/// Tight does not imply medium or loose; each flag is evaluated on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierClassification {
    pub loose: bool,
    pub medium: bool,
    pub tight: bool,
}

impl TierClassification {
    pub fn new(loose: bool, medium: bool, tight: bool) -> Self {
        Self {
            loose,
            medium,
            tight,
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn passes(&self, tier: Tier) -> bool {
        match tier {
            Tier::Loose => self.loose,
            Tier::Medium => self.medium,
            Tier::Tight => self.tight,
        }
    }

    /// Flag-wise OR of two classifications
    pub fn or(self, other: Self) -> Self {
        Self {
            loose: self.loose || other.loose,
            medium: self.medium || other.medium,
            tight: self.tight || other.tight,
        }
    }

    /// Flat-record encoding: `tight | medium << 1 | loose << 2`
    pub fn bitmask(&self) -> i32 {
        (self.tight as i32) | ((self.medium as i32) << 1) | ((self.loose as i32) << 2)
    }

    pub fn from_bitmask(bits: i32) -> Self {
        Self {
            tight: bits & 1 != 0,
            medium: bits & 2 != 0,
            loose: bits & 4 != 0,
        }
    }
}

/// Jet identification flags (no medium working point)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JetTiers {
    pub loose: bool,
    pub tight: bool,
}

impl JetTiers {
    /// Flat-record encoding: `tight | loose << 1`
    pub fn bitmask(&self) -> i32 {
        (self.tight as i32) | ((self.loose as i32) << 1)
    }
}
