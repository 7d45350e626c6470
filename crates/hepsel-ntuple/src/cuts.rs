//! Kinematic acceptance windows

use hepsel_core::P4;

/// Minimum pt (inclusive) and maximum |η| (inclusive)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Acceptance {
    pub min_pt: f64,
    pub max_abs_eta: f64,
}

impl Acceptance {
    pub const fn new(min_pt: f64, max_abs_eta: f64) -> Self {
        Self {
            min_pt,
            max_abs_eta,
        }
    }

    pub fn accepts(&self, p4: &P4) -> bool {
        p4.pt >= self.min_pt && p4.abs_eta() <= self.max_abs_eta
    }
}

pub const GEN_JET_ACCEPTANCE: Acceptance = Acceptance::new(20.0, 5.0);
pub const GEN_LEPTON_ACCEPTANCE: Acceptance = Acceptance::new(10.0, 3.0);
pub const LEPTON_ACCEPTANCE: Acceptance = Acceptance::new(10.0, 3.0);
pub const JET_ACCEPTANCE: Acceptance = Acceptance::new(20.0, 5.0);
pub const PF_LEPTON_ACCEPTANCE: Acceptance = Acceptance::new(10.0, 3.0);

/// Muons entering the filtered collections
pub const FILTER_MUON_ACCEPTANCE: Acceptance = Acceptance::new(2.0, 3.0);
