//! Overlap removal, reco-to-gen matching and isolation sums

use hepsel_core::{delta_r, is_light_lepton, GenJet, GenParticle, PfCandidate, P4, PDG_MUON};

/// Relative pt agreement below which two objects are the same deposit
pub const OVERLAP_REL_PT: f64 = 0.01;

/// Angular separation below which two objects are the same deposit
pub const OVERLAP_DELTA_R: f64 = 0.01;

/// Maximum ΔR for a reco object to be linked to a gen object
pub const GEN_MATCH_DELTA_R: f64 = 0.4;

/// Gen jets further than this from a gen lepton do not enter its isolation
pub const GEN_ISO_JET_DELTA_R: f64 = 0.7;

/// Constituents closer than this are the lepton itself
pub const SELF_EXCLUSION_DELTA_R: f64 = 0.01;

/// Isolation cone radius by lepton flavour: 0.4 for muons, 0.3 otherwise
pub fn isolation_cone(pdg_id: i32) -> f64 {
    if pdg_id.abs() == PDG_MUON {
        0.4
    } else {
        0.3
    }
}

/// True when `object` is a double-counted copy of `lepton`
pub fn overlaps(object: &P4, lepton: &P4) -> bool {
    (object.pt - lepton.pt).abs() < OVERLAP_REL_PT * lepton.pt
        && lepton.delta_r(object) < OVERLAP_DELTA_R
}

pub fn overlaps_any<'a, I>(object: &P4, leptons: I) -> bool
where
    I: IntoIterator<Item = &'a P4>,
{
    leptons.into_iter().any(|lepton| overlaps(object, lepton))
}

/// Reco jet overlap: electrons checked first, then muons
pub fn jet_overlaps_lepton<'a, E, M>(jet: &P4, electrons: E, muons: M) -> bool
where
    E: IntoIterator<Item = &'a P4>,
    M: IntoIterator<Item = &'a P4>,
{
    overlaps_any(jet, electrons) || overlaps_any(jet, muons)
}

/// Gen jets that are not a gen electron or muon in disguise
pub fn clean_gen_jets<'a, I>(gen_jets: I, gen_particles: &[GenParticle]) -> Vec<&'a GenJet>
where
    I: IntoIterator<Item = &'a GenJet>,
{
    let leptons: Vec<&P4> = gen_particles
        .iter()
        .filter(|p| is_light_lepton(p.pdg_id))
        .map(|p| &p.p4)
        .collect();
    gen_jets
        .into_iter()
        .filter(|jet| !overlaps_any(&jet.p4, leptons.iter().copied()))
        .collect()
}

/// Tie-break among several gen objects inside the matching window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPolicy {
    /// Keep overwriting; the last qualifying index in scan order wins
    LastQualifying,
    /// Stop at the first qualifying index
    FirstQualifying,
}

/// Scan `(index, eta, phi)` candidates and return the linked index.
///
/// The window is inclusive: ΔR equal to [`GEN_MATCH_DELTA_R`] qualifies.
pub fn gen_match<I>(eta: f64, phi: f64, candidates: I, policy: MatchPolicy) -> Option<usize>
where
    I: IntoIterator<Item = (usize, f64, f64)>,
{
    let mut matched = None;
    for (index, gen_eta, gen_phi) in candidates {
        if delta_r(gen_eta, gen_phi, eta, phi) > GEN_MATCH_DELTA_R {
            continue;
        }
        matched = Some(index);
        if policy == MatchPolicy::FirstQualifying {
            break;
        }
    }
    matched
}

/// Record encoding of a gen link; -1 when unmatched
pub fn encode_link(link: Option<usize>) -> i32 {
    link.map_or(-1, |index| index as i32)
}

/// Generator-level isolation of a gen lepton.
///
/// Sums constituent pt from gen jets within ΔR 0.7 of the lepton, keeping
/// constituents inside the flavour cone and outside the self-exclusion
/// radius, divided by the lepton pt.
pub fn gen_isolation(lepton: &GenParticle, gen_jets: &[&GenJet]) -> f64 {
    let cone = isolation_cone(lepton.pdg_id);
    let sum: f64 = gen_jets
        .iter()
        .filter(|jet| lepton.p4.delta_r(&jet.p4) <= GEN_ISO_JET_DELTA_R)
        .flat_map(|jet| jet.constituents.iter())
        .filter(|c| {
            let dr = lepton.p4.delta_r(c);
            dr >= SELF_EXCLUSION_DELTA_R && dr <= cone
        })
        .map(|c| c.pt)
        .sum();
    sum / lepton.p4.pt
}

/// Particle-flow isolation; the candidate contributes its own pt
pub fn pf_isolation(candidate: &PfCandidate, all: &[PfCandidate]) -> f64 {
    let cone = isolation_cone(candidate.pdg_id);
    let sum: f64 = all
        .iter()
        .filter(|other| candidate.p4.delta_r(&other.p4) <= cone)
        .map(|other| other.p4.pt)
        .sum();
    sum / candidate.p4.pt
}
