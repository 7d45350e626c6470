//! Flat per-event record
//!
//! Objects are held as typed rows in bounded storage and flattened into
//! parallel columns with occupancy counters when serialized. Column names
//! follow the ntuple schema (`nl`, `l_pt`, `j_csvv2`, ...).

use hepsel_core::{BoundedRows, EventId};
use serde::{Deserialize, Serialize, Serializer};

/// Slots per object family (leptons, jets, gen leptons, gen jets, PF leptons)
pub const MAX_OBJECTS: usize = 200;

/// Slots for missing transverse momentum
pub const MAX_MET: usize = 1;

/// Reconstructed muon or electron
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeptonRow {
    /// `tight | medium << 1 | loose << 2`
    pub id: i32,
    pub pid: i32,
    pub pt: f64,
    pub eta: f64,
    pub phi: f64,
    pub rel_iso: f64,
    /// Gen lepton slot, -1 when unmatched
    pub gen: i32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JetRow {
    /// `tight | loose << 1`
    pub id: i32,
    pub pt: f64,
    pub eta: f64,
    pub phi: f64,
    pub mass: f64,
    pub csvv2: f64,
    pub deepcsv: f64,
    pub flavour: i32,
    pub hadron_flavour: i32,
    /// Gen parton pdg id, 0 when absent
    pub parton_pid: i32,
    /// Gen jet slot, -1 when unmatched
    pub gen: i32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenLeptonRow {
    pub pid: i32,
    pub pt: f64,
    pub eta: f64,
    pub phi: f64,
    pub mass: f64,
    pub rel_iso: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenJetRow {
    pub pt: f64,
    pub eta: f64,
    pub phi: f64,
    pub mass: f64,
    pub pid: i32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetRow {
    pub pt: f64,
    pub phi: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PfLeptonRow {
    pub pid: i32,
    pub pt: f64,
    pub eta: f64,
    pub phi: f64,
    pub mass: f64,
    pub rel_iso: f64,
    pub high_purity: bool,
}

/// One event's output record
#[derive(Debug, Clone, PartialEq)]
pub struct FlatEventRecord {
    pub id: EventId,
    pub leptons: BoundedRows<LeptonRow>,
    pub jets: BoundedRows<JetRow>,
    pub gen_leptons: BoundedRows<GenLeptonRow>,
    pub gen_jets: BoundedRows<GenJetRow>,
    pub mets: BoundedRows<MetRow>,
    pub pf_leptons: BoundedRows<PfLeptonRow>,
}

impl FlatEventRecord {
    pub fn new(id: EventId) -> Self {
        Self {
            id,
            leptons: BoundedRows::new(MAX_OBJECTS),
            jets: BoundedRows::new(MAX_OBJECTS),
            gen_leptons: BoundedRows::new(MAX_OBJECTS),
            gen_jets: BoundedRows::new(MAX_OBJECTS),
            mets: BoundedRows::new(MAX_MET),
            pf_leptons: BoundedRows::new(MAX_OBJECTS),
        }
    }

    /// Zero every counter and take the next event's id
    pub fn reset(&mut self, id: EventId) {
        self.id = id;
        self.leptons.clear();
        self.jets.clear();
        self.gen_leptons.clear();
        self.gen_jets.clear();
        self.mets.clear();
        self.pf_leptons.clear();
    }

    /// True when no reconstructed object was stored
    pub fn has_no_reco(&self) -> bool {
        self.leptons.is_empty()
            && self.jets.is_empty()
            && self.mets.is_empty()
            && self.pf_leptons.is_empty()
    }

    /// `(column family, dropped rows)` for every family that overflowed
    pub fn truncations(&self) -> Vec<(&'static str, usize)> {
        [
            ("leptons", self.leptons.dropped()),
            ("jets", self.jets.dropped()),
            ("gen_leptons", self.gen_leptons.dropped()),
            ("gen_jets", self.gen_jets.dropped()),
            ("mets", self.mets.dropped()),
            ("pf_leptons", self.pf_leptons.dropped()),
        ]
        .into_iter()
        .filter(|(_, dropped)| *dropped > 0)
        .collect()
    }

    pub fn to_columns(&self) -> FlatColumns {
        FlatColumns::from(self)
    }
}

impl Serialize for FlatEventRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_columns().serialize(serializer)
    }
}

/// Column-wise view of a [`FlatEventRecord`], as persisted
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[allow(non_snake_case)]
pub struct FlatColumns {
    pub run: u32,
    pub lumi: u32,
    pub event: u64,

    pub ngl: usize,
    pub gl_pid: Vec<i32>,
    pub gl_pt: Vec<f64>,
    pub gl_eta: Vec<f64>,
    pub gl_phi: Vec<f64>,
    pub gl_mass: Vec<f64>,
    pub gl_relIso: Vec<f64>,

    pub ngj: usize,
    pub gj_pt: Vec<f64>,
    pub gj_eta: Vec<f64>,
    pub gj_phi: Vec<f64>,
    pub gj_mass: Vec<f64>,
    pub gj_pid: Vec<i32>,

    pub nl: usize,
    pub l_id: Vec<i32>,
    pub l_pid: Vec<i32>,
    pub l_pt: Vec<f64>,
    pub l_eta: Vec<f64>,
    pub l_phi: Vec<f64>,
    pub l_relIso: Vec<f64>,
    pub l_g: Vec<i32>,

    pub nj: usize,
    pub j_id: Vec<i32>,
    pub j_pt: Vec<f64>,
    pub j_eta: Vec<f64>,
    pub j_phi: Vec<f64>,
    pub j_mass: Vec<f64>,
    pub j_csvv2: Vec<f64>,
    pub j_deepcsv: Vec<f64>,
    pub j_flav: Vec<i32>,
    pub j_hadflav: Vec<i32>,
    pub j_pid: Vec<i32>,
    pub j_g: Vec<i32>,

    pub nmet: usize,
    pub met_pt: Vec<f64>,
    pub met_phi: Vec<f64>,

    pub npf: usize,
    pub pf_pid: Vec<i32>,
    pub pf_pt: Vec<f64>,
    pub pf_eta: Vec<f64>,
    pub pf_phi: Vec<f64>,
    pub pf_mass: Vec<f64>,
    pub pf_relIso: Vec<f64>,
    pub pf_hp: Vec<bool>,
}

fn column<T, U>(rows: &BoundedRows<T>, field: impl Fn(&T) -> U) -> Vec<U> {
    rows.iter().map(field).collect()
}

impl From<&FlatEventRecord> for FlatColumns {
    fn from(record: &FlatEventRecord) -> Self {
        let gl = &record.gen_leptons;
        let gj = &record.gen_jets;
        let l = &record.leptons;
        let j = &record.jets;
        let met = &record.mets;
        let pf = &record.pf_leptons;
        Self {
            run: record.id.run,
            lumi: record.id.lumi,
            event: record.id.event,

            ngl: gl.len(),
            gl_pid: column(gl, |r| r.pid),
            gl_pt: column(gl, |r| r.pt),
            gl_eta: column(gl, |r| r.eta),
            gl_phi: column(gl, |r| r.phi),
            gl_mass: column(gl, |r| r.mass),
            gl_relIso: column(gl, |r| r.rel_iso),

            ngj: gj.len(),
            gj_pt: column(gj, |r| r.pt),
            gj_eta: column(gj, |r| r.eta),
            gj_phi: column(gj, |r| r.phi),
            gj_mass: column(gj, |r| r.mass),
            gj_pid: column(gj, |r| r.pid),

            nl: l.len(),
            l_id: column(l, |r| r.id),
            l_pid: column(l, |r| r.pid),
            l_pt: column(l, |r| r.pt),
            l_eta: column(l, |r| r.eta),
            l_phi: column(l, |r| r.phi),
            l_relIso: column(l, |r| r.rel_iso),
            l_g: column(l, |r| r.gen),

            nj: j.len(),
            j_id: column(j, |r| r.id),
            j_pt: column(j, |r| r.pt),
            j_eta: column(j, |r| r.eta),
            j_phi: column(j, |r| r.phi),
            j_mass: column(j, |r| r.mass),
            j_csvv2: column(j, |r| r.csvv2),
            j_deepcsv: column(j, |r| r.deepcsv),
            j_flav: column(j, |r| r.flavour),
            j_hadflav: column(j, |r| r.hadron_flavour),
            j_pid: column(j, |r| r.parton_pid),
            j_g: column(j, |r| r.gen),

            nmet: met.len(),
            met_pt: column(met, |r| r.pt),
            met_phi: column(met, |r| r.phi),

            npf: pf.len(),
            pf_pid: column(pf, |r| r.pid),
            pf_pt: column(pf, |r| r.pt),
            pf_eta: column(pf, |r| r.eta),
            pf_phi: column(pf, |r| r.phi),
            pf_mass: column(pf, |r| r.mass),
            pf_relIso: column(pf, |r| r.rel_iso),
            pf_hp: column(pf, |r| r.high_purity),
        }
    }
}
