//! hepsel Ntuple
//!
//! Per-event products built on top of the identification rules:
//!
//! - [`EventRecordBuilder`]: fills a [`FlatEventRecord`] with gen objects,
//!   tiered leptons, cleaned jets, MET and particle-flow leptons
//! - [`MuonFilter`]: splits muons into loose/medium/tight collections
//!
//! Both are synchronous and hold only read-only capabilities, so one
//! instance can be shared across workers; each worker owns its own record.

pub mod builder;
pub mod cuts;
pub mod filter;
pub mod matching;
pub mod record;

pub use builder::{BuildOutcome, EventRecordBuilder};
pub use cuts::Acceptance;
pub use filter::{FilteredEvent, FilteredMuons, MuonFilter};
pub use matching::MatchPolicy;
pub use record::{FlatColumns, FlatEventRecord, MAX_MET, MAX_OBJECTS};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::builder::{BuildOutcome, EventRecordBuilder};
    pub use crate::filter::{FilteredMuons, MuonFilter};
    pub use crate::record::FlatEventRecord;
}
