//! hepsel Telemetry
//!
//! Run bookkeeping and persistence for hepsel.
//!
//! Provides:
//! - In-process run counters with snapshots for end-of-run summaries
//! - JSON-lines record sinks (one record per event, one line per record)

pub mod counters;
pub mod sink;

pub use counters::{RunCounters, RunSummary};
pub use sink::{read_json_lines, JsonLinesSink, MemorySink, RecordSink, SinkConfig};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::counters::RunCounters;
    pub use crate::sink::{JsonLinesSink, RecordSink, SinkConfig};
}
