//! Event loop: JSON-lines input to one output record per event

use hepsel_core::{CollectionLabels, EventData, EventId, RawEvent, Result};
use hepsel_id::GeometryLookup;
use hepsel_ntuple::{BuildOutcome, EventRecordBuilder, FilteredEvent, FlatEventRecord, MuonFilter};
use hepsel_telemetry::{RecordSink, RunCounters};
use std::io::BufRead;
use std::sync::Arc;
use tracing::{debug, warn};

/// Drives the producers over an event stream
pub struct EventRunner {
    labels: CollectionLabels,
    builder: EventRecordBuilder,
    filter: MuonFilter,
    counters: RunCounters,
}

impl EventRunner {
    pub fn new(labels: CollectionLabels, geometry: Arc<dyn GeometryLookup>) -> Self {
        Self {
            labels,
            builder: EventRecordBuilder::new(),
            filter: MuonFilter::new(geometry),
            counters: RunCounters::new(),
        }
    }

    pub fn with_builder(mut self, builder: EventRecordBuilder) -> Self {
        self.builder = builder;
        self
    }

    pub fn with_filter(mut self, filter: MuonFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn counters(&self) -> &RunCounters {
        &self.counters
    }

    /// Write one flat record per parsed event, including events without a
    /// primary vertex
    pub fn run_ntuple<R, S>(&self, input: R, sink: &mut S) -> Result<()>
    where
        R: BufRead,
        S: RecordSink<FlatEventRecord>,
    {
        let mut record = FlatEventRecord::new(EventId::default());
        self.for_each_event(input, |event| {
            if self.builder.populate(event, &mut record) == BuildOutcome::NoPrimaryVertex {
                self.counters.record_skipped_no_vertex();
            }
            let dropped: usize = record.truncations().iter().map(|(_, n)| n).sum();
            if dropped > 0 {
                self.counters.record_truncated(dropped as u64);
            }
            sink.write(&record)?;
            self.counters.record_written();
            Ok(())
        })?;
        sink.flush()
    }

    /// Write one set of filtered muon collections per parsed event
    pub fn run_filter<R, S>(&self, input: R, sink: &mut S) -> Result<()>
    where
        R: BufRead,
        S: RecordSink<FilteredEvent>,
    {
        self.for_each_event(input, |event| {
            sink.write(&self.filter.produce_event(event))?;
            self.counters.record_written();
            Ok(())
        })?;
        sink.flush()
    }

    fn for_each_event<R, F>(&self, input: R, mut handle: F) -> Result<()>
    where
        R: BufRead,
        F: FnMut(&EventData) -> Result<()>,
    {
        for (index, line) in input.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let event = match self.parse(&line) {
                Ok(event) => event,
                Err(e) => {
                    warn!(line = index + 1, error = %e, "Skipping malformed event");
                    self.counters.record_malformed();
                    continue;
                }
            };

            debug!(run = event.id.run, lumi = event.id.lumi, event = event.id.event, "Processing event");
            self.counters.record_event();
            handle(&event)?;
        }
        Ok(())
    }

    fn parse(&self, line: &str) -> Result<EventData> {
        let raw: RawEvent = serde_json::from_str(line)?;
        raw.resolve(&self.labels)
    }
}
