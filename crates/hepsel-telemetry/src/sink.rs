//! Record persistence
//!
//! Records are appended as JSON lines. Writes are buffered and flushed every
//! `flush_interval` records and when the sink is finished.

use hepsel_core::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Output sink settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Output file; parent directories are created
    #[serde(default = "default_path")]
    pub path: PathBuf,

    /// Flush to disk after this many records
    #[serde(default = "default_flush_interval")]
    pub flush_interval: usize,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            flush_interval: default_flush_interval(),
        }
    }
}

fn default_path() -> PathBuf {
    PathBuf::from("hepsel_output.jsonl")
}

fn default_flush_interval() -> usize {
    100
}

/// Destination for one record per event
pub trait RecordSink<T> {
    fn write(&mut self, record: &T) -> Result<()>;

    fn flush(&mut self) -> Result<()>;
}

/// Buffered JSON-lines writer
pub struct JsonLinesSink<W: Write> {
    writer: BufWriter<W>,
    flush_interval: usize,
    since_flush: usize,
    written: u64,
}

impl JsonLinesSink<File> {
    /// Create (truncating) the configured output file
    pub fn create(config: &SinkConfig) -> Result<Self> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&config.path)
            .map_err(|e| Error::sink(format!("cannot open {}: {}", config.path.display(), e)))?;
        info!(path = %config.path.display(), "Writing records");
        Ok(Self::new(file, config.flush_interval))
    }
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W, flush_interval: usize) -> Self {
        Self {
            writer: BufWriter::new(writer),
            flush_interval: flush_interval.max(1),
            since_flush: 0,
            written: 0,
        }
    }

    /// Records written so far
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Flush and return the underlying writer
    pub fn finish(mut self) -> Result<W> {
        self.writer.flush()?;
        debug!(records = self.written, "Sink finished");
        self.writer
            .into_inner()
            .map_err(|e| Error::sink(format!("final flush failed: {}", e.error())))
    }
}

impl<T: Serialize, W: Write> RecordSink<T> for JsonLinesSink<W> {
    fn write(&mut self, record: &T) -> Result<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        self.written += 1;
        self.since_flush += 1;
        if self.since_flush >= self.flush_interval {
            self.writer.flush()?;
            self.since_flush = 0;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        self.since_flush = 0;
        Ok(())
    }
}

/// In-memory sink, for tests and embedding
#[derive(Debug, Clone, Default)]
pub struct MemorySink<T> {
    records: Vec<T>,
}

impl<T> MemorySink<T> {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn into_records(self) -> Vec<T> {
        self.records
    }
}

impl<T: Clone> RecordSink<T> for MemorySink<T> {
    fn write(&mut self, record: &T) -> Result<()> {
        self.records.push(record.clone());
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Read every record back from a JSON-lines file, skipping blank lines
pub fn read_json_lines<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<Vec<T>> {
    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str(&line)?);
    }
    Ok(records)
}
