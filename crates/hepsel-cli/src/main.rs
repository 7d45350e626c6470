//! hepsel
//!
//! Object selection and flat ntuple building over JSON-lines event files.

use anyhow::{Context, Result};
use clap::Parser;
use hepsel_cli::{Cli, EventRunner, Mode, RunConfig};
use hepsel_id::{GeometryLookup, GeometryMap};
use hepsel_telemetry::JsonLinesSink;
use metrics_exporter_prometheus::PrometheusHandle;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);
    let metrics_handle = init_metrics()?;

    let config = RunConfig::load(&cli.config, &cli)?;
    info!(mode = ?cli.mode, input = %cli.input.display(), "Starting hepsel");

    // Geometry is fixed for the whole run
    let geometry: Arc<dyn GeometryLookup> = match &config.geometry {
        Some(path) => {
            let map = GeometryMap::from_file(path)
                .with_context(|| format!("loading geometry from {}", path.display()))?;
            info!(chambers = map.len(), "Geometry loaded");
            Arc::new(map)
        }
        None => {
            info!("No geometry configured, ME0 geometry matching disabled");
            Arc::new(GeometryMap::new())
        }
    };

    let runner = EventRunner::new(config.collections.clone(), geometry);
    let input = open_input(&cli)?;
    let mut sink = JsonLinesSink::create(&config.output)?;

    let started = Instant::now();
    match cli.mode {
        Mode::Ntuple => runner.run_ntuple(input, &mut sink)?,
        Mode::Filter => runner.run_filter(input, &mut sink)?,
    }
    sink.finish()?;

    let summary = runner.counters().snapshot();
    info!(
        events = summary.events,
        skipped_no_vertex = summary.skipped_no_vertex,
        malformed_lines = summary.malformed_lines,
        truncated_objects = summary.truncated_objects,
        records_written = summary.records_written,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Run complete"
    );

    if let Some(path) = &cli.metrics_out {
        std::fs::write(path, metrics_handle.render())
            .with_context(|| format!("writing metrics to {}", path.display()))?;
        info!(path = %path.display(), "Metrics written");
    }

    Ok(())
}

fn open_input(cli: &Cli) -> Result<Box<dyn BufRead>> {
    if cli.input.as_os_str() == "-" {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }
    let file = File::open(&cli.input)
        .with_context(|| format!("opening input {}", cli.input.display()))?;
    Ok(Box::new(BufReader::new(file)))
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("hepsel=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hepsel=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

/// Install the Prometheus recorder and return a handle for rendering
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!("hepsel_events_total", "Total number of events processed");
    metrics::describe_counter!(
        "hepsel_events_skipped_total",
        "Events with reco columns left empty or input lines skipped, by reason"
    );
    metrics::describe_counter!(
        "hepsel_truncated_objects_total",
        "Objects dropped because a record column was full, by column"
    );
    metrics::describe_counter!(
        "hepsel_selected_objects_total",
        "Objects accepted by the muon filter, by kind and tier"
    );

    Ok(handle)
}
