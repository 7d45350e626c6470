use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "hepsel")]
#[command(
    author,
    version,
    about = "Build flat per-event records or filtered muon collections from JSON-lines events"
)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "hepsel.yaml")]
    pub config: PathBuf,

    /// Input events, one JSON object per line ("-" reads stdin)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output file, overrides `output.path` from the configuration
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Chamber geometry YAML, overrides `geometry` from the configuration
    #[arg(short, long)]
    pub geometry: Option<PathBuf>,

    /// Producer to run on every event
    #[arg(short, long, value_enum, default_value_t = Mode::Ntuple)]
    pub mode: Mode,

    /// Write a Prometheus text dump of the run metrics to this path
    #[arg(long)]
    pub metrics_out: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// One flat record per event
    Ntuple,
    /// Loose/medium/tight muon collections per event
    Filter,
}
