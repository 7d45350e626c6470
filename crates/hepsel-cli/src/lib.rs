//! hepsel command-line front end
//!
//! Reads JSON-lines events, runs either the flat-record builder or the muon
//! filter on each one, and writes one JSON line per event.

pub mod cli;
pub mod config;
pub mod runner;

pub use cli::{Cli, Mode};
pub use config::RunConfig;
pub use runner::EventRunner;
