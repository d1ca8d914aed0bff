//! CLI argument definitions using clap

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Static analysis detector for analytics tracking calls
#[derive(Parser, Debug)]
#[command(name = "trackscan")]
#[command(about = "Scans a JS/TS codebase for analytics tracking calls and emits an events map")]
#[command(version)]
pub struct Cli {
    /// Directory to scan
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Output file for the tracking schema
    #[arg(short, long, default_value = "tracking-schema.yaml", value_name = "FILE")]
    pub output: PathBuf,

    /// Write the document to stdout instead of a file
    #[arg(long)]
    pub stdout: bool,

    /// Output format
    #[arg(short, long, default_value = "yaml", value_enum)]
    pub format: OutputFormat,

    /// Glob pattern to exclude from the scan (repeatable)
    #[arg(long = "ignore", value_name = "GLOB")]
    pub ignore: Vec<String>,

    /// Custom tracking function signature, e.g.
    /// "track(userId, EVENT_NAME, PROPERTIES)" (repeatable)
    #[arg(long = "custom-function", value_name = "SIGNATURE")]
    pub custom_functions: Vec<String>,

    /// Repository URL override for the source block
    #[arg(long, value_name = "URL")]
    pub repository_url: Option<String>,

    /// Commit hash override for the source block
    #[arg(long, value_name = "SHA")]
    pub commit_hash: Option<String>,

    /// Commit timestamp override (ISO 8601) for the source block
    #[arg(long, value_name = "TIMESTAMP")]
    pub commit_timestamp: Option<String>,

    /// Show verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Serialization format for the emitted document
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Yaml,
    Json,
}
