use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// memviz - struct memory layout, padding and cache-line analysis
#[derive(Debug, Parser)]
#[command(name = "memviz", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared across all subcommands.
#[derive(Debug, Parser)]
pub struct GlobalOptions {
    /// Target architecture: amd64, arm64 or 386.
    #[arg(short, long, global = true)]
    pub arch: Option<String>,

    /// Fail on field types outside the primitive catalog instead of skipping them.
    #[arg(long, global = true)]
    pub strict: bool,

    /// Cache line size in bytes (power of two).
    #[arg(long, global = true, value_name = "BYTES")]
    pub line_size: Option<u32>,

    /// TOML config file (requires the `toml-config` feature).
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Emit output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose (debug-level) logging output.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show offsets, padding and totals for each struct in a definition file.
    Layout {
        /// JSON file with one struct definition or a list of them.
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },

    /// Suggest a field order that minimizes struct size.
    Optimize {
        /// JSON file with one struct definition or a list of them.
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },

    /// Break each struct into cache lines and flag fields that straddle them.
    Cache {
        /// JSON file with one struct definition or a list of them.
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },

    /// Write the stable export document for a definition file.
    Export {
        /// JSON file with one struct definition or a list of them.
        #[arg(value_name = "FILE")]
        path: PathBuf,

        /// Write to this file instead of stdout.
        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,
    },

    /// List the primitive type catalog with sizes for the selected architecture.
    Types,
}
