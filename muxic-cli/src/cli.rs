//! Command-line interface for muxic
//!
//! Handles argument parsing and logging configuration.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::LevelFilter;

/// muxic - multi-track audio recorder
#[derive(Parser, Debug)]
#[command(name = "muxic")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Increase logging verbosity
    /// -v = info, -vv = debug, -vvv = trace
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Record a new track from the selected capture device
    Record {
        /// Track name, saved as tracks/<track>.wav
        track: String,
    },
    /// List recorded tracks
    List,
    /// Mix all tracks into a new one
    Mix {
        /// Output track name
        output: String,
    },
    /// Copy a track to a file
    Export {
        track: String,
        file: PathBuf,
    },
    /// List or select capture devices
    Device {
        #[command(subcommand)]
        action: Option<DeviceCommand>,
    },
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum DeviceCommand {
    /// List active capture devices
    List,
    /// Remember a device as the default for recording
    Select {
        /// Friendly device name; words are joined with spaces
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },
}

impl Args {
    /// Get the log level filter based on verbosity flags
    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            LevelFilter::Error
        } else {
            match self.verbose {
                0 => LevelFilter::Warn,
                1 => LevelFilter::Info,
                2 => LevelFilter::Debug,
                _ => LevelFilter::Trace,
            }
        }
    }
}

/// Initialize the logging system based on CLI arguments
pub fn init_logging(args: &Args) {
    let mut builder = env_logger::Builder::new();

    // Base level for all modules - keep at warn to suppress noisy deps
    builder.filter_level(LevelFilter::Warn);

    for module in ["muxic", "muxic_core", "muxic_windows"] {
        builder.filter_module(module, args.log_level());
    }

    builder.format_timestamp_millis().init();
}
