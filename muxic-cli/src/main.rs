//! muxic - a multi-track audio recorder for the terminal
//!
//! This is the main entry point for the muxic command-line tool.

mod backend;
mod catalog;
mod cli;
mod commands;
mod console_delegate;
mod settings;

use std::io;
use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use log::info;

use catalog::{TrackCatalog, TRACKS_DIR};
use cli::{Args, Command, DeviceCommand};
use settings::CONFIG_FILE_NAME;

fn main() -> ExitCode {
    // Parse command-line arguments and initialize logging
    let args = Args::parse();
    cli::init_logging(&args);

    match run(args.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<()> {
    info!("Running {:?}", command);
    let catalog = TrackCatalog::new(TRACKS_DIR);
    let config_path = Path::new(CONFIG_FILE_NAME);
    let mut stdout = io::stdout().lock();

    match command {
        Command::Record { track } => {
            drop(stdout);
            let provider = backend::provider()?;
            commands::record(&provider, &catalog, config_path, &track)
        }
        Command::List => commands::list(&catalog, &mut stdout),
        Command::Mix { output } => commands::mix(&catalog, &output, &mut stdout),
        Command::Export { track, file } => commands::export(&catalog, &track, &file, &mut stdout),
        Command::Device { action } => match action.unwrap_or(DeviceCommand::List) {
            DeviceCommand::List => {
                let provider = backend::provider()?;
                commands::device_list(&provider, config_path, &mut stdout)
            }
            DeviceCommand::Select { name } => commands::device_select(config_path, &name, &mut stdout),
        },
    }
}
