//! ymfbus - Drive YMF825 synthesizer chips sharing one SPI bus
//!
//! # Architecture
//!
//! A board file describes which GPIO line selects each chip and which line
//! resets it. The CLI opens a bus backend and a GPIO backend, hands both to
//! the [`ymfbus_core::NativeSpi`] controller and runs register-level
//! commands against the selected chips:
//! - **Writes** may address several chips at once (broadcast)
//! - **Reads** address exactly one chip
//!
//! The controller resets every chip when it is constructed, so each command
//! starts from the power-on register state.

mod backends;
mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;
use ymfbus_core::board::BoardConfig;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    if let Commands::ListBackends = cli.command {
        commands::list_backends();
        return Ok(());
    }

    let board = load_board(cli.board.as_deref())?;
    let bus = cli.bus.as_deref().unwrap_or(&board.bus);
    let gpio = cli.gpio.as_deref().unwrap_or(&board.gpio);

    let mut ymf = backends::open_transport(&board, bus, gpio)?;

    let result = match cli.command {
        Commands::Info => {
            commands::print_info(&ymf);
            Ok(())
        }
        Commands::Reset => commands::run_reset(&mut ymf),
        Commands::Write {
            target,
            command,
            data,
        } => commands::run_write(&mut ymf, target, command, data),
        Commands::BurstWrite {
            target,
            command,
            data,
        } => commands::run_burst_write(&mut ymf, target, command, &data),
        Commands::Read { target, command } => commands::run_read(&mut ymf, target, command),
        Commands::ListBackends => Ok(()),
    };

    // Release the lines even when the command failed, but report the command error first
    let closed = ymf.close();
    result?;
    closed.map_err(|e| format!("Failed to release GPIO lines: {}", e))?;
    Ok(())
}

/// Load the board description from the given path
fn load_board(path: Option<&Path>) -> Result<BoardConfig, Box<dyn std::error::Error>> {
    let path = path.ok_or("No board file specified (use --board <file>)")?;
    let board = BoardConfig::from_toml_file(path)
        .map_err(|e| format!("{}: {}", path.display(), e))?;
    log::info!(
        "Loaded board {:?} with {} chip(s)",
        path,
        board.chips.len()
    );
    Ok(board)
}
