//! CLI argument parsing

use crate::backends;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use ymfbus_core::TargetChip;

/// Parse a string as a hex or decimal u8
fn parse_hex_u8(s: &str) -> Result<u8, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u8::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<u8>().map_err(|e| format!("Invalid number: {}", e))
    }
}

/// Parse a chip target such as "0", "0,1" or "all"
fn parse_target(s: &str) -> Result<TargetChip, String> {
    s.parse().map_err(|e| format!("{}", e))
}

/// Generate dynamic help text for the backend overrides
fn backend_help(service: &str) -> String {
    format!(
        "{} backend, overriding the board file [available: {}]",
        service,
        backends::backend_names_short()
    )
}

#[derive(Parser)]
#[command(name = "ymfbus")]
#[command(author, version, about = "YMF825 multi-chip SPI bus tool", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Board description (TOML format)
    #[arg(short, long, global = true)]
    pub board: Option<PathBuf>,

    #[arg(long, global = true, help = backend_help("SPI bus"))]
    pub bus: Option<String>,

    #[arg(long, global = true, help = backend_help("GPIO"))]
    pub gpio: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the configured chips and their wiring
    Info,

    /// Pulse the reset lines of every chip
    Reset,

    /// Write one data byte to a register
    Write {
        /// Chips to address ("0", "0,1" or "all"; default: every configured chip)
        #[arg(short, long, value_parser = parse_target)]
        target: Option<TargetChip>,

        /// Register address
        #[arg(value_parser = parse_hex_u8)]
        command: u8,

        /// Data byte
        #[arg(value_parser = parse_hex_u8)]
        data: u8,
    },

    /// Write a sequence of bytes in a single transfer
    BurstWrite {
        /// Chips to address ("0", "0,1" or "all"; default: every configured chip)
        #[arg(short, long, value_parser = parse_target)]
        target: Option<TargetChip>,

        /// Register address
        #[arg(value_parser = parse_hex_u8)]
        command: u8,

        /// Data bytes
        #[arg(value_parser = parse_hex_u8, required = true)]
        data: Vec<u8>,
    },

    /// Read one register of a single chip
    Read {
        /// Chip to read from
        #[arg(short, long, value_parser = parse_target)]
        target: TargetChip,

        /// Register address (bit 7 is set automatically)
        #[arg(value_parser = parse_hex_u8)]
        command: u8,
    },

    /// List available backends
    ListBackends,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_hex_u8() {
        assert_eq!(parse_hex_u8("0x1F"), Ok(0x1F));
        assert_eq!(parse_hex_u8("200"), Ok(200));
        assert!(parse_hex_u8("0x100").is_err());
        assert!(parse_hex_u8("zz").is_err());
    }

    #[test]
    fn test_parse_burst_write() {
        let cli = Cli::try_parse_from([
            "ymfbus", "-b", "board.toml", "burst-write", "-t", "1", "0x07", "0x90", "0", "0x80",
        ])
        .unwrap();

        match cli.command {
            Commands::BurstWrite {
                target,
                command,
                data,
            } => {
                assert_eq!(target, Some(TargetChip::BOARD1));
                assert_eq!(command, 0x07);
                assert_eq!(data, vec![0x90, 0x00, 0x80]);
            }
            _ => panic!("expected burst-write"),
        }
    }

    #[test]
    fn test_write_target_defaults_to_none() {
        let cli = Cli::try_parse_from(["ymfbus", "write", "0x08", "0x16"]).unwrap();

        match cli.command {
            Commands::Write {
                target,
                command,
                data,
            } => {
                assert_eq!(target, None);
                assert_eq!(command, 0x08);
                assert_eq!(data, 0x16);
            }
            _ => panic!("expected write"),
        }
    }

    #[test]
    fn test_read_requires_target() {
        assert!(Cli::try_parse_from(["ymfbus", "read", "0x03"]).is_err());
    }
}
