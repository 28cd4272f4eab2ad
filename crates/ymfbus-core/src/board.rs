//! TOML board description
//!
//! A board file names the bus and GPIO backends and lists the wiring of
//! every chip:
//!
//! ```toml
//! bus = "linux_spi:dev=/dev/spidev0.0,spispeed=2000"
//! gpio = "linux_gpio:gpiochip=0"
//!
//! [[chip]]
//! slot = 0
//! cs = 25
//! reset = 16
//!
//! [[chip]]
//! slot = 1
//! cs = 26
//! reset = 16
//! ```
//!
//! Backend strings use the `name:key=value,...` form and are interpreted by
//! the binary, not by this crate.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::string::String;
use std::vec::Vec;

use crate::chip::{ChipPinConfig, TargetChip};
use crate::error::Error;
use crate::gpio::GpioPin;

/// Errors from loading a board file
#[derive(Debug)]
pub enum BoardError {
    /// The file could not be read
    Io(std::io::Error),
    /// The file is not valid TOML or misses required keys
    Parse(toml::de::Error),
    /// A slot index is out of range
    InvalidSlot(usize),
    /// A slot is listed twice
    DuplicateSlot(usize),
    /// A chip entry is rejected by the pin configuration rules
    Pins {
        /// Slot of the offending entry
        slot: usize,
        /// Underlying configuration error
        source: Error,
    },
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read board file: {}", e),
            Self::Parse(e) => write!(f, "failed to parse board file: {}", e),
            Self::InvalidSlot(slot) => write!(f, "chip slot {} is out of range", slot),
            Self::DuplicateSlot(slot) => write!(f, "chip slot {} is listed twice", slot),
            Self::Pins { slot, source } => write!(f, "chip slot {}: {}", slot, source),
        }
    }
}

impl std::error::Error for BoardError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
            Self::Pins { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Wiring of one chip in a board file
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct ChipEntry {
    /// Chip slot index
    pub slot: usize,
    /// Chip-select GPIO line
    pub cs: u32,
    /// Reset GPIO line, if wired
    #[serde(default)]
    pub reset: Option<u32>,
}

/// Parsed board file
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct BoardConfig {
    /// Bus backend string
    pub bus: String,
    /// GPIO backend string
    pub gpio: String,
    /// Chip wiring
    #[serde(rename = "chip", default)]
    pub chips: Vec<ChipEntry>,
}

impl BoardConfig {
    /// Load a board description from a TOML file
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, BoardError> {
        let content = fs::read_to_string(path).map_err(BoardError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Parse a board description from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, BoardError> {
        toml::from_str(content).map_err(BoardError::Parse)
    }

    /// Build the controller's pin map from the chip entries
    pub fn pin_map(&self) -> Result<BTreeMap<TargetChip, ChipPinConfig>, BoardError> {
        let mut map = BTreeMap::new();

        for entry in &self.chips {
            let chip = TargetChip::from_index(entry.slot)
                .ok_or(BoardError::InvalidSlot(entry.slot))?;

            let reset = entry.reset.map_or(GpioPin::NONE, GpioPin::new);
            let config = ChipPinConfig::new(GpioPin::new(entry.cs), reset).map_err(|source| {
                BoardError::Pins {
                    slot: entry.slot,
                    source,
                }
            })?;

            if map.insert(chip, config).is_some() {
                return Err(BoardError::DuplicateSlot(entry.slot));
            }
        }

        Ok(map)
    }
}
