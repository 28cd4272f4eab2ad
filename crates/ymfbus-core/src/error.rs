//! Error types for ymfbus-core
//!
//! This module provides a no_std compatible error type that is shared by the
//! controller and by every bus/pin backend.

use core::fmt;

use crate::chip::TargetChip;
use crate::gpio::GpioPin;

/// Reasons a pin configuration is rejected at construction time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A pin map key addresses more than one chip (or none at all)
    MultiChipKey(TargetChip),
    /// A chip-select pin was left unassigned
    UnassignedChipSelect,
    /// A GPIO line is used as chip-select for two chips, or as both a
    /// chip-select and a reset line
    PinConflict {
        /// The line that is wired twice
        pin: GpioPin,
    },
}

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    // Configuration errors
    /// The pin configuration is invalid; the controller was not created
    Config(ConfigError),

    // Addressing errors
    /// The requested target includes chips that were never configured
    TargetOutOfRange {
        /// The rejected selector
        requested: TargetChip,
        /// Every chip the controller knows about
        available: TargetChip,
    },
    /// A transaction was issued while no chip is selected
    NoChipSelected,
    /// A read was issued while more than one chip is selected
    MultiChipRead,

    // Transfer errors
    /// The frame does not fit into a single bus transfer
    TransferTooLarge {
        /// Frame length including the command byte
        len: usize,
        /// Largest transfer the bus accepts
        max: usize,
    },
    /// The underlying bus transfer failed
    BusTransferFailed,

    // Pin errors
    /// A GPIO line could not be opened
    PinOpenFailed {
        /// The line that failed
        pin: GpioPin,
    },
    /// A GPIO line could not be released
    PinCloseFailed {
        /// The line that failed
        pin: GpioPin,
    },
    /// A GPIO line could not be driven
    PinWriteFailed {
        /// The line that failed
        pin: GpioPin,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MultiChipKey(chip) => {
                write!(f, "pin map key {} must select exactly one chip", chip)
            }
            Self::UnassignedChipSelect => write!(f, "chip-select pin must not be unassigned"),
            Self::PinConflict { pin } => write!(f, "GPIO line {} is wired more than once", pin),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "invalid pin configuration: {}", e),
            Self::TargetOutOfRange {
                requested,
                available,
            } => write!(
                f,
                "target {} is outside the configured chips {}",
                requested, available
            ),
            Self::NoChipSelected => write!(f, "no chip selected"),
            Self::MultiChipRead => write!(f, "cannot read from multiple chips at once"),
            Self::TransferTooLarge { len, max } => write!(
                f,
                "transfer of {} bytes exceeds bus limit of {} bytes",
                len, max
            ),
            Self::BusTransferFailed => write!(f, "SPI transfer failed"),
            Self::PinOpenFailed { pin } => write!(f, "failed to open GPIO line {}", pin),
            Self::PinCloseFailed { pin } => write!(f, "failed to close GPIO line {}", pin),
            Self::PinWriteFailed { pin } => write!(f, "failed to drive GPIO line {}", pin),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
