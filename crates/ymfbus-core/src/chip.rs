//! Chip selectors and per-chip pin wiring

use core::fmt;
use core::str::FromStr;

use bitflags::bitflags;

use crate::error::{ConfigError, Result};
use crate::gpio::GpioPin;

/// Number of chip slots a [`TargetChip`] can address
pub const MAX_CHIPS: usize = 8;

bitflags! {
    /// Set of physical chip slots
    ///
    /// Used both as a pin map key, where it must name exactly one chip, and as
    /// a transaction target, where it may name several chips (broadcast
    /// writes) or none at all.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct TargetChip: u8 {
        /// Chip slot 0
        const BOARD0 = 1 << 0;
        /// Chip slot 1
        const BOARD1 = 1 << 1;
        /// Chip slot 2
        const BOARD2 = 1 << 2;
        /// Chip slot 3
        const BOARD3 = 1 << 3;
        /// Chip slot 4
        const BOARD4 = 1 << 4;
        /// Chip slot 5
        const BOARD5 = 1 << 5;
        /// Chip slot 6
        const BOARD6 = 1 << 6;
        /// Chip slot 7
        const BOARD7 = 1 << 7;
    }
}

impl TargetChip {
    /// The empty selector; nothing is addressed
    pub const NONE: TargetChip = TargetChip::empty();

    /// Single-chip selector for slot `index`
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < MAX_CHIPS {
            Some(Self::from_bits_retain(1 << index))
        } else {
            None
        }
    }

    /// Slot index of a single-chip selector
    pub const fn index(self) -> Option<usize> {
        if self.is_single_chip() {
            Some(self.bits().trailing_zeros() as usize)
        } else {
            None
        }
    }

    /// Returns true if exactly one chip is selected
    pub const fn is_single_chip(self) -> bool {
        let bits = self.bits();
        bits != 0 && bits & (bits - 1) == 0
    }

    /// Iterate the single-chip members in ascending slot order
    pub fn chips(self) -> impl Iterator<Item = TargetChip> {
        (0..MAX_CHIPS)
            .filter_map(Self::from_index)
            .filter(move |chip| self.contains(*chip))
    }
}

impl Default for TargetChip {
    fn default() -> Self {
        Self::NONE
    }
}

impl fmt::Display for TargetChip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "none");
        }
        let mut first = true;
        for index in self.chips().filter_map(TargetChip::index) {
            if !first {
                write!(f, ",")?;
            }
            write!(f, "{}", index)?;
            first = false;
        }
        Ok(())
    }
}

/// Error returned when a target string cannot be parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseTargetError;

impl fmt::Display for ParseTargetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid chip target (expected slot list like \"0,1\", \"all\" or \"none\")"
        )
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseTargetError {}

impl FromStr for TargetChip {
    type Err = ParseTargetError;

    /// Parse `"all"`, `"none"` or a comma-separated list of slot indices
    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        match s.trim() {
            "all" => return Ok(Self::all()),
            "none" | "" => return Ok(Self::NONE),
            _ => {}
        }

        let mut target = Self::NONE;
        for part in s.split(',') {
            let index: usize = part.trim().parse().map_err(|_| ParseTargetError)?;
            target |= Self::from_index(index).ok_or(ParseTargetError)?;
        }
        Ok(target)
    }
}

/// Pin wiring of one physical chip
///
/// The chip-select line is mandatory; the reset line is optional and may be
/// shared between chips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChipPinConfig {
    cs: GpioPin,
    reset: GpioPin,
}

impl ChipPinConfig {
    /// Create a pin configuration
    ///
    /// Pass [`GpioPin::NONE`] as `reset` when the chip has no reset line.
    pub fn new(cs: GpioPin, reset: GpioPin) -> Result<Self> {
        if !cs.is_assigned() {
            return Err(ConfigError::UnassignedChipSelect.into());
        }
        Ok(Self { cs, reset })
    }

    /// Create a pin configuration for a chip without a reset line
    pub fn without_reset(cs: GpioPin) -> Result<Self> {
        Self::new(cs, GpioPin::NONE)
    }

    /// Chip-select line
    pub fn cs_pin(&self) -> GpioPin {
        self.cs
    }

    /// Reset line, if one is wired
    pub fn reset_pin(&self) -> Option<GpioPin> {
        self.reset.is_assigned().then_some(self.reset)
    }
}
