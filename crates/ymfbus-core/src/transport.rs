//! Uniform transport contract for YMF825 drivers
//!
//! Higher-level drivers (tone setup, note sequencing) talk to a chip through
//! [`Transport`] and never see the bus or the GPIO lines. Transports that
//! buffer writes flush them in [`Transport::flush`]; transports that cannot
//! read back or pulse the reset line say so in [`Transport::features`].

use bitflags::bitflags;

use crate::chip::TargetChip;
use crate::error::Result;

bitflags! {
    /// Transport capability flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TransportFeatures: u32 {
        /// Register reads are supported
        const READ           = 1 << 0;
        /// The chips can be reset through a hardware line
        const HARDWARE_RESET = 1 << 1;
    }
}

impl Default for TransportFeatures {
    fn default() -> Self {
        TransportFeatures::empty()
    }
}

/// Register-level access to one or more YMF825 chips
pub trait Transport {
    /// Get the capabilities of this transport
    fn features(&self) -> TransportFeatures;

    /// Every chip this transport can address
    fn available_chips(&self) -> TargetChip;

    /// Chips addressed by the next transaction
    fn current_target(&self) -> TargetChip;

    /// Choose the chips addressed by subsequent transactions
    fn set_target(&mut self, chips: TargetChip) -> Result<()>;

    /// Write one data byte to a register
    fn write(&mut self, command: u8, data: u8) -> Result<()>;

    /// Write a run of data bytes to a register in a single transfer
    fn burst_write(&mut self, command: u8, data: &[u8]) -> Result<()>;

    /// Read one register of the single selected chip
    fn read(&mut self, command: u8) -> Result<u8>;

    /// Pulse the hardware reset line(s)
    fn invoke_hardware_reset(&mut self) -> Result<()>;

    /// Push out any buffered writes
    fn flush(&mut self) -> Result<()>;

    /// Whether every write is flushed immediately
    fn auto_flush(&self) -> bool {
        true
    }
}
