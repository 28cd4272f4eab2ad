//! Bus transfer service
//!
//! A [`SpiBus`] moves raw bytes over the shared serial bus. It has no notion
//! of addressing; which chip listens is decided by the chip-select lines the
//! controller drives around each call.

use crate::error::Result;

/// Shared SPI bus
///
/// Every call blocks until the transfer has completed.
pub trait SpiBus {
    /// Write all bytes as one contiguous transfer
    fn write(&mut self, data: &[u8]) -> Result<()>;

    /// Write a single byte
    fn write_byte(&mut self, byte: u8) -> Result<()> {
        self.write(&[byte])
    }

    /// Clock in a single byte
    fn read_byte(&mut self) -> Result<u8>;

    /// Largest number of bytes a single [`SpiBus::write`] accepts
    fn max_write_len(&self) -> usize {
        usize::MAX
    }
}

impl<T: SpiBus + ?Sized> SpiBus for &mut T {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        (**self).write(data)
    }

    fn write_byte(&mut self, byte: u8) -> Result<()> {
        (**self).write_byte(byte)
    }

    fn read_byte(&mut self) -> Result<u8> {
        (**self).read_byte()
    }

    fn max_write_len(&self) -> usize {
        (**self).max_write_len()
    }
}

// Blanket impl for boxed buses to allow trait objects
impl SpiBus for alloc::boxed::Box<dyn SpiBus + Send> {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        (**self).write(data)
    }

    fn write_byte(&mut self, byte: u8) -> Result<()> {
        (**self).write_byte(byte)
    }

    fn read_byte(&mut self) -> Result<u8> {
        (**self).read_byte()
    }

    fn max_write_len(&self) -> usize {
        (**self).max_write_len()
    }
}
