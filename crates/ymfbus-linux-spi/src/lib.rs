//! ymfbus-linux-spi - Linux spidev bus backend
//!
//! This crate provides the shared SPI bus for YMF825 boards attached to a
//! Linux SPI controller via the `/dev/spidevX.Y` device interface.
//!
//! # Example
//!
//! ```no_run
//! use ymfbus_linux_spi::{LinuxSpi, LinuxSpiConfig};
//! use ymfbus_core::SpiBus;
//!
//! // YMF825 runs in SPI mode 0; chip-select comes from GPIO lines
//! let config = LinuxSpiConfig::new("/dev/spidev0.0")
//!     .with_speed(4_000_000)
//!     .with_mode(0);
//! let mut spi = LinuxSpi::open(&config)?;
//!
//! spi.write(&[0x00, 0x01])?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Usage with the ymfbus CLI
//!
//! ```toml
//! bus = "linux_spi:dev=/dev/spidev0.0,spispeed=4000,mode=0"
//! ```
//!
//! # System Requirements
//!
//! - Linux kernel with spidev support enabled (`CONFIG_SPI_SPIDEV`)
//! - Read/write access to `/dev/spidevX.Y` device
//! - May require adding user to `spi` group or using udev rules

pub mod device;
pub mod error;

// Re-exports
pub use device::{mode, parse_options, LinuxSpi, LinuxSpiConfig};
pub use error::{LinuxSpiError, Result};

/// Open a Linux SPI device and return a boxed SpiBus
///
/// This is a convenience function for use in the CLI backend dispatch.
///
/// # Example Options
///
/// - `dev=/dev/spidev0.0` - Required: device path
/// - `spispeed=4000` - Optional: speed in kHz (default: 2000)
/// - `mode=0` - Optional: SPI mode 0-3 (default: 0)
/// - `no_cs=1` - Optional: leave the controller's own chip-select alone
pub fn open_linux_spi(
    options: &[(&str, &str)],
) -> std::result::Result<Box<dyn ymfbus_core::SpiBus + Send>, Box<dyn std::error::Error>> {
    let config = parse_options(options)?;
    let spi = LinuxSpi::open(&config)?;
    Ok(Box::new(spi))
}
