//! ymfbus-linux-gpio - Linux GPIO chip-select and reset lines
//!
//! This crate drives the per-chip select and shared reset lines of a YMF825
//! board through the Linux character device GPIO interface (gpiocdev).
//!
//! Every pin the controller opens becomes its own line request, so a pin can
//! be released without disturbing the others. Output lines are requested
//! high, which is the idle level for both chip-select and reset.
//!
//! # Usage with the ymfbus CLI
//!
//! ```bash
//! ymfbus --bus linux_spi:dev=/dev/spidev0.0 --gpio linux_gpio:gpiochip=0 \
//!     --board board.toml reset
//! ```
//!
//! # System Requirements
//!
//! - Linux kernel 4.8+ with GPIO character device support (kernel 5.5+ for v2 API)
//! - Access to `/dev/gpiochipN` devices (may require root or udev rules)

pub mod device;
pub mod error;

// Re-exports
pub use device::{parse_options, LinuxGpio, LinuxGpioConfig};
pub use error::{LinuxGpioError, Result};

/// Open a Linux GPIO controller from CLI-style options
pub fn open_linux_gpio(
    options: &[(&str, &str)],
) -> std::result::Result<Box<dyn ymfbus_core::GpioController + Send>, Box<dyn std::error::Error>> {
    let config = parse_options(options)?;
    let gpio = LinuxGpio::open(&config)?;
    Ok(Box::new(gpio))
}
