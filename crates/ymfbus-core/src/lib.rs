//! ymfbus-core - Register transport for YMF825 synthesizer boards
//!
//! This crate drives one or more YMF825 chips that share a single SPI bus.
//! Each chip has its own chip-select line (and optionally a reset line) on a
//! GPIO controller; the [`NativeSpi`] controller maps a logical
//! [`TargetChip`] selector onto those lines and brackets every bus transfer
//! with chip-select assertion and release.
//!
//! The raw bus and pin primitives are consumed through the [`SpiBus`] and
//! [`GpioController`] traits, so the same controller runs on Linux spidev +
//! gpiochip, on a simulated board in tests, or on a microcontroller HAL.
//!
//! # Features
//!
//! - `std` - Enable standard library support and TOML board files
//!
//! # Example
//!
//! ```ignore
//! use std::collections::BTreeMap;
//! use ymfbus_core::{ChipPinConfig, GpioPin, NativeSpi, TargetChip, Transport};
//!
//! let mut pins = BTreeMap::new();
//! pins.insert(TargetChip::BOARD0, ChipPinConfig::new(GpioPin::new(25), GpioPin::new(16))?);
//! pins.insert(TargetChip::BOARD1, ChipPinConfig::new(GpioPin::new(26), GpioPin::new(16))?);
//!
//! let mut ymf = NativeSpi::new(bus, gpio, pins)?;
//! ymf.set_target(TargetChip::BOARD0)?;
//! ymf.write(0x10, 0x05)?;
//! ```

#![cfg_attr(not(any(feature = "std", test)), no_std)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

extern crate alloc;

#[cfg(feature = "std")]
pub mod board;
pub mod bus;
pub mod chip;
pub mod controller;
pub mod error;
pub mod gpio;
pub mod transport;

pub use bus::SpiBus;
pub use chip::{ChipPinConfig, TargetChip, MAX_CHIPS};
pub use controller::NativeSpi;
pub use error::{ConfigError, Error, Result};
pub use gpio::{GpioController, GpioPin, PinMode, PinValue};
pub use transport::{Transport, TransportFeatures};
