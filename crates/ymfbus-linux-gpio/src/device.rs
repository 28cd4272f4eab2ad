//! Linux GPIO controller implementation
//!
//! This module provides the `LinuxGpio` struct that implements the
//! `GpioController` trait using Linux's GPIO character device interface
//! (gpiocdev). Each opened pin holds its own line request, so lines can be
//! requested and released independently.

use crate::error::{LinuxGpioError, Result};

use std::collections::HashMap;
use std::time::Duration;

use gpiocdev::chip::Chip;
use gpiocdev::line::{Offset, Value};
use gpiocdev::request::{Config, Request};

use ymfbus_core::error::{Error as CoreError, Result as CoreResult};
use ymfbus_core::{GpioController, GpioPin, PinMode, PinValue};

/// Consumer label shown by `gpioinfo` for requested lines
const CONSUMER: &str = "ymfbus";

/// Configuration for opening a Linux GPIO controller
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinuxGpioConfig {
    /// Device path (e.g., "/dev/gpiochip0")
    pub device: String,
}

impl LinuxGpioConfig {
    /// Create a new configuration with the given device path
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
        }
    }
}

/// GPIO controller backed by a Linux gpiochip
pub struct LinuxGpio {
    /// Device path of the chip
    device: String,
    /// Number of lines on the chip
    num_lines: u32,
    /// Line requests of currently opened pins
    requests: HashMap<Offset, Request>,
}

impl LinuxGpio {
    /// Open a Linux GPIO chip with the given configuration
    pub fn open(config: &LinuxGpioConfig) -> Result<Self> {
        if config.device.is_empty() {
            return Err(LinuxGpioError::NoDevice);
        }

        log::debug!("linux_gpio: Opening device {}", config.device);

        let chip_open_failed = |source| LinuxGpioError::ChipOpenFailed {
            path: config.device.clone(),
            source,
        };
        let chip = Chip::from_path(&config.device).map_err(chip_open_failed)?;
        let info = chip.info().map_err(chip_open_failed)?;

        log::info!(
            "linux_gpio: Opened {} ({}, {} lines)",
            config.device,
            info.label,
            info.num_lines
        );

        Ok(Self {
            device: config.device.clone(),
            num_lines: info.num_lines,
            requests: HashMap::new(),
        })
    }

    fn offset(&self, pin: GpioPin) -> Result<Offset> {
        if !pin.is_assigned() {
            return Err(LinuxGpioError::Unassigned);
        }
        let offset = pin.number();
        if offset >= self.num_lines {
            return Err(LinuxGpioError::InvalidLine {
                offset,
                num_lines: self.num_lines,
            });
        }
        Ok(offset)
    }

    fn request_line(&mut self, pin: GpioPin, mode: PinMode) -> Result<()> {
        let offset = self.offset(pin)?;
        if self.requests.contains_key(&offset) {
            return Err(LinuxGpioError::AlreadyOpen(offset));
        }

        // Outputs start high, the idle level of chip-select and reset lines
        let mut cfg = Config::default();
        match mode {
            PinMode::Output => cfg.with_line(offset).as_output(Value::Active),
            PinMode::Input => cfg.with_line(offset).as_input(),
        };

        let request = Request::from_config(cfg)
            .on_chip(&self.device)
            .with_consumer(CONSUMER)
            .request()
            .map_err(|source| LinuxGpioError::LineRequestFailed { offset, source })?;

        log::debug!("linux_gpio: Requested line {} as {:?}", offset, mode);
        self.requests.insert(offset, request);
        Ok(())
    }

    fn release_line(&mut self, pin: GpioPin) -> Result<()> {
        let offset = self.offset(pin)?;
        // Dropping the request releases the line
        self.requests
            .remove(&offset)
            .map(drop)
            .ok_or(LinuxGpioError::NotOpen(offset))?;
        log::debug!("linux_gpio: Released line {}", offset);
        Ok(())
    }

    fn set_line(&mut self, pin: GpioPin, value: PinValue) -> Result<()> {
        let offset = self.offset(pin)?;
        let request = self
            .requests
            .get(&offset)
            .ok_or(LinuxGpioError::NotOpen(offset))?;
        request
            .set_value(offset, line_value(value))
            .map_err(|source| LinuxGpioError::SetValueFailed { offset, source })?;
        Ok(())
    }
}

/// Lines are requested active-high, so high maps to `Value::Active`
fn line_value(value: PinValue) -> Value {
    match value {
        PinValue::High => Value::Active,
        PinValue::Low => Value::Inactive,
    }
}

impl GpioController for LinuxGpio {
    fn open_pin(&mut self, pin: GpioPin, mode: PinMode) -> CoreResult<()> {
        self.request_line(pin, mode).map_err(|e| {
            log::error!("linux_gpio: {}", e);
            CoreError::PinOpenFailed { pin }
        })
    }

    fn close_pin(&mut self, pin: GpioPin) -> CoreResult<()> {
        self.release_line(pin).map_err(|e| {
            log::error!("linux_gpio: {}", e);
            CoreError::PinCloseFailed { pin }
        })
    }

    fn write(&mut self, pin: GpioPin, value: PinValue) -> CoreResult<()> {
        self.set_line(pin, value).map_err(|e| {
            log::error!("linux_gpio: {}", e);
            CoreError::PinWriteFailed { pin }
        })
    }

    fn delay_us(&mut self, us: u32) {
        std::thread::sleep(Duration::from_micros(us as u64));
    }
}

/// Parse GPIO options from a list of key-value pairs
///
/// # Supported Options
///
/// - `dev=/dev/gpiochipN` - GPIO chip device path (required, or use gpiochip)
/// - `gpiochip=N` - GPIO chip number (alternative to dev)
pub fn parse_options(options: &[(&str, &str)]) -> std::result::Result<LinuxGpioConfig, String> {
    let mut config = LinuxGpioConfig::default();
    let mut gpiochip: Option<u32> = None;

    for (key, value) in options {
        match *key {
            "dev" => {
                config.device = value.to_string();
            }
            "gpiochip" => {
                gpiochip = Some(
                    value
                        .parse()
                        .map_err(|_| format!("Invalid gpiochip value: {}", value))?,
                );
            }
            _ => {
                log::warn!("linux_gpio: Unknown option: {}={}", key, value);
            }
        }
    }

    // Handle dev vs gpiochip
    if config.device.is_empty() {
        if let Some(n) = gpiochip {
            config.device = format!("/dev/gpiochip{}", n);
        } else {
            return Err("Either 'dev' or 'gpiochip' must be specified.\n\
                 e.g. linux_gpio:dev=/dev/gpiochip0"
                .to_string());
        }
    } else if gpiochip.is_some() {
        return Err("Only one of 'dev' or 'gpiochip' can be specified".to_string());
    }

    Ok(config)
}
