//! Bus controller for YMF825 chips sharing one SPI bus
//!
//! [`NativeSpi`] owns the pin wiring of every chip, opens the GPIO lines,
//! tracks which chips are addressed, and brackets each bus transfer with
//! chip-select assertion and guaranteed release.
//!
//! The controller is single-owner state: [`Transport::set_target`] changes
//! what every following transaction addresses, and no internal locking is
//! done. Callers that share a controller between threads must serialize
//! access themselves (for example with a `Mutex` around it).

mod chip_select;
#[cfg(test)]
mod mock;
mod reset;

pub use reset::RESET_PHASE_DELAY_US;

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::vec::Vec;

use crate::bus::SpiBus;
use crate::chip::{ChipPinConfig, TargetChip};
use crate::error::{ConfigError, Error, Result};
use crate::gpio::{GpioController, GpioPin, PinMode, PinValue};
use crate::transport::{Transport, TransportFeatures};

use chip_select::ChipSelect;

/// YMF825 transport over a shared SPI bus with GPIO chip-select lines
///
/// Construction opens every configured line and pulses the reset lines;
/// [`NativeSpi::close`] (or dropping the controller) releases them again.
pub struct NativeSpi<B: SpiBus, G: GpioController> {
    bus: B,
    gpio: G,
    pin_map: BTreeMap<TargetChip, ChipPinConfig>,
    reset_pins: BTreeSet<GpioPin>,
    available: TargetChip,
    current: TargetChip,
    /// Lines currently held open, released exactly once
    opened: BTreeSet<GpioPin>,
}

impl<B: SpiBus, G: GpioController> NativeSpi<B, G> {
    /// Create a controller for the chips in `pin_map`
    ///
    /// Every key must select exactly one chip. All chips are targeted
    /// initially. Chip-select and reset lines are opened as outputs driven
    /// high, then a hardware reset is performed.
    pub fn new(bus: B, gpio: G, pin_map: BTreeMap<TargetChip, ChipPinConfig>) -> Result<Self> {
        let reset_pins = validate(&pin_map)?;
        let available = pin_map
            .keys()
            .fold(TargetChip::NONE, |sum, chip| sum | *chip);

        log::info!(
            "Configuring {} chip(s) [{}] with {} reset line(s)",
            pin_map.len(),
            available,
            reset_pins.len()
        );

        let mut ymf = Self {
            bus,
            gpio,
            pin_map,
            reset_pins,
            available,
            current: available,
            opened: BTreeSet::new(),
        };

        // On error the controller is dropped, which closes whatever was opened
        ymf.open_pins()?;
        ymf.invoke_hardware_reset()?;

        Ok(ymf)
    }

    /// Pin wiring of a single chip
    pub fn pin_config(&self, chip: TargetChip) -> Option<&ChipPinConfig> {
        self.pin_map.get(&chip)
    }

    /// Distinct reset lines, each pulsed once per reset
    pub fn reset_pins(&self) -> &BTreeSet<GpioPin> {
        &self.reset_pins
    }

    /// Release every opened line
    ///
    /// All lines are closed even if some fail; the first failure is
    /// returned. Dropping the controller does the same but can only log
    /// failures.
    pub fn close(mut self) -> Result<()> {
        self.close_pins()
    }

    fn open_pins(&mut self) -> Result<()> {
        let cs_pins = self.pin_map.values().map(ChipPinConfig::cs_pin);
        let pins: Vec<GpioPin> = cs_pins.chain(self.reset_pins.iter().copied()).collect();

        for pin in pins {
            log::debug!("Opening GPIO line {} as output", pin);
            self.gpio.open_pin(pin, PinMode::Output)?;
            self.opened.insert(pin);
            self.gpio.write(pin, PinValue::High)?;
        }
        Ok(())
    }

    fn close_pins(&mut self) -> Result<()> {
        let mut result = Ok(());
        for pin in core::mem::take(&mut self.opened) {
            log::debug!("Closing GPIO line {}", pin);
            if let Err(e) = self.gpio.close_pin(pin) {
                log::error!("Failed to close GPIO line {}: {}", pin, e);
                result = result.and(Err(e));
            }
        }
        result
    }

    fn ensure_selected(&self) -> Result<()> {
        if self.current.is_empty() {
            return Err(Error::NoChipSelected);
        }
        Ok(())
    }

    /// Run `transfer` with the current target's chip-select lines asserted
    ///
    /// The lines are released on every path. A transfer error takes
    /// precedence over a release error.
    fn selected<T>(&mut self, transfer: impl FnOnce(&mut B) -> Result<T>) -> Result<T> {
        let cs = ChipSelect::assert(&mut self.gpio, &self.pin_map, self.current)?;
        let result = transfer(&mut self.bus);
        let released = cs.release();

        let value = result?;
        released?;
        Ok(value)
    }
}

impl<B: SpiBus, G: GpioController> Transport for NativeSpi<B, G> {
    fn features(&self) -> TransportFeatures {
        TransportFeatures::READ | TransportFeatures::HARDWARE_RESET
    }

    fn available_chips(&self) -> TargetChip {
        self.available
    }

    fn current_target(&self) -> TargetChip {
        self.current
    }

    fn set_target(&mut self, chips: TargetChip) -> Result<()> {
        if !self.available.contains(chips) {
            return Err(Error::TargetOutOfRange {
                requested: chips,
                available: self.available,
            });
        }

        log::trace!("Target chips: {}", chips);
        self.current = chips;
        Ok(())
    }

    fn write(&mut self, command: u8, data: u8) -> Result<()> {
        self.ensure_selected()?;

        let frame = [command, data];
        log::trace!("[{}] write {:02X} {:02X}", self.current, command, data);
        self.selected(|bus| bus.write(&frame))
    }

    fn burst_write(&mut self, command: u8, data: &[u8]) -> Result<()> {
        self.ensure_selected()?;

        let len = data.len() + 1;
        let max = self.bus.max_write_len();
        if len > max {
            return Err(Error::TransferTooLarge { len, max });
        }

        let mut frame = Vec::with_capacity(len);
        frame.push(command);
        frame.extend_from_slice(data);

        log::trace!(
            "[{}] burst write {:02X} ({} bytes)",
            self.current,
            command,
            data.len()
        );
        self.selected(|bus| bus.write(&frame))
    }

    fn read(&mut self, command: u8) -> Result<u8> {
        self.ensure_selected()?;
        if !self.current.is_single_chip() {
            return Err(Error::MultiChipRead);
        }

        let value = self.selected(|bus| {
            bus.write_byte(command)?;
            bus.read_byte()
        })?;

        log::trace!("[{}] read {:02X} -> {:02X}", self.current, command, value);
        Ok(value)
    }

    fn invoke_hardware_reset(&mut self) -> Result<()> {
        log::info!("Resetting chips [{}]", self.available);
        reset::pulse(&mut self.gpio, &self.reset_pins)
    }

    fn flush(&mut self) -> Result<()> {
        // Transfers are synchronous; nothing is buffered
        Ok(())
    }
}

impl<B: SpiBus, G: GpioController> Drop for NativeSpi<B, G> {
    fn drop(&mut self) {
        if !self.opened.is_empty() {
            // Failures are already logged per line
            let _ = self.close_pins();
        }
    }
}

/// Check the pin map and return its distinct reset lines
fn validate(pin_map: &BTreeMap<TargetChip, ChipPinConfig>) -> Result<BTreeSet<GpioPin>> {
    if let Some(key) = pin_map.keys().find(|chip| !chip.is_single_chip()) {
        return Err(ConfigError::MultiChipKey(*key).into());
    }

    let mut cs_pins = BTreeSet::new();
    for config in pin_map.values() {
        if !cs_pins.insert(config.cs_pin()) {
            return Err(ConfigError::PinConflict {
                pin: config.cs_pin(),
            }
            .into());
        }
    }

    let reset_pins: BTreeSet<GpioPin> = pin_map
        .values()
        .filter_map(ChipPinConfig::reset_pin)
        .collect();

    if let Some(pin) = reset_pins.intersection(&cs_pins).next() {
        return Err(ConfigError::PinConflict { pin: *pin }.into());
    }

    Ok(reset_pins)
}
