//! Scoped chip-select assertion
//!
//! A [`ChipSelect`] drives the chip-select lines of every targeted chip low
//! when it is created and drives the same lines high again when it is
//! released or dropped. A failed bus transfer therefore can never leave a
//! chip listening on the shared bus.

use alloc::collections::BTreeMap;

use crate::chip::{ChipPinConfig, TargetChip};
use crate::error::Result;
use crate::gpio::{GpioController, GpioPin, PinValue};

/// Chip-select lines are active low
const CS_ACTIVE: PinValue = PinValue::Low;
const CS_INACTIVE: PinValue = PinValue::High;

/// Asserted chip-select lines of one transaction
pub(crate) struct ChipSelect<'a, G: GpioController> {
    gpio: &'a mut G,
    pin_map: &'a BTreeMap<TargetChip, ChipPinConfig>,
    target: TargetChip,
    released: bool,
}

impl<'a, G: GpioController> ChipSelect<'a, G> {
    /// Assert the chip-select line of every chip in `target`
    ///
    /// If driving any line fails, every line of the target is released again
    /// before the error is returned.
    pub(crate) fn assert(
        gpio: &'a mut G,
        pin_map: &'a BTreeMap<TargetChip, ChipPinConfig>,
        target: TargetChip,
    ) -> Result<Self> {
        let guard = Self {
            gpio,
            pin_map,
            target,
            released: false,
        };

        let pin_map = guard.pin_map;
        for pin in cs_pins(pin_map, target) {
            log::trace!("cs {} -> {}", pin, CS_ACTIVE);
            guard.gpio.write(pin, CS_ACTIVE)?;
        }

        Ok(guard)
    }

    /// Release the chip-select lines, reporting the first failure
    pub(crate) fn release(mut self) -> Result<()> {
        self.released = true;
        self.deassert()
    }

    /// Drive every targeted line inactive; all lines are attempted even if
    /// one of them fails
    fn deassert(&mut self) -> Result<()> {
        let mut result = Ok(());
        for pin in cs_pins(self.pin_map, self.target) {
            log::trace!("cs {} -> {}", pin, CS_INACTIVE);
            if let Err(e) = self.gpio.write(pin, CS_INACTIVE) {
                log::error!("Failed to release chip-select line {}: {}", pin, e);
                result = result.and(Err(e));
            }
        }
        result
    }
}

impl<G: GpioController> Drop for ChipSelect<'_, G> {
    fn drop(&mut self) {
        if !self.released {
            // Errors are already logged per line
            let _ = self.deassert();
        }
    }
}

/// Chip-select lines of the chips in `target`, in slot order
fn cs_pins(
    pin_map: &BTreeMap<TargetChip, ChipPinConfig>,
    target: TargetChip,
) -> impl Iterator<Item = GpioPin> + '_ {
    pin_map
        .iter()
        .filter(move |(chip, _)| target.contains(**chip))
        .map(|(_, config)| config.cs_pin())
}
