//! Hardware reset pulse
//!
//! The reset lines are driven high, then low, then high again, with
//! [`RESET_PHASE_DELAY_US`] between phases. The final release phase runs even
//! when an earlier phase failed, so a chip is never left held in reset.

use alloc::collections::BTreeSet;

use crate::error::Result;
use crate::gpio::{GpioController, GpioPin, PinValue};

/// Delay between reset phases; exceeds the YMF825 minimum reset pulse width
pub const RESET_PHASE_DELAY_US: u32 = 1_000;

/// Pulse every line in `pins` once
pub(crate) fn pulse<G: GpioController + ?Sized>(
    gpio: &mut G,
    pins: &BTreeSet<GpioPin>,
) -> Result<()> {
    if pins.is_empty() {
        log::debug!("No reset lines wired, skipping hardware reset");
        return Ok(());
    }

    log::debug!("Pulsing {} reset line(s)", pins.len());

    let asserted = assert_reset(gpio, pins);

    gpio.delay_us(RESET_PHASE_DELAY_US);
    let released = drive_all(gpio, pins, PinValue::High);

    asserted.and(released)
}

/// Idle-high phase followed by the falling edge that resets the chips
fn assert_reset<G: GpioController + ?Sized>(
    gpio: &mut G,
    pins: &BTreeSet<GpioPin>,
) -> Result<()> {
    drive_all(gpio, pins, PinValue::High)?;
    gpio.delay_us(RESET_PHASE_DELAY_US);
    drive_all(gpio, pins, PinValue::Low)
}

/// Drive every line, attempting all of them and reporting the first failure
fn drive_all<G: GpioController + ?Sized>(
    gpio: &mut G,
    pins: &BTreeSet<GpioPin>,
    value: PinValue,
) -> Result<()> {
    let mut result = Ok(());
    for &pin in pins {
        if let Err(e) = gpio.write(pin, value) {
            log::error!("Failed to drive reset line {} {}: {}", pin, value, e);
            result = result.and(Err(e));
        }
    }
    result
}
