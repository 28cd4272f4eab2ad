//! GPIO pin identifiers and the pin control service
//!
//! The controller never owns hardware state for a pin; a [`GpioPin`] is only
//! a key handed to a [`GpioController`] backend.

use core::fmt;

use crate::error::Result;

/// Identifier of one physical GPIO line
///
/// Compared by line number. [`GpioPin::NONE`] marks an unassigned line; every
/// other value (including line 0) is a real line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GpioPin(u32);

impl GpioPin {
    /// Sentinel for "no line wired"
    pub const NONE: GpioPin = GpioPin(u32::MAX);

    /// Create a pin identifier from a line number
    pub const fn new(number: u32) -> Self {
        Self(number)
    }

    /// Line number of this pin
    pub const fn number(self) -> u32 {
        self.0
    }

    /// Returns false for [`GpioPin::NONE`]
    pub const fn is_assigned(self) -> bool {
        self.0 != u32::MAX
    }
}

impl Default for GpioPin {
    fn default() -> Self {
        Self::NONE
    }
}

impl From<u32> for GpioPin {
    fn from(number: u32) -> Self {
        Self::new(number)
    }
}

impl fmt::Display for GpioPin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_assigned() {
            write!(f, "{}", self.0)
        } else {
            write!(f, "none")
        }
    }
}

/// Direction a pin is opened with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    /// Input line
    Input,
    /// Push-pull output line
    Output,
}

/// Electrical level of a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinValue {
    /// Logic low
    Low,
    /// Logic high
    High,
}

impl fmt::Display for PinValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Pin control service
///
/// Every call blocks until the line has been changed.
pub trait GpioController {
    /// Request a line from the controller
    fn open_pin(&mut self, pin: GpioPin, mode: PinMode) -> Result<()>;

    /// Release a previously opened line
    fn close_pin(&mut self, pin: GpioPin) -> Result<()>;

    /// Drive an opened output line
    fn write(&mut self, pin: GpioPin, value: PinValue) -> Result<()>;

    /// Delay for the specified number of microseconds
    fn delay_us(&mut self, us: u32);
}

impl<T: GpioController + ?Sized> GpioController for &mut T {
    fn open_pin(&mut self, pin: GpioPin, mode: PinMode) -> Result<()> {
        (**self).open_pin(pin, mode)
    }

    fn close_pin(&mut self, pin: GpioPin) -> Result<()> {
        (**self).close_pin(pin)
    }

    fn write(&mut self, pin: GpioPin, value: PinValue) -> Result<()> {
        (**self).write(pin, value)
    }

    fn delay_us(&mut self, us: u32) {
        (**self).delay_us(us)
    }
}

// Blanket impl for boxed controllers to allow trait objects
impl GpioController for alloc::boxed::Box<dyn GpioController + Send> {
    fn open_pin(&mut self, pin: GpioPin, mode: PinMode) -> Result<()> {
        (**self).open_pin(pin, mode)
    }

    fn close_pin(&mut self, pin: GpioPin) -> Result<()> {
        (**self).close_pin(pin)
    }

    fn write(&mut self, pin: GpioPin, value: PinValue) -> Result<()> {
        (**self).write(pin, value)
    }

    fn delay_us(&mut self, us: u32) {
        (**self).delay_us(us)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pin_zero_is_assigned() {
        assert!(GpioPin::new(0).is_assigned());
        assert!(!GpioPin::NONE.is_assigned());
        assert_eq!(GpioPin::default(), GpioPin::NONE);
    }

    #[test]
    fn test_pins_compare_by_number() {
        assert_eq!(GpioPin::new(25), GpioPin::from(25));
        assert_ne!(GpioPin::new(25), GpioPin::new(26));
        assert_eq!(GpioPin::new(16).number(), 16);
    }
}
