//! Register file of one simulated chip

use std::collections::BTreeMap;

use ymfbus_core::GpioPin;

/// Number of registers per chip
pub const REGISTER_COUNT: usize = 128;

/// Address bit marking a register read
pub const READ_FLAG: u8 = 0x80;

/// One YMF825-like chip wired to a chip-select and an optional reset line
#[derive(Debug, Clone)]
pub(crate) struct SimChip {
    pub(crate) cs: GpioPin,
    pub(crate) reset: Option<GpioPin>,
    registers: [u8; REGISTER_COUNT],
    history: BTreeMap<u8, Vec<u8>>,
    latched: Option<u8>,
    resets: usize,
}

impl SimChip {
    pub(crate) fn new(cs: GpioPin, reset: Option<GpioPin>) -> Self {
        Self {
            cs,
            reset,
            registers: [0; REGISTER_COUNT],
            history: BTreeMap::new(),
            latched: None,
            resets: 0,
        }
    }

    /// Consume one bus frame addressed to this chip
    pub(crate) fn receive(&mut self, frame: &[u8]) {
        let Some((&address, data)) = frame.split_first() else {
            return;
        };
        let register = address & !READ_FLAG;

        if address & READ_FLAG != 0 {
            self.latched = Some(register);
            return;
        }

        self.latched = None;
        if let Some(&last) = data.last() {
            self.registers[register as usize] = last;
            self.history
                .entry(register)
                .or_default()
                .extend_from_slice(data);
        }
    }

    /// Value driven back for the latched read address
    pub(crate) fn drive(&self) -> Option<u8> {
        self.latched.map(|register| self.registers[register as usize])
    }

    pub(crate) fn reset(&mut self) {
        self.registers = [0; REGISTER_COUNT];
        self.history.clear();
        self.latched = None;
        self.resets += 1;
    }

    pub(crate) fn register(&self, register: u8) -> u8 {
        self.registers[(register & !READ_FLAG) as usize]
    }

    pub(crate) fn history(&self, register: u8) -> &[u8] {
        self.history
            .get(&(register & !READ_FLAG))
            .map_or(&[][..], Vec::as_slice)
    }

    pub(crate) fn resets(&self) -> usize {
        self.resets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_stores_last_byte() {
        let mut chip = SimChip::new(GpioPin::new(25), None);
        chip.receive(&[0x07, 0x11, 0x22, 0x33]);

        assert_eq!(chip.register(0x07), 0x33);
        assert_eq!(chip.history(0x07), &[0x11, 0x22, 0x33]);
        assert_eq!(chip.register(0x08), 0);
    }

    #[test]
    fn test_read_latches_address() {
        let mut chip = SimChip::new(GpioPin::new(25), None);
        chip.receive(&[0x03, 0x5A]);
        assert_eq!(chip.drive(), None);

        chip.receive(&[READ_FLAG | 0x03]);
        assert_eq!(chip.drive(), Some(0x5A));
    }

    #[test]
    fn test_reset_clears_state() {
        let mut chip = SimChip::new(GpioPin::new(25), Some(GpioPin::new(16)));
        chip.receive(&[0x03, 0x5A]);
        chip.receive(&[READ_FLAG | 0x03]);

        chip.reset();

        assert_eq!(chip.register(0x03), 0);
        assert!(chip.history(0x03).is_empty());
        assert_eq!(chip.drive(), None);
        assert_eq!(chip.resets(), 1);
    }

    #[test]
    fn test_empty_frame_ignored() {
        let mut chip = SimChip::new(GpioPin::new(25), None);
        chip.receive(&[]);
        chip.receive(&[0x04]);
        assert_eq!(chip.register(0x04), 0);
        assert!(chip.history(0x04).is_empty());
    }
}
