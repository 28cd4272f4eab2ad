//! ymfbus-dummy - Simulated YMF825 board for testing
//!
//! This crate provides an in-memory board on which several simulated chips
//! share one SPI bus and a set of GPIO lines. A [`DummyBoard`] hands out a
//! bus handle and a GPIO handle that plug into [`ymfbus_core::NativeSpi`]
//! like real backends, while the board records every pin and bus operation
//! and keeps a register file per chip. It's useful for testing and
//! development without real hardware.
//!
//! Frames reach every chip whose chip-select line is low. The first byte is
//! the register address; bit 7 set marks a read, which latches the address
//! for the following [`SpiBus::read_byte`]. A rising edge on a reset line
//! clears every chip wired to it.

mod chip;

pub use chip::{READ_FLAG, REGISTER_COUNT};

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ymfbus_core::error::{Error, Result};
use ymfbus_core::{ChipPinConfig, GpioController, GpioPin, PinMode, PinValue, SpiBus, TargetChip};

use chip::SimChip;

/// Value read back when no single chip drives the data line
pub const FLOATING_BYTE: u8 = 0xFF;

/// One recorded board operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A GPIO line was opened
    Open(GpioPin, PinMode),
    /// A GPIO line was closed
    Close(GpioPin),
    /// A GPIO line was driven
    Write {
        /// Driven line
        pin: GpioPin,
        /// Requested level
        value: PinValue,
    },
    /// The controller waited
    Delay(u32),
    /// One bus write frame
    Transfer(Vec<u8>),
    /// One bus read
    ReadByte,
}

#[derive(Debug, Clone, Copy)]
struct Line {
    mode: PinMode,
    value: PinValue,
}

#[derive(Debug)]
struct BoardState {
    chips: Vec<SimChip>,
    lines: BTreeMap<GpioPin, Line>,
    events: Vec<Event>,
    max_write_len: usize,
    failing_transfers: usize,
    failing_write: Option<(GpioPin, PinValue)>,
}

impl BoardState {
    fn record(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Chips whose chip-select line is opened and driven low
    fn selected(&mut self) -> impl Iterator<Item = &mut SimChip> + '_ {
        let lines = &self.lines;
        self.chips.iter_mut().filter(move |chip| {
            matches!(
                lines.get(&chip.cs),
                Some(Line {
                    value: PinValue::Low,
                    ..
                })
            )
        })
    }

    fn take_transfer_fault(&mut self) -> bool {
        if self.failing_transfers == 0 {
            return false;
        }
        self.failing_transfers -= 1;
        true
    }

    fn drive(&mut self, pin: GpioPin, value: PinValue) -> Result<()> {
        let Some(line) = self.lines.get_mut(&pin) else {
            log::error!("dummy: GPIO line {} is not open", pin);
            return Err(Error::PinWriteFailed { pin });
        };
        if line.mode != PinMode::Output {
            log::error!("dummy: GPIO line {} is not an output", pin);
            return Err(Error::PinWriteFailed { pin });
        }

        let rising = line.value == PinValue::Low && value == PinValue::High;
        line.value = value;

        if rising {
            for chip in self.chips.iter_mut().filter(|c| c.reset == Some(pin)) {
                log::debug!(
                    "dummy: Reset edge on line {} clears chip on cs {}",
                    pin,
                    chip.cs
                );
                chip.reset();
            }
        }
        Ok(())
    }
}

/// Simulated board shared by a [`DummyBus`] and a [`DummyGpio`]
#[derive(Clone)]
pub struct DummyBoard {
    state: Arc<Mutex<BoardState>>,
}

impl Default for DummyBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl DummyBoard {
    /// Create a board with no chips attached
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(BoardState {
                chips: Vec::new(),
                lines: BTreeMap::new(),
                events: Vec::new(),
                max_write_len: usize::MAX,
                failing_transfers: 0,
                failing_write: None,
            })),
        }
    }

    /// Create a board with one chip per configured slot, in slot order
    pub fn from_pin_map(pin_map: &BTreeMap<TargetChip, ChipPinConfig>) -> Self {
        let board = Self::new();
        for config in pin_map.values() {
            board.attach_chip(config.cs_pin(), config.reset_pin());
        }
        board
    }

    /// Wire a chip to the board and return its index
    pub fn attach_chip(&self, cs: GpioPin, reset: Option<GpioPin>) -> usize {
        let mut state = self.state();
        state.chips.push(SimChip::new(cs, reset));
        state.chips.len() - 1
    }

    /// Bus handle for the controller
    pub fn bus(&self) -> DummyBus {
        DummyBus(self.clone())
    }

    /// GPIO handle for the controller
    pub fn gpio(&self) -> DummyGpio {
        DummyGpio(self.clone())
    }

    /// Number of attached chips
    pub fn chip_count(&self) -> usize {
        self.state().chips.len()
    }

    /// Current value of a chip register
    ///
    /// # Panics
    ///
    /// Panics if `chip` is not an index returned by [`attach_chip`](Self::attach_chip).
    pub fn register(&self, chip: usize, register: u8) -> u8 {
        self.state().chips[chip].register(register)
    }

    /// Every data byte written to a chip register since the last reset
    ///
    /// # Panics
    ///
    /// Panics if `chip` is not an attached chip index.
    pub fn register_history(&self, chip: usize, register: u8) -> Vec<u8> {
        self.state().chips[chip].history(register).to_vec()
    }

    /// Number of reset edges a chip has seen
    ///
    /// # Panics
    ///
    /// Panics if `chip` is not an attached chip index.
    pub fn reset_count(&self, chip: usize) -> usize {
        self.state().chips[chip].resets()
    }

    /// Level of an opened line
    pub fn level(&self, pin: GpioPin) -> Option<PinValue> {
        self.state().lines.get(&pin).map(|line| line.value)
    }

    /// Whether a line is currently open
    pub fn is_open(&self, pin: GpioPin) -> bool {
        self.state().lines.contains_key(&pin)
    }

    /// Recorded operations, oldest first
    pub fn events(&self) -> Vec<Event> {
        self.state().events.clone()
    }

    /// Forget the recorded operations
    pub fn clear_events(&self) {
        self.state().events.clear();
    }

    /// Limit the length of a single bus frame
    pub fn set_max_write_len(&self, len: usize) {
        self.state().max_write_len = len;
    }

    /// Fail the next `count` bus operations
    pub fn fail_transfers(&self, count: usize) {
        self.state().failing_transfers = count;
    }

    /// Fail every attempt to drive `pin` to `value`
    pub fn fail_pin_write(&self, pin: GpioPin, value: PinValue) {
        self.state().failing_write = Some((pin, value));
    }

    /// Remove all injected faults
    pub fn clear_faults(&self) {
        let mut state = self.state();
        state.failing_transfers = 0;
        state.failing_write = None;
    }

    fn state(&self) -> MutexGuard<'_, BoardState> {
        // A panicking test thread must not hide the board from later asserts
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// SPI bus handle of a [`DummyBoard`]
pub struct DummyBus(DummyBoard);

impl SpiBus for DummyBus {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        let mut state = self.0.state();
        state.record(Event::Transfer(data.to_vec()));

        if state.take_transfer_fault() {
            log::debug!("dummy: Injected bus write failure");
            return Err(Error::BusTransferFailed);
        }
        if data.len() > state.max_write_len {
            return Err(Error::TransferTooLarge {
                len: data.len(),
                max: state.max_write_len,
            });
        }

        for chip in state.selected() {
            chip.receive(data);
        }
        Ok(())
    }

    fn read_byte(&mut self) -> Result<u8> {
        let mut state = self.0.state();
        state.record(Event::ReadByte);

        if state.take_transfer_fault() {
            log::debug!("dummy: Injected bus read failure");
            return Err(Error::BusTransferFailed);
        }

        let mut drivers = state.selected();
        let value = match (drivers.next(), drivers.next()) {
            (Some(chip), None) => chip.drive().unwrap_or(FLOATING_BYTE),
            _ => FLOATING_BYTE,
        };
        Ok(value)
    }

    fn max_write_len(&self) -> usize {
        self.0.state().max_write_len
    }
}

/// GPIO handle of a [`DummyBoard`]
pub struct DummyGpio(DummyBoard);

impl GpioController for DummyGpio {
    fn open_pin(&mut self, pin: GpioPin, mode: PinMode) -> Result<()> {
        let mut state = self.0.state();
        if !pin.is_assigned() || state.lines.contains_key(&pin) {
            log::error!("dummy: GPIO line {} cannot be opened", pin);
            return Err(Error::PinOpenFailed { pin });
        }

        state.record(Event::Open(pin, mode));
        // Lines idle high through the board's pull-ups
        state.lines.insert(
            pin,
            Line {
                mode,
                value: PinValue::High,
            },
        );
        Ok(())
    }

    fn close_pin(&mut self, pin: GpioPin) -> Result<()> {
        let mut state = self.0.state();
        if state.lines.remove(&pin).is_none() {
            log::error!("dummy: GPIO line {} is not open", pin);
            return Err(Error::PinCloseFailed { pin });
        }
        state.record(Event::Close(pin));
        Ok(())
    }

    fn write(&mut self, pin: GpioPin, value: PinValue) -> Result<()> {
        let mut state = self.0.state();
        state.record(Event::Write { pin, value });

        if state.failing_write == Some((pin, value)) {
            log::debug!("dummy: Injected failure driving line {} {}", pin, value);
            return Err(Error::PinWriteFailed { pin });
        }
        state.drive(pin, value)
    }

    fn delay_us(&mut self, us: u32) {
        self.0.state().record(Event::Delay(us));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ymfbus_core::controller::RESET_PHASE_DELAY_US;
    use ymfbus_core::{NativeSpi, Transport};

    const CS_A: GpioPin = GpioPin::new(25);
    const CS_B: GpioPin = GpioPin::new(26);
    const RESET: GpioPin = GpioPin::new(16);

    /// Two chips with their own chip-select lines and a shared reset line
    fn two_chip_map() -> BTreeMap<TargetChip, ChipPinConfig> {
        let mut map = BTreeMap::new();
        map.insert(TargetChip::BOARD0, ChipPinConfig::new(CS_A, RESET).unwrap());
        map.insert(TargetChip::BOARD1, ChipPinConfig::new(CS_B, RESET).unwrap());
        map
    }

    fn drive(pin: GpioPin, value: PinValue) -> Event {
        Event::Write { pin, value }
    }

    fn two_chip_board() -> (DummyBoard, NativeSpi<DummyBus, DummyGpio>) {
        let board = DummyBoard::from_pin_map(&two_chip_map());
        let ymf = NativeSpi::new(board.bus(), board.gpio(), two_chip_map()).unwrap();
        board.clear_events();
        (board, ymf)
    }

    #[test]
    fn test_construction_resets_once() {
        let (board, _ymf) = two_chip_board();

        assert_eq!(board.chip_count(), 2);
        assert_eq!(board.reset_count(0), 1);
        assert_eq!(board.reset_count(1), 1);
        assert_eq!(board.level(CS_A), Some(PinValue::High));
        assert_eq!(board.level(CS_B), Some(PinValue::High));
        assert_eq!(board.level(RESET), Some(PinValue::High));
    }

    #[test]
    fn test_broadcast_write_reaches_all_chips() {
        let (board, mut ymf) = two_chip_board();

        ymf.write(0x08, 0xF6).unwrap();

        assert_eq!(board.register(0, 0x08), 0xF6);
        assert_eq!(board.register(1, 0x08), 0xF6);
        assert_eq!(
            board.events(),
            vec![
                drive(CS_A, PinValue::Low),
                drive(CS_B, PinValue::Low),
                Event::Transfer(vec![0x08, 0xF6]),
                drive(CS_A, PinValue::High),
                drive(CS_B, PinValue::High),
            ]
        );
    }

    #[test]
    fn test_single_target_write() {
        let (board, mut ymf) = two_chip_board();

        ymf.set_target(TargetChip::BOARD1).unwrap();
        ymf.write(0x10, 0x05).unwrap();

        assert_eq!(board.register(0, 0x10), 0);
        assert_eq!(board.register(1, 0x10), 0x05);
        assert!(board.events().iter().all(|e| match e {
            Event::Write { pin, .. } => *pin == CS_B,
            _ => true,
        }));
    }

    #[test]
    fn test_burst_write_single_frame() {
        let (board, mut ymf) = two_chip_board();

        ymf.set_target(TargetChip::BOARD0).unwrap();
        ymf.burst_write(0x07, &[0x90, 0x00, 0x00, 0x80]).unwrap();

        let transfers: Vec<_> = board
            .events()
            .into_iter()
            .filter(|e| matches!(e, Event::Transfer(_)))
            .collect();
        assert_eq!(transfers, vec![Event::Transfer(vec![0x07, 0x90, 0x00, 0x00, 0x80])]);
        assert_eq!(board.register_history(0, 0x07), vec![0x90, 0x00, 0x00, 0x80]);
        assert!(board.register_history(1, 0x07).is_empty());
    }

    #[test]
    fn test_burst_write_over_bus_limit() {
        let (board, mut ymf) = two_chip_board();
        board.set_max_write_len(4);

        let result = ymf.burst_write(0x07, &[1, 2, 3, 4]);

        assert_eq!(result, Err(Error::TransferTooLarge { len: 5, max: 4 }));
        assert!(board.events().is_empty());
    }

    #[test]
    fn test_read_back() {
        let (board, mut ymf) = two_chip_board();

        ymf.set_target(TargetChip::BOARD1).unwrap();
        ymf.write(0x03, 0x5A).unwrap();
        assert_eq!(ymf.read(READ_FLAG | 0x03).unwrap(), 0x5A);

        ymf.set_target(TargetChip::BOARD0).unwrap();
        assert_eq!(ymf.read(READ_FLAG | 0x03).unwrap(), 0x00);
        assert_eq!(board.level(CS_A), Some(PinValue::High));
    }

    #[test]
    fn test_read_requires_single_chip() {
        let (board, mut ymf) = two_chip_board();

        assert_eq!(ymf.read(READ_FLAG), Err(Error::MultiChipRead));
        assert!(board.events().is_empty());
    }

    #[test]
    fn test_no_target() {
        let (board, mut ymf) = two_chip_board();

        ymf.set_target(TargetChip::NONE).unwrap();

        assert_eq!(ymf.write(0x00, 0x01), Err(Error::NoChipSelected));
        assert_eq!(ymf.burst_write(0x00, &[0x01]), Err(Error::NoChipSelected));
        assert_eq!(ymf.read(READ_FLAG), Err(Error::NoChipSelected));
        assert!(board.events().is_empty());
    }

    #[test]
    fn test_hardware_reset_clears_registers() {
        let (board, mut ymf) = two_chip_board();
        ymf.write(0x00, 0x01).unwrap();
        board.clear_events();

        ymf.invoke_hardware_reset().unwrap();

        assert_eq!(board.register(0, 0x00), 0);
        assert_eq!(board.register(1, 0x00), 0);
        assert_eq!(board.reset_count(0), 2);
        assert_eq!(
            board.events(),
            vec![
                drive(RESET, PinValue::High),
                Event::Delay(RESET_PHASE_DELAY_US),
                drive(RESET, PinValue::Low),
                Event::Delay(RESET_PHASE_DELAY_US),
                drive(RESET, PinValue::High),
            ]
        );
    }

    #[test]
    fn test_failed_transfer_releases_chip_select() {
        let (board, mut ymf) = two_chip_board();
        board.fail_transfers(1);

        assert_eq!(ymf.write(0x08, 0x01), Err(Error::BusTransferFailed));
        assert_eq!(board.level(CS_A), Some(PinValue::High));
        assert_eq!(board.level(CS_B), Some(PinValue::High));
        assert_eq!(board.register(0, 0x08), 0);

        // The fault is spent; the bus works again
        ymf.write(0x08, 0x02).unwrap();
        assert_eq!(board.register(1, 0x08), 0x02);
    }

    #[test]
    fn test_failed_read_releases_chip_select() {
        let (board, mut ymf) = two_chip_board();
        ymf.set_target(TargetChip::BOARD0).unwrap();
        board.fail_transfers(2);

        assert_eq!(ymf.read(READ_FLAG), Err(Error::BusTransferFailed));
        assert_eq!(board.level(CS_A), Some(PinValue::High));
    }

    #[test]
    fn test_reset_release_after_failed_low_phase() {
        let (board, mut ymf) = two_chip_board();
        board.fail_pin_write(RESET, PinValue::Low);

        let result = ymf.invoke_hardware_reset();

        assert_eq!(result, Err(Error::PinWriteFailed { pin: RESET }));
        assert_eq!(board.level(RESET), Some(PinValue::High));
        // No falling edge reached the line, so no chip was reset again
        assert_eq!(board.reset_count(0), 1);
    }

    #[test]
    fn test_close_releases_each_line_once() {
        let (board, ymf) = two_chip_board();

        ymf.close().unwrap();

        assert!(!board.is_open(CS_A));
        assert!(!board.is_open(CS_B));
        assert!(!board.is_open(RESET));
        let closes = board
            .events()
            .into_iter()
            .filter(|e| matches!(e, Event::Close(_)))
            .count();
        assert_eq!(closes, 3);
    }

    #[test]
    fn test_drop_releases_lines() {
        let (board, ymf) = two_chip_board();
        drop(ymf);

        assert!(!board.is_open(CS_A));
        assert!(!board.is_open(RESET));
    }

    #[test]
    fn test_construction_fails_when_line_taken() {
        let board = DummyBoard::from_pin_map(&two_chip_map());
        let mut other = board.gpio();
        other.open_pin(RESET, PinMode::Output).unwrap();

        let result = NativeSpi::new(board.bus(), board.gpio(), two_chip_map());

        assert!(matches!(result, Err(Error::PinOpenFailed { pin }) if pin == RESET));
        assert!(!board.is_open(CS_A));
        assert!(!board.is_open(CS_B));
        assert!(board.is_open(RESET));
    }

    #[test]
    fn test_chip_without_reset_line() {
        let mut map = BTreeMap::new();
        map.insert(TargetChip::BOARD0, ChipPinConfig::without_reset(CS_A).unwrap());
        map.insert(TargetChip::BOARD1, ChipPinConfig::new(CS_B, RESET).unwrap());
        let board = DummyBoard::from_pin_map(&map);

        let mut ymf = NativeSpi::new(board.bus(), board.gpio(), map).unwrap();

        assert_eq!(board.reset_count(0), 0);
        assert_eq!(board.reset_count(1), 1);

        board.clear_events();
        ymf.set_target(TargetChip::BOARD0).unwrap();
        ymf.write(0x10, 0x05).unwrap();
        assert!(!board
            .events()
            .iter()
            .any(|e| matches!(e, Event::Write { pin, .. } if *pin == CS_B)));
    }

    #[test]
    fn test_unopened_line_rejected() {
        let board = DummyBoard::new();
        let mut gpio = board.gpio();

        assert_eq!(
            gpio.write(CS_A, PinValue::Low),
            Err(Error::PinWriteFailed { pin: CS_A })
        );
        assert_eq!(gpio.close_pin(CS_A), Err(Error::PinCloseFailed { pin: CS_A }));
        gpio.open_pin(CS_A, PinMode::Output).unwrap();
        assert_eq!(
            gpio.open_pin(CS_A, PinMode::Output),
            Err(Error::PinOpenFailed { pin: CS_A })
        );
    }

    #[test]
    fn test_read_without_selection_floats() {
        let board = DummyBoard::new();
        board.attach_chip(CS_A, None);
        let mut bus = board.bus();

        assert_eq!(bus.read_byte().unwrap(), FLOATING_BYTE);
    }
}
