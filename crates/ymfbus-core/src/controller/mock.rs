//! Recording bus and GPIO doubles for controller tests

use std::cell::{Ref, RefCell};
use std::rc::Rc;
use std::vec::Vec;

use crate::bus::SpiBus;
use crate::error::{Error, Result};
use crate::gpio::{GpioController, GpioPin, PinMode, PinValue};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Open(GpioPin, PinMode),
    Close(GpioPin),
    Write(GpioPin, PinValue),
    Delay(u32),
    Transfer(Vec<u8>),
    ReadByte,
}

#[derive(Debug)]
struct State {
    events: Vec<Event>,
    fail_transfers: bool,
    fail_write: Option<(GpioPin, PinValue)>,
    fail_open: Option<GpioPin>,
    read_value: u8,
    max_write_len: usize,
}

/// Shared state behind a [`MockBus`] / [`MockGpio`] pair
#[derive(Clone)]
pub struct Mock(Rc<RefCell<State>>);

impl Mock {
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(State {
            events: Vec::new(),
            fail_transfers: false,
            fail_write: None,
            fail_open: None,
            read_value: 0,
            max_write_len: usize::MAX,
        })))
    }

    pub fn bus(&self) -> MockBus {
        MockBus(self.clone())
    }

    pub fn gpio(&self) -> MockGpio {
        MockGpio(self.clone())
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.borrow().events.clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().events.clear();
    }

    pub fn fail_transfers(&self, fail: bool) {
        self.0.borrow_mut().fail_transfers = fail;
    }

    pub fn fail_pin_write(&self, pin: GpioPin, value: PinValue) {
        self.0.borrow_mut().fail_write = Some((pin, value));
    }

    pub fn fail_open(&self, pin: GpioPin) {
        self.0.borrow_mut().fail_open = Some(pin);
    }

    pub fn set_read_value(&self, value: u8) {
        self.0.borrow_mut().read_value = value;
    }

    pub fn set_max_write_len(&self, len: usize) {
        self.0.borrow_mut().max_write_len = len;
    }

    fn state(&self) -> Ref<'_, State> {
        self.0.borrow()
    }

    fn record(&self, event: Event) {
        self.0.borrow_mut().events.push(event);
    }
}

pub struct MockBus(Mock);

impl SpiBus for MockBus {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        self.0.record(Event::Transfer(data.to_vec()));
        if self.0.state().fail_transfers {
            return Err(Error::BusTransferFailed);
        }
        Ok(())
    }

    fn read_byte(&mut self) -> Result<u8> {
        self.0.record(Event::ReadByte);
        let state = self.0.state();
        if state.fail_transfers {
            return Err(Error::BusTransferFailed);
        }
        Ok(state.read_value)
    }

    fn max_write_len(&self) -> usize {
        self.0.state().max_write_len
    }
}

pub struct MockGpio(Mock);

impl GpioController for MockGpio {
    fn open_pin(&mut self, pin: GpioPin, mode: PinMode) -> Result<()> {
        if self.0.state().fail_open == Some(pin) {
            return Err(Error::PinOpenFailed { pin });
        }
        self.0.record(Event::Open(pin, mode));
        Ok(())
    }

    fn close_pin(&mut self, pin: GpioPin) -> Result<()> {
        self.0.record(Event::Close(pin));
        Ok(())
    }

    fn write(&mut self, pin: GpioPin, value: PinValue) -> Result<()> {
        self.0.record(Event::Write(pin, value));
        if self.0.state().fail_write == Some((pin, value)) {
            return Err(Error::PinWriteFailed { pin });
        }
        Ok(())
    }

    fn delay_us(&mut self, us: u32) {
        self.0.record(Event::Delay(us));
    }
}
