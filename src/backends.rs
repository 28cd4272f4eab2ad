//! Backend registration and dispatch
//!
//! This module provides a registry of the bus and GPIO backends compiled into
//! the binary and opens them from `name:key=value,...` strings.

use std::collections::BTreeMap;

use ymfbus_core::board::BoardConfig;
use ymfbus_core::{ChipPinConfig, GpioController, NativeSpi, SpiBus, TargetChip};

/// Controller over boxed backends, as assembled by the CLI
pub type BoardTransport = NativeSpi<Box<dyn SpiBus + Send>, Box<dyn GpioController + Send>>;

/// Which service a backend provides
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// SPI bus transfers
    Bus,
    /// Chip-select and reset lines
    Gpio,
    /// Both services on one simulated board
    Board,
}

/// Information about a backend
pub struct BackendInfo {
    /// Primary name (used for matching)
    pub name: &'static str,
    /// Alternative names/aliases
    pub aliases: &'static [&'static str],
    /// Service provided
    pub kind: BackendKind,
    /// Short description
    pub description: &'static str,
}

/// Get information about all available backends (enabled at compile time)
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_backends() -> Vec<BackendInfo> {
    let mut backends = Vec::new();

    #[cfg(feature = "dummy")]
    backends.push(BackendInfo {
        name: "dummy",
        aliases: &[],
        kind: BackendKind::Board,
        description: "Simulated YMF825 board for testing (use for both --bus and --gpio)",
    });

    #[cfg(feature = "linux-spi")]
    backends.push(BackendInfo {
        name: "linux_spi",
        aliases: &["linux-spi", "spidev"],
        kind: BackendKind::Bus,
        description: "Linux spidev (dev=/dev/spidevX.Y,spispeed=<kHz>,mode=<0-3>,no_cs=<0|1>)",
    });

    #[cfg(feature = "linux-gpio")]
    backends.push(BackendInfo {
        name: "linux_gpio",
        aliases: &["linux-gpio", "gpiochip"],
        kind: BackendKind::Gpio,
        description: "Linux GPIO character device (dev=/dev/gpiochipN or gpiochip=N)",
    });

    backends
}

/// Generate a short list of backend names for CLI help
pub fn backend_names_short() -> String {
    let backends = available_backends();
    let names: Vec<&str> = backends.iter().map(|b| b.name).collect();
    names.join(", ")
}

/// Resolve a name or alias to the canonical backend
pub fn find_backend(name: &str) -> Option<BackendInfo> {
    available_backends()
        .into_iter()
        .find(|b| b.name == name || b.aliases.contains(&name))
}

/// Parse a backend string into name and options
///
/// Format: "name" or "name:option1=value1,option2=value2"
pub fn parse_backend_string(s: &str) -> (&str, Vec<(&str, &str)>) {
    if let Some((name, opts)) = s.split_once(':') {
        let options: Vec<_> = opts
            .split(',')
            .filter_map(|opt| opt.split_once('='))
            .collect();
        (name, options)
    } else {
        (s, Vec::new())
    }
}

/// Open the backends named by `bus` and `gpio` and construct the controller
///
/// Construction opens every line in the board's pin map and performs the
/// initial hardware reset.
pub fn open_transport(
    board: &BoardConfig,
    bus: &str,
    gpio: &str,
) -> Result<BoardTransport, Box<dyn std::error::Error>> {
    let pin_map = board.pin_map()?;

    let bus_backend = lookup(bus, BackendKind::Bus)?;
    let gpio_backend = lookup(gpio, BackendKind::Gpio)?;

    let (bus, gpio) = match (bus_backend.kind, gpio_backend.kind) {
        (BackendKind::Board, BackendKind::Board) => open_board(bus_backend.name, &pin_map)?,
        (BackendKind::Board, _) | (_, BackendKind::Board) => {
            return Err(format!(
                "'{}' simulates a whole board and must be used for both bus and gpio",
                if bus_backend.kind == BackendKind::Board {
                    bus_backend.name
                } else {
                    gpio_backend.name
                }
            )
            .into());
        }
        _ => (open_bus(bus)?, open_gpio(gpio)?),
    };

    let ymf = NativeSpi::new(bus, gpio, pin_map)
        .map_err(|e| format!("Failed to initialize chips: {}", e))?;
    Ok(ymf)
}

fn lookup(backend: &str, wanted: BackendKind) -> Result<BackendInfo, Box<dyn std::error::Error>> {
    let (name, _) = parse_backend_string(backend);
    let backend = find_backend(name).ok_or_else(|| unknown_backend_error(name))?;

    if backend.kind != wanted && backend.kind != BackendKind::Board {
        return Err(format!(
            "Backend '{}' provides {:?}, not {:?}",
            backend.name, backend.kind, wanted
        )
        .into());
    }
    Ok(backend)
}

#[allow(unused_variables)]
fn open_board(
    name: &str,
    pin_map: &BTreeMap<TargetChip, ChipPinConfig>,
) -> Result<(Box<dyn SpiBus + Send>, Box<dyn GpioController + Send>), Box<dyn std::error::Error>>
{
    match name {
        #[cfg(feature = "dummy")]
        "dummy" => {
            let board = ymfbus_dummy::DummyBoard::from_pin_map(pin_map);
            log::info!("Simulating {} chip(s)", board.chip_count());
            Ok((Box::new(board.bus()), Box::new(board.gpio())))
        }
        _ => Err(unknown_backend_error(name)),
    }
}

fn open_bus(backend: &str) -> Result<Box<dyn SpiBus + Send>, Box<dyn std::error::Error>> {
    let (name, options) = parse_backend_string(backend);
    let canonical = find_backend(name).map(|b| b.name);

    match canonical {
        #[cfg(feature = "linux-spi")]
        Some("linux_spi") => {
            log::info!("Opening Linux SPI bus...");
            let bus = ymfbus_linux_spi::open_linux_spi(&options).map_err(|e| {
                format!(
                    "Failed to open Linux SPI device: {}\n\
                     Make sure the device exists and you have read/write permissions.\n\
                     You may need to: sudo usermod -aG spi $USER",
                    e
                )
            })?;
            Ok(bus)
        }
        _ => {
            let _ = options;
            Err(unknown_backend_error(name))
        }
    }
}

fn open_gpio(backend: &str) -> Result<Box<dyn GpioController + Send>, Box<dyn std::error::Error>> {
    let (name, options) = parse_backend_string(backend);
    let canonical = find_backend(name).map(|b| b.name);

    match canonical {
        #[cfg(feature = "linux-gpio")]
        Some("linux_gpio") => {
            log::info!("Opening Linux GPIO chip...");
            let gpio = ymfbus_linux_gpio::open_linux_gpio(&options).map_err(|e| {
                format!(
                    "Failed to open GPIO chip: {}\n\
                     Make sure the device exists and you have read/write permissions.",
                    e
                )
            })?;
            Ok(gpio)
        }
        _ => {
            let _ = options;
            Err(unknown_backend_error(name))
        }
    }
}

fn unknown_backend_error(name: &str) -> Box<dyn std::error::Error> {
    let mut msg = format!("Unknown backend: {}\n\n", name);
    msg.push_str(&format!("Available backends: {}\n", backend_names_short()));
    msg.push_str("\nUse 'ymfbus list-backends' for more details");
    msg.into()
}
