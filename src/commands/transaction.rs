//! Register transactions and reset

use ymfbus_core::{TargetChip, Transport};

/// Address bit that turns a register access into a read
const READ_BIT: u8 = 0x80;

type CommandResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Pulse the reset lines of every configured chip
pub fn run_reset<T: Transport>(ymf: &mut T) -> CommandResult {
    ymf.invoke_hardware_reset()
        .map_err(|e| format!("Reset failed: {}", e))?;
    println!("Reset chips {}", ymf.available_chips());
    Ok(())
}

/// Write one byte to a register of the target chips
///
/// Without a target, or with "all", every configured chip is addressed.
pub fn run_write<T: Transport>(
    ymf: &mut T,
    target: Option<TargetChip>,
    command: u8,
    data: u8,
) -> CommandResult {
    let target = resolve(ymf, target);
    select(ymf, target)?;
    ymf.write(command, data)?;
    ymf.flush()?;
    log::info!("[{}] {:02X} <- {:02X}", target, command, data);
    Ok(())
}

/// Write a byte sequence to the target chips in one transfer
pub fn run_burst_write<T: Transport>(
    ymf: &mut T,
    target: Option<TargetChip>,
    command: u8,
    data: &[u8],
) -> CommandResult {
    let target = resolve(ymf, target);
    select(ymf, target)?;
    ymf.burst_write(command, data)?;
    ymf.flush()?;
    log::info!("[{}] {:02X} <- {} byte(s)", target, command, data.len());
    Ok(())
}

/// Read one register of a single chip and print it
pub fn run_read<T: Transport>(ymf: &mut T, target: TargetChip, command: u8) -> CommandResult {
    let value = read_register(ymf, target, command)?;
    println!("{:02X}", value);
    Ok(())
}

fn read_register<T: Transport>(ymf: &mut T, target: TargetChip, command: u8) -> CommandResult<u8> {
    if !target.is_single_chip() {
        return Err(format!("Read needs exactly one chip, got '{}'", target).into());
    }
    select(ymf, target)?;
    Ok(ymf.read(command | READ_BIT)?)
}

/// Map a missing target or "all" onto the chips this board configures
fn resolve<T: Transport>(ymf: &T, target: Option<TargetChip>) -> TargetChip {
    match target {
        Some(chips) if chips != TargetChip::all() => chips,
        _ => ymf.available_chips(),
    }
}

fn select<T: Transport>(ymf: &mut T, target: TargetChip) -> CommandResult {
    ymf.set_target(target).map_err(|e| {
        format!(
            "Cannot address chips '{}': {} (configured: {})",
            target,
            e,
            ymf.available_chips()
        )
    })?;
    Ok(())
}

#[cfg(all(test, feature = "dummy"))]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use ymfbus_core::{ChipPinConfig, GpioPin, NativeSpi};
    use ymfbus_dummy::{DummyBoard, DummyBus, DummyGpio};

    fn setup() -> (DummyBoard, NativeSpi<DummyBus, DummyGpio>) {
        let mut map = BTreeMap::new();
        map.insert(
            TargetChip::BOARD0,
            ChipPinConfig::new(GpioPin::new(25), GpioPin::new(16)).unwrap(),
        );
        map.insert(
            TargetChip::BOARD1,
            ChipPinConfig::new(GpioPin::new(26), GpioPin::new(16)).unwrap(),
        );
        let board = DummyBoard::from_pin_map(&map);
        let ymf = NativeSpi::new(board.bus(), board.gpio(), map).unwrap();
        (board, ymf)
    }

    #[test]
    fn test_write_then_read() {
        let (board, mut ymf) = setup();

        run_write(&mut ymf, None, 0x08, 0x16).unwrap();
        assert_eq!(board.register(0, 0x08), 0x16);
        assert_eq!(board.register(1, 0x08), 0x16);

        assert_eq!(read_register(&mut ymf, TargetChip::BOARD1, 0x08).unwrap(), 0x16);
    }

    #[test]
    fn test_write_without_target_from_command_line() {
        use crate::cli::{Cli, Commands};
        use clap::Parser;

        let (board, mut ymf) = setup();
        let cli = Cli::try_parse_from(["ymfbus", "write", "0x08", "0x16"]).unwrap();
        let Commands::Write {
            target,
            command,
            data,
        } = cli.command
        else {
            panic!("expected write");
        };

        run_write(&mut ymf, target, command, data).unwrap();

        assert_eq!(board.register(0, 0x08), 0x16);
        assert_eq!(board.register(1, 0x08), 0x16);
    }

    #[test]
    fn test_all_means_configured_chips() {
        let (board, mut ymf) = setup();
        let all: TargetChip = "all".parse().unwrap();

        run_burst_write(&mut ymf, Some(all), 0x07, &[0x11]).unwrap();

        assert_eq!(ymf.current_target(), TargetChip::BOARD0 | TargetChip::BOARD1);
        assert_eq!(board.register_history(0, 0x07), vec![0x11]);
        assert_eq!(board.register_history(1, 0x07), vec![0x11]);
    }

    #[test]
    fn test_burst_write_targets_one_chip() {
        let (board, mut ymf) = setup();

        run_burst_write(&mut ymf, Some(TargetChip::BOARD0), 0x07, &[0x90, 0x00]).unwrap();
        assert_eq!(board.register_history(0, 0x07), vec![0x90, 0x00]);
        assert!(board.register_history(1, 0x07).is_empty());
    }

    #[test]
    fn test_read_rejects_broadcast() {
        let (_board, mut ymf) = setup();
        let both = TargetChip::BOARD0 | TargetChip::BOARD1;

        assert!(read_register(&mut ymf, both, 0x03).is_err());
        // The target is left untouched
        assert_eq!(ymf.current_target(), both);
    }

    #[test]
    fn test_unconfigured_target() {
        let (_board, mut ymf) = setup();

        assert!(run_write(&mut ymf, Some(TargetChip::BOARD2), 0x00, 0x00).is_err());
        assert_eq!(ymf.current_target(), TargetChip::BOARD0 | TargetChip::BOARD1);
    }

    #[test]
    fn test_reset_clears_board() {
        let (board, mut ymf) = setup();
        run_write(&mut ymf, Some(TargetChip::BOARD0), 0x01, 0x80).unwrap();

        run_reset(&mut ymf).unwrap();

        assert_eq!(board.register(0, 0x01), 0);
        assert_eq!(board.reset_count(0), 2);
    }
}
