//! Linux SPI device implementation
//!
//! This module provides the `LinuxSpi` struct that implements the `SpiBus`
//! trait using Linux's spidev interface.
//!
//! Chip selection is done by the controller on GPIO lines. The spidev
//! device's own chip-select can be disabled with `no_cs=1` when the
//! controller driver supports `SPI_NO_CS`; otherwise it simply toggles
//! alongside each transfer.

use crate::error::{LinuxSpiError, Result};

use ymfbus_core::error::{Error as CoreError, Result as CoreResult};
use ymfbus_core::SpiBus;

use std::fs::{File, OpenOptions};
use std::os::unix::io::AsRawFd;

/// Path to kernel spidev buffer size parameter
const BUF_SIZE_SYSFS: &str = "/sys/module/spidev/parameters/bufsiz";

/// Default SPI clock speed in Hz (2 MHz)
const DEFAULT_SPEED_HZ: u32 = 2_000_000;

/// SPI mode constants
pub mod mode {
    /// SPI mode 0: CPOL=0, CPHA=0 (YMF825)
    pub const MODE_0: u8 = 0;
    /// SPI mode 1: CPOL=0, CPHA=1
    pub const MODE_1: u8 = 1;
    /// SPI mode 2: CPOL=1, CPHA=0
    pub const MODE_2: u8 = 2;
    /// SPI mode 3: CPOL=1, CPHA=1
    pub const MODE_3: u8 = 3;
    /// Do not drive the controller's own chip-select line
    pub const NO_CS: u8 = 0x40;
}

/// Linux spidev ioctl constants
mod ioctl {
    use nix::ioctl_write_ptr;

    // SPI ioctl magic number
    const SPI_IOC_MAGIC: u8 = b'k';

    // SPI ioctl type numbers
    const SPI_IOC_TYPE_MODE: u8 = 1;
    const SPI_IOC_TYPE_BITS_PER_WORD: u8 = 3;
    const SPI_IOC_TYPE_MAX_SPEED_HZ: u8 = 4;

    ioctl_write_ptr!(spi_ioc_wr_mode, SPI_IOC_MAGIC, SPI_IOC_TYPE_MODE, u8);
    ioctl_write_ptr!(
        spi_ioc_wr_bits_per_word,
        SPI_IOC_MAGIC,
        SPI_IOC_TYPE_BITS_PER_WORD,
        u8
    );
    ioctl_write_ptr!(
        spi_ioc_wr_max_speed_hz,
        SPI_IOC_MAGIC,
        SPI_IOC_TYPE_MAX_SPEED_HZ,
        u32
    );

    /// Size of struct spi_ioc_transfer
    pub const SPI_IOC_TRANSFER_SIZE: usize = 32;

    /// Calculate ioctl number for SPI_IOC_MESSAGE(n)
    pub fn spi_ioc_message(n: u8) -> libc::c_ulong {
        let size = (n as usize) * SPI_IOC_TRANSFER_SIZE;
        // _IOW(SPI_IOC_MAGIC, 0, char[size]); _IOC_WRITE = 1
        ((1u32 << 30) | ((size as u32) << 16) | ((SPI_IOC_MAGIC as u32) << 8)) as libc::c_ulong
    }
}

/// SPI transfer structure for ioctl
/// This must match the kernel's struct spi_ioc_transfer layout
#[repr(C)]
#[derive(Debug, Default, Clone)]
struct SpiIocTransfer {
    tx_buf: u64,          // __u64 tx_buf
    rx_buf: u64,          // __u64 rx_buf
    len: u32,             // __u32 len
    speed_hz: u32,        // __u32 speed_hz
    delay_usecs: u16,     // __u16 delay_usecs
    bits_per_word: u8,    // __u8 bits_per_word
    cs_change: u8,        // __u8 cs_change
    tx_nbits: u8,         // __u8 tx_nbits
    rx_nbits: u8,         // __u8 rx_nbits
    word_delay_usecs: u8, // __u8 word_delay_usecs
    _pad: u8,             // padding
}

/// Configuration for opening a Linux SPI device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinuxSpiConfig {
    /// Device path (e.g., "/dev/spidev0.0")
    pub device: String,
    /// SPI clock speed in Hz (default: 2 MHz)
    pub speed_hz: u32,
    /// SPI mode (0-3, default: 0)
    pub mode: u8,
    /// Leave the controller's own chip-select line alone
    pub no_cs: bool,
}

impl Default for LinuxSpiConfig {
    fn default() -> Self {
        Self {
            device: String::new(),
            speed_hz: DEFAULT_SPEED_HZ,
            mode: mode::MODE_0,
            no_cs: false,
        }
    }
}

impl LinuxSpiConfig {
    /// Create a new configuration with the given device path
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            ..Default::default()
        }
    }

    /// Set the SPI clock speed in Hz
    pub fn with_speed(mut self, speed_hz: u32) -> Self {
        self.speed_hz = speed_hz;
        self
    }

    /// Set the SPI mode (0-3)
    pub fn with_mode(mut self, mode: u8) -> Self {
        self.mode = mode;
        self
    }

    /// Disable the controller's own chip-select line
    pub fn with_no_cs(mut self, no_cs: bool) -> Self {
        self.no_cs = no_cs;
        self
    }

    /// Mode byte written to the device
    fn mode_bits(&self) -> u8 {
        if self.no_cs {
            self.mode | mode::NO_CS
        } else {
            self.mode
        }
    }
}

/// Shared SPI bus using the spidev interface
pub struct LinuxSpi {
    /// File handle for spidev device
    file: File,
    /// Maximum kernel buffer size
    max_kernel_buf_size: usize,
    /// Current speed in Hz
    speed_hz: u32,
}

impl LinuxSpi {
    /// Open a Linux SPI device with the given configuration
    pub fn open(config: &LinuxSpiConfig) -> Result<Self> {
        if config.device.is_empty() {
            return Err(LinuxSpiError::NoDevice);
        }

        log::debug!("linux_spi: Opening device {}", config.device);

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&config.device)
            .map_err(|e| LinuxSpiError::OpenFailed {
                path: config.device.clone(),
                source: e,
            })?;

        let fd = file.as_raw_fd();

        let mode = config.mode_bits();
        unsafe {
            ioctl::spi_ioc_wr_mode(fd, &mode).map_err(|e| LinuxSpiError::SetModeFailed {
                mode,
                source: std::io::Error::from_raw_os_error(e as i32),
            })?;
        }

        // Set bits per word (always 8)
        let bits: u8 = 8;
        unsafe {
            ioctl::spi_ioc_wr_bits_per_word(fd, &bits).map_err(|e| {
                LinuxSpiError::SetBitsPerWordFailed {
                    bits,
                    source: std::io::Error::from_raw_os_error(e as i32),
                }
            })?;
        }

        let speed = config.speed_hz;
        unsafe {
            ioctl::spi_ioc_wr_max_speed_hz(fd, &speed).map_err(|e| {
                LinuxSpiError::SetSpeedFailed {
                    speed,
                    source: std::io::Error::from_raw_os_error(e as i32),
                }
            })?;
        }

        log::info!(
            "linux_spi: Opened {} (mode=0x{:02X}, speed={} kHz)",
            config.device,
            mode,
            speed / 1000
        );

        let max_kernel_buf_size = get_max_kernel_buf_size();
        log::debug!(
            "linux_spi: Max kernel buffer size: {} bytes",
            max_kernel_buf_size
        );

        Ok(Self {
            file,
            max_kernel_buf_size,
            speed_hz: speed,
        })
    }

    /// Open a device with default settings
    pub fn open_device(device: &str) -> Result<Self> {
        Self::open(&LinuxSpiConfig::new(device))
    }

    /// Get current speed setting
    pub fn speed_hz(&self) -> u32 {
        self.speed_hz
    }

    /// Transmit `data` as one transfer
    fn transfer_out(&mut self, data: &[u8]) -> Result<()> {
        self.check_len(data.len())?;
        let transfer = SpiIocTransfer {
            tx_buf: data.as_ptr() as u64,
            len: data.len() as u32,
            speed_hz: self.speed_hz,
            bits_per_word: 8,
            ..Default::default()
        };
        self.submit(&transfer)
    }

    /// Receive `buf.len()` bytes as one transfer
    fn transfer_in(&mut self, buf: &mut [u8]) -> Result<()> {
        self.check_len(buf.len())?;
        let transfer = SpiIocTransfer {
            rx_buf: buf.as_mut_ptr() as u64,
            len: buf.len() as u32,
            speed_hz: self.speed_hz,
            bits_per_word: 8,
            ..Default::default()
        };
        self.submit(&transfer)
    }

    fn check_len(&self, len: usize) -> Result<()> {
        if len > self.max_kernel_buf_size {
            return Err(LinuxSpiError::TransferTooLarge {
                len,
                max: self.max_kernel_buf_size,
            });
        }
        Ok(())
    }

    fn submit(&mut self, transfer: &SpiIocTransfer) -> Result<()> {
        let fd = self.file.as_raw_fd();
        let ret = unsafe {
            libc::ioctl(
                fd,
                ioctl::spi_ioc_message(1),
                transfer as *const SpiIocTransfer,
            )
        };

        if ret < 0 {
            return Err(LinuxSpiError::TransferFailed(
                std::io::Error::last_os_error(),
            ));
        }

        Ok(())
    }
}

impl SpiBus for LinuxSpi {
    fn write(&mut self, data: &[u8]) -> CoreResult<()> {
        if data.is_empty() {
            return Ok(());
        }
        self.transfer_out(data).map_err(|e| {
            log::error!("linux_spi: {}", e);
            CoreError::BusTransferFailed
        })
    }

    fn read_byte(&mut self) -> CoreResult<u8> {
        let mut buf = [0u8; 1];
        self.transfer_in(&mut buf).map_err(|e| {
            log::error!("linux_spi: {}", e);
            CoreError::BusTransferFailed
        })?;
        Ok(buf[0])
    }

    fn max_write_len(&self) -> usize {
        self.max_kernel_buf_size
    }
}

/// Read the maximum kernel buffer size from sysfs, or use page size as fallback
fn get_max_kernel_buf_size() -> usize {
    if let Ok(content) = std::fs::read_to_string(BUF_SIZE_SYSFS) {
        if let Ok(size) = content.trim().parse::<usize>() {
            if size > 0 {
                log::debug!("linux_spi: Using buffer size {} from sysfs", size);
                return size;
            }
        }
        log::warn!("linux_spi: Invalid buffer size in {}", BUF_SIZE_SYSFS);
    } else {
        log::debug!("linux_spi: Cannot read {}, using page size", BUF_SIZE_SYSFS);
    }

    let page_size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) } as usize;
    log::debug!("linux_spi: Using page size {} as buffer size", page_size);
    page_size
}

/// Parse bus options from a list of key-value pairs
///
/// # Supported Options
///
/// - `dev=/dev/spidevX.Y` - Device path (required)
/// - `spispeed=N` - SPI speed in kHz (optional, default 2000)
/// - `mode=N` - SPI mode 0-3 (optional, default 0)
/// - `no_cs=0|1` - Leave the controller's own chip-select alone (optional)
pub fn parse_options(options: &[(&str, &str)]) -> std::result::Result<LinuxSpiConfig, String> {
    let mut config = LinuxSpiConfig::default();

    for (key, value) in options {
        match *key {
            "dev" => {
                config.device = value.to_string();
            }
            "spispeed" => {
                let speed_khz: u32 = value
                    .parse()
                    .map_err(|_| format!("Invalid spispeed value: {}", value))?;
                config.speed_hz = speed_khz
                    .checked_mul(1000)
                    .filter(|hz| *hz > 0)
                    .ok_or_else(|| format!("Invalid spispeed value: {}", value))?;
            }
            "mode" => {
                let mode: u8 = value
                    .parse()
                    .map_err(|_| format!("Invalid mode value: {}", value))?;
                if mode > 3 {
                    return Err(format!("Invalid SPI mode: {} (must be 0-3)", mode));
                }
                config.mode = mode;
            }
            "no_cs" => {
                config.no_cs = match *value {
                    "1" | "yes" | "true" => true,
                    "0" | "no" | "false" => false,
                    _ => return Err(format!("Invalid no_cs value: {}", value)),
                };
            }
            _ => {
                log::warn!("linux_spi: Unknown option: {}={}", key, value);
            }
        }
    }

    if config.device.is_empty() {
        return Err("No device specified. Use dev=/dev/spidevX.Y".to_string());
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_struct_matches_kernel_layout() {
        assert_eq!(
            std::mem::size_of::<SpiIocTransfer>(),
            ioctl::SPI_IOC_TRANSFER_SIZE
        );
        assert_eq!(ioctl::spi_ioc_message(1), 0x4020_6B00);
    }

    #[test]
    fn test_parse_options() {
        let config = parse_options(&[
            ("dev", "/dev/spidev0.0"),
            ("spispeed", "4000"),
            ("mode", "3"),
        ])
        .unwrap();
        assert_eq!(config.device, "/dev/spidev0.0");
        assert_eq!(config.speed_hz, 4_000_000);
        assert_eq!(config.mode, mode::MODE_3);
        assert!(!config.no_cs);
    }

    #[test]
    fn test_parse_options_defaults() {
        let config = parse_options(&[("dev", "/dev/spidev0.1")]).unwrap();
        assert_eq!(config, LinuxSpiConfig::new("/dev/spidev0.1"));
        assert_eq!(config.speed_hz, DEFAULT_SPEED_HZ);
    }

    #[test]
    fn test_parse_options_errors() {
        assert!(parse_options(&[]).is_err());
        assert!(parse_options(&[("dev", "/dev/spidev0.0"), ("mode", "4")]).is_err());
        assert!(parse_options(&[("dev", "/dev/spidev0.0"), ("spispeed", "fast")]).is_err());
        assert!(parse_options(&[("dev", "/dev/spidev0.0"), ("no_cs", "maybe")]).is_err());
    }

    #[test]
    fn test_no_cs_mode_bits() {
        let config = LinuxSpiConfig::new("/dev/spidev0.0").with_mode(mode::MODE_0);
        assert_eq!(config.mode_bits(), 0x00);

        let config = config.with_mode(mode::MODE_1).with_no_cs(true);
        assert_eq!(config.mode_bits(), 0x41);
    }
}
