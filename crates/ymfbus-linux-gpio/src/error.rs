//! Error types for Linux GPIO operations

use thiserror::Error;

/// Linux GPIO specific errors
#[derive(Debug, Error)]
pub enum LinuxGpioError {
    /// Failed to open GPIO chip
    #[error("Failed to open GPIO chip '{path}': {source}")]
    ChipOpenFailed {
        path: String,
        #[source]
        source: gpiocdev::Error,
    },

    /// Failed to request a GPIO line
    #[error("Failed to request GPIO line {offset}: {source}")]
    LineRequestFailed {
        offset: u32,
        #[source]
        source: gpiocdev::Error,
    },

    /// Failed to set GPIO line value
    #[error("Failed to set GPIO line {offset}: {source}")]
    SetValueFailed {
        offset: u32,
        #[source]
        source: gpiocdev::Error,
    },

    /// The line does not exist on this chip
    #[error("GPIO line {offset} out of range (chip has {num_lines} lines)")]
    InvalidLine { offset: u32, num_lines: u32 },

    /// The line is already requested by this controller
    #[error("GPIO line {0} is already open")]
    AlreadyOpen(u32),

    /// The line was never requested
    #[error("GPIO line {0} is not open")]
    NotOpen(u32),

    /// The unassigned pin sentinel was passed
    #[error("Cannot use an unassigned GPIO pin")]
    Unassigned,

    /// GPIO chip or device not specified
    #[error("No GPIO chip specified. Use dev=/dev/gpiochipN or gpiochip=N")]
    NoDevice,
}

/// Result type for Linux GPIO operations
pub type Result<T> = std::result::Result<T, LinuxGpioError>;
