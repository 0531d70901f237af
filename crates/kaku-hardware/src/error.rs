//! Error types for output line operations.
//!
//! Line failures are fatal at start-up: a line that cannot be acquired or
//! switched to output mode must stop the device from becoming ready. Once a
//! line is configured, per-pulse write failures are not surfaced to the
//! transmitter.

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur while acquiring, driving or releasing a line.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// The requested line does not exist on this host.
    #[error("Invalid line: {line}")]
    InvalidLine { line: u32 },

    /// The line exists but could not be claimed.
    #[error("Failed to acquire line {line}: {message}")]
    AcquisitionFailed { line: u32, message: String },

    /// The line could not be configured as an output.
    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    /// Writing a level to the line failed.
    #[error("Failed to drive line {line}: {message}")]
    WriteFailed { line: u32, message: String },

    /// Handing the line back to the host failed.
    #[error("Failed to release line {line}: {message}")]
    ReleaseFailed { line: u32, message: String },

    /// The line has already been released.
    #[error("Line {line} already released")]
    Released { line: u32 },

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HardwareError {
    /// Create a new invalid line error.
    pub fn invalid_line(line: u32) -> Self {
        Self::InvalidLine { line }
    }

    /// Create a new acquisition error.
    pub fn acquisition_failed(line: u32, message: impl Into<String>) -> Self {
        Self::AcquisitionFailed {
            line,
            message: message.into(),
        }
    }

    /// Create a new configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }

    /// Create a new write error.
    pub fn write_failed(line: u32, message: impl Into<String>) -> Self {
        Self::WriteFailed {
            line,
            message: message.into(),
        }
    }

    /// Create a new release error.
    pub fn release_failed(line: u32, message: impl Into<String>) -> Self {
        Self::ReleaseFailed {
            line,
            message: message.into(),
        }
    }
}

impl From<HardwareError> for kaku_core::Error {
    fn from(error: HardwareError) -> Self {
        kaku_core::Error::Hardware(error.to_string())
    }
}
