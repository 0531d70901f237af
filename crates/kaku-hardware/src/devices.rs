//! Enum wrapper for output line dispatch.
//!
//! The device front-end picks its line at start-up (real sysfs line or mock)
//! but the transmitter is generic over the sink type. [`AnyOutputLine`]
//! provides a single concrete type covering every backend so the choice
//! stays a runtime decision without boxing.
//!
//! # Examples
//!
//! ```
//! use kaku_hardware::devices::AnyOutputLine;
//! use kaku_hardware::mock::MockLine;
//! use kaku_hardware::traits::OutputLine;
//!
//! let (line, _handle) = MockLine::new(134);
//! let any_line = AnyOutputLine::Mock(line);
//! assert_eq!(any_line.line(), 134);
//! ```

use kaku_core::Level;

use crate::Result;
use crate::mock::MockLine;
#[cfg(feature = "hardware-sysfs")]
use crate::sysfs::SysfsLine;
use crate::traits::OutputLine;

/// Enum wrapper for output line dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyOutputLine {
    /// Mock line for development and testing.
    Mock(MockLine),

    /// Linux sysfs GPIO line.
    #[cfg(feature = "hardware-sysfs")]
    Sysfs(SysfsLine),
}

impl OutputLine for AnyOutputLine {
    fn line(&self) -> u32 {
        match self {
            Self::Mock(line) => line.line(),
            #[cfg(feature = "hardware-sysfs")]
            Self::Sysfs(line) => line.line(),
        }
    }

    fn set_level(&mut self, level: Level) -> Result<()> {
        match self {
            Self::Mock(line) => line.set_level(level),
            #[cfg(feature = "hardware-sysfs")]
            Self::Sysfs(line) => line.set_level(level),
        }
    }

    fn level(&self) -> Level {
        match self {
            Self::Mock(line) => line.level(),
            #[cfg(feature = "hardware-sysfs")]
            Self::Sysfs(line) => line.level(),
        }
    }

    fn release(&mut self) -> Result<()> {
        match self {
            Self::Mock(line) => line.release(),
            #[cfg(feature = "hardware-sysfs")]
            Self::Sysfs(line) => line.release(),
        }
    }
}

impl From<MockLine> for AnyOutputLine {
    fn from(line: MockLine) -> Self {
        Self::Mock(line)
    }
}

#[cfg(feature = "hardware-sysfs")]
impl From<SysfsLine> for AnyOutputLine {
    fn from(line: SysfsLine) -> Self {
        Self::Sysfs(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_dispatch() {
        let (line, handle) = MockLine::new(42);
        let mut any_line = AnyOutputLine::from(line);

        assert_eq!(any_line.line(), 42);
        any_line.set_level(Level::High).unwrap();
        assert_eq!(any_line.level(), Level::High);
        assert_eq!(handle.level(), Level::High);

        any_line.release().unwrap();
        assert!(handle.is_released());
    }
}
