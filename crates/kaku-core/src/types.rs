use crate::{
    Result,
    constants::{
        COMMAND_LEN, PAYLOAD_MASK, PERIOD_SHIFT, REPEAT_MASK, REPEAT_SHIFT,
    },
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// A 32-bit KaKu command word.
///
/// The word is total: every `u32` is a valid command, so construction never
/// fails. Field accessors follow the layout documented in
/// [`constants`](crate::constants).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandWord(u32);

impl CommandWord {
    /// Wrap a raw command word.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Build a command word from its little-endian byte form.
    #[must_use]
    pub const fn from_le_bytes(bytes: [u8; COMMAND_LEN]) -> Self {
        Self(u32::from_le_bytes(bytes))
    }

    /// Build a command word from a write buffer.
    ///
    /// # Errors
    /// Returns `Error::InvalidLength` unless `bytes` is exactly 4 bytes long.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let raw: [u8; COMMAND_LEN] = bytes
            .try_into()
            .map_err(|_| Error::InvalidLength { len: bytes.len() })?;
        Ok(Self::from_le_bytes(raw))
    }

    /// Get the raw word.
    #[must_use]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }

    /// Little-endian byte form, as written to the device.
    #[must_use]
    pub const fn to_le_bytes(&self) -> [u8; COMMAND_LEN] {
        self.0.to_le_bytes()
    }

    /// Period unit `T` in microseconds (bits 23-31).
    #[must_use]
    pub const fn period_us(&self) -> u32 {
        self.0 >> PERIOD_SHIFT
    }

    /// Period unit as a [`Duration`].
    #[must_use]
    pub const fn period(&self) -> Duration {
        Duration::from_micros(self.period_us() as u64)
    }

    /// Repeat exponent `r` (bits 20-22).
    #[must_use]
    pub const fn repeat_exponent(&self) -> u8 {
        ((self.0 >> REPEAT_SHIFT) & REPEAT_MASK) as u8
    }

    /// Number of times the frame is sent (`2^r`, 1-128).
    #[must_use]
    pub const fn repeats(&self) -> usize {
        1 << self.repeat_exponent()
    }

    /// Payload bits (bits 0-19).
    #[must_use]
    pub const fn payload(&self) -> u32 {
        self.0 & PAYLOAD_MASK
    }
}

impl From<u32> for CommandWord {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl From<CommandWord> for u32 {
    fn from(word: CommandWord) -> Self {
        word.0
    }
}

impl fmt::Display for CommandWord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

impl std::str::FromStr for CommandWord {
    type Err = Error;

    /// Parse a decimal or `0x`-prefixed hexadecimal command word.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(hex) => u32::from_str_radix(&hex.replace('_', ""), 16),
            None => s.replace('_', "").parse::<u32>(),
        };

        parsed
            .map(Self)
            .map_err(|e| Error::InvalidCommand(format!("Invalid command word '{s}': {e}")))
    }
}

/// Logic level of the output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    /// Line driven low (carrier off).
    Low,

    /// Line driven high (carrier on).
    High,
}

impl Level {
    /// Convert to the `0`/`1` value written to a GPIO.
    #[must_use]
    pub const fn as_bit(&self) -> u8 {
        match self {
            Level::Low => 0,
            Level::High => 1,
        }
    }

    /// Convert from a boolean line state.
    #[must_use]
    pub const fn from_bool(high: bool) -> Self {
        if high { Level::High } else { Level::Low }
    }

    /// Check whether the level is high.
    #[must_use]
    pub const fn is_high(&self) -> bool {
        matches!(self, Level::High)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Level::Low => write!(f, "low"),
            Level::High => write!(f, "high"),
        }
    }
}
