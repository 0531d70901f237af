use kaku_core::constants::{
    MAX_PERIOD_US, MAX_REPEAT_EXPONENT, PERIOD_SHIFT, REPEAT_SHIFT, TRIT_COUNT,
};
use kaku_core::{CommandWord, Error, Result};

use crate::packing::PackedSymbols;
use crate::symbol::{Symbol, parse_trits};

/// Builder for assembling command words with a fluent API
///
/// Trits are given in transmit order (first trit on air first), which is
/// also the order printed on most KaKu/ELRO code tables.
///
/// # Example
/// ```
/// use kaku_protocol::CommandBuilder;
///
/// let word = CommandBuilder::new()
///     .trits("0F0F0FFF0FF0").unwrap()
///     .period_us(350)
///     .repeat_exponent(3)
///     .build()
///     .unwrap();
///
/// assert_eq!(word.period_us(), 350);
/// assert_eq!(word.repeats(), 8);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandBuilder {
    symbols: [Symbol; TRIT_COUNT],
    period_us: u32,
    repeat_exponent: u8,
}

impl CommandBuilder {
    /// Create a builder with all trits zero, zero period, one repeat
    pub fn new() -> Self {
        CommandBuilder {
            symbols: [Symbol::Zero; TRIT_COUNT],
            period_us: 0,
            repeat_exponent: 0,
        }
    }

    /// Set all twelve symbols, in transmit order
    pub fn symbols(mut self, symbols: [Symbol; TRIT_COUNT]) -> Self {
        self.symbols = symbols;
        self
    }

    /// Set the symbols from a trit string such as `"0F0F0FFF0FF0"`
    ///
    /// # Errors
    /// Returns error if the string is not twelve `0`, `1` or `F` trits.
    pub fn trits(mut self, trits: &str) -> Result<Self> {
        self.symbols = parse_trits(trits)?;
        Ok(self)
    }

    /// Set the period unit in microseconds (at most 511)
    pub fn period_us(mut self, period_us: u32) -> Self {
        self.period_us = period_us;
        self
    }

    /// Set the repeat exponent (at most 7, giving 128 repeats)
    pub fn repeat_exponent(mut self, repeat_exponent: u8) -> Self {
        self.repeat_exponent = repeat_exponent;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.period_us > MAX_PERIOD_US {
            return Err(Error::InvalidCommand(format!(
                "Period must be at most {MAX_PERIOD_US}us, got {}",
                self.period_us
            )));
        }
        if self.repeat_exponent > MAX_REPEAT_EXPONENT {
            return Err(Error::InvalidCommand(format!(
                "Repeat exponent must be at most {MAX_REPEAT_EXPONENT}, got {}",
                self.repeat_exponent
            )));
        }
        Ok(())
    }

    /// Build the command word
    ///
    /// # Errors
    /// Returns error if the period or repeat exponent is out of range
    pub fn build(self) -> Result<CommandWord> {
        self.validate()?;

        let payload = PackedSymbols::from_symbols(&self.symbols).payload();
        Ok(CommandWord::new(
            (self.period_us << PERIOD_SHIFT)
                | (u32::from(self.repeat_exponent) << REPEAT_SHIFT)
                | payload,
        ))
    }
}

impl Default for CommandBuilder {
    fn default() -> Self {
        Self::new()
    }
}
