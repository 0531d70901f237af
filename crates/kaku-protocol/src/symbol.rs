//! Tri-state symbols and their pulse shapes.
//!
//! Every symbol is four line transitions long and always alternates
//! high, low, high, low. Only the hold lengths differ:
//!
//! | symbol | pulses                          |
//! |--------|---------------------------------|
//! | `0`    | high 1T, low 3T, high 1T, low 3T |
//! | `1`    | high 3T, low 1T, high 3T, low 1T |
//! | `F`    | high 1T, low 3T, high 3T, low 1T |
//!
//! After the twelve symbols of a frame the termination gap follows: high 1T,
//! low 31T.

use std::fmt;
use std::time::Duration;

use kaku_core::constants::{TERMINATION_LOW_PERIODS, TRIT_COUNT};
use kaku_core::{Error, Level, Result};
use serde::{Deserialize, Serialize};

/// A single level held for a number of period units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pulse {
    /// Level driven on the line.
    pub level: Level,

    /// Hold length in period units.
    pub periods: u32,
}

impl Pulse {
    /// High level held for `periods` units.
    #[must_use]
    pub const fn high(periods: u32) -> Self {
        Self {
            level: Level::High,
            periods,
        }
    }

    /// Low level held for `periods` units.
    #[must_use]
    pub const fn low(periods: u32) -> Self {
        Self {
            level: Level::Low,
            periods,
        }
    }

    /// Hold duration for a given period unit.
    #[must_use]
    pub fn duration(&self, period: Duration) -> Duration {
        period * self.periods
    }
}

/// Termination gap closing every frame (32 period units).
pub const TERMINATION: [Pulse; 2] = [Pulse::high(1), Pulse::low(TERMINATION_LOW_PERIODS)];

/// A tri-state symbol.
///
/// Codes 0-2 match the two-bit slots of a packed payload; code 3 never
/// occurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Symbol {
    /// Trit 0.
    Zero,

    /// Trit 1.
    One,

    /// Trit 2, the floating state (written `F`).
    Float,
}

impl Symbol {
    /// Two-bit code of this symbol.
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Symbol::Zero => 0,
            Symbol::One => 1,
            Symbol::Float => 2,
        }
    }

    /// Symbol for a two-bit code, or `None` for 3.
    #[must_use]
    pub const fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(Symbol::Zero),
            1 => Some(Symbol::One),
            2 => Some(Symbol::Float),
            _ => None,
        }
    }

    /// Parse a symbol character: `0`, `1`, or `F`/`f`/`X`/`x`/`2` for float.
    ///
    /// # Errors
    /// Returns `Error::InvalidCommand` for any other character.
    pub fn from_char(c: char) -> Result<Self> {
        match c {
            '0' => Ok(Symbol::Zero),
            '1' => Ok(Symbol::One),
            'F' | 'f' | 'X' | 'x' | '2' => Ok(Symbol::Float),
            other => Err(Error::InvalidCommand(format!(
                "Invalid trit '{other}', expected 0, 1 or F"
            ))),
        }
    }

    /// Character form: `0`, `1` or `F`.
    #[must_use]
    pub const fn to_char(self) -> char {
        match self {
            Symbol::Zero => '0',
            Symbol::One => '1',
            Symbol::Float => 'F',
        }
    }

    /// The four pulses transmitted for this symbol.
    #[must_use]
    pub const fn pulses(self) -> [Pulse; 4] {
        match self {
            Symbol::Zero => [Pulse::high(1), Pulse::low(3), Pulse::high(1), Pulse::low(3)],
            Symbol::One => [Pulse::high(3), Pulse::low(1), Pulse::high(3), Pulse::low(1)],
            Symbol::Float => [Pulse::high(1), Pulse::low(3), Pulse::high(3), Pulse::low(1)],
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// Parse a 12 character trit string such as `"0F0F01100FFF"`.
///
/// Spaces and underscores are ignored so codes can be grouped.
///
/// # Errors
/// Returns `Error::InvalidCommand` on a bad character or wrong length.
pub fn parse_trits(s: &str) -> Result<[Symbol; TRIT_COUNT]> {
    let symbols = s
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .map(Symbol::from_char)
        .collect::<Result<Vec<_>>>()?;

    let len = symbols.len();
    symbols.try_into().map_err(|_| {
        Error::InvalidCommand(format!("Expected {TRIT_COUNT} trits, got {len}"))
    })
}

/// Format symbols as a trit string.
pub fn format_trits(symbols: impl IntoIterator<Item = Symbol>) -> String {
    symbols.into_iter().map(Symbol::to_char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kaku_core::constants::{PERIODS_PER_SYMBOL, TERMINATION_PERIODS};
    use rstest::rstest;

    #[rstest]
    #[case(Symbol::Zero)]
    #[case(Symbol::One)]
    #[case(Symbol::Float)]
    fn test_symbol_shape(#[case] symbol: Symbol) {
        let pulses = symbol.pulses();
        let levels: Vec<Level> = pulses.iter().map(|p| p.level).collect();
        assert_eq!(levels, vec![Level::High, Level::Low, Level::High, Level::Low]);

        let periods: u32 = pulses.iter().map(|p| p.periods).sum();
        assert_eq!(periods, PERIODS_PER_SYMBOL);
    }

    #[test]
    fn test_termination_gap() {
        assert_eq!(TERMINATION[0], Pulse::high(1));
        assert_eq!(TERMINATION[1], Pulse::low(31));
        let total: u32 = TERMINATION.iter().map(|p| p.periods).sum();
        assert_eq!(total, TERMINATION_PERIODS);
    }

    #[test]
    fn test_codes() {
        for symbol in [Symbol::Zero, Symbol::One, Symbol::Float] {
            assert_eq!(Symbol::from_code(symbol.code()), Some(symbol));
        }
        assert_eq!(Symbol::from_code(3), None);
    }

    #[rstest]
    #[case('0', Symbol::Zero)]
    #[case('1', Symbol::One)]
    #[case('F', Symbol::Float)]
    #[case('f', Symbol::Float)]
    #[case('x', Symbol::Float)]
    #[case('2', Symbol::Float)]
    fn test_from_char(#[case] c: char, #[case] expected: Symbol) {
        assert_eq!(Symbol::from_char(c).unwrap(), expected);
    }

    #[rstest]
    #[case('3')]
    #[case('a')]
    #[case(' ')]
    fn test_from_char_invalid(#[case] c: char) {
        assert!(Symbol::from_char(c).is_err());
    }

    #[test]
    fn test_parse_trits() {
        let symbols = parse_trits("0F0F 0110 0FFF").unwrap();
        assert_eq!(format_trits(symbols), "0F0F01100FFF");
        assert_eq!(symbols[1], Symbol::Float);
    }

    #[rstest]
    #[case("")]
    #[case("0F0F")]
    #[case("0F0F01100FFF0")]
    #[case("0F0F01100FF3")]
    fn test_parse_trits_invalid(#[case] input: &str) {
        assert!(matches!(parse_trits(input), Err(Error::InvalidCommand(_))));
    }

    #[test]
    fn test_pulse_duration() {
        let period = Duration::from_micros(350);
        assert_eq!(Pulse::high(3).duration(period), Duration::from_micros(1050));
        assert_eq!(TERMINATION[1].duration(period), Duration::from_micros(10850));
    }
}
