//! Decoded telegram and its pulse schedule.
//!
//! A [`Telegram`] is a command word together with its packed symbols. It
//! describes, without any timing side effects, exactly what the transmitter
//! will put on the line: one frame of twelve symbols plus the termination
//! gap, repeated `2^r` times.

use std::time::Duration;

use kaku_core::CommandWord;
use kaku_core::constants::{PERIODS_PER_FRAME, TRANSITIONS_PER_FRAME};
use serde::Serialize;

use crate::packing::PackedSymbols;
use crate::symbol::{Pulse, TERMINATION, format_trits};

/// A command word decoded for transmission.
///
/// # Examples
///
/// ```
/// use kaku_core::CommandWord;
/// use kaku_protocol::Telegram;
///
/// let telegram = Telegram::new(CommandWord::new(0x0070_0000));
/// assert_eq!(telegram.repeats(), 128);
/// assert_eq!(telegram.transition_count(), 6400);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Telegram {
    command: CommandWord,
    symbols: PackedSymbols,
}

impl Telegram {
    /// Decode a command word and pack its payload.
    #[must_use]
    pub fn new(command: CommandWord) -> Self {
        Self {
            command,
            symbols: PackedSymbols::pack(command.payload()),
        }
    }

    /// Command word this telegram was decoded from.
    #[must_use]
    pub fn command(&self) -> CommandWord {
        self.command
    }

    /// Packed symbols of one frame.
    #[must_use]
    pub fn symbols(&self) -> PackedSymbols {
        self.symbols
    }

    /// Period unit `T`.
    #[must_use]
    pub fn period(&self) -> Duration {
        self.command.period()
    }

    /// Number of frames sent.
    #[must_use]
    pub fn repeats(&self) -> usize {
        self.command.repeats()
    }

    /// Pulses of a single frame (50 pulses).
    pub fn frame_pulses(&self) -> impl Iterator<Item = Pulse> + '_ {
        self.symbols
            .symbols()
            .flat_map(|symbol| symbol.pulses())
            .chain(TERMINATION)
    }

    /// Pulses of the whole telegram, all repeats included.
    pub fn pulses(&self) -> impl Iterator<Item = Pulse> + '_ {
        (0..self.repeats()).flat_map(move |_| self.frame_pulses())
    }

    /// Number of line transitions of the whole telegram.
    #[must_use]
    pub fn transition_count(&self) -> usize {
        self.repeats() * TRANSITIONS_PER_FRAME
    }

    /// Nominal time on air, ignoring timing tolerance.
    #[must_use]
    pub fn nominal_duration(&self) -> Duration {
        self.period() * PERIODS_PER_FRAME * self.repeats() as u32
    }

    /// Serializable description of the telegram.
    #[must_use]
    pub fn schedule(&self) -> TelegramSchedule {
        let period = self.period();

        TelegramSchedule {
            command: self.command.to_string(),
            period_us: self.command.period_us(),
            repeat_exponent: self.command.repeat_exponent(),
            repeats: self.repeats(),
            payload: self.command.payload(),
            effective_payload: self.symbols.payload(),
            trits: format_trits(self.symbols.symbols()),
            frame: self
                .frame_pulses()
                .map(|pulse| TimedPulse {
                    pulse,
                    duration_us: pulse.duration(period).as_micros() as u64,
                })
                .collect(),
            transitions: self.transition_count(),
            duration_us: self.nominal_duration().as_micros() as u64,
        }
    }
}

impl From<CommandWord> for Telegram {
    fn from(command: CommandWord) -> Self {
        Self::new(command)
    }
}

/// A pulse with its nominal duration resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimedPulse {
    /// Level and period units.
    #[serde(flatten)]
    pub pulse: Pulse,

    /// Nominal hold in microseconds.
    pub duration_us: u64,
}

/// Serializable description of a telegram, used by tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TelegramSchedule {
    /// Command word in hexadecimal.
    pub command: String,

    /// Period unit in microseconds.
    pub period_us: u32,

    /// Repeat exponent `r`.
    pub repeat_exponent: u8,

    /// Number of frames (`2^r`).
    pub repeats: usize,

    /// Raw 20-bit payload.
    pub payload: u32,

    /// Payload actually carried by the twelve trits.
    pub effective_payload: u32,

    /// Trits in transmit order.
    pub trits: String,

    /// Pulses of one frame.
    pub frame: Vec<TimedPulse>,

    /// Line transitions of the whole telegram.
    pub transitions: usize,

    /// Nominal time on air in microseconds.
    pub duration_us: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::Symbol;
    use kaku_core::Level;

    #[test]
    fn test_zero_command_frame() {
        let telegram = Telegram::new(CommandWord::new(0));
        let pulses: Vec<Pulse> = telegram.frame_pulses().collect();

        assert_eq!(pulses.len(), 50);
        for chunk in pulses[..48].chunks(4) {
            assert_eq!(chunk, Symbol::Zero.pulses());
        }
        assert_eq!(&pulses[48..], TERMINATION);
        assert_eq!(telegram.nominal_duration(), Duration::ZERO);
    }

    #[test]
    fn test_pulses_repeat_frame() {
        let telegram = Telegram::new(CommandWord::new(0x0020_0001));
        assert_eq!(telegram.repeats(), 4);

        let all: Vec<Pulse> = telegram.pulses().collect();
        let frame: Vec<Pulse> = telegram.frame_pulses().collect();
        assert_eq!(all.len(), telegram.transition_count());
        for repeat in all.chunks(frame.len()) {
            assert_eq!(repeat, frame.as_slice());
        }
    }

    #[test]
    fn test_frame_levels_alternate() {
        let telegram = Telegram::new(CommandWord::new(0x000A_BCDE));
        let levels: Vec<Level> = telegram.frame_pulses().map(|p| p.level).collect();
        for pair in levels.chunks(2) {
            assert_eq!(pair, [Level::High, Level::Low]);
        }
    }

    #[test]
    fn test_nominal_duration() {
        // T = 350us, r = 2: 4 frames of 128 units.
        let telegram = Telegram::new(CommandWord::new((350 << 23) | (2 << 20)));
        assert_eq!(
            telegram.nominal_duration(),
            Duration::from_micros(350 * 128 * 4)
        );
    }

    #[test]
    fn test_schedule_serializes() {
        let telegram = Telegram::new(CommandWord::new((100 << 23) | 1));
        let schedule = telegram.schedule();

        assert_eq!(schedule.command, "0x32000001");
        assert_eq!(schedule.period_us, 100);
        assert_eq!(schedule.trits, "000000000001");
        assert_eq!(schedule.frame.len(), 50);
        assert_eq!(schedule.frame[49].duration_us, 3100);

        let json = serde_json::to_value(&schedule).unwrap();
        assert_eq!(json["frame"][0]["level"], "high");
        assert_eq!(json["frame"][0]["periods"], 1);
        assert_eq!(json["frame"][0]["duration_us"], 100);
        assert_eq!(json["transitions"], 50);
    }
}
