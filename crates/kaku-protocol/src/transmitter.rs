//! Telegram transmitter.
//!
//! Drives a [`PulseSink`] through the pulse train of a command word. All
//! arithmetic that depends on the payload happens before the first pulse:
//! the payload is packed once and the three hold durations are computed
//! once. The per-symbol loop only masks, shifts and picks one of three
//! precomputed hold pairs, so every symbol costs the same.
//!
//! The tolerance passed with each hold is capped at half a period, so a
//! loose tolerance can never collapse a short pulse to zero.
//!
//! Transmission is synchronous and has no error path. It returns once the
//! last frame's termination gap has been held.

use std::time::Duration;

use kaku_core::constants::{
    DEFAULT_TOLERANCE_US, SYMBOL_BITS, SYMBOL_MASK, TERMINATION_LOW_PERIODS, TRIT_COUNT,
};
use kaku_core::{CommandWord, Level};
use kaku_hardware::PulseSink;
use tracing::{debug, trace};

use crate::telegram::Telegram;

/// High/low hold pair making up half a symbol.
type HalfSymbol = (Duration, Duration);

/// Telegram transmitter with a fixed timing tolerance.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use kaku_core::CommandWord;
/// use kaku_hardware::mock::RecordingSink;
/// use kaku_protocol::Transmitter;
///
/// let transmitter = Transmitter::new(Duration::from_micros(50));
/// let mut sink = RecordingSink::new();
///
/// transmitter.transmit(CommandWord::new(0), &mut sink);
/// assert_eq!(sink.transition_count(), 50);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transmitter {
    tolerance: Duration,
}

impl Transmitter {
    /// Create a transmitter accepting `tolerance` around every hold.
    #[must_use]
    pub const fn new(tolerance: Duration) -> Self {
        Self { tolerance }
    }

    /// Timing tolerance passed with every hold.
    #[must_use]
    pub const fn tolerance(&self) -> Duration {
        self.tolerance
    }

    /// Tolerance actually used for a telegram with the given period unit.
    ///
    /// At most half a period: a short (1T) hold always lasts at least T/2
    /// and stays distinguishable from a long (3T) one.
    #[must_use]
    pub fn tolerance_for(&self, period: Duration) -> Duration {
        self.tolerance.min(period / 2)
    }

    /// Transmit a command word, blocking until the whole train is sent.
    pub fn transmit<S: PulseSink + ?Sized>(&self, command: CommandWord, sink: &mut S) {
        self.send(&Telegram::new(command), sink);
    }

    /// Transmit an already decoded telegram.
    pub fn send<S: PulseSink + ?Sized>(&self, telegram: &Telegram, sink: &mut S) {
        let period = telegram.period();
        let short = period;
        let long = period * 3;
        let gap = period * TERMINATION_LOW_PERIODS;

        let zero: HalfSymbol = (short, long);
        let one: HalfSymbol = (long, short);
        let packed = telegram.symbols().raw();
        let tolerance = self.tolerance_for(period);

        debug!(
            command = %telegram.command(),
            period_us = telegram.command().period_us(),
            repeats = telegram.repeats(),
            "Transmitting telegram"
        );

        for frame in 0..telegram.repeats() {
            trace!(frame, "Frame");
            let mut data = packed;

            for _ in 0..TRIT_COUNT {
                let (first, second) = match data & SYMBOL_MASK {
                    0 => (zero, zero),
                    1 => (one, one),
                    _ => (zero, one),
                };
                half_symbol(sink, first, tolerance);
                half_symbol(sink, second, tolerance);

                data >>= SYMBOL_BITS;
            }

            sink.set(Level::High);
            sink.wait(short, tolerance);
            sink.set(Level::Low);
            sink.wait(gap, tolerance);
        }
    }
}

impl Default for Transmitter {
    fn default() -> Self {
        Self::new(Duration::from_micros(DEFAULT_TOLERANCE_US))
    }
}

#[inline(always)]
fn half_symbol<S: PulseSink + ?Sized>(sink: &mut S, (high, low): HalfSymbol, tolerance: Duration) {
    sink.set(Level::High);
    sink.wait(high, tolerance);
    sink.set(Level::Low);
    sink.wait(low, tolerance);
}

/// Transmit a command word with the default tolerance.
pub fn transmit<S: PulseSink + ?Sized>(command: CommandWord, sink: &mut S) {
    Transmitter::default().transmit(command, sink);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::{Pulse, Symbol};
    use kaku_hardware::mock::{RecordingSink, SinkEvent};
    use rstest::rstest;

    fn expected(telegram: &Telegram) -> Vec<(Level, Duration)> {
        let period = telegram.period();
        telegram
            .pulses()
            .map(|p: Pulse| (p.level, p.duration(period)))
            .collect()
    }

    #[test]
    fn test_zero_vector() {
        let mut sink = RecordingSink::new();
        transmit(CommandWord::new(0x0000_0000), &mut sink);

        assert_eq!(sink.transition_count(), 50);
        assert!(sink.transitions().iter().all(|(_, d)| d.is_zero()));

        let levels: Vec<Level> = sink.transitions().iter().map(|(l, _)| *l).collect();
        let expected_levels: Vec<Level> = Symbol::Zero
            .pulses()
            .iter()
            .cycle()
            .take(48)
            .map(|p| p.level)
            .chain([Level::High, Level::Low])
            .collect();
        assert_eq!(levels, expected_levels);
    }

    #[test]
    fn test_matches_pulse_table() {
        for raw in [
            (350 << 23) | 0x12345,
            (300 << 23) | (1 << 20) | 531_440,
            (1 << 23) | 177_147,
            0xFFFF_FFFF,
        ] {
            let command = CommandWord::new(raw);
            let mut sink = RecordingSink::new();
            transmit(command, &mut sink);

            assert_eq!(sink.transitions(), expected(&Telegram::new(command)), "{command}");
        }
    }

    #[test]
    fn test_float_symbol_shape() {
        // Payload 2 puts a float in the last slot.
        let command = CommandWord::new((10 << 23) | 2);
        let mut sink = RecordingSink::new();
        transmit(command, &mut sink);

        let transitions = sink.transitions();
        let last_symbol = &transitions[44..48];
        let us = Duration::from_micros;
        assert_eq!(
            last_symbol,
            [
                (Level::High, us(10)),
                (Level::Low, us(30)),
                (Level::High, us(30)),
                (Level::Low, us(10)),
            ]
        );
        assert_eq!(
            &transitions[48..],
            [(Level::High, us(10)), (Level::Low, us(310))]
        );
    }

    #[test]
    fn test_tolerance_passed_with_every_hold() {
        let transmitter = Transmitter::new(Duration::from_micros(20));
        let mut sink = RecordingSink::new();
        transmitter.transmit(CommandWord::new((350 << 23) | 0x0010_0000), &mut sink);

        assert_eq!(sink.tolerances(), vec![Duration::from_micros(20)]);
        assert_eq!(sink.transition_count(), 100);
    }

    #[rstest]
    #[case(350, 50, 50)]
    #[case(100, 50, 50)]
    #[case(60, 50, 30)]
    #[case(2, 1000, 1)]
    #[case(0, 50, 0)]
    fn test_tolerance_capped_at_half_period(
        #[case] period_us: u32,
        #[case] tolerance_us: u64,
        #[case] expected_us: u64,
    ) {
        let transmitter = Transmitter::new(Duration::from_micros(tolerance_us));
        let mut sink = RecordingSink::new();
        transmitter.transmit(CommandWord::new(period_us << 23), &mut sink);

        let expected = Duration::from_micros(expected_us);
        assert_eq!(
            transmitter.tolerance_for(Duration::from_micros(u64::from(period_us))),
            expected
        );
        assert_eq!(sink.tolerances(), vec![expected]);
    }

    #[test]
    fn test_loose_tolerance_keeps_short_pulses() {
        // 1000us of slack against a 100us period: every hold still has to
        // last at least half of its nominal length.
        let transmitter = Transmitter::new(Duration::from_micros(1000));
        let mut sink = RecordingSink::new();
        transmitter.transmit(CommandWord::new((100 << 23) | 4242), &mut sink);

        for event in sink.events() {
            if let SinkEvent::Wait { duration, tolerance } = *event {
                assert!(duration.saturating_sub(tolerance) >= duration / 2);
            }
        }
    }

    #[test]
    fn test_default_tolerance() {
        assert_eq!(
            Transmitter::default().tolerance(),
            Duration::from_micros(DEFAULT_TOLERANCE_US)
        );
    }

    #[test]
    fn test_total_time_on_air() {
        let command = CommandWord::new((350 << 23) | (3 << 20) | 4242);
        let mut sink = RecordingSink::new();
        transmit(command, &mut sink);

        assert_eq!(
            sink.total_duration(),
            Telegram::new(command).nominal_duration()
        );
    }
}
