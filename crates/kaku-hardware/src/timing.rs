//! Real-time pulse sink.
//!
//! [`TimedSink`] drives an [`OutputLine`] and holds each level with a hybrid
//! wait: the bulk of a long hold is slept, the remainder is spun on a
//! monotonic clock. A hold completes as soon as `duration - tolerance` has
//! elapsed.

use std::time::{Duration, Instant};

use kaku_core::Level;
use tracing::warn;

use crate::Result;
use crate::traits::{OutputLine, PulseSink};

/// Holds shorter than this are spun entirely.
///
/// `thread::sleep` on a typical Linux host overshoots by tens of
/// microseconds, which is of the same order as a short pulse.
pub const DEFAULT_SPIN_THRESHOLD: Duration = Duration::from_micros(200);

/// Pulse sink that drives a real output line with real delays.
///
/// Line write failures are logged and otherwise ignored: once a line is
/// configured it is assumed to be settable, and a transmission has no
/// recovery path.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use kaku_core::Level;
/// use kaku_hardware::mock::MockLine;
/// use kaku_hardware::timing::TimedSink;
/// use kaku_hardware::traits::PulseSink;
///
/// let (line, handle) = MockLine::new(134);
/// let mut sink = TimedSink::new(line);
///
/// sink.set(Level::High);
/// sink.wait(Duration::from_micros(100), Duration::from_micros(50));
/// sink.set(Level::Low);
///
/// assert_eq!(handle.level(), Level::Low);
/// ```
#[derive(Debug)]
pub struct TimedSink<L> {
    line: L,
    spin_threshold: Duration,
    write_failures: u64,
}

impl<L: OutputLine> TimedSink<L> {
    /// Wrap a configured output line.
    pub fn new(line: L) -> Self {
        Self::with_spin_threshold(line, DEFAULT_SPIN_THRESHOLD)
    }

    /// Wrap a line with a custom sleep/spin threshold.
    pub fn with_spin_threshold(line: L, spin_threshold: Duration) -> Self {
        Self {
            line,
            spin_threshold,
            write_failures: 0,
        }
    }

    /// Borrow the underlying line.
    pub fn line(&self) -> &L {
        &self.line
    }

    /// Mutably borrow the underlying line.
    pub fn line_mut(&mut self) -> &mut L {
        &mut self.line
    }

    /// Number of line writes that failed since creation.
    pub fn write_failures(&self) -> u64 {
        self.write_failures
    }

    /// Unwrap the sink, returning the line.
    pub fn into_inner(self) -> L {
        self.line
    }
}

impl<L: OutputLine> PulseSink for TimedSink<L> {
    fn set(&mut self, level: Level) {
        if let Err(e) = self.line.set_level(level) {
            self.write_failures += 1;
            warn!(line = self.line.line(), %level, "Ignoring line write failure: {}", e);
        }
    }

    fn wait(&mut self, duration: Duration, tolerance: Duration) {
        hold(Instant::now(), duration, tolerance, self.spin_threshold);
    }

    fn release(&mut self) -> Result<()> {
        self.line.release()
    }
}

/// Block until at least `duration - tolerance` has elapsed since `start`.
///
/// Sleeps for the part of `duration` above `spin_threshold`, then spins.
pub fn hold(start: Instant, duration: Duration, tolerance: Duration, spin_threshold: Duration) {
    let earliest = duration.saturating_sub(tolerance);
    if earliest.is_zero() {
        return;
    }

    if duration > spin_threshold {
        std::thread::sleep(duration - spin_threshold);
    }

    while start.elapsed() < earliest {
        std::hint::spin_loop();
    }
}
