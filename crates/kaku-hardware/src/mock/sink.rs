//! Recording pulse sink.
//!
//! [`RecordingSink`] captures every `set` and `wait` call without any delay,
//! which makes the transmitter's output a plain list that tests can compare
//! against expected pulse tables.

use std::time::Duration;

use kaku_core::Level;

use crate::{HardwareError, Result, traits::PulseSink};

/// One call made on a [`RecordingSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkEvent {
    /// Level change.
    Set(Level),

    /// Timed hold.
    Wait {
        /// Nominal hold duration.
        duration: Duration,

        /// Accepted deviation.
        tolerance: Duration,
    },
}

/// Pulse sink that records calls instead of timing them.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use kaku_core::Level;
/// use kaku_hardware::mock::RecordingSink;
/// use kaku_hardware::traits::PulseSink;
///
/// let mut sink = RecordingSink::new();
/// sink.set(Level::High);
/// sink.wait(Duration::from_micros(350), Duration::from_micros(50));
///
/// assert_eq!(sink.transitions(), vec![(Level::High, Duration::from_micros(350))]);
/// assert_eq!(sink.transition_count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Vec<SinkEvent>,
    released: bool,
}

impl RecordingSink {
    /// Create an empty recording sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every recorded call, in order.
    pub fn events(&self) -> &[SinkEvent] {
        &self.events
    }

    /// Level/hold pairs: each level change together with the time it was
    /// held. A level change with no following hold is paired with zero.
    pub fn transitions(&self) -> Vec<(Level, Duration)> {
        let mut transitions: Vec<(Level, Duration)> = Vec::new();

        for event in &self.events {
            match *event {
                SinkEvent::Set(level) => transitions.push((level, Duration::ZERO)),
                SinkEvent::Wait { duration, .. } => {
                    if let Some(last) = transitions.last_mut() {
                        last.1 += duration;
                    }
                }
            }
        }

        transitions
    }

    /// Number of level changes.
    pub fn transition_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, SinkEvent::Set(_)))
            .count()
    }

    /// Sum of all nominal holds.
    pub fn total_duration(&self) -> Duration {
        self.events
            .iter()
            .map(|e| match e {
                SinkEvent::Wait { duration, .. } => *duration,
                SinkEvent::Set(_) => Duration::ZERO,
            })
            .sum()
    }

    /// Tolerances passed with the holds, deduplicated in order of first use.
    pub fn tolerances(&self) -> Vec<Duration> {
        let mut seen = Vec::new();
        for event in &self.events {
            if let SinkEvent::Wait { tolerance, .. } = event
                && !seen.contains(tolerance)
            {
                seen.push(*tolerance);
            }
        }
        seen
    }

    /// Drop all recorded calls.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Check whether [`PulseSink::release`] has been called.
    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl PulseSink for RecordingSink {
    fn set(&mut self, level: Level) {
        self.events.push(SinkEvent::Set(level));
    }

    fn wait(&mut self, duration: Duration, tolerance: Duration) {
        self.events.push(SinkEvent::Wait {
            duration,
            tolerance,
        });
    }

    fn release(&mut self) -> Result<()> {
        if self.released {
            return Err(HardwareError::Released { line: 0 });
        }
        self.released = true;
        Ok(())
    }
}
