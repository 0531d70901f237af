//! Output line and pulse sink trait definitions.
//!
//! Two capabilities separate the transmitter from the host:
//!
//! - [`OutputLine`] is an exclusively owned digital line that can be driven
//!   high or low and handed back to the host on shutdown.
//! - [`PulseSink`] is what the transmitter actually talks to: it sets a level
//!   and holds it for a duration. The production sink drives an
//!   [`OutputLine`] with real delays; the recording sink in
//!   [`mock`](crate::mock) captures the sequence without waiting, so the
//!   symbol and transition sequence can be tested deterministically.
//!
//! Both traits are synchronous. A hold genuinely blocks the calling thread;
//! async callers move the whole transmission onto a blocking thread instead.

use std::time::Duration;

use kaku_core::Level;

use crate::error::Result;

/// Exclusively owned digital output line.
///
/// Implementations are expected to be acquired and configured as outputs
/// before they are handed to the device; the device itself never performs
/// acquisition policy. It only drives levels and, on shutdown, releases the
/// line as its last action.
///
/// # Examples
///
/// ```
/// use kaku_core::Level;
/// use kaku_hardware::mock::MockLine;
/// use kaku_hardware::traits::OutputLine;
///
/// let (mut line, handle) = MockLine::new(134);
/// line.set_level(Level::High).unwrap();
/// assert_eq!(line.level(), Level::High);
/// assert_eq!(handle.history(), vec![Level::Low, Level::High]);
/// ```
pub trait OutputLine: Send {
    /// Line number this handle drives.
    fn line(&self) -> u32;

    /// Drive the line to `level`.
    ///
    /// # Errors
    ///
    /// Returns an error if the level could not be written.
    fn set_level(&mut self, level: Level) -> Result<()>;

    /// Last level written to the line.
    fn level(&self) -> Level;

    /// Hand the line back to the host.
    ///
    /// After a successful release the line must not be driven again.
    ///
    /// # Errors
    ///
    /// Returns an error if the host refused to take the line back.
    fn release(&mut self) -> Result<()>;
}

/// Timed level sink driven by the transmitter.
///
/// `wait` holds the current level for `duration`. An implementation may
/// return up to `tolerance` early to absorb host scheduling slack, but
/// should not return later than it has to.
pub trait PulseSink {
    /// Set the line level.
    fn set(&mut self, level: Level);

    /// Hold the current level for `duration`, within `tolerance`.
    fn wait(&mut self, duration: Duration, tolerance: Duration);

    /// Release whatever line backs this sink.
    ///
    /// Called once, as the last action of a device shutdown. Sinks without
    /// a line keep the default no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the line could not be handed back.
    fn release(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<S: PulseSink + ?Sized> PulseSink for &mut S {
    fn set(&mut self, level: Level) {
        (**self).set(level);
    }

    fn wait(&mut self, duration: Duration, tolerance: Duration) {
        (**self).wait(duration, tolerance);
    }

    fn release(&mut self) -> Result<()> {
        (**self).release()
    }
}

impl<S: PulseSink + ?Sized> PulseSink for Box<S> {
    fn set(&mut self, level: Level) {
        (**self).set(level);
    }

    fn wait(&mut self, duration: Duration, tolerance: Duration) {
        (**self).wait(duration, tolerance);
    }

    fn release(&mut self) -> Result<()> {
        (**self).release()
    }
}
