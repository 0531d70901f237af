//! Output line abstraction for the KaKu telegram transmitter.
//!
//! This crate provides the hardware seam between the telegram encoder and
//! the physical transmitter pin:
//!
//! - [`OutputLine`]: an exclusively owned digital line (sysfs GPIO or mock).
//! - [`PulseSink`]: the set-level / hold-for-duration capability the
//!   transmitter drives.
//! - [`TimedSink`]: a [`PulseSink`] that drives an [`OutputLine`] with real,
//!   tolerance-aware delays.
//! - [`RecordingSink`](mock::RecordingSink): a [`PulseSink`] that records the
//!   pulse sequence without waiting, for deterministic tests.
//!
//! ```
//! use std::time::Duration;
//! use kaku_core::Level;
//! use kaku_hardware::mock::RecordingSink;
//! use kaku_hardware::PulseSink;
//!
//! let mut sink = RecordingSink::new();
//! sink.set(Level::High);
//! sink.wait(Duration::from_micros(350), Duration::from_micros(50));
//! assert_eq!(sink.transition_count(), 1);
//! ```
//!
//! # Error Handling
//!
//! Acquisition and configuration failures are reported as
//! [`HardwareError`] and are fatal at start-up. Writes during a transmission
//! are not surfaced; see [`TimedSink`].

pub mod devices;
pub mod error;
pub mod mock;
#[cfg(feature = "hardware-sysfs")]
pub mod sysfs;
pub mod timing;
pub mod traits;

// Re-export commonly used types for convenience
pub use devices::AnyOutputLine;
pub use error::{HardwareError, Result};
#[cfg(feature = "hardware-sysfs")]
pub use sysfs::SysfsLine;
pub use timing::TimedSink;
pub use traits::{OutputLine, PulseSink};
