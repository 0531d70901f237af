//! Single-open transmitter device.
//!
//! A [`KakuDevice`] owns the pulse sink and hands it out to at most one
//! [`SessionHandle`] at a time. The sink physically moves into the session
//! on open and back into the device on close, so a session cannot exist
//! without exclusive access to the line.
//!
//! # Lifecycle
//!
//! ```text
//!            open()                 close() / drop
//!   Idle ──────────────► Open ──────────────────────► Idle
//!    │                    │
//!    │ shutdown()         │ open()    -> Busy
//!    ▼                    │ shutdown() -> Busy
//!  Closed ◄───────────────┘ (never while open)
//! ```
//!
//! # Examples
//!
//! ```
//! use kaku_device::{DeviceConfig, KakuDevice};
//! use kaku_hardware::mock::RecordingSink;
//!
//! let device = KakuDevice::start(DeviceConfig::default(), RecordingSink::new()).unwrap();
//!
//! let mut session = device.open().unwrap();
//! assert!(device.open().is_err());
//!
//! session.write(&0u32.to_le_bytes()).unwrap();
//! session.close();
//!
//! let sink = device.shutdown().unwrap();
//! // start, one telegram, shutdown
//! assert_eq!(sink.transition_count(), 1 + 50 + 1);
//! assert!(sink.is_released());
//! ```

use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use kaku_core::constants::DEVICE_NAME;
use kaku_core::{CommandWord, Error, Level, Result};
use kaku_hardware::{AnyOutputLine, PulseSink, TimedSink};
use kaku_protocol::Transmitter;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::DeviceConfig;

/// Production sink: a sysfs or mock line driven with real delays.
pub type LineSink = TimedSink<AnyOutputLine>;

/// Where the sink currently lives.
#[derive(Debug)]
enum Slot<S> {
    /// Parked in the device, no session open.
    Idle(S),

    /// Moved into the open session.
    Open,

    /// Released on shutdown.
    Closed,
}

/// Observable device state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceState {
    /// Ready to be opened.
    Idle,

    /// A session is open.
    Open,

    /// Shut down; the line has been released.
    Closed,
}

/// Counters kept over the lifetime of a device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeviceStats {
    /// Sessions successfully opened.
    pub sessions_opened: u64,

    /// Open attempts rejected because a session was already open.
    pub busy_rejections: u64,

    /// Command words transmitted.
    pub telegrams_sent: u64,

    /// Writes rejected for having the wrong length.
    pub invalid_writes: u64,
}

#[derive(Debug, Default)]
struct Counters {
    sessions_opened: AtomicU64,
    busy_rejections: AtomicU64,
    telegrams_sent: AtomicU64,
    invalid_writes: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> DeviceStats {
        DeviceStats {
            sessions_opened: self.sessions_opened.load(Ordering::Relaxed),
            busy_rejections: self.busy_rejections.load(Ordering::Relaxed),
            telegrams_sent: self.telegrams_sent.load(Ordering::Relaxed),
            invalid_writes: self.invalid_writes.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug)]
struct Shared<S> {
    slot: Mutex<Slot<S>>,
    transmitter: Transmitter,
    config: DeviceConfig,
    counters: Counters,
}

impl<S> Shared<S> {
    fn slot(&self) -> MutexGuard<'_, Slot<S>> {
        // A panic while holding the lock cannot leave the slot half-updated.
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// KaKu transmitter device with single-open semantics.
///
/// Cloning a device yields another handle to the same device; exclusivity
/// holds across all clones and threads.
#[derive(Debug)]
pub struct KakuDevice<S> {
    shared: Arc<Shared<S>>,
}

impl<S> Clone for KakuDevice<S> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl KakuDevice<LineSink> {
    /// Claim the configured sysfs line and start the device on it.
    ///
    /// # Errors
    /// Returns `Error::Config` for an invalid configuration and
    /// `Error::Hardware` if the line cannot be claimed or configured as an
    /// output. Nothing is registered in that case.
    pub fn from_config(config: DeviceConfig) -> Result<Self> {
        config.validate()?;
        let line = kaku_hardware::SysfsLine::acquire(config.line, &config.gpio_root)?;
        Self::start(config, TimedSink::new(AnyOutputLine::from(line)))
    }
}

impl<S: PulseSink + Send> KakuDevice<S> {
    /// Start the device on an already acquired sink.
    ///
    /// Drives the line low and makes the device available for one session.
    ///
    /// # Errors
    /// Returns `Error::Config` if the configuration is invalid.
    pub fn start(config: DeviceConfig, mut sink: S) -> Result<Self> {
        config.validate()?;
        sink.set(Level::Low);

        info!(
            device = DEVICE_NAME,
            line = config.line,
            tolerance_us = config.tolerance_us,
            "KaKu transmitter ready"
        );

        Ok(Self {
            shared: Arc::new(Shared {
                slot: Mutex::new(Slot::Idle(sink)),
                transmitter: Transmitter::new(config.tolerance()),
                config,
                counters: Counters::default(),
            }),
        })
    }

    /// Open the device.
    ///
    /// # Errors
    /// Returns `Error::Busy` if a session is already open and
    /// `Error::ShutDown` after [`shutdown`](Self::shutdown).
    pub fn open(&self) -> Result<SessionHandle<S>> {
        let mut slot = self.shared.slot();
        match std::mem::replace(&mut *slot, Slot::Open) {
            Slot::Idle(sink) => {
                drop(slot);
                let id = self
                    .shared
                    .counters
                    .sessions_opened
                    .fetch_add(1, Ordering::Relaxed)
                    + 1;
                debug!(session = id, "Session opened");
                Ok(SessionHandle {
                    shared: Arc::clone(&self.shared),
                    sink: Some(sink),
                    id,
                })
            }
            Slot::Open => {
                drop(slot);
                self.shared
                    .counters
                    .busy_rejections
                    .fetch_add(1, Ordering::Relaxed);
                debug!("Open rejected: device busy");
                Err(Error::Busy)
            }
            Slot::Closed => {
                *slot = Slot::Closed;
                Err(Error::ShutDown)
            }
        }
    }

    /// Shut the device down and release the line.
    ///
    /// The line is driven low and released as the last action; the released
    /// sink is handed back to the caller.
    ///
    /// # Errors
    /// Returns `Error::Busy` while a session is open, `Error::ShutDown` if
    /// the device was already shut down and `Error::Hardware` if the line
    /// could not be released.
    pub fn shutdown(&self) -> Result<S> {
        let mut slot = self.shared.slot();
        match std::mem::replace(&mut *slot, Slot::Closed) {
            Slot::Idle(mut sink) => {
                drop(slot);
                sink.set(Level::Low);
                sink.release().inspect_err(|e| {
                    warn!(line = self.shared.config.line, "Line release failed: {}", e);
                })?;
                info!(
                    device = DEVICE_NAME,
                    line = self.shared.config.line,
                    "KaKu transmitter shut down"
                );
                Ok(sink)
            }
            Slot::Open => {
                *slot = Slot::Open;
                Err(Error::Busy)
            }
            Slot::Closed => Err(Error::ShutDown),
        }
    }
}

impl<S> KakuDevice<S> {
    /// Current state.
    pub fn state(&self) -> DeviceState {
        match *self.shared.slot() {
            Slot::Idle(_) => DeviceState::Idle,
            Slot::Open => DeviceState::Open,
            Slot::Closed => DeviceState::Closed,
        }
    }

    /// Check whether a session is currently open.
    pub fn is_open(&self) -> bool {
        self.state() == DeviceState::Open
    }

    /// Start-up configuration.
    pub fn config(&self) -> &DeviceConfig {
        &self.shared.config
    }

    /// Counter snapshot.
    pub fn stats(&self) -> DeviceStats {
        self.shared.counters.snapshot()
    }
}

/// Open session on a [`KakuDevice`].
///
/// Holds the sink exclusively. Closing or dropping the handle returns it to
/// the device.
#[derive(Debug)]
pub struct SessionHandle<S> {
    shared: Arc<Shared<S>>,
    sink: Option<S>,
    id: u64,
}

impl<S: PulseSink> SessionHandle<S> {
    /// Transmit one command word.
    ///
    /// `bytes` must be exactly four bytes, read as a little-endian `u32`.
    /// Blocks until the whole telegram is on air and returns the number of
    /// bytes consumed.
    ///
    /// # Errors
    /// Returns `Error::InvalidLength` for any other length. Nothing is
    /// transmitted in that case.
    pub fn write(&mut self, bytes: &[u8]) -> Result<usize> {
        self.write_command(bytes)
    }

    /// Read from the device. There is nothing to read; always returns 0.
    pub fn read(&mut self, _buf: &mut [u8]) -> usize {
        0
    }

    fn write_command(&mut self, bytes: &[u8]) -> Result<usize> {
        let command = CommandWord::from_bytes(bytes).inspect_err(|_| {
            self.shared
                .counters
                .invalid_writes
                .fetch_add(1, Ordering::Relaxed);
            debug!(session = self.id, len = bytes.len(), "Rejected write");
        })?;
        let sink = self.sink.as_mut().ok_or(Error::SessionClosed)?;

        self.shared.transmitter.transmit(command, sink);
        self.shared
            .counters
            .telegrams_sent
            .fetch_add(1, Ordering::Relaxed);

        Ok(bytes.len())
    }
}

impl<S> SessionHandle<S> {
    /// Session number, counting from 1 over the device lifetime.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The sink held by this session.
    pub fn sink(&self) -> Option<&S> {
        self.sink.as_ref()
    }

    /// Close the session, making the device available again.
    pub fn close(self) {}
}

impl<S> Drop for SessionHandle<S> {
    fn drop(&mut self) {
        if let Some(sink) = self.sink.take() {
            *self.shared.slot() = Slot::Idle(sink);
            debug!(session = self.id, "Session closed");
        }
    }
}

impl<S: PulseSink> io::Write for SessionHandle<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_command(buf).map_err(|e| match e {
            Error::InvalidLength { .. } => io::Error::new(io::ErrorKind::InvalidInput, e),
            other => io::Error::other(other),
        })
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<S> io::Read for SessionHandle<S> {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kaku_hardware::mock::{MockLine, RecordingSink};
    use std::io::{Read, Write};

    fn device() -> KakuDevice<RecordingSink> {
        KakuDevice::start(DeviceConfig::default(), RecordingSink::new()).unwrap()
    }

    #[test]
    fn test_start_drives_line_low() {
        let device = device();
        assert_eq!(device.state(), DeviceState::Idle);

        let sink = device.shutdown().unwrap();
        assert_eq!(sink.transitions()[0], (Level::Low, std::time::Duration::ZERO));
    }

    #[test]
    fn test_start_rejects_invalid_config() {
        let config = DeviceConfig {
            tolerance_us: 10_000,
            ..DeviceConfig::default()
        };
        let result = KakuDevice::start(config, RecordingSink::new());
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_second_open_is_busy() {
        let device = device();
        let session = device.open().unwrap();

        assert!(device.is_open());
        assert!(matches!(device.open(), Err(Error::Busy)));
        assert_eq!(device.stats().busy_rejections, 1);

        drop(session);
        assert_eq!(device.state(), DeviceState::Idle);
    }

    #[test]
    fn test_session_ids_increase() {
        let device = device();
        let first = device.open().unwrap().id();
        let second = device.open().unwrap().id();
        assert_eq!((first, second), (1, 2));
    }

    #[test]
    fn test_write_consumes_four_bytes() {
        let device = device();
        let mut session = device.open().unwrap();

        let written = session.write(&0x0010_0000u32.to_le_bytes()).unwrap();
        assert_eq!(written, 4);
        assert_eq!(session.sink().unwrap().transition_count(), 1 + 100);
        assert_eq!(device.stats().telegrams_sent, 1);
    }

    #[test]
    fn test_read_returns_nothing() {
        let device = device();
        let mut session = device.open().unwrap();
        let mut buf = [0xAA; 8];

        assert_eq!(session.read(&mut buf), 0);
        assert_eq!(Read::read(&mut session, &mut buf).unwrap(), 0);
        assert_eq!(buf, [0xAA; 8]);
    }

    #[test]
    fn test_io_write_maps_invalid_length() {
        let device = device();
        let mut session = device.open().unwrap();

        let err = Write::write(&mut session, &[1, 2, 3]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert_eq!(Write::write(&mut session, &[0; 4]).unwrap(), 4);
        session.flush().unwrap();
        assert_eq!(device.stats().invalid_writes, 1);
    }

    #[test]
    fn test_shutdown_while_open_is_busy() {
        let device = device();
        let session = device.open().unwrap();

        assert!(matches!(device.shutdown(), Err(Error::Busy)));
        session.close();
        assert!(device.shutdown().is_ok());
    }

    #[test]
    fn test_open_after_shutdown() {
        let device = device();
        device.shutdown().unwrap();

        assert_eq!(device.state(), DeviceState::Closed);
        assert!(matches!(device.open(), Err(Error::ShutDown)));
        assert!(matches!(device.shutdown(), Err(Error::ShutDown)));
    }

    #[test]
    fn test_shutdown_releases_line() {
        let (line, handle) = MockLine::new(134);
        let device = KakuDevice::start(
            DeviceConfig::default(),
            TimedSink::new(AnyOutputLine::from(line)),
        )
        .unwrap();

        device.shutdown().unwrap();
        assert!(handle.is_released());
        assert_eq!(handle.level(), Level::Low);
    }
}
