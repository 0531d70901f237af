//! Async front end for a device session.
//!
//! A transmission blocks its thread for the whole telegram (up to about a
//! second at the longest period and 128 repeats). [`AsyncSession`] moves the
//! session onto tokio's blocking pool for each write and takes it back when
//! the telegram is done, so async callers never stall a runtime worker.
//!
//! Dropping a pending write does not cancel it: the telegram finishes on the
//! blocking thread and the session closes there.

use kaku_core::constants::COMMAND_LEN;
use kaku_core::{Error, Result};
use kaku_hardware::PulseSink;
use tracing::warn;

use crate::device::{KakuDevice, SessionHandle};

/// Session whose writes run on the blocking thread pool.
///
/// # Examples
///
/// ```
/// use kaku_device::{AsyncSession, DeviceConfig, KakuDevice};
/// use kaku_hardware::mock::RecordingSink;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> kaku_core::Result<()> {
/// let device = KakuDevice::start(DeviceConfig::default(), RecordingSink::new())?;
/// let mut session = AsyncSession::open(&device)?;
///
/// assert_eq!(session.write(&[0, 0, 0, 0]).await?, 4);
/// session.close();
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct AsyncSession<S> {
    handle: Option<SessionHandle<S>>,
}

impl<S: PulseSink + Send + 'static> AsyncSession<S> {
    /// Open `device` for async use.
    ///
    /// # Errors
    /// Same as [`KakuDevice::open`].
    pub fn open(device: &KakuDevice<S>) -> Result<Self> {
        device.open().map(Self::from)
    }

    /// Transmit one command word without blocking the runtime.
    ///
    /// # Errors
    /// Returns `Error::InvalidLength` unless `bytes` is exactly four bytes,
    /// `Error::SessionClosed` if an earlier write lost the session, and
    /// `Error::Hardware` if the transmission task panicked.
    pub async fn write(&mut self, bytes: &[u8]) -> Result<usize> {
        if bytes.len() != COMMAND_LEN {
            return Err(Error::InvalidLength { len: bytes.len() });
        }
        let mut handle = self.handle.take().ok_or(Error::SessionClosed)?;
        let bytes = bytes.to_vec();

        let task = tokio::task::spawn_blocking(move || {
            let result = handle.write(&bytes);
            (handle, result)
        });

        match task.await {
            Ok((handle, result)) => {
                self.handle = Some(handle);
                result
            }
            Err(e) => {
                warn!("Transmission task failed: {}", e);
                Err(Error::Hardware(format!("transmission task failed: {e}")))
            }
        }
    }
}

impl<S> AsyncSession<S> {
    /// Check whether the session still holds the device.
    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    /// Take the underlying blocking session back.
    pub fn into_inner(self) -> Option<SessionHandle<S>> {
        self.handle
    }

    /// Close the session, making the device available again.
    pub fn close(self) {}
}

impl<S> From<SessionHandle<S>> for AsyncSession<S> {
    fn from(handle: SessionHandle<S>) -> Self {
        Self {
            handle: Some(handle),
        }
    }
}
