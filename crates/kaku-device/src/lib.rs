//! KaKu transmitter device.
//!
//! Ties the telegram encoder to an output line and exposes it as a
//! single-open character-device style endpoint:
//!
//! - [`DeviceConfig`]: start-up parameters (line, GPIO root, tolerance).
//! - [`KakuDevice`]: owns the line; at most one [`SessionHandle`] at a time.
//! - [`AsyncSession`]: the same session for tokio callers.
//!
//! Each write of exactly four bytes is one little-endian command word and
//! is transmitted before the write returns.

pub mod async_session;
pub mod config;
pub mod device;

pub use async_session::AsyncSession;
pub use config::DeviceConfig;
pub use device::{DeviceState, DeviceStats, KakuDevice, LineSink, SessionHandle};
