//! Mock implementations for testing and development.
//!
//! This module provides a simulated output line that can be inspected
//! programmatically and a recording sink that captures a pulse sequence
//! without waiting.

pub mod line;
pub mod sink;

// Re-export commonly used types
pub use line::{MockLine, MockLineHandle};
pub use sink::{RecordingSink, SinkEvent};
