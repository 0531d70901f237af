//! Mock output line for testing and development.
//!
//! The line records every level written to it. A cloned
//! [`MockLineHandle`] observes the same state from another thread and can
//! inject write failures.

use std::sync::{Arc, Mutex, MutexGuard};

use kaku_core::Level;

use crate::{HardwareError, Result, traits::OutputLine};

#[derive(Debug)]
struct LineState {
    level: Level,
    history: Vec<Level>,
    released: bool,
    fail_writes: bool,
}

fn lock(state: &Mutex<LineState>) -> MutexGuard<'_, LineState> {
    // Recover the state after a panicking holder.
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Mock output line.
///
/// The line starts low, as a freshly configured output does, and the
/// initial level is part of the recorded history.
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
/// line.release().unwrap();
///
/// assert!(handle.is_released());
/// assert!(line.set_level(Level::Low).is_err());
/// ```
#[derive(Debug)]
pub struct MockLine {
    line: u32,
    state: Arc<Mutex<LineState>>,
}

impl MockLine {
    /// Create a new mock line and a handle observing it.
    pub fn new(line: u32) -> (Self, MockLineHandle) {
        let state = Arc::new(Mutex::new(LineState {
            level: Level::Low,
            history: vec![Level::Low],
            released: false,
            fail_writes: false,
        }));

        let handle = MockLineHandle {
            line,
            state: Arc::clone(&state),
        };

        (Self { line, state }, handle)
    }
}

impl OutputLine for MockLine {
    fn line(&self) -> u32 {
        self.line
    }

    fn set_level(&mut self, level: Level) -> Result<()> {
        let mut state = lock(&self.state);
        if state.released {
            return Err(HardwareError::Released { line: self.line });
        }
        if state.fail_writes {
            return Err(HardwareError::write_failed(self.line, "injected failure"));
        }
        state.level = level;
        state.history.push(level);
        Ok(())
    }

    fn level(&self) -> Level {
        lock(&self.state).level
    }

    fn release(&mut self) -> Result<()> {
        let mut state = lock(&self.state);
        if state.released {
            return Err(HardwareError::Released { line: self.line });
        }
        state.released = true;
        Ok(())
    }
}

/// Handle for observing a mock line.
///
/// Cloneable; all clones observe the same line.
#[derive(Debug, Clone)]
pub struct MockLineHandle {
    line: u32,
    state: Arc<Mutex<LineState>>,
}

impl MockLineHandle {
    /// Line number of the observed line.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Current level.
    pub fn level(&self) -> Level {
        lock(&self.state).level
    }

    /// Every level written so far, starting with the initial low.
    pub fn history(&self) -> Vec<Level> {
        lock(&self.state).history.clone()
    }

    /// Number of levels written since creation, excluding the initial low.
    pub fn write_count(&self) -> usize {
        lock(&self.state).history.len().saturating_sub(1)
    }

    /// Forget the recorded history, keeping the current level.
    pub fn clear_history(&self) {
        let mut state = lock(&self.state);
        let level = state.level;
        state.history = vec![level];
    }

    /// Check whether the line has been released.
    pub fn is_released(&self) -> bool {
        lock(&self.state).released
    }

    /// Make subsequent writes fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        lock(&self.state).fail_writes = fail;
    }
}
