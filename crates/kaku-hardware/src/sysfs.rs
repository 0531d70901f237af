//! Linux sysfs GPIO output line.
//!
//! Acquisition follows the sysfs GPIO interface:
//!
//! ```text
//! <root>/export          write "N" to claim line N
//! <root>/gpioN/direction write "out"
//! <root>/gpioN/value     write "0" / "1"
//! <root>/unexport        write "N" to hand the line back
//! ```
//!
//! Every acquisition step is fatal on failure. A line that is already
//! exported (for instance by a previous run that crashed) is reused.

use std::fs::{self, File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use kaku_core::Level;
use tracing::{debug, info, warn};

use crate::{HardwareError, Result, traits::OutputLine};

/// Output line claimed through the sysfs GPIO interface.
///
/// The line is released on [`OutputLine::release`]; dropping an unreleased
/// line releases it as well, logging any failure.
#[derive(Debug)]
pub struct SysfsLine {
    line: u32,
    root: PathBuf,
    value: Option<File>,
    level: Level,
}

impl SysfsLine {
    /// Claim `line` under `root`, configure it as an output and drive it low.
    ///
    /// # Errors
    ///
    /// - [`HardwareError::AcquisitionFailed`] if the line could not be exported
    /// - [`HardwareError::InvalidLine`] if the host does not expose the line
    /// - [`HardwareError::ConfigurationError`] if it could not be made an output
    pub fn acquire(line: u32, root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let line_dir = root.join(format!("gpio{line}"));

        debug!(line, root = %root.display(), "Setting up GPIO line");

        let exported_here = !line_dir.is_dir();
        if exported_here {
            fs::write(root.join("export"), line.to_string())
                .map_err(|e| HardwareError::acquisition_failed(line, e.to_string()))?;
        }

        if !line_dir.is_dir() {
            return Err(HardwareError::invalid_line(line));
        }

        Self::configure(line, root, exported_here)
    }

    /// Make an exported line an output driven low.
    ///
    /// A line exported by this call is unexported again if configuration
    /// fails.
    fn configure(line: u32, root: PathBuf, exported_here: bool) -> Result<Self> {
        let line_dir = root.join(format!("gpio{line}"));

        let value = fs::write(line_dir.join("direction"), "out")
            .map_err(|e| {
                HardwareError::configuration(format!("line {line}: failed to set output: {e}"))
            })
            .and_then(|()| {
                OpenOptions::new()
                    .write(true)
                    .open(line_dir.join("value"))
                    .map_err(|e| {
                        HardwareError::configuration(format!(
                            "line {line}: failed to open value: {e}"
                        ))
                    })
            });

        let value = match value {
            Ok(value) => value,
            Err(e) => {
                if exported_here
                    && let Err(undo) = fs::write(root.join("unexport"), line.to_string())
                {
                    warn!(line, "Failed to unexport after failed setup: {}", undo);
                }
                return Err(e);
            }
        };

        let mut sysfs_line = Self {
            line,
            root,
            value: Some(value),
            level: Level::Low,
        };
        sysfs_line.set_level(Level::Low)?;

        info!(line, "GPIO line configured as output");
        Ok(sysfs_line)
    }

    /// Sysfs root this line was claimed under.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Check whether the line has been released.
    pub fn is_released(&self) -> bool {
        self.value.is_none()
    }
}

impl OutputLine for SysfsLine {
    fn line(&self) -> u32 {
        self.line
    }

    fn set_level(&mut self, level: Level) -> Result<()> {
        let value = self
            .value
            .as_mut()
            .ok_or(HardwareError::Released { line: self.line })?;

        value
            .seek(SeekFrom::Start(0))
            .and_then(|_| value.write_all(if level.is_high() { b"1" } else { b"0" }))
            .map_err(|e| HardwareError::write_failed(self.line, e.to_string()))?;

        self.level = level;
        Ok(())
    }

    fn level(&self) -> Level {
        self.level
    }

    fn release(&mut self) -> Result<()> {
        if self.value.is_none() {
            return Err(HardwareError::Released { line: self.line });
        }

        if let Err(e) = self.set_level(Level::Low) {
            warn!(line = self.line, "Failed to drive line low before release: {}", e);
        }
        self.value = None;

        fs::write(self.root.join("unexport"), self.line.to_string())
            .map_err(|e| HardwareError::release_failed(self.line, e.to_string()))?;

        info!(line = self.line, "GPIO line released");
        Ok(())
    }
}

impl Drop for SysfsLine {
    fn drop(&mut self) {
        if !self.is_released()
            && let Err(e) = self.release()
        {
            warn!(line = self.line, "Failed to release line on drop: {}", e);
        }
    }
}
