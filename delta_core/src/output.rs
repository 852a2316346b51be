use std::{fs::OpenOptions, io::Write};

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, warn};

use crate::{DeltaConfig, DeltaResult, Error, Result};

/// Output key carrying whether any change was detected.
pub const IS_DETECTED: &str = "is_detected";
/// Output key carrying the JSON array of changed paths.
pub const DELTA_FILES: &str = "delta_files";

/// Appends `key=value` lines to the runner's output file.
#[derive(Debug, Clone, Default)]
pub struct GitHubOutput {
    path: Option<Utf8PathBuf>,
}

impl GitHubOutput {
    /// Write to `path`; `None` disables output.
    #[must_use]
    pub const fn new(path: Option<Utf8PathBuf>) -> Self {
        Self { path }
    }

    /// Output file named in the configuration.
    #[must_use]
    pub fn from_config(config: &DeltaConfig) -> Self {
        Self::new(config.output_path.clone())
    }

    /// Target file, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8Path> {
        self.path.as_deref()
    }

    /// Append one output. Returns `false` when no output file is configured.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Output`] when the file cannot be opened or written.
    pub fn set(&self, name: &str, value: &str) -> Result<bool> {
        let Some(path) = &self.path else {
            warn!(name, "output path is not set, skipping output");
            return Ok(false);
        };

        let to_error = |source| Error::Output {
            path: path.to_string(),
            source,
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(to_error)?;
        writeln!(file, "{name}={value}").map_err(to_error)?;
        debug!(name, %path, "wrote output");
        Ok(true)
    }

    /// Publish a delta result. `delta_files` is written only when a change
    /// was detected, truncated to `depth` leading segments.
    ///
    /// # Errors
    ///
    /// Returns an error when serialization or writing fails.
    pub fn publish(&self, result: &DeltaResult, depth: usize) -> Result<()> {
        self.set(IS_DETECTED, if result.detected { "true" } else { "false" })?;
        if result.detected {
            let files = serde_json::to_string(&result.truncated(depth))?;
            self.set(DELTA_FILES, &files)?;
        }
        Ok(())
    }
}
