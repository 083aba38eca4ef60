//! Action outputs.
//!
//! Runners collect step outputs from the file named by `GITHUB_OUTPUT`; when
//! that variable is unset the outputs go to stdout in the same `key=value`
//! shape so local runs and other CI systems can parse them.

use crate::error::Result;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Environment variable naming the runner's output file
pub const GITHUB_OUTPUT_ENV: &str = "GITHUB_OUTPUT";

/// Values published by a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutputs {
    /// e.g. `component1-v2.0.0`
    pub tag: String,
    /// e.g. `2.0.0`
    pub version: String,
}

impl ActionOutputs {
    pub fn render(&self) -> String {
        format!("tag={}\nversion={}\n", self.tag, self.version)
    }
}

/// Where [`emit`] wrote the outputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    File(String),
    Stdout,
}

/// Append the outputs to `path`
pub fn append_to_file(path: &Path, outputs: &ActionOutputs) -> Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(outputs.render().as_bytes())?;
    Ok(())
}

/// Publish outputs to the runner, or stdout outside of one
pub fn emit(outputs: &ActionOutputs) -> Result<OutputTarget> {
    match std::env::var(GITHUB_OUTPUT_ENV) {
        Ok(path) if !path.is_empty() => {
            append_to_file(Path::new(&path), outputs)?;
            log::debug!("Wrote outputs to {}", path);
            Ok(OutputTarget::File(path))
        }
        _ => {
            print!("{}", outputs.render());
            std::io::stdout().flush()?;
            Ok(OutputTarget::Stdout)
        }
    }
}
