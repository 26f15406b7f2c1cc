//! Error types for script loading.

use std::path::PathBuf;

/// Whole-file failures.
///
/// In-file problems (unterminated blocks, duplicate names, stray lines)
/// are not errors; they are recorded on the parse summary as
/// [`quern_core::registry::Anomaly`] values and parsing continues.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// The script file does not exist.
    #[error("script file not found: {file}")]
    MissingFile { file: PathBuf },

    /// Reading the script file failed.
    #[error("failed to read {file}: {source}")]
    Read {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ScriptError {
    /// The file this error is about.
    pub fn file(&self) -> &PathBuf {
        match self {
            ScriptError::MissingFile { file } => file,
            ScriptError::Read { file, .. } => file,
        }
    }
}
