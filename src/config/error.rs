//! Typed configuration errors: a `thiserror` enum for the recoverable,
//! per-item failures the loader can name precisely, leaving process-level
//! framing to `anyhow` at the CLI boundary.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{file}: {message}")]
    Invalid { file: PathBuf, message: String },

    #[error("no rules loaded from {path} (zero files parsed successfully)")]
    Empty { path: PathBuf },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
