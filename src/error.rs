use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NoteSplitError {
    /// The document to split or count does not exist.
    #[error("Input file not found: {}", .0.display())]
    MissingInput(PathBuf),

    /// A date given on the command line or in the environment is not `YYYYMMDD`.
    #[error("Invalid date '{0}'. Expected YYYYMMDD (e.g., 20251025)")]
    InvalidDate(String),

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The records file for `compose` is not a JSON array of notes.
    #[error("Invalid records file {}: {source}", .path.display())]
    Records {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl NoteSplitError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        NoteSplitError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, NoteSplitError>;
