use std::path::PathBuf;

use thiserror::Error;

/// Failures while loading external inputs. The layout and hover core never
/// fails: malformed data is dropped at use time instead.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {what}: {message}")]
    Parse { what: String, message: String },

    #[error("topology root has no name")]
    EmptyTopology,
}

impl LoadError {
    pub(crate) fn parse(what: impl Into<String>, err: impl std::fmt::Display) -> Self {
        LoadError::Parse {
            what: what.into(),
            message: err.to_string(),
        }
    }
}
