//! Error types for the icon project store and import pipelines

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for store, import and session operations
pub type StudioResult<T> = Result<T, StudioError>;

/// Store and pipeline error types
#[derive(Error, Debug)]
pub enum StudioError {
    /// Missing metadata, document or file
    #[error("Not found: {0}")]
    NotFound(String),

    /// Copy, write, read or delete failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Archive could not be extracted
    #[error("Archive error: {0}")]
    Archive(String),

    /// Manifest is malformed
    #[error("Parse error in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// Category operation on an icon that was never imported
    #[error("Unknown icon: {0}")]
    UnknownIcon(String),

    /// Icon is already part of the project
    #[error("Icon {0} is already imported")]
    AlreadyImported(String),

    /// Icon identifier cannot be used as a file name
    #[error("Invalid icon id: {0:?}")]
    InvalidIconId(String),

    /// Request import failed before any icon was merged
    #[error("Import failed: {0}")]
    Import(#[source] Box<StudioError>),

    /// The image moved but the project manifest was not written
    #[error("Icon {id} moved but project state was not persisted: {source}")]
    Persist {
        id: String,
        #[source]
        source: Box<StudioError>,
    },

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// An operation needed an open project
    #[error("No project is open")]
    NoProjectOpen,

    /// The session worker has shut down
    #[error("Session closed: {0}")]
    SessionClosed(String),
}

impl StudioError {
    /// Create a not found error
    pub fn not_found<E: fmt::Display>(item: E) -> Self {
        Self::NotFound(item.to_string())
    }

    /// Create an archive error
    pub fn archive<E: fmt::Display>(err: E) -> Self {
        Self::Archive(err.to_string())
    }

    /// Create a manifest parse error
    pub fn parse<M: fmt::Display>(path: impl Into<PathBuf>, message: M) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Create a serialization error
    pub fn serialization<E: fmt::Display>(err: E) -> Self {
        Self::Serialization(err.to_string())
    }

    /// Create a configuration error
    pub fn config<E: fmt::Display>(msg: E) -> Self {
        Self::Config(msg.to_string())
    }

    /// Wrap a failure as a request import failure
    pub fn import(err: StudioError) -> Self {
        match err {
            Self::Import(_) => err,
            other => Self::Import(Box::new(other)),
        }
    }

    /// Wrap a failure to persist state after a completed move
    pub fn persist(id: impl Into<String>, err: StudioError) -> Self {
        Self::Persist {
            id: id.into(),
            source: Box::new(err),
        }
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }

    /// Check if this is an unknown icon error
    pub fn is_unknown_icon(&self) -> bool {
        matches!(self, Self::UnknownIcon(_))
    }

    /// Check if the physical move already happened and only persistence is pending
    pub fn is_moved_not_durable(&self) -> bool {
        matches!(self, Self::Persist { .. })
    }
}

impl From<serde_json::Error> for StudioError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err)
    }
}

impl From<toml::de::Error> for StudioError {
    fn from(err: toml::de::Error) -> Self {
        Self::config(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_wraps_once() {
        let err = StudioError::import(StudioError::archive("bad header"));
        let err = StudioError::import(err);
        match err {
            StudioError::Import(inner) => assert!(matches!(*inner, StudioError::Archive(_))),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_io_not_found_is_not_found() {
        let err = StudioError::from(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert!(err.is_not_found());
        assert!(!StudioError::UnknownIcon("a".into()).is_not_found());
    }

    #[test]
    fn test_persist_is_moved_not_durable() {
        let err = StudioError::persist("b", StudioError::Io(std::io::Error::other("disk full")));
        assert!(err.is_moved_not_durable());
        assert!(err.to_string().contains("Icon b moved"));
    }
}
