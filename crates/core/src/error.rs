//! Error types for cmdata-core
//!
//! Provides a unified error type that can be converted to appropriate exit codes.

use thiserror::Error;

/// Result type alias for cmdata-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for cmdata-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Named or default backend is not present in the registry
    #[error("Backend not configured: {0}")]
    BackendUnconfigured(String),

    /// Tracked file, local source or remote object does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Upload, download or remove failed at the backend
    #[error("Transfer failed: {0}")]
    Transfer(String),

    /// A file with the same name is already tracked
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Source path cannot be tracked
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// General error
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Get the appropriate exit code for this error
    pub const fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidPath(_) => 2,         // UsageError
            Error::Config(_) => 2,              // UsageError
            Error::BackendUnconfigured(_) => 2, // UsageError
            Error::Transfer(_) => 3,            // TransferError
            Error::NotFound(_) => 5,            // NotFound
            Error::Conflict(_) => 6,            // Conflict
            _ => 1,                             // GeneralError
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_exit_codes() {
        assert_eq!(Error::InvalidPath("test".into()).exit_code(), 2);
        assert_eq!(Error::Config("test".into()).exit_code(), 2);
        assert_eq!(Error::BackendUnconfigured("azure".into()).exit_code(), 2);
        assert_eq!(Error::Transfer("test".into()).exit_code(), 3);
        assert_eq!(Error::NotFound("test".into()).exit_code(), 5);
        assert_eq!(Error::Conflict("test".into()).exit_code(), 6);
        assert_eq!(Error::General("test".into()).exit_code(), 1);

        let io = std::io::Error::other("disk on fire");
        assert_eq!(Error::from(io).exit_code(), 1);
    }

    #[test]
    fn test_error_display() {
        let err = Error::BackendUnconfigured("azure".into());
        assert_eq!(err.to_string(), "Backend not configured: azure");

        let err = Error::NotFound("notes.txt".into());
        assert_eq!(err.to_string(), "Not found: notes.txt");
    }
}
