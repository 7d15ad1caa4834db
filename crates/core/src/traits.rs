//! StorageBackend trait definition
//!
//! This trait defines the capability every storage backend offers to the data
//! manager. It allows the core to be decoupled from the provider SDKs.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Metadata record for a tracked file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedFile {
    /// Unique name, the key for every lookup
    pub name: String,

    /// Identifier of the backend that owns the bytes
    pub service: String,

    /// Size in bytes at upload time
    pub size: u64,

    /// Locator in the owning backend's addressing scheme
    pub url: String,

    /// When the record was created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<jiff::Timestamp>,
}

impl TrackedFile {
    /// Create a new record for a file stored on `kind`
    pub fn new(
        name: impl Into<String>,
        kind: BackendKind,
        size: u64,
        url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            service: kind.as_str().to_string(),
            size,
            url: url.into(),
            added_at: Some(jiff::Timestamp::now()),
        }
    }

    /// Human-readable size
    pub fn size_human(&self) -> String {
        humansize::format_size(self.size, humansize::BINARY)
    }
}

/// The set of backends cmdata knows how to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Folder on the local filesystem
    Local,
    /// Azure Blob Storage container
    Azure,
    /// S3-compatible bucket
    S3,
}

impl BackendKind {
    /// Identifier used in configuration and metadata records
    pub const fn as_str(self) -> &'static str {
        match self {
            BackendKind::Local => "local",
            BackendKind::Azure => "azure",
            BackendKind::S3 => "s3",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "local" => Ok(BackendKind::Local),
            "azure" => Ok(BackendKind::Azure),
            "s3" => Ok(BackendKind::S3),
            other => Err(Error::BackendUnconfigured(format!(
                "unknown service '{other}'"
            ))),
        }
    }
}

/// Derive the tracked name of a local file (its final path component)
pub fn file_name_of(path: &Path) -> Result<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| Error::InvalidPath(format!("{} has no file name", path.display())))
}

/// Trait for storage backend operations
///
/// This trait is implemented by the concrete backends and can be mocked for testing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Which kind of backend this is
    fn kind(&self) -> BackendKind;

    /// Store the local file and return its metadata record
    ///
    /// Fails with `NotFound` when `local_path` does not exist.
    async fn upload(&self, local_path: &Path) -> Result<TrackedFile>;

    /// Fetch the object described by `file` into `dest_folder`
    async fn download(&self, file: &TrackedFile, dest_folder: &Path) -> Result<()>;

    /// Delete the remote object; an already absent object is not an error
    async fn remove(&self, file: &TrackedFile) -> Result<()>;
}
