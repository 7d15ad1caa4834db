//! Data manager
//!
//! The orchestration facade: picks the backend for an operation, calls it,
//! and keeps the metadata store in step. Every operation is one linear
//! sequence; there is no rollback.

use std::path::Path;

use crate::error::{Error, Result};
use crate::metadata::MetadataStore;
use crate::registry::BackendRegistry;
use crate::traits::{file_name_of, TrackedFile};

/// Destination used by `get` when the caller does not name one
pub const DEFAULT_DEST_FOLDER: &str = ".";

/// Coordinates a backend registry and a metadata store
pub struct DataManager {
    registry: BackendRegistry,
    store: Box<dyn MetadataStore>,
}

impl DataManager {
    pub fn new(registry: BackendRegistry, store: Box<dyn MetadataStore>) -> Self {
        Self { registry, store }
    }

    /// Upload `path` to `service` (or the default service) and track it
    ///
    /// With `overwrite` false an already tracked name is refused before any
    /// upload happens. A failed upload writes no metadata. A failed metadata
    /// write after a successful upload leaves an orphaned remote object.
    pub async fn add(
        &self,
        service: Option<&str>,
        path: &Path,
        overwrite: bool,
    ) -> Result<TrackedFile> {
        let backend = self.registry.resolve(service)?;
        let name = file_name_of(path)?;

        if let Some(existing) = self.store.get(&name)? {
            if !overwrite {
                return Err(Error::Conflict(format!(
                    "'{name}' is already tracked on {}",
                    existing.service
                )));
            }
            tracing::warn!(
                name = %name,
                previous = %existing.service,
                "replacing tracked file with the same name"
            );
        }

        let file = backend.upload(path).await?;
        self.store.add(file.clone())?;

        tracing::info!(name = %file.name, service = %file.service, size = file.size, "added");
        Ok(file)
    }

    /// All tracked files
    pub fn list(&self) -> Result<Vec<TrackedFile>> {
        self.store.list()
    }

    /// Download the tracked file `name` into `dest` (current directory by default)
    ///
    /// The backend is chosen by the service stored in the record, never by the caller.
    pub async fn get(&self, name: &str, dest: Option<&Path>) -> Result<TrackedFile> {
        let file = self.tracked(name)?;
        let dest = dest.unwrap_or_else(|| Path::new(DEFAULT_DEST_FOLDER));

        let backend = self.registry.resolve(Some(&file.service))?;
        backend.download(&file, dest).await?;

        tracing::info!(name = %file.name, dest = %dest.display(), "downloaded");
        Ok(file)
    }

    /// Remove the tracked file `name` from its backend, then from the index
    ///
    /// When the remote removal fails the index entry is left in place so the
    /// operation can be retried.
    pub async fn delete(&self, name: &str) -> Result<TrackedFile> {
        let file = self.tracked(name)?;

        let backend = self.registry.resolve(Some(&file.service))?;
        backend.remove(&file).await?;
        self.store.delete(&file)?;

        tracing::info!(name = %file.name, service = %file.service, "deleted");
        Ok(file)
    }

    fn tracked(&self, name: &str) -> Result<TrackedFile> {
        self.store
            .get(name)?
            .ok_or_else(|| Error::NotFound(format!("{name} is not tracked")))
    }
}
