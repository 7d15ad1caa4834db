//! Local filesystem backend
//!
//! Stores copies of tracked files in a root folder.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use url::Url;

use cmdata_core::{file_name_of, BackendKind, Error, Result, StorageBackend, TrackedFile};

use crate::files::{same_file, source_metadata};

/// Backend keeping objects as plain files under `root`
#[derive(Debug, Clone)]
pub struct LocalBackend {
    root: PathBuf,
}

impl LocalBackend {
    /// Create a backend rooted at `root`; the folder is created on first upload
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    fn file_url(path: &Path) -> Result<String> {
        let absolute = std::path::absolute(path)?;
        Url::from_file_path(&absolute)
            .map(|u| u.to_string())
            .map_err(|()| Error::InvalidPath(absolute.display().to_string()))
    }
}

#[async_trait]
impl StorageBackend for LocalBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }

    async fn upload(&self, local_path: &Path) -> Result<TrackedFile> {
        let metadata = source_metadata(local_path).await?;

        let name = file_name_of(local_path)?;
        let target = self.object_path(&name);

        let size = if same_file(local_path, &target).await {
            tracing::debug!(path = %target.display(), "source already in storage root");
            metadata.len()
        } else {
            tokio::fs::create_dir_all(&self.root).await?;
            tokio::fs::copy(local_path, &target)
                .await
                .map_err(|e| Error::Transfer(format!("copy to {}: {e}", target.display())))?
        };

        tracing::debug!(src = %local_path.display(), dst = %target.display(), size, "stored local copy");
        Ok(TrackedFile::new(name, self.kind(), size, Self::file_url(&target)?))
    }

    async fn download(&self, file: &TrackedFile, dest_folder: &Path) -> Result<()> {
        let source = self.object_path(&file.name);
        if !tokio::fs::try_exists(&source).await? {
            return Err(Error::NotFound(format!(
                "{} (expected at {})",
                file.name,
                source.display()
            )));
        }

        let target = dest_folder.join(&file.name);
        if same_file(&source, &target).await {
            tracing::debug!(path = %target.display(), "destination is the stored copy");
            return Ok(());
        }

        tokio::fs::create_dir_all(dest_folder).await?;
        tokio::fs::copy(&source, &target)
            .await
            .map_err(|e| Error::Transfer(format!("copy to {}: {e}", target.display())))?;

        tracing::debug!(src = %source.display(), dst = %target.display(), "fetched local copy");
        Ok(())
    }

    async fn remove(&self, file: &TrackedFile) -> Result<()> {
        let path = self.object_path(&file.name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "stored copy already absent");
                Ok(())
            }
            Err(e) => Err(Error::Transfer(format!("remove {}: {e}", path.display()))),
        }
    }
}
