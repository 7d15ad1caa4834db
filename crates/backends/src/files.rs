//! Local file helpers shared by the backends

use std::fs::Metadata;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

use cmdata_core::{Error, Result};

/// Metadata of an upload source, which must exist and be a regular file
pub(crate) async fn source_metadata(local_path: &Path) -> Result<Metadata> {
    let metadata = match tokio::fs::metadata(local_path).await {
        Ok(m) => m,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(Error::NotFound(local_path.display().to_string()));
        }
        Err(e) => return Err(e.into()),
    };
    if !metadata.is_file() {
        return Err(Error::InvalidPath(format!(
            "{} is not a regular file",
            local_path.display()
        )));
    }
    Ok(metadata)
}

/// Whether `a` and `b` name the same existing file
pub(crate) async fn same_file(a: &Path, b: &Path) -> bool {
    match (
        tokio::fs::canonicalize(a).await,
        tokio::fs::canonicalize(b).await,
    ) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// A download written beside its target and renamed into place on commit
///
/// Until `commit` the target keeps whatever it held before.
pub(crate) struct StagedFile {
    staging: PathBuf,
    target: PathBuf,
    file: tokio::fs::File,
}

impl StagedFile {
    /// Create `dest_folder` if needed and open a staging file for `name`
    pub(crate) async fn create(dest_folder: &Path, name: &str) -> Result<Self> {
        tokio::fs::create_dir_all(dest_folder).await?;
        let target = dest_folder.join(name);
        let staging = dest_folder.join(format!(".{name}.cmdata-partial"));
        let file = tokio::fs::File::create(&staging).await?;
        Ok(Self {
            staging,
            target,
            file,
        })
    }

    pub(crate) fn target(&self) -> &Path {
        &self.target
    }

    pub(crate) async fn write(&mut self, chunk: &[u8]) -> Result<()> {
        self.file.write_all(chunk).await?;
        Ok(())
    }

    /// Flush and move the staged bytes over the target
    pub(crate) async fn commit(mut self) -> Result<()> {
        self.file.flush().await?;
        self.file.sync_all().await?;
        drop(self.file);
        tokio::fs::rename(&self.staging, &self.target).await?;
        Ok(())
    }

    /// Drop the staged bytes, leaving the target untouched
    pub(crate) async fn discard(self) {
        drop(self.file);
        if let Err(e) = tokio::fs::remove_file(&self.staging).await {
            tracing::warn!(path = %self.staging.display(), error = %e, "could not remove partial download");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_source_metadata_missing_and_directory() {
        let temp_dir = TempDir::new().unwrap();

        let err = source_metadata(&temp_dir.path().join("nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));

        let err = source_metadata(temp_dir.path()).await.unwrap_err();
        assert!(matches!(err, Error::InvalidPath(_)));
    }

    #[tokio::test]
    async fn test_same_file() {
        let temp_dir = TempDir::new().unwrap();
        let a = temp_dir.path().join("a.txt");
        std::fs::write(&a, b"a").unwrap();
        let dotted = temp_dir.path().join(".").join("a.txt");

        assert!(same_file(&a, &dotted).await);
        assert!(!same_file(&a, &temp_dir.path().join("b.txt")).await);
    }

    #[tokio::test]
    async fn test_staged_commit_replaces_target() {
        let temp_dir = TempDir::new().unwrap();
        let dest = temp_dir.path().join("out");

        let mut staged = StagedFile::create(&dest, "data.bin").await.unwrap();
        staged.write(b"new ").await.unwrap();
        staged.write(b"bytes").await.unwrap();
        assert!(!dest.join("data.bin").exists());
        staged.commit().await.unwrap();

        assert_eq!(std::fs::read(dest.join("data.bin")).unwrap(), b"new bytes");
        assert_eq!(std::fs::read_dir(&dest).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_staged_discard_keeps_previous_copy() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("data.bin"), b"previous").unwrap();

        let mut staged = StagedFile::create(temp_dir.path(), "data.bin").await.unwrap();
        staged.write(b"half a downl").await.unwrap();
        staged.discard().await;

        assert_eq!(
            std::fs::read(temp_dir.path().join("data.bin")).unwrap(),
            b"previous"
        );
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }
}
