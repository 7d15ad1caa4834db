//! Azure Blob Storage backend
//!
//! Talks to a single blob container through the `object_store` crate. Object
//! keys are the tracked file names.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use object_store::azure::MicrosoftAzureBuilder;
use object_store::path::Path as ObjectPath;
use object_store::{Attribute, Attributes, ObjectStore, PutOptions, PutPayload};
use url::Url;

use cmdata_core::{file_name_of, BackendKind, Error, Result, StorageBackend, TrackedFile};

use crate::files::{source_metadata, StagedFile};

/// Backend storing objects as blobs in one Azure container
#[derive(Debug, Clone)]
pub struct AzureBackend {
    store: Arc<dyn ObjectStore>,
    account: String,
    container: String,
}

impl AzureBackend {
    /// Connect to `container` in storage account `account` using its access key
    pub fn new(account: &str, access_key: &str, container: &str) -> Result<Self> {
        let store = MicrosoftAzureBuilder::new()
            .with_account(account)
            .with_access_key(access_key)
            .with_container_name(container)
            .build()
            .map_err(|e| Error::Config(format!("Azure: {e}")))?;

        Ok(Self::with_store(Arc::new(store), account, container))
    }

    /// Wrap an already built object store (any implementation, e.g. in-memory)
    pub fn with_store(
        store: Arc<dyn ObjectStore>,
        account: impl Into<String>,
        container: impl Into<String>,
    ) -> Self {
        Self {
            store,
            account: account.into(),
            container: container.into(),
        }
    }

    /// Public blob URL of `name`
    pub fn blob_url(&self, name: &str) -> Result<String> {
        let mut url = Url::parse(&format!("https://{}.blob.core.windows.net/", self.account))?;
        url.path_segments_mut()
            .map_err(|()| Error::General(format!("cannot build blob URL for {name}")))?
            .push(&self.container)
            .push(name);
        Ok(url.to_string())
    }
}

fn map_store_error(name: &str, err: object_store::Error) -> Error {
    match err {
        object_store::Error::NotFound { .. } => Error::NotFound(format!("blob {name}")),
        other => Error::Transfer(other.to_string()),
    }
}

#[async_trait]
impl StorageBackend for AzureBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Azure
    }

    async fn upload(&self, local_path: &Path) -> Result<TrackedFile> {
        source_metadata(local_path).await?;
        let data = tokio::fs::read(local_path).await?;

        let name = file_name_of(local_path)?;
        let size = data.len() as u64;

        let mut attributes = Attributes::new();
        if let Some(mime) = mime_guess::from_path(local_path).first() {
            attributes.insert(Attribute::ContentType, mime.essence_str().to_string().into());
        }
        let options = PutOptions {
            attributes,
            ..Default::default()
        };

        self.store
            .put_opts(&ObjectPath::from(name.as_str()), PutPayload::from(data), options)
            .await
            .map_err(|e| Error::Transfer(e.to_string()))?;

        tracing::debug!(container = %self.container, blob = %name, size, "uploaded blob");
        Ok(TrackedFile::new(&name, self.kind(), size, self.blob_url(&name)?))
    }

    async fn download(&self, file: &TrackedFile, dest_folder: &Path) -> Result<()> {
        let result = self
            .store
            .get(&ObjectPath::from(file.name.as_str()))
            .await
            .map_err(|e| map_store_error(&file.name, e))?;

        let mut out = StagedFile::create(dest_folder, &file.name).await?;
        let copied: Result<()> = async {
            let mut stream = result.into_stream();
            while let Some(chunk) = stream.next().await {
                let chunk = chunk.map_err(|e| map_store_error(&file.name, e))?;
                out.write(&chunk).await?;
            }
            Ok(())
        }
        .await;

        let target = out.target().to_path_buf();
        match copied {
            Ok(()) => out.commit().await?,
            Err(e) => {
                out.discard().await;
                return Err(e);
            }
        }

        tracing::debug!(container = %self.container, blob = %file.name, dst = %target.display(), "downloaded blob");
        Ok(())
    }

    async fn remove(&self, file: &TrackedFile) -> Result<()> {
        match self.store.delete(&ObjectPath::from(file.name.as_str())).await {
            Ok(()) => Ok(()),
            Err(object_store::Error::NotFound { .. }) => {
                tracing::warn!(container = %self.container, blob = %file.name, "blob already absent");
                Ok(())
            }
            Err(e) => Err(Error::Transfer(e.to_string())),
        }
    }
}
