//! S3 backend
//!
//! Wraps aws-sdk-s3 and stores tracked files as objects in one bucket.

use std::path::Path;

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;

use cmdata_core::{file_name_of, BackendKind, Error, Result, StorageBackend, TrackedFile};

use crate::files::{source_metadata, StagedFile};

/// Connection settings for an S3-compatible service
#[derive(Debug, Clone)]
pub struct S3Settings {
    pub bucket: String,
    pub region: String,
    pub endpoint: Option<String>,
    pub access_key: String,
    pub secret_key: String,
}

/// S3 client wrapper bound to a bucket
pub struct S3Backend {
    inner: aws_sdk_s3::Client,
    bucket: String,
}

impl S3Backend {
    /// Create a new S3 backend from connection settings
    pub async fn new(settings: S3Settings) -> Result<Self> {
        let credentials = aws_credential_types::Credentials::new(
            settings.access_key,
            settings.secret_key,
            None, // session token
            None, // expiry
            "cmdata-static-credentials",
        );

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(aws_config::Region::new(settings.region));
        if let Some(endpoint) = &settings.endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        let config = loader.load().await;

        // Path-style addressing for S3-compatible servers behind a custom endpoint
        let s3_config = aws_sdk_s3::config::Builder::from(&config)
            .force_path_style(settings.endpoint.is_some())
            .build();

        Ok(Self {
            inner: aws_sdk_s3::Client::from_conf(s3_config),
            bucket: settings.bucket,
        })
    }

    fn object_url(&self, key: &str) -> String {
        format!("s3://{}/{}", self.bucket, key)
    }
}

#[async_trait]
impl StorageBackend for S3Backend {
    fn kind(&self) -> BackendKind {
        BackendKind::S3
    }

    async fn upload(&self, local_path: &Path) -> Result<TrackedFile> {
        let metadata = source_metadata(local_path).await?;

        let key = file_name_of(local_path)?;
        let body = ByteStream::from_path(local_path)
            .await
            .map_err(|e| Error::Transfer(e.to_string()))?;

        let mut request = self
            .inner
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(body);

        if let Some(mime) = mime_guess::from_path(local_path).first() {
            request = request.content_type(mime.essence_str());
        }

        request
            .send()
            .await
            .map_err(|e| Error::Transfer(e.to_string()))?;

        tracing::debug!(bucket = %self.bucket, key = %key, size = metadata.len(), "uploaded object");
        Ok(TrackedFile::new(
            &key,
            self.kind(),
            metadata.len(),
            self.object_url(&key),
        ))
    }

    async fn download(&self, file: &TrackedFile, dest_folder: &Path) -> Result<()> {
        let response = self
            .inner
            .get_object()
            .bucket(&self.bucket)
            .key(&file.name)
            .send()
            .await
            .map_err(|e| {
                let err = e.into_service_error();
                if err.is_no_such_key() {
                    Error::NotFound(format!("object {}", file.name))
                } else {
                    Error::Transfer(err.to_string())
                }
            })?;

        let mut out = StagedFile::create(dest_folder, &file.name).await?;
        let copied: Result<()> = async {
            let mut body = response.body;
            while let Some(chunk) = body
                .try_next()
                .await
                .map_err(|e| Error::Transfer(e.to_string()))?
            {
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

        tracing::debug!(bucket = %self.bucket, key = %file.name, dst = %target.display(), "downloaded object");
        Ok(())
    }

    async fn remove(&self, file: &TrackedFile) -> Result<()> {
        // DeleteObject succeeds for keys that do not exist.
        self.inner
            .delete_object()
            .bucket(&self.bucket)
            .key(&file.name)
            .send()
            .await
            .map_err(|e| Error::Transfer(e.to_string()))?;

        Ok(())
    }
}
