//! cmdata-backends: storage backends for the cmdata file tracker
//!
//! This crate provides the implementations of the StorageBackend trait
//! (local folder, Azure Blob Storage, S3) and builds the backend registry
//! from configuration. It is the only crate that depends on provider SDKs.

pub mod azure;
mod files;
pub mod local;
pub mod s3;

use std::sync::Arc;

use cmdata_core::{BackendRegistry, Config, Error, Result};

pub use azure::AzureBackend;
pub use local::LocalBackend;
pub use s3::{S3Backend, S3Settings};

/// Build the backend registry from configuration
///
/// A backend is registered only when its required options are present; a
/// partially configured service is skipped, except that Azure credentials
/// without a container are a configuration error.
pub async fn build_registry(config: &Config) -> Result<BackendRegistry> {
    let mut registry = BackendRegistry::new();

    if let Some(folder) = config.service.local.as_ref().and_then(|l| l.folder.as_ref()) {
        registry.register(Arc::new(LocalBackend::new(folder)));
    }

    if let Some(azure) = &config.service.azure {
        let creds = &azure.credentials;
        match (&creds.account, &creds.key) {
            (Some(account), Some(key)) => {
                let container = azure.container.as_deref().ok_or_else(|| {
                    Error::Config("service.azure.container is required".into())
                })?;
                registry.register(Arc::new(AzureBackend::new(account, key, container)?));
            }
            _ => tracing::debug!("azure credentials incomplete, service not registered"),
        }
    }

    if let Some(s3) = &config.service.s3 {
        let creds = &s3.credentials;
        match (&s3.bucket, &creds.access_key, &creds.secret_key) {
            (Some(bucket), Some(access_key), Some(secret_key)) => {
                let backend = S3Backend::new(S3Settings {
                    bucket: bucket.clone(),
                    region: s3.region.clone(),
                    endpoint: s3.endpoint.clone(),
                    access_key: access_key.clone(),
                    secret_key: secret_key.clone(),
                })
                .await?;
                registry.register(Arc::new(backend));
            }
            _ => tracing::debug!("s3 bucket or credentials missing, service not registered"),
        }
    }

    if let Some(default) = &config.default.service {
        registry.set_default(default.clone());
    }

    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmdata_core::config::{
        AzureCredentials, AzureServiceSettings, LocalServiceSettings,
    };
    use cmdata_core::BackendKind;

    fn local_config(folder: &std::path::Path) -> Config {
        let mut config = Config::default();
        config.default.service = Some("local".to_string());
        config.service.local = Some(LocalServiceSettings {
            folder: Some(folder.to_path_buf()),
        });
        config
    }

    #[tokio::test]
    async fn test_local_only() {
        let temp_dir = tempfile::tempdir().unwrap();
        let registry = build_registry(&local_config(temp_dir.path())).await.unwrap();

        assert_eq!(registry.names(), vec!["local"]);
        assert_eq!(registry.default_name(), Some("local"));
        assert_eq!(registry.resolve(None).unwrap().kind(), BackendKind::Local);
    }

    #[tokio::test]
    async fn test_azure_without_credentials_is_not_registered() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut config = local_config(temp_dir.path());
        config.service.azure = Some(AzureServiceSettings {
            container: Some("files".to_string()),
            credentials: AzureCredentials {
                account: Some("acct".to_string()),
                key: None,
            },
        });

        let registry = build_registry(&config).await.unwrap();
        assert_eq!(registry.names(), vec!["local"]);
        assert!(matches!(
            registry.resolve(Some("azure")).err().unwrap(),
            Error::BackendUnconfigured(_)
        ));
    }

    #[tokio::test]
    async fn test_azure_registered_with_credentials() {
        let mut config = Config::default();
        config.default.service = Some("azure".to_string());
        config.service.azure = Some(AzureServiceSettings {
            container: Some("files".to_string()),
            credentials: AzureCredentials {
                account: Some("acct".to_string()),
                key: Some("c2VjcmV0".to_string()),
            },
        });

        let registry = build_registry(&config).await.unwrap();
        assert_eq!(registry.resolve(None).unwrap().kind(), BackendKind::Azure);
    }

    #[tokio::test]
    async fn test_azure_without_container_is_config_error() {
        let mut config = Config::default();
        config.service.azure = Some(AzureServiceSettings {
            container: None,
            credentials: AzureCredentials {
                account: Some("acct".to_string()),
                key: Some("c2VjcmV0".to_string()),
            },
        });

        let err = build_registry(&config).await.err().unwrap();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn test_default_pointing_at_unconfigured_service() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut config = local_config(temp_dir.path());
        config.default.service = Some("azure".to_string());

        let registry = build_registry(&config).await.unwrap();
        assert!(matches!(
            registry.resolve(None).err().unwrap(),
            Error::BackendUnconfigured(_)
        ));
        assert!(registry.resolve(Some("local")).is_ok());
    }
}
