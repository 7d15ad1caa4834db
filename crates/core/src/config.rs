//! Configuration management
//!
//! Loads the cmdata configuration file, a TOML document at
//! ~/.config/cmdata/config.toml unless `--config` names another one.
//! cmdata never writes it.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Current configuration schema version
///
/// Files without a `schema_version` key load as version 0, which shares this layout.
pub const SCHEMA_VERSION: u32 = 1;

/// Default metadata store selector
const DEFAULT_DB: &str = "local";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Schema version for migration support
    #[serde(default)]
    pub schema_version: u32,

    /// Default selections
    #[serde(default)]
    pub default: Defaults,

    /// Metadata store settings
    #[serde(default)]
    pub db: DbSettings,

    /// Per-backend connection settings
    #[serde(default)]
    pub service: ServiceSettings,
}

/// `default.*` keys
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Defaults {
    /// Which metadata store to use
    #[serde(default = "default_db")]
    pub db: String,

    /// Backend used when a command does not name one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
}

fn default_db() -> String {
    DEFAULT_DB.to_string()
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            db: default_db(),
            service: None,
        }
    }
}

/// `db.*` keys
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DbSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local: Option<LocalDbSettings>,
}

/// `db.local.*` keys
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocalDbSettings {
    /// Folder holding the metadata file
    #[serde(default, alias = "CMDATA_DB_FOLDER", skip_serializing_if = "Option::is_none")]
    pub folder: Option<PathBuf>,
}

/// `service.*` keys
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local: Option<LocalServiceSettings>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azure: Option<AzureServiceSettings>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3: Option<S3ServiceSettings>,
}

/// `service.local.*` keys
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocalServiceSettings {
    /// Root folder that holds stored copies
    #[serde(
        default,
        alias = "CMDATA_STORAGE_FOLDER",
        skip_serializing_if = "Option::is_none"
    )]
    pub folder: Option<PathBuf>,
}

/// `service.azure.*` keys
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AzureServiceSettings {
    /// Blob container name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,

    #[serde(default)]
    pub credentials: AzureCredentials,
}

/// `service.azure.credentials.*` keys
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AzureCredentials {
    /// Storage account name
    #[serde(
        default,
        alias = "AZURE_STORAGE_ACCOUNT",
        skip_serializing_if = "Option::is_none"
    )]
    pub account: Option<String>,

    /// Storage account access key
    #[serde(
        default,
        alias = "AZURE_STORAGE_KEY",
        skip_serializing_if = "Option::is_none"
    )]
    pub key: Option<String>,
}

/// `service.s3.*` keys
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3ServiceSettings {
    /// Bucket that holds the objects
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,

    /// AWS region
    #[serde(default = "default_region")]
    pub region: String,

    /// Endpoint URL for S3-compatible servers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    #[serde(default)]
    pub credentials: S3Credentials,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

impl Default for S3ServiceSettings {
    fn default() -> Self {
        Self {
            bucket: None,
            region: default_region(),
            endpoint: None,
            credentials: S3Credentials::default(),
        }
    }
}

/// `service.s3.credentials.*` keys
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct S3Credentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            default: Defaults::default(),
            db: DbSettings::default(),
            service: ServiceSettings::default(),
        }
    }
}

impl Config {
    /// Folder of the local metadata store, falling back to the user data directory
    pub fn local_db_folder(&self) -> Result<PathBuf> {
        if let Some(folder) = self.db.local.as_ref().and_then(|l| l.folder.clone()) {
            return Ok(folder);
        }
        dirs::data_dir()
            .map(|d| d.join("cmdata"))
            .ok_or_else(|| Error::Config("Could not determine data directory".into()))
    }
}

/// Configuration manager handles loading and saving config
#[derive(Debug)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the default config path
    pub fn new() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("Could not determine config directory".into()))?;
        let config_path = config_dir.join("cmdata").join("config.toml");
        Ok(Self { config_path })
    }

    /// Create a ConfigManager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the configuration file path
    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Load configuration from disk
    ///
    /// If the configuration file doesn't exist, returns a default configuration.
    /// Files from an older schema are upgraded in memory; newer ones are refused.
    pub fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            tracing::debug!(path = %self.config_path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&self.config_path)?;
        let mut config: Config = toml::from_str(&content)?;

        if config.schema_version < SCHEMA_VERSION {
            // Version 0 files predate schema_version and share the v1 layout
            config.schema_version = SCHEMA_VERSION;
        } else if config.schema_version > SCHEMA_VERSION {
            return Err(Error::Config(format!(
                "Configuration file version {} is newer than supported version {}. Please upgrade cmdata.",
                config.schema_version, SCHEMA_VERSION
            )));
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_config_manager() -> (ConfigManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        let manager = ConfigManager::with_path(config_path);
        (manager, temp_dir)
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.schema_version, SCHEMA_VERSION);
        assert_eq!(config.default.db, "local");
        assert!(config.default.service.is_none());
        assert!(config.service.local.is_none());
        assert!(config.service.azure.is_none());
    }

    #[test]
    fn test_load_nonexistent_returns_default() {
        let (manager, _temp_dir) = temp_config_manager();
        let config = manager.load().unwrap();
        assert_eq!(config.schema_version, SCHEMA_VERSION);
    }

    #[test]
    fn test_load_full_document() {
        let (manager, _temp_dir) = temp_config_manager();
        let content = r#"
            schema_version = 1

            [default]
            db = "local"
            service = "azure"

            [db.local]
            folder = "/var/lib/cmdata"

            [service.local]
            folder = "/tmp/store"

            [service.azure]
            container = "files"

            [service.azure.credentials]
            account = "acct"
            key = "c2VjcmV0"

            [service.s3]
            bucket = "tracked"
            endpoint = "http://localhost:9000"

            [service.s3.credentials]
            access_key = "ak"
            secret_key = "sk"
        "#;
        std::fs::write(manager.config_path(), content).unwrap();

        let config = manager.load().unwrap();
        assert_eq!(config.default.service.as_deref(), Some("azure"));
        assert_eq!(
            config.local_db_folder().unwrap(),
            PathBuf::from("/var/lib/cmdata")
        );
        let local = config.service.local.unwrap();
        assert_eq!(local.folder, Some(PathBuf::from("/tmp/store")));
        let azure = config.service.azure.unwrap();
        assert_eq!(azure.container.as_deref(), Some("files"));
        assert_eq!(azure.credentials.account.as_deref(), Some("acct"));
        let s3 = config.service.s3.unwrap();
        assert_eq!(s3.region, "us-east-1");
        assert_eq!(s3.credentials.secret_key.as_deref(), Some("sk"));
    }

    #[test]
    fn test_load_accepts_legacy_option_names() {
        let (manager, _temp_dir) = temp_config_manager();
        let content = r#"
            schema_version = 1

            [db.local]
            CMDATA_DB_FOLDER = "/db"

            [service.local]
            CMDATA_STORAGE_FOLDER = "/store"

            [service.azure.credentials]
            AZURE_STORAGE_ACCOUNT = "acct"
            AZURE_STORAGE_KEY = "key"
        "#;
        std::fs::write(manager.config_path(), content).unwrap();

        let config = manager.load().unwrap();
        assert_eq!(config.local_db_folder().unwrap(), PathBuf::from("/db"));
        assert_eq!(
            config.service.local.unwrap().folder,
            Some(PathBuf::from("/store"))
        );
        let creds = config.service.azure.unwrap().credentials;
        assert_eq!(creds.account.as_deref(), Some("acct"));
        assert_eq!(creds.key.as_deref(), Some("key"));
    }

    #[test]
    fn test_schema_version_too_new() {
        let (manager, _temp_dir) = temp_config_manager();

        let content = format!(
            r#"
            schema_version = {}
            "#,
            SCHEMA_VERSION + 1
        );
        std::fs::write(manager.config_path(), content).unwrap();

        let result = manager.load();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("newer than supported"));
    }

    #[test]
    fn test_old_schema_is_migrated() {
        let (manager, _temp_dir) = temp_config_manager();
        std::fs::write(manager.config_path(), "schema_version = 0\n").unwrap();

        let config = manager.load().unwrap();
        assert_eq!(config.schema_version, SCHEMA_VERSION);
    }
}
