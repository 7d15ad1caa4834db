//! cmdata-core: Core library for the cmdata file tracker
//!
//! This crate provides the core functionality for cmdata, including:
//! - Configuration management
//! - The metadata store that indexes tracked files
//! - StorageBackend trait and the backend registry
//! - The data manager that orchestrates backends and metadata
//!
//! This crate is designed to be independent of any storage SDK,
//! allowing for easy testing and additional backends.

pub mod config;
pub mod error;
pub mod manager;
pub mod metadata;
pub mod registry;
pub mod traits;

pub use config::{Config, ConfigManager};
pub use error::{Error, Result};
pub use manager::DataManager;
pub use metadata::{open_store, LocalDb, MetadataStore};
pub use registry::BackendRegistry;
pub use traits::{file_name_of, BackendKind, StorageBackend, TrackedFile};
