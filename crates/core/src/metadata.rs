//! Metadata store
//!
//! The index of tracked file names to their owning backend and locator.
//! It is the sole source of truth for which files are tracked; it is not
//! transactionally linked to the backends.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::traits::TrackedFile;

/// File name of the local metadata database inside its folder
pub const LOCAL_DB_FILE: &str = "cmdata.toml";

/// Current on-disk version of the local metadata database
const DB_VERSION: u32 = 1;

/// Keyed table of tracked files
pub trait MetadataStore: Send + Sync {
    /// All records, in insertion order
    fn list(&self) -> Result<Vec<TrackedFile>>;

    /// Insert a record, replacing any record with the same name
    fn add(&self, file: TrackedFile) -> Result<()>;

    /// Look up a record by name
    fn get(&self, name: &str) -> Result<Option<TrackedFile>>;

    /// Remove a record; fails with `NotFound` if it is not tracked
    fn delete(&self, file: &TrackedFile) -> Result<()>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct DbFile {
    #[serde(default)]
    version: u32,

    #[serde(default)]
    files: Vec<TrackedFile>,
}

/// Metadata store persisted as a TOML file in a local folder
///
/// Every operation reads the file and writes it back. There is no locking,
/// concurrent invocations against the same folder may race.
#[derive(Debug)]
pub struct LocalDb {
    path: PathBuf,
}

impl LocalDb {
    /// Open (lazily) the database kept in `folder`
    pub fn new(folder: impl AsRef<Path>) -> Self {
        Self {
            path: folder.as_ref().join(LOCAL_DB_FILE),
        }
    }

    /// Path of the database file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<DbFile> {
        if !self.path.exists() {
            return Ok(DbFile {
                version: DB_VERSION,
                files: Vec::new(),
            });
        }

        let content = std::fs::read_to_string(&self.path)?;
        let db: DbFile = toml::from_str(&content)?;
        if db.version > DB_VERSION {
            return Err(Error::Config(format!(
                "Metadata database {} has version {} but only {} is supported",
                self.path.display(),
                db.version,
                DB_VERSION
            )));
        }
        Ok(db)
    }

    fn save(&self, db: &DbFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(db)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

impl MetadataStore for LocalDb {
    fn list(&self) -> Result<Vec<TrackedFile>> {
        Ok(self.load()?.files)
    }

    fn add(&self, file: TrackedFile) -> Result<()> {
        let mut db = self.load()?;
        db.version = DB_VERSION;

        match db.files.iter_mut().find(|f| f.name == file.name) {
            Some(existing) => *existing = file,
            None => db.files.push(file),
        }

        self.save(&db)
    }

    fn get(&self, name: &str) -> Result<Option<TrackedFile>> {
        Ok(self.load()?.files.into_iter().find(|f| f.name == name))
    }

    fn delete(&self, file: &TrackedFile) -> Result<()> {
        let mut db = self.load()?;
        let original_len = db.files.len();

        db.files.retain(|f| f.name != file.name);

        if db.files.len() == original_len {
            return Err(Error::NotFound(file.name.clone()));
        }

        self.save(&db)
    }
}

/// Open the metadata store selected by `default.db`
pub fn open_store(config: &Config) -> Result<Box<dyn MetadataStore>> {
    match config.default.db.as_str() {
        "local" => {
            let folder = config.local_db_folder()?;
            tracing::debug!(folder = %folder.display(), "using local metadata store");
            Ok(Box::new(LocalDb::new(folder)))
        }
        other => Err(Error::Config(format!(
            "Unsupported metadata store '{other}'. Supported: local"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LocalDbSettings;
    use crate::traits::BackendKind;
    use tempfile::TempDir;

    fn temp_db() -> (LocalDb, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db = LocalDb::new(temp_dir.path().join("db"));
        (db, temp_dir)
    }

    fn record(name: &str, size: u64) -> TrackedFile {
        TrackedFile::new(name, BackendKind::Local, size, format!("file:///store/{name}"))
    }

    #[test]
    fn test_empty_store_lists_nothing() {
        let (db, _temp_dir) = temp_db();
        assert!(db.list().unwrap().is_empty());
        assert!(db.get("missing").unwrap().is_none());
        assert!(!db.path().exists());
    }

    #[test]
    fn test_add_and_get() {
        let (db, _temp_dir) = temp_db();

        db.add(record("notes.txt", 42)).unwrap();

        let found = db.get("notes.txt").unwrap().unwrap();
        assert_eq!(found.size, 42);
        assert_eq!(found.service, "local");
        assert!(db.path().exists());
    }

    #[test]
    fn test_list_keeps_insertion_order() {
        let (db, _temp_dir) = temp_db();

        db.add(record("b", 1)).unwrap();
        db.add(record("a", 2)).unwrap();
        db.add(record("c", 3)).unwrap();

        let names: Vec<_> = db.list().unwrap().into_iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
        assert_eq!(db.list().unwrap(), db.list().unwrap());
    }

    #[test]
    fn test_add_upserts_by_name() {
        let (db, _temp_dir) = temp_db();

        db.add(record("a", 1)).unwrap();
        db.add(record("b", 2)).unwrap();
        db.add(record("a", 10)).unwrap();

        let files = db.list().unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].name, "a");
        assert_eq!(files[0].size, 10);
    }

    #[test]
    fn test_delete() {
        let (db, _temp_dir) = temp_db();

        let file = record("gone.txt", 5);
        db.add(file.clone()).unwrap();
        db.delete(&file).unwrap();

        assert!(db.get("gone.txt").unwrap().is_none());
    }

    #[test]
    fn test_delete_not_found() {
        let (db, _temp_dir) = temp_db();

        let result = db.delete(&record("nope", 0));
        assert!(matches!(result.unwrap_err(), Error::NotFound(_)));
    }

    #[test]
    fn test_newer_database_rejected() {
        let (db, _temp_dir) = temp_db();
        std::fs::create_dir_all(db.path().parent().unwrap()).unwrap();
        std::fs::write(db.path(), "version = 99\n").unwrap();

        assert!(matches!(db.list().unwrap_err(), Error::Config(_)));
    }

    #[test]
    fn test_open_store_local() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.db.local = Some(LocalDbSettings {
            folder: Some(temp_dir.path().to_path_buf()),
        });

        let store = open_store(&config).unwrap();
        store.add(record("x", 1)).unwrap();
        assert!(temp_dir.path().join(LOCAL_DB_FILE).exists());
    }

    #[test]
    fn test_open_store_unsupported() {
        let mut config = Config::default();
        config.default.db = "mongo".to_string();

        let err = open_store(&config).err().unwrap();
        assert!(matches!(err, Error::Config(_)));
    }
}
