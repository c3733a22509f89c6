//! Store snapshot persistence with file locking.
//!
//! The CLI keeps its [`MemoryStore`] as one JSON document. Reads take a
//! shared lock, saves go through a temp file that is renamed over the
//! original, and [`MemoryStore::update`] holds an exclusive lock on a
//! sidecar `.lock` file for the whole load-modify-save cycle so concurrent
//! processes cannot lose each other's writes.

use crate::{Error, MemoryStore, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Path of the lock file guarding `path`
pub fn lock_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".lock");
    path.with_file_name(name)
}

impl MemoryStore {
    /// Load a snapshot with shared locking
    ///
    /// Returns an empty store if the file doesn't exist. A snapshot that
    /// exists but does not parse is an error: falling back to an empty store
    /// would silently drop every record on the next save.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No snapshot found at {:?}, starting empty", path);
            return Ok(Self::default());
        }

        let file = File::open(path)?;
        file.lock_shared()?;

        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        file.unlock()?;
        read?;

        if contents.trim().is_empty() {
            tracing::warn!("Snapshot {:?} is empty, starting empty", path);
            return Ok(Self::default());
        }

        let store = serde_json::from_str::<MemoryStore>(&contents)?;
        tracing::debug!("Loaded snapshot from {:?}", path);
        Ok(store)
    }

    /// Save a snapshot with exclusive locking
    ///
    /// Atomically writes the store by:
    /// 1. Writing to a temp file
    /// 2. Syncing to disk
    /// 3. Renaming over the original
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let temp = NamedTempFile::new_in(path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "snapshot path missing parent")
        })?)?;

        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string_pretty(self)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved snapshot to {:?}", path);
        Ok(())
    }

    /// Load the snapshot, modify it, and save it back as one transaction
    ///
    /// The closure's result is returned after a successful save. If the
    /// closure fails nothing is written.
    pub fn update<T, F>(path: &Path, f: F) -> Result<T>
    where
        F: FnOnce(&mut MemoryStore) -> Result<T>,
    {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let lock = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(lock_path(path))?;
        lock.lock_exclusive()?;

        let outcome = Self::load_from(path).and_then(|mut store| {
            let value = f(&mut store)?;
            store.save_to(path)?;
            Ok(value)
        });

        lock.unlock()?;
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Store, Training};

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("store.json");

        let mut store = MemoryStore::new();
        let training: Training = store
            .create(Training {
                name: "Legs".into(),
                ..Training::default()
            })
            .unwrap();
        store.save_to(&path).unwrap();

        let loaded = MemoryStore::load_from(&path).unwrap();
        assert_eq!(loaded, store);
        let reloaded: Training = loaded.get(training.id).unwrap();
        assert_eq!(reloaded.name, "Legs");
    }

    #[test]
    fn test_load_nonexistent_returns_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::load_from(&temp_dir.path().join("missing.json")).unwrap();
        assert_eq!(store, MemoryStore::default());
    }

    #[test]
    fn test_corrupted_snapshot_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("store.json");
        std::fs::write(&path, "{ invalid json }").unwrap();

        assert!(matches!(MemoryStore::load_from(&path), Err(Error::Json(_))));
    }

    #[test]
    fn test_update_pattern() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("store.json");

        let id = MemoryStore::update(&path, |store| {
            let training: Training = store.create(Training::default())?;
            Ok(training.id)
        })
        .unwrap();

        let loaded = MemoryStore::load_from(&path).unwrap();
        let training: Training = loaded.get(id).unwrap();
        assert_eq!(training.id, id);
    }

    #[test]
    fn test_failed_update_writes_nothing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("store.json");

        let result: Result<()> = MemoryStore::update(&path, |store| {
            let _: Training = store.create(Training::default())?;
            Err(Error::InvalidTransition("abort".into()))
        });

        assert!(result.is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_concurrent_updates_are_serialized() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("store.json");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let path = path.clone();
                std::thread::spawn(move || {
                    MemoryStore::update(&path, |store| {
                        let _: Training = store.create(Training::default())?;
                        Ok(())
                    })
                    .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let store = MemoryStore::load_from(&path).unwrap();
        let trainings = Store::<Training>::list(&store, &|_| true).unwrap();
        assert_eq!(trainings.len(), 8);
    }

    #[test]
    fn test_atomic_save_leaves_no_temp_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("store.json");

        MemoryStore::new().save_to(&path).unwrap();

        let extras: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != "store.json")
            .collect();
        assert!(
            extras.is_empty(),
            "Expected only store.json, found extras: {:?}",
            extras
        );
    }

    #[test]
    fn test_lock_path_is_sidecar() {
        let path = Path::new("/tmp/liftlog/store.json");
        assert_eq!(lock_path(path), PathBuf::from("/tmp/liftlog/store.json.lock"));
    }
}
