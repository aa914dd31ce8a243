//! JSON file case store.
//!
//! The whole state lives in one pretty-printed JSON document. Every
//! transaction takes an exclusive lock on a sibling `.lock` file, re-reads
//! the document, and publishes through a uniquely named temp file that is
//! renamed over the original. Reads take a shared lock. Handles in other
//! processes serialize on the same lock file.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tempfile::NamedTempFile;

use crate::core::{CaseStore, SchedulerError, StoreState, StoreTransaction};

fn backend(context: &str, path: &Path, err: impl std::fmt::Display) -> SchedulerError {
    SchedulerError::Backend(format!("{context} {}: {err}", path.display()))
}

/// Case store persisted as a JSON document on disk.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl JsonFileStore {
    /// Open (or prepare to create) the store at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SchedulerError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| backend("create", parent, e))?;
        }
        let mut lock_name = path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        lock_name.push(".lock");
        let lock_path = path.with_file_name(lock_name);
        Ok(Self { path, lock_path })
    }

    /// Location of the JSON document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling file whose OS lock guards the document.
    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    fn directory(&self) -> &Path {
        self.path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
    }

    /// Block until the lock is held. Dropping the returned file releases it.
    fn lock(&self, exclusive: bool) -> Result<File, SchedulerError> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&self.lock_path)
            .map_err(|e| backend("open lock", &self.lock_path, e))?;
        let locked = if exclusive {
            FileExt::lock_exclusive(&file)
        } else {
            FileExt::lock_shared(&file)
        };
        locked.map_err(|e| backend("lock", &self.lock_path, e))?;
        Ok(file)
    }

    fn load(&self) -> Result<StoreState, SchedulerError> {
        if !self.path.exists() {
            return Ok(StoreState::default());
        }
        let raw = fs::read_to_string(&self.path).map_err(|e| backend("read", &self.path, e))?;
        if raw.trim().is_empty() {
            return Ok(StoreState::default());
        }
        serde_json::from_str(&raw).map_err(|e| backend("parse", &self.path, e))
    }

    fn publish(&self, state: &StoreState) -> Result<(), SchedulerError> {
        let bytes =
            serde_json::to_vec_pretty(state).map_err(|e| backend("encode", &self.path, e))?;
        let dir = self.directory();
        let mut temp = NamedTempFile::new_in(dir).map_err(|e| backend("create temp in", dir, e))?;
        temp.as_file_mut()
            .write_all(&bytes)
            .and_then(|()| temp.as_file().sync_all())
            .map_err(|e| backend("write temp for", &self.path, e))?;
        temp.persist(&self.path)
            .map_err(|e| backend("replace", &self.path, e.error))?;
        tracing::debug!("published case store to {}", self.path.display());
        Ok(())
    }
}

impl CaseStore for JsonFileStore {
    fn transaction<T, F>(&self, work: F) -> Result<T, SchedulerError>
    where
        F: FnOnce(&mut StoreTransaction) -> Result<T, SchedulerError>,
    {
        let lock = self.lock(true)?;
        let mut tx = StoreTransaction::new(self.load()?);
        let value = work(&mut tx)?;
        self.publish(tx.state())?;
        drop(lock);
        Ok(value)
    }

    fn read<T, F>(&self, work: F) -> Result<T, SchedulerError>
    where
        F: FnOnce(&StoreTransaction) -> Result<T, SchedulerError>,
    {
        let lock = self.lock(false)?;
        let state = self.load()?;
        drop(lock);
        work(&StoreTransaction::new(state))
    }
}
