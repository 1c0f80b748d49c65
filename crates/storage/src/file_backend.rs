//! On-disk backend: one `<key>.json` file per record.

use std::fs;
use std::path::{Path, PathBuf};

use bevy::prelude::*;

use crate::atomic_write::{atomic_write, remove_stale_tmp_files};
use crate::backend::DurableBackend;
use crate::StorageError;

pub const RECORD_EXTENSION: &str = "json";

/// One `<key>.json` file per record under `dir`, written atomically.
pub struct FileBackend {
    dir: PathBuf,
    stale_tmp_removed: usize,
}

impl FileBackend {
    /// Opens (creating if needed) `dir` and clears tmp files from
    /// interrupted writes.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        let stale_tmp_removed = remove_stale_tmp_files(&dir)?;
        if stale_tmp_removed > 0 {
            warn!(
                "Storage: {} interrupted write(s) found in {}",
                stale_tmp_removed,
                dir.display()
            );
        }
        Ok(Self {
            dir,
            stale_tmp_removed,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn stale_tmp_removed(&self) -> usize {
        self.stale_tmp_removed
    }

    pub fn record_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.{RECORD_EXTENSION}"))
    }
}

impl DurableBackend for FileBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.record_path(key)) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        atomic_write(&self.record_path(key), value.as_bytes())?;
        Ok(())
    }
}
