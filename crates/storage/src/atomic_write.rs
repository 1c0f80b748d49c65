//! Crash-safe record writes.
//!
//! A record is written to `{path}.tmp`, flushed with `sync_all()`, then
//! renamed over the final path. A crash mid-write leaves the previous record
//! intact plus a stray `.tmp` file, which [`remove_stale_tmp_files`] clears
//! the next time the directory is opened.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use bevy::prelude::*;

pub const TMP_SUFFIX: &str = "tmp";

pub fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(TMP_SUFFIX);
    PathBuf::from(name)
}

/// Atomically replaces the contents of `path` with `data`.
pub fn atomic_write(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let tmp = tmp_path(path);
    let mut file = File::create(&tmp)?;
    file.write_all(data)?;
    file.sync_all()?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Removes `*.tmp` files left in `dir` by interrupted writes.
/// Returns how many were removed.
pub fn remove_stale_tmp_files(dir: &Path) -> std::io::Result<usize> {
    let mut removed = 0;
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == TMP_SUFFIX) {
            match fs::remove_file(&path) {
                Ok(()) => {
                    info!("Storage: removed stale tmp file {}", path.display());
                    removed += 1;
                }
                Err(e) => warn!("Storage: failed to remove tmp file {}: {}", path.display(), e),
            }
        }
    }
    Ok(removed)
}

#[cfg(test)]
pub(crate) fn test_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("jalwatch_storage_test_{name}"));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atomic_write_replaces_contents() {
        let dir = test_dir("replaces");
        let path = dir.join("campaigns.json");

        atomic_write(&path, b"[]").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"[]");
        atomic_write(&path, b"[{\"id\":\"c\"}]").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"[{\"id\":\"c\"}]");
        assert!(!tmp_path(&path).exists());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_atomic_write_over_leftover_tmp() {
        let dir = test_dir("leftover");
        let path = dir.join("region_tree.json");
        fs::write(&path, b"original").unwrap();
        fs::write(tmp_path(&path), b"partial").unwrap();

        atomic_write(&path, b"fresh").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"fresh");
        assert!(!tmp_path(&path).exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let dir = test_dir("parents");
        let path = dir.join("nested/store/campaigns.json");
        atomic_write(&path, b"[]").unwrap();
        assert!(path.exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_remove_stale_tmp_files_only_touches_tmp() {
        let dir = test_dir("stale");
        fs::write(dir.join("campaigns.json"), b"[]").unwrap();
        fs::write(dir.join("campaigns.json.tmp"), b"[").unwrap();
        fs::write(dir.join("region_tree.json.tmp"), b"[").unwrap();

        assert_eq!(remove_stale_tmp_files(&dir).unwrap(), 2);
        assert!(dir.join("campaigns.json").exists());
        assert!(!dir.join("campaigns.json.tmp").exists());
        assert_eq!(remove_stale_tmp_files(&dir).unwrap(), 0);
        let _ = fs::remove_dir_all(&dir);
    }
}
