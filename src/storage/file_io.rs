//! File I/O utilities with atomic writes
//!
//! Provides safe file operations that won't corrupt data on failure.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::ShoplistError;

/// Read a whole file
pub fn read_bytes<P: AsRef<Path>>(path: P) -> Result<Vec<u8>, ShoplistError> {
    let path = path.as_ref();
    fs::read(path)
        .map_err(|e| ShoplistError::Storage(format!("Failed to read {}: {}", path.display(), e)))
}

/// Sibling path used while a file is being rewritten (`<file name>.tmp`)
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("file"));
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write bytes to a file atomically (write to temp, then rename)
///
/// The file is either completely written or not modified at all. The temp
/// file has a `.tmp` extension, which no list scan picks up.
pub fn write_atomic<P: AsRef<Path>>(path: P, data: &[u8]) -> Result<(), ShoplistError> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            ShoplistError::Storage(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    // Same directory as the target so the rename stays atomic
    let temp_path = temp_path_for(path);

    let file = File::create(&temp_path)
        .map_err(|e| ShoplistError::Storage(format!("Failed to create temp file: {}", e)))?;

    let mut writer = BufWriter::new(file);
    writer
        .write_all(data)
        .and_then(|()| writer.flush())
        .map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            ShoplistError::Storage(format!("Failed to write data: {}", e))
        })?;

    writer
        .get_ref()
        .sync_all()
        .map_err(|e| ShoplistError::Storage(format!("Failed to sync data: {}", e)))?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        ShoplistError::Storage(format!(
            "Failed to replace {}: {}",
            path.display(),
            e
        ))
    })?;

    Ok(())
}

/// Write JSON to a file atomically
pub fn write_json_atomic<T, P>(path: P, data: &T) -> Result<(), ShoplistError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let bytes = serde_json::to_vec_pretty(data)
        .map_err(|e| ShoplistError::Storage(format!("Failed to serialize data: {}", e)))?;
    write_atomic(path, &bytes)
}

/// Remove a file, treating an already-missing file as removed
///
/// Returns `false` when there was nothing to remove.
pub fn remove_file_if_exists<P: AsRef<Path>>(path: P) -> Result<bool, ShoplistError> {
    let path = path.as_ref();
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(ShoplistError::Storage(format!(
            "Failed to delete {}: {}",
            path.display(),
            e
        ))),
    }
}
