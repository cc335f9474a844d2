//! # Vignette FileSystem Storage
//!
//! A local filesystem backend for Vignette, meant for development and tests.
//!
//! This crate implements the [`StorageBackend`] trait, storing objects
//! directly in the file system.
//!
//! ## Features
//!
//! * **Atomic Writes**: Uses temporary files and rename operations to ensure objects are not read partially.
//! * **Content Types**: Kept next to the objects in a `types/` directory.
//!
//! Presigned URLs are not supported.
//!
//! ## Usage
//!
//! ```no_run
//! use vignette_fs::FileSystemStorage;
//!
//! let storage = FileSystemStorage::new("./vignette_data");
//! ```

use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;
use vignette_core::prelude::*;

const OBJECTS_DIR: &str = "objects";
const TYPES_DIR: &str = "types";

/// `{path}.tmp`; keys ending in `.tmp` are rejected, so this never names an object.
fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

async fn atomic_write(path: &Path, data: &[u8]) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let tmp = tmp_path(path);

    fs::write(&tmp, data).await?;
    fs::rename(&tmp, path).await?;

    Ok(())
}

async fn remove_if_present(path: &Path) -> Result<(), StorageError> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(StorageError::Io(e)),
    }
}

#[derive(Clone)]
pub struct FileSystemStorage {
    root: PathBuf,
}

impl FileSystemStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { root: path.into() }
    }

    /// Keys map to a single file name; anything that could escape the root is rejected.
    fn check_key(key: &str) -> Result<(), StorageError> {
        let bad = key.is_empty()
            || key == "."
            || key == ".."
            || key.contains(['/', '\\'])
            || key.ends_with(".tmp");
        if bad {
            return Err(StorageError::InvalidRequest(format!(
                "Invalid storage key: {key:?}"
            )));
        }
        Ok(())
    }

    fn object_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        Self::check_key(key)?;
        Ok(self.root.join(OBJECTS_DIR).join(key))
    }

    fn type_path(&self, key: &str) -> PathBuf {
        self.root.join(TYPES_DIR).join(key)
    }
}

impl StorageBackend for FileSystemStorage {
    async fn put_object(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let path = self.object_path(key)?;
        atomic_write(&path, &data).await?;
        atomic_write(&self.type_path(key), content_type.as_bytes()).await?;
        debug!(key, size = data.len(), "Stored object on disk");
        Ok(())
    }

    async fn get_object(&self, key: &str) -> Result<StoredObject, StorageError> {
        let path = self.object_path(key)?;
        let data = match fs::read(&path).await {
            Ok(data) => Bytes::from(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(key.to_string()));
            }
            Err(e) => return Err(StorageError::Io(e)),
        };

        let content_type = fs::read_to_string(self.type_path(key))
            .await
            .ok()
            .filter(|ct| !ct.is_empty());

        Ok(StoredObject { data, content_type })
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        let path = self.object_path(key)?;
        Ok(fs::try_exists(&path).await?)
    }

    async fn delete_object(&self, key: &str) -> Result<(), StorageError> {
        let path = self.object_path(key)?;
        remove_if_present(&path).await?;
        remove_if_present(&self.type_path(key)).await
    }
}
