//! Storage adapters for sources and generated artifacts.
//!
//! The engine only ever touches storage through the [`Storage`] trait, so
//! the generation logic can run against the host filesystem, an in-memory
//! map, or anything else that can hold text files.

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Text-file storage as seen by the generation engine.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Read a file as UTF-8.
    ///
    /// Every failure collapses to `None`: a missing source is a normal
    /// decline, not an error, and the engine never distinguishes
    /// "not found" from "permission denied".
    async fn read_file(&self, path: &Path) -> Option<String>;

    /// Create or overwrite a file.
    async fn write_file(&self, path: &Path, data: &str) -> io::Result<()>;

    /// Remove a file. Removing an already-absent file is a no-op.
    async fn rm(&self, path: &Path) -> io::Result<()>;
}

/// Host filesystem storage.
///
/// Writes go to a temp file in the target directory followed by a rename,
/// so readers observe either the old contents or the new, never a partial
/// write.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskStorage;

#[async_trait]
impl Storage for DiskStorage {
    async fn read_file(&self, path: &Path) -> Option<String> {
        fs::read_to_string(path).await.ok()
    }

    async fn write_file(&self, path: &Path, data: &str) -> io::Result<()> {
        let parent = path.parent().unwrap_or(Path::new("."));

        // Temp file in the same directory keeps the rename on one filesystem
        let mut temp_path = parent.to_path_buf();
        temp_path.push(format!(
            ".{}.tmp.{}",
            path.file_name().and_then(|n| n.to_str()).unwrap_or("file"),
            std::process::id()
        ));

        {
            let mut file = fs::File::create(&temp_path).await?;
            file.write_all(data.as_bytes()).await?;
            file.sync_all().await?;
        }

        match fs::rename(&temp_path, path).await {
            Ok(()) => Ok(()),
            Err(e) => {
                // On Windows, rename can fail if target exists. Try copy + remove as fallback.
                if cfg!(windows) {
                    fs::copy(&temp_path, path).await?;
                    let _ = fs::remove_file(&temp_path).await;
                    Ok(())
                } else {
                    let _ = fs::remove_file(&temp_path).await;
                    Err(e)
                }
            }
        }
    }

    async fn rm(&self, path: &Path) -> io::Result<()> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// In-memory storage for tests and virtual pipelines.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    files: RwLock<FxHashMap<PathBuf, String>>,
}

impl MemoryStorage {
    /// Create empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a file in place without going through the engine.
    pub fn seed(&self, path: impl Into<PathBuf>, data: impl Into<String>) {
        self.files.write().unwrap().insert(path.into(), data.into());
    }

    /// Current contents of a file.
    #[must_use]
    pub fn contents(&self, path: &Path) -> Option<String> {
        self.files.read().unwrap().get(path).cloned()
    }

    /// Whether a file exists.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.files.read().unwrap().contains_key(path)
    }

    /// Number of stored files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.read().unwrap().len()
    }

    /// Whether storage holds no files.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.read().unwrap().is_empty()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn read_file(&self, path: &Path) -> Option<String> {
        self.files.read().unwrap().get(path).cloned()
    }

    async fn write_file(&self, path: &Path, data: &str) -> io::Result<()> {
        self.files
            .write()
            .unwrap()
            .insert(path.to_path_buf(), data.to_string());
        Ok(())
    }

    async fn rm(&self, path: &Path) -> io::Result<()> {
        self.files.write().unwrap().remove(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_disk_read_missing_is_none() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.txt");
        assert_eq!(DiskStorage.read_file(&missing).await, None);
    }

    #[tokio::test]
    async fn test_disk_write_then_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.txt");

        DiskStorage.write_file(&path, "hello").await.unwrap();
        assert_eq!(
            DiskStorage.read_file(&path).await.as_deref(),
            Some("hello")
        );

        // Overwrite
        DiskStorage.write_file(&path, "world").await.unwrap();
        assert_eq!(
            DiskStorage.read_file(&path).await.as_deref(),
            Some("world")
        );
    }

    #[tokio::test]
    async fn test_disk_write_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.txt");

        DiskStorage.write_file(&path, "content").await.unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_disk_rm_is_idempotent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gone.txt");

        DiskStorage.write_file(&path, "x").await.unwrap();
        DiskStorage.rm(&path).await.unwrap();
        assert_eq!(DiskStorage.read_file(&path).await, None);

        // Second removal of the same path
        DiskStorage.rm(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_disk_read_non_utf8_is_none() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("binary.bin");
        std::fs::write(&path, [0x48u8, 0x80, 0x81]).unwrap();

        assert_eq!(DiskStorage.read_file(&path).await, None);
    }

    #[tokio::test]
    async fn test_memory_round_trip() {
        let storage = MemoryStorage::new();
        assert!(storage.is_empty());

        storage.seed("/a.txt", "seeded");
        assert_eq!(
            storage.read_file(Path::new("/a.txt")).await.as_deref(),
            Some("seeded")
        );

        storage.write_file(Path::new("/b.txt"), "written").await.unwrap();
        assert_eq!(storage.len(), 2);
        assert_eq!(storage.contents(Path::new("/b.txt")).as_deref(), Some("written"));

        storage.rm(Path::new("/a.txt")).await.unwrap();
        assert!(!storage.contains(Path::new("/a.txt")));

        // Removing a missing file is fine
        storage.rm(Path::new("/a.txt")).await.unwrap();
    }
}
