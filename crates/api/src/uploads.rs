//! Local disk storage for uploaded slide images.

use std::io;
use std::path::{Path, PathBuf};

use pitchdeck_core::upload::{local_upload_name, upload_file_name, upload_url};

/// Writes uploads into one directory, served at `/uploads`.
#[derive(Debug, Clone)]
pub struct UploadStorage {
    dir: PathBuf,
}

impl UploadStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Store `bytes` under a fresh name and return its public URL.
    pub async fn save(&self, ext: &str, bytes: &[u8]) -> io::Result<String> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let name = upload_file_name(ext, chrono::Utc::now());
        tokio::fs::write(self.dir.join(&name), bytes).await?;
        Ok(upload_url(&name))
    }

    /// Delete the file behind `url` if it is one of ours.
    ///
    /// Returns `false` for foreign URLs and for files that are already gone.
    pub async fn remove(&self, url: &str) -> io::Result<bool> {
        let Some(name) = local_upload_name(url) else {
            return Ok(false);
        };
        match tokio::fs::remove_file(self.dir.join(name)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_then_remove() {
        let dir = tempfile::tempdir().unwrap();
        let storage = UploadStorage::new(dir.path().join("uploads"));

        let url = storage.save("png", b"bytes").await.unwrap();
        let name = url.strip_prefix("/uploads/").unwrap();
        assert!(name.starts_with("slide-") && name.ends_with(".png"));
        assert!(storage.dir().join(name).exists());

        assert!(storage.remove(&url).await.unwrap());
        assert!(!storage.dir().join(name).exists());
        assert!(!storage.remove(&url).await.unwrap());
    }

    #[tokio::test]
    async fn foreign_urls_are_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let outside = dir.path().join("keep.png");
        std::fs::write(&outside, b"x").unwrap();
        let storage = UploadStorage::new(dir.path().join("uploads"));

        assert!(!storage.remove("https://cdn.example.com/keep.png").await.unwrap());
        assert!(!storage.remove("/uploads/../keep.png").await.unwrap());
        assert!(outside.exists());
    }
}
