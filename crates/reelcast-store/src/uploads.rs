//! Uploaded source files.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use tokio::fs;
use tracing::info;
use uuid::Uuid;

use crate::analysis::MediaStore;
use crate::error::{StoreError, StoreResult};
use crate::layout::StoreLayout;

/// One uploaded source file, as listed by the files endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct UploadedFile {
    pub filename: String,
    pub size: u64,
    pub uploaded_at: DateTime<Utc>,
    pub url: String,
}

impl MediaStore {
    /// Unique stored name for an upload, keeping the original extension.
    pub fn stored_filename(original_name: &str) -> String {
        let ext = original_name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or("mp4");
        format!("video-{}.{}", Uuid::new_v4(), ext.to_ascii_lowercase())
    }

    /// Write an uploaded payload under the store root.
    pub async fn save_upload(&self, stored_name: &str, bytes: &[u8]) -> StoreResult<PathBuf> {
        let path = self.layout().upload_path(stored_name)?;
        fs::write(&path, bytes).await?;
        info!(filename = stored_name, size = bytes.len(), "Upload stored");
        Ok(path)
    }

    /// Whether an uploaded source file exists.
    pub async fn upload_exists(&self, filename: &str) -> StoreResult<bool> {
        let path = self.layout().upload_path(filename)?;
        Ok(fs::try_exists(&path).await?)
    }

    /// List uploaded source files, newest first. Renditions and records
    /// live under `processed/` and are not included.
    pub async fn list_uploads(&self) -> StoreResult<Vec<UploadedFile>> {
        let mut files = Vec::new();

        let mut entries = match fs::read_dir(self.layout().root()).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(files),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let meta = entry.metadata().await?;
            if !meta.is_file() {
                continue;
            }
            let filename = entry.file_name().to_string_lossy().to_string();
            let uploaded_at = meta
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());

            files.push(UploadedFile {
                url: StoreLayout::upload_url(&filename),
                filename,
                size: meta.len(),
                uploaded_at,
            });
        }

        files.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        Ok(files)
    }

    /// Delete an uploaded source file.
    pub async fn delete_upload(&self, filename: &str) -> StoreResult<()> {
        let path = self.layout().upload_path(filename)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                info!(filename, "Upload deleted");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::not_found(filename))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_stored_filename_keeps_extension() {
        let name = MediaStore::stored_filename("My Clip.MOV");
        assert!(name.starts_with("video-"));
        assert!(name.ends_with(".mov"));

        // No usable extension falls back to mp4
        let name = MediaStore::stored_filename("clip");
        assert!(name.ends_with(".mp4"));
        let name = MediaStore::stored_filename("weird.ext/../");
        assert!(name.ends_with(".mp4"));
    }

    #[test]
    fn test_stored_filenames_are_unique() {
        let a = MediaStore::stored_filename("clip.mp4");
        let b = MediaStore::stored_filename("clip.mp4");
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_save_list_delete_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = MediaStore::new(dir.path());
        store.init().await.unwrap();

        store.save_upload("video-1.mp4", b"aaaa").await.unwrap();
        store.save_upload("video-2.mp4", b"bb").await.unwrap();

        assert!(store.upload_exists("video-1.mp4").await.unwrap());

        let files = store.list_uploads().await.unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| f.url.starts_with("/uploads/")));

        store.delete_upload("video-1.mp4").await.unwrap();
        assert!(!store.upload_exists("video-1.mp4").await.unwrap());

        let err = store.delete_upload("video-1.mp4").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_listing_skips_processed_dir() {
        let dir = TempDir::new().unwrap();
        let store = MediaStore::new(dir.path());
        store.init().await.unwrap();

        store.save_upload("video-1.mp4", b"aaaa").await.unwrap();
        fs::write(store.layout().processed_dir().join("video-1_tiktok.mp4"), b"r")
            .await
            .unwrap();

        let files = store.list_uploads().await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].filename, "video-1.mp4");
    }
}
