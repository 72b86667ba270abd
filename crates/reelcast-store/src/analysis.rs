//! Analysis and failure record persistence.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use reelcast_models::{AnalysisRecord, ProcessingFailure};

use crate::error::StoreResult;
use crate::layout::StoreLayout;

/// The on-disk store: uploaded sources, renditions, and the JSON records
/// the status endpoint reads. One instance is shared across requests.
#[derive(Debug, Clone)]
pub struct MediaStore {
    layout: StoreLayout,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            layout: StoreLayout::new(root),
        }
    }

    pub fn layout(&self) -> &StoreLayout {
        &self.layout
    }

    /// Create the directory tree if it does not exist yet.
    pub async fn init(&self) -> StoreResult<()> {
        fs::create_dir_all(self.layout.processed_dir()).await?;
        Ok(())
    }

    /// Load the analysis record for a file, if one was written.
    pub async fn load_analysis(&self, filename: &str) -> StoreResult<Option<AnalysisRecord>> {
        read_json_opt(&self.layout.analysis_path(filename)?).await
    }

    /// Persist the analysis record for a file, replacing any previous one.
    ///
    /// Called after every variant so that a poll mid-run observes
    /// monotonically increasing progress.
    pub async fn save_analysis(&self, filename: &str, record: &AnalysisRecord) -> StoreResult<()> {
        let path = self.layout.analysis_path(filename)?;
        write_json_atomic(&path, record).await?;
        debug!(filename, entries = record.processed.len(), "Analysis record saved");
        Ok(())
    }

    /// Load the file-level failure record, if one was written.
    pub async fn load_failure(&self, filename: &str) -> StoreResult<Option<ProcessingFailure>> {
        read_json_opt(&self.layout.failure_path(filename)?).await
    }

    /// Persist a file-level failure record.
    pub async fn record_failure(
        &self,
        filename: &str,
        failure: &ProcessingFailure,
    ) -> StoreResult<()> {
        let path = self.layout.failure_path(filename)?;
        write_json_atomic(&path, failure).await
    }
}

async fn read_json_opt<T: DeserializeOwned>(path: &Path) -> StoreResult<Option<T>> {
    match fs::read(path).await {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Write JSON to a sibling temp file, then rename over the target so
/// readers never observe a partial record.
async fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> StoreResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    let tmp = path.with_extension("json.tmp");
    let bytes = serde_json::to_vec_pretty(value)?;
    fs::write(&tmp, &bytes).await?;

    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(e.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelcast_models::{CameraFormat, ProcessingStatus, RenditionResult, VideoMetadata};
    use tempfile::TempDir;

    fn record() -> AnalysisRecord {
        let meta = VideoMetadata::new(1280, 720, 12.0, 30.0, "h264", 0, 0);
        let format = CameraFormat::classify(&meta);
        AnalysisRecord::new(meta, format)
    }

    #[tokio::test]
    async fn test_analysis_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = MediaStore::new(dir.path());
        store.init().await.unwrap();

        assert!(store.load_analysis("clip.mp4").await.unwrap().is_none());

        store.save_analysis("clip.mp4", &record()).await.unwrap();

        let loaded = store.load_analysis("clip.mp4").await.unwrap().unwrap();
        assert_eq!(loaded.original.camera_format, CameraFormat::LandscapeSd);
        assert_eq!(loaded.status(), ProcessingStatus::Analyzed);
    }

    #[tokio::test]
    async fn test_incremental_saves_accumulate_entries() {
        let dir = TempDir::new().unwrap();
        let store = MediaStore::new(dir.path());
        store.init().await.unwrap();

        let mut rec = record();
        rec.record_result("bogus", RenditionResult::failed("Platform configuration not found", None));
        store.save_analysis("clip.mp4", &rec).await.unwrap();

        rec.record_result(
            "tiktok",
            RenditionResult::failed("transcoder exploded", None),
        );
        store.save_analysis("clip.mp4", &rec).await.unwrap();

        let loaded = store.load_analysis("clip.mp4").await.unwrap().unwrap();
        assert_eq!(loaded.processed.len(), 2);
        assert_eq!(loaded.status(), ProcessingStatus::Completed);
    }

    #[tokio::test]
    async fn test_failure_record_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = MediaStore::new(dir.path());
        store.init().await.unwrap();

        assert!(store.load_failure("clip.mp4").await.unwrap().is_none());

        let failure = ProcessingFailure::new("No video stream found", vec!["tiktok".into()]);
        store.record_failure("clip.mp4", &failure).await.unwrap();

        let loaded = store.load_failure("clip.mp4").await.unwrap().unwrap();
        assert_eq!(loaded.error, "No video stream found");
        assert_eq!(loaded.platforms, vec!["tiktok".to_string()]);
    }

    #[tokio::test]
    async fn test_no_temp_files_left_behind() {
        let dir = TempDir::new().unwrap();
        let store = MediaStore::new(dir.path());
        store.init().await.unwrap();
        store.save_analysis("clip.mp4", &record()).await.unwrap();

        let mut entries = fs::read_dir(store.layout().processed_dir()).await.unwrap();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            let name = entry.file_name();
            assert!(
                !name.to_string_lossy().ends_with(".tmp"),
                "temp file left behind: {name:?}"
            );
        }
    }
}
