//! Disk layout and public URL mapping.

use std::path::{Path, PathBuf};

use crate::error::{StoreError, StoreResult};

/// Subdirectory holding renditions and JSON records.
pub const PROCESSED_DIR: &str = "processed";

/// URL prefix under which the store root is served.
pub const PUBLIC_PREFIX: &str = "/uploads";

/// Rendition container extension.
const RENDITION_EXT: &str = "mp4";

/// Maps filenames and variant ids onto paths under the store root.
///
/// Filenames arrive from URLs and multipart fields, so every method that
/// touches the filesystem validates them first.
#[derive(Debug, Clone)]
pub struct StoreLayout {
    root: PathBuf,
}

impl StoreLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.root.join(PROCESSED_DIR)
    }

    /// Path of an uploaded source file.
    pub fn upload_path(&self, filename: &str) -> StoreResult<PathBuf> {
        Ok(self.root.join(sanitize(filename)?))
    }

    /// Path of the per-file analysis record.
    pub fn analysis_path(&self, filename: &str) -> StoreResult<PathBuf> {
        Ok(self
            .processed_dir()
            .join(format!("{}_analysis.json", sanitize(filename)?)))
    }

    /// Path of the per-file failure record.
    pub fn failure_path(&self, filename: &str) -> StoreResult<PathBuf> {
        Ok(self
            .processed_dir()
            .join(format!("{}_error.json", sanitize(filename)?)))
    }

    /// Path of one variant's rendition output.
    pub fn rendition_path(&self, filename: &str, variant: &str) -> StoreResult<PathBuf> {
        Ok(self.processed_dir().join(rendition_name(filename, variant)?))
    }

    /// Public URL of one variant's rendition output.
    pub fn rendition_url(&self, filename: &str, variant: &str) -> StoreResult<String> {
        Ok(format!(
            "{PUBLIC_PREFIX}/{PROCESSED_DIR}/{}",
            rendition_name(filename, variant)?
        ))
    }

    /// Public URL of an uploaded source file.
    pub fn upload_url(filename: &str) -> String {
        format!("{PUBLIC_PREFIX}/{filename}")
    }
}

fn rendition_name(filename: &str, variant: &str) -> StoreResult<String> {
    let stem = file_stem(sanitize(filename)?);
    // The variant lands in the output filename, so it gets the same checks
    let variant = sanitize(variant)?;
    Ok(format!("{stem}_{variant}.{RENDITION_EXT}"))
}

/// Strip the final extension, keeping earlier dots.
pub fn file_stem(filename: &str) -> &str {
    match filename.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => filename,
    }
}

/// Reject names that could escape the store root.
fn sanitize(name: &str) -> StoreResult<&str> {
    if name.is_empty()
        || name.contains('/')
        || name.contains('\\')
        || name.contains("..")
        || name.starts_with('.')
    {
        return Err(StoreError::invalid_filename(name));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_land_under_root() {
        let layout = StoreLayout::new("/data/uploads");

        assert_eq!(
            layout.upload_path("clip.mp4").unwrap(),
            PathBuf::from("/data/uploads/clip.mp4")
        );
        assert_eq!(
            layout.analysis_path("clip.mp4").unwrap(),
            PathBuf::from("/data/uploads/processed/clip.mp4_analysis.json")
        );
        assert_eq!(
            layout.rendition_path("clip.mp4", "tiktok").unwrap(),
            PathBuf::from("/data/uploads/processed/clip_tiktok.mp4")
        );
    }

    #[test]
    fn test_rendition_url() {
        let layout = StoreLayout::new("/data/uploads");
        assert_eq!(
            layout.rendition_url("clip.mp4", "instagram_feed").unwrap(),
            "/uploads/processed/clip_instagram_feed.mp4"
        );
    }

    #[test]
    fn test_traversal_names_rejected() {
        let layout = StoreLayout::new("/data/uploads");
        for bad in ["../etc/passwd", "a/b.mp4", "a\\b.mp4", "", ".hidden", "a..b"] {
            assert!(layout.upload_path(bad).is_err(), "{bad:?} should be rejected");
        }
        assert!(layout.rendition_path("clip.mp4", "../tiktok").is_err());
    }

    #[test]
    fn test_file_stem_keeps_inner_dots() {
        assert_eq!(file_stem("video-abc.final.mp4"), "video-abc.final");
        assert_eq!(file_stem("noext"), "noext");
    }
}
