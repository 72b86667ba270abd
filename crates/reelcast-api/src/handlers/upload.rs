//! Upload handlers: multipart intake, file listing, deletion.
//!
//! Upload-time analysis (probe + camera format classification) runs
//! synchronously so the response already tells the client what the source
//! looks like; rendition work happens later via the processing endpoint.

use axum::extract::{Multipart, Path, State};
use axum::Json;
use serde::Serialize;
use tracing::{info, warn};

use reelcast_media::{probe_or_fallback, MediaError};
use reelcast_models::{AnalysisRecord, CameraFormat, ProcessingFailure, VideoMetadata};
use reelcast_store::{MediaStore, StoreLayout, UploadedFile};

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;

/// Accepted upload content types.
pub const ALLOWED_VIDEO_TYPES: &[&str] = &[
    "video/mp4",
    "video/avi",
    "video/mov",
    "video/wmv",
    "video/flv",
    "video/webm",
];

/// Multipart field carrying the video payload.
const VIDEO_FIELD: &str = "video";

/// Upload response.
#[derive(Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub file: UploadedVideo,
}

#[derive(Serialize)]
pub struct UploadedVideo {
    pub filename: String,
    pub original_name: String,
    pub size: u64,
    pub url: String,
    pub metadata: VideoMetadata,
    pub camera_format: CameraFormat,
}

/// Upload a video and analyze it in place.
pub async fn upload_video(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let mut payload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some(VIDEO_FIELD) {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        if !ALLOWED_VIDEO_TYPES.contains(&content_type.as_str()) {
            return Err(ApiError::bad_request(
                "Invalid file type. Only video files are allowed.",
            ));
        }

        let original_name = field.file_name().unwrap_or("upload.mp4").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {e}")))?;

        payload = Some((original_name, bytes));
        break;
    }

    let Some((original_name, bytes)) = payload else {
        return Err(ApiError::bad_request("No video file uploaded"));
    };

    let stored_name = MediaStore::stored_filename(&original_name);
    let stored_path = state.store.save_upload(&stored_name, &bytes).await?;

    // Analyze now; renditions are requested separately
    let metadata = match probe_or_fallback(&stored_path).await {
        Ok(metadata) => metadata,
        Err(MediaError::NoVideoStream(path)) => {
            warn!(filename = %stored_name, "Upload has no video stream");
            let failure =
                ProcessingFailure::new(format!("No video stream found in {}", path.display()), vec![]);
            state.store.record_failure(&stored_name, &failure).await?;
            return Err(ApiError::unprocessable("No video stream found"));
        }
        Err(e) => return Err(e.into()),
    };

    let camera_format = CameraFormat::classify(&metadata);

    let record = AnalysisRecord::new(metadata.clone(), camera_format);
    state.store.save_analysis(&stored_name, &record).await?;

    metrics::record_upload(camera_format.as_str());
    info!(
        filename = %stored_name,
        camera_format = %camera_format,
        width = metadata.width,
        height = metadata.height,
        duration_secs = metadata.duration,
        "Video uploaded and analyzed"
    );

    Ok(Json(UploadResponse {
        message: "Video uploaded and analyzed successfully".to_string(),
        file: UploadedVideo {
            url: StoreLayout::upload_url(&stored_name),
            filename: stored_name,
            original_name,
            size: bytes.len() as u64,
            metadata,
            camera_format,
        },
    }))
}

/// Files listing response.
#[derive(Serialize)]
pub struct FilesResponse {
    pub files: Vec<UploadedFile>,
}

/// List uploaded files, newest first.
pub async fn list_files(State(state): State<AppState>) -> ApiResult<Json<FilesResponse>> {
    let files = state.store.list_uploads().await?;
    Ok(Json(FilesResponse { files }))
}

/// Delete response.
#[derive(Serialize)]
pub struct DeleteResponse {
    pub message: String,
}

/// Delete an uploaded file.
pub async fn delete_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    state.store.delete_upload(&filename).await?;
    Ok(Json(DeleteResponse {
        message: "File deleted successfully".to_string(),
    }))
}
