//! Processing trigger and status polling handlers.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

use reelcast_models::{OriginalAnalysis, ProcessingFailure, ProcessingStatus, RenditionResult};

use crate::error::{ApiError, ApiResult};
use crate::services::processing::spawn_processing;
use crate::state::AppState;

/// Request body for the processing trigger.
#[derive(Debug, Deserialize)]
pub struct ProcessRequest {
    pub platforms: Vec<String>,
}

/// Immediate acknowledgement; the actual work runs in the background.
#[derive(Serialize)]
pub struct ProcessAccepted {
    pub accepted: bool,
    pub platforms: Vec<String>,
    pub status: ProcessingStatus,
}

/// Kick off rendition processing for the selected platforms.
///
/// Validation happens here, synchronously; everything after the response is
/// a detached background task that reports into the analysis record.
pub async fn request_processing(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    Json(request): Json<ProcessRequest>,
) -> ApiResult<Json<ProcessAccepted>> {
    if request.platforms.is_empty() {
        return Err(ApiError::bad_request("Please select at least one platform"));
    }

    if !state.store.upload_exists(&filename).await? {
        return Err(ApiError::not_found("Video file not found"));
    }

    info!(
        filename = %filename,
        platforms = ?request.platforms,
        "Processing requested"
    );

    spawn_processing(state, filename, request.platforms.clone());

    Ok(Json(ProcessAccepted {
        accepted: true,
        platforms: request.platforms,
        status: ProcessingStatus::Processing,
    }))
}

/// Status response, one of four shapes keyed by `status`.
#[derive(Serialize)]
pub struct StatusResponse {
    pub status: ProcessingStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original: Option<OriginalAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed: Option<BTreeMap<String, RenditionResult>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ProcessingFailure>,
}

/// Poll processing status for a file.
///
/// `completed` reports that at least one variant has a terminal entry, not
/// that every requested variant finished; clients inspect `processed` for
/// the variants they asked about. This matches the behavior clients have
/// polled against since the service first shipped.
pub async fn get_status(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> ApiResult<Json<StatusResponse>> {
    if let Some(record) = state.store.load_analysis(&filename).await? {
        let status = record.status();
        let processed = if record.processed.is_empty() {
            None
        } else {
            Some(record.processed)
        };
        return Ok(Json(StatusResponse {
            status,
            original: Some(record.original),
            processed,
            error: None,
        }));
    }

    if let Some(failure) = state.store.load_failure(&filename).await? {
        return Ok(Json(StatusResponse {
            status: ProcessingStatus::Failed,
            original: None,
            processed: None,
            error: Some(failure),
        }));
    }

    Ok(Json(StatusResponse {
        status: ProcessingStatus::Analyzing,
        original: None,
        processed: None,
        error: None,
    }))
}
