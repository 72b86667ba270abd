//! Background rendition processing.
//!
//! One run covers one (file, platform list) request. Variants are rendered
//! strictly one after another, bounding transcoder load to a single job per
//! file, and the analysis record is persisted after every variant so a
//! concurrent status poll sees progress as it happens. A variant failure is
//! recorded against that variant only; the run always continues to the next
//! one.

use tracing::{error, info, warn};

use reelcast_media::probe_or_fallback;
use reelcast_models::{
    plan_for_format, AnalysisRecord, CameraFormat, ProcessingFailure, RenditionResult,
};

use crate::error::ApiResult;
use crate::metrics;
use crate::state::AppState;

/// Error message recorded for variants the planner does not know.
pub const PLATFORM_CONFIG_MISSING: &str = "Platform configuration not found";

/// Start a processing run detached from the calling request.
///
/// The handler has already validated the request; from here on every
/// outcome, success or failure, lands in the persisted record rather than
/// in an HTTP response.
pub fn spawn_processing(state: AppState, filename: String, platforms: Vec<String>) {
    tokio::spawn(async move {
        match process_platforms(&state, &filename, &platforms).await {
            Ok(()) => {
                metrics::record_processing_run("completed");
            }
            Err(e) => {
                error!(filename = %filename, error = %e, "Processing run failed");
                metrics::record_processing_run("failed");
                let failure = ProcessingFailure::new(e.to_string(), platforms);
                if let Err(e) = state.store.record_failure(&filename, &failure).await {
                    error!(filename = %filename, error = %e, "Failed to persist failure record");
                }
            }
        }
    });
}

/// Process the requested platform variants for one file.
///
/// Returns an error only for file-level problems (no analysis record can be
/// created, or the record cannot be persisted); per-variant problems are
/// folded into the record as failed entries.
pub async fn process_platforms(
    state: &AppState,
    filename: &str,
    platforms: &[String],
) -> ApiResult<()> {
    let store = &state.store;
    let input = store.layout().upload_path(filename)?;

    // Reuse the upload-time analysis when it exists; re-analyze otherwise
    let mut record = match store.load_analysis(filename).await? {
        Some(record) => record,
        None => {
            let metadata = probe_or_fallback(&input).await?;
            let camera_format = CameraFormat::classify(&metadata);
            let record = AnalysisRecord::new(metadata, camera_format);
            store.save_analysis(filename, &record).await?;
            record
        }
    };

    let plans = plan_for_format(record.original.camera_format);

    info!(
        filename,
        camera_format = %record.original.camera_format,
        requested = platforms.len(),
        "Starting rendition processing"
    );

    for variant in platforms {
        let result = match plans.get(variant) {
            None => {
                warn!(filename, variant = %variant, "No configuration for platform");
                metrics::record_rendition(variant, "config_missing");
                RenditionResult::failed(PLATFORM_CONFIG_MISSING, None)
            }
            Some(config) => {
                let output = store.layout().rendition_path(filename, variant)?;
                match state
                    .engine
                    .render(&input, &output, config, &record.original.metadata)
                    .await
                {
                    Ok(dims) => {
                        info!(filename, variant = %variant, width = dims.width, height = dims.height, "Variant rendered");
                        metrics::record_rendition(variant, "success");
                        let url = store.layout().rendition_url(filename, variant)?;
                        RenditionResult::ready(dims.width, dims.height, url, config.clone())
                    }
                    Err(e) => {
                        warn!(filename, variant = %variant, error = %e, "Variant failed");
                        metrics::record_rendition(variant, "error");
                        RenditionResult::failed(e.to_string(), Some(config.clone()))
                    }
                }
            }
        };

        record.record_result(variant.clone(), result);
        store.save_analysis(filename, &record).await?;
    }

    let succeeded = platforms
        .iter()
        .filter(|p| record.processed.get(p.as_str()).is_some_and(|r| !r.is_error()))
        .count();

    info!(
        filename,
        succeeded,
        requested = platforms.len(),
        "Rendition processing finished"
    );

    Ok(())
}
