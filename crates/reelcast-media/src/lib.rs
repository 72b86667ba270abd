//! FFmpeg CLI wrapper for video probing and platform renditions.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building with timeout support
//! - FFprobe metadata extraction with an availability-over-accuracy fallback
//! - Geometry filter chains (center crop, letterbox/pillarbox, scale-to-fit)
//! - The rendition engine that produces one platform-conformant output per run

pub mod command;
pub mod error;
pub mod filters;
pub mod probe;
pub mod render;

pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use error::{MediaError, MediaResult};
pub use probe::{probe_or_fallback, probe_video};
pub use render::{RenditionDimensions, RenditionEngine};
