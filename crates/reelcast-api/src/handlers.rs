//! HTTP request handlers.

pub mod health;
pub mod processing;
pub mod upload;

pub use health::{health, ready};
pub use processing::{get_status, request_processing};
pub use upload::{delete_file, list_files, upload_video};
