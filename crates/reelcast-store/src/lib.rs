//! On-disk store for the reelcast backend.
//!
//! One directory tree holds everything the service persists: uploaded
//! source files at the root, renditions and per-file JSON records under
//! `processed/`. The analysis record is the system of record consumed by
//! the status endpoint, so every write goes through a temp-file-and-rename
//! to keep concurrent readers off half-written JSON.

pub mod analysis;
pub mod error;
pub mod layout;
pub mod uploads;

pub use analysis::MediaStore;
pub use error::{StoreError, StoreResult};
pub use layout::StoreLayout;
pub use uploads::UploadedFile;
