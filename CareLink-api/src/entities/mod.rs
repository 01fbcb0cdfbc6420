// Public entities for the CareLink API
// Request and response bodies are the domain entities; this module adds the HTTP-only shapes.

// Error body, API error and JSON extractor
pub mod common;

pub use common::{ApiError, ApiJson, ApiResult, ErrorResponse, UploadHealthRecordForm};
