//! Shared DTO types used across multiple endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Simple count response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CountResponse {
    /// The count.
    pub count: i64,
}

/// One stored upload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    /// Name the file was stored under.
    pub filename: String,
    /// Name the client sent.
    pub original_name: String,
    /// Server-side path.
    pub path: String,
    /// Size in bytes.
    pub size: u64,
}

/// Response of `POST /api/upload`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    /// Stored files, in request order.
    pub files: Vec<UploadedFile>,
}
