//! Multipart file upload.
//!
//! Files arrive in the `files` field, at most [`MAX_FILES`] per request.
//! Each is stored in the upload directory under a fresh UUID name that
//! keeps the original extension.

use std::path::{Path, PathBuf};

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{UploadResponse, UploadedFile};
use crate::app_state::{AppState, UploadSettings};
use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HubError};

/// Maximum number of files per request.
pub const MAX_FILES: usize = UploadSettings::MAX_FILES;

/// Extensions accepted for upload.
pub const ALLOWED_EXTENSIONS: &[&str] =
    &["jpeg", "jpg", "png", "gif", "pdf", "doc", "docx", "zip", "rar"];

/// Returns the lowercase extension of `name` if it is accepted.
#[must_use]
pub fn allowed_extension(name: &str) -> Option<String> {
    let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
    ALLOWED_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

/// `POST /api/upload` — Store attachments and portfolio images.
///
/// # Errors
///
/// Returns [`HubError::InvalidUpload`] for too many files, a rejected
/// extension or an oversized file.
#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "Uploads",
    summary = "Upload files",
    description = "Multipart upload in the `files` field: up to 10 files, 10 MiB each by default, images, PDFs, Office documents and archives.",
    security(("bearer_auth" = [])),
    request_body(content_type = "multipart/form-data", description = "One or more `files` parts"),
    responses(
        (status = 200, description = "Stored files", body = UploadResponse),
        (status = 400, description = "Rejected upload", body = ErrorResponse),
    )
)]
pub async fn upload(
    State(state): State<AppState>,
    caller: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, HubError> {
    let limit = state.uploads.max_file_bytes;
    let mut files = Vec::new();

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| HubError::InvalidUpload(e.body_text()))?
    {
        if field.name() != Some("files") {
            continue;
        }
        if files.len() == MAX_FILES {
            return Err(HubError::InvalidUpload(format!(
                "at most {MAX_FILES} files per request"
            )));
        }
        let original_name = field.file_name().unwrap_or_default().to_string();
        let ext = allowed_extension(&original_name).ok_or_else(|| {
            HubError::InvalidUpload(format!("file type not allowed: {original_name:?}"))
        })?;

        let mut data = Vec::new();
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| HubError::InvalidUpload(e.body_text()))?
        {
            if data.len() + chunk.len() > limit {
                return Err(HubError::InvalidUpload(format!(
                    "{original_name:?} exceeds {limit} bytes"
                )));
            }
            data.extend_from_slice(&chunk);
        }
        files.push((original_name, ext, data));
    }

    if files.is_empty() {
        return Err(HubError::InvalidUpload("no files in request".to_string()));
    }

    tokio::fs::create_dir_all(&state.uploads.dir)
        .await
        .map_err(|e| HubError::Internal(format!("upload dir: {e}")))?;

    let stored = store_all(&state.uploads.dir, files).await?;
    tracing::info!(user_id = %caller.id, count = stored.len(), "files uploaded");
    Ok(Json(UploadResponse { files: stored }))
}

/// Writes every file or none: on a failed write the files already stored
/// by this request are removed.
async fn store_all(
    dir: &Path,
    files: Vec<(String, String, Vec<u8>)>,
) -> Result<Vec<UploadedFile>, HubError> {
    let mut stored = Vec::with_capacity(files.len());
    let mut written: Vec<PathBuf> = Vec::with_capacity(files.len());
    for (original_name, ext, data) in files {
        let filename = format!("{}.{ext}", uuid::Uuid::new_v4());
        let path = dir.join(&filename);
        if let Err(e) = tokio::fs::write(&path, &data).await {
            for orphan in &written {
                if let Err(rm) = tokio::fs::remove_file(orphan).await {
                    tracing::warn!(path = %orphan.display(), error = %rm, "orphaned upload");
                }
            }
            return Err(HubError::Internal(format!("writing {filename}: {e}")));
        }
        stored.push(UploadedFile {
            filename,
            original_name,
            path: path.to_string_lossy().into_owned(),
            size: data.len() as u64,
        });
        written.push(path);
    }
    Ok(stored)
}

/// Upload routes; the body limit follows the configured per-file limit.
pub fn routes(uploads: &UploadSettings) -> Router<AppState> {
    Router::new()
        .route("/upload", post(upload))
        .layer(DefaultBodyLimit::max(uploads.body_limit()))
}
