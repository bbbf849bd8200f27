//! Handler for image uploads.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use pitchdeck_core::upload::{validate_image, UPLOAD_FIELD};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub image_url: String,
}

/// POST /api/upload/image
///
/// Accepts multipart form data with an `image` field. The file must declare
/// an image content type, fit the size limit, and sniff as a supported
/// raster format. Nothing is written when any check fails.
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<UploadResponse>)> {
    let mut upload: Option<(Option<String>, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        upload = Some((content_type, data.to_vec()));
    }

    let (content_type, data) =
        upload.ok_or_else(|| AppError::BadRequest("No image uploaded".into()))?;

    let ext = validate_image(content_type.as_deref(), &data, state.config.max_upload_bytes)?;
    let image_url = state
        .uploads
        .save(ext, &data)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to store upload: {e}")))?;

    tracing::info!(%image_url, bytes = data.len(), "Stored image upload");
    Ok((StatusCode::CREATED, Json(UploadResponse { image_url })))
}
