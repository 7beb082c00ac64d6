use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::state::AppState;
use crate::upload::service::{is_image, upload_avatar};

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
}

/// POST /api/upload/avatar
/// Multipart with a single `file` part holding an image.
pub async fn handle_upload_avatar(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field.content_type().unwrap_or_default().to_string();
        if !is_image(&content_type) {
            return Err(AppError::Validation("Only image files are allowed".to_string()));
        }
        let image = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;

        let url = upload_avatar(
            &state.s3,
            &state.config.s3_bucket,
            &state.config.s3_public_url,
            user.id,
            &content_type,
            image,
        )
        .await?;
        return Ok(Json(UploadResponse { url }));
    }

    Err(AppError::Validation("No file uploaded".to_string()))
}
