use axum::{extract::State, Json};
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::linkedin::service::import_profile;
use crate::models::resume::ResumePatch;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    pub raw_text: String,
}

/// POST /api/linkedin/import
/// Returns a patch; nothing is persisted until the editor applies it.
pub async fn handle_import(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(req): Json<ImportRequest>,
) -> Result<Json<ResumePatch>, AppError> {
    if req.raw_text.trim().is_empty() {
        return Err(AppError::Validation("raw_text is required".to_string()));
    }
    Ok(Json(import_profile(&state.llm, &req.raw_text).await?))
}
