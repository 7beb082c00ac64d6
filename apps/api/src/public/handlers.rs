use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::warn;

use crate::errors::AppError;
use crate::models::resume::ResumeDocument;
use crate::state::AppState;
use crate::store::StoreError;

/// GET /api/public/:slug
/// Slug first, then a UUID v4 id. The view counter is bumped in the background.
pub async fn handle_get_public(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ResumeDocument>, AppError> {
    let doc = state.resumes.find_public(&slug).await.map_err(|e| match e {
        StoreError::NotFound => AppError::NotFound("Resume not found or not public".to_string()),
        other => other.into(),
    })?;

    let resumes = Arc::clone(&state.resumes);
    let id = doc.id;
    tokio::spawn(async move {
        if let Err(e) = resumes.increment_views(id).await {
            warn!("Failed to count a view of resume {id}: {e}");
        }
    });

    Ok(Json(doc))
}
