use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    Json,
};
use bytes::Bytes;

use crate::analyze::service::{analyze_resume, AnalysisResult};
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::ingest::extract_text;
use crate::state::AppState;

fn bad_multipart(err: MultipartError) -> AppError {
    AppError::Validation(err.body_text())
}

/// POST /api/analyze/resume
/// Multipart with a `file` part (PDF, DOCX or TXT) and a `job_role` text part.
pub async fn handle_analyze_resume(
    State(state): State<AppState>,
    _user: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<AnalysisResult>, AppError> {
    let mut file: Option<(String, Bytes)> = None;
    let mut job_role = String::new();

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await.map_err(bad_multipart)?;
                file = Some((content_type, bytes));
            }
            "job_role" | "jobRole" => job_role = field.text().await.map_err(bad_multipart)?,
            _ => {}
        }
    }

    let (content_type, bytes) =
        file.ok_or_else(|| AppError::Validation("No file uploaded".to_string()))?;
    let job_role = job_role.trim();
    if job_role.is_empty() {
        return Err(AppError::Validation("Job role is required".to_string()));
    }

    let text = extract_text(bytes, &content_type).await?;
    Ok(Json(analyze_resume(&state.llm, &text, job_role).await?))
}
