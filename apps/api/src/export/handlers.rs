use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::export::{file_name, render, ExportFormat};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    pub format: ExportFormat,
}

/// GET /api/export/:id?format=markdown|text
///
/// Replaces the old `POST /api/export/pdf/:resumeId`. No PDF is rendered on the
/// server; clients that need one print the Markdown or text download.
pub async fn handle_export(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Query(query): Query<ExportQuery>,
) -> Result<impl IntoResponse, AppError> {
    let doc = state.resumes.fetch(user.id, id).await?;
    let body = render(&doc, query.format);
    let disposition = format!("attachment; filename=\"{}\"", file_name(&doc, query.format));
    debug!("Exported resume {id} as {:?}", query.format);

    Ok((
        [
            (header::CONTENT_TYPE, query.format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::routes::build_router;
    use crate::store::MemoryResumeRepository;
    use crate::test_support::{send, send_raw, test_state, OTHER_TOKEN, TEST_TOKEN};

    use super::*;

    async fn created(app: &axum::Router) -> String {
        let (_, doc) = send(
            app,
            Method::POST,
            "/api/resumes",
            Some(TEST_TOKEN),
            Some(json!({ "title": "Platform CV" })),
        )
        .await;
        let id = doc["id"].as_str().unwrap().to_string();
        send(
            app,
            Method::PATCH,
            &format!("/api/resumes/{id}"),
            Some(TEST_TOKEN),
            Some(json!({ "skills": ["Rust", "Kubernetes"] })),
        )
        .await;
        id
    }

    #[tokio::test]
    async fn test_exports_markdown_by_default() {
        let app = build_router(test_state(Arc::new(MemoryResumeRepository::new())));
        let id = created(&app).await;

        let (status, headers, body) =
            send_raw(&app, Method::GET, &format!("/api/export/{id}"), Some(TEST_TOKEN), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], "text/markdown; charset=utf-8");
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"platform-cv.md\""
        );
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert_eq!(text, "# Platform CV\n\n## Skills\nRust, Kubernetes\n");
    }

    #[tokio::test]
    async fn test_exports_plain_text() {
        let app = build_router(test_state(Arc::new(MemoryResumeRepository::new())));
        let id = created(&app).await;

        let (status, headers, body) = send_raw(
            &app,
            Method::GET,
            &format!("/api/export/{id}?format=text"),
            Some(TEST_TOKEN),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], "text/plain; charset=utf-8");
        assert!(String::from_utf8(body.to_vec()).unwrap().starts_with("PLATFORM CV\n"));
    }

    #[tokio::test]
    async fn test_export_is_owner_scoped() {
        let app = build_router(test_state(Arc::new(MemoryResumeRepository::new())));
        let id = created(&app).await;

        let (status, _) =
            send(&app, Method::GET, &format!("/api/export/{id}"), Some(OTHER_TOKEN), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &app,
            Method::GET,
            &format!("/api/export/{id}?format=pdf"),
            Some(TEST_TOKEN),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
