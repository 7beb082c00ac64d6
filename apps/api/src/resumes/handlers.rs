use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::resume::{ResumeDocument, ResumePatch};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CreateResumeRequest {
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VisibilityRequest {
    pub is_public: bool,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
}

/// GET /api/resumes
pub async fn handle_list(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<ResumeDocument>>, AppError> {
    Ok(Json(state.resumes.list(user.id).await?))
}

/// POST /api/resumes
pub async fn handle_create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateResumeRequest>,
) -> Result<(StatusCode, Json<ResumeDocument>), AppError> {
    let title = req.title.unwrap_or_default();
    let doc = state.resumes.create(user.id, &title).await?;
    info!("User {} created resume {}", user.id, doc.id);
    Ok((StatusCode::CREATED, Json(doc)))
}

/// GET /api/resumes/:id
pub async fn handle_get(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ResumeDocument>, AppError> {
    Ok(Json(state.resumes.fetch(user.id, id).await?))
}

/// PATCH /api/resumes/:id
/// Partial update; unknown fields are rejected by the extractor with 422.
pub async fn handle_update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(patch): Json<ResumePatch>,
) -> Result<Json<ResumeDocument>, AppError> {
    Ok(Json(state.resumes.update(user.id, id, &patch).await?))
}

/// DELETE /api/resumes/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, AppError> {
    state.resumes.delete(user.id, id).await?;
    Ok(Json(DeleteResponse { success: true }))
}

/// PUT /api/resumes/:id/visibility
pub async fn handle_set_visibility(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<VisibilityRequest>,
) -> Result<Json<ResumeDocument>, AppError> {
    Ok(Json(state.resumes.set_public(user.id, id, req.is_public).await?))
}

/// POST /api/resumes/:id/toggle-public
pub async fn handle_toggle_public(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ResumeDocument>, AppError> {
    let current = state.resumes.fetch(user.id, id).await?;
    let doc = state
        .resumes
        .set_public(user.id, id, !current.is_public)
        .await?;
    info!("Resume {id} is now {}", if doc.is_public { "public" } else { "private" });
    Ok(Json(doc))
}

/// POST /api/resumes/:id/duplicate
pub async fn handle_duplicate(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<ResumeDocument>), AppError> {
    let copy = state.resumes.duplicate(user.id, id).await?;
    Ok((StatusCode::CREATED, Json(copy)))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::Method;
    use serde_json::json;

    use crate::models::resume::MAX_TITLE_LEN;
    use crate::routes::build_router;
    use crate::store::MemoryResumeRepository;
    use crate::test_support::{send, test_state, OTHER_TOKEN, TEST_TOKEN, TEST_USER};

    use super::*;

    fn app() -> axum::Router {
        build_router(test_state(Arc::new(MemoryResumeRepository::new())))
    }

    #[tokio::test]
    async fn test_requires_bearer_token() {
        let app = app();
        let (status, body) = send(&app, Method::GET, "/api/resumes", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");

        let (status, _) = send(&app, Method::GET, "/api/resumes", Some("forged"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_create_update_fetch_list_delete() {
        let app = app();
        let token = Some(TEST_TOKEN);

        let (status, created) = send(&app, Method::POST, "/api/resumes", token, Some(json!({}))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["title"], "Untitled Resume");
        assert_eq!(created["user_id"], TEST_USER.to_string());
        assert_eq!(created["is_public"], false);
        assert_eq!(created["template"], "classic");
        let uri = format!("/api/resumes/{}", created["id"].as_str().unwrap());

        let (status, updated) = send(
            &app,
            Method::PATCH,
            &uri,
            token,
            Some(json!({ "title": "Staff Engineer", "skills": ["Rust", "Postgres"] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["title"], "Staff Engineer");
        assert_eq!(updated["skills"], json!(["Rust", "Postgres"]));

        let (_, fetched) = send(&app, Method::GET, &uri, token, None).await;
        assert_eq!(fetched, updated);

        let (_, listed) = send(&app, Method::GET, "/api/resumes", token, None).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let (status, deleted) = send(&app, Method::DELETE, &uri, token, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(deleted, json!({ "success": true }));

        let (status, _) = send(&app, Method::GET, &uri, token, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_and_unknown_fields_are_rejected() {
        let app = app();
        let (_, created) =
            send(&app, Method::POST, "/api/resumes", Some(TEST_TOKEN), Some(json!({ "title": "CV" }))).await;
        let uri = format!("/api/resumes/{}", created["id"].as_str().unwrap());

        let (status, body) =
            send(&app, Method::PATCH, &uri, Some(TEST_TOKEN), Some(json!({ "title": "   " }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (status, _) =
            send(&app, Method::PATCH, &uri, Some(TEST_TOKEN), Some(json!({ "view_count": 9000 }))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let long_title = "x".repeat(MAX_TITLE_LEN + 1);
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/resumes",
            Some(TEST_TOKEN),
            Some(json!({ "title": long_title })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_other_users_documents_are_invisible() {
        let app = app();
        let (_, created) =
            send(&app, Method::POST, "/api/resumes", Some(TEST_TOKEN), Some(json!({ "title": "Mine" }))).await;
        let uri = format!("/api/resumes/{}", created["id"].as_str().unwrap());

        let (status, _) = send(&app, Method::GET, &uri, Some(OTHER_TOKEN), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, Method::DELETE, &uri, Some(OTHER_TOKEN), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, listed) = send(&app, Method::GET, "/api/resumes", Some(OTHER_TOKEN), None).await;
        assert_eq!(listed, json!([]));
    }

    #[tokio::test]
    async fn test_visibility_toggle_and_duplicate() {
        let app = app();
        let token = Some(TEST_TOKEN);
        let (_, created) =
            send(&app, Method::POST, "/api/resumes", token, Some(json!({ "title": "Resume" }))).await;
        let id = created["id"].as_str().unwrap().to_string();

        let (_, published) = send(
            &app,
            Method::PUT,
            &format!("/api/resumes/{id}/visibility"),
            token,
            Some(json!({ "is_public": true })),
        )
        .await;
        assert_eq!(published["is_public"], true);
        let slug = published["slug"].clone();
        assert!(slug.is_string());

        let (_, toggled) =
            send(&app, Method::POST, &format!("/api/resumes/{id}/toggle-public"), token, None).await;
        assert_eq!(toggled["is_public"], false);
        assert_eq!(toggled["slug"], slug);

        let (_, toggled) =
            send(&app, Method::POST, &format!("/api/resumes/{id}/toggle-public"), token, None).await;
        assert_eq!(toggled["is_public"], true);
        assert_eq!(toggled["slug"], slug);

        let (status, copy) =
            send(&app, Method::POST, &format!("/api/resumes/{id}/duplicate"), token, None).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(copy["title"], "Copy of Resume");
        assert_eq!(copy["is_public"], false);
        assert!(copy["slug"].is_null());
        assert_ne!(copy["id"], created["id"]);
    }
}
