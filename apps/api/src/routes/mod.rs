pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::ingest::MAX_UPLOAD_BYTES;
use crate::state::AppState;
use crate::{ai, analyze, export, linkedin, public, resumes, upload};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::handle_health))
        .route("/health", get(health::handle_health))
        // Documents
        .route(
            "/api/resumes",
            get(resumes::handlers::handle_list).post(resumes::handlers::handle_create),
        )
        .route(
            "/api/resumes/:id",
            get(resumes::handlers::handle_get)
                .patch(resumes::handlers::handle_update)
                .delete(resumes::handlers::handle_delete),
        )
        .route(
            "/api/resumes/:id/visibility",
            put(resumes::handlers::handle_set_visibility),
        )
        .route(
            "/api/resumes/:id/toggle-public",
            post(resumes::handlers::handle_toggle_public),
        )
        .route(
            "/api/resumes/:id/duplicate",
            post(resumes::handlers::handle_duplicate),
        )
        .route("/api/public/:slug", get(public::handlers::handle_get_public))
        .route("/api/export/:id", get(export::handlers::handle_export))
        // Text assist
        .route(
            "/api/ai/enhance-summary",
            post(ai::handlers::handle_enhance_summary),
        )
        .route(
            "/api/ai/enhance-experience",
            post(ai::handlers::handle_enhance_experience),
        )
        .route(
            "/api/ai/suggest-skills",
            post(ai::handlers::handle_suggest_skills),
        )
        .route(
            "/api/ai/generate-cover-letter",
            post(ai::handlers::handle_generate_cover_letter),
        )
        .route("/api/ai/ats-score", post(ai::handlers::handle_ats_score))
        .route(
            "/api/ai/section-tips",
            post(ai::handlers::handle_section_tips),
        )
        // Uploads and imports
        .route(
            "/api/analyze/resume",
            post(analyze::handlers::handle_analyze_resume),
        )
        .route("/api/linkedin/import", post(linkedin::handlers::handle_import))
        .route("/api/upload/avatar", post(upload::handlers::handle_upload_avatar))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
