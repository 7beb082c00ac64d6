use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::Value;

use crate::ai::service::{self, AtsReport, CoverLetter, EnhancedText, SectionTips, SkillSuggestions};
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::resume::ExperienceItem;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EnhanceSummaryRequest {
    pub summary: String,
    #[serde(default)]
    pub job_title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EnhanceExperienceRequest {
    pub description: String,
    pub job_title: String,
}

#[derive(Debug, Deserialize)]
pub struct SuggestSkillsRequest {
    #[serde(default)]
    pub experience: Vec<ExperienceItem>,
    #[serde(default)]
    pub current_skills: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct CoverLetterRequest {
    pub resume_data: Value,
    pub job_description: String,
}

#[derive(Debug, Deserialize)]
pub struct AtsScoreRequest {
    pub resume_data: Value,
    #[serde(default)]
    pub job_description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SectionTipsRequest {
    pub section_name: String,
    #[serde(default)]
    pub section_data: Value,
}

fn require(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    Ok(())
}

/// POST /api/ai/enhance-summary
pub async fn handle_enhance_summary(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(req): Json<EnhanceSummaryRequest>,
) -> Result<Json<EnhancedText>, AppError> {
    require("summary", &req.summary)?;
    let result = service::enhance_summary(&state.llm, &req.summary, req.job_title.as_deref()).await?;
    Ok(Json(result))
}

/// POST /api/ai/enhance-experience
pub async fn handle_enhance_experience(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(req): Json<EnhanceExperienceRequest>,
) -> Result<Json<EnhancedText>, AppError> {
    require("description", &req.description)?;
    let result = service::enhance_experience(&state.llm, &req.description, &req.job_title).await?;
    Ok(Json(result))
}

/// POST /api/ai/suggest-skills
pub async fn handle_suggest_skills(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(req): Json<SuggestSkillsRequest>,
) -> Result<Json<SkillSuggestions>, AppError> {
    let result = service::suggest_skills(&state.llm, &req.experience, &req.current_skills).await?;
    Ok(Json(result))
}

/// POST /api/ai/generate-cover-letter
pub async fn handle_generate_cover_letter(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(req): Json<CoverLetterRequest>,
) -> Result<Json<CoverLetter>, AppError> {
    require("job_description", &req.job_description)?;
    let result =
        service::generate_cover_letter(&state.llm, &req.resume_data, &req.job_description).await?;
    Ok(Json(result))
}

/// POST /api/ai/ats-score
pub async fn handle_ats_score(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(req): Json<AtsScoreRequest>,
) -> Result<Json<AtsReport>, AppError> {
    let result =
        service::ats_score(&state.llm, &req.resume_data, req.job_description.as_deref()).await?;
    Ok(Json(result))
}

/// POST /api/ai/section-tips
pub async fn handle_section_tips(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(req): Json<SectionTipsRequest>,
) -> Result<Json<SectionTips>, AppError> {
    require("section_name", &req.section_name)?;
    let result = service::section_tips(&state.llm, &req.section_name, &req.section_data).await?;
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::routes::build_router;
    use crate::store::MemoryResumeRepository;
    use crate::test_support::{fake_llm, send, test_state, test_state_with_llm, TEST_TOKEN};

    #[tokio::test]
    async fn test_enhance_summary_returns_model_text() {
        let llm = fake_llm("Seasoned engineer who ships.").await;
        let app = build_router(test_state_with_llm(Arc::new(MemoryResumeRepository::new()), llm));

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/ai/enhance-summary",
            Some(TEST_TOKEN),
            Some(json!({ "summary": "I write code", "job_title": "Backend Engineer" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "enhanced": "Seasoned engineer who ships." }));
    }

    #[tokio::test]
    async fn test_blank_input_is_rejected_before_calling_the_model() {
        let app = build_router(test_state(Arc::new(MemoryResumeRepository::new())));
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/ai/enhance-summary",
            Some(TEST_TOKEN),
            Some(json!({ "summary": "  " })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "summary is required");
    }

    #[tokio::test]
    async fn test_model_outage_is_bad_gateway() {
        let app = build_router(test_state(Arc::new(MemoryResumeRepository::new())));
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/ai/section-tips",
            Some(TEST_TOKEN),
            Some(json!({ "section_name": "Skills", "section_data": ["Rust"] })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "LLM_ERROR");
    }

    #[tokio::test]
    async fn test_ai_routes_require_auth() {
        let app = build_router(test_state(Arc::new(MemoryResumeRepository::new())));
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/ai/ats-score",
            None,
            Some(json!({ "resume_data": {} })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
