use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::prompts::{clip, fill, JSON_OBJECT_ONLY};
use crate::llm_client::{parse_object, CompletionOptions, LlmClient};

/// How much of the resume text is sent to the model.
pub const MAX_RESUME_CHARS: usize = 6000;

const ANALYSIS_OPTIONS: CompletionOptions = CompletionOptions {
    temperature: 0.4,
    max_tokens: 2048,
};

pub const ANALYZE_TEMPLATE: &str = r#"You are an expert recruiter and career coach. Analyze the following resume for a candidate applying for the role of "{job_role}".

RESUME TEXT:
---
{resume_text}
---

Provide a detailed analysis and return ONLY a valid JSON object with this exact structure:
{
  "score": <number 0-100, overall match score for this role>,
  "job_role": "{job_role}",
  "strengths": [<3-5 specific strengths this resume has for this role>],
  "weaknesses": [<3-5 specific gaps or weaknesses for this role>],
  "missing_keywords": [<6-10 important keywords/skills missing that recruiters look for in "{job_role}">],
  "suggestions": [<5-7 specific, actionable improvements they should make to the resume>],
  "skills_to_add": [<5-8 skills they should learn or add to be more competitive for "{job_role}">],
  "section_ratings": {
    "contact_info": <number 0-10>,
    "summary": <number 0-10>,
    "experience": <number 0-10>,
    "education": <number 0-10>,
    "skills": <number 0-10>,
    "overall": <number 0-10>
  },
  "verdict": "<2-3 sentence honest overall assessment for this specific role>"
}

Be specific, honest, and role-focused. {closing}"#;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionRatings {
    #[serde(default, alias = "contactInfo")]
    pub contact_info: f64,
    #[serde(default)]
    pub summary: f64,
    #[serde(default)]
    pub experience: f64,
    #[serde(default)]
    pub education: f64,
    #[serde(default)]
    pub skills: f64,
    #[serde(default)]
    pub overall: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub score: f64,
    #[serde(default, alias = "jobRole")]
    pub job_role: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default, alias = "missingKeywords")]
    pub missing_keywords: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default, alias = "skillsToAdd")]
    pub skills_to_add: Vec<String>,
    #[serde(default, alias = "sectionRatings")]
    pub section_ratings: SectionRatings,
    #[serde(default)]
    pub verdict: String,
}

pub fn analysis_prompt(resume_text: &str, job_role: &str) -> String {
    fill(
        ANALYZE_TEMPLATE,
        &[
            ("closing", JSON_OBJECT_ONLY),
            ("job_role", job_role),
            ("resume_text", clip(resume_text, MAX_RESUME_CHARS)),
        ],
    )
}

/// Scores extracted resume text against a target role.
pub async fn analyze_resume(
    llm: &LlmClient,
    resume_text: &str,
    job_role: &str,
) -> Result<AnalysisResult, AppError> {
    let raw = llm
        .complete(&analysis_prompt(resume_text, job_role), ANALYSIS_OPTIONS)
        .await?;

    let mut result = parse_object::<AnalysisResult>(&raw).map_err(|e| {
        warn!("Unparsable resume analysis: {e}");
        AppError::Validation("AI analysis failed. Please try again.".to_string())
    })?;
    result.job_role = job_role.to_string();
    result.score = result.score.clamp(0.0, 100.0);

    info!("Analyzed resume for '{job_role}': score {}", result.score);
    Ok(result)
}
