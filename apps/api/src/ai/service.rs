//! Writing-assistant operations.
//!
//! A failed call is an error; an answer that cannot be parsed degrades to a
//! fixed fallback instead, so the editor always has something to show.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::ai::prompts;
use crate::llm_client::prompts::embed_json;
use crate::llm_client::{parse_array, parse_object, CompletionOptions, LlmClient, LlmError};
use crate::models::resume::ExperienceItem;

pub const MAX_SKILL_SUGGESTIONS: usize = 12;
pub const MAX_SECTION_TIPS: usize = 3;
pub const FALLBACK_ATS_SCORE: u8 = 70;

const FALLBACK_ATS_SUGGESTION: &str = "Add more detail to your experience";
const FALLBACK_TIPS: [&str; 3] = [
    "Add quantifiable achievements",
    "Use strong action verbs",
    "Keep entries concise and relevant",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhancedText {
    pub enhanced: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillSuggestions {
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverLetter {
    pub cover_letter: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtsReport {
    pub score: u8,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default, alias = "missingKeywords")]
    pub missing_keywords: Vec<String>,
}

impl AtsReport {
    fn fallback() -> Self {
        Self {
            score: FALLBACK_ATS_SCORE,
            strengths: vec![],
            suggestions: vec![FALLBACK_ATS_SUGGESTION.to_string()],
            missing_keywords: vec![],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionTips {
    pub tips: Vec<String>,
}

/// Model output as it arrives; the score may be fractional or out of range.
#[derive(Debug, Deserialize)]
struct RawAtsReport {
    score: f64,
    #[serde(default)]
    strengths: Vec<String>,
    #[serde(default)]
    suggestions: Vec<String>,
    #[serde(default, alias = "missingKeywords")]
    missing_keywords: Vec<String>,
}

pub async fn enhance_summary(
    llm: &LlmClient,
    summary: &str,
    job_title: Option<&str>,
) -> Result<EnhancedText, LlmError> {
    let prompt = prompts::enhance_summary(summary, job_title);
    let enhanced = llm.complete(&prompt, CompletionOptions::default()).await?;
    Ok(EnhancedText { enhanced })
}

pub async fn enhance_experience(
    llm: &LlmClient,
    description: &str,
    job_title: &str,
) -> Result<EnhancedText, LlmError> {
    let prompt = prompts::enhance_experience(description, job_title);
    let enhanced = llm.complete(&prompt, CompletionOptions::default()).await?;
    Ok(EnhancedText { enhanced })
}

pub async fn suggest_skills(
    llm: &LlmClient,
    experience: &[ExperienceItem],
    current_skills: &[String],
) -> Result<SkillSuggestions, LlmError> {
    let experience = experience
        .iter()
        .map(|e| format!("{} at {}: {}", e.job_title, e.company_name, e.description))
        .collect::<Vec<_>>()
        .join("\n");
    let prompt = prompts::suggest_skills(&experience, current_skills);
    let raw = llm.complete(&prompt, CompletionOptions::default()).await?;

    let suggestions = match parse_array::<String>(&raw) {
        Ok(mut suggestions) => {
            suggestions.truncate(MAX_SKILL_SUGGESTIONS);
            suggestions
        }
        Err(e) => {
            warn!("Unparsable skill suggestions, returning none: {e}");
            vec![]
        }
    };
    Ok(SkillSuggestions { suggestions })
}

/// `resume` is whatever the editor holds; only name, profession, the first two
/// jobs and the skills are used.
pub async fn generate_cover_letter(
    llm: &LlmClient,
    resume: &Value,
    job_description: &str,
) -> Result<CoverLetter, LlmError> {
    let text_at = |pointer: &str, fallback: &'static str| -> String {
        resume
            .pointer(pointer)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(fallback)
            .to_string()
    };
    let name = text_at("/personal_info/full_name", "Candidate");
    let profession = text_at("/personal_info/profession", "professional");

    let recent: Vec<&Value> = resume
        .get("experience")
        .and_then(Value::as_array)
        .map(|jobs| jobs.iter().take(2).collect())
        .unwrap_or_default();
    let skills = resume
        .get("skills")
        .and_then(Value::as_array)
        .map(|skills| {
            skills
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default();

    let prompt = prompts::cover_letter(
        &name,
        &profession,
        &embed_json(&recent),
        &skills,
        job_description,
    );
    let cover_letter = llm.complete(&prompt, CompletionOptions::default()).await?;
    Ok(CoverLetter { cover_letter })
}

pub async fn ats_score(
    llm: &LlmClient,
    resume: &Value,
    job_description: Option<&str>,
) -> Result<AtsReport, LlmError> {
    let prompt = prompts::ats_score(&embed_json(resume), job_description);
    let raw = llm.complete(&prompt, CompletionOptions::default()).await?;

    Ok(match parse_object::<RawAtsReport>(&raw) {
        Ok(report) => AtsReport {
            score: report.score.round().clamp(0.0, 100.0) as u8,
            strengths: report.strengths,
            suggestions: report.suggestions,
            missing_keywords: report.missing_keywords,
        },
        Err(e) => {
            warn!("Unparsable ATS report, using fallback: {e}");
            AtsReport::fallback()
        }
    })
}

pub async fn section_tips(
    llm: &LlmClient,
    section_name: &str,
    section_data: &Value,
) -> Result<SectionTips, LlmError> {
    let prompt = prompts::section_tips(section_name, &embed_json(section_data));
    let raw = llm.complete(&prompt, CompletionOptions::default()).await?;

    let tips = match parse_array::<String>(&raw) {
        Ok(mut tips) => {
            tips.truncate(MAX_SECTION_TIPS);
            tips
        }
        Err(e) => {
            warn!("Unparsable section tips, using defaults: {e}");
            FALLBACK_TIPS.iter().map(|tip| tip.to_string()).collect()
        }
    };
    Ok(SectionTips { tips })
}
