// Prompt templates for the writing assistant.
// Placeholders in `{braces}` are filled by the builders below.

use crate::llm_client::prompts::{fill, JSON_ARRAY_ONLY, JSON_OBJECT_ONLY, PLAIN_TEXT_ONLY};

pub const ENHANCE_SUMMARY_TEMPLATE: &str = r#"You are a professional resume writer. Enhance the following professional summary for {role}.

Make it:
- Compelling and achievement-focused
- 3-4 sentences max
- ATS-friendly
- Start with a strong action or identity statement

Original summary: "{summary}"

{closing}"#;

pub const ENHANCE_EXPERIENCE_TEMPLATE: &str = r#"You are a professional resume writer. Enhance the following job description for a {job_title} role.

Guidelines:
- Use strong action verbs (Led, Built, Increased, Optimized, etc.)
- Include quantifiable results where possible
- Keep to 3-4 bullet points or a concise paragraph
- Make it ATS-friendly

Original description: "{description}"

{closing}"#;

pub const SUGGEST_SKILLS_TEMPLATE: &str = r#"Based on this work experience, suggest 8-12 relevant skills for a resume.

Experience:
{experience}

Current skills (don't repeat these): {current_skills}

Return ONLY a JSON array of skill strings, like: ["Skill1", "Skill2", ...]
{closing}"#;

pub const COVER_LETTER_TEMPLATE: &str = r#"Write a professional cover letter for {name}, a {profession}, for this job:

{job_description}

Key points from their experience:
{experience}

Skills: {skills}

Write a 3-paragraph cover letter: introduction, why they're a great fit, closing call-to-action.
{closing}"#;

pub const ATS_SCORE_TEMPLATE: &str = r#"Analyze this resume data and provide an ATS (Applicant Tracking System) score.

Resume data: {resume}
{job_description}
Return a JSON object with:
{
  "score": <number 0-100>,
  "strengths": [<3-5 things done well>],
  "suggestions": [<3-5 improvements>],
  "missing_keywords": [<keywords missing from resume>]
}

{closing}"#;

pub const SECTION_TIPS_TEMPLATE: &str = r#"You are an expert resume career coach. A user is filling the "{section_name}" section of their resume.

Section data: {section_data}

Give exactly 3 short, specific, actionable tips to improve this section for maximum impact and ATS performance.
Each tip should be 1 sentence max.

Return ONLY a JSON array of 3 strings, e.g.:
["Tip 1", "Tip 2", "Tip 3"]

{closing}"#;

pub fn enhance_summary(summary: &str, job_title: Option<&str>) -> String {
    let role = job_title
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .unwrap_or("a professional");
    fill(
        ENHANCE_SUMMARY_TEMPLATE,
        &[
            ("closing", PLAIN_TEXT_ONLY),
            ("role", role),
            ("summary", summary),
        ],
    )
}

pub fn enhance_experience(description: &str, job_title: &str) -> String {
    fill(
        ENHANCE_EXPERIENCE_TEMPLATE,
        &[
            ("closing", PLAIN_TEXT_ONLY),
            ("job_title", job_title),
            ("description", description),
        ],
    )
}

pub fn suggest_skills(experience: &str, current_skills: &[String]) -> String {
    fill(
        SUGGEST_SKILLS_TEMPLATE,
        &[
            ("closing", JSON_ARRAY_ONLY),
            ("current_skills", &current_skills.join(", ")),
            ("experience", experience),
        ],
    )
}

pub fn cover_letter(
    name: &str,
    profession: &str,
    experience: &str,
    skills: &str,
    job_description: &str,
) -> String {
    fill(
        COVER_LETTER_TEMPLATE,
        &[
            ("closing", PLAIN_TEXT_ONLY),
            ("name", name),
            ("profession", profession),
            ("experience", experience),
            ("skills", skills),
            ("job_description", job_description),
        ],
    )
}

pub fn ats_score(resume: &str, job_description: Option<&str>) -> String {
    let job_description = job_description
        .map(str::trim)
        .filter(|jd| !jd.is_empty())
        .map(|jd| format!("\nJob description: {jd}\n"))
        .unwrap_or_default();
    fill(
        ATS_SCORE_TEMPLATE,
        &[
            ("closing", JSON_OBJECT_ONLY),
            ("job_description", &job_description),
            ("resume", resume),
        ],
    )
}

pub fn section_tips(section_name: &str, section_data: &str) -> String {
    fill(
        SECTION_TIPS_TEMPLATE,
        &[
            ("closing", JSON_ARRAY_ONLY),
            ("section_name", section_name),
            ("section_data", section_data),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_prompt_defaults_role() {
        let prompt = enhance_summary("I write code.", None);
        assert!(prompt.contains("for a professional."));
        assert!(prompt.contains("\"I write code.\""));
        assert!(!prompt.contains('{'));
    }

    #[test]
    fn test_ats_prompt_mentions_job_description_only_when_given() {
        assert!(!ats_score("{}", None).contains("Job description:"));
        assert!(ats_score("{}", Some("Rust backend")).contains("Job description: Rust backend"));
    }
}
