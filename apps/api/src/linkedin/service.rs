use std::collections::HashSet;

use serde::Deserialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::prompts::{clip, fill, JSON_OBJECT_ONLY};
use crate::llm_client::{parse_object, CompletionOptions, LlmClient};
use crate::models::resume::{
    CertificationItem, EducationItem, ExperienceItem, PersonalInfo, ResumePatch,
};

/// How much of the export is sent to the model.
pub const MAX_EXPORT_CHARS: usize = 8000;

const IMPORT_OPTIONS: CompletionOptions = CompletionOptions {
    temperature: 0.2,
    max_tokens: 3000,
};

pub const IMPORT_TEMPLATE: &str = r#"You are a resume data extractor. Parse the following LinkedIn profile data (CSV or JSON export) and extract the resume information.

LinkedIn data:
{raw_text}

Return a JSON object with EXACTLY this structure (use empty strings/arrays for missing fields):
{
  "personal_info": {
    "full_name": "",
    "email": "",
    "phone": "",
    "location": "",
    "profession": "",
    "website": "",
    "linkedin": ""
  },
  "professional_summary": "",
  "experience": [
    {"company": "", "position": "", "start_date": "", "end_date": "", "current": false, "description": ""}
  ],
  "education": [
    {"institution": "", "degree": "", "field": "", "end_date": ""}
  ],
  "skills": [],
  "certifications": [
    {"name": "", "issuer": "", "date": "", "url": ""}
  ]
}

{closing}"#;

// The model is asked for snake_case but the aliases accept the other shapes it tends to produce.

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LinkedInProfile {
    #[serde(alias = "personalInfo")]
    pub personal_info: LinkedInPersonal,
    #[serde(alias = "professionalSummary", alias = "summary")]
    pub professional_summary: String,
    pub experience: Vec<LinkedInPosition>,
    pub education: Vec<LinkedInEducation>,
    pub skills: Vec<String>,
    pub certifications: Vec<LinkedInCertification>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LinkedInPersonal {
    #[serde(alias = "fullName")]
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    #[serde(alias = "headline")]
    pub profession: String,
    pub website: String,
    #[serde(alias = "linkedIn")]
    pub linkedin: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LinkedInPosition {
    #[serde(alias = "company_name", alias = "companyName")]
    pub company: String,
    #[serde(alias = "job_title", alias = "jobTitle", alias = "title")]
    pub position: String,
    #[serde(alias = "startDate")]
    pub start_date: String,
    #[serde(alias = "endDate")]
    pub end_date: String,
    #[serde(alias = "currently_working")]
    pub current: bool,
    pub description: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LinkedInEducation {
    pub institution: String,
    pub degree: String,
    #[serde(alias = "field_of_study", alias = "fieldOfStudy")]
    pub field: String,
    #[serde(alias = "endDate", alias = "graduation_date")]
    pub end_date: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LinkedInCertification {
    pub name: String,
    pub issuer: String,
    pub date: String,
    pub url: String,
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl LinkedInProfile {
    /// Converts to an edit the session can apply. Blank placeholder entries are
    /// dropped, list entries are numbered from "1", skills are de-duplicated and
    /// untouched sections stay `None`.
    pub fn into_patch(self) -> ResumePatch {
        let p = self.personal_info;
        let personal_info = PersonalInfo {
            full_name: p.full_name.trim().to_string(),
            email: p.email.trim().to_string(),
            phone: p.phone.trim().to_string(),
            location: p.location.trim().to_string(),
            profession: p.profession.trim().to_string(),
            linkedin: p.linkedin.trim().to_string(),
            website: p.website.trim().to_string(),
            avatar_url: None,
        };

        let experience: Vec<ExperienceItem> = self
            .experience
            .into_iter()
            .filter(|e| !e.company.trim().is_empty() || !e.position.trim().is_empty())
            .zip(1..)
            .map(|(e, n)| ExperienceItem {
                id: n.to_string(),
                company_name: e.company.trim().to_string(),
                job_title: e.position.trim().to_string(),
                start_date: e.start_date,
                end_date: if e.current { String::new() } else { e.end_date },
                currently_working: e.current,
                description: e.description,
            })
            .collect();

        let education: Vec<EducationItem> = self
            .education
            .into_iter()
            .filter(|e| !e.institution.trim().is_empty())
            .zip(1..)
            .map(|(e, n)| EducationItem {
                id: n.to_string(),
                institution: e.institution.trim().to_string(),
                degree: e.degree,
                field_of_study: e.field,
                graduation_date: e.end_date,
                gpa: None,
            })
            .collect();

        let certifications: Vec<CertificationItem> = self
            .certifications
            .into_iter()
            .filter(|c| !c.name.trim().is_empty())
            .zip(1..)
            .map(|(c, n)| CertificationItem {
                id: n.to_string(),
                name: c.name.trim().to_string(),
                issuer: c.issuer,
                date: c.date,
                url: non_empty(c.url),
            })
            .collect();

        let mut seen = HashSet::new();
        let skills: Vec<String> = self
            .skills
            .into_iter()
            .filter_map(non_empty)
            .filter(|skill| seen.insert(skill.to_lowercase()))
            .collect();

        ResumePatch {
            personal_info: (personal_info != PersonalInfo::default()).then_some(personal_info),
            professional_summary: non_empty(self.professional_summary),
            experience: (!experience.is_empty()).then_some(experience),
            education: (!education.is_empty()).then_some(education),
            skills: (!skills.is_empty()).then_some(skills),
            certifications: (!certifications.is_empty()).then_some(certifications),
            ..Default::default()
        }
    }
}

pub fn import_prompt(raw_text: &str) -> String {
    fill(
        IMPORT_TEMPLATE,
        &[
            ("closing", JSON_OBJECT_ONLY),
            ("raw_text", clip(raw_text, MAX_EXPORT_CHARS)),
        ],
    )
}

/// Turns a pasted LinkedIn export into a resume edit.
pub async fn import_profile(llm: &LlmClient, raw_text: &str) -> Result<ResumePatch, AppError> {
    let raw = llm.complete(&import_prompt(raw_text), IMPORT_OPTIONS).await?;
    let profile = parse_object::<LinkedInProfile>(&raw).map_err(|e| {
        warn!("Unparsable LinkedIn import: {e}");
        AppError::UnprocessableEntity("Failed to parse LinkedIn data".to_string())
    })?;

    let patch = profile.into_patch();
    patch
        .validate()
        .map_err(|e| AppError::UnprocessableEntity(format!("Imported data is invalid: {e}")))?;
    info!("Imported LinkedIn profile: {:?}", patch.touched_fields());
    Ok(patch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fake_llm;

    const MODEL_REPLY: &str = r#"Here is the data:
{
  "personalInfo": {"fullName": " Ada Lovelace ", "email": "ada@example.com", "linkedIn": "linkedin.com/in/ada"},
  "professionalSummary": "Analyst of engines.",
  "experience": [
    {"id": "1", "company": "Analytical Engines", "position": "Programmer", "startDate": "1842", "current": true, "endDate": "1843"},
    {"id": "1", "company": "Babbage & Co", "position": "Translator", "startDate": "1840", "endDate": "1842"},
    {"id": "3", "company": "", "position": "", "startDate": "", "endDate": ""}
  ],
  "education": [{"institution": "", "degree": ""}],
  "skills": ["Mathematics", "mathematics ", "", "Notes"],
  "certifications": [{"name": "Royal Society Fellow", "issuer": "RS", "url": ""}]
}"#;

    #[tokio::test]
    async fn test_import_produces_valid_patch() {
        let llm = fake_llm(MODEL_REPLY).await;
        let patch = import_profile(&llm, "Ada Lovelace,Programmer,...").await.unwrap();

        let info = patch.personal_info.clone().unwrap();
        assert_eq!(info.full_name, "Ada Lovelace");
        assert_eq!(info.linkedin, "linkedin.com/in/ada");
        assert_eq!(patch.professional_summary.as_deref(), Some("Analyst of engines."));

        let experience = patch.experience.clone().unwrap();
        assert_eq!(experience.len(), 2);
        assert_eq!(experience[0].id, "1");
        assert_eq!(experience[1].id, "2");
        assert!(experience[0].currently_working);
        assert_eq!(experience[0].end_date, "");
        assert_eq!(experience[1].company_name, "Babbage & Co");

        assert_eq!(patch.education, None);
        assert_eq!(
            patch.skills.clone().unwrap(),
            vec!["Mathematics".to_string(), "Notes".to_string()]
        );
        assert_eq!(patch.certifications.clone().unwrap()[0].url, None);
        assert_eq!(patch.title, None);
        assert!(patch.validate().is_ok());
    }

    #[tokio::test]
    async fn test_unparsable_import_is_unprocessable() {
        let llm = fake_llm("Sorry, I can't read that.").await;
        let err = import_profile(&llm, "garbage").await.unwrap_err();
        assert!(matches!(err, AppError::UnprocessableEntity(_)));
    }

    #[test]
    fn test_empty_profile_touches_nothing() {
        assert!(LinkedInProfile::default().into_patch().is_empty());
    }
}
