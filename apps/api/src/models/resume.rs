use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Longest title accepted on create or update.
pub const MAX_TITLE_LEN: usize = 200;

pub const DEFAULT_TITLE: &str = "Untitled Resume";

// ────────────────────────────────────────────────────────────────────────────
// Selectors
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum ResumeTemplate {
    #[default]
    Classic,
    Modern,
    MinimalImage,
    Minimal,
    Executive,
    Creative,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum AccentColor {
    #[default]
    Blue,
    Indigo,
    Teal,
    Emerald,
    Rose,
    Violet,
    Orange,
    Slate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Proficiency {
    Beginner,
    Elementary,
    #[default]
    Intermediate,
    Advanced,
    Native,
}

// ────────────────────────────────────────────────────────────────────────────
// Sections
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalInfo {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub profession: String,
    pub linkedin: String,
    pub website: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceItem {
    pub id: String,
    pub company_name: String,
    pub job_title: String,
    pub start_date: String,
    pub end_date: String,
    pub currently_working: bool,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationItem {
    pub id: String,
    pub institution: String,
    pub degree: String,
    pub field_of_study: String,
    pub graduation_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpa: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectItem {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub technologies: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageItem {
    pub id: String,
    pub language: String,
    pub proficiency: Proficiency,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificationItem {
    pub id: String,
    pub name: String,
    pub issuer: String,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A list entry carrying a client-generated id, unique within its own list only.
pub trait ListEntry {
    fn entry_id(&self) -> &str;
}

macro_rules! impl_list_entry {
    ($($ty:ty),*) => {
        $(impl ListEntry for $ty {
            fn entry_id(&self) -> &str {
                &self.id
            }
        })*
    };
}

impl_list_entry!(
    ExperienceItem,
    EducationItem,
    ProjectItem,
    LanguageItem,
    CertificationItem
);

// ────────────────────────────────────────────────────────────────────────────
// Document
// ────────────────────────────────────────────────────────────────────────────

/// A single resume: full structured content plus publishing metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeDocument {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub template: ResumeTemplate,
    pub accent_color: AccentColor,
    pub personal_info: PersonalInfo,
    pub professional_summary: String,
    pub experience: Vec<ExperienceItem>,
    pub education: Vec<EducationItem>,
    pub projects: Vec<ProjectItem>,
    pub skills: Vec<String>,
    pub languages: Vec<LanguageItem>,
    pub certifications: Vec<CertificationItem>,
    pub is_public: bool,
    pub slug: Option<String>,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Length check for the title a new document is created with. Blank is allowed
/// and falls back to [`DEFAULT_TITLE`].
pub fn check_new_title(title: &str) -> Result<(), InvalidPatch> {
    if title.trim().chars().count() > MAX_TITLE_LEN {
        return Err(InvalidPatch::TitleTooLong);
    }
    Ok(())
}

impl ResumeDocument {
    /// A fresh, private, empty document. Blank titles fall back to [`DEFAULT_TITLE`].
    pub fn new_empty(user_id: Uuid, title: &str, now: DateTime<Utc>) -> Self {
        let title = title.trim();
        Self {
            id: Uuid::new_v4(),
            user_id,
            title: if title.is_empty() {
                DEFAULT_TITLE.to_string()
            } else {
                title.to_string()
            },
            template: ResumeTemplate::default(),
            accent_color: AccentColor::default(),
            personal_info: PersonalInfo::default(),
            professional_summary: String::new(),
            experience: vec![],
            education: vec![],
            projects: vec![],
            skills: vec![],
            languages: vec![],
            certifications: vec![],
            is_public: false,
            slug: None,
            view_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Shallow merge: every field present in `patch` replaces the whole field here.
    /// Lists are never merged element-wise.
    pub fn apply(&mut self, patch: &ResumePatch) {
        if let Some(title) = &patch.title {
            self.title.clone_from(title);
        }
        if let Some(template) = patch.template {
            self.template = template;
        }
        if let Some(accent_color) = patch.accent_color {
            self.accent_color = accent_color;
        }
        if let Some(personal_info) = &patch.personal_info {
            self.personal_info.clone_from(personal_info);
        }
        if let Some(summary) = &patch.professional_summary {
            self.professional_summary.clone_from(summary);
        }
        if let Some(experience) = &patch.experience {
            self.experience.clone_from(experience);
        }
        if let Some(education) = &patch.education {
            self.education.clone_from(education);
        }
        if let Some(projects) = &patch.projects {
            self.projects.clone_from(projects);
        }
        if let Some(skills) = &patch.skills {
            self.skills.clone_from(skills);
        }
        if let Some(languages) = &patch.languages {
            self.languages.clone_from(languages);
        }
        if let Some(certifications) = &patch.certifications {
            self.certifications.clone_from(certifications);
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Partial update
// ────────────────────────────────────────────────────────────────────────────

/// A partial update to the editable fields of a [`ResumeDocument`].
/// `None` means "untouched". Visibility, slug, counters and timestamps are not patchable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResumePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<ResumeTemplate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent_color: Option<AccentColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personal_info: Option<PersonalInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub professional_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<Vec<ExperienceItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education: Option<Vec<EducationItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projects: Option<Vec<ProjectItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<LanguageItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certifications: Option<Vec<CertificationItem>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidPatch {
    #[error("title cannot be empty")]
    EmptyTitle,

    #[error("title is longer than {MAX_TITLE_LEN} characters")]
    TitleTooLong,

    #[error("{section} entry is missing an id")]
    MissingEntryId { section: &'static str },

    #[error("{section} contains duplicate id '{id}'")]
    DuplicateEntryId { section: &'static str, id: String },

    #[error("skills cannot contain empty values")]
    EmptySkill,

    #[error("skill '{0}' is listed more than once")]
    DuplicateSkill(String),
}

impl ResumePatch {
    pub fn is_empty(&self) -> bool {
        self.touched_fields().is_empty()
    }

    /// Folds `newer` into `self`; for every field `newer` touches, its value wins.
    pub fn merge(&mut self, newer: ResumePatch) {
        let ResumePatch {
            title,
            template,
            accent_color,
            personal_info,
            professional_summary,
            experience,
            education,
            projects,
            skills,
            languages,
            certifications,
        } = newer;

        if title.is_some() {
            self.title = title;
        }
        if template.is_some() {
            self.template = template;
        }
        if accent_color.is_some() {
            self.accent_color = accent_color;
        }
        if personal_info.is_some() {
            self.personal_info = personal_info;
        }
        if professional_summary.is_some() {
            self.professional_summary = professional_summary;
        }
        if experience.is_some() {
            self.experience = experience;
        }
        if education.is_some() {
            self.education = education;
        }
        if projects.is_some() {
            self.projects = projects;
        }
        if skills.is_some() {
            self.skills = skills;
        }
        if languages.is_some() {
            self.languages = languages;
        }
        if certifications.is_some() {
            self.certifications = certifications;
        }
    }

    /// Names of the top-level fields this patch touches, in document order.
    pub fn touched_fields(&self) -> Vec<&'static str> {
        [
            ("title", self.title.is_some()),
            ("template", self.template.is_some()),
            ("accent_color", self.accent_color.is_some()),
            ("personal_info", self.personal_info.is_some()),
            ("professional_summary", self.professional_summary.is_some()),
            ("experience", self.experience.is_some()),
            ("education", self.education.is_some()),
            ("projects", self.projects.is_some()),
            ("skills", self.skills.is_some()),
            ("languages", self.languages.is_some()),
            ("certifications", self.certifications.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, touched)| touched.then_some(name))
        .collect()
    }

    /// Structural checks applied by every store before persisting.
    pub fn validate(&self) -> Result<(), InvalidPatch> {
        if let Some(title) = &self.title {
            let title = title.trim();
            if title.is_empty() {
                return Err(InvalidPatch::EmptyTitle);
            }
            if title.chars().count() > MAX_TITLE_LEN {
                return Err(InvalidPatch::TitleTooLong);
            }
        }

        check_entry_ids("experience", self.experience.as_deref())?;
        check_entry_ids("education", self.education.as_deref())?;
        check_entry_ids("projects", self.projects.as_deref())?;
        check_entry_ids("languages", self.languages.as_deref())?;
        check_entry_ids("certifications", self.certifications.as_deref())?;

        if let Some(skills) = &self.skills {
            let mut seen = HashSet::new();
            for skill in skills {
                let normalized = skill.trim().to_lowercase();
                if normalized.is_empty() {
                    return Err(InvalidPatch::EmptySkill);
                }
                if !seen.insert(normalized) {
                    return Err(InvalidPatch::DuplicateSkill(skill.clone()));
                }
            }
        }

        Ok(())
    }
}

fn check_entry_ids<T: ListEntry>(
    section: &'static str,
    entries: Option<&[T]>,
) -> Result<(), InvalidPatch> {
    let Some(entries) = entries else {
        return Ok(());
    };
    let mut seen = HashSet::new();
    for entry in entries {
        let id = entry.entry_id();
        if id.trim().is_empty() {
            return Err(InvalidPatch::MissingEntryId { section });
        }
        if !seen.insert(id) {
            return Err(InvalidPatch::DuplicateEntryId {
                section,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}
