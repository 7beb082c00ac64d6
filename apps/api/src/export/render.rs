use std::fmt::Write;

use serde::Deserialize;

use crate::models::resume::{Proficiency, ResumeDocument};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Markdown,
    Text,
}

impl ExportFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Markdown => "text/markdown; charset=utf-8",
            ExportFormat::Text => "text/plain; charset=utf-8",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Markdown => "md",
            ExportFormat::Text => "txt",
        }
    }
}

/// Accumulates output, spelling structure the way the chosen format does.
struct Renderer {
    format: ExportFormat,
    out: String,
}

impl Renderer {
    fn title(&mut self, text: &str) {
        match self.format {
            ExportFormat::Markdown => self.line(&format!("# {text}")),
            ExportFormat::Text => self.line(&text.to_uppercase()),
        }
    }

    fn section(&mut self, text: &str) {
        self.out.push('\n');
        match self.format {
            ExportFormat::Markdown => self.line(&format!("## {text}")),
            ExportFormat::Text => {
                let heading = text.to_uppercase();
                let rule = "-".repeat(heading.chars().count());
                self.line(&heading);
                self.line(&rule);
            }
        }
    }

    fn entry(&mut self, text: &str) {
        match self.format {
            ExportFormat::Markdown => self.line(&format!("### {text}")),
            ExportFormat::Text => self.line(text),
        }
    }

    fn strong(&mut self, text: &str) {
        match self.format {
            ExportFormat::Markdown => self.line(&format!("**{text}**")),
            ExportFormat::Text => self.line(text),
        }
    }

    fn muted(&mut self, text: &str) {
        match self.format {
            ExportFormat::Markdown => self.line(&format!("*{text}*")),
            ExportFormat::Text => self.line(text),
        }
    }

    fn bullet(&mut self, text: &str) {
        match self.format {
            ExportFormat::Markdown => self.line(&format!("- {text}")),
            ExportFormat::Text => self.line(&format!("* {text}")),
        }
    }

    fn paragraph(&mut self, text: &str) {
        for line in text.trim().lines() {
            self.line(line.trim_end());
        }
    }

    fn line(&mut self, text: &str) {
        let _ = writeln!(self.out, "{text}");
    }
}

fn joined<'a>(parts: impl IntoIterator<Item = &'a str>, separator: &str) -> String {
    parts
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

fn proficiency_label(level: Proficiency) -> &'static str {
    match level {
        Proficiency::Beginner => "Beginner",
        Proficiency::Elementary => "Elementary",
        Proficiency::Intermediate => "Intermediate",
        Proficiency::Advanced => "Advanced",
        Proficiency::Native => "Native",
    }
}

/// Renders the document in the section order of the printed resume. Empty
/// sections are left out entirely.
pub fn render(doc: &ResumeDocument, format: ExportFormat) -> String {
    let mut r = Renderer {
        format,
        out: String::new(),
    };
    let info = &doc.personal_info;

    let name = info.full_name.trim();
    r.title(if name.is_empty() { &doc.title } else { name });
    if !info.profession.trim().is_empty() {
        r.strong(info.profession.trim());
    }
    let contacts = joined(
        [
            info.email.as_str(),
            info.phone.as_str(),
            info.location.as_str(),
            info.linkedin.as_str(),
            info.website.as_str(),
        ],
        " | ",
    );
    if !contacts.is_empty() {
        r.line(&contacts);
    }

    if !doc.professional_summary.trim().is_empty() {
        r.section("Professional Summary");
        r.paragraph(&doc.professional_summary);
    }

    if !doc.experience.is_empty() {
        r.section("Experience");
        for job in &doc.experience {
            r.entry(&joined([job.job_title.as_str(), job.company_name.as_str()], " at "));
            let end = if job.currently_working {
                "Present"
            } else {
                job.end_date.as_str()
            };
            let period = joined([job.start_date.as_str(), end], " - ");
            if !period.is_empty() {
                r.muted(&period);
            }
            r.paragraph(&job.description);
        }
    }

    if !doc.education.is_empty() {
        r.section("Education");
        for school in &doc.education {
            let degree = joined([school.degree.as_str(), school.field_of_study.as_str()], ", ");
            r.entry(&joined([degree.as_str(), school.institution.as_str()], " - "));
            let gpa = school.gpa.as_deref().map(|gpa| format!("GPA {gpa}"));
            let details = joined(
                [school.graduation_date.as_str(), gpa.as_deref().unwrap_or_default()],
                " | ",
            );
            if !details.is_empty() {
                r.muted(&details);
            }
        }
    }

    if !doc.projects.is_empty() {
        r.section("Projects");
        for project in &doc.projects {
            let heading = if project.kind.trim().is_empty() {
                project.name.clone()
            } else {
                format!("{} ({})", project.name, project.kind.trim())
            };
            r.entry(&heading);
            r.paragraph(&project.description);
            if !project.technologies.is_empty() {
                r.line(&format!(
                    "Technologies: {}",
                    joined(project.technologies.iter().map(String::as_str), ", ")
                ));
            }
            if let Some(link) = project.link.as_deref().filter(|l| !l.trim().is_empty()) {
                r.line(link.trim());
            }
        }
    }

    if !doc.skills.is_empty() {
        r.section("Skills");
        r.line(&joined(doc.skills.iter().map(String::as_str), ", "));
    }

    if !doc.languages.is_empty() {
        r.section("Languages");
        for language in &doc.languages {
            r.bullet(&format!(
                "{} ({})",
                language.language.trim(),
                proficiency_label(language.proficiency)
            ));
        }
    }

    if !doc.certifications.is_empty() {
        r.section("Certifications");
        for cert in &doc.certifications {
            let mut text = joined([cert.name.as_str(), cert.issuer.as_str()], ", ");
            if !cert.date.trim().is_empty() {
                text.push_str(&format!(" ({})", cert.date.trim()));
            }
            if let Some(url) = cert.url.as_deref().filter(|u| !u.trim().is_empty()) {
                text.push_str(&format!(" {}", url.trim()));
            }
            r.bullet(&text);
        }
    }

    r.out
}

/// A filesystem-safe download name derived from the title.
pub fn file_name(doc: &ResumeDocument, format: ExportFormat) -> String {
    let mut stem = String::new();
    for c in doc.title.trim().chars() {
        if c.is_ascii_alphanumeric() {
            stem.push(c.to_ascii_lowercase());
        } else if !stem.ends_with('-') && !stem.is_empty() {
            stem.push('-');
        }
    }
    let stem = stem.trim_end_matches('-');
    let stem = if stem.is_empty() { "resume" } else { stem };
    format!("{stem}.{}", format.extension())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::models::resume::{
        CertificationItem, EducationItem, ExperienceItem, LanguageItem, PersonalInfo,
    };

    fn sample() -> ResumeDocument {
        let mut doc = ResumeDocument::new_empty(Uuid::new_v4(), "Backend Resume (2024)", Utc::now());
        doc.personal_info = PersonalInfo {
            full_name: "Jane Doe".into(),
            email: "jane@example.com".into(),
            location: "Berlin".into(),
            profession: "Backend Engineer".into(),
            ..Default::default()
        };
        doc.professional_summary = "Builds reliable services.\nLikes Rust.".into();
        doc.experience = vec![ExperienceItem {
            id: "1".into(),
            company_name: "Acme".into(),
            job_title: "Senior Engineer".into(),
            start_date: "2020".into(),
            currently_working: true,
            description: "Led the payments team.".into(),
            ..Default::default()
        }];
        doc.education = vec![EducationItem {
            id: "1".into(),
            institution: "TU Berlin".into(),
            degree: "BSc".into(),
            field_of_study: "Computer Science".into(),
            graduation_date: "2015".into(),
            gpa: Some("1.3".into()),
        }];
        doc.skills = vec!["Rust".into(), "Postgres".into()];
        doc.languages = vec![LanguageItem {
            id: "1".into(),
            language: "German".into(),
            proficiency: Proficiency::Native,
        }];
        doc.certifications = vec![CertificationItem {
            id: "1".into(),
            name: "CKA".into(),
            issuer: "CNCF".into(),
            date: "2022".into(),
            url: None,
        }];
        doc
    }

    #[test]
    fn test_markdown_layout() {
        let md = render(&sample(), ExportFormat::Markdown);
        let expected = "\
# Jane Doe
**Backend Engineer**
jane@example.com | Berlin

## Professional Summary
Builds reliable services.
Likes Rust.

## Experience
### Senior Engineer at Acme
*2020 - Present*
Led the payments team.

## Education
### BSc, Computer Science - TU Berlin
*2015 | GPA 1.3*

## Skills
Rust, Postgres

## Languages
- German (Native)

## Certifications
- CKA, CNCF (2022)
";
        assert_eq!(md, expected);
    }

    #[test]
    fn test_plain_text_has_no_markup() {
        let text = render(&sample(), ExportFormat::Text);
        assert!(text.starts_with("JANE DOE\nBackend Engineer\n"));
        assert!(text.contains("EXPERIENCE\n----------\nSenior Engineer at Acme\n"));
        assert!(!text.contains('#'));
        assert!(!text.contains("**"));
    }

    #[test]
    fn test_empty_document_is_just_the_title() {
        let doc = ResumeDocument::new_empty(Uuid::new_v4(), "", Utc::now());
        assert_eq!(render(&doc, ExportFormat::Markdown), "# Untitled Resume\n");
    }

    #[test]
    fn test_file_name() {
        let doc = sample();
        assert_eq!(file_name(&doc, ExportFormat::Markdown), "backend-resume-2024.md");
        let blank = ResumeDocument::new_empty(Uuid::new_v4(), "!!!", Utc::now());
        assert_eq!(file_name(&blank, ExportFormat::Text), "resume.txt");
    }
}
