use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::models::resume::{
    check_new_title, AccentColor, CertificationItem, EducationItem, ExperienceItem, LanguageItem,
    PersonalInfo, ProjectItem, ResumeDocument, ResumePatch, ResumeTemplate,
};
use crate::store::{copy_title, new_slug, parse_public_id, ResumeRepository, StoreError};

/// Row shape of the `resumes` table. Sections are JSONB, skills is TEXT[].
#[derive(Debug, FromRow)]
struct ResumeRow {
    id: Uuid,
    user_id: Uuid,
    title: String,
    template: ResumeTemplate,
    accent_color: AccentColor,
    personal_info: Json<PersonalInfo>,
    professional_summary: String,
    experience: Json<Vec<ExperienceItem>>,
    education: Json<Vec<EducationItem>>,
    projects: Json<Vec<ProjectItem>>,
    skills: Vec<String>,
    languages: Json<Vec<LanguageItem>>,
    certifications: Json<Vec<CertificationItem>>,
    is_public: bool,
    slug: Option<String>,
    view_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ResumeRow> for ResumeDocument {
    fn from(row: ResumeRow) -> Self {
        ResumeDocument {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            template: row.template,
            accent_color: row.accent_color,
            personal_info: row.personal_info.0,
            professional_summary: row.professional_summary,
            experience: row.experience.0,
            education: row.education.0,
            projects: row.projects.0,
            skills: row.skills,
            languages: row.languages.0,
            certifications: row.certifications.0,
            is_public: row.is_public,
            slug: row.slug,
            view_count: row.view_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Postgres-backed repository. Schema: `migrations/0001_resumes.sql`.
#[derive(Clone)]
pub struct PgResumeRepository {
    pool: PgPool,
}

impl PgResumeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResumeRepository for PgResumeRepository {
    async fn list(&self, owner: Uuid) -> Result<Vec<ResumeDocument>, StoreError> {
        let rows = sqlx::query_as::<_, ResumeRow>(
            "SELECT * FROM resumes WHERE user_id = $1 ORDER BY updated_at DESC",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(ResumeDocument::from).collect())
    }

    async fn create(&self, owner: Uuid, title: &str) -> Result<ResumeDocument, StoreError> {
        check_new_title(title)?;
        let doc = ResumeDocument::new_empty(owner, title, Utc::now());
        let row = sqlx::query_as::<_, ResumeRow>(
            r#"
            INSERT INTO resumes
                (id, user_id, title, template, accent_color, personal_info,
                 professional_summary, experience, education, projects, skills,
                 languages, certifications, is_public)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, FALSE)
            RETURNING *
            "#,
        )
        .bind(doc.id)
        .bind(owner)
        .bind(&doc.title)
        .bind(doc.template)
        .bind(doc.accent_color)
        .bind(Json(&doc.personal_info))
        .bind(&doc.professional_summary)
        .bind(Json(&doc.experience))
        .bind(Json(&doc.education))
        .bind(Json(&doc.projects))
        .bind(&doc.skills)
        .bind(Json(&doc.languages))
        .bind(Json(&doc.certifications))
        .fetch_one(&self.pool)
        .await?;

        info!("Created resume {} for user {owner}", row.id);
        Ok(row.into())
    }

    async fn fetch(&self, owner: Uuid, id: Uuid) -> Result<ResumeDocument, StoreError> {
        sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?
            .map(ResumeDocument::from)
            .ok_or(StoreError::NotFound)
    }

    async fn update(
        &self,
        owner: Uuid,
        id: Uuid,
        patch: &ResumePatch,
    ) -> Result<ResumeDocument, StoreError> {
        patch.validate()?;

        // Untouched fields bind NULL and COALESCE keeps the stored value.
        sqlx::query_as::<_, ResumeRow>(
            r#"
            UPDATE resumes SET
                title                = COALESCE($3, title),
                template             = COALESCE($4, template),
                accent_color         = COALESCE($5, accent_color),
                personal_info        = COALESCE($6, personal_info),
                professional_summary = COALESCE($7, professional_summary),
                experience           = COALESCE($8, experience),
                education            = COALESCE($9, education),
                projects             = COALESCE($10, projects),
                skills               = COALESCE($11, skills),
                languages            = COALESCE($12, languages),
                certifications       = COALESCE($13, certifications),
                updated_at           = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(patch.title.as_deref())
        .bind(patch.template)
        .bind(patch.accent_color)
        .bind(patch.personal_info.as_ref().map(Json))
        .bind(patch.professional_summary.as_deref())
        .bind(patch.experience.as_ref().map(Json))
        .bind(patch.education.as_ref().map(Json))
        .bind(patch.projects.as_ref().map(Json))
        .bind(patch.skills.as_deref())
        .bind(patch.languages.as_ref().map(Json))
        .bind(patch.certifications.as_ref().map(Json))
        .fetch_optional(&self.pool)
        .await?
        .map(ResumeDocument::from)
        .ok_or(StoreError::NotFound)
    }

    async fn delete(&self, owner: Uuid, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM resumes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        info!("Deleted resume {id} for user {owner}");
        Ok(())
    }

    async fn set_public(
        &self,
        owner: Uuid,
        id: Uuid,
        desired: bool,
    ) -> Result<ResumeDocument, StoreError> {
        // COALESCE keeps an existing slug, so concurrent first publishes agree on one.
        sqlx::query_as::<_, ResumeRow>(
            r#"
            UPDATE resumes SET
                is_public = $3,
                slug = CASE WHEN $3 THEN COALESCE(slug, $4) ELSE slug END
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(desired)
        .bind(new_slug())
        .fetch_optional(&self.pool)
        .await?
        .map(ResumeDocument::from)
        .ok_or(StoreError::NotFound)
    }

    async fn duplicate(&self, owner: Uuid, id: Uuid) -> Result<ResumeDocument, StoreError> {
        let original = self.fetch(owner, id).await?;
        let row = sqlx::query_as::<_, ResumeRow>(
            r#"
            INSERT INTO resumes
                (id, user_id, title, template, accent_color, personal_info,
                 professional_summary, experience, education, projects, skills,
                 languages, certifications, is_public, slug)
            SELECT $1, user_id, $2, template, accent_color, personal_info,
                   professional_summary, experience, education, projects, skills,
                   languages, certifications, FALSE, NULL
            FROM resumes
            WHERE id = $3 AND user_id = $4
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(copy_title(&original.title))
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;

        Ok(row.into())
    }

    async fn find_public(&self, slug_or_id: &str) -> Result<ResumeDocument, StoreError> {
        let by_slug = sqlx::query_as::<_, ResumeRow>(
            "SELECT * FROM resumes WHERE is_public = TRUE AND slug = $1",
        )
        .bind(slug_or_id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = by_slug {
            return Ok(row.into());
        }

        let Some(id) = parse_public_id(slug_or_id) else {
            return Err(StoreError::NotFound);
        };

        sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes WHERE is_public = TRUE AND id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(ResumeDocument::from)
            .ok_or(StoreError::NotFound)
    }

    async fn increment_views(&self, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("UPDATE resumes SET view_count = view_count + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
