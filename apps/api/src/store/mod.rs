//! Resume persistence.
//!
//! Two seams live here:
//! - [`ResumeRepository`]: owner-scoped storage used by the HTTP handlers
//!   (`PgResumeRepository` in production, `MemoryResumeRepository` for tests and local runs).
//! - [`DocumentStore`]: the per-caller client the editing session persists through
//!   (`HttpDocumentStore` over the REST API, `ScopedDocumentStore` in-process).

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::resume::{InvalidPatch, ResumeDocument, ResumePatch, MAX_TITLE_LEN};

pub mod http;
pub mod memory;
pub mod postgres;
pub mod scoped;

pub use http::HttpDocumentStore;
pub use memory::MemoryResumeRepository;
pub use postgres::PgResumeRepository;
pub use scoped::ScopedDocumentStore;

/// Public slugs are this many lowercase hex characters.
pub const SLUG_LEN: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Invalid update: {0}")]
    Validation(String),

    #[error("Resume not found")]
    NotFound,

    #[error("Store error: {0}")]
    Backend(String),
}

impl From<InvalidPatch> for StoreError {
    fn from(err: InvalidPatch) -> Self {
        StoreError::Validation(err.to_string())
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            other => StoreError::Backend(other.to_string()),
        }
    }
}

/// Client-side view of the document store, bound to one caller.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn fetch(&self, id: Uuid) -> Result<ResumeDocument, StoreError>;

    async fn update(&self, id: Uuid, patch: &ResumePatch) -> Result<ResumeDocument, StoreError>;

    async fn create(&self, title: &str) -> Result<ResumeDocument, StoreError>;

    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;

    /// Idempotent. A slug is minted on the first publish only and kept afterwards.
    async fn set_public(&self, id: Uuid, desired: bool) -> Result<ResumeDocument, StoreError>;
}

/// Server-side storage. Every owner-scoped call fails with `NotFound` when the
/// document exists but belongs to someone else.
#[async_trait]
pub trait ResumeRepository: Send + Sync {
    /// Most recently updated first.
    async fn list(&self, owner: Uuid) -> Result<Vec<ResumeDocument>, StoreError>;

    async fn create(&self, owner: Uuid, title: &str) -> Result<ResumeDocument, StoreError>;

    async fn fetch(&self, owner: Uuid, id: Uuid) -> Result<ResumeDocument, StoreError>;

    async fn update(
        &self,
        owner: Uuid,
        id: Uuid,
        patch: &ResumePatch,
    ) -> Result<ResumeDocument, StoreError>;

    async fn delete(&self, owner: Uuid, id: Uuid) -> Result<(), StoreError>;

    async fn set_public(
        &self,
        owner: Uuid,
        id: Uuid,
        desired: bool,
    ) -> Result<ResumeDocument, StoreError>;

    /// Private copy titled "Copy of …" with no slug.
    async fn duplicate(&self, owner: Uuid, id: Uuid) -> Result<ResumeDocument, StoreError>;

    /// Unauthenticated lookup: slug first, then a UUID v4 id. Only public documents match.
    async fn find_public(&self, slug_or_id: &str) -> Result<ResumeDocument, StoreError>;

    async fn increment_views(&self, id: Uuid) -> Result<(), StoreError>;
}

pub fn new_slug() -> String {
    let mut slug = Uuid::new_v4().simple().to_string();
    slug.truncate(SLUG_LEN);
    slug
}

/// Parses a hyphenated UUID v4, the only id form accepted on the public path.
pub fn parse_public_id(value: &str) -> Option<Uuid> {
    if value.len() != 36 {
        return None;
    }
    Uuid::parse_str(value)
        .ok()
        .filter(|id| id.get_version_num() == 4)
}

/// Title of a duplicate, clipped so it stays within [`MAX_TITLE_LEN`].
pub fn copy_title(title: &str) -> String {
    let copy: String = format!("Copy of {}", title.trim())
        .chars()
        .take(MAX_TITLE_LEN)
        .collect();
    copy.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_slug_shape() {
        let slug = new_slug();
        assert_eq!(slug.len(), SLUG_LEN);
        assert!(slug.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(slug, new_slug());
    }

    #[test]
    fn test_parse_public_id_accepts_only_hyphenated_v4() {
        let id = Uuid::new_v4();
        assert_eq!(parse_public_id(&id.to_string()), Some(id));
        assert_eq!(parse_public_id(&id.simple().to_string()), None);
        assert_eq!(parse_public_id("a1b2c3d4e5f6"), None);
        assert_eq!(parse_public_id("00000000-0000-1000-8000-000000000000"), None);
    }

    #[test]
    fn test_copy_title_stays_within_limit() {
        assert_eq!(copy_title("Backend"), "Copy of Backend");

        let longest = "x".repeat(MAX_TITLE_LEN);
        let copy = copy_title(&longest);
        assert_eq!(copy.chars().count(), MAX_TITLE_LEN);
        assert!(copy.starts_with("Copy of x"));
        assert!(ResumePatch {
            title: Some(copy),
            ..Default::default()
        }
        .validate()
        .is_ok());
    }

    #[test]
    fn test_invalid_patch_becomes_validation_error() {
        let err: StoreError = InvalidPatch::EmptyTitle.into();
        assert!(matches!(err, StoreError::Validation(msg) if msg.contains("title")));
    }
}
