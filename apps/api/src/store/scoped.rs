use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::resume::{ResumeDocument, ResumePatch};
use crate::store::{DocumentStore, ResumeRepository, StoreError};

/// Binds a repository to one owner so it can back an editing session in-process.
#[derive(Clone)]
pub struct ScopedDocumentStore {
    repo: Arc<dyn ResumeRepository>,
    owner: Uuid,
}

impl ScopedDocumentStore {
    pub fn new(repo: Arc<dyn ResumeRepository>, owner: Uuid) -> Self {
        Self { repo, owner }
    }
}

#[async_trait]
impl DocumentStore for ScopedDocumentStore {
    async fn fetch(&self, id: Uuid) -> Result<ResumeDocument, StoreError> {
        self.repo.fetch(self.owner, id).await
    }

    async fn update(&self, id: Uuid, patch: &ResumePatch) -> Result<ResumeDocument, StoreError> {
        self.repo.update(self.owner, id, patch).await
    }

    async fn create(&self, title: &str) -> Result<ResumeDocument, StoreError> {
        self.repo.create(self.owner, title).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.repo.delete(self.owner, id).await
    }

    async fn set_public(&self, id: Uuid, desired: bool) -> Result<ResumeDocument, StoreError> {
        self.repo.set_public(self.owner, id, desired).await
    }
}
