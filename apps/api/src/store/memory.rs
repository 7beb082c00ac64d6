use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::resume::{check_new_title, ResumeDocument, ResumePatch};
use crate::store::{copy_title, new_slug, parse_public_id, ResumeRepository, StoreError};

/// Process-local repository. Backs the test suite and `STORE_BACKEND=memory`.
#[derive(Default)]
pub struct MemoryResumeRepository {
    documents: RwLock<HashMap<Uuid, ResumeDocument>>,
}

impl MemoryResumeRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn owned<'a>(
    documents: &'a mut HashMap<Uuid, ResumeDocument>,
    owner: Uuid,
    id: Uuid,
) -> Result<&'a mut ResumeDocument, StoreError> {
    documents
        .get_mut(&id)
        .filter(|doc| doc.user_id == owner)
        .ok_or(StoreError::NotFound)
}

#[async_trait]
impl ResumeRepository for MemoryResumeRepository {
    async fn list(&self, owner: Uuid) -> Result<Vec<ResumeDocument>, StoreError> {
        let documents = self.documents.read().await;
        let mut mine: Vec<_> = documents
            .values()
            .filter(|doc| doc.user_id == owner)
            .cloned()
            .collect();
        mine.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(mine)
    }

    async fn create(&self, owner: Uuid, title: &str) -> Result<ResumeDocument, StoreError> {
        check_new_title(title)?;
        let doc = ResumeDocument::new_empty(owner, title, Utc::now());
        self.documents.write().await.insert(doc.id, doc.clone());
        Ok(doc)
    }

    async fn fetch(&self, owner: Uuid, id: Uuid) -> Result<ResumeDocument, StoreError> {
        let documents = self.documents.read().await;
        documents
            .get(&id)
            .filter(|doc| doc.user_id == owner)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update(
        &self,
        owner: Uuid,
        id: Uuid,
        patch: &ResumePatch,
    ) -> Result<ResumeDocument, StoreError> {
        patch.validate()?;
        let mut documents = self.documents.write().await;
        let doc = owned(&mut documents, owner, id)?;
        doc.apply(patch);
        doc.updated_at = Utc::now();
        Ok(doc.clone())
    }

    async fn delete(&self, owner: Uuid, id: Uuid) -> Result<(), StoreError> {
        let mut documents = self.documents.write().await;
        owned(&mut documents, owner, id)?;
        documents.remove(&id);
        Ok(())
    }

    async fn set_public(
        &self,
        owner: Uuid,
        id: Uuid,
        desired: bool,
    ) -> Result<ResumeDocument, StoreError> {
        let mut documents = self.documents.write().await;
        let doc = owned(&mut documents, owner, id)?;
        doc.is_public = desired;
        if desired && doc.slug.is_none() {
            doc.slug = Some(new_slug());
        }
        Ok(doc.clone())
    }

    async fn duplicate(&self, owner: Uuid, id: Uuid) -> Result<ResumeDocument, StoreError> {
        let mut documents = self.documents.write().await;
        let original = owned(&mut documents, owner, id)?;
        let now = Utc::now();
        let copy = ResumeDocument {
            id: Uuid::new_v4(),
            title: copy_title(&original.title),
            is_public: false,
            slug: None,
            view_count: 0,
            created_at: now,
            updated_at: now,
            ..original.clone()
        };
        documents.insert(copy.id, copy.clone());
        Ok(copy)
    }

    async fn find_public(&self, slug_or_id: &str) -> Result<ResumeDocument, StoreError> {
        let documents = self.documents.read().await;
        let by_slug = documents
            .values()
            .find(|doc| doc.is_public && doc.slug.as_deref() == Some(slug_or_id));
        let found = match by_slug {
            Some(doc) => Some(doc),
            None => parse_public_id(slug_or_id)
                .and_then(|id| documents.get(&id))
                .filter(|doc| doc.is_public),
        };
        found.cloned().ok_or(StoreError::NotFound)
    }

    async fn increment_views(&self, id: Uuid) -> Result<(), StoreError> {
        let mut documents = self.documents.write().await;
        let doc = documents.get_mut(&id).ok_or(StoreError::NotFound)?;
        doc.view_count += 1;
        Ok(())
    }
}
