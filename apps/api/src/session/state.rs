use crate::models::resume::{ResumeDocument, ResumePatch};

/// The in-memory document shown to the user. Edits land here before any network call.
#[derive(Debug, Clone)]
pub struct SessionState {
    document: ResumeDocument,
}

impl SessionState {
    pub fn new(document: ResumeDocument) -> Self {
        Self { document }
    }

    pub fn document(&self) -> &ResumeDocument {
        &self.document
    }

    /// Optimistic local mutation, same shallow-replace rule as the store.
    pub fn apply(&mut self, patch: &ResumePatch) {
        self.document.apply(patch);
    }

    /// Takes the server-confirmed document, then replays edits that are still
    /// buffered so the view never goes back in time.
    pub fn adopt(&mut self, confirmed: ResumeDocument, unsent: &ResumePatch) {
        self.document = confirmed;
        self.document.apply(unsent);
    }
}
