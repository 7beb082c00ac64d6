use crate::models::resume::ResumePatch;

/// Union of every edit since the last flush was handed to the store.
#[derive(Debug, Default)]
pub struct EditBuffer {
    pending: ResumePatch,
}

impl EditBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last write per field wins.
    pub fn record(&mut self, patch: ResumePatch) {
        self.pending.merge(patch);
    }

    /// Empties the buffer. `None` means there is nothing worth a network call.
    pub fn drain(&mut self) -> Option<ResumePatch> {
        if self.pending.is_empty() {
            return None;
        }
        Some(std::mem::take(&mut self.pending))
    }

    pub fn pending(&self) -> &ResumePatch {
        &self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_empty_buffer_yields_nothing() {
        let mut buffer = EditBuffer::new();
        assert_eq!(buffer.drain(), None);
    }

    #[test]
    fn test_drain_returns_union_and_clears() {
        let mut buffer = EditBuffer::new();
        buffer.record(ResumePatch {
            skills: Some(vec!["Go".to_string()]),
            ..Default::default()
        });
        buffer.record(ResumePatch {
            title: Some("Resume".to_string()),
            ..Default::default()
        });
        buffer.record(ResumePatch {
            skills: Some(vec!["Go".to_string(), "Rust".to_string()]),
            ..Default::default()
        });

        let drained = buffer.drain().unwrap();
        assert_eq!(drained.title.as_deref(), Some("Resume"));
        assert_eq!(
            drained.skills,
            Some(vec!["Go".to_string(), "Rust".to_string()])
        );
        assert!(buffer.is_empty());
        assert_eq!(buffer.drain(), None);
    }
}
