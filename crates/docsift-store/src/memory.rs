//! In-memory DocumentStore for tests

use crate::{next_timestamp, now_millis, StoreError};
use docsift_domain::traits::DocumentStore;
use docsift_domain::{AnalysisResult, Document, DocumentId, NewDocument};
use std::collections::HashMap;

/// Non-persistent store with the same semantics as [`crate::SqliteStore`]
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    documents: HashMap<DocumentId, Document>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the store holds no documents
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl DocumentStore for MemoryStore {
    type Error = StoreError;

    fn create(&mut self, document: NewDocument) -> Result<Document, Self::Error> {
        if self.documents.contains_key(&document.id) {
            return Err(StoreError::Duplicate(document.id));
        }

        let created = Document::from_new(document, now_millis());
        self.documents.insert(created.id.clone(), created.clone());
        Ok(created)
    }

    fn get_by_id(&self, id: &DocumentId) -> Result<Option<Document>, Self::Error> {
        Ok(self.documents.get(id).cloned())
    }

    fn update_analysis(
        &mut self,
        id: &DocumentId,
        analysis: &AnalysisResult,
    ) -> Result<Document, Self::Error> {
        let document = self
            .documents
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;

        document.analysis = Some(analysis.clone());
        document.updated_at = next_timestamp(document.updated_at);
        Ok(document.clone())
    }

    fn list_all(&self) -> Result<Vec<Document>, Self::Error> {
        let mut documents: Vec<Document> = self.documents.values().cloned().collect();
        documents.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(documents)
    }
}
