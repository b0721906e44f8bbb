use chrono::Utc;

use crate::core::model::{content_hash, Document, DocumentRelationship, DocumentVersion, FolderType};

use super::patch::DocumentPatch;
use super::Store;

impl Store {
    pub fn add_document(&mut self, document: Document) {
        self.state.documents.insert(0, document);
        self.commit();
    }

    pub fn update_document(&mut self, id: &str, mut patch: DocumentPatch) {
        if let Some(Some(folder_id)) = patch.folder_id.as_ref() {
            if !self.folder_accepts(folder_id, FolderType::Document) {
                log::debug!(
                    "update_document: ignoring folder '{}' for document '{}'",
                    folder_id,
                    id
                );
                patch.folder_id = None;
            }
        }
        let Some(document) = self.document_mut(id) else {
            log::debug!("update_document: unknown document '{}'", id);
            return;
        };
        patch.apply(document);
        self.commit();
    }

    /// Replaces the content and records a new version. Identical content is
    /// not a new version. The chunks are dropped and the document is marked
    /// unprocessed until it is processed again.
    pub fn update_document_content(
        &mut self,
        id: &str,
        content: impl Into<String>,
        changes: impl Into<String>,
    ) {
        let content = content.into();
        let Some(document) = self.document_mut(id) else {
            return;
        };
        let hash = content_hash(&content);
        if hash == content_hash(&document.content) {
            return;
        }

        document.version += 1;
        document.version_history.push(DocumentVersion {
            version: document.version,
            timestamp: Utc::now(),
            changes: changes.into(),
            content_hash: hash,
        });
        document.file_size = content.len() as u64;
        document.content = content;
        document.chunks.clear();
        document.processed = false;
        self.commit();
    }

    pub fn delete_document(&mut self, id: &str) {
        self.delete_documents(&[id]);
    }

    /// Removes the documents together with every relationship edge that
    /// pointed at them.
    pub fn delete_documents<S: AsRef<str>>(&mut self, ids: &[S]) {
        let doomed = |id: &str| ids.iter().any(|candidate| candidate.as_ref() == id);

        let before = self.state.documents.len();
        self.state.documents.retain(|document| !doomed(&document.id));
        if self.state.documents.len() == before {
            return;
        }

        for document in &mut self.state.documents {
            document
                .relationships
                .retain(|relationship| !doomed(&relationship.document_id));
        }
        self.state.selected_documents.retain(|id| !doomed(id));
        self.commit();
    }

    pub fn move_document_to_folder(&mut self, id: &str, folder_id: Option<&str>) {
        if let Some(folder_id) = folder_id {
            if !self.folder_accepts(folder_id, FolderType::Document) {
                log::debug!("move_document_to_folder: unknown folder '{}'", folder_id);
                return;
            }
        }
        let Some(document) = self.document_mut(id) else {
            return;
        };
        document.folder_id = folder_id.map(ToOwned::to_owned);
        self.commit();
    }

    pub fn record_document_access(&mut self, id: &str) {
        let Some(document) = self.document_mut(id) else {
            return;
        };
        document.metadata.last_accessed = Some(Utc::now());
        document.metadata.access_count = document.metadata.access_count.saturating_add(1);
        self.commit();
    }

    /// Adds or replaces the edge from `from_id` to `relationship.document_id`.
    /// Self-edges and edges to unknown documents are ignored.
    pub fn add_document_relationship(&mut self, from_id: &str, mut relationship: DocumentRelationship) {
        if relationship.document_id == from_id || self.document(&relationship.document_id).is_none() {
            log::debug!(
                "add_document_relationship: rejected edge {} -> {}",
                from_id,
                relationship.document_id
            );
            return;
        }
        relationship.strength = relationship.strength.clamp(0.0, 1.0);

        let Some(document) = self.document_mut(from_id) else {
            return;
        };
        match document
            .relationships
            .iter_mut()
            .find(|existing| existing.document_id == relationship.document_id)
        {
            Some(existing) => *existing = relationship,
            None => document.relationships.push(relationship),
        }
        self.commit();
    }

    pub fn remove_document_relationship(&mut self, from_id: &str, target_id: &str) {
        let Some(document) = self.document_mut(from_id) else {
            return;
        };
        let before = document.relationships.len();
        document
            .relationships
            .retain(|relationship| relationship.document_id != target_id);
        if document.relationships.len() != before {
            self.commit();
        }
    }

    pub fn toggle_document_selection(&mut self, id: &str) {
        if self.document(id).is_none() {
            return;
        }
        let selected = &mut self.state.selected_documents;
        match selected.iter().position(|existing| existing == id) {
            Some(index) => {
                selected.remove(index);
            }
            None => selected.push(id.to_string()),
        }
    }

    pub fn clear_document_selection(&mut self) {
        self.state.selected_documents.clear();
    }

    pub fn selected_documents(&self) -> Vec<&Document> {
        self.state
            .selected_documents
            .iter()
            .filter_map(|id| self.document(id))
            .collect()
    }
}
