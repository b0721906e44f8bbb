use crate::core::model::{Folder, FolderType};

use super::patch::FolderPatch;
use super::Store;

impl Store {
    pub fn add_folder(&mut self, folder: Folder) {
        if self.folder(&folder.id).is_some() {
            log::debug!("add_folder: folder '{}' already exists", folder.id);
            return;
        }
        self.state.folders.push(folder);
        self.commit();
    }

    /// Parent changes that would put a folder under itself, under one of its
    /// descendants or under a folder of the other type are ignored.
    pub fn update_folder(&mut self, id: &str, mut patch: FolderPatch) {
        let Some(folder_type) = self.folder(id).map(|folder| folder.folder_type) else {
            log::debug!("update_folder: unknown folder '{}'", id);
            return;
        };
        if let Some(Some(parent_id)) = patch.parent_id.as_ref() {
            if !self.folder_accepts(parent_id, folder_type) || self.is_same_or_descendant(parent_id, id) {
                log::debug!("update_folder: rejected parent '{}' for '{}'", parent_id, id);
                patch.parent_id = None;
            }
        }
        if let Some(folder) = self.folder_mut(id) {
            patch.apply(folder);
        }
        self.commit();
    }

    /// Deletes the folder and detaches everything that referenced it, so no
    /// dangling folder reference survives.
    pub fn delete_folder(&mut self, id: &str) {
        let before = self.state.folders.len();
        self.state.folders.retain(|folder| folder.id != id);
        if self.state.folders.len() == before {
            return;
        }

        for folder in &mut self.state.folders {
            if folder.parent_id.as_deref() == Some(id) {
                folder.parent_id = None;
            }
        }
        for conversation in &mut self.state.conversations {
            if conversation.folder_id.as_deref() == Some(id) {
                conversation.folder_id = None;
            }
        }
        for document in &mut self.state.documents {
            if document.folder_id.as_deref() == Some(id) {
                document.folder_id = None;
            }
        }
        self.commit();
    }

    /// Assigns `order` by position in `ordered_ids`. Folders of that type not
    /// listed keep their relative order after the listed ones.
    pub fn reorder_folders<S: AsRef<str>>(&mut self, folder_type: FolderType, ordered_ids: &[S]) {
        let mut next = ordered_ids.len() as i64;
        let mut remaining: Vec<&mut Folder> = Vec::new();
        for folder in self
            .state
            .folders
            .iter_mut()
            .filter(|folder| folder.folder_type == folder_type)
        {
            match ordered_ids.iter().position(|id| id.as_ref() == folder.id) {
                Some(position) => folder.order = position as i64,
                None => remaining.push(folder),
            }
        }
        remaining.sort_by_key(|folder| folder.order);
        for folder in remaining {
            folder.order = next;
            next += 1;
        }
        self.commit();
    }

    fn is_same_or_descendant(&self, candidate_id: &str, ancestor_id: &str) -> bool {
        let mut cursor = Some(candidate_id);
        let mut steps = 0;
        while let Some(current) = cursor {
            if current == ancestor_id {
                return true;
            }
            // Guards against cycles already present in loaded data.
            steps += 1;
            if steps > self.state.folders.len() {
                return true;
            }
            cursor = self.folder(current).and_then(|folder| folder.parent_id.as_deref());
        }
        false
    }
}
