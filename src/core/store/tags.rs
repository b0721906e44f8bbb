use crate::core::model::Tag;

use super::patch::TagPatch;
use super::Store;

fn rewrite_tag(tags: &mut Vec<String>, from_id: &str, to_id: &str) -> bool {
    let Some(position) = tags.iter().position(|tag| tag == from_id) else {
        return false;
    };
    if tags.iter().any(|tag| tag == to_id) {
        tags.remove(position);
    } else {
        tags[position] = to_id.to_string();
    }
    true
}

impl Store {
    pub fn add_tag(&mut self, tag: Tag) {
        if self.tag(&tag.id).is_some() {
            log::debug!("add_tag: tag '{}' already exists", tag.id);
            return;
        }
        self.state.tags.push(tag);
        self.commit();
    }

    pub fn update_tag(&mut self, id: &str, patch: TagPatch) {
        let Some(tag) = self.tag_mut(id) else {
            return;
        };
        if let Some(name) = patch.name {
            tag.name = name;
        }
        if let Some(color) = patch.color {
            tag.color = color;
        }
        if let Some(category) = patch.category {
            tag.category = category;
        }
        self.commit();
    }

    /// Attaches the tag once; the usage counter only moves when the tag was
    /// actually inserted.
    pub fn add_tag_to_conversation(&mut self, conversation_id: &str, tag_id: &str) {
        if self.tag(tag_id).is_none() {
            return;
        }
        let Some(conversation) = self.conversation_mut(conversation_id) else {
            return;
        };
        if conversation.tags.iter().any(|tag| tag == tag_id) {
            return;
        }
        conversation.tags.push(tag_id.to_string());
        conversation.touch();
        self.bump_tag_count(tag_id, 1);
        self.commit();
    }

    pub fn remove_tag_from_conversation(&mut self, conversation_id: &str, tag_id: &str) {
        let Some(conversation) = self.conversation_mut(conversation_id) else {
            return;
        };
        let before = conversation.tags.len();
        conversation.tags.retain(|tag| tag != tag_id);
        if conversation.tags.len() == before {
            return;
        }
        conversation.touch();
        self.bump_tag_count(tag_id, -1);
        self.commit();
    }

    pub fn add_tag_to_document(&mut self, document_id: &str, tag_id: &str) {
        if self.tag(tag_id).is_none() {
            return;
        }
        let Some(document) = self.document_mut(document_id) else {
            return;
        };
        if document.tags.iter().any(|tag| tag == tag_id) {
            return;
        }
        document.tags.push(tag_id.to_string());
        self.bump_tag_count(tag_id, 1);
        self.commit();
    }

    pub fn remove_tag_from_document(&mut self, document_id: &str, tag_id: &str) {
        let Some(document) = self.document_mut(document_id) else {
            return;
        };
        let before = document.tags.len();
        document.tags.retain(|tag| tag != tag_id);
        if document.tags.len() == before {
            return;
        }
        self.bump_tag_count(tag_id, -1);
        self.commit();
    }

    /// Drops the tag and strips it from every conversation and document.
    pub fn delete_tag(&mut self, id: &str) {
        let before = self.state.tags.len();
        self.state.tags.retain(|tag| tag.id != id);
        if self.state.tags.len() == before {
            return;
        }
        for conversation in &mut self.state.conversations {
            conversation.tags.retain(|tag| tag != id);
        }
        for document in &mut self.state.documents {
            document.tags.retain(|tag| tag != id);
        }
        self.commit();
    }

    /// Rewrites every use of `from_id` to `to_id`, drops `from_id` and
    /// recomputes the surviving tag's counter from membership.
    pub fn merge_tag(&mut self, from_id: &str, to_id: &str) {
        if from_id == to_id || self.tag(from_id).is_none() || self.tag(to_id).is_none() {
            log::debug!("merge_tag: nothing to merge for {} -> {}", from_id, to_id);
            return;
        }

        let mut rewritten = 0usize;
        for conversation in &mut self.state.conversations {
            if rewrite_tag(&mut conversation.tags, from_id, to_id) {
                rewritten += 1;
            }
        }
        for document in &mut self.state.documents {
            if rewrite_tag(&mut document.tags, from_id, to_id) {
                rewritten += 1;
            }
        }
        self.state.tags.retain(|tag| tag.id != from_id);

        let usage = self.tag_usage(to_id);
        if let Some(tag) = self.tag_mut(to_id) {
            tag.count = usage;
        }
        log::debug!("merge_tag: {} -> {} rewrote {} entities", from_id, to_id, rewritten);
        self.commit();
    }

    /// Recomputes every counter from the conversations and documents that
    /// actually carry the tag.
    pub fn recount_tags(&mut self) {
        let counts: Vec<u32> = self
            .state
            .tags
            .iter()
            .map(|tag| self.tag_usage(&tag.id))
            .collect();
        for (tag, count) in self.state.tags.iter_mut().zip(counts) {
            tag.count = count;
        }
        self.commit();
    }

    /// Usage derived from membership rather than the stored counter.
    pub fn tag_usage(&self, tag_id: &str) -> u32 {
        let conversations = self
            .state
            .conversations
            .iter()
            .filter(|conversation| conversation.tags.iter().any(|tag| tag == tag_id))
            .count();
        let documents = self
            .state
            .documents
            .iter()
            .filter(|document| document.tags.iter().any(|tag| tag == tag_id))
            .count();
        (conversations + documents) as u32
    }

    fn bump_tag_count(&mut self, tag_id: &str, delta: i32) {
        if let Some(tag) = self.tag_mut(tag_id) {
            tag.count = tag.count.saturating_add_signed(delta);
        }
    }
}
