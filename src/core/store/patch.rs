//! Partial updates accepted by the store's update actions.
//!
//! `None` leaves a field untouched. For nullable fields the inner `Option`
//! carries the new value, so `Some(None)` clears it.

use crate::core::model::{
    Conversation, Document, DocumentChunk, DocumentMetadata, DocumentSource, Folder, Message,
    NotificationPreferences, ResponseSpeed, TagCategory, Theme, UiPreferences,
};

#[derive(Debug, Clone, Default)]
pub struct ConversationPatch {
    pub title: Option<String>,
    pub folder_id: Option<Option<String>>,
    pub pinned: Option<bool>,
    pub archived: Option<bool>,
    pub shared: Option<bool>,
    pub category: Option<String>,
    pub summary: Option<Option<String>>,
    pub rating: Option<Option<u8>>,
}

impl ConversationPatch {
    pub(super) fn apply(self, conversation: &mut Conversation) {
        if let Some(title) = self.title {
            conversation.title = title;
        }
        if let Some(folder_id) = self.folder_id {
            conversation.folder_id = folder_id;
        }
        if let Some(pinned) = self.pinned {
            conversation.pinned = pinned;
        }
        if let Some(archived) = self.archived {
            conversation.archived = archived;
        }
        if let Some(shared) = self.shared {
            conversation.shared = shared;
        }
        if let Some(category) = self.category {
            conversation.category = category;
        }
        if let Some(summary) = self.summary {
            conversation.summary = summary;
        }
        if let Some(rating) = self.rating {
            conversation.rating = rating.map(clamp_rating);
        }
    }
}

pub(super) fn clamp_rating(rating: u8) -> u8 {
    rating.clamp(1, 5)
}

#[derive(Debug, Clone, Default)]
pub struct MessagePatch {
    pub content: Option<String>,
    pub confidence: Option<f32>,
    pub sources: Option<Vec<DocumentSource>>,
    pub processing: Option<bool>,
}

impl MessagePatch {
    pub(super) fn apply(self, message: &mut Message) {
        if let Some(content) = self.content {
            message.content = content;
        }
        if let Some(confidence) = self.confidence {
            message.confidence = Some(confidence.clamp(0.0, 1.0));
        }
        if let Some(sources) = self.sources {
            message.sources = Some(sources);
        }
        if let Some(processing) = self.processing {
            message.processing = processing.then_some(true);
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DocumentPatch {
    pub title: Option<String>,
    pub category: Option<String>,
    pub folder_id: Option<Option<String>>,
    pub processed: Option<bool>,
    pub chunks: Option<Vec<DocumentChunk>>,
    pub metadata: Option<DocumentMetadata>,
}

impl DocumentPatch {
    pub(super) fn apply(self, document: &mut Document) {
        if let Some(title) = self.title {
            document.title = title;
        }
        if let Some(category) = self.category {
            document.category = category;
        }
        if let Some(folder_id) = self.folder_id {
            document.folder_id = folder_id;
        }
        if let Some(processed) = self.processed {
            document.processed = processed;
        }
        if let Some(chunks) = self.chunks {
            document.chunks = chunks;
        }
        if let Some(metadata) = self.metadata {
            document.metadata = metadata;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FolderPatch {
    pub name: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub parent_id: Option<Option<String>>,
    pub order: Option<i64>,
}

impl FolderPatch {
    pub(super) fn apply(self, folder: &mut Folder) {
        if let Some(name) = self.name {
            folder.name = name;
        }
        if let Some(color) = self.color {
            folder.color = color;
        }
        if let Some(icon) = self.icon {
            folder.icon = icon;
        }
        if let Some(parent_id) = self.parent_id {
            folder.parent_id = parent_id;
        }
        if let Some(order) = self.order {
            folder.order = order;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TagPatch {
    pub name: Option<String>,
    pub color: Option<String>,
    pub category: Option<TagCategory>,
}

#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<Option<String>>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PreferencesPatch {
    pub theme: Option<Theme>,
    pub language: Option<String>,
    pub timezone: Option<String>,
    pub notifications: Option<NotificationPreferences>,
    pub ui: Option<UiPreferences>,
}

#[derive(Debug, Clone, Default)]
pub struct SettingsPatch {
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub response_speed: Option<ResponseSpeed>,
    pub include_context: Option<bool>,
    pub auto_save: Option<bool>,
    pub language: Option<String>,
}
