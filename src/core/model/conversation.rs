use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp;

/// Id of the placeholder message shown while a response is being generated.
pub const TYPING_MESSAGE_ID: &str = "typing";

pub const DEFAULT_CONVERSATION_CATEGORY: &str = "general";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionType {
    Like,
    Dislike,
    Bookmark,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reaction {
    #[serde(rename = "type")]
    pub kind: ReactionType,
    pub user_id: String,
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
}

/// A citation attached to an assistant answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSource {
    pub document_id: String,
    pub title: String,
    pub excerpt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    pub relevance: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub content: String,
    pub role: Role,
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<DocumentSource>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reactions: Option<Vec<Reaction>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            content: content.into(),
            role,
            timestamp: Utc::now(),
            sources: None,
            confidence: None,
            processing: None,
            reactions: None,
            parent_id: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Placeholder appended while the assistant answer is pending.
    pub fn typing_placeholder() -> Self {
        Self {
            id: TYPING_MESSAGE_ID.to_string(),
            processing: Some(true),
            ..Self::assistant("")
        }
    }

    pub fn is_processing(&self) -> bool {
        self.processing.unwrap_or(false)
    }

    pub fn reaction(&self, kind: ReactionType) -> Option<&Reaction> {
        self.reactions
            .as_deref()
            .and_then(|reactions| reactions.iter().find(|reaction| reaction.kind == kind))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub shared: bool,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
}

fn default_category() -> String {
    DEFAULT_CONVERSATION_CATEGORY.to_string()
}

impl Conversation {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: title.into(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
            folder_id: None,
            tags: Vec::new(),
            pinned: false,
            archived: false,
            shared: false,
            category: default_category(),
            summary: None,
            rating: None,
        }
    }

    pub fn message(&self, message_id: &str) -> Option<&Message> {
        self.messages.iter().find(|message| message.id == message_id)
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = timestamp::advance(self.updated_at);
    }
}

fn truncate_chars(input: &str, max_chars: usize) -> String {
    if input.chars().count() <= max_chars {
        return input.to_string();
    }
    if max_chars <= 3 {
        return "...".to_string();
    }

    let head: String = input.chars().take(max_chars - 3).collect();
    format!("{}...", head)
}

pub fn title_from_first_user_message(message: &str) -> String {
    let normalized = message.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.is_empty() {
        "New conversation".to_string()
    } else {
        truncate_chars(&normalized, 50)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_collapses_whitespace_and_truncates() {
        assert_eq!(
            title_from_first_user_message("  보안   정책  요약 "),
            "보안 정책 요약"
        );
        let long = "a".repeat(80);
        let title = title_from_first_user_message(&long);
        assert_eq!(title.chars().count(), 50);
        assert!(title.ends_with("..."));
        assert_eq!(title_from_first_user_message("   "), "New conversation");
    }

    #[test]
    fn typing_placeholder_is_processing_assistant_message() {
        let placeholder = Message::typing_placeholder();
        assert_eq!(placeholder.id, TYPING_MESSAGE_ID);
        assert_eq!(placeholder.role, Role::Assistant);
        assert!(placeholder.is_processing());
    }

    #[test]
    fn conversation_decodes_with_defaults_and_camel_case_keys() {
        let raw = r#"{
            "id": "c1",
            "title": "Test",
            "createdAt": "2024-05-01T00:00:00.000Z",
            "updatedAt": "2024-05-02T00:00:00.000Z",
            "messages": [
                {"id": "m1", "content": "hi", "role": "user", "timestamp": "2024-05-01T00:00:01.000Z",
                 "reactions": [{"type": "like", "userId": "u1", "timestamp": 1714521601000}]}
            ]
        }"#;
        let conversation: Conversation = serde_json::from_str(raw).expect("decode conversation");
        assert_eq!(conversation.category, DEFAULT_CONVERSATION_CATEGORY);
        assert!(conversation.tags.is_empty());
        assert!(conversation.updated_at > conversation.created_at);
        let message = conversation.message("m1").expect("message");
        assert_eq!(
            message.reaction(ReactionType::Like).map(|r| r.user_id.as_str()),
            Some("u1")
        );
    }
}
