use chrono::Utc;

use crate::core::model::{Conversation, FolderType, Message, Reaction, ReactionType};

use super::patch::{clamp_rating, ConversationPatch, MessagePatch};
use super::Store;

impl Store {
    /// Prepends; callers supply most-recent-first ordering.
    pub fn add_conversation(&mut self, conversation: Conversation) {
        self.state.conversations.insert(0, conversation);
        self.commit();
    }

    pub fn update_conversation(&mut self, id: &str, mut patch: ConversationPatch) {
        if let Some(Some(folder_id)) = patch.folder_id.as_ref() {
            if !self.folder_accepts(folder_id, FolderType::Conversation) {
                log::debug!(
                    "update_conversation: ignoring folder '{}' for conversation '{}'",
                    folder_id,
                    id
                );
                patch.folder_id = None;
            }
        }
        let Some(conversation) = self.conversation_mut(id) else {
            log::debug!("update_conversation: unknown conversation '{}'", id);
            return;
        };
        patch.apply(conversation);
        conversation.touch();
        self.commit();
    }

    pub fn delete_conversation(&mut self, id: &str) {
        self.delete_conversations(&[id]);
    }

    pub fn delete_conversations<S: AsRef<str>>(&mut self, ids: &[S]) {
        let before = self.state.conversations.len();
        self.state
            .conversations
            .retain(|c| !ids.iter().any(|id| id.as_ref() == c.id));
        if self.state.conversations.len() == before {
            return;
        }

        if let Some(current) = self.state.current_conversation_id.as_deref() {
            if ids.iter().any(|id| id.as_ref() == current) {
                self.state.current_conversation_id = None;
            }
        }
        self.commit();
    }

    /// Points the UI at a conversation. An unknown id clears the pointer.
    pub fn set_current_conversation(&mut self, id: Option<&str>) {
        self.state.current_conversation_id = id
            .filter(|id| self.state.conversations.iter().any(|c| c.id == *id))
            .map(ToOwned::to_owned);
    }

    pub fn current_conversation(&self) -> Option<&Conversation> {
        self.state
            .current_conversation_id
            .as_deref()
            .and_then(|id| self.conversation(id))
    }

    /// Appends without any ordering or duplicate-id check.
    pub fn add_message(&mut self, conversation_id: &str, message: Message) {
        let Some(conversation) = self.conversation_mut(conversation_id) else {
            log::debug!("add_message: unknown conversation '{}'", conversation_id);
            return;
        };
        conversation.messages.push(message);
        conversation.touch();
        self.commit();
    }

    pub fn update_message(&mut self, conversation_id: &str, message_id: &str, patch: MessagePatch) {
        let Some(conversation) = self.conversation_mut(conversation_id) else {
            return;
        };
        let Some(message) = conversation
            .messages
            .iter_mut()
            .find(|message| message.id == message_id)
        else {
            return;
        };
        patch.apply(message);
        conversation.touch();
        self.commit();
    }

    pub fn delete_message(&mut self, conversation_id: &str, message_id: &str) {
        let Some(conversation) = self.conversation_mut(conversation_id) else {
            return;
        };
        let before = conversation.messages.len();
        conversation.messages.retain(|message| message.id != message_id);
        if conversation.messages.len() == before {
            return;
        }
        conversation.touch();
        self.commit();
    }

    /// Reactions behave as a map from type to a single entry: a new reaction
    /// replaces any earlier one of the same type.
    pub fn add_reaction(&mut self, conversation_id: &str, message_id: &str, kind: ReactionType) {
        let user_id = self.state.user.id.clone();
        let Some(conversation) = self.conversation_mut(conversation_id) else {
            return;
        };
        let Some(message) = conversation
            .messages
            .iter_mut()
            .find(|message| message.id == message_id)
        else {
            return;
        };

        let reactions = message.reactions.get_or_insert_with(Vec::new);
        reactions.retain(|reaction| reaction.kind != kind);
        reactions.push(Reaction {
            kind,
            user_id,
            timestamp: Utc::now(),
        });
        conversation.touch();
        self.commit();
    }

    pub fn remove_reaction(&mut self, conversation_id: &str, message_id: &str, kind: ReactionType) {
        let Some(conversation) = self.conversation_mut(conversation_id) else {
            return;
        };
        let Some(message) = conversation
            .messages
            .iter_mut()
            .find(|message| message.id == message_id)
        else {
            return;
        };
        let Some(reactions) = message.reactions.as_mut() else {
            return;
        };
        let before = reactions.len();
        reactions.retain(|reaction| reaction.kind != kind);
        if reactions.len() == before {
            return;
        }
        if reactions.is_empty() {
            message.reactions = None;
        }
        conversation.touch();
        self.commit();
    }

    pub fn rate_conversation(&mut self, id: &str, rating: u8) {
        let Some(conversation) = self.conversation_mut(id) else {
            return;
        };
        conversation.rating = Some(clamp_rating(rating));
        conversation.touch();
        self.commit();
    }

    /// `None` moves the conversation out of any folder. Targets that are not
    /// conversation folders are ignored.
    pub fn move_conversation_to_folder(&mut self, id: &str, folder_id: Option<&str>) {
        if let Some(folder_id) = folder_id {
            if !self.folder_accepts(folder_id, FolderType::Conversation) {
                log::debug!("move_conversation_to_folder: unknown folder '{}'", folder_id);
                return;
            }
        }
        self.update_conversation(
            id,
            ConversationPatch {
                folder_id: Some(folder_id.map(ToOwned::to_owned)),
                ..ConversationPatch::default()
            },
        );
    }

    pub(super) fn folder_accepts(&self, folder_id: &str, folder_type: FolderType) -> bool {
        self.folder(folder_id)
            .map(|folder| folder.folder_type == folder_type)
            .unwrap_or(false)
    }
}
