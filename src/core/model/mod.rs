mod conversation;
mod document;
mod folder;
mod settings;
mod tag;
pub mod timestamp;
mod user;

pub use conversation::{
    title_from_first_user_message, Conversation, DocumentSource, Message, Reaction, ReactionType,
    Role, DEFAULT_CONVERSATION_CATEGORY, TYPING_MESSAGE_ID,
};
pub use document::{
    content_hash, Difficulty, Document, DocumentChunk, DocumentMetadata, DocumentRelationship,
    DocumentType, DocumentVersion, RelationshipKind, DEFAULT_DOCUMENT_CATEGORY,
};
pub use folder::{Folder, FolderType};
pub use settings::{AiSettings, AppSettings, GeneralSettings, ResponseSpeed};
pub use tag::{Tag, TagCategory};
pub use user::{
    NotificationPreferences, Theme, UiPreferences, User, UserPreferences, UserStats,
    DEFAULT_USER_ID,
};
