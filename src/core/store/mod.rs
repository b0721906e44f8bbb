mod conversations;
mod documents;
mod folders;
mod patch;
mod queries;
pub mod snapshot;
mod tags;

use std::sync::Arc;

use thiserror::Error;

use crate::core::model::{
    AppSettings, Conversation, Document, Folder, Tag, User, UserStats,
};
use crate::core::ports::storage::{StorageError, StoragePort};

pub use patch::{
    ConversationPatch, DocumentPatch, FolderPatch, MessagePatch, PreferencesPatch, SettingsPatch,
    TagPatch, UserPatch,
};
pub use queries::{
    AnalyticsPeriod, DocumentActivity, DocumentConnection, SearchResult, SearchResultKind,
    UsageAnalytics,
};
pub use snapshot::{PersistedState, DEFAULT_STORAGE_KEY, SNAPSHOT_VERSION};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported snapshot version {found} (newest known: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
}

/// Everything the store holds. Handed out only by shared reference.
#[derive(Debug, Clone)]
pub struct StoreState {
    pub conversations: Vec<Conversation>,
    pub documents: Vec<Document>,
    pub folders: Vec<Folder>,
    pub tags: Vec<Tag>,
    pub user: User,
    pub settings: AppSettings,
    pub sidebar_open: bool,
    pub dark_mode: bool,
    pub current_conversation_id: Option<String>,
    pub is_loading: bool,
    pub search_query: String,
    pub selected_documents: Vec<String>,
}

impl Default for StoreState {
    fn default() -> Self {
        Self {
            conversations: Vec::new(),
            documents: Vec::new(),
            folders: Vec::new(),
            tags: Vec::new(),
            user: User::default(),
            settings: AppSettings::default(),
            sidebar_open: true,
            dark_mode: false,
            current_conversation_id: None,
            is_loading: false,
            search_query: String::new(),
            selected_documents: Vec::new(),
        }
    }
}

impl StoreState {
    fn apply_persisted(&mut self, persisted: PersistedState) {
        self.conversations = persisted.conversations;
        self.documents = persisted.documents;
        self.settings = persisted.settings;
        self.user = persisted.user;
        self.folders = persisted.folders;
        self.tags = persisted.tags;
        self.sidebar_open = persisted.sidebar_open;
        self.dark_mode = persisted.dark_mode;

        // No response survives a restart; placeholders saved mid-response are stale.
        for conversation in &mut self.conversations {
            conversation.messages.retain(|message| !message.is_processing());
        }

        if let Some(current) = self.current_conversation_id.as_deref() {
            if !self.conversations.iter().any(|c| c.id == current) {
                self.current_conversation_id = None;
            }
        }
        let documents = &self.documents;
        self.selected_documents
            .retain(|id| documents.iter().any(|document| &document.id == id));
    }
}

/// Single source of truth for conversations, documents, folders, tags, the
/// user and settings. All mutation goes through the named actions; unknown
/// ids make an action a no-op.
pub struct Store {
    state: StoreState,
    storage: Arc<dyn StoragePort>,
    storage_key: String,
    hydrated: bool,
}

impl Store {
    pub fn new(storage: Arc<dyn StoragePort>) -> Self {
        Self::with_storage_key(storage, DEFAULT_STORAGE_KEY)
    }

    pub fn with_storage_key(storage: Arc<dyn StoragePort>, storage_key: impl Into<String>) -> Self {
        Self {
            state: StoreState::default(),
            storage,
            storage_key: storage_key.into(),
            hydrated: false,
        }
    }

    pub fn state(&self) -> &StoreState {
        &self.state
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    pub fn is_hydrated(&self) -> bool {
        self.hydrated
    }

    /// Loads the persisted snapshot, if any. Must be called once by the host;
    /// writes are suppressed until it succeeds so a fresh store never
    /// overwrites saved data.
    pub fn rehydrate(&mut self) -> Result<(), StoreError> {
        match self.storage.get_item(&self.storage_key)? {
            Some(raw) => {
                let persisted = snapshot::decode(&raw)?;
                log::info!(
                    "rehydrated '{}': {} conversations, {} documents, {} folders, {} tags",
                    self.storage_key,
                    persisted.conversations.len(),
                    persisted.documents.len(),
                    persisted.folders.len(),
                    persisted.tags.len()
                );
                self.state.apply_persisted(persisted);
            }
            None => {
                log::info!("no persisted state under '{}'", self.storage_key);
            }
        }
        self.hydrated = true;
        Ok(())
    }

    /// Drops whatever is stored under the key and starts persisting the
    /// current state. Used when a snapshot cannot be decoded.
    pub fn discard_persisted(&mut self) -> Result<(), StoreError> {
        self.storage.remove_item(&self.storage_key)?;
        self.hydrated = true;
        self.flush()
    }

    /// Writes the persisted subset of the state to storage.
    pub fn flush(&self) -> Result<(), StoreError> {
        let raw = snapshot::encode(&self.state)?;
        self.storage.set_item(&self.storage_key, &raw)?;
        Ok(())
    }

    fn commit(&self) {
        if !self.hydrated {
            log::debug!("skipping persist of '{}': not hydrated", self.storage_key);
            return;
        }
        if let Err(error) = self.flush() {
            log::warn!("failed to persist '{}': {}", self.storage_key, error);
        }
    }

    /// Restores defaults for every collection and flag.
    pub fn reset(&mut self) {
        self.state = StoreState::default();
        self.commit();
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.state.conversations
    }

    pub fn documents(&self) -> &[Document] {
        &self.state.documents
    }

    pub fn folders(&self) -> &[Folder] {
        &self.state.folders
    }

    pub fn tags(&self) -> &[Tag] {
        &self.state.tags
    }

    pub fn user(&self) -> &User {
        &self.state.user
    }

    pub fn settings(&self) -> &AppSettings {
        &self.state.settings
    }

    pub fn conversation(&self, id: &str) -> Option<&Conversation> {
        self.state.conversations.iter().find(|c| c.id == id)
    }

    pub fn document(&self, id: &str) -> Option<&Document> {
        self.state.documents.iter().find(|d| d.id == id)
    }

    pub fn folder(&self, id: &str) -> Option<&Folder> {
        self.state.folders.iter().find(|f| f.id == id)
    }

    pub fn tag(&self, id: &str) -> Option<&Tag> {
        self.state.tags.iter().find(|t| t.id == id)
    }

    fn conversation_mut(&mut self, id: &str) -> Option<&mut Conversation> {
        self.state.conversations.iter_mut().find(|c| c.id == id)
    }

    fn document_mut(&mut self, id: &str) -> Option<&mut Document> {
        self.state.documents.iter_mut().find(|d| d.id == id)
    }

    fn folder_mut(&mut self, id: &str) -> Option<&mut Folder> {
        self.state.folders.iter_mut().find(|f| f.id == id)
    }

    fn tag_mut(&mut self, id: &str) -> Option<&mut Tag> {
        self.state.tags.iter_mut().find(|t| t.id == id)
    }

    pub fn update_user(&mut self, patch: UserPatch) {
        let user = &mut self.state.user;
        if let Some(name) = patch.name {
            user.name = name;
        }
        if let Some(email) = patch.email {
            user.email = email;
        }
        if let Some(avatar) = patch.avatar {
            user.avatar = avatar;
        }
        if let Some(role) = patch.role {
            user.role = role;
        }
        self.commit();
    }

    pub fn update_preferences(&mut self, patch: PreferencesPatch) {
        let preferences = &mut self.state.user.preferences;
        if let Some(theme) = patch.theme {
            preferences.theme = theme;
        }
        if let Some(language) = patch.language {
            preferences.language = language;
        }
        if let Some(timezone) = patch.timezone {
            preferences.timezone = timezone;
        }
        if let Some(notifications) = patch.notifications {
            preferences.notifications = notifications;
        }
        if let Some(ui) = patch.ui {
            preferences.ui = ui;
        }
        self.commit();
    }

    pub fn update_settings(&mut self, patch: SettingsPatch) {
        let settings = &mut self.state.settings;
        if let Some(model) = patch.model {
            settings.ai.model = model;
        }
        if let Some(temperature) = patch.temperature {
            settings.ai.temperature = temperature.clamp(0.0, 2.0);
        }
        if let Some(max_tokens) = patch.max_tokens {
            settings.ai.max_tokens = max_tokens.max(1);
        }
        if let Some(speed) = patch.response_speed {
            settings.ai.response_speed = speed;
        }
        if let Some(include_context) = patch.include_context {
            settings.ai.include_context = include_context;
        }
        if let Some(auto_save) = patch.auto_save {
            settings.general.auto_save = auto_save;
        }
        if let Some(language) = patch.language {
            settings.general.language = language;
        }
        self.commit();
    }

    /// Recomputes the user's aggregate counters from the collections.
    pub fn refresh_user_stats(&mut self) {
        let total_messages = self
            .state
            .conversations
            .iter()
            .map(|c| c.messages.iter().filter(|m| !m.is_processing()).count())
            .sum();
        self.state.user.stats = UserStats {
            total_conversations: self.state.conversations.len(),
            total_messages,
            total_documents: self.state.documents.len(),
            last_active: chrono::Utc::now(),
        };
        self.commit();
    }

    pub fn set_sidebar_open(&mut self, open: bool) {
        self.state.sidebar_open = open;
        self.commit();
    }

    pub fn set_dark_mode(&mut self, enabled: bool) {
        self.state.dark_mode = enabled;
        self.commit();
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.state.is_loading = loading;
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.state.search_query = query.into();
    }
}

#[cfg(test)]
mod tests;
