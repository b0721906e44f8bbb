//! Persisted subset of the store and its on-disk envelope.
//!
//! The envelope mirrors what the web client wrote to local storage:
//! `{"state": {...}, "version": N}`. Timestamp fields are decoded by the
//! typed schema in `core::model`, never by inspecting string shapes.

use serde::{Deserialize, Serialize};

use crate::core::model::{AppSettings, Conversation, Document, Folder, Tag, User};

use super::{StoreError, StoreState};

/// Bump when the persisted shape changes; older snapshots go through `migrate`.
pub const SNAPSHOT_VERSION: u32 = 1;

pub const DEFAULT_STORAGE_KEY: &str = "syncinsight-storage";

fn default_sidebar_open() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    #[serde(default)]
    pub conversations: Vec<Conversation>,
    #[serde(default)]
    pub documents: Vec<Document>,
    #[serde(default)]
    pub settings: AppSettings,
    #[serde(default)]
    pub user: User,
    #[serde(default)]
    pub folders: Vec<Folder>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default = "default_sidebar_open")]
    pub sidebar_open: bool,
    #[serde(default)]
    pub dark_mode: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PersistedStateRef<'a> {
    conversations: &'a [Conversation],
    documents: &'a [Document],
    settings: &'a AppSettings,
    user: &'a User,
    folders: &'a [Folder],
    tags: &'a [Tag],
    sidebar_open: bool,
    dark_mode: bool,
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    state: PersistedStateRef<'a>,
    version: u32,
}

#[derive(Deserialize)]
struct Envelope {
    state: PersistedState,
    #[serde(default)]
    version: u32,
}

pub(super) fn encode(state: &StoreState) -> Result<String, StoreError> {
    let envelope = EnvelopeRef {
        state: PersistedStateRef {
            conversations: &state.conversations,
            documents: &state.documents,
            settings: &state.settings,
            user: &state.user,
            folders: &state.folders,
            tags: &state.tags,
            sidebar_open: state.sidebar_open,
            dark_mode: state.dark_mode,
        },
        version: SNAPSHOT_VERSION,
    };
    Ok(serde_json::to_string(&envelope)?)
}

pub(super) fn decode(raw: &str) -> Result<PersistedState, StoreError> {
    let envelope: Envelope = serde_json::from_str(raw)?;
    if envelope.version > SNAPSHOT_VERSION {
        return Err(StoreError::UnsupportedVersion {
            found: envelope.version,
            supported: SNAPSHOT_VERSION,
        });
    }
    Ok(migrate(envelope.state, envelope.version))
}

fn migrate(mut state: PersistedState, from_version: u32) -> PersistedState {
    if from_version < 1 {
        // v0 snapshots kept tag counters that could drift from membership.
        for tag in &mut state.tags {
            let conversations = state
                .conversations
                .iter()
                .filter(|conversation| conversation.tags.contains(&tag.id))
                .count();
            let documents = state
                .documents
                .iter()
                .filter(|document| document.tags.contains(&tag.id))
                .count();
            tag.count = (conversations + documents) as u32;
        }
    }
    state
}
