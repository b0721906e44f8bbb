//! Host-side wiring: configuration, storage, the shared store and the chat
//! and upload flows on top of it.

pub mod chat;
pub mod upload;

use std::sync::{Arc, Mutex};

use crate::adapters::config::Settings;
use crate::adapters::responder::MockResponder;
use crate::adapters::seed::seed_demo_data;
use crate::adapters::storage::open_storage;
use crate::core::ports::storage::StorageError;
use crate::core::store::{AnalyticsPeriod, Store};

use chat::ChatController;
use upload::{UploadError, UploadRequest};

pub struct App {
    pub settings: Settings,
    pub store: Arc<Mutex<Store>>,
    pub chat: ChatController,
}

/// Opens storage, rehydrates the store and seeds it when empty. A snapshot
/// that cannot be decoded is discarded rather than blocking startup.
pub fn bootstrap(settings: Settings) -> Result<App, StorageError> {
    let storage = open_storage(settings.storage_backend, &settings.data_dir())?;
    let mut store = Store::with_storage_key(storage, settings.storage_key());

    if let Err(error) = store.rehydrate() {
        log::warn!(
            "discarding unreadable snapshot '{}': {}",
            store.storage_key(),
            error
        );
        if let Err(error) = store.discard_persisted() {
            log::warn!("failed to reset '{}': {}", store.storage_key(), error);
        }
    }

    if settings.seed_demo_data {
        seed_demo_data(&mut store);
    }
    store.refresh_user_stats();

    let store = Arc::new(Mutex::new(store));
    let chat = ChatController::new(
        store.clone(),
        Arc::new(MockResponder::new(settings.responder_delays())),
        settings.cancel_on_switch,
    );
    Ok(App {
        settings,
        store,
        chat,
    })
}

impl App {
    /// Uploads into the shared store using the configured processing delay.
    pub async fn upload_document(&self, request: UploadRequest) -> Result<String, UploadError> {
        upload::upload_document(&self.store, request, self.settings.upload_delay()).await
    }

    pub fn log_summary(&self) {
        let Ok(store) = self.store.lock() else {
            log::warn!("store lock poisoned");
            return;
        };
        let analytics = store.usage_analytics(AnalyticsPeriod::Week);
        let stats = &store.user().stats;
        log::info!(
            "{} conversations, {} messages, {} documents, {} folders, {} tags",
            stats.total_conversations,
            stats.total_messages,
            stats.total_documents,
            store.folders().len(),
            store.tags().len()
        );
        log::info!(
            "last 7 days: {} conversations, {} messages, top tags: {}",
            analytics.total_conversations,
            analytics.total_messages,
            analytics
                .popular_tags
                .iter()
                .take(3)
                .map(|tag| format!("{} ({})", tag.name, tag.count))
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
}
