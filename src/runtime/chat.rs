use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tokio::task::JoinHandle;

use crate::core::model::{
    title_from_first_user_message, Conversation, Message, TYPING_MESSAGE_ID,
};
use crate::core::ports::responder::{ResponderPort, ResponseOptions, ResponseRequest};
use crate::core::store::Store;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ChatError {
    #[error("메시지를 입력해 주세요.")]
    EmptyMessage,

    #[error("store lock poisoned")]
    StoreUnavailable,
}

#[derive(Debug)]
struct ActiveResponse {
    token: u64,
    cancel_tx: tokio::sync::oneshot::Sender<()>,
}

type ActiveResponses = Arc<Mutex<HashMap<String, ActiveResponse>>>;

/// Handle to a response spawned by [`ChatController::send_message`].
#[derive(Debug)]
pub struct SendOutcome {
    pub conversation_id: String,
    pub task: JoinHandle<()>,
}

/// Drives the send/answer cycle on top of the shared store. At most one
/// response is in flight per conversation, and a cancelled response never
/// writes to the store.
pub struct ChatController {
    store: Arc<Mutex<Store>>,
    responder: Arc<dyn ResponderPort>,
    active: ActiveResponses,
    next_token: AtomicU64,
    cancel_on_switch: bool,
}

fn register_response(active: &ActiveResponses, conversation_id: &str, response: ActiveResponse) {
    if let Ok(mut responses) = active.lock() {
        if let Some(previous) = responses.insert(conversation_id.to_string(), response) {
            let _ = previous.cancel_tx.send(());
        }
    }
}

/// Removes the entry if it still belongs to `token`. Returns whether the
/// caller was still the live response for the conversation.
fn finish_response(active: &ActiveResponses, conversation_id: &str, token: u64) -> bool {
    let Ok(mut responses) = active.lock() else {
        return false;
    };
    let is_live = responses
        .get(conversation_id)
        .map(|response| response.token == token)
        .unwrap_or(false);
    if is_live {
        responses.remove(conversation_id);
    }
    is_live
}

/// Swaps the placeholder for `message` if `token` is still live. The store
/// lock is held across the registry check so a concurrent send cannot add a
/// placeholder that this write would then remove.
fn complete_response(
    store: &Mutex<Store>,
    active: &ActiveResponses,
    conversation_id: &str,
    token: u64,
    message: Message,
) -> bool {
    let Ok(mut store) = store.lock() else {
        log::warn!("store lock poisoned; dropping response for {}", conversation_id);
        return false;
    };
    if !finish_response(active, conversation_id, token) {
        return false;
    }
    store.delete_message(conversation_id, TYPING_MESSAGE_ID);
    store.add_message(conversation_id, message);
    if !has_active_responses(active) {
        store.set_loading(false);
    }
    true
}

fn has_active_responses(active: &ActiveResponses) -> bool {
    active
        .lock()
        .map(|responses| !responses.is_empty())
        .unwrap_or(false)
}

impl ChatController {
    pub fn new(
        store: Arc<Mutex<Store>>,
        responder: Arc<dyn ResponderPort>,
        cancel_on_switch: bool,
    ) -> Self {
        Self {
            store,
            responder,
            active: Arc::new(Mutex::new(HashMap::new())),
            next_token: AtomicU64::new(1),
            cancel_on_switch,
        }
    }

    pub fn store(&self) -> &Arc<Mutex<Store>> {
        &self.store
    }

    pub fn is_responding(&self, conversation_id: &str) -> bool {
        self.active
            .lock()
            .map(|responses| responses.contains_key(conversation_id))
            .unwrap_or(false)
    }

    /// Appends the user message to the current conversation (creating one when
    /// there is none), shows the typing placeholder and spawns the responder.
    /// Must be called from within a tokio runtime.
    pub fn send_message(&self, content: &str) -> Result<SendOutcome, ChatError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        let (cancel_tx, mut cancel_rx) = tokio::sync::oneshot::channel::<()>();

        let (conversation_id, history, options) = {
            let mut store = self.store.lock().map_err(|_| ChatError::StoreUnavailable)?;
            let conversation_id = match store.current_conversation() {
                Some(conversation) => conversation.id.clone(),
                None => {
                    let conversation = Conversation::new(
                        uuid::Uuid::new_v4().to_string(),
                        title_from_first_user_message(content),
                    );
                    let id = conversation.id.clone();
                    store.add_conversation(conversation);
                    store.set_current_conversation(Some(&id));
                    log::info!("started conversation {}", id);
                    id
                }
            };

            // Replacing the registration cancels a response still pending here.
            register_response(
                &self.active,
                &conversation_id,
                ActiveResponse { token, cancel_tx },
            );
            store.delete_message(&conversation_id, TYPING_MESSAGE_ID);

            let history: Vec<Message> = store
                .conversation(&conversation_id)
                .map(|conversation| conversation.messages.clone())
                .unwrap_or_default();
            store.add_message(&conversation_id, Message::user(content));
            store.add_message(&conversation_id, Message::typing_placeholder());
            store.set_loading(true);

            let options = ResponseOptions::from(&store.settings().ai);
            (conversation_id, history, options)
        };

        let store = self.store.clone();
        let responder = self.responder.clone();
        let active = self.active.clone();
        let query = content.to_string();
        let task_conversation_id = conversation_id.clone();

        let task = tokio::spawn(async move {
            let conversation_id = task_conversation_id;
            let response = tokio::select! {
                _ = &mut cancel_rx => None,
                message = responder.generate_response(ResponseRequest {
                    query: &query,
                    history: &history,
                    options,
                }) => Some(message),
            };

            let Some(message) = response else {
                log::debug!("response for {} cancelled", conversation_id);
                return;
            };
            if !complete_response(&store, &active, &conversation_id, token, message) {
                log::debug!("dropping superseded response for {}", conversation_id);
            }
        });

        Ok(SendOutcome {
            conversation_id,
            task,
        })
    }

    /// Aborts the pending response for the conversation and removes its
    /// placeholder. Returns whether anything was pending.
    pub fn cancel(&self, conversation_id: &str) -> bool {
        let Ok(mut store) = self.store.lock() else {
            return false;
        };
        let removed = self
            .active
            .lock()
            .ok()
            .and_then(|mut responses| responses.remove(conversation_id));
        let Some(response) = removed else {
            return false;
        };
        let _ = response.cancel_tx.send(());

        store.delete_message(conversation_id, TYPING_MESSAGE_ID);
        if !has_active_responses(&self.active) {
            store.set_loading(false);
        }
        log::info!("cancelled response for {}", conversation_id);
        true
    }

    /// Moves the current pointer. With `cancel_on_switch` the response
    /// pending for the conversation being left is cancelled.
    pub fn switch_conversation(&self, conversation_id: Option<&str>) {
        let previous = self
            .store
            .lock()
            .ok()
            .and_then(|store| store.state().current_conversation_id.clone());

        if self.cancel_on_switch {
            if let Some(previous) = previous.as_deref() {
                if Some(previous) != conversation_id {
                    self.cancel(previous);
                }
            }
        }

        if let Ok(mut store) = self.store.lock() {
            store.set_current_conversation(conversation_id);
        }
    }

    pub fn delete_conversation(&self, conversation_id: &str) {
        self.cancel(conversation_id);
        if let Ok(mut store) = self.store.lock() {
            store.delete_conversation(conversation_id);
        }
    }
}
