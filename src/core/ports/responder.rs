use futures::future::BoxFuture;

use crate::core::model::{AiSettings, Message, ResponseSpeed};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResponseOptions {
    pub speed: ResponseSpeed,
    pub temperature: f32,
    pub include_context: bool,
}

impl Default for ResponseOptions {
    fn default() -> Self {
        Self::from(&AiSettings::default())
    }
}

impl From<&AiSettings> for ResponseOptions {
    fn from(settings: &AiSettings) -> Self {
        Self {
            speed: settings.response_speed,
            temperature: settings.temperature,
            include_context: settings.include_context,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResponseRequest<'a> {
    pub query: &'a str,
    /// Prior messages of the conversation, oldest first.
    pub history: &'a [Message],
    pub options: ResponseOptions,
}

/// Produces one assistant message per request. Implementations never fail:
/// the worst case is a low-confidence fallback message.
pub trait ResponderPort: Send + Sync {
    fn generate_response<'a>(&'a self, request: ResponseRequest<'a>) -> BoxFuture<'a, Message>;
}
