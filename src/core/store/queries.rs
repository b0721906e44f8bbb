use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::core::model::{
    Conversation, Document, Folder, FolderType, RelationshipKind, Tag,
};

use super::Store;

const DOCUMENT_RESULT_SCORE: f32 = 0.9;
const CONVERSATION_RESULT_SCORE: f32 = 0.8;
const SNIPPET_CHARS: usize = 150;
const POPULAR_TAG_LIMIT: usize = 10;

// Dashboard placeholders; nothing in the store records response latency or
// activity by hour.
const MOCK_PEAK_HOURS: [u32; 3] = [10, 14, 16];
const MOCK_AVERAGE_RESPONSE_TIME_MS: u64 = 1_200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchResultKind {
    Document,
    Conversation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: SearchResultKind,
    pub title: String,
    pub snippet: String,
    /// Fixed per result kind; not a relevance estimate.
    pub score: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyticsPeriod {
    Day,
    Week,
    Month,
    Year,
}

impl AnalyticsPeriod {
    pub fn cutoff(self, now: DateTime<Utc>) -> DateTime<Utc> {
        let days = match self {
            AnalyticsPeriod::Day => 1,
            AnalyticsPeriod::Week => 7,
            AnalyticsPeriod::Month => 30,
            AnalyticsPeriod::Year => 365,
        };
        now - Duration::days(days)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentActivity {
    pub id: String,
    pub title: String,
    pub access_count: u32,
    #[serde(with = "crate::core::model::timestamp")]
    pub last_accessed: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageAnalytics {
    pub period: AnalyticsPeriod,
    pub total_conversations: usize,
    pub total_messages: usize,
    pub popular_tags: Vec<Tag>,
    pub accessed_documents: Vec<DocumentActivity>,
    pub peak_hours: Vec<u32>,
    pub average_response_time_ms: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct DocumentConnection<'a> {
    pub document: &'a Document,
    pub kind: RelationshipKind,
    pub strength: f32,
}

fn contains_folded(haystack: &str, needle_lc: &str) -> bool {
    haystack.to_lowercase().contains(needle_lc)
}

fn snippet(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= SNIPPET_CHARS {
        return trimmed.to_string();
    }
    let head: String = trimmed.chars().take(SNIPPET_CHARS).collect();
    format!("{}...", head)
}

impl Store {
    /// Case-insensitive substring match on title, message contents and
    /// summary, in collection order.
    pub fn search_conversations(&self, query: &str) -> Vec<&Conversation> {
        let needle = query.trim().to_lowercase();
        self.state
            .conversations
            .iter()
            .filter(|conversation| {
                needle.is_empty()
                    || contains_folded(&conversation.title, &needle)
                    || conversation
                        .summary
                        .as_deref()
                        .is_some_and(|summary| contains_folded(summary, &needle))
                    || conversation
                        .messages
                        .iter()
                        .any(|message| contains_folded(&message.content, &needle))
            })
            .collect()
    }

    /// Case-insensitive substring match on title, content, summary and the
    /// names of attached tags, in collection order.
    pub fn search_documents(&self, query: &str) -> Vec<&Document> {
        let needle = query.trim().to_lowercase();
        self.state
            .documents
            .iter()
            .filter(|document| {
                needle.is_empty()
                    || contains_folded(&document.title, &needle)
                    || contains_folded(&document.content, &needle)
                    || document
                        .metadata
                        .summary
                        .as_deref()
                        .is_some_and(|summary| contains_folded(summary, &needle))
                    || document
                        .tags
                        .iter()
                        .filter_map(|tag_id| self.tag(tag_id))
                        .any(|tag| contains_folded(&tag.name, &needle))
            })
            .collect()
    }

    /// Both searches merged; every document hit ranks ahead of every
    /// conversation hit.
    pub fn search_all(&self, query: &str) -> Vec<SearchResult> {
        let documents = self.search_documents(query).into_iter().map(|document| SearchResult {
            id: document.id.clone(),
            kind: SearchResultKind::Document,
            title: document.title.clone(),
            snippet: snippet(&document.content),
            score: DOCUMENT_RESULT_SCORE,
        });
        let conversations =
            self.search_conversations(query)
                .into_iter()
                .map(|conversation| SearchResult {
                    id: conversation.id.clone(),
                    kind: SearchResultKind::Conversation,
                    title: conversation.title.clone(),
                    snippet: conversation
                        .last_message()
                        .map(|message| snippet(&message.content))
                        .unwrap_or_default(),
                    score: CONVERSATION_RESULT_SCORE,
                });

        let mut results: Vec<SearchResult> = documents.chain(conversations).collect();
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results
    }

    /// `None` selects conversations outside any folder.
    pub fn conversations_by_folder(&self, folder_id: Option<&str>) -> Vec<&Conversation> {
        self.state
            .conversations
            .iter()
            .filter(|conversation| conversation.folder_id.as_deref() == folder_id)
            .collect()
    }

    /// `None` selects documents outside any folder.
    pub fn documents_by_folder(&self, folder_id: Option<&str>) -> Vec<&Document> {
        self.state
            .documents
            .iter()
            .filter(|document| document.folder_id.as_deref() == folder_id)
            .collect()
    }

    pub fn conversations_by_tag(&self, tag_id: &str) -> Vec<&Conversation> {
        self.state
            .conversations
            .iter()
            .filter(|conversation| conversation.tags.iter().any(|tag| tag == tag_id))
            .collect()
    }

    pub fn documents_by_tag(&self, tag_id: &str) -> Vec<&Document> {
        self.state
            .documents
            .iter()
            .filter(|document| document.tags.iter().any(|tag| tag == tag_id))
            .collect()
    }

    pub fn folder_tree(&self, folder_type: FolderType) -> Vec<&Folder> {
        let mut folders: Vec<&Folder> = self
            .state
            .folders
            .iter()
            .filter(|folder| folder.folder_type == folder_type)
            .collect();
        folders.sort_by_key(|folder| folder.order);
        folders
    }

    pub fn usage_analytics(&self, period: AnalyticsPeriod) -> UsageAnalytics {
        self.usage_analytics_at(period, Utc::now())
    }

    pub fn usage_analytics_at(&self, period: AnalyticsPeriod, now: DateTime<Utc>) -> UsageAnalytics {
        let cutoff = period.cutoff(now);

        let recent: Vec<&Conversation> = self
            .state
            .conversations
            .iter()
            .filter(|conversation| conversation.created_at > cutoff)
            .collect();
        let total_messages = recent.iter().map(|c| c.messages.len()).sum();

        let mut popular_tags = self.state.tags.clone();
        popular_tags.sort_by(|a, b| b.count.cmp(&a.count));
        popular_tags.truncate(POPULAR_TAG_LIMIT);

        let accessed_documents = self
            .state
            .documents
            .iter()
            .filter_map(|document| {
                let last_accessed = document.metadata.last_accessed?;
                (last_accessed > cutoff).then(|| DocumentActivity {
                    id: document.id.clone(),
                    title: document.title.clone(),
                    access_count: document.metadata.access_count,
                    last_accessed,
                })
            })
            .collect();

        UsageAnalytics {
            period,
            total_conversations: recent.len(),
            total_messages,
            popular_tags,
            accessed_documents,
            peak_hours: MOCK_PEAK_HOURS.to_vec(),
            average_response_time_ms: MOCK_AVERAGE_RESPONSE_TIME_MS,
        }
    }

    /// Targets of the document's relationship edges; edges to documents that
    /// no longer exist are skipped.
    pub fn related_documents(&self, document_id: &str) -> Vec<&Document> {
        self.document_connections(document_id)
            .into_iter()
            .map(|connection| connection.document)
            .collect()
    }

    pub fn document_connections(&self, document_id: &str) -> Vec<DocumentConnection<'_>> {
        let Some(document) = self.document(document_id) else {
            return Vec::new();
        };
        document
            .relationships
            .iter()
            .filter_map(|relationship| {
                self.document(&relationship.document_id)
                    .map(|target| DocumentConnection {
                        document: target,
                        kind: relationship.kind,
                        strength: relationship.strength,
                    })
            })
            .collect()
    }
}
