use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::timestamp;

pub const DEFAULT_DOCUMENT_CATEGORY: &str = "general";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Pdf,
    Docx,
    Txt,
    Md,
    Hwp,
}

impl DocumentType {
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentType::Pdf => "pdf",
            DocumentType::Docx => "docx",
            DocumentType::Txt => "txt",
            DocumentType::Md => "md",
            DocumentType::Hwp => "hwp",
        }
    }

    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "pdf" => Some(DocumentType::Pdf),
            "docx" => Some(DocumentType::Docx),
            "txt" => Some(DocumentType::Txt),
            "md" | "markdown" => Some(DocumentType::Md),
            "hwp" => Some(DocumentType::Hwp),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentChunk {
    pub id: String,
    pub content: String,
    pub chunk_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default = "default_language")]
    pub language: String,
    /// Estimated reading time in minutes.
    #[serde(default)]
    pub reading_time: u32,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(
        default,
        with = "timestamp::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_accessed: Option<DateTime<Utc>>,
    #[serde(default)]
    pub access_count: u32,
}

fn default_language() -> String {
    "ko".to_string()
}

impl Default for DocumentMetadata {
    fn default() -> Self {
        Self {
            author: None,
            keywords: Vec::new(),
            summary: None,
            language: default_language(),
            reading_time: 0,
            difficulty: Difficulty::default(),
            last_accessed: None,
            access_count: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipKind {
    References,
    Similar,
    Extends,
    Contradicts,
    Supports,
}

/// Directed, weighted edge to another document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRelationship {
    pub document_id: String,
    #[serde(rename = "type")]
    pub kind: RelationshipKind,
    pub strength: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentVersion {
    pub version: u32,
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    pub changes: String,
    #[serde(default)]
    pub content_hash: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    #[serde(with = "timestamp")]
    pub upload_date: DateTime<Utc>,
    /// Size in bytes.
    pub file_size: u64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub processed: bool,
    #[serde(default)]
    pub chunks: Vec<DocumentChunk>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub metadata: DocumentMetadata,
    #[serde(default)]
    pub relationships: Vec<DocumentRelationship>,
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub version_history: Vec<DocumentVersion>,
}

fn default_category() -> String {
    DEFAULT_DOCUMENT_CATEGORY.to_string()
}

fn default_version() -> u32 {
    1
}

impl Document {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        doc_type: DocumentType,
    ) -> Self {
        let content = content.into();
        let now = Utc::now();
        Self {
            id: id.into(),
            title: title.into(),
            file_size: content.len() as u64,
            version_history: vec![DocumentVersion {
                version: 1,
                timestamp: now,
                changes: "Initial upload".to_string(),
                content_hash: content_hash(&content),
            }],
            content,
            doc_type,
            upload_date: now,
            tags: Vec::new(),
            processed: false,
            chunks: Vec::new(),
            folder_id: None,
            category: default_category(),
            metadata: DocumentMetadata::default(),
            relationships: Vec::new(),
            version: default_version(),
        }
    }

    pub fn relationship_to(&self, document_id: &str) -> Option<&DocumentRelationship> {
        self.relationships
            .iter()
            .find(|relationship| relationship.document_id == document_id)
    }
}

pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
