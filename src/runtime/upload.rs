use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use thiserror::Error;

use crate::core::model::{Document, DocumentChunk, DocumentMetadata, DocumentType};
use crate::core::store::{DocumentPatch, Store};

const WORDS_PER_MINUTE: usize = 200;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum UploadError {
    #[error("문서 제목을 입력해 주세요.")]
    EmptyTitle,

    #[error("지원하지 않는 파일 형식입니다: {0}")]
    UnsupportedType(String),

    #[error("store lock poisoned")]
    StoreUnavailable,
}

#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    pub file_name: String,
    /// Falls back to the file stem when blank.
    pub title: Option<String>,
    pub content: String,
    pub folder_id: Option<String>,
    pub tags: Vec<String>,
}

fn resolve_title(request: &UploadRequest) -> Option<String> {
    request
        .title
        .as_deref()
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .map(ToOwned::to_owned)
        .or_else(|| {
            Path::new(request.file_name.trim())
                .file_stem()
                .and_then(|stem| stem.to_str())
                .map(str::trim)
                .filter(|stem| !stem.is_empty())
                .map(ToOwned::to_owned)
        })
}

fn resolve_type(file_name: &str) -> Result<DocumentType, UploadError> {
    let extension = Path::new(file_name.trim())
        .extension()
        .and_then(|extension| extension.to_str())
        .unwrap_or_default();
    DocumentType::from_extension(extension)
        .ok_or_else(|| UploadError::UnsupportedType(file_name.trim().to_string()))
}

/// One chunk per blank-line separated section. A section opening with a
/// markdown heading is labelled by that heading.
pub fn chunk_content(document_id: &str, content: &str) -> Vec<DocumentChunk> {
    let normalized = content.replace("\r\n", "\n");
    let mut sections: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in normalized.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                sections.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        sections.push(current.join("\n"));
    }

    sections
        .into_iter()
        .enumerate()
        .map(|(index, section)| {
            let label = section
                .lines()
                .next()
                .and_then(|line| line.trim_start().strip_prefix('#'))
                .map(|heading| heading.trim_start_matches('#').trim().to_string())
                .filter(|heading| !heading.is_empty())
                .unwrap_or_else(|| format!("section {}", index + 1));
            DocumentChunk {
                id: format!("{}-chunk-{}", document_id, index),
                content: section.trim().to_string(),
                chunk_index: index,
                page: None,
                section: Some(label),
            }
        })
        .collect()
}

fn is_hangul(c: char) -> bool {
    matches!(c, '\u{AC00}'..='\u{D7A3}' | '\u{1100}'..='\u{11FF}' | '\u{3130}'..='\u{318F}')
}

pub fn detect_language(content: &str) -> &'static str {
    if content.chars().any(is_hangul) {
        "ko"
    } else {
        "en"
    }
}

/// Minutes at 200 words per minute, rounded up.
pub fn reading_time_minutes(content: &str) -> u32 {
    let words = content.split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE) as u32
}

/// Inserts the document unprocessed, waits `processing_delay`, then marks it
/// processed with chunks and derived metadata. Returns the new document id.
/// A document deleted during the delay stays deleted.
pub async fn upload_document(
    store: &Arc<Mutex<Store>>,
    request: UploadRequest,
    processing_delay: Duration,
) -> Result<String, UploadError> {
    let title = resolve_title(&request).ok_or(UploadError::EmptyTitle)?;
    let doc_type = resolve_type(&request.file_name)?;

    let document_id = uuid::Uuid::new_v4().to_string();
    {
        let mut store = store.lock().map_err(|_| UploadError::StoreUnavailable)?;
        store.add_document(Document::new(
            document_id.clone(),
            title.clone(),
            request.content.clone(),
            doc_type,
        ));
        if let Some(folder_id) = request.folder_id.as_deref() {
            store.move_document_to_folder(&document_id, Some(folder_id));
        }
        for tag_id in &request.tags {
            store.add_tag_to_document(&document_id, tag_id);
        }
    }
    log::info!(
        "uploaded '{}' ({}, {} bytes) as {}",
        title,
        doc_type.as_str(),
        request.content.len(),
        document_id
    );

    if !processing_delay.is_zero() {
        tokio::time::sleep(processing_delay).await;
    }

    let chunks = chunk_content(&document_id, &request.content);
    let mut store = store.lock().map_err(|_| UploadError::StoreUnavailable)?;
    let Some(metadata) = store
        .document(&document_id)
        .map(|document| document.metadata.clone())
    else {
        log::debug!("document {} removed before processing finished", document_id);
        return Ok(document_id);
    };
    let metadata = DocumentMetadata {
        language: detect_language(&request.content).to_string(),
        reading_time: reading_time_minutes(&request.content),
        ..metadata
    };
    let chunk_count = chunks.len();
    store.update_document(
        &document_id,
        DocumentPatch {
            processed: Some(true),
            chunks: Some(chunks),
            metadata: Some(metadata),
            ..DocumentPatch::default()
        },
    );
    log::debug!("processed {} into {} chunks", document_id, chunk_count);
    Ok(document_id)
}
