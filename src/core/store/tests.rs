use std::sync::Arc;

use chrono::{Duration, Utc};

use super::{
    AnalyticsPeriod, ConversationPatch, DocumentPatch, FolderPatch, MessagePatch,
    PreferencesPatch, SearchResultKind, SettingsPatch, Store, StoreError, TagPatch, UserPatch,
};
use crate::adapters::storage::MemoryStorage;
use crate::core::model::{
    Conversation, Document, DocumentRelationship, DocumentType, Folder, FolderType, Message,
    ReactionType, RelationshipKind, ResponseSpeed, Role, Tag, TagCategory, Theme, UiPreferences,
    TYPING_MESSAGE_ID,
};
use crate::core::ports::storage::StoragePort;

fn hydrated_store() -> (Store, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::default());
    let mut store = Store::new(storage.clone());
    store.rehydrate().expect("rehydrate empty storage");
    (store, storage)
}

fn document(id: &str, title: &str, content: &str) -> Document {
    Document::new(id, title, content, DocumentType::Md)
}

fn edge(target: &str, strength: f32) -> DocumentRelationship {
    DocumentRelationship {
        document_id: target.to_string(),
        kind: RelationshipKind::References,
        strength,
        context: None,
    }
}

#[test]
fn add_message_appends_and_advances_updated_at() {
    let (mut store, _) = hydrated_store();
    store.add_conversation(Conversation::new("c1", "Test"));
    let before = store.conversation("c1").expect("c1").updated_at;

    let message = Message::user("hello");
    store.add_message("c1", message.clone());

    let conversation = store.conversation("c1").expect("c1");
    assert_eq!(conversation.messages.last(), Some(&message));
    assert!(conversation.updated_at > before);
}

#[test]
fn add_message_to_unknown_conversation_is_a_noop() {
    let (mut store, _) = hydrated_store();
    store.add_conversation(Conversation::new("c1", "Test"));
    store.add_message("missing", Message::user("lost"));
    assert!(store.conversation("c1").expect("c1").messages.is_empty());
}

#[test]
fn first_message_scenario_through_current_conversation() {
    let (mut store, _) = hydrated_store();
    assert!(store.conversations().is_empty());

    store.add_conversation(Conversation::new("c1", "Test"));
    store.add_message(
        "c1",
        Message {
            id: "m1".to_string(),
            ..Message::user("hi")
        },
    );
    store.set_current_conversation(Some("c1"));

    let current = store.current_conversation().expect("current conversation");
    assert_eq!(current.messages.len(), 1);
    assert_eq!(current.messages[0].content, "hi");
    assert_eq!(current.messages[0].role, Role::User);
}

#[test]
fn repeated_reaction_of_same_type_is_replaced() {
    let (mut store, _) = hydrated_store();
    store.add_conversation(Conversation::new("c1", "Test"));
    store.add_message(
        "c1",
        Message {
            id: "m1".to_string(),
            ..Message::assistant("answer")
        },
    );

    store.add_reaction("c1", "m1", ReactionType::Like);
    store.add_reaction("c1", "m1", ReactionType::Like);
    store.add_reaction("c1", "m1", ReactionType::Bookmark);

    let message = store.conversation("c1").and_then(|c| c.message("m1")).expect("m1");
    let reactions = message.reactions.as_deref().unwrap_or_default();
    assert_eq!(
        reactions.iter().filter(|r| r.kind == ReactionType::Like).count(),
        1
    );
    assert_eq!(reactions.len(), 2);
    assert_eq!(reactions[0].user_id, store.user().id);

    store.remove_reaction("c1", "m1", ReactionType::Like);
    store.remove_reaction("c1", "m1", ReactionType::Bookmark);
    let message = store.conversation("c1").and_then(|c| c.message("m1")).expect("m1");
    assert!(message.reactions.is_none());
}

#[test]
fn tagging_a_document_twice_counts_once() {
    let (mut store, _) = hydrated_store();
    store.add_tag(Tag::new("t1", "보안"));
    store.add_document(document("d1", "Policy", "content"));

    store.add_tag_to_document("d1", "t1");
    store.add_tag_to_document("d1", "t1");

    let tags = &store.document("d1").expect("d1").tags;
    assert_eq!(tags.iter().filter(|t| t.as_str() == "t1").count(), 1);
    assert_eq!(store.tag("t1").expect("t1").count, 1);

    store.remove_tag_from_document("d1", "t1");
    store.remove_tag_from_document("d1", "t1");
    assert_eq!(store.tag("t1").expect("t1").count, 0);
}

#[test]
fn tagging_with_unknown_tag_changes_nothing() {
    let (mut store, _) = hydrated_store();
    store.add_conversation(Conversation::new("c1", "Test"));
    store.add_tag_to_conversation("c1", "ghost");
    assert!(store.conversation("c1").expect("c1").tags.is_empty());
}

#[test]
fn conversation_tag_counter_follows_membership() {
    let (mut store, _) = hydrated_store();
    store.add_tag(Tag::new("t1", "project"));
    store.add_conversation(Conversation::new("c1", "One"));
    store.add_conversation(Conversation::new("c2", "Two"));

    store.add_tag_to_conversation("c1", "t1");
    store.add_tag_to_conversation("c2", "t1");
    store.add_tag_to_conversation("c2", "t1");
    assert_eq!(store.tag("t1").expect("t1").count, 2);
    assert_eq!(store.tag_usage("t1"), 2);

    store.remove_tag_from_conversation("c1", "t1");
    assert_eq!(store.tag("t1").expect("t1").count, 1);
    assert_eq!(store.conversations_by_tag("t1").len(), 1);
}

#[test]
fn deleting_a_folder_detaches_all_members() {
    let (mut store, _) = hydrated_store();
    store.add_folder(Folder::new("fc", "Chats", FolderType::Conversation));
    store.add_folder(Folder::new("fd", "Docs", FolderType::Document));
    store.add_conversation(Conversation::new("c1", "One"));
    store.add_conversation(Conversation::new("c2", "Two"));
    store.add_document(document("d1", "Doc", "text"));

    store.move_conversation_to_folder("c1", Some("fc"));
    store.move_conversation_to_folder("c2", Some("fc"));
    store.move_document_to_folder("d1", Some("fd"));
    assert_eq!(store.conversations_by_folder(Some("fc")).len(), 2);

    store.delete_folder("fc");
    store.delete_folder("fd");

    assert!(store
        .conversations()
        .iter()
        .all(|c| c.folder_id.is_none()));
    assert!(store.documents().iter().all(|d| d.folder_id.is_none()));
    assert_eq!(store.conversations_by_folder(None).len(), 2);
    assert_eq!(store.documents_by_folder(None).len(), 1);
}

#[test]
fn moving_into_a_folder_of_the_other_type_is_ignored() {
    let (mut store, _) = hydrated_store();
    store.add_folder(Folder::new("fd", "Docs", FolderType::Document));
    store.add_conversation(Conversation::new("c1", "One"));

    store.move_conversation_to_folder("c1", Some("fd"));
    store.update_conversation(
        "c1",
        ConversationPatch {
            folder_id: Some(Some("fd".to_string())),
            pinned: Some(true),
            ..ConversationPatch::default()
        },
    );

    let conversation = store.conversation("c1").expect("c1");
    assert!(conversation.folder_id.is_none());
    assert!(conversation.pinned);
}

#[test]
fn folder_parent_cannot_form_a_cycle() {
    let (mut store, _) = hydrated_store();
    store.add_folder(Folder::new("a", "A", FolderType::Document));
    store.add_folder(Folder::new("b", "B", FolderType::Document));
    store.update_folder(
        "b",
        FolderPatch {
            parent_id: Some(Some("a".to_string())),
            ..FolderPatch::default()
        },
    );
    store.update_folder(
        "a",
        FolderPatch {
            parent_id: Some(Some("b".to_string())),
            ..FolderPatch::default()
        },
    );

    assert_eq!(store.folder("b").and_then(|f| f.parent_id.as_deref()), Some("a"));
    assert!(store.folder("a").expect("a").parent_id.is_none());

    store.delete_folder("a");
    assert!(store.folder("b").expect("b").parent_id.is_none());
}

#[test]
fn folder_tree_is_sorted_by_order() {
    let (mut store, _) = hydrated_store();
    for (id, order) in [("x", 2), ("y", 0), ("z", 1)] {
        let mut folder = Folder::new(id, id, FolderType::Document);
        folder.order = order;
        store.add_folder(folder);
    }
    store.add_folder(Folder::new("chat", "Chat", FolderType::Conversation));

    let ids: Vec<&str> = store
        .folder_tree(FolderType::Document)
        .iter()
        .map(|f| f.id.as_str())
        .collect();
    assert_eq!(ids, vec!["y", "z", "x"]);

    store.reorder_folders(FolderType::Document, &["x", "y"]);
    let ids: Vec<&str> = store
        .folder_tree(FolderType::Document)
        .iter()
        .map(|f| f.id.as_str())
        .collect();
    assert_eq!(ids, vec!["x", "y", "z"]);
}

#[test]
fn search_documents_finds_korean_keyword() {
    let (mut store, _) = hydrated_store();
    store.add_document(document("d1", "Onboarding", "회사 소개와 업무 안내"));
    store.add_document(document("d2", "Policy", "정보 보안 정책과 접근 통제"));
    store.add_document(document("d3", "Roadmap", "2024 제품 로드맵"));

    let hits = store.search_documents("보안");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "d2");
}

#[test]
fn search_documents_matches_tag_names_case_insensitively() {
    let (mut store, _) = hydrated_store();
    store.add_tag(Tag::new("t1", "Security"));
    store.add_document(document("d1", "Notes", "nothing relevant"));
    store.add_tag_to_document("d1", "t1");

    assert_eq!(store.search_documents("SECURITY").len(), 1);
    assert!(store.search_documents("finance").is_empty());
}

#[test]
fn search_all_ranks_documents_before_conversations() {
    let (mut store, _) = hydrated_store();
    store.add_conversation(Conversation::new("c1", "API 설계 회의"));
    store.add_document(document("d1", "API guide", "REST API reference"));
    store.add_document(document("d2", "Other", "unrelated"));

    let results = store.search_all("api");
    let kinds: Vec<SearchResultKind> = results.iter().map(|r| r.kind).collect();
    assert_eq!(
        kinds,
        vec![SearchResultKind::Document, SearchResultKind::Conversation]
    );
    assert!(results[0].score > results[1].score);
}

#[test]
fn merge_tag_moves_every_use_to_target() {
    let (mut store, _) = hydrated_store();
    store.add_tag(Tag::new("tagA", "security"));
    store.add_tag(Tag::new("tagB", "보안"));
    store.add_document(document("d1", "One", "x"));
    store.add_document(document("d2", "Two", "y"));
    store.add_document(document("d3", "Three", "z"));
    store.add_tag_to_document("d1", "tagA");
    store.add_tag_to_document("d2", "tagA");
    store.add_tag_to_document("d3", "tagB");

    store.merge_tag("tagA", "tagB");

    assert!(store.documents_by_tag("tagA").is_empty());
    assert_eq!(store.documents_by_tag("tagB").len(), 3);
    assert!(store.tag("tagA").is_none());
    assert_eq!(store.tag("tagB").expect("tagB").count, 3);
}

#[test]
fn merge_tag_does_not_duplicate_on_entities_with_both() {
    let (mut store, _) = hydrated_store();
    store.add_tag(Tag::new("a", "a"));
    store.add_tag(Tag::new("b", "b"));
    store.add_conversation(Conversation::new("c1", "Both"));
    store.add_tag_to_conversation("c1", "a");
    store.add_tag_to_conversation("c1", "b");

    store.merge_tag("a", "b");

    assert_eq!(store.conversation("c1").expect("c1").tags, vec!["b".to_string()]);
    assert_eq!(store.tag("b").expect("b").count, 1);
}

#[test]
fn delete_tag_strips_every_reference() {
    let (mut store, _) = hydrated_store();
    store.add_tag(Tag::new("t1", "draft"));
    store.add_conversation(Conversation::new("c1", "One"));
    store.add_document(document("d1", "Doc", "x"));
    store.add_tag_to_conversation("c1", "t1");
    store.add_tag_to_document("d1", "t1");

    store.delete_tag("t1");

    assert!(store.tag("t1").is_none());
    assert!(store.conversation("c1").expect("c1").tags.is_empty());
    assert!(store.document("d1").expect("d1").tags.is_empty());
}

#[test]
fn deleting_current_conversation_clears_pointer() {
    let (mut store, _) = hydrated_store();
    store.add_conversation(Conversation::new("c1", "One"));
    store.add_conversation(Conversation::new("c2", "Two"));
    store.set_current_conversation(Some("c2"));

    store.delete_conversations(&["c1"]);
    assert_eq!(store.current_conversation().map(|c| c.id.as_str()), Some("c2"));

    store.delete_conversation("c2");
    assert!(store.current_conversation().is_none());
    assert!(store.state().current_conversation_id.is_none());
}

#[test]
fn related_documents_skip_missing_targets() {
    let (mut store, _) = hydrated_store();
    store.add_document(document("d1", "One", "x"));
    store.add_document(document("d2", "Two", "y"));
    store.add_document(document("d3", "Three", "z"));
    store.add_document_relationship("d1", edge("d2", 0.8));
    store.add_document_relationship("d1", edge("d3", 1.7));
    store.add_document_relationship("d1", edge("d1", 0.5));
    store.add_document_relationship("d1", edge("ghost", 0.5));

    let connections = store.document_connections("d1");
    assert_eq!(connections.len(), 2);
    assert_eq!(connections[1].strength, 1.0);

    store.delete_document("d3");
    let related: Vec<&str> = store
        .related_documents("d1")
        .iter()
        .map(|d| d.id.as_str())
        .collect();
    assert_eq!(related, vec!["d2"]);
    assert_eq!(store.document("d1").expect("d1").relationships.len(), 1);
}

#[test]
fn content_update_records_a_version_only_on_change() {
    let (mut store, _) = hydrated_store();
    let mut original = document("d1", "Doc", "v1");
    original.processed = true;
    store.add_document(original);

    store.update_document_content("d1", "v1", "no-op");
    assert_eq!(store.document("d1").expect("d1").version, 1);

    store.update_document_content("d1", "version two", "rewrite");
    let updated = store.document("d1").expect("d1");
    assert_eq!(updated.version, 2);
    assert_eq!(updated.version_history.len(), 2);
    assert_eq!(updated.version_history[1].changes, "rewrite");
    assert_eq!(updated.file_size, "version two".len() as u64);
    assert!(!updated.processed);
}

#[test]
fn usage_analytics_counts_recent_activity() {
    let (mut store, _) = hydrated_store();
    let mut old = Conversation::new("old", "Old");
    old.created_at = Utc::now() - Duration::days(40);
    old.messages.push(Message::user("ancient"));
    store.add_conversation(old);

    store.add_conversation(Conversation::new("new", "New"));
    store.add_message("new", Message::user("q"));
    store.add_message("new", Message::assistant("a"));

    store.add_document(document("d1", "Read", "x"));
    store.add_document(document("d2", "Unread", "y"));
    store.record_document_access("d1");
    store.record_document_access("d1");

    let mut busy = Tag::new("busy", "busy");
    busy.count = 9;
    store.add_tag(Tag::new("quiet", "quiet"));
    store.add_tag(busy);

    let analytics = store.usage_analytics(AnalyticsPeriod::Week);
    assert_eq!(analytics.total_conversations, 1);
    assert_eq!(analytics.total_messages, 2);
    assert_eq!(analytics.popular_tags[0].id, "busy");
    assert_eq!(analytics.accessed_documents.len(), 1);
    assert_eq!(analytics.accessed_documents[0].access_count, 2);

    let yearly = store.usage_analytics(AnalyticsPeriod::Year);
    assert_eq!(yearly.total_conversations, 2);
}

#[test]
fn rehydrate_restores_timestamps_as_dates() {
    let storage = Arc::new(MemoryStorage::default());
    let mut store = Store::new(storage.clone());
    store.rehydrate().expect("rehydrate empty");

    store.add_tag(Tag::new("t1", "보안"));
    store.add_conversation(Conversation::new("c1", "Test"));
    store.add_message("c1", Message::user("hi"));
    store.add_document(document("d1", "Doc", "text"));
    store.record_document_access("d1");

    let expected_conversation = store.conversation("c1").cloned().expect("c1");
    let expected_document = store.document("d1").cloned().expect("d1");
    let expected_tag = store.tag("t1").cloned().expect("t1");

    let mut restored = Store::new(storage);
    restored.rehydrate().expect("rehydrate saved state");

    let conversation = restored.conversation("c1").expect("restored c1");
    assert_eq!(conversation.created_at, expected_conversation.created_at);
    assert_eq!(conversation.updated_at, expected_conversation.updated_at);
    assert_eq!(
        conversation.messages[0].timestamp,
        expected_conversation.messages[0].timestamp
    );
    assert!(conversation.updated_at >= conversation.created_at);

    let document = restored.document("d1").expect("restored d1");
    assert_eq!(document.upload_date, expected_document.upload_date);
    assert_eq!(
        document.metadata.last_accessed,
        expected_document.metadata.last_accessed
    );
    assert_eq!(
        document.version_history[0].timestamp,
        expected_document.version_history[0].timestamp
    );
    assert!(Utc::now() - document.upload_date >= Duration::zero());

    assert_eq!(restored.tag("t1").expect("t1").created_at, expected_tag.created_at);
}

#[test]
fn rehydrate_reads_web_client_blob() {
    let storage = Arc::new(MemoryStorage::default());
    storage
        .set_item(
            super::DEFAULT_STORAGE_KEY,
            r#"{
                "state": {
                    "conversations": [{
                        "id": "c1", "title": "보안 문의",
                        "createdAt": 1706778000000,
                        "updatedAt": "2024-02-01T09:05:00.000Z",
                        "messages": [{"id": "m1", "role": "user", "content": "hi",
                                      "timestamp": "2024-02-01T09:00:10.000Z"}]
                    }],
                    "sidebarOpen": false,
                    "darkMode": true
                },
                "version": 0
            }"#,
        )
        .expect("seed storage");

    let mut store = Store::new(storage);
    store.rehydrate().expect("rehydrate");

    let conversation = store.conversation("c1").expect("c1");
    let elapsed = conversation.updated_at - conversation.created_at;
    assert_eq!(elapsed, Duration::minutes(5));
    assert!(!store.state().sidebar_open);
    assert!(store.state().dark_mode);
}

#[test]
fn writes_are_suppressed_until_hydrated() {
    let storage = Arc::new(MemoryStorage::default());
    storage
        .set_item(super::DEFAULT_STORAGE_KEY, r#"{"state":{"darkMode":true},"version":1}"#)
        .expect("seed storage");

    let mut store = Store::new(storage.clone());
    store.add_conversation(Conversation::new("early", "Before hydrate"));
    let raw = storage
        .get_item(super::DEFAULT_STORAGE_KEY)
        .expect("read")
        .expect("still present");
    assert!(!raw.contains("early"));

    store.rehydrate().expect("rehydrate");
    assert!(store.state().dark_mode);
    store.set_sidebar_open(false);
    let raw = storage
        .get_item(super::DEFAULT_STORAGE_KEY)
        .expect("read")
        .expect("present");
    assert!(raw.contains("\"sidebarOpen\":false"));
}

#[test]
fn corrupt_snapshot_leaves_store_unhydrated() {
    let storage = Arc::new(MemoryStorage::default());
    storage
        .set_item(super::DEFAULT_STORAGE_KEY, "{not json")
        .expect("seed storage");

    let mut store = Store::new(storage.clone());
    let error = store.rehydrate().expect_err("corrupt snapshot");
    assert!(matches!(error, StoreError::Json(_)));
    assert!(!store.is_hydrated());

    store.discard_persisted().expect("discard");
    assert!(store.is_hydrated());
    let raw = storage
        .get_item(super::DEFAULT_STORAGE_KEY)
        .expect("read")
        .expect("rewritten");
    assert!(raw.starts_with('{'));
    assert!(raw.contains("\"version\""));
}

#[test]
fn document_patch_merges_selected_fields() {
    let (mut store, _) = hydrated_store();
    store.add_document(document("d1", "Draft", "x"));
    store.update_document(
        "d1",
        DocumentPatch {
            title: Some("Final".to_string()),
            processed: Some(true),
            ..DocumentPatch::default()
        },
    );
    let updated = store.document("d1").expect("d1");
    assert_eq!(updated.title, "Final");
    assert!(updated.processed);
    assert_eq!(updated.content, "x");

    store.toggle_document_selection("d1");
    assert_eq!(store.selected_documents().len(), 1);
    store.delete_document("d1");
    assert!(store.state().selected_documents.is_empty());
}

#[test]
fn refresh_user_stats_ignores_placeholders() {
    let (mut store, _) = hydrated_store();
    store.add_conversation(Conversation::new("c1", "One"));
    store.add_message("c1", Message::user("q"));
    store.add_message("c1", Message::typing_placeholder());
    store.add_document(document("d1", "Doc", "x"));

    store.refresh_user_stats();
    let stats = &store.user().stats;
    assert_eq!(stats.total_conversations, 1);
    assert_eq!(stats.total_messages, 1);
    assert_eq!(stats.total_documents, 1);
}

#[test]
fn reset_restores_defaults_and_persists() {
    let (mut store, storage) = hydrated_store();
    store.add_conversation(Conversation::new("c1", "One"));
    store.set_sidebar_open(false);

    store.reset();

    assert!(store.conversations().is_empty());
    assert!(store.state().sidebar_open);
    let raw = storage
        .get_item(super::DEFAULT_STORAGE_KEY)
        .expect("read")
        .expect("present");
    assert!(raw.contains("\"conversations\":[]"));
}

#[test]
fn reactions_advance_updated_at_only_when_they_change() {
    let (mut store, _) = hydrated_store();
    store.add_conversation(Conversation::new("c1", "Test"));
    store.add_message(
        "c1",
        Message {
            id: "m1".to_string(),
            ..Message::assistant("answer")
        },
    );
    let after_message = store.conversation("c1").expect("c1").updated_at;

    store.add_reaction("c1", "m1", ReactionType::Like);
    let after_like = store.conversation("c1").expect("c1").updated_at;
    assert!(after_like > after_message);

    store.remove_reaction("c1", "m1", ReactionType::Dislike);
    assert_eq!(store.conversation("c1").expect("c1").updated_at, after_like);

    store.remove_reaction("c1", "m1", ReactionType::Like);
    assert!(store.conversation("c1").expect("c1").updated_at > after_like);
}

#[test]
fn update_message_patches_fields_and_clamps_confidence() {
    let (mut store, _) = hydrated_store();
    store.add_conversation(Conversation::new("c1", "Test"));
    store.add_message(
        "c1",
        Message {
            id: "m1".to_string(),
            processing: Some(true),
            ..Message::assistant("")
        },
    );
    let before = store.conversation("c1").expect("c1").updated_at;

    store.update_message(
        "c1",
        "m1",
        MessagePatch {
            content: Some("done".to_string()),
            confidence: Some(1.7),
            processing: Some(false),
            ..MessagePatch::default()
        },
    );

    let conversation = store.conversation("c1").expect("c1");
    let message = conversation.message("m1").expect("m1");
    assert_eq!(message.content, "done");
    assert_eq!(message.confidence, Some(1.0));
    assert_eq!(message.processing, None);
    assert!(conversation.updated_at > before);

    store.update_message(
        "c1",
        "m1",
        MessagePatch {
            confidence: Some(-0.5),
            ..MessagePatch::default()
        },
    );
    let message = store.conversation("c1").and_then(|c| c.message("m1")).expect("m1");
    assert_eq!(message.confidence, Some(0.0));
    assert_eq!(message.content, "done");

    store.update_message(
        "c1",
        "missing",
        MessagePatch {
            content: Some("lost".to_string()),
            ..MessagePatch::default()
        },
    );
    assert_eq!(store.conversation("c1").expect("c1").messages.len(), 1);
}

#[test]
fn conversation_rating_is_clamped_to_one_through_five() {
    let (mut store, _) = hydrated_store();
    store.add_conversation(Conversation::new("c1", "Test"));

    store.rate_conversation("c1", 0);
    assert_eq!(store.conversation("c1").expect("c1").rating, Some(1));
    store.rate_conversation("c1", 9);
    assert_eq!(store.conversation("c1").expect("c1").rating, Some(5));
    store.rate_conversation("c1", 3);
    assert_eq!(store.conversation("c1").expect("c1").rating, Some(3));

    store.rate_conversation("missing", 4);
    assert!(store.conversation("missing").is_none());
}

#[test]
fn update_tag_changes_only_patched_fields() {
    let (mut store, _) = hydrated_store();
    let mut tag = Tag::new("t1", "보안");
    tag.count = 3;
    store.add_tag(tag);

    store.update_tag(
        "t1",
        TagPatch {
            name: Some("정보보안".to_string()),
            category: Some(TagCategory::Auto),
            ..TagPatch::default()
        },
    );

    let tag = store.tag("t1").expect("t1");
    assert_eq!(tag.name, "정보보안");
    assert_eq!(tag.category, TagCategory::Auto);
    assert_eq!(tag.color, "#6b7280");
    assert_eq!(tag.count, 3);
}

#[test]
fn user_and_preferences_patches_merge() {
    let (mut store, _) = hydrated_store();
    store.update_user(UserPatch {
        name: Some("김보안".to_string()),
        avatar: Some(Some("avatar.png".to_string())),
        ..UserPatch::default()
    });
    assert_eq!(store.user().name, "김보안");
    assert_eq!(store.user().avatar.as_deref(), Some("avatar.png"));
    assert_eq!(store.user().email, "user@syncinsight.local");

    store.update_user(UserPatch {
        avatar: Some(None),
        ..UserPatch::default()
    });
    assert!(store.user().avatar.is_none());
    assert_eq!(store.user().name, "김보안");

    store.update_preferences(PreferencesPatch {
        theme: Some(Theme::Dark),
        ui: Some(UiPreferences {
            compact_mode: true,
            ..UiPreferences::default()
        }),
        ..PreferencesPatch::default()
    });
    let preferences = &store.user().preferences;
    assert_eq!(preferences.theme, Theme::Dark);
    assert!(preferences.ui.compact_mode);
    assert_eq!(preferences.language, "ko");
    assert_eq!(preferences.timezone, "Asia/Seoul");
}

#[test]
fn settings_patch_clamps_temperature_and_max_tokens() {
    let (mut store, storage) = hydrated_store();
    store.update_settings(SettingsPatch {
        temperature: Some(5.0),
        max_tokens: Some(0),
        response_speed: Some(ResponseSpeed::Fast),
        ..SettingsPatch::default()
    });
    let ai = &store.settings().ai;
    assert_eq!(ai.temperature, 2.0);
    assert_eq!(ai.max_tokens, 1);
    assert_eq!(ai.response_speed, ResponseSpeed::Fast);
    assert_eq!(ai.model, "syncinsight-rag");

    store.update_settings(SettingsPatch {
        temperature: Some(-1.0),
        auto_save: Some(false),
        ..SettingsPatch::default()
    });
    assert_eq!(store.settings().ai.temperature, 0.0);
    assert_eq!(store.settings().ai.max_tokens, 1);
    assert!(!store.settings().general.auto_save);

    let raw = storage
        .get_item(super::DEFAULT_STORAGE_KEY)
        .expect("read")
        .expect("persisted");
    assert!(raw.contains("\"autoSave\":false"));
}

#[test]
fn recount_tags_rebuilds_counters_from_membership() {
    let (mut store, _) = hydrated_store();
    let mut stale = Tag::new("stale", "stale");
    stale.count = 7;
    store.add_tag(stale);
    store.add_tag(Tag::new("used", "used"));
    store.add_conversation(Conversation::new("c1", "Test"));
    store.add_document(document("d1", "Doc", "text"));
    store.add_tag_to_conversation("c1", "used");
    store.add_tag_to_document("d1", "used");

    store.recount_tags();

    assert_eq!(store.tag("stale").expect("stale").count, 0);
    assert_eq!(store.tag("used").expect("used").count, 2);
}

#[test]
fn remove_document_relationship_drops_only_that_edge() {
    let (mut store, _) = hydrated_store();
    store.add_document(document("a", "A", "a"));
    store.add_document(document("b", "B", "b"));
    store.add_document(document("c", "C", "c"));
    store.add_document_relationship("a", edge("b", 0.5));
    store.add_document_relationship("a", edge("c", 0.9));

    store.remove_document_relationship("a", "b");
    store.remove_document_relationship("a", "missing");
    store.remove_document_relationship("missing", "c");

    let targets: Vec<&str> = store
        .document("a")
        .expect("a")
        .relationships
        .iter()
        .map(|relationship| relationship.document_id.as_str())
        .collect();
    assert_eq!(targets, vec!["c"]);
}

#[test]
fn clearing_selection_empties_it() {
    let (mut store, _) = hydrated_store();
    store.add_document(document("d1", "One", "x"));
    store.add_document(document("d2", "Two", "y"));
    store.toggle_document_selection("d1");
    store.toggle_document_selection("d2");
    assert_eq!(store.selected_documents().len(), 2);

    store.clear_document_selection();
    assert!(store.selected_documents().is_empty());
    assert!(store.state().selected_documents.is_empty());
    assert!(store.document("d1").is_some());
}

#[test]
fn usage_analytics_keeps_ten_most_used_tags() {
    let (mut store, _) = hydrated_store();
    for count in 0..12u32 {
        let mut tag = Tag::new(format!("t{}", count), format!("tag {}", count));
        tag.count = count;
        store.add_tag(tag);
    }

    let analytics = store.usage_analytics(AnalyticsPeriod::Month);
    let counts: Vec<u32> = analytics.popular_tags.iter().map(|tag| tag.count).collect();
    assert_eq!(counts, vec![11, 10, 9, 8, 7, 6, 5, 4, 3, 2]);
}

#[test]
fn rehydrate_drops_saved_typing_placeholders() {
    let storage = Arc::new(MemoryStorage::default());
    let mut store = Store::new(storage.clone());
    store.rehydrate().expect("rehydrate empty");
    store.add_conversation(Conversation::new("c1", "Test"));
    store.add_message("c1", Message::user("question"));
    store.add_message("c1", Message::typing_placeholder());
    let raw = storage
        .get_item(super::DEFAULT_STORAGE_KEY)
        .expect("read")
        .expect("persisted");
    assert!(raw.contains(TYPING_MESSAGE_ID));

    let mut restored = Store::new(storage);
    restored.rehydrate().expect("rehydrate saved state");

    let messages = &restored.conversation("c1").expect("c1").messages;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].content, "question");
    assert!(messages.iter().all(|message| !message.is_processing()));
}
