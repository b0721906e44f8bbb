//! Demo dataset loaded into an empty store on first launch.

use chrono::{Duration, Utc};

use crate::core::model::{
    Conversation, Difficulty, Document, DocumentRelationship, DocumentSource, DocumentType,
    Folder, FolderType, Message, RelationshipKind, Tag, TagCategory,
};
use crate::core::store::Store;

pub const SECURITY_POLICY_ID: &str = "doc-security-policy";
pub const PROJECT_PLAN_ID: &str = "doc-project-plan";
pub const API_GUIDE_ID: &str = "doc-api-guide";
pub const QUARTERLY_REPORT_ID: &str = "doc-quarterly-report";

const SECURITY_POLICY: &str = "# 정보 보안 정책\n\n\
모든 임직원은 사내 시스템 접근 시 2단계 인증을 사용해야 합니다.\n\n\
비밀번호는 90일마다 변경하며, 최소 12자 이상으로 설정합니다.\n\n\
고객 데이터는 암호화된 저장소에만 보관하고 외부 반출을 금지합니다.";

const PROJECT_PLAN: &str = "# SyncInsight 프로젝트 계획서\n\n\
1단계: 문서 업로드와 검색 기능을 구축합니다.\n\n\
2단계: 대화형 질의응답과 출처 표시 기능을 추가합니다.\n\n\
3단계: 사용 분석 대시보드와 팀 공유 기능을 제공합니다.";

const API_GUIDE: &str = "# API 연동 가이드\n\n\
모든 요청은 Authorization 헤더에 발급받은 토큰을 포함해야 합니다.\n\n\
문서 목록은 GET /api/documents, 질의는 POST /api/query 로 호출합니다.\n\n\
요청 한도는 분당 60회이며 초과 시 429 응답을 반환합니다.";

const QUARTERLY_REPORT: &str = "# 3분기 운영 보고서\n\n\
월간 활성 사용자가 전 분기 대비 24% 증가했습니다.\n\n\
평균 응답 시간은 1.2초로 목표치를 충족했습니다.\n\n\
검색 만족도 조사에서 4.3점을 기록했습니다.";

/// Seeds folders, tags, documents and one sample conversation. Stores that
/// already hold conversations or documents are left untouched.
pub fn seed_demo_data(store: &mut Store) -> bool {
    if !store.conversations().is_empty() || !store.documents().is_empty() {
        log::debug!("seed_demo_data: store is not empty, skipping");
        return false;
    }

    for folder in demo_folders() {
        store.add_folder(folder);
    }
    for tag in demo_tags() {
        store.add_tag(tag);
    }

    // add_document prepends, so insert oldest first.
    for document in demo_documents().into_iter().rev() {
        store.add_document(document);
    }
    store.move_document_to_folder(SECURITY_POLICY_ID, Some("folder-policies"));
    store.move_document_to_folder(API_GUIDE_ID, Some("folder-technical"));
    store.move_document_to_folder(PROJECT_PLAN_ID, Some("folder-technical"));
    for (document_id, tag_id) in [
        (SECURITY_POLICY_ID, "tag-security"),
        (PROJECT_PLAN_ID, "tag-project"),
        (API_GUIDE_ID, "tag-api"),
        (QUARTERLY_REPORT_ID, "tag-report"),
    ] {
        store.add_tag_to_document(document_id, tag_id);
    }

    for (from, to, kind, strength) in [
        (API_GUIDE_ID, SECURITY_POLICY_ID, RelationshipKind::References, 0.7),
        (PROJECT_PLAN_ID, API_GUIDE_ID, RelationshipKind::Extends, 0.6),
        (QUARTERLY_REPORT_ID, PROJECT_PLAN_ID, RelationshipKind::Supports, 0.5),
    ] {
        store.add_document_relationship(
            from,
            DocumentRelationship {
                document_id: to.to_string(),
                kind,
                strength,
                context: None,
            },
        );
    }

    let conversation = demo_conversation();
    let conversation_id = conversation.id.clone();
    store.add_conversation(conversation);
    store.move_conversation_to_folder(&conversation_id, Some("folder-work"));
    store.add_tag_to_conversation(&conversation_id, "tag-security");

    log::info!(
        "seeded demo data: {} documents, {} folders, {} tags",
        store.documents().len(),
        store.folders().len(),
        store.tags().len()
    );
    true
}

fn demo_folders() -> Vec<Folder> {
    let mut work = Folder::new("folder-work", "업무 대화", FolderType::Conversation);
    work.order = 0;
    let mut policies = Folder::new("folder-policies", "사내 규정", FolderType::Document);
    policies.color = "#ef4444".to_string();
    policies.order = 0;
    let mut technical = Folder::new("folder-technical", "기술 문서", FolderType::Document);
    technical.color = "#10b981".to_string();
    technical.order = 1;
    vec![work, policies, technical]
}

fn demo_tags() -> Vec<Tag> {
    [
        ("tag-security", "보안", "#ef4444"),
        ("tag-project", "프로젝트", "#3b82f6"),
        ("tag-api", "API", "#10b981"),
        ("tag-report", "보고서", "#f59e0b"),
    ]
    .into_iter()
    .map(|(id, name, color)| Tag {
        color: color.to_string(),
        category: TagCategory::Manual,
        ..Tag::new(id, name)
    })
    .collect()
}

fn demo_documents() -> Vec<Document> {
    let now = Utc::now();
    let specs = [
        (SECURITY_POLICY_ID, "정보 보안 정책", SECURITY_POLICY, DocumentType::Pdf, 30, Difficulty::Beginner, vec!["보안", "인증", "암호화"]),
        (PROJECT_PLAN_ID, "SyncInsight 프로젝트 계획서", PROJECT_PLAN, DocumentType::Docx, 21, Difficulty::Intermediate, vec!["프로젝트", "일정"]),
        (API_GUIDE_ID, "API 연동 가이드", API_GUIDE, DocumentType::Md, 14, Difficulty::Advanced, vec!["API", "인증", "요청 한도"]),
        (QUARTERLY_REPORT_ID, "3분기 운영 보고서", QUARTERLY_REPORT, DocumentType::Hwp, 3, Difficulty::Beginner, vec!["보고서", "지표"]),
    ];

    specs
        .into_iter()
        .map(|(id, title, content, doc_type, age_days, difficulty, keywords)| {
            let mut document = Document::new(id, title, content, doc_type);
            let uploaded = now - Duration::days(age_days);
            document.upload_date = uploaded;
            for version in &mut document.version_history {
                version.timestamp = uploaded;
            }
            document.processed = true;
            document.metadata.author = Some("SyncInsight 팀".to_string());
            document.metadata.difficulty = difficulty;
            document.metadata.keywords = keywords.into_iter().map(str::to_string).collect();
            document.metadata.reading_time = 1;
            document
        })
        .collect()
}

fn demo_conversation() -> Conversation {
    let started = Utc::now() - Duration::hours(2);
    let mut conversation = Conversation::new("conv-welcome", "보안 정책 문의");
    conversation.created_at = started;

    let mut question = Message::user("비밀번호 변경 주기가 어떻게 되나요?");
    question.timestamp = started;
    let mut answer = Message::assistant(
        "정보 보안 정책에 따르면 비밀번호는 90일마다 변경해야 하며, 최소 12자 이상으로 설정해야 합니다.",
    );
    answer.timestamp = started + Duration::seconds(2);
    answer.confidence = Some(0.92);
    answer.sources = Some(vec![DocumentSource {
        document_id: SECURITY_POLICY_ID.to_string(),
        title: "정보 보안 정책".to_string(),
        excerpt: "비밀번호는 90일마다 변경하며, 최소 12자 이상으로 설정합니다.".to_string(),
        page: Some(1),
        relevance: 0.95,
    }]);

    conversation.updated_at = answer.timestamp;
    conversation.messages = vec![question, answer];
    conversation
}
