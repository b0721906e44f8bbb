//! Canned assistant that answers from a keyword-keyed template table.
//!
//! Stands in for a retrieval-augmented backend: a speed-dependent delay, the
//! first matching template, confidence jittered by temperature and citations
//! pointing at the demo documents.

use std::time::Duration;

use futures::future::BoxFuture;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::adapters::seed::{
    API_GUIDE_ID, PROJECT_PLAN_ID, QUARTERLY_REPORT_ID, SECURITY_POLICY_ID,
};
use crate::core::model::{DocumentSource, Message, ResponseSpeed};
use crate::core::ports::responder::{ResponderPort, ResponseRequest};

/// Largest confidence shift at temperature 1.0.
const CONFIDENCE_JITTER: f32 = 0.1;

const FALLBACK_CONFIDENCE: f32 = 0.45;

const FALLBACK_ANSWER: &str = "질문을 이해했지만 업로드된 문서에서 직접적인 근거를 찾지 못했습니다. \
관련 문서를 업로드하시거나 질문을 조금 더 구체적으로 작성해 주시면 더 정확히 답변드리겠습니다.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponderDelays {
    pub fast_ms: u64,
    pub normal_ms: u64,
    pub slow_ms: u64,
}

impl Default for ResponderDelays {
    fn default() -> Self {
        Self {
            fast_ms: 500,
            normal_ms: 1_500,
            slow_ms: 3_000,
        }
    }
}

impl ResponderDelays {
    pub fn none() -> Self {
        Self {
            fast_ms: 0,
            normal_ms: 0,
            slow_ms: 0,
        }
    }

    pub fn for_speed(&self, speed: ResponseSpeed) -> Duration {
        let millis = match speed {
            ResponseSpeed::Fast => self.fast_ms,
            ResponseSpeed::Normal => self.normal_ms,
            ResponseSpeed::Slow => self.slow_ms,
        };
        Duration::from_millis(millis)
    }
}

struct Citation {
    document_id: &'static str,
    title: &'static str,
    excerpt: &'static str,
    page: Option<u32>,
    relevance: f32,
}

struct Template {
    keywords: &'static [&'static str],
    answer: &'static str,
    confidence: f32,
    citations: &'static [Citation],
}

const SECURITY_CITATIONS: &[Citation] = &[Citation {
    document_id: SECURITY_POLICY_ID,
    title: "정보 보안 정책",
    excerpt: "모든 임직원은 사내 시스템 접근 시 2단계 인증을 사용해야 합니다.",
    page: Some(1),
    relevance: 0.94,
}];

const PROJECT_CITATIONS: &[Citation] = &[Citation {
    document_id: PROJECT_PLAN_ID,
    title: "SyncInsight 프로젝트 계획서",
    excerpt: "1단계: 문서 업로드와 검색 기능을 구축합니다.",
    page: Some(2),
    relevance: 0.88,
}];

const REPORT_CITATIONS: &[Citation] = &[
    Citation {
        document_id: QUARTERLY_REPORT_ID,
        title: "3분기 운영 보고서",
        excerpt: "월간 활성 사용자가 전 분기 대비 24% 증가했습니다.",
        page: Some(1),
        relevance: 0.86,
    },
    Citation {
        document_id: PROJECT_PLAN_ID,
        title: "SyncInsight 프로젝트 계획서",
        excerpt: "3단계: 사용 분석 대시보드와 팀 공유 기능을 제공합니다.",
        page: Some(3),
        relevance: 0.71,
    },
];

const API_CITATIONS: &[Citation] = &[Citation {
    document_id: API_GUIDE_ID,
    title: "API 연동 가이드",
    excerpt: "모든 요청은 Authorization 헤더에 발급받은 토큰을 포함해야 합니다.",
    page: None,
    relevance: 0.91,
}];

/// Checked in order; the first template with a keyword in the query wins.
const TEMPLATES: &[Template] = &[
    Template {
        keywords: &["보안", "security", "비밀번호", "password"],
        answer: "보안 정책 문서에 따르면 사내 시스템 접근 시 2단계 인증이 필수이며, \
비밀번호는 90일마다 변경하고 최소 12자 이상이어야 합니다. 고객 데이터는 암호화된 저장소에만 보관합니다.",
        confidence: 0.92,
        citations: SECURITY_CITATIONS,
    },
    Template {
        keywords: &["프로젝트", "project", "일정", "계획"],
        answer: "프로젝트는 세 단계로 진행됩니다. 1단계에서 문서 업로드와 검색을, \
2단계에서 대화형 질의응답과 출처 표시를, 3단계에서 사용 분석 대시보드와 팀 공유 기능을 제공합니다.",
        confidence: 0.87,
        citations: PROJECT_CITATIONS,
    },
    Template {
        keywords: &["요약", "summary", "summarize"],
        answer: "핵심 내용을 요약하면 다음과 같습니다. 월간 활성 사용자가 24% 증가했고, \
평균 응답 시간 1.2초로 목표를 달성했으며, 다음 단계로 분석 대시보드가 계획되어 있습니다.",
        confidence: 0.84,
        citations: REPORT_CITATIONS,
    },
    Template {
        keywords: &["분석", "analysis", "analytics", "통계"],
        answer: "운영 지표를 분석한 결과 사용자 증가율은 24%, 검색 만족도는 4.3점입니다. \
응답 시간이 안정적으로 유지되고 있어 현재 구성을 유지하는 것을 권장합니다.",
        confidence: 0.81,
        citations: REPORT_CITATIONS,
    },
    Template {
        keywords: &["api", "엔드포인트", "endpoint"],
        answer: "API 호출 시 Authorization 헤더에 토큰을 포함해야 합니다. \
문서 목록은 GET /api/documents, 질의는 POST /api/query 를 사용하며 분당 60회 한도가 적용됩니다.",
        confidence: 0.9,
        citations: API_CITATIONS,
    },
    Template {
        keywords: &["검색", "search", "찾아"],
        answer: "문서 검색은 제목, 본문, 요약과 태그 이름을 대상으로 동작합니다. \
왼쪽 검색창에 키워드를 입력하면 문서와 대화가 함께 표시됩니다.",
        confidence: 0.78,
        citations: &[],
    },
    Template {
        keywords: &["안녕", "hello", "hi ", "반가"],
        answer: "안녕하세요! SyncInsight입니다. 업로드하신 문서를 바탕으로 무엇이든 물어보세요.",
        confidence: 0.95,
        citations: &[],
    },
];

fn find_template(query: &str) -> Option<&'static Template> {
    let folded = format!("{} ", query.to_lowercase());
    TEMPLATES.iter().find(|template| {
        template
            .keywords
            .iter()
            .any(|keyword| folded.contains(keyword))
    })
}

fn jittered_confidence(base: f32, temperature: f32) -> f32 {
    let noise = if temperature > 0.0 {
        rand::thread_rng().gen_range(-CONFIDENCE_JITTER..=CONFIDENCE_JITTER) * temperature
    } else {
        0.0
    };
    (base + noise).clamp(0.0, 1.0)
}

fn to_sources(citations: &[Citation]) -> Vec<DocumentSource> {
    citations
        .iter()
        .map(|citation| DocumentSource {
            document_id: citation.document_id.to_string(),
            title: citation.title.to_string(),
            excerpt: citation.excerpt.to_string(),
            page: citation.page,
            relevance: citation.relevance,
        })
        .collect()
}

pub struct MockResponder {
    delays: ResponderDelays,
}

impl MockResponder {
    pub fn new(delays: ResponderDelays) -> Self {
        Self { delays }
    }

    fn compose(&self, request: &ResponseRequest<'_>) -> Message {
        let template = find_template(request.query);
        let (answer, base, citations) = match template {
            Some(template) => (template.answer, template.confidence, template.citations),
            None => (FALLBACK_ANSWER, FALLBACK_CONFIDENCE, &[][..]),
        };

        let prior_turns = request
            .history
            .iter()
            .filter(|message| !message.is_processing())
            .count();
        let content = if prior_turns > 0 {
            format!("{}\n\n(이전 대화 {}개를 참고했습니다.)", answer, prior_turns)
        } else {
            answer.to_string()
        };

        let mut message = Message::assistant(content);
        message.confidence = Some(jittered_confidence(base, request.options.temperature));
        if request.options.include_context && !citations.is_empty() {
            message.sources = Some(to_sources(citations));
        }
        message
    }
}

impl Default for MockResponder {
    fn default() -> Self {
        Self::new(ResponderDelays::default())
    }
}

impl ResponderPort for MockResponder {
    fn generate_response<'a>(&'a self, request: ResponseRequest<'a>) -> BoxFuture<'a, Message> {
        Box::pin(async move {
            let delay = self.delays.for_speed(request.options.speed);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let message = self.compose(&request);
            log::debug!(
                "mock response for {:?}: confidence {:?}, {} sources",
                request.query,
                message.confidence,
                message.sources.as_ref().map_or(0, Vec::len)
            );
            message
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::Role;
    use crate::core::ports::responder::ResponseOptions;

    fn options(temperature: f32, include_context: bool) -> ResponseOptions {
        ResponseOptions {
            speed: ResponseSpeed::Fast,
            temperature,
            include_context,
        }
    }

    #[tokio::test]
    async fn security_question_cites_the_policy() {
        let responder = MockResponder::new(ResponderDelays::none());
        let message = responder
            .generate_response(ResponseRequest {
                query: "비밀번호 보안 규정 알려줘",
                history: &[],
                options: options(0.0, true),
            })
            .await;

        assert_eq!(message.role, Role::Assistant);
        assert_eq!(message.confidence, Some(0.92));
        let sources = message.sources.expect("sources");
        assert_eq!(sources[0].document_id, SECURITY_POLICY_ID);
    }

    #[tokio::test]
    async fn earlier_templates_win_over_later_ones() {
        let responder = MockResponder::new(ResponderDelays::none());
        let message = responder
            .generate_response(ResponseRequest {
                query: "Security API 검색",
                history: &[],
                options: options(0.0, false),
            })
            .await;
        assert!(message.content.contains("2단계 인증"));
        assert!(message.sources.is_none());
    }

    #[tokio::test]
    async fn unknown_question_falls_back_with_low_confidence() {
        let responder = MockResponder::new(ResponderDelays::none());
        let history = vec![Message::user("첫 질문"), Message::assistant("첫 답변")];
        let message = responder
            .generate_response(ResponseRequest {
                query: "점심 메뉴 추천",
                history: &history,
                options: options(0.0, true),
            })
            .await;

        assert_eq!(message.confidence, Some(FALLBACK_CONFIDENCE));
        assert!(message.sources.is_none());
        assert!(message.content.contains("이전 대화 2개"));
    }

    #[test]
    fn confidence_stays_within_unit_range() {
        for _ in 0..200 {
            let high = jittered_confidence(0.98, 2.0);
            let low = jittered_confidence(0.02, 2.0);
            assert!((0.0..=1.0).contains(&high));
            assert!((0.0..=1.0).contains(&low));
        }
    }

    #[test]
    fn delays_follow_response_speed() {
        let delays = ResponderDelays::default();
        assert!(delays.for_speed(ResponseSpeed::Fast) < delays.for_speed(ResponseSpeed::Normal));
        assert!(delays.for_speed(ResponseSpeed::Normal) < delays.for_speed(ResponseSpeed::Slow));
    }
}
