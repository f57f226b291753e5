//! 코드 생성 타입 및 trait 정의.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use stratgen_core::{GeneratedArtifact, PipelineResult};

/// 코드 생성기 trait.
///
/// 구현체는 요청당 정확히 한 번 외부 서비스를 호출하고, 추출된 코드를
/// 담은 `GeneratedArtifact`를 반환합니다. 파일 쓰기는 하지 않습니다.
#[async_trait]
pub trait CodeGenerator: Send + Sync {
    /// 전략 설명으로부터 코드를 생성합니다.
    ///
    /// # Errors
    /// - 자격증명 누락: `Configuration` (네트워크 호출 전)
    /// - 전송/HTTP 실패: `Upstream`
    async fn generate(&self, text: &str) -> PipelineResult<GeneratedArtifact>;

    /// 생성기 이름을 반환합니다.
    fn name(&self) -> &str;
}

/// chat completions 요청 본문.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    /// 모델 식별자
    pub model: String,
    /// 대화 메시지 (시스템 지시문 + 사용자 입력)
    pub messages: Vec<ChatMessage>,
    /// 샘플링 온도
    pub temperature: f64,
}

/// 대화 메시지.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// 역할 ("system" | "user" | "assistant")
    pub role: String,
    /// 메시지 내용
    pub content: String,
}

impl ChatMessage {
    /// 시스템 메시지.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// 사용자 메시지.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// chat completions 응답 본문 (필요한 필드만).
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

/// 응답 후보.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChatResponseMessage,
}

/// 응답 메시지.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// 첫 번째 후보의 텍스트.
    pub fn first_content(self) -> Option<String> {
        self.choices.into_iter().next()?.message.content
    }
}

/// OpenAI 형식 에러 응답 (`{ "error": { "message": ... } }`).
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorEnvelope {
    pub error: ApiErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub message: String,
}
