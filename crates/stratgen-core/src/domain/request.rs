//! 사용자 전략 요청.

use serde::Serialize;

use crate::error::{PipelineError, PipelineResult};

/// 빈 입력에 대한 사유 메시지.
pub const MISSING_PROMPT: &str = "missing prompt";

/// 자연어 전략 설명.
///
/// 제출마다 하나씩 생성되며 불변입니다. 생성 시 앞뒤 공백을 제거하고,
/// 공백뿐인 입력은 거부하므로 유효한 `StrategyRequest`는 항상 비어 있지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrategyRequest {
    natural_language_text: String,
}

impl StrategyRequest {
    /// 새 전략 요청을 생성합니다.
    ///
    /// # Errors
    /// 공백을 제거한 텍스트가 비어 있으면 `InvalidInput("missing prompt")`.
    pub fn new(text: impl AsRef<str>) -> PipelineResult<Self> {
        let trimmed = text.as_ref().trim();
        if trimmed.is_empty() {
            return Err(PipelineError::InvalidInput(MISSING_PROMPT.to_string()));
        }
        Ok(Self {
            natural_language_text: trimmed.to_string(),
        })
    }

    /// 전략 설명 텍스트.
    pub fn text(&self) -> &str {
        &self.natural_language_text
    }
}
