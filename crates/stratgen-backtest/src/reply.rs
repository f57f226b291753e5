//! 실행 서비스 응답 디코딩.
//!
//! 실행 서비스는 HTTP 200과 함께 `{ "error": "..." }`를 반환하기도 합니다.
//! 이 구분은 여기서 한 번만 이루어지고, 이후 단계는 태그된 결과만 봅니다.

use serde_json::Value;

/// 실행 서비스 응답.
#[derive(Debug, Clone, PartialEq)]
pub enum InvocationReply {
    /// 원시 결과 (아직 검증되지 않음)
    Completed(Value),
    /// 서비스가 보고한 실패 메시지
    Failed(String),
}

impl InvocationReply {
    /// 응답 본문을 분류합니다.
    ///
    /// 최상위 `error` 필드가 null이 아니면 실패로 봅니다.
    pub fn from_value(value: Value) -> Self {
        match error_message(&value) {
            Some(message) => Self::Failed(message),
            None => Self::Completed(value),
        }
    }

    /// 결과로 변환합니다.
    pub fn into_result(self) -> Result<Value, String> {
        match self {
            Self::Completed(value) => Ok(value),
            Self::Failed(message) => Err(message),
        }
    }
}

/// 최상위 `error` 필드의 메시지.
pub(crate) fn error_message(value: &Value) -> Option<String> {
    match value.get("error")? {
        Value::Null => None,
        Value::String(message) => Some(message.clone()),
        other => Some(other.to_string()),
    }
}
