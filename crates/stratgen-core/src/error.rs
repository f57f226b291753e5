//! 파이프라인 에러 타입.
//!
//! 각 단계(코드 생성, 저장, 백테스트 호출, 결과 검증)는 이 모듈의
//! `PipelineError`로 실패를 보고합니다. 오케스트레이터는 첫 번째 에러를
//! 실패한 단계와 함께 `PipelineOutcome::Failure`로 변환합니다.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 파이프라인 단계.
///
/// 실패 결과에 포함되어 호출자가 어느 단계에서 문제가 생겼는지 구분합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStage {
    /// 코드 생성 (언어 모델 호출)
    Generation,
    /// 아티팩트 저장
    Persistence,
    /// 백테스트 실행 호출
    Invocation,
    /// 결과 검증
    Validation,
    /// 요청 수신 (클라이언트 입력 오류)
    Transport,
}

impl PipelineStage {
    /// 소문자 단계 이름을 반환합니다.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generation => "generation",
            Self::Persistence => "persistence",
            Self::Invocation => "invocation",
            Self::Validation => "validation",
            Self::Transport => "transport",
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 파이프라인 에러.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// 자격증명/설정 누락 (네트워크 호출 전에 보고됨)
    #[error("설정 에러: {0}")]
    Configuration(String),

    /// 협력 서비스와의 전송/HTTP 실패
    #[error("업스트림 에러: {}", upstream_reason(.status, .message))]
    Upstream {
        /// 응답 상태 코드 (전송 단계에서 실패한 경우 None)
        status: Option<u16>,
        /// 협력 서비스가 보고한 메시지
        message: String,
    },

    /// 아티팩트 파일시스템 에러
    #[error("저장소 에러: {context}: {source}")]
    Io {
        /// 실패한 작업 설명
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// 백테스트 서비스가 보고한 논리적 실패
    #[error("백테스트 실행 에러: {0}")]
    Invocation(String),

    /// 필수 필드가 누락되었거나 형식이 잘못된 결과
    #[error("결과 스키마 에러: {0}")]
    Schema(String),

    /// 잘못된 클라이언트 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),
}

fn upstream_reason(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("HTTP {code}: {message}"),
        None => message.to_string(),
    }
}

/// 파이프라인 작업을 위한 Result 타입.
pub type PipelineResult<T> = Result<T, PipelineError>;

impl PipelineError {
    /// 상태 코드 없는 업스트림 에러를 생성합니다.
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            status: None,
            message: message.into(),
        }
    }

    /// 상태 코드가 포함된 업스트림 에러를 생성합니다.
    pub fn upstream_status(status: u16, message: impl Into<String>) -> Self {
        Self::Upstream {
            status: Some(status),
            message: message.into(),
        }
    }

    /// 단계 타임아웃 에러.
    pub fn timeout() -> Self {
        Self::upstream("timeout")
    }

    /// 작업 설명이 포함된 I/O 에러를 생성합니다.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// 분류 접두어 없이 호출자에게 보여줄 메시지를 반환합니다.
    ///
    /// `Invocation("symbol not found")`는 `"symbol not found"`가 됩니다.
    pub fn reason(&self) -> String {
        match self {
            Self::Configuration(msg)
            | Self::Invocation(msg)
            | Self::Schema(msg)
            | Self::InvalidInput(msg) => msg.clone(),
            Self::Upstream { status, message } => upstream_reason(status, message),
            Self::Io { context, source } => format!("{context}: {source}"),
        }
    }

    /// 호출자가 전체 요청을 다시 시도하면 성공할 수 있는 에러인지 확인합니다.
    ///
    /// 파이프라인 내부에서는 재시도하지 않습니다.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Upstream { .. } | Self::Io { .. })
    }

    /// 클라이언트 입력 에러인지 확인합니다.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_strips_taxonomy_prefix() {
        let err = PipelineError::Invocation("symbol not found".to_string());
        assert_eq!(err.reason(), "symbol not found");
        assert!(err.to_string().ends_with("symbol not found"));
        assert_ne!(err.to_string(), err.reason());
    }

    #[test]
    fn test_upstream_reason_includes_status() {
        let err = PipelineError::upstream_status(401, "invalid api key");
        assert_eq!(err.reason(), "HTTP 401: invalid api key");

        let timeout = PipelineError::timeout();
        assert_eq!(timeout.reason(), "timeout");
    }

    #[test]
    fn test_error_retryable() {
        assert!(PipelineError::timeout().is_retryable());
        assert!(PipelineError::io(
            "write artifact",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        )
        .is_retryable());

        assert!(!PipelineError::Schema("incomplete result".into()).is_retryable());
        assert!(!PipelineError::Configuration("missing key".into()).is_retryable());
    }

    #[test]
    fn test_client_error() {
        assert!(PipelineError::InvalidInput("missing prompt".into()).is_client_error());
        assert!(!PipelineError::Invocation("boom".into()).is_client_error());
    }

    #[test]
    fn test_stage_serialization() {
        let json = serde_json::to_string(&PipelineStage::Persistence).unwrap();
        assert_eq!(json, r#""persistence""#);
        assert_eq!(PipelineStage::Transport.to_string(), "transport");
    }
}
