//! API 에러 응답 타입.
//!
//! 코드 생성/백테스트 엔드포인트는 실패 시 `{ "error": "..." }` 형식을 사용합니다.

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use stratgen_core::PipelineError;
use stratgen_pipeline::StageFailure;

/// API 에러 응답.
///
/// ```json
/// { "error": "OPENAI_API_KEY is not set in the environment" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// 사람이 읽을 수 있는 에러 메시지
    pub error: String,
}

impl ApiErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }

    /// 에러 메시지 반환.
    pub fn message(&self) -> &str {
        &self.error
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.error)
    }
}

impl std::error::Error for ApiErrorResponse {}

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, (StatusCode, Json<ApiErrorResponse>)>;

/// 400 응답.
pub fn bad_request(message: impl Into<String>) -> (StatusCode, Json<ApiErrorResponse>) {
    (StatusCode::BAD_REQUEST, Json(ApiErrorResponse::new(message)))
}

/// 에러 분류에 맞는 상태 코드 (클라이언트 입력 에러만 400).
pub fn status_for(error: &PipelineError) -> StatusCode {
    if error.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// 단계 실패를 응답으로 변환합니다. 메시지는 그대로 전달됩니다.
pub fn stage_failure(failure: StageFailure) -> (StatusCode, Json<ApiErrorResponse>) {
    (
        status_for(&failure.error),
        Json(ApiErrorResponse::new(failure.reason())),
    )
}

/// 서버 쪽 단계 실패를 500 응답으로 변환합니다.
///
/// 요청 본문 검증을 통과한 뒤의 실패는 에러 분류와 관계없이 서버 에러입니다.
pub fn server_failure(failure: StageFailure) -> (StatusCode, Json<ApiErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiErrorResponse::new(failure.reason())),
    )
}
