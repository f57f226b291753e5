//! API 라우트.
//!
//! # 라우트 구조
//!
//! - `/` - liveness 텍스트
//! - `/health` - 헬스 체크 (JSON)
//! - `/api/generate` - 전략 코드 생성 및 저장
//! - `/run-strategy` - 저장된 전략 백테스트 실행
//! - `/api/pipeline` - 설명 → 검증된 백테스트 결과 전체 파이프라인

pub mod backtest;
pub mod generate;
pub mod health;
pub mod pipeline;

pub use backtest::{backtest_router, run_strategy};
pub use generate::{generate_router, GenerateRequest, GenerateResponse, MISSING_PROMPT_MESSAGE};
pub use health::{
    health_router, root, ComponentState, ComponentStatus, Components, HealthResponse, ServiceStatus,
};
pub use pipeline::{pipeline_router, PipelineRequest};

use axum::{body::Bytes, routing::get, Router};
use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::error::{bad_request, ApiResult};
use crate::state::AppState;

/// 전체 API 라우터 생성.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(root))
        .nest("/health", health_router())
        .nest("/api", generate_router().merge(pipeline_router()))
        .merge(backtest_router())
}

/// 요청 본문을 JSON으로 파싱합니다. 빈 본문은 기본값입니다.
pub(crate) fn parse_json_body<T>(body: &Bytes) -> ApiResult<T>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| bad_request(format!("invalid JSON body: {e}")))
}
