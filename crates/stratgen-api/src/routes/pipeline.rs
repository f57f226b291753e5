//! 전체 파이프라인 endpoint.
//!
//! 설명 하나로 코드 생성부터 결과 검증까지 실행하고 `PipelineOutcome`을
//! 그대로 반환합니다.

use axum::{body::Bytes, extract::State, http::StatusCode, routing::post, Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use stratgen_core::{BacktestOverrides, PipelineError, PipelineOutcome, PipelineStage};

use crate::state::AppState;

/// 파이프라인 요청.
///
/// ```json
/// { "prompt": "Buy when RSI < 30", "symbol": "MSFT", "start": "2023-01-03" }
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct PipelineRequest {
    /// 자연어 전략 설명
    #[serde(default)]
    pub prompt: Option<String>,

    /// 실행 파라미터 (선택)
    #[serde(flatten)]
    pub overrides: BacktestOverrides,
}

/// POST /api/pipeline
///
/// 성공은 200, 요청 수신 단계 실패는 400, 그 외 단계 실패는 500.
pub async fn run_pipeline(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> (StatusCode, Json<PipelineOutcome>) {
    let request: PipelineRequest = match super::parse_json_body(&body) {
        Ok(request) => request,
        Err((_, Json(error))) => {
            let outcome = PipelineOutcome::failure(
                PipelineStage::Transport,
                &PipelineError::InvalidInput(error.error),
            );
            return (StatusCode::BAD_REQUEST, Json(outcome));
        }
    };

    let prompt = request.prompt.unwrap_or_default();
    let outcome = state.orchestrator.run(&prompt, &request.overrides).await;

    let status = match outcome.failed_stage() {
        None => StatusCode::OK,
        Some(PipelineStage::Transport) => StatusCode::BAD_REQUEST,
        Some(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(outcome))
}

/// 파이프라인 라우터.
pub fn pipeline_router() -> Router<Arc<AppState>> {
    Router::new().route("/pipeline", post(run_pipeline))
}
