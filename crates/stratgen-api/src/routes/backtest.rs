//! 백테스트 실행 endpoint.
//!
//! 이미 저장된 전략 아티팩트로 백테스트를 실행하고 검증된 결과를 반환합니다.

use axum::{body::Bytes, extract::State, routing::post, Json, Router};
use std::sync::Arc;
use stratgen_core::{BacktestOverrides, BacktestResult};
use tracing::info;

use super::parse_json_body;
use crate::error::{bad_request, stage_failure, ApiResult};
use crate::state::AppState;

/// POST /run-strategy
///
/// 본문은 선택이며 `{ strategyFile, symbol, start, end }` 중 일부만 보내도 됩니다.
/// 빠진 값은 설정된 기본값을 사용합니다.
pub async fn run_strategy(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<Json<BacktestResult>> {
    let overrides: BacktestOverrides = parse_json_body(&body)?;
    let params = overrides
        .resolve(state.artifact_name(), state.orchestrator.defaults())
        .map_err(|e| bad_request(e.reason()))?;

    let result = state
        .orchestrator
        .invoke_and_validate(&params)
        .await
        .map_err(stage_failure)?;

    info!(
        strategy = %params.strategy_identifier,
        symbol = %params.instrument_symbol,
        total_return = result.total_return,
        "Backtest returned validated result"
    );
    Ok(Json(result))
}

/// 백테스트 실행 라우터.
pub fn backtest_router() -> Router<Arc<AppState>> {
    Router::new().route("/run-strategy", post(run_strategy))
}
