//! 전략 코드 생성 endpoint.
//!
//! 코드를 생성하고 저장한 뒤 아티팩트 파일명을 반환합니다. 백테스트는 실행하지 않습니다.

use axum::{body::Bytes, extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use stratgen_core::StrategyRequest;
use tracing::info;

use super::parse_json_body;
use crate::error::{bad_request, server_failure, ApiResult};
use crate::state::AppState;

/// 설명이 없을 때의 응답 메시지.
pub const MISSING_PROMPT_MESSAGE: &str = "Missing prompt";

/// 코드 생성 요청.
#[derive(Debug, Default, Deserialize)]
pub struct GenerateRequest {
    /// 자연어 전략 설명
    #[serde(default)]
    pub prompt: Option<String>,
}

/// 코드 생성 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// 저장된 아티팩트 파일명
    pub filename: String,
}

/// POST /api/generate
pub async fn generate_strategy(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<Json<GenerateResponse>> {
    let request: GenerateRequest = parse_json_body(&body)?;
    let request = request
        .prompt
        .as_deref()
        .and_then(|prompt| StrategyRequest::new(prompt).ok())
        .ok_or_else(|| bad_request(MISSING_PROMPT_MESSAGE))?;

    let filename = state
        .orchestrator
        .generate_and_persist(&request)
        .await
        .map_err(server_failure)?;

    info!(%filename, "Strategy generated");
    Ok(Json(GenerateResponse { filename }))
}

/// 코드 생성 라우터.
pub fn generate_router() -> Router<Arc<AppState>> {
    Router::new().route("/generate", post(generate_strategy))
}
