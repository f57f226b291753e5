//! 백테스트 실행 서비스 클라이언트.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use stratgen_core::{BacktestConfig, BacktestParameters, PipelineError, PipelineResult};
use tracing::{debug, error, info, warn};

use crate::reply::{error_message, InvocationReply};

/// 백테스트 실행 trait.
///
/// 요청당 한 번만 호출하며 내부 재시도는 없습니다. 반환값은 검증 전의
/// 원시 결과입니다.
#[async_trait]
pub trait BacktestInvoker: Send + Sync {
    /// 백테스트를 실행합니다.
    ///
    /// # Errors
    /// - 서비스가 보고한 실패(2xx의 `error` 필드 또는 non-2xx): `Invocation`
    /// - 전송 실패, 디코딩 불가 본문, 타임아웃: `Upstream`
    async fn invoke(&self, params: &BacktestParameters) -> PipelineResult<Value>;
}

/// HTTP 백테스트 실행 클라이언트 (`POST {base_url}/run-strategy`).
pub struct HttpBacktestInvoker {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBacktestInvoker {
    /// 새 클라이언트를 생성합니다.
    pub fn new(config: &BacktestConfig) -> PipelineResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PipelineError::Configuration(format!("HTTP client build failed: {e}")))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn run_url(&self) -> String {
        format!("{}/run-strategy", self.base_url)
    }
}

fn transport_error(err: reqwest::Error) -> PipelineError {
    if err.is_timeout() {
        warn!("Backtest request timed out");
        PipelineError::timeout()
    } else {
        error!(error = %err, "Backtest transport error");
        PipelineError::upstream(err.to_string())
    }
}

#[async_trait]
impl BacktestInvoker for HttpBacktestInvoker {
    async fn invoke(&self, params: &BacktestParameters) -> PipelineResult<Value> {
        let url = self.run_url();
        debug!(
            %url,
            strategy = %params.strategy_identifier,
            symbol = %params.instrument_symbol,
            "Sending backtest request"
        );

        let response = self
            .client
            .post(&url)
            .json(params)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|value| error_message(&value))
                .unwrap_or_else(|| format!("HTTP {}: {}", status.as_u16(), body.trim()));

            error!(status = status.as_u16(), %message, "Backtest request failed");
            return Err(PipelineError::Invocation(message));
        }

        let value: Value = serde_json::from_str(&body).map_err(|e| {
            PipelineError::upstream(format!("malformed backtest response: {e}"))
        })?;

        match InvocationReply::from_value(value).into_result() {
            Ok(raw) => {
                info!(symbol = %params.instrument_symbol, "Backtest completed");
                Ok(raw)
            }
            Err(message) => {
                warn!(%message, "Backtest service reported an error");
                Err(PipelineError::Invocation(message))
            }
        }
    }
}
