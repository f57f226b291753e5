//! 저장된 전략 백테스트 명령어.
//!
//! ```bash
//! # 기본 아티팩트, 기본 종목/기간
//! stratgen backtest
//!
//! # 종목과 기간 지정
//! stratgen backtest -s MSFT -f 2023-01-03 -t 2023-12-29
//! ```

use anyhow::{anyhow, Result};
use stratgen_core::{BacktestOverrides, BacktestResult};
use stratgen_pipeline::Orchestrator;
use tracing::info;

/// `backtest` 인자.
#[derive(Debug, Clone, Default)]
pub struct BacktestArgs {
    /// 전략 파일 (없으면 설정된 아티팩트 이름)
    pub strategy_file: Option<String>,
    pub symbol: Option<String>,
    /// 시작일 (YYYY-MM-DD)
    pub start: Option<String>,
    /// 종료일 (YYYY-MM-DD)
    pub end: Option<String>,
}

impl BacktestArgs {
    fn overrides(&self) -> BacktestOverrides {
        BacktestOverrides {
            strategy_file: self.strategy_file.clone(),
            symbol: self.symbol.clone(),
            start: self.start.clone(),
            end: self.end.clone(),
        }
    }
}

/// 백테스트를 실행하고 검증된 결과를 반환합니다.
pub async fn run_backtest(
    orchestrator: &Orchestrator,
    artifact_name: &str,
    args: &BacktestArgs,
) -> Result<BacktestResult> {
    let params = args
        .overrides()
        .resolve(artifact_name, orchestrator.defaults())
        .map_err(|e| anyhow!(e.reason()))?;

    let result = orchestrator.invoke_and_validate(&params).await?;

    info!(
        symbol = %params.instrument_symbol,
        total_return = result.total_return,
        "Backtest completed"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratgen_core::AppConfig;

    #[tokio::test]
    async fn test_invalid_date_is_rejected_before_invocation() {
        let orchestrator = Orchestrator::from_config(&AppConfig::default(), None).unwrap();
        let args = BacktestArgs {
            start: Some("yesterday".to_string()),
            ..Default::default()
        };

        let err = run_backtest(&orchestrator, "run_strategy.py", &args)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("invalid start date"));
    }
}
