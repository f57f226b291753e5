//! 전략 코드 생성 명령어.
//!
//! ```bash
//! stratgen generate -p "Buy when RSI < 30, sell when RSI > 70"
//! ```

use anyhow::{anyhow, Result};
use serde::Serialize;
use stratgen_core::StrategyRequest;
use stratgen_pipeline::Orchestrator;
use tracing::info;

/// `generate` 출력.
#[derive(Debug, Serialize)]
pub struct GenerateOutput {
    /// 저장된 아티팩트 파일명
    pub filename: String,
}

/// 코드를 생성하고 저장합니다.
pub async fn run_generate(orchestrator: &Orchestrator, prompt: &str) -> Result<GenerateOutput> {
    let request = StrategyRequest::new(prompt).map_err(|e| anyhow!(e.reason()))?;

    let filename = orchestrator.generate_and_persist(&request).await?;

    info!(%filename, "Strategy generated");
    Ok(GenerateOutput { filename })
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratgen_core::AppConfig;

    #[tokio::test]
    async fn test_blank_prompt_is_rejected() {
        let orchestrator = Orchestrator::from_config(&AppConfig::default(), None).unwrap();
        let err = run_generate(&orchestrator, "  ").await.unwrap_err();
        assert_eq!(err.to_string(), "missing prompt");
    }

    #[tokio::test]
    async fn test_missing_credential_reports_stage() {
        let orchestrator = Orchestrator::from_config(&AppConfig::default(), None).unwrap();
        let err = run_generate(&orchestrator, "buy low").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "generation failed: OPENAI_API_KEY is not set in the environment"
        );
    }
}
