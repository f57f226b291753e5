//! 전체 파이프라인 일괄 실행 명령어.
//!
//! 설명마다 파이프라인을 순서대로 한 번씩 실행하고 결과를 모읍니다.
//! 한 설명이 실패해도 나머지는 계속 실행합니다.
//!
//! ```bash
//! stratgen run \
//!     -p "Buy when RSI < 30, sell when RSI > 70" \
//!     -p "Buy when the 50-day SMA crosses above the 200-day SMA"
//! ```

use serde::Serialize;
use stratgen_core::{BacktestOverrides, PipelineOutcome};
use stratgen_pipeline::Orchestrator;
use tracing::info;

/// 설명 하나의 실행 결과.
#[derive(Debug, Serialize)]
pub struct BatchEntry {
    pub prompt: String,
    pub outcome: PipelineOutcome,
}

/// 모든 설명을 순서대로 실행합니다.
pub async fn run_batch(
    orchestrator: &Orchestrator,
    prompts: &[String],
    overrides: &BacktestOverrides,
) -> Vec<BatchEntry> {
    let mut entries = Vec::with_capacity(prompts.len());

    for (index, prompt) in prompts.iter().enumerate() {
        info!(index, total = prompts.len(), "Running pipeline");
        let outcome = orchestrator.run(prompt, overrides).await;
        entries.push(BatchEntry {
            prompt: prompt.clone(),
            outcome,
        });
    }

    let succeeded = entries.iter().filter(|e| e.outcome.is_success()).count();
    info!(succeeded, failed = entries.len() - succeeded, "Batch finished");
    entries
}
