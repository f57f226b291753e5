//! HTTP 협력 서비스를 모킹한 전체 파이프라인 테스트.

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use serde_json::json;
use stratgen_backtest::HttpBacktestInvoker;
use stratgen_codegen::{OpenAiCodeGenerator, MISSING_API_KEY};
use stratgen_core::{
    AppConfig, BacktestConfig, BacktestOverrides, CodegenConfig, PipelineOutcome, PipelineStage,
};
use stratgen_pipeline::Orchestrator;
use stratgen_storage::{ArtifactStore, FsArtifactStore};

const RSI_REPLY: &str = "Here is the strategy:\n```python\nimport pandas as pd\n\ndef run_strategy(df):\n    delta = df['close'].diff()\n    gain = delta.clip(lower=0).rolling(14).mean()\n    loss = (-delta.clip(upper=0)).rolling(14).mean()\n    rsi = 100 - 100 / (1 + gain / loss)\n    return {\"entries\": rsi < 30, \"exits\": rsi > 70}\n```";

fn completion(content: &str) -> String {
    json!({
        "choices": [{ "index": 0, "message": { "role": "assistant", "content": content } }]
    })
    .to_string()
}

fn orchestrator(
    codegen_url: &str,
    backtest_url: &str,
    store: Arc<FsArtifactStore>,
    api_key: Option<&str>,
) -> Orchestrator {
    let generator = OpenAiCodeGenerator::new(
        CodegenConfig {
            base_url: codegen_url.to_string(),
            timeout_secs: 5,
            ..Default::default()
        },
        api_key.map(|k| SecretString::new(k.into())),
    )
    .unwrap();
    let invoker = HttpBacktestInvoker::new(&BacktestConfig {
        base_url: backtest_url.to_string(),
        timeout_secs: 5,
        ..Default::default()
    })
    .unwrap();

    Orchestrator::new(Arc::new(generator), store, Arc::new(invoker))
        .with_strategy_wait(Duration::from_millis(500))
}

#[tokio::test]
async fn rsi_prompt_produces_validated_result() {
    let mut codegen = mockito::Server::new_async().await;
    let mut backtest = mockito::Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FsArtifactStore::new(dir.path()));

    let _completion = codegen
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(completion(RSI_REPLY))
        .expect(1)
        .create_async()
        .await;
    let run = backtest
        .mock("POST", "/run-strategy")
        .match_body(mockito::Matcher::PartialJson(json!({
            "strategyFile": "run_strategy.py",
            "symbol": "AAPL"
        })))
        .with_status(200)
        .with_body(
            json!({
                "total_return": 12.5,
                "annualized_return": 8.1,
                "max_drawdown": -4.2,
                "sharpe_ratio": 1.1,
                "win_rate": 55.0,
                "portfolio_value_series": [100000.0, 101200.0, 112500.0],
                "dates": ["2024-02-01", "2024-02-02", "2024-02-05"]
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let outcome = orchestrator(&codegen.url(), &backtest.url(), store.clone(), Some("sk-test"))
        .run(
            "Buy when RSI < 30, sell when RSI > 70",
            &BacktestOverrides::default(),
        )
        .await;

    let result = outcome.result().expect("pipeline should succeed");
    assert_eq!(result.total_return, 12.5);
    assert_eq!(result.annualized_return, 8.1);
    assert_eq!(result.max_drawdown, -4.2);
    assert_eq!(result.sharpe_ratio, 1.1);
    assert_eq!(result.win_rate, 55.0);

    let code = store.read("run_strategy.py").await.unwrap();
    assert!(code.starts_with("import pandas as pd"));
    assert!(!code.contains("```"));
    run.assert_async().await;
}

#[tokio::test]
async fn missing_credential_fails_at_generation_without_side_effects() {
    let mut codegen = mockito::Server::new_async().await;
    let mut backtest = mockito::Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FsArtifactStore::new(dir.path().join("strategies")));

    let completion = codegen
        .mock("POST", "/chat/completions")
        .expect(0)
        .create_async()
        .await;
    let run = backtest
        .mock("POST", "/run-strategy")
        .expect(0)
        .create_async()
        .await;

    let outcome = orchestrator(&codegen.url(), &backtest.url(), store.clone(), None)
        .run("buy low", &BacktestOverrides::default())
        .await;

    assert_eq!(
        outcome,
        PipelineOutcome::Failure {
            stage: PipelineStage::Generation,
            reason: MISSING_API_KEY.to_string(),
        }
    );
    assert!(!store.root().exists());
    completion.assert_async().await;
    run.assert_async().await;
}

#[tokio::test]
async fn service_error_payload_fails_at_invocation() {
    let mut codegen = mockito::Server::new_async().await;
    let mut backtest = mockito::Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FsArtifactStore::new(dir.path()));

    let _completion = codegen
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(completion("def run_strategy(df):\n    return {}"))
        .create_async()
        .await;
    let _run = backtest
        .mock("POST", "/run-strategy")
        .with_status(200)
        .with_body(r#"{"error": "symbol not found"}"#)
        .create_async()
        .await;

    let overrides = BacktestOverrides {
        symbol: Some("ZZZZ".to_string()),
        ..Default::default()
    };
    let outcome = orchestrator(&codegen.url(), &backtest.url(), store, Some("sk-test"))
        .run("buy low", &overrides)
        .await;

    assert_eq!(outcome.failed_stage(), Some(PipelineStage::Invocation));
    assert_eq!(outcome.reason(), Some("symbol not found"));
}

#[test]
fn from_config_builds_default_collaborators() {
    let orchestrator = Orchestrator::from_config(&AppConfig::default(), None).unwrap();
    assert_eq!(orchestrator.defaults().symbol, "AAPL");
}
