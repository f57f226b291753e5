//! 파이프라인 오케스트레이터.
//!
//! 네 단계를 순서대로 실행합니다. 단계 간 재시도나 캐시는 없고,
//! 첫 번째 실패에서 이후 단계는 실행되지 않습니다.

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use stratgen_backtest::{validate, BacktestInvoker, HttpBacktestInvoker};
use stratgen_codegen::{CodeGenerator, OpenAiCodeGenerator};
use stratgen_core::{
    pipeline_span, AppConfig, BacktestDefaults, BacktestOverrides, BacktestParameters,
    BacktestResult, PipelineError, PipelineOutcome, PipelineResult, PipelineStage,
    StrategyRequest, DEFAULT_ARTIFACT_NAME,
};
use stratgen_storage::{validate_identifier, ArtifactStore, FsArtifactStore};
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn, Instrument};

use crate::state::PipelineState;

/// 파이프라인 결과 카운터 이름.
pub const PIPELINE_OUTCOMES_METRIC: &str = "pipeline_outcomes_total";

/// 대기 시간 안에 아티팩트가 보이지 않을 때의 사유.
pub const ARTIFACT_NOT_READY: &str = "strategy file was not created in time";

const ARTIFACT_POLL_INTERVAL: Duration = Duration::from_millis(100);
const DEFAULT_STRATEGY_WAIT: Duration = Duration::from_millis(5000);

/// 실패한 단계와 원인 에러.
#[derive(Debug)]
pub struct StageFailure {
    pub stage: PipelineStage,
    pub error: PipelineError,
}

impl StageFailure {
    pub fn new(stage: PipelineStage, error: PipelineError) -> Self {
        Self { stage, error }
    }

    /// 호출자에게 보여줄 사유.
    pub fn reason(&self) -> String {
        self.error.reason()
    }

    /// 실패 결과로 변환합니다.
    pub fn into_outcome(self) -> PipelineOutcome {
        PipelineOutcome::failure(self.stage, &self.error)
    }
}

impl std::fmt::Display for StageFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} failed: {}", self.stage, self.error.reason())
    }
}

impl std::error::Error for StageFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// 요청 하나의 상태 전이를 추적합니다.
struct Progress {
    state: PipelineState,
}

impl Progress {
    fn at(state: PipelineState) -> Self {
        debug!(state = %state, "Pipeline stage started");
        Self { state }
    }

    fn advance(&mut self) {
        let next = self.state.next();
        debug!(from = %self.state, to = %next, "Pipeline transition");
        self.state = next;
    }

    fn fail(&mut self, error: PipelineError) -> StageFailure {
        let next = self.state.fail();
        warn!(from = %self.state, to = %next, error = %error, "Pipeline stage failed");
        self.state = next;
        let stage = match next {
            PipelineState::Failed(stage) => stage,
            _ => PipelineStage::Transport,
        };
        StageFailure::new(stage, error)
    }
}

/// 코드 생성 → 저장 → 백테스트 호출 → 결과 검증 오케스트레이터.
pub struct Orchestrator {
    generator: Arc<dyn CodeGenerator>,
    store: Arc<dyn ArtifactStore>,
    invoker: Arc<dyn BacktestInvoker>,
    defaults: BacktestDefaults,
    strategy_wait: Duration,
}

impl Orchestrator {
    /// 협력 객체로부터 오케스트레이터를 생성합니다.
    pub fn new(
        generator: Arc<dyn CodeGenerator>,
        store: Arc<dyn ArtifactStore>,
        invoker: Arc<dyn BacktestInvoker>,
    ) -> Self {
        Self {
            generator,
            store,
            invoker,
            defaults: BacktestDefaults::default(),
            strategy_wait: DEFAULT_STRATEGY_WAIT,
        }
    }

    /// 설정으로부터 HTTP/파일시스템 협력 객체를 구성합니다.
    ///
    /// `storage.artifact_name`이 일반 파일명이 아니면 모델을 호출하기 전에
    /// `Configuration` 에러로 시작을 거부합니다.
    pub fn from_config(config: &AppConfig, api_key: Option<SecretString>) -> PipelineResult<Self> {
        let artifact_name = &config.storage.artifact_name;
        validate_identifier(artifact_name).map_err(|_| {
            PipelineError::Configuration(format!(
                "storage.artifact_name must be a plain file name, got '{artifact_name}'"
            ))
        })?;

        let generator = OpenAiCodeGenerator::new(config.codegen.clone(), api_key)?
            .with_artifact_naming(config.storage.naming, config.storage.artifact_name.clone());
        let store = FsArtifactStore::new(config.storage.dir.clone());
        let invoker = HttpBacktestInvoker::new(&config.backtest)?;

        Ok(Self::new(Arc::new(generator), Arc::new(store), Arc::new(invoker))
            .with_defaults(config.backtest.defaults())
            .with_strategy_wait(Duration::from_millis(config.backtest.strategy_wait_ms)))
    }

    /// 기본 실행 파라미터를 설정합니다.
    #[must_use]
    pub fn with_defaults(mut self, defaults: BacktestDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// 아티팩트 준비 대기 시간을 설정합니다. 0이면 한 번만 확인합니다.
    #[must_use]
    pub fn with_strategy_wait(mut self, wait: Duration) -> Self {
        self.strategy_wait = wait;
        self
    }

    pub fn defaults(&self) -> &BacktestDefaults {
        &self.defaults
    }

    /// 전체 파이프라인을 실행합니다.
    ///
    /// 요청당 정확히 하나의 결과를 반환합니다. 빈 설명은 코드 생성 전에
    /// `transport` 단계 실패로 끝납니다.
    pub async fn run(&self, prompt: &str, overrides: &BacktestOverrides) -> PipelineOutcome {
        let request_id = uuid::Uuid::new_v4();
        let span = pipeline_span!("pipeline", request_id);

        let outcome = match self.run_stages(prompt, overrides).instrument(span).await {
            Ok(result) => PipelineOutcome::success(result),
            Err(failure) => failure.into_outcome(),
        };

        record_outcome(&outcome);
        match &outcome {
            PipelineOutcome::Success { result } => info!(
                %request_id,
                total_return = result.total_return,
                final_value = ?result.final_value(),
                points = result.dates.len(),
                "Pipeline succeeded"
            ),
            PipelineOutcome::Failure { stage, reason } => {
                warn!(%request_id, %stage, %reason, "Pipeline failed")
            }
        }
        outcome
    }

    async fn run_stages(
        &self,
        prompt: &str,
        overrides: &BacktestOverrides,
    ) -> Result<BacktestResult, StageFailure> {
        let mut progress = Progress::at(PipelineState::Idle);

        let request = StrategyRequest::new(prompt).map_err(|e| progress.fail(e))?;
        // 생성 전에 실행 파라미터를 확인해 잘못된 날짜로 모델을 호출하지 않음
        let mut params = overrides
            .resolve(DEFAULT_ARTIFACT_NAME, &self.defaults)
            .map_err(|e| progress.fail(e))?;

        params.strategy_identifier = self.generate_and_persist(&request).await?;
        self.invoke_and_validate(&params).await
    }

    /// 코드 생성과 저장만 실행하고 아티팩트 식별자를 반환합니다.
    pub async fn generate_and_persist(
        &self,
        request: &StrategyRequest,
    ) -> Result<String, StageFailure> {
        let mut progress = Progress::at(PipelineState::Generating);

        let artifact = self
            .generator
            .generate(request.text())
            .await
            .map_err(|e| progress.fail(e))?;
        progress.advance();

        let identifier = self
            .store
            .persist(&artifact)
            .await
            .map_err(|e| progress.fail(e))?;
        progress.advance();

        info!(%identifier, generator = self.generator.name(), "Strategy artifact ready");
        Ok(identifier)
    }

    /// 백테스트 호출과 결과 검증만 실행합니다.
    pub async fn invoke_and_validate(
        &self,
        params: &BacktestParameters,
    ) -> Result<BacktestResult, StageFailure> {
        let mut progress = Progress::at(PipelineState::Invoking);

        self.wait_for_artifact(&params.strategy_identifier)
            .await
            .map_err(|e| progress.fail(e))?;

        let raw = self
            .invoker
            .invoke(params)
            .await
            .map_err(|e| progress.fail(e))?;
        progress.advance();

        let result = validate(&raw).map_err(|e| progress.fail(e))?;
        progress.advance();

        Ok(result)
    }

    /// 아티팩트가 저장소에 보일 때까지 제한 시간 동안 기다립니다.
    async fn wait_for_artifact(&self, identifier: &str) -> PipelineResult<()> {
        let deadline = Instant::now() + self.strategy_wait;
        loop {
            if self.store.exists(identifier).await? {
                return Ok(());
            }
            if Instant::now() >= deadline {
                warn!(
                    %identifier,
                    wait_ms = self.strategy_wait.as_millis() as u64,
                    "Artifact not found before invocation"
                );
                return Err(PipelineError::Invocation(ARTIFACT_NOT_READY.to_string()));
            }
            sleep(ARTIFACT_POLL_INTERVAL).await;
        }
    }
}

fn record_outcome(outcome: &PipelineOutcome) {
    let (stage, result) = match outcome.failed_stage() {
        Some(stage) => (stage.as_str(), "failure"),
        None => ("complete", "success"),
    };
    metrics::counter!(PIPELINE_OUTCOMES_METRIC, "stage" => stage, "result" => result).increment(1);
}
