//! 애플리케이션 상태.
//!
//! 모든 API 핸들러에서 공유되는 상태를 관리합니다.

use std::sync::Arc;

use secrecy::SecretString;
use stratgen_core::{AppConfig, PipelineResult};
use stratgen_pipeline::Orchestrator;

/// 애플리케이션 공유 상태.
///
/// 시작 시 한 번 만들어지고 `Arc`로 핸들러에 공유됩니다.
pub struct AppState {
    /// 파이프라인 오케스트레이터
    pub orchestrator: Arc<Orchestrator>,

    /// 로드된 설정
    pub config: Arc<AppConfig>,

    /// 코드 생성 자격증명 설정 여부
    pub has_credential: bool,

    /// 서버 시작 시간
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 오케스트레이터와 설정으로 상태를 생성합니다.
    pub fn new(orchestrator: Orchestrator, config: AppConfig, has_credential: bool) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            config: Arc::new(config),
            has_credential,
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// 설정으로부터 HTTP/파일시스템 협력 객체를 구성해 상태를 생성합니다.
    pub fn from_config(config: AppConfig, api_key: Option<SecretString>) -> PipelineResult<Self> {
        let has_credential = api_key.is_some();
        let orchestrator = Orchestrator::from_config(&config, api_key)?;
        Ok(Self::new(orchestrator, config, has_credential))
    }

    /// 서버 업타임(초).
    pub fn uptime_secs(&self) -> i64 {
        chrono::Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds()
    }

    /// 요청에 전략 파일이 없을 때 사용할 아티팩트 이름.
    pub fn artifact_name(&self) -> &str {
        &self.config.storage.artifact_name
    }
}

/// 테스트용 상태.
///
/// 자격증명이 없고, 외부 서비스는 닫힌 포트를 가리키며, 저장소는
/// 임시 디렉터리를 사용합니다.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state() -> AppState {
    let mut config = AppConfig::default();
    config.codegen.base_url = "http://127.0.0.1:9".to_string();
    config.codegen.timeout_secs = 2;
    config.backtest.base_url = "http://127.0.0.1:9".to_string();
    config.backtest.timeout_secs = 2;
    config.backtest.strategy_wait_ms = 0;
    config.storage.dir = std::env::temp_dir().join(format!(
        "stratgen-test-{}",
        uuid::Uuid::new_v4().simple()
    ));

    AppState::from_config(config, None).expect("test state")
}
