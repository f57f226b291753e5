//! 설정 관리.
//!
//! 기본값 → 설정 파일(선택) → 환경 변수 순서로 설정을 병합합니다.
//! 환경 변수는 `STRATGEN__<SECTION>__<KEY>` 형식입니다
//! (예: `STRATGEN__SERVER__PORT=5002`).
//!
//! 코드 생성 자격증명은 설정 파일에 두지 않고 `OPENAI_API_KEY`에서만 읽습니다.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::domain::{ArtifactNaming, BacktestDefaults, DEFAULT_ARTIFACT_NAME};

/// 코드 생성 자격증명 환경 변수 이름.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// 환경 변수 접두어.
pub const ENV_PREFIX: &str = "STRATGEN";

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// 서버 설정
    pub server: ServerConfig,
    /// 코드 생성 서비스 설정
    pub codegen: CodegenConfig,
    /// 백테스트 실행 서비스 설정
    pub backtest: BacktestConfig,
    /// 아티팩트 저장소 설정
    pub storage: StorageConfig,
    /// 로깅 설정
    pub logging: LoggingConfig,
    /// CORS 설정
    pub cors: CorsConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
    /// 요청 전체 타임아웃 (초)
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5002,
            request_timeout_secs: 600,
        }
    }
}

impl ServerConfig {
    /// 소켓 주소 반환.
    ///
    /// # Errors
    /// `host:port` 형식이 유효하지 않으면 `AddrParseError`를 반환합니다.
    pub fn socket_addr(&self) -> Result<std::net::SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

/// 코드 생성 서비스 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CodegenConfig {
    /// OpenAI 호환 API 기본 URL
    pub base_url: String,
    /// 모델 이름
    pub model: String,
    /// 샘플링 온도
    pub temperature: f64,
    /// 요청 타임아웃 (초)
    pub timeout_secs: u64,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o".to_string(),
            temperature: 0.0,
            timeout_secs: 120,
        }
    }
}

/// 백테스트 실행 서비스 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BacktestConfig {
    /// 실행 서비스 기본 URL
    pub base_url: String,
    /// 요청 타임아웃 (초)
    pub timeout_secs: u64,
    /// 기본 심볼
    pub default_symbol: String,
    /// 기본 시작일
    pub default_start: NaiveDate,
    /// 기본 종료일
    pub default_end: NaiveDate,
    /// 호출 전 아티팩트 존재 확인 대기 시간 (밀리초)
    pub strategy_wait_ms: u64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        let defaults = BacktestDefaults::default();
        Self {
            base_url: "http://localhost:5001".to_string(),
            timeout_secs: 300,
            default_symbol: defaults.symbol,
            default_start: defaults.start,
            default_end: defaults.end,
            strategy_wait_ms: 5000,
        }
    }
}

impl BacktestConfig {
    /// 기본 실행 파라미터.
    pub fn defaults(&self) -> BacktestDefaults {
        BacktestDefaults {
            symbol: self.default_symbol.clone(),
            start: self.default_start,
            end: self.default_end,
        }
    }
}

/// 아티팩트 저장소 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// 아티팩트 디렉토리
    pub dir: PathBuf,
    /// 기본 파일명
    pub artifact_name: String,
    /// 명명 방식
    pub naming: ArtifactNaming,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("generated_strategies"),
            artifact_name: DEFAULT_ARTIFACT_NAME.to_string(),
            naming: ArtifactNaming::Fixed,
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// CORS 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// 쉼표로 구분된 허용 origin 목록 ("*"이면 모두 허용)
    pub origins: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            origins: "http://localhost:3000".to_string(),
        }
    }
}

impl CorsConfig {
    /// 허용 origin 목록.
    pub fn origin_list(&self) -> Vec<String> {
        self.origins
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// 모든 origin 허용 여부.
    pub fn allows_any(&self) -> bool {
        self.origin_list().iter().any(|o| o == "*")
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없어도 에러가 아니며 기본값이 사용됩니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            // 파일에서 로드 (선택)
            .add_source(config::File::from(path.as_ref()).required(false))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        Self::load("config/default.toml")
    }
}

/// 환경 변수에서 코드 생성 자격증명을 읽습니다.
///
/// 값이 없거나 공백이면 None.
pub fn load_api_key() -> Option<SecretString> {
    std::env::var(API_KEY_ENV)
        .ok()
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
        .map(|key| SecretString::new(key.into()))
}
