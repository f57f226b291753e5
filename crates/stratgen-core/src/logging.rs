//! 로깅 초기화.
//!
//! `tracing-subscriber` 레지스트리에 `EnvFilter`와 형식별 fmt 레이어를 올립니다.
//! API 서버는 stdout으로, CLI는 stderr로 출력합니다. CLI의 stdout은 JSON 결과 전용입니다.
//!
//! 레벨은 `RUST_LOG`, 형식은 `LOG_FORMAT`(pretty | json | compact)이 설정 파일보다 우선합니다.

use thiserror::Error;
use tracing_subscriber::{
    filter::ParseError, fmt, fmt::writer::BoxMakeWriter, layer::SubscriberExt,
    util::SubscriberInitExt, util::TryInitError, EnvFilter, Layer,
};

use crate::config::LoggingConfig;

/// 형식 오버라이드 환경 변수.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// 로그 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// 여러 줄, 색상 (개발용)
    #[default]
    Pretty,
    /// 한 줄 JSON, 현재 span 포함 (로그 수집용)
    Json,
    /// 한 줄 텍스트
    Compact,
}

impl LogFormat {
    /// 이름으로 형식을 찾습니다. 대소문자는 구분하지 않습니다.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "pretty" => Some(Self::Pretty),
            "json" => Some(Self::Json),
            "compact" => Some(Self::Compact),
            _ => None,
        }
    }
}

/// 로그 출력 대상.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogTarget {
    #[default]
    Stdout,
    Stderr,
}

impl LogTarget {
    fn writer(self) -> BoxMakeWriter {
        match self {
            Self::Stdout => BoxMakeWriter::new(std::io::stdout),
            Self::Stderr => BoxMakeWriter::new(std::io::stderr),
        }
    }
}

/// 로깅 초기화 에러.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("잘못된 로그 필터: {0}")]
    Filter(#[from] ParseError),

    #[error("로깅 초기화 실패: {0}")]
    Init(#[from] TryInitError),
}

/// 로깅 초기화 설정.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// `EnvFilter` 지시문 (예: "info", "stratgen_pipeline=debug,info")
    pub filter: String,
    pub format: LogFormat,
    pub target: LogTarget,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::new("info")
    }
}

impl LogConfig {
    pub fn new(filter: impl Into<String>) -> Self {
        Self {
            filter: filter.into(),
            format: LogFormat::default(),
            target: LogTarget::default(),
        }
    }

    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// 로그를 stderr로 보냅니다.
    #[must_use]
    pub fn with_stderr(mut self) -> Self {
        self.target = LogTarget::Stderr;
        self
    }

    /// `[logging]` 설정 섹션으로부터 생성합니다.
    ///
    /// `LOG_FORMAT`이 있으면 설정 파일의 형식보다 우선하고,
    /// 알 수 없는 형식 이름은 pretty로 처리합니다.
    pub fn from_settings(settings: &LoggingConfig) -> Self {
        let name = std::env::var(LOG_FORMAT_ENV).unwrap_or_else(|_| settings.format.clone());
        let format = LogFormat::from_name(&name).unwrap_or_default();
        Self::new(settings.level.clone()).with_format(format)
    }
}

/// 전역 subscriber를 설치합니다.
///
/// # Errors
/// 필터 지시문이 잘못되었거나 subscriber가 이미 설치되어 있으면 에러.
///
/// ```no_run
/// use stratgen_core::logging::{init_logging, LogConfig, LogFormat};
///
/// init_logging(LogConfig::new("debug").with_format(LogFormat::Json)).unwrap();
/// ```
pub fn init_logging(config: LogConfig) -> Result<(), LoggingError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.filter)?,
    };

    let writer = config.target.writer();
    let fmt_layer = match config.format {
        LogFormat::Pretty => fmt::layer().pretty().with_writer(writer).boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_writer(writer)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_writer(writer).boxed(),
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter)
        .try_init()?;

    tracing::debug!(format = ?config.format, target = ?config.target, "Logging initialized");
    Ok(())
}

/// 요청 ID(선택적으로 심볼)를 필드로 가진 info span을 만듭니다.
#[macro_export]
macro_rules! pipeline_span {
    ($name:expr, $request_id:expr) => {
        tracing::info_span!($name, request_id = %$request_id)
    };
    ($name:expr, $request_id:expr, $symbol:expr) => {
        tracing::info_span!($name, request_id = %$request_id, symbol = %$symbol)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_name() {
        assert_eq!(LogFormat::from_name("json"), Some(LogFormat::Json));
        assert_eq!(LogFormat::from_name(" Compact "), Some(LogFormat::Compact));
        assert_eq!(LogFormat::from_name("PRETTY"), Some(LogFormat::Pretty));
        assert_eq!(LogFormat::from_name("xml"), None);
    }

    #[test]
    fn test_builder_targets_stderr() {
        let config = LogConfig::new("stratgen_pipeline=debug")
            .with_format(LogFormat::Compact)
            .with_stderr();

        assert_eq!(config.filter, "stratgen_pipeline=debug");
        assert_eq!(config.format, LogFormat::Compact);
        assert_eq!(config.target, LogTarget::Stderr);
        assert_eq!(LogConfig::default().target, LogTarget::Stdout);
    }

    #[test]
    fn test_invalid_filter_is_error() {
        let err = EnvFilter::try_new("stratgen=loud").map_err(LoggingError::from);
        assert!(matches!(err, Err(LoggingError::Filter(_))));
    }
}
