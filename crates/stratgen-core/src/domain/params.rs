//! 백테스트 실행 파라미터.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// 백테스트 서비스에 전달되는 실행 파라미터.
///
/// 와이어 형식은 `{ strategyFile, symbol, start, end }`이며 날짜는 `YYYY-MM-DD`입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BacktestParameters {
    /// 실행할 전략 아티팩트 식별자
    #[serde(rename = "strategyFile")]
    pub strategy_identifier: String,
    /// 종목 심볼 (예: AAPL)
    #[serde(rename = "symbol")]
    pub instrument_symbol: String,
    /// 시작일
    #[serde(rename = "start")]
    pub start_date: NaiveDate,
    /// 종료일
    #[serde(rename = "end")]
    pub end_date: NaiveDate,
}

impl BacktestParameters {
    /// 새 파라미터를 생성합니다.
    ///
    /// # Errors
    /// 식별자/심볼이 비어 있거나 `start_date >= end_date`이면 `InvalidInput`.
    pub fn new(
        strategy_identifier: impl Into<String>,
        instrument_symbol: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> PipelineResult<Self> {
        let strategy_identifier = strategy_identifier.into();
        let instrument_symbol = instrument_symbol.into().trim().to_string();

        if strategy_identifier.trim().is_empty() {
            return Err(PipelineError::InvalidInput(
                "strategy identifier is empty".to_string(),
            ));
        }
        if instrument_symbol.is_empty() {
            return Err(PipelineError::InvalidInput("symbol is empty".to_string()));
        }
        if start_date >= end_date {
            return Err(PipelineError::InvalidInput(format!(
                "start date {start_date} must be before end date {end_date}"
            )));
        }

        Ok(Self {
            strategy_identifier,
            instrument_symbol,
            start_date,
            end_date,
        })
    }
}

/// 요청에 값이 없을 때 사용하는 기본 실행 파라미터.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BacktestDefaults {
    /// 기본 심볼
    pub symbol: String,
    /// 기본 시작일
    pub start: NaiveDate,
    /// 기본 종료일
    pub end: NaiveDate,
}

impl Default for BacktestDefaults {
    fn default() -> Self {
        Self {
            symbol: "AAPL".to_string(),
            start: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap_or_default(),
        }
    }
}

/// 호출자가 선택적으로 지정하는 실행 파라미터.
///
/// 모든 필드는 선택이며 문자열로 받습니다. 날짜 파싱 실패는
/// 역직렬화 에러가 아니라 `InvalidInput`으로 보고됩니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestOverrides {
    /// 전략 아티팩트 식별자
    #[serde(default)]
    pub strategy_file: Option<String>,
    /// 종목 심볼
    #[serde(default)]
    pub symbol: Option<String>,
    /// 시작일 (YYYY-MM-DD)
    #[serde(default)]
    pub start: Option<String>,
    /// 종료일 (YYYY-MM-DD)
    #[serde(default)]
    pub end: Option<String>,
}

impl BacktestOverrides {
    /// 지정값과 기본값을 합쳐 실행 파라미터를 만듭니다.
    ///
    /// `strategy_file`이 없으면 `fallback_identifier`를 사용합니다.
    pub fn resolve(
        &self,
        fallback_identifier: &str,
        defaults: &BacktestDefaults,
    ) -> PipelineResult<BacktestParameters> {
        let identifier = non_blank(&self.strategy_file).unwrap_or(fallback_identifier);
        let symbol = non_blank(&self.symbol).unwrap_or(&defaults.symbol);
        let start = match non_blank(&self.start) {
            Some(raw) => parse_date("start", raw)?,
            None => defaults.start,
        };
        let end = match non_blank(&self.end) {
            Some(raw) => parse_date("end", raw)?,
            None => defaults.end,
        };

        BacktestParameters::new(identifier, symbol, start, end)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_date(field: &str, raw: &str) -> PipelineResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| {
        PipelineError::InvalidInput(format!(
            "invalid {field} date '{raw}': expected YYYY-MM-DD"
        ))
    })
}
