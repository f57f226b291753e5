//! 백테스트 결과 검증기.
//!
//! 원시 결과를 정해진 순서로 검사하고, 통과한 경우에만 `BacktestResult`를
//! 만듭니다. 누락된 값에 기본값을 채우지 않으며 반올림도 하지 않습니다.
//!
//! 사유 메시지는 누락이면 `incomplete result`, 형식 오류면
//! `malformed result`로 시작합니다.

use serde_json::{Map, Value};
use stratgen_core::{
    BacktestResult, PipelineError, PipelineResult, DATES_FIELD, PORTFOLIO_VALUE_FIELD,
    SCALAR_METRIC_FIELDS,
};

fn incomplete(field: &str) -> PipelineError {
    PipelineError::Schema(format!("incomplete result: missing '{field}'"))
}

fn malformed(detail: impl std::fmt::Display) -> PipelineError {
    PipelineError::Schema(format!("malformed result: {detail}"))
}

/// 원시 결과를 검증합니다.
///
/// 검사 순서:
/// 1. JSON 객체
/// 2. `dates`: 문자열 배열
/// 3. `portfolio_value_series`: 유한한 숫자 배열
/// 4. 스칼라 지표 5개: 존재, non-null, 유한한 숫자
/// 5. 두 시계열의 길이 일치
pub fn validate(raw: &Value) -> PipelineResult<BacktestResult> {
    let object = raw
        .as_object()
        .ok_or_else(|| malformed("expected a JSON object"))?;

    let dates = string_array(object, DATES_FIELD)?;
    let portfolio_value_series = number_array(object, PORTFOLIO_VALUE_FIELD)?;

    let mut scalars = [0.0_f64; 5];
    for (slot, field) in scalars.iter_mut().zip(SCALAR_METRIC_FIELDS) {
        *slot = finite_number(object, field)?;
    }

    if dates.len() != portfolio_value_series.len() {
        return Err(malformed(format!(
            "'{DATES_FIELD}' has {} entries but '{PORTFOLIO_VALUE_FIELD}' has {}",
            dates.len(),
            portfolio_value_series.len()
        )));
    }

    let [total_return, annualized_return, max_drawdown, sharpe_ratio, win_rate] = scalars;
    let result = BacktestResult {
        dates,
        portfolio_value_series,
        total_return,
        annualized_return,
        max_drawdown,
        sharpe_ratio,
        win_rate,
    };
    debug_assert!(result.is_consistent());
    Ok(result)
}

fn present<'a>(object: &'a Map<String, Value>, field: &str) -> PipelineResult<&'a Value> {
    match object.get(field) {
        None | Some(Value::Null) => Err(incomplete(field)),
        Some(value) => Ok(value),
    }
}

fn string_array(object: &Map<String, Value>, field: &str) -> PipelineResult<Vec<String>> {
    let items = present(object, field)?
        .as_array()
        .ok_or_else(|| malformed(format!("'{field}' must be an array of strings")))?;

    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| malformed(format!("'{field}' must be an array of strings")))
        })
        .collect()
}

fn number_array(object: &Map<String, Value>, field: &str) -> PipelineResult<Vec<f64>> {
    let items = present(object, field)?
        .as_array()
        .ok_or_else(|| malformed(format!("'{field}' must be an array of finite numbers")))?;

    items
        .iter()
        .map(|item| {
            item.as_f64()
                .filter(|v| v.is_finite())
                .ok_or_else(|| malformed(format!("'{field}' must be an array of finite numbers")))
        })
        .collect()
}

fn finite_number(object: &Map<String, Value>, field: &str) -> PipelineResult<f64> {
    present(object, field)?
        .as_f64()
        .filter(|v| v.is_finite())
        .ok_or_else(|| malformed(format!("'{field}' must be a finite number")))
}
