//! 검증된 백테스트 결과.

use serde::{Deserialize, Serialize};

/// 날짜 시계열 필드명.
pub const DATES_FIELD: &str = "dates";
/// 포트폴리오 가치 시계열 필드명.
pub const PORTFOLIO_VALUE_FIELD: &str = "portfolio_value_series";
/// 필수 스칼라 지표 필드명 (검증 순서).
pub const SCALAR_METRIC_FIELDS: [&str; 5] = [
    "total_return",
    "annualized_return",
    "max_drawdown",
    "sharpe_ratio",
    "win_rate",
];

/// 백테스트 성과 지표.
///
/// 검증기를 통과한 값만 존재합니다. 모든 스칼라는 유한한 숫자이고
/// `dates`와 `portfolio_value_series`의 길이는 같습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    /// 날짜 (YYYY-MM-DD, 시간순)
    pub dates: Vec<String>,
    /// 날짜별 포트폴리오 가치
    pub portfolio_value_series: Vec<f64>,
    /// 총 수익률 (%)
    pub total_return: f64,
    /// 연환산 수익률 (%)
    pub annualized_return: f64,
    /// 최대 낙폭 (%)
    pub max_drawdown: f64,
    /// 샤프 비율
    pub sharpe_ratio: f64,
    /// 승률 (%)
    pub win_rate: f64,
}

impl BacktestResult {
    /// 내부 일관성 확인.
    pub fn is_consistent(&self) -> bool {
        self.dates.len() == self.portfolio_value_series.len()
            && self.portfolio_value_series.iter().all(|v| v.is_finite())
            && self.scalars().iter().all(|v| v.is_finite())
    }

    /// 스칼라 지표를 `SCALAR_METRIC_FIELDS` 순서로 반환합니다.
    fn scalars(&self) -> [f64; 5] {
        [
            self.total_return,
            self.annualized_return,
            self.max_drawdown,
            self.sharpe_ratio,
            self.win_rate,
        ]
    }

    /// 마지막 포트폴리오 가치.
    pub fn final_value(&self) -> Option<f64> {
        self.portfolio_value_series.last().copied()
    }
}
