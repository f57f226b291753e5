//! Prometheus 메트릭.
//!
//! HTTP 요청 메트릭은 이 모듈이, 파이프라인 결과 카운터(`pipeline_outcomes_total`)는
//! 오케스트레이터가 기록합니다. 둘 다 `/metrics`에서 렌더링됩니다.

use std::time::Duration;

use axum::extract::MatchedPath;
use axum::http::{Method, StatusCode};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};

pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
pub const HTTP_RESPONSES_TOTAL: &str = "http_responses_total";
pub const HTTP_REQUEST_DURATION: &str = "http_request_duration_seconds";

/// 라우트에 매칭되지 않은 요청의 경로 라벨.
pub const UNMATCHED_PATH: &str = "unmatched";

/// `/api/pipeline`은 코드 생성과 백테스트를 모두 기다리므로 분 단위까지 둡니다.
const DURATION_BUCKETS: &[f64] = &[
    0.01, 0.05, 0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0,
];

/// 전역 레코더를 설치하고 렌더링 핸들을 반환합니다.
///
/// # Errors
/// 레코더가 이미 설치되어 있으면 `BuildError`.
pub fn setup_metrics_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(HTTP_REQUEST_DURATION.to_string()),
            DURATION_BUCKETS,
        )?
        .install_recorder()
}

/// 요청 하나의 메트릭 라벨.
///
/// 경로는 실제 URI가 아니라 라우트 템플릿이라 라벨 수가 라우트 수로 제한됩니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLabels {
    method: String,
    path: String,
}

impl RequestLabels {
    pub fn new(method: &Method, matched: Option<&MatchedPath>) -> Self {
        Self {
            method: method.as_str().to_string(),
            path: matched
                .map(MatchedPath::as_str)
                .unwrap_or(UNMATCHED_PATH)
                .to_string(),
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// 요청 수신.
    pub fn record_received(&self) {
        counter!(
            HTTP_REQUESTS_TOTAL,
            "method" => self.method.clone(),
            "path" => self.path.clone()
        )
        .increment(1);
    }

    /// 응답 상태와 처리 시간.
    pub fn record_completed(&self, status: StatusCode, elapsed: Duration) {
        counter!(
            HTTP_RESPONSES_TOTAL,
            "method" => self.method.clone(),
            "path" => self.path.clone(),
            "status" => status.as_str().to_string()
        )
        .increment(1);

        histogram!(
            HTTP_REQUEST_DURATION,
            "method" => self.method.clone(),
            "path" => self.path.clone()
        )
        .record(elapsed.as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unmatched_request_labels() {
        let labels = RequestLabels::new(&Method::POST, None);
        assert_eq!(labels.method(), "POST");
        assert_eq!(labels.path(), UNMATCHED_PATH);
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        let labels = RequestLabels::new(&Method::GET, None);
        labels.record_received();
        labels.record_completed(StatusCode::NOT_FOUND, Duration::from_millis(3));
    }

    #[test]
    fn test_buckets_are_sorted() {
        assert!(DURATION_BUCKETS.windows(2).all(|w| w[0] < w[1]));
    }
}
