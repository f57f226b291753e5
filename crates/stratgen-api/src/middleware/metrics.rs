//! 요청별 HTTP 메트릭 기록.

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};

use crate::metrics::RequestLabels;

/// `http_requests_total`, `http_responses_total`, `http_request_duration_seconds`를
/// 라우트 템플릿 단위로 기록합니다.
pub async fn metrics_layer(request: Request, next: Next) -> Response {
    let labels = RequestLabels::new(request.method(), request.extensions().get::<MatchedPath>());
    labels.record_received();

    let started = Instant::now();
    let response = next.run(request).await;
    labels.record_completed(response.status(), started.elapsed());

    response
}
