//! 헬스 체크 endpoint.
//!
//! 협력 서비스에 요청을 보내지 않고 설정 상태만 보고합니다.
//! 코드 생성 자격증명이 없으면 서버는 응답하지만 `degraded`입니다.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// liveness 응답 본문.
pub const LIVENESS_MESSAGE: &str = "Strategy generation API is running";

/// 서비스 전체 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    Healthy,
    /// 일부 단계가 항상 실패하는 설정
    Degraded,
}

/// 컴포넌트 설정 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentState {
    Configured,
    NotConfigured,
}

/// 컴포넌트 하나의 상태와 설명.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentStatus {
    pub status: ComponentState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ComponentStatus {
    fn new(status: ComponentState, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: Some(detail.into()),
        }
    }
}

/// 파이프라인 단계별 협력 객체.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Components {
    pub codegen: ComponentStatus,
    pub storage: ComponentStatus,
    pub backtest: ComponentStatus,
}

/// `GET /health` 응답.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: ServiceStatus,
    pub version: String,
    pub uptime_secs: i64,
    pub timestamp: DateTime<Utc>,
    pub credential_configured: bool,
    pub components: Components,
}

impl HealthResponse {
    fn from_state(state: &AppState) -> Self {
        let config = &state.config;
        let codegen = if state.has_credential {
            ComponentStatus::new(ComponentState::Configured, config.codegen.model.clone())
        } else {
            ComponentStatus::new(ComponentState::NotConfigured, "OPENAI_API_KEY is not set")
        };

        Self {
            status: if state.has_credential {
                ServiceStatus::Healthy
            } else {
                ServiceStatus::Degraded
            },
            version: state.version.clone(),
            uptime_secs: state.uptime_secs(),
            timestamp: Utc::now(),
            credential_configured: state.has_credential,
            components: Components {
                codegen,
                storage: ComponentStatus::new(
                    ComponentState::Configured,
                    config.storage.dir.display().to_string(),
                ),
                backtest: ComponentStatus::new(
                    ComponentState::Configured,
                    config.backtest.base_url.clone(),
                ),
            },
        }
    }
}

/// GET /
pub async fn root() -> &'static str {
    LIVENESS_MESSAGE
}

/// GET /health
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse::from_state(&state))
}

pub fn health_router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(health_check))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use crate::state::create_test_state;

    async fn get_body(app: Router, uri: &str) -> (StatusCode, axum::body::Bytes) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body)
    }

    #[tokio::test]
    async fn test_root_is_plain_text() {
        let (status, body) = get_body(Router::new().route("/", get(root)), "/").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(&body[..], LIVENESS_MESSAGE.as_bytes());
    }

    #[tokio::test]
    async fn test_health_without_credential_is_degraded() {
        let app = Router::new()
            .nest("/health", health_router())
            .with_state(Arc::new(create_test_state()));

        let (status, body) = get_body(app, "/health").await;
        assert_eq!(status, StatusCode::OK);

        let health: HealthResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(health.status, ServiceStatus::Degraded);
        assert!(!health.credential_configured);
        assert_eq!(health.components.codegen.status, ComponentState::NotConfigured);
        assert_eq!(health.components.backtest.status, ComponentState::Configured);
        assert_eq!(
            health.components.backtest.detail.as_deref(),
            Some("http://127.0.0.1:9")
        );
        assert!(!health.version.is_empty());
    }

    #[test]
    fn test_health_json_field_names() {
        let json = serde_json::to_value(HealthResponse::from_state(&create_test_state())).unwrap();

        assert_eq!(json["status"], "degraded");
        assert_eq!(json["components"]["codegen"]["status"], "not_configured");
        assert!(json["timestamp"].is_string());
        assert!(json["uptime_secs"].is_i64());
    }
}
