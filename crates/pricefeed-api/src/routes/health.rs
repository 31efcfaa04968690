//! 헬스 체크 endpoint.
//!
//! 로드밸런서나 오케스트레이션 시스템(Kubernetes 등)에서 사용됩니다.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// 헬스 체크 응답 구조체.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// 전체 서비스 상태 ("healthy" | "degraded")
    pub status: String,

    /// API 버전
    pub version: String,

    /// 서버 업타임(초)
    pub uptime_secs: i64,

    /// 현재 시간 (ISO 8601)
    pub timestamp: String,

    /// 심볼별 캐시 상태
    pub symbols: BTreeMap<String, ComponentStatus>,
}

/// 컴포넌트 상태.
#[derive(Debug, Serialize, Deserialize)]
pub struct ComponentStatus {
    /// 상태 ("up" | "empty")
    pub status: String,

    /// 캐시된 샘플 수
    pub count: usize,

    /// 추가 정보 (선택적)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ComponentStatus {
    /// 데이터가 있는 상태.
    pub fn up(count: usize, newest: Option<i64>) -> Self {
        Self {
            status: "up".to_string(),
            count,
            message: newest.map(|ts| format!("latest sample at {}", ts)),
        }
    }

    /// 아직 데이터가 없는 상태.
    pub fn empty() -> Self {
        Self {
            status: "empty".to_string(),
            count: 0,
            message: None,
        }
    }
}

/// 간단한 헬스 체크 (liveness probe용).
///
/// GET /health
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// 상세 헬스 체크 (readiness probe용).
///
/// 비어 있는 심볼이 있으면 "degraded"지만 상태 코드는 200입니다.
/// 빈 시계열은 첫 조회 때 백필로 채워지기 때문입니다.
/// GET /health/ready
pub async fn health_ready(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let stats = state.store().stats().await;

    let symbols: BTreeMap<String, ComponentStatus> = stats
        .into_iter()
        .map(|s| {
            let status = if s.count > 0 {
                ComponentStatus::up(s.count, s.newest)
            } else {
                ComponentStatus::empty()
            };
            (s.symbol, status)
        })
        .collect();

    let overall_status = if symbols.values().all(|c| c.count > 0) {
        "healthy"
    } else {
        "degraded"
    };

    let response = HealthResponse {
        status: overall_status.to_string(),
        version: state.version.clone(),
        uptime_secs: state.uptime_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        symbols,
    };

    (StatusCode::OK, Json(response))
}

/// 헬스 체크 라우터 생성.
pub fn health_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(health_check))
        .route("/ready", get(health_ready))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use pricefeed_core::PriceSample;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health_check_returns_ok() {
        let app = Router::new().route("/health", get(health_check));

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_ready_reports_symbols() {
        use crate::state::create_test_state;

        let state = Arc::new(create_test_state());
        let now = state.store().now_millis();
        state
            .store()
            .append("XRPUSDT", vec![PriceSample::new(now - 1_000, 0.5)])
            .await;

        let app = Router::new()
            .route("/health/ready", get(health_ready))
            .with_state(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health/ready")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let health: HealthResponse = serde_json::from_slice(&body).unwrap();

        assert_eq!(health.status, "degraded");
        assert!(!health.version.is_empty());
        assert_eq!(health.symbols["XRPUSDT"].status, "up");
        assert_eq!(health.symbols["XRPUSDT"].count, 1);
        assert_eq!(health.symbols["BTCUSDT"].status, "empty");
    }

    #[test]
    fn test_component_status_variants() {
        let up = ComponentStatus::up(3, Some(42));
        assert_eq!(up.status, "up");
        assert_eq!(up.message.as_deref(), Some("latest sample at 42"));

        let empty = ComponentStatus::empty();
        assert_eq!(empty.status, "empty");
        assert!(empty.message.is_none());
    }
}
