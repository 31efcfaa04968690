//! 심볼 목록 endpoint.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use pricefeed_data::SeriesStats;
use serde::Serialize;

use crate::state::AppState;

/// 심볼 목록 응답.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolsResponse {
    pub symbols: Vec<SeriesStats>,
    pub retention_ms: i64,
}

/// GET /api/symbols
pub async fn list_symbols(State(state): State<Arc<AppState>>) -> Json<SymbolsResponse> {
    let store = state.store();
    Json(SymbolsResponse {
        symbols: store.stats().await,
        retention_ms: store.retention_ms(),
    })
}

pub fn symbols_router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(list_symbols))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::create_test_state;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use pricefeed_core::PriceSample;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_lists_configured_symbols_with_counts() {
        let state = Arc::new(create_test_state());
        let now = state.store().now_millis();
        state
            .store()
            .append(
                "XRPUSDT",
                vec![PriceSample::new(now - 2_000, 0.5), PriceSample::new(now - 1_000, 0.51)],
            )
            .await;

        let app = Router::new()
            .nest("/api/symbols", symbols_router())
            .with_state(state);
        let response = app
            .oneshot(Request::builder().uri("/api/symbols").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        let symbols = json["symbols"].as_array().unwrap();

        assert_eq!(symbols.len(), 2);
        assert_eq!(symbols[0]["symbol"], "BTCUSDT");
        assert_eq!(symbols[0]["count"], 0);
        assert!(symbols[0]["oldest"].is_null());
        assert_eq!(symbols[1]["symbol"], "XRPUSDT");
        assert_eq!(symbols[1]["count"], 2);
        assert_eq!(symbols[1]["newest"], now - 1_000);
        assert_eq!(json["retentionMs"], 30 * 86_400_000i64);
    }
}
