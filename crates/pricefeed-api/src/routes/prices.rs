//! 가격 이력 조회 endpoint.
//!
//! `GET /api/prices?symbol=XRPUSDT&filter=1w`

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use pricefeed_core::{FilterWindow, PriceSample};
use serde::Deserialize;
use tracing::debug;

use crate::auth::{JwtAuth, JwtAuthError};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// 가격 조회 쿼리.
#[derive(Debug, Default, Deserialize)]
pub struct PriceQuery {
    pub symbol: Option<String>,
    /// `1d|24h`, `1w|7d`, `1m|30d`, `6m`, `1y`. 그 외 값은 무시됩니다.
    pub filter: Option<String>,
}

/// 차트용 가격 시계열.
///
/// 인증이 필요한 설정이면 토큰이 없거나 잘못된 요청을 401로 거절합니다.
/// 알려진 심볼인데 데이터가 없으면 빈 배열입니다.
pub async fn get_prices(
    State(state): State<Arc<AppState>>,
    auth: Result<JwtAuth, JwtAuthError>,
    Query(query): Query<PriceQuery>,
) -> ApiResult<Json<Vec<PriceSample>>> {
    if state.auth.protect_prices {
        auth?;
    }

    let symbol = query
        .symbol
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::bad_request("SYMBOL_REQUIRED", "Symbol is required"))?;

    let window = FilterWindow::from_query(query.filter.as_deref());
    let prices = state.prices.get_prices(symbol, window).await?;

    debug!(
        symbol,
        filter = window.map(|w| w.as_str()).unwrap_or("all"),
        count = prices.len(),
        "Prices served"
    );
    Ok(Json(prices))
}

/// 가격 라우터 생성.
pub fn prices_router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(get_prices))
}
