//! 가격 대시보드 API 서버.
//!
//! 설정을 읽고 심볼별 실시간 수집 태스크를 띄운 뒤 HTTP 서버를 시작합니다.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use pricefeed_core::{init_logging, AppConfig, Clock, LogConfig, SystemClock};
use pricefeed_data::{CachedPriceHistory, HistoricalBackfill, PriceHistoryStore};
use pricefeed_exchange::{BinanceClient, BinanceConfig, BinanceStreamConnector};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use pricefeed_api::server::{create_router, shutdown_signal, socket_addr};
use pricefeed_api::state::{AppState, AuthSettings};
use pricefeed_api::tasks::{start_price_feeds, ReconnectPolicy};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 파일 로드 (없어도 무시)
    let _ = dotenvy::dotenv();

    let config = AppConfig::load().context("failed to load configuration")?;
    init_logging(&LogConfig::from_app(&config.logging)).context("failed to initialize logging")?;

    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(e).context("invalid configuration");
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        symbols = ?config.feed.symbols,
        retention_days = config.feed.retention_days,
        "Starting price dashboard server"
    );

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store = Arc::new(PriceHistoryStore::new(
        config.feed.symbols.iter(),
        config.feed.retention_ms(),
        clock.clone(),
    ));

    let binance_config = BinanceConfig::new(&config.feed.api_url, &config.feed.stream_url)
        .with_timeout_secs(config.feed.backfill_timeout_secs);
    let client = BinanceClient::new(binance_config.clone()).context("failed to build HTTP client")?;
    let backfill = HistoricalBackfill::new(
        Arc::new(client),
        config.feed.backfill_timeout(),
        config.feed.backfill_limit,
    );
    let prices = CachedPriceHistory::new(store.clone(), backfill, config.feed.max_points);

    let state = Arc::new(AppState::new(prices, AuthSettings::from_config(&config.auth)));
    if !state.auth.protect_prices {
        warn!("Price endpoint is public (auth.protect_prices = false)");
    }

    // 전역 종료 토큰 (수집 태스크와 서버가 공유)
    let shutdown_token = CancellationToken::new();

    let feeds = start_price_feeds(
        Arc::new(BinanceStreamConnector::new(binance_config)),
        store,
        clock,
        ReconnectPolicy {
            initial: config.feed.reconnect_initial(),
            max: config.feed.reconnect_max(),
        },
        shutdown_token.clone(),
    );
    info!(count = feeds.len(), "Live feed ingestors spawned");

    let app = create_router(state, &config.server);
    let addr = socket_addr(&config.server).context("invalid server address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_token.clone()))
        .await
        .context("server error")?;

    shutdown_token.cancel();

    // 수집 태스크 종료 대기 (최대 10초)
    let cleanup = tokio::time::timeout(Duration::from_secs(10), futures::future::join_all(feeds)).await;
    if cleanup.is_err() {
        warn!("Cleanup timeout, forcing shutdown");
    }

    info!("Server stopped gracefully");
    Ok(())
}
