//! HTTP 서버 조립.
//!
//! 라우터에 추적, 타임아웃, CORS 레이어를 붙이고
//! 정적 파일 디렉터리가 있으면 fallback으로 연결합니다.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, Router};
use pricefeed_core::ServerConfig;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::routes::create_api_router;
use crate::state::AppState;

/// CORS 레이어.
///
/// `CORS_ORIGINS`(쉼표 구분)가 있으면 해당 origin만 허용하고 자격 증명을 허용합니다.
/// 없으면 모든 origin을 허용합니다 (개발용).
pub fn cors_layer(origins: Option<&str>) -> CorsLayer {
    let origins: Vec<_> = origins
        .unwrap_or_default()
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    let layer = CorsLayer::new()
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::header::ACCEPT,
        ])
        .max_age(Duration::from_secs(3600));

    if origins.is_empty() {
        warn!("CORS_ORIGINS not set, allowing any origin (development mode)");
        layer.allow_origin(AllowOrigin::any())
    } else {
        info!("CORS configured with {} allowed origins", origins.len());
        layer
            .allow_origin(AllowOrigin::list(origins))
            .allow_credentials(true)
    }
}

/// 전체 라우터 생성.
pub fn create_router(state: Arc<AppState>, config: &ServerConfig) -> Router {
    let mut router = create_api_router().with_state(state);

    let static_dir = Path::new(&config.static_dir);
    if static_dir.is_dir() {
        info!(dir = %static_dir.display(), "Serving static files");
        router = router.fallback_service(ServeDir::new(static_dir));
    } else {
        warn!(dir = %static_dir.display(), "Static directory not found, static serving disabled");
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ))
        .layer(cors_layer(std::env::var("CORS_ORIGINS").ok().as_deref()))
}

/// 바인딩 주소.
pub fn socket_addr(config: &ServerConfig) -> Result<SocketAddr, std::net::AddrParseError> {
    format!("{}:{}", config.host, config.port).parse()
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM을 받으면 종료 토큰을 취소합니다.
/// 시그널 핸들러 설치에 실패하면 해당 시그널은 기다리지 않습니다.
pub async fn shutdown_signal(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
        _ = shutdown_token.cancelled() => {}
    }

    // 모든 백그라운드 태스크에 종료 시그널 전파
    shutdown_token.cancel();
    info!("Shutdown signal propagated to background tasks");
}
