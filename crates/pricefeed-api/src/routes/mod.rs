//! API 라우트.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 심볼별 캐시 상태 (readiness)
//! - `/api/prices` - 가격 이력 조회
//! - `/api/symbols` - 설정된 심볼 목록
//! - `/api/auth` - 가입, 로그인, 로그아웃, 현재 사용자

pub mod auth;
pub mod health;
pub mod prices;
pub mod symbols;

pub use auth::{auth_router, AuthResponse, LoginRequest, RegisterRequest};
pub use health::{health_router, ComponentStatus, HealthResponse};
pub use prices::{prices_router, PriceQuery};
pub use symbols::{symbols_router, SymbolsResponse};

use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

/// 전체 API 라우터 생성.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/health", health_router())
        .nest("/api/prices", prices_router())
        .nest("/api/symbols", symbols_router())
        .nest("/api/auth", auth_router())
}
