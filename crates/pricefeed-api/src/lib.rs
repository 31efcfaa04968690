//! 가격 대시보드 REST API 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Axum 기반 REST API (`/api/prices`, `/api/symbols`)
//! - 이메일/비밀번호 가입과 JWT 인증
//! - 헬스 체크 엔드포인트
//! - 심볼별 실시간 가격 수집 태스크
//!
//! # 모듈 구성
//!
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: REST API 엔드포인트
//! - [`auth`]: JWT 인증과 사용자 저장소
//! - [`tasks`]: 백그라운드 수집 태스크
//! - [`server`]: 라우터 조립과 종료 처리

pub mod auth;
pub mod error;
pub mod routes;
pub mod server;
pub mod state;
pub mod tasks;

pub use auth::{hash_password, verify_password, Claims, JwtAuth, JwtAuthError, UserStore};
pub use error::{ApiError, ApiErrorResponse, ApiResult};
pub use routes::{create_api_router, HealthResponse, PriceQuery, SymbolsResponse};
pub use server::{cors_layer, create_router, shutdown_signal, socket_addr};
pub use state::{AppState, AuthSettings};
pub use tasks::{start_price_feeds, LiveFeedIngestor, ReconnectPolicy};

#[cfg(any(test, feature = "test-utils"))]
pub use state::{create_test_state, create_test_state_with};
