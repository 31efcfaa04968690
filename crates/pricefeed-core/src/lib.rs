//! # Pricefeed Core
//!
//! 가격 대시보드 백엔드의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 다른 모든 크레이트에서 공유되는 기본 타입을 제공합니다:
//! - 가격 샘플 및 조회 필터 윈도우
//! - 백필 계획 (필터 → 업스트림 캔들 간격)
//! - 과거 데이터 제공자 / 시계 추상화
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
