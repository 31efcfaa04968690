//! 백그라운드 태스크 모듈.
//!
//! - 실시간 가격 수집: 심볼별 티커 스트림 → 가격 저장소

pub mod price_feed;

pub use price_feed::{start_price_feeds, LiveFeedIngestor, ReconnectPolicy};
