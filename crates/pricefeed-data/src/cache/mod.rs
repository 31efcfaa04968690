//! 캐시 우선 조회 경로.

pub mod history;

pub use history::CachedPriceHistory;
