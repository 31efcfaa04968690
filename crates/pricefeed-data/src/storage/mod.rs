//! 가격 이력 저장소.

pub mod price_history;

pub use price_history::{PriceHistoryStore, SeriesStats};
