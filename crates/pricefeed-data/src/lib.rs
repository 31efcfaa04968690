//! 가격 이력 데이터 관리.
//!
//! 이 crate는 다음을 제공합니다:
//! - 심볼별 인메모리 가격 시계열 저장소 (보존 기간, 정렬, 필터)
//! - 업스트림 백필 (단일 시도, 타임아웃)
//! - 캐시 우선 조회 경로 (심볼별 백필 직렬화)
//! - stride 다운샘플링

pub mod backfill;
pub mod cache;
pub mod error;
pub mod sampling;
pub mod storage;

pub use backfill::HistoricalBackfill;
pub use cache::CachedPriceHistory;
pub use error::{DataError, Result};
pub use sampling::downsample;
pub use storage::{PriceHistoryStore, SeriesStats};
