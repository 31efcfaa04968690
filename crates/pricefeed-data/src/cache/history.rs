//! 캐시 우선 가격 조회.
//!
//! # 동작 흐름
//!
//! ```text
//! 요청 (symbol, filter)
//!         │
//!         ▼
//! ┌─────────────────────┐
//! │ 1. 레지스트리 확인    │ ← 없으면 UnknownSymbol
//! └─────────┬───────────┘
//!           │
//! ┌─────────▼───────────┐
//! │ 2. 심볼 Lock 획득     │ ← 같은 심볼 백필은 하나만
//! └─────────┬───────────┘
//!           │
//!     ┌─────┴──────┐
//!     │ 캐시 충분?  │
//!     └─────┬──────┘
//!       YES │ NO
//!           │   │
//!           │   ▼
//!           │ ┌──────────────────────────┐
//!           │ │ 3. 업스트림 백필           │
//!           │ │    보존 기간 이내: replace │
//!           │ │    초과: 그대로 반환       │
//!           │ └────────────┬─────────────┘
//!           ▼              ▼
//!     ┌──────────────────────────┐
//!     │ 4. 필터 후 다운샘플링       │
//!     └──────────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use pricefeed_core::{FilterWindow, PriceSample};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

use crate::backfill::HistoricalBackfill;
use crate::error::{DataError, Result};
use crate::sampling::downsample;
use crate::storage::PriceHistoryStore;

/// 심볼별 백필 진행 상태를 직렬화하는 Lock 맵.
type FetchLockMap = Arc<RwLock<HashMap<String, Arc<RwLock<()>>>>>;

/// 캐시 우선 가격 조회 서비스.
pub struct CachedPriceHistory {
    store: Arc<PriceHistoryStore>,
    backfill: HistoricalBackfill,
    max_points: usize,
    fetch_locks: FetchLockMap,
}

impl CachedPriceHistory {
    pub fn new(store: Arc<PriceHistoryStore>, backfill: HistoricalBackfill, max_points: usize) -> Self {
        Self {
            store,
            backfill,
            max_points,
            fetch_locks: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn store(&self) -> &Arc<PriceHistoryStore> {
        &self.store
    }

    /// 차트용 가격 조회 (필터 + 다운샘플링).
    ///
    /// 심볼은 공백 제거 후 대문자로 정규화합니다.
    ///
    /// # Errors
    /// 레지스트리에 없는 심볼이면 `DataError::UnknownSymbol`.
    pub async fn get_prices(&self, symbol: &str, window: Option<FilterWindow>) -> Result<Vec<PriceSample>> {
        let samples = self.get_series(symbol, window).await?;
        Ok(downsample(samples, self.max_points))
    }

    /// 필터된 시계열 조회 (다운샘플링 없음).
    #[instrument(skip(self))]
    pub async fn get_series(&self, symbol: &str, window: Option<FilterWindow>) -> Result<Vec<PriceSample>> {
        let symbol = symbol.trim().to_uppercase();
        if !self.store.contains(&symbol) {
            return Err(DataError::UnknownSymbol(symbol));
        }

        if !self.needs_backfill(&symbol, window).await {
            return Ok(self.store.query(&symbol, window).await);
        }

        let lock = self.get_or_create_lock(&symbol).await;
        let _guard = lock.write().await;

        // 대기 중 다른 요청이 채웠을 수 있음
        if !self.needs_backfill(&symbol, window).await {
            debug!(symbol = %symbol, "Cache filled while waiting for fetch lock");
            return Ok(self.store.query(&symbol, window).await);
        }

        let now = self.store.now_millis();
        let retention_ms = self.store.retention_ms();
        let plan = self.backfill.plan(window, now, retention_ms);
        let mut fetched = self.backfill.fetch(&symbol, &plan).await;

        if plan.span_millis() > retention_ms {
            // 보존 기간을 넘는 윈도우는 저장소에 넣지 않고 바로 반환
            fetched.retain(|s| s.timestamp >= plan.start_time);
            fetched.sort_by_key(|s| s.timestamp);
            debug!(symbol = %symbol, count = fetched.len(), "Serving pass-through backfill");
            return Ok(fetched);
        }

        if !fetched.is_empty() {
            let retained = self.store.replace(&symbol, fetched).await;
            info!(
                symbol = %symbol,
                interval = %plan.interval,
                retained,
                "Series replaced from backfill"
            );
        }

        Ok(self.store.query(&symbol, window).await)
    }

    /// 저장소만으로 요청을 처리할 수 없는지 판단.
    async fn needs_backfill(&self, symbol: &str, window: Option<FilterWindow>) -> bool {
        let Some((oldest, _)) = self.store.coverage(symbol).await else {
            return true;
        };

        if window.is_some_and(|w| w.forces_refresh()) {
            return true;
        }

        let now = self.store.now_millis();
        let plan = self.backfill.plan(window, now, self.store.retention_ms());
        oldest > plan.start_time + plan.interval.as_millis()
    }

    /// 동시성 제어를 위한 Lock 획득 또는 생성.
    async fn get_or_create_lock(&self, key: &str) -> Arc<RwLock<()>> {
        let locks = self.fetch_locks.read().await;
        if let Some(lock) = locks.get(key) {
            return lock.clone();
        }
        drop(locks);

        let mut locks = self.fetch_locks.write().await;
        locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(RwLock::new(())))
            .clone()
    }
}
