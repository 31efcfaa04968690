//! 심볼별 가격 시계열 인메모리 저장소.
//!
//! # 불변 조건
//!
//! - 각 시계열은 항상 timestamp 오름차순입니다 (모든 변경 후 정렬).
//! - 변경 직후 `now - retention`보다 오래된 샘플은 남아 있지 않습니다.
//! - 심볼 레지스트리는 시작 시 고정되며 이후 늘거나 줄지 않습니다.
//!
//! 락은 심볼마다 따로 잡습니다. 서로 다른 심볼의 변경은 경쟁하지 않습니다.

use std::collections::HashMap;
use std::sync::Arc;

use pricefeed_core::{Clock, FilterWindow, PriceSample};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::debug;

type Series = Arc<RwLock<Vec<PriceSample>>>;

/// 시계열 요약 (심볼 목록 / 준비 상태 응답용).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesStats {
    pub symbol: String,
    pub count: usize,
    pub oldest: Option<i64>,
    pub newest: Option<i64>,
}

/// 가격 이력 저장소.
pub struct PriceHistoryStore {
    series: HashMap<String, Series>,
    clock: Arc<dyn Clock>,
    retention_ms: i64,
}

impl PriceHistoryStore {
    /// 고정된 심볼 레지스트리로 저장소 생성.
    pub fn new<I, S>(symbols: I, retention_ms: i64, clock: Arc<dyn Clock>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let series = symbols
            .into_iter()
            .map(|s| (s.into(), Series::default()))
            .collect();

        Self {
            series,
            clock,
            retention_ms,
        }
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.series.contains_key(symbol)
    }

    /// 등록된 심볼 목록 (정렬).
    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.series.keys().cloned().collect();
        symbols.sort();
        symbols
    }

    pub fn retention_ms(&self) -> i64 {
        self.retention_ms
    }

    pub fn now_millis(&self) -> i64 {
        self.clock.now_millis()
    }

    fn retention_cutoff(&self) -> i64 {
        self.clock.now_millis() - self.retention_ms
    }

    /// 샘플을 시계열에 병합합니다.
    ///
    /// 유효하지 않은 샘플은 버리고, 정렬 후 보존 기간 밖의 샘플을 제거합니다.
    /// 같은 (timestamp, price) 쌍은 중복으로 남을 수 있습니다.
    /// 레지스트리에 없는 심볼이면 아무것도 하지 않고 0을 반환합니다.
    pub async fn append<I>(&self, symbol: &str, samples: I) -> usize
    where
        I: IntoIterator<Item = PriceSample>,
    {
        let Some(series) = self.series.get(symbol) else {
            debug!(symbol, "append to unregistered symbol ignored");
            return 0;
        };

        let mut series = series.write().await;
        series.extend(samples.into_iter().filter(PriceSample::is_valid));
        series.sort_by_key(|s| s.timestamp);
        evict_before(&mut series, self.retention_cutoff());
        series.len()
    }

    /// 시계열을 통째로 교체합니다 (백필 결과 반영용).
    pub async fn replace<I>(&self, symbol: &str, samples: I) -> usize
    where
        I: IntoIterator<Item = PriceSample>,
    {
        let Some(series) = self.series.get(symbol) else {
            debug!(symbol, "replace of unregistered symbol ignored");
            return 0;
        };

        let mut fresh: Vec<PriceSample> = samples.into_iter().filter(PriceSample::is_valid).collect();
        fresh.sort_by_key(|s| s.timestamp);
        evict_before(&mut fresh, self.retention_cutoff());

        let mut series = series.write().await;
        *series = fresh;
        series.len()
    }

    /// `timestamp >= now - window` 인 샘플을 오름차순으로 반환합니다.
    ///
    /// `window`가 `None`이면 보존된 전체 시계열을 반환합니다.
    /// 심볼이 없거나 비어 있으면 빈 벡터입니다.
    pub async fn query(&self, symbol: &str, window: Option<FilterWindow>) -> Vec<PriceSample> {
        let Some(series) = self.series.get(symbol) else {
            return Vec::new();
        };

        let series = series.read().await;
        match window {
            Some(w) => {
                let cutoff = self.clock.now_millis() - w.span_millis();
                let start = series.partition_point(|s| s.timestamp < cutoff);
                series[start..].to_vec()
            }
            None => series.clone(),
        }
    }

    pub async fn len(&self, symbol: &str) -> usize {
        match self.series.get(symbol) {
            Some(series) => series.read().await.len(),
            None => 0,
        }
    }

    /// 가장 오래된 / 최신 샘플의 timestamp.
    pub async fn coverage(&self, symbol: &str) -> Option<(i64, i64)> {
        let series = self.series.get(symbol)?.read().await;
        Some((series.first()?.timestamp, series.last()?.timestamp))
    }

    /// 전체 심볼 요약 (심볼 순).
    ///
    /// 심볼마다 한 번의 읽기 락 안에서 개수와 범위를 함께 계산합니다.
    pub async fn stats(&self) -> Vec<SeriesStats> {
        let mut out = Vec::with_capacity(self.series.len());
        for symbol in self.symbols() {
            let Some(series) = self.series.get(&symbol) else {
                continue;
            };
            let series = series.read().await;
            out.push(SeriesStats {
                count: series.len(),
                oldest: series.first().map(|s| s.timestamp),
                newest: series.last().map(|s| s.timestamp),
                symbol,
            });
        }
        out
    }
}

/// 정렬된 시계열에서 `cutoff` 이전 샘플 제거.
fn evict_before(series: &mut Vec<PriceSample>, cutoff: i64) {
    let keep_from = series.partition_point(|s| s.timestamp < cutoff);
    series.drain(..keep_from);
}
