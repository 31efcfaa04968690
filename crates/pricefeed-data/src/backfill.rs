//! 과거 데이터 백필.
//!
//! 업스트림 호출은 한 번만 시도합니다. 실패나 타임아웃은 `warn!` 후 빈 결과로 바뀌며
//! 호출 측으로 에러가 전파되지 않습니다.

use std::sync::Arc;
use std::time::Duration;

use pricefeed_core::{BackfillPlan, FilterWindow, HistoricalDataProvider, PriceSample};
use tracing::{debug, warn};

/// 백필 실행기.
#[derive(Clone)]
pub struct HistoricalBackfill {
    provider: Arc<dyn HistoricalDataProvider>,
    timeout: Duration,
    limit: u32,
}

impl HistoricalBackfill {
    pub fn new(provider: Arc<dyn HistoricalDataProvider>, timeout: Duration, limit: u32) -> Self {
        Self {
            provider,
            timeout,
            limit,
        }
    }

    /// 필터 윈도우에 맞는 백필 계획.
    pub fn plan(&self, window: Option<FilterWindow>, now_ms: i64, retention_ms: i64) -> BackfillPlan {
        BackfillPlan::for_window(window, now_ms, retention_ms, self.limit)
    }

    /// 계획된 범위를 가져옵니다. 실패하면 빈 벡터.
    pub async fn fetch(&self, symbol: &str, plan: &BackfillPlan) -> Vec<PriceSample> {
        let result = tokio::time::timeout(self.timeout, self.provider.fetch_prices(symbol, plan)).await;

        match result {
            Ok(Ok(samples)) => {
                let samples: Vec<PriceSample> =
                    samples.into_iter().filter(PriceSample::is_valid).collect();
                debug!(
                    symbol,
                    provider = self.provider.name(),
                    interval = %plan.interval,
                    count = samples.len(),
                    "Backfill fetched"
                );
                samples
            }
            Ok(Err(e)) => {
                warn!(symbol, provider = self.provider.name(), error = %e, "Backfill failed");
                Vec::new()
            }
            Err(_) => {
                warn!(
                    symbol,
                    provider = self.provider.name(),
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Backfill timed out"
                );
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pricefeed_core::{KlineInterval, ProviderError};

    struct FixedProvider(Result<Vec<PriceSample>, ()>);

    #[async_trait]
    impl HistoricalDataProvider for FixedProvider {
        async fn fetch_prices(
            &self,
            _symbol: &str,
            _plan: &BackfillPlan,
        ) -> Result<Vec<PriceSample>, ProviderError> {
            self.0
                .clone()
                .map_err(|_| ProviderError::Network("connection refused".into()))
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    struct SlowProvider;

    #[async_trait]
    impl HistoricalDataProvider for SlowProvider {
        async fn fetch_prices(
            &self,
            _symbol: &str,
            _plan: &BackfillPlan,
        ) -> Result<Vec<PriceSample>, ProviderError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(vec![PriceSample::new(1, 1.0)])
        }

        fn name(&self) -> &str {
            "slow"
        }
    }

    fn plan() -> BackfillPlan {
        BackfillPlan {
            start_time: 0,
            end_time: 10_000,
            interval: KlineInterval::M5,
            limit: 1000,
        }
    }

    #[tokio::test]
    async fn test_fetch_success_filters_invalid() {
        let provider = FixedProvider(Ok(vec![
            PriceSample::new(1_000, 0.5),
            PriceSample::new(2_000, f64::INFINITY),
            PriceSample::new(3_000, 0.52),
        ]));
        let backfill = HistoricalBackfill::new(Arc::new(provider), Duration::from_secs(5), 1000);

        let samples = backfill.fetch("XRPUSDT", &plan()).await;
        assert_eq!(
            samples,
            vec![PriceSample::new(1_000, 0.5), PriceSample::new(3_000, 0.52)]
        );
    }

    #[tokio::test]
    async fn test_fetch_failure_is_empty() {
        let backfill =
            HistoricalBackfill::new(Arc::new(FixedProvider(Err(()))), Duration::from_secs(5), 1000);
        assert!(backfill.fetch("XRPUSDT", &plan()).await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_timeout_is_empty() {
        let backfill = HistoricalBackfill::new(Arc::new(SlowProvider), Duration::from_secs(5), 1000);
        assert!(backfill.fetch("XRPUSDT", &plan()).await.is_empty());
    }

    #[test]
    fn test_plan_uses_limit() {
        let backfill =
            HistoricalBackfill::new(Arc::new(FixedProvider(Ok(vec![]))), Duration::from_secs(5), 720);
        let plan = backfill.plan(None, 1_000_000_000, 86_400_000);
        assert_eq!(plan.limit, 720);
        assert_eq!(plan.interval, KlineInterval::H1);
    }
}
