//! 실시간 가격 수집기.
//!
//! 심볼마다 티커 스트림을 하나씩 열고, 받은 체결가를 수신 시각과 함께 저장소에 추가합니다.
//! 업스트림 타임스탬프는 쓰지 않습니다.
//!
//! 연결이 끊기거나 연결에 실패하면 지수 백오프 후 다시 연결합니다.
//! 연결에 성공하면 백오프가 초기화됩니다.

use std::sync::Arc;
use std::time::Duration;

use pricefeed_core::{Clock, PriceSample};
use pricefeed_data::PriceHistoryStore;
use pricefeed_exchange::{FeedEvent, PriceStreamConnector, ReconnectBackoff};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// 재연결 대기 설정.
#[derive(Debug, Clone, Copy)]
pub struct ReconnectPolicy {
    pub initial: Duration,
    pub max: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial: Duration::from_secs(1),
            max: Duration::from_secs(60),
        }
    }
}

/// 단일 심볼 수집기.
pub struct LiveFeedIngestor {
    symbol: String,
    connector: Arc<dyn PriceStreamConnector>,
    store: Arc<PriceHistoryStore>,
    clock: Arc<dyn Clock>,
    backoff: ReconnectBackoff,
}

/// 한 번의 연결이 끝난 이유.
enum SessionEnd {
    Cancelled,
    Dropped,
}

impl LiveFeedIngestor {
    pub fn new(
        symbol: impl Into<String>,
        connector: Arc<dyn PriceStreamConnector>,
        store: Arc<PriceHistoryStore>,
        clock: Arc<dyn Clock>,
        policy: ReconnectPolicy,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            connector,
            store,
            clock,
            backoff: ReconnectBackoff::new(policy.initial, policy.max),
        }
    }

    /// 종료 토큰이 취소될 때까지 수집.
    pub async fn run(mut self, shutdown_token: CancellationToken) {
        info!(symbol = %self.symbol, "Live feed ingestor started");

        loop {
            let connected = tokio::select! {
                result = self.connector.connect(&self.symbol) => result,
                _ = shutdown_token.cancelled() => break,
            };

            match connected {
                Ok(mut stream) => {
                    self.backoff.reset();
                    info!(symbol = %self.symbol, "Live feed connected");

                    if let SessionEnd::Cancelled = self.consume(&mut *stream, &shutdown_token).await {
                        break;
                    }
                }
                Err(e) => {
                    warn!(symbol = %self.symbol, error = %e, "Live feed connect failed");
                }
            }

            let delay = self.backoff.next_delay();
            warn!(
                symbol = %self.symbol,
                delay_ms = delay.as_millis() as u64,
                attempt = self.backoff.attempts(),
                "Live feed reconnecting"
            );

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = shutdown_token.cancelled() => break,
            }
        }

        info!(symbol = %self.symbol, "Live feed ingestor stopped");
    }

    /// 스트림이 끝나거나 종료 신호가 올 때까지 이벤트 처리.
    async fn consume(
        &self,
        stream: &mut dyn pricefeed_exchange::PriceStream,
        shutdown_token: &CancellationToken,
    ) -> SessionEnd {
        loop {
            let event = tokio::select! {
                event = stream.next_event() => event,
                _ = shutdown_token.cancelled() => return SessionEnd::Cancelled,
            };

            match event {
                Some(FeedEvent::Price { last, .. }) => {
                    let sample = PriceSample::new(self.clock.now_millis(), last);
                    let retained = self.store.append(&self.symbol, [sample]).await;
                    debug!(symbol = %self.symbol, price = last, retained, "Tick appended");
                }
                Some(FeedEvent::Connected) => {}
                Some(FeedEvent::Disconnected) => {
                    warn!(symbol = %self.symbol, "Live feed closed by server");
                    return SessionEnd::Dropped;
                }
                Some(FeedEvent::Error(e)) => {
                    warn!(symbol = %self.symbol, error = %e, "Live feed error");
                    return SessionEnd::Dropped;
                }
                None => {
                    warn!(symbol = %self.symbol, "Live feed ended");
                    return SessionEnd::Dropped;
                }
            }
        }
    }
}

/// 저장소의 모든 심볼에 대해 수집기를 띄웁니다.
pub fn start_price_feeds(
    connector: Arc<dyn PriceStreamConnector>,
    store: Arc<PriceHistoryStore>,
    clock: Arc<dyn Clock>,
    policy: ReconnectPolicy,
    shutdown_token: CancellationToken,
) -> Vec<JoinHandle<()>> {
    store
        .symbols()
        .into_iter()
        .map(|symbol| {
            let ingestor = LiveFeedIngestor::new(
                symbol,
                connector.clone(),
                store.clone(),
                clock.clone(),
                policy,
            );
            tokio::spawn(ingestor.run(shutdown_token.clone()))
        })
        .collect()
}
