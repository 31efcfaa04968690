//! Binance 티커 WebSocket 스트림.
//!
//! 심볼마다 `{ws_base_url}/{symbol_lower}@ticker`에 연결하고
//! 메시지의 `c`(최종 체결가) 필드만 꺼냅니다.

use async_trait::async_trait;
use futures::StreamExt;
use serde::Deserialize;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::{
    connect_async, tungstenite::protocol::Message, MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, info, warn};

use crate::connector::binance::{lenient_f64, BinanceConfig};
use crate::traits::{ExchangeResult, FeedEvent, PriceStream, PriceStreamConnector};
use crate::ExchangeError;

/// 이벤트 채널 버퍼 크기.
const EVENT_BUFFER: usize = 256;

// ============================================================================
// WebSocket 메시지 타입
// ============================================================================

/// Binance 24시간 티커 이벤트 (필요한 필드만).
#[derive(Debug, Deserialize)]
struct WsTicker {
    #[serde(rename = "c")]
    close: Value,
}

/// 티커 메시지에서 최종 체결가 추출.
///
/// `c`가 없거나 숫자로 해석되지 않으면 `None`입니다.
pub fn parse_ticker_price(text: &str) -> Option<f64> {
    let ticker: WsTicker = serde_json::from_str(text).ok()?;
    lenient_f64(&ticker.close)
}

// ============================================================================
// Binance 티커 스트림
// ============================================================================

/// 단일 심볼의 Binance 티커 스트림.
pub struct BinanceTickerStream {
    symbol: String,
    url: String,
    ws: Option<WebSocketStream<MaybeTlsStream<TcpStream>>>,
    event_rx: mpsc::Receiver<FeedEvent>,
    event_tx: Option<mpsc::Sender<FeedEvent>>,
}

impl BinanceTickerStream {
    /// 새 티커 스트림 생성 (아직 연결하지 않음).
    pub fn new(config: &BinanceConfig, symbol: &str) -> Self {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        Self {
            symbol: symbol.to_uppercase(),
            url: config.ticker_stream_url(symbol),
            ws: None,
            event_rx: rx,
            event_tx: Some(tx),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// WebSocket 서버에 연결합니다.
    pub async fn connect(&mut self) -> ExchangeResult<()> {
        info!(symbol = %self.symbol, url = %self.url, "Connecting to ticker stream");

        let (ws_stream, _) = connect_async(self.url.as_str()).await?;
        self.ws = Some(ws_stream);

        if let Some(tx) = &self.event_tx {
            let _ = tx.send(FeedEvent::Connected).await;
        }
        Ok(())
    }

    /// 수신 태스크를 시작합니다.
    ///
    /// 연결이 끊기면 `Disconnected` 또는 `Error` 이벤트를 보낸 뒤 채널이 닫힙니다.
    pub fn run(&mut self) -> ExchangeResult<()> {
        let tx = self
            .event_tx
            .take()
            .ok_or_else(|| ExchangeError::Unknown("stream already running".to_string()))?;

        let ws = self
            .ws
            .take()
            .ok_or_else(|| ExchangeError::Disconnected("Not connected".to_string()))?;

        let symbol = self.symbol.clone();
        let (_write, mut read) = ws.split();

        tokio::spawn(async move {
            while let Some(msg) = read.next().await {
                match msg {
                    Ok(Message::Text(text)) => match parse_ticker_price(&text) {
                        Some(last) => {
                            let event = FeedEvent::Price {
                                symbol: symbol.clone(),
                                last,
                            };
                            if tx.send(event).await.is_err() {
                                debug!(symbol = %symbol, "Event receiver dropped");
                                break;
                            }
                        }
                        None => debug!(symbol = %symbol, "Ignoring unparseable ticker message"),
                    },
                    Ok(Message::Close(_)) => {
                        info!(symbol = %symbol, "Ticker stream closed by server");
                        let _ = tx.send(FeedEvent::Disconnected).await;
                        break;
                    }
                    Err(e) => {
                        warn!(symbol = %symbol, error = %e, "Ticker stream error");
                        let _ = tx.send(FeedEvent::Error(e.to_string())).await;
                        break;
                    }
                    _ => {}
                }
            }
        });

        Ok(())
    }
}

#[async_trait]
impl PriceStream for BinanceTickerStream {
    async fn next_event(&mut self) -> Option<FeedEvent> {
        self.event_rx.recv().await
    }
}

/// Binance 티커 스트림 커넥터.
#[derive(Debug, Clone)]
pub struct BinanceStreamConnector {
    config: BinanceConfig,
}

impl BinanceStreamConnector {
    pub fn new(config: BinanceConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl PriceStreamConnector for BinanceStreamConnector {
    async fn connect(&self, symbol: &str) -> ExchangeResult<Box<dyn PriceStream>> {
        let mut stream = BinanceTickerStream::new(&self.config, symbol);
        stream.connect().await?;
        stream.run()?;
        Ok(Box::new(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ticker_string_price() {
        let msg = r#"{"e":"24hrTicker","E":1700000000000,"s":"XRPUSDT","c":"0.5234","b":"0.5233"}"#;
        assert_eq!(parse_ticker_price(msg), Some(0.5234));
    }

    #[test]
    fn test_parse_ticker_numeric_price() {
        assert_eq!(parse_ticker_price(r#"{"c": 42000.5}"#), Some(42000.5));
    }

    #[test]
    fn test_parse_ticker_rejects_bad_messages() {
        assert_eq!(parse_ticker_price("not json"), None);
        assert_eq!(parse_ticker_price(r#"{"result":null,"id":1}"#), None);
        assert_eq!(parse_ticker_price(r#"{"c":"abc"}"#), None);
        assert_eq!(parse_ticker_price(r#"{"c":null}"#), None);
    }

    #[test]
    fn test_stream_url() {
        let config = BinanceConfig::new("https://api", "wss://stream.example.com/ws");
        let stream = BinanceTickerStream::new(&config, "ethusdt");
        assert_eq!(stream.url(), "wss://stream.example.com/ws/ethusdt@ticker");
    }

    #[tokio::test]
    async fn test_run_requires_connection() {
        let config = BinanceConfig::default();
        let mut stream = BinanceTickerStream::new(&config, "BTCUSDT");
        assert!(matches!(stream.run(), Err(ExchangeError::Disconnected(_))));
    }
}
