//! WebSocket 스트림 구현.

mod backoff;
mod stream;

pub use backoff::ReconnectBackoff;
pub use stream::{parse_ticker_price, BinanceStreamConnector, BinanceTickerStream};
