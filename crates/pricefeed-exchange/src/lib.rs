//! 거래소 연결 및 시장 데이터 처리.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Binance 공개 REST 커넥터 (`/klines` 범위 조회 → 가격 샘플)
//! - Binance 티커 WebSocket 스트림 (심볼별 연결)
//! - 재연결 지수 백오프

pub mod connector;
pub mod error;
pub mod traits;
pub mod websocket;

pub use connector::{BinanceClient, BinanceConfig};
pub use error::*;
pub use traits::*;
pub use websocket::{BinanceStreamConnector, BinanceTickerStream, ReconnectBackoff};
