//! 실시간 가격 스트림 trait 정의.

use async_trait::async_trait;

use crate::ExchangeError;

/// 거래소 작업을 위한 Result 타입.
pub type ExchangeResult<T> = Result<T, ExchangeError>;

/// 가격 스트림 이벤트.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    /// 최신 체결가 업데이트
    Price { symbol: String, last: f64 },
    /// 연결 수립
    Connected,
    /// 서버 측 연결 종료
    Disconnected,
    /// 에러 발생 (스트림 종료)
    Error(String),
}

/// 단일 심볼의 실시간 가격 스트림.
#[async_trait]
pub trait PriceStream: Send {
    /// 다음 이벤트 반환. `None`이면 스트림이 끝난 것입니다.
    async fn next_event(&mut self) -> Option<FeedEvent>;
}

/// 심볼별 가격 스트림을 여는 커넥터.
///
/// 수집기는 연결이 끊길 때마다 이 커넥터로 새 스트림을 엽니다.
#[async_trait]
pub trait PriceStreamConnector: Send + Sync {
    async fn connect(&self, symbol: &str) -> ExchangeResult<Box<dyn PriceStream>>;
}
