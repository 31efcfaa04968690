//! 데이터 모듈 오류 타입.

use thiserror::Error;

/// 데이터 관련 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// 레지스트리에 없는 심볼
    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),
}

pub type Result<T> = std::result::Result<T, DataError>;
