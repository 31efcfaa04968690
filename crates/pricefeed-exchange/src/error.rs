//! 거래소 에러 타입.

use pricefeed_core::ProviderError;
use thiserror::Error;

/// 거래소 관련 에러.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// 네트워크/연결 에러
    #[error("Network error: {0}")]
    NetworkError(String),

    /// 스트림 연결 끊김
    #[error("Disconnected: {0}")]
    Disconnected(String),

    /// 2xx가 아닌 HTTP 응답
    #[error("API error {code}: {message}")]
    ApiError { code: u16, message: String },

    /// 파싱/역직렬화 에러
    #[error("Parse error: {0}")]
    ParseError(String),

    /// WebSocket 에러
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// 타임아웃
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// 알 수 없는 에러
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl ExchangeError {
    /// 재연결/재시도로 회복 가능한 에러인지 확인.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ExchangeError::NetworkError(_)
                | ExchangeError::Disconnected(_)
                | ExchangeError::Timeout(_)
                | ExchangeError::WebSocket(_)
        )
    }
}

impl From<reqwest::Error> for ExchangeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ExchangeError::Timeout(err.to_string())
        } else if err.is_connect() || err.is_request() {
            ExchangeError::NetworkError(err.to_string())
        } else {
            ExchangeError::Unknown(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ExchangeError {
    fn from(err: serde_json::Error) -> Self {
        ExchangeError::ParseError(err.to_string())
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for ExchangeError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        ExchangeError::WebSocket(err.to_string())
    }
}

impl From<ExchangeError> for ProviderError {
    fn from(err: ExchangeError) -> Self {
        match err {
            ExchangeError::NetworkError(msg) | ExchangeError::Disconnected(msg) => {
                ProviderError::Network(msg)
            }
            ExchangeError::Timeout(msg) => ProviderError::Timeout(msg),
            ExchangeError::ApiError { code, message } => ProviderError::Api {
                status: code,
                message,
            },
            ExchangeError::ParseError(msg) => ProviderError::Parse(msg),
            ExchangeError::WebSocket(msg) | ExchangeError::Unknown(msg) => {
                ProviderError::Other(msg)
            }
        }
    }
}
