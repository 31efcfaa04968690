//! 통합 API 에러 응답 타입.
//!
//! 모든 API 엔드포인트에서 일관된 에러 형식을 제공합니다.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pricefeed_data::DataError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

/// 통합 API 에러 응답.
///
/// # 예시
///
/// ```json
/// {
///   "code": "SYMBOL_NOT_FOUND",
///   "message": "Unknown symbol: DOGEUSDT",
///   "timestamp": 1738300800
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// 에러 코드 (예: "SYMBOL_REQUIRED", "UNAUTHORIZED")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
    /// 에러 발생 타임스탬프 (Unix timestamp)
    pub timestamp: i64,
}

impl ApiErrorResponse {
    /// 기본 에러 생성 (타임스탬프 포함).
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiErrorResponse {}

/// HTTP 계층 에러.
///
/// 각 변형은 상태 코드와 에러 코드 하나에 대응합니다.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    BadRequest { code: &'static str, message: String },

    #[error("{message}")]
    NotFound { code: &'static str, message: String },

    #[error("{message}")]
    Unauthorized { code: &'static str, message: String },

    #[error("{message}")]
    Conflict { code: &'static str, message: String },

    /// 내부 에러. 상세 내용은 로그로만 남습니다.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(code: &'static str, message: impl Into<String>) -> Self {
        Self::NotFound {
            code,
            message: message.into(),
        }
    }

    pub fn unauthorized(code: &'static str, message: impl Into<String>) -> Self {
        Self::Unauthorized {
            code,
            message: message.into(),
        }
    }

    pub fn conflict(code: &'static str, message: impl Into<String>) -> Self {
        Self::Conflict {
            code,
            message: message.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal(detail.into())
    }

    /// HTTP 상태 코드.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 응답 본문으로 변환.
    pub fn to_response(&self) -> ApiErrorResponse {
        match self {
            Self::BadRequest { code, message }
            | Self::NotFound { code, message }
            | Self::Unauthorized { code, message }
            | Self::Conflict { code, message } => ApiErrorResponse::new(*code, message.clone()),
            Self::Internal(_) => ApiErrorResponse::new("INTERNAL_ERROR", "Internal server error"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(detail) = &self {
            error!(error = %detail, "Request failed with internal error");
        }
        (self.status(), Json(self.to_response())).into_response()
    }
}

impl From<DataError> for ApiError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::UnknownSymbol(symbol) => {
                Self::not_found("SYMBOL_NOT_FOUND", format!("Unknown symbol: {}", symbol))
            }
        }
    }
}

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::bad_request("SYMBOL_REQUIRED", "x").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::conflict("EMAIL_TAKEN", "x").status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::internal("db exploded").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_detail_is_not_exposed() {
        let body = ApiError::internal("lock poisoned at store.rs:42").to_response();
        assert_eq!(body.code, "INTERNAL_ERROR");
        assert!(!body.message.contains("store.rs"));
    }

    #[test]
    fn test_unknown_symbol_maps_to_not_found() {
        let err: ApiError = DataError::UnknownSymbol("DOGEUSDT".into()).into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_response().code, "SYMBOL_NOT_FOUND");
    }
}
