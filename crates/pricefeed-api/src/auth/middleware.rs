//! Axum용 JWT 인증 추출기.
//!
//! 토큰은 `Authorization: Bearer` 헤더를 먼저 보고, 없으면 설정된 쿠키에서 찾습니다.

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{
        header::{AUTHORIZATION, COOKIE},
        request::Parts,
        HeaderMap, StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::debug;

use super::jwt::JwtError;
use super::{decode_token, Claims};
use crate::error::ApiError;
use crate::state::AppState;

/// JWT 인증 추출기.
///
/// 토큰이 유효하고 해당 사용자가 아직 존재할 때만 성공합니다.
///
/// ```rust,ignore
/// async fn protected_handler(JwtAuth(claims): JwtAuth) -> impl IntoResponse {
///     format!("Authenticated user: {}", claims.username)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct JwtAuth(pub Claims);

/// JWT 인증 에러.
#[derive(Debug, thiserror::Error)]
pub enum JwtAuthError {
    #[error("You are not logged in")]
    MissingToken,
    #[error("Invalid Authorization header")]
    InvalidAuthHeader,
    #[error("Token has expired")]
    TokenExpired,
    #[error("Invalid token")]
    InvalidToken,
    #[error("User no longer exists")]
    UserNotFound,
}

impl JwtAuthError {
    pub fn code(&self) -> &'static str {
        match self {
            JwtAuthError::MissingToken => "MISSING_TOKEN",
            JwtAuthError::InvalidAuthHeader => "INVALID_AUTH_HEADER",
            JwtAuthError::TokenExpired => "TOKEN_EXPIRED",
            JwtAuthError::InvalidToken => "INVALID_TOKEN",
            JwtAuthError::UserNotFound => "USER_NOT_FOUND",
        }
    }
}

impl IntoResponse for JwtAuthError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "code": self.code(),
            "message": self.to_string(),
            "timestamp": chrono::Utc::now().timestamp(),
        }));

        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}

impl From<JwtAuthError> for ApiError {
    fn from(err: JwtAuthError) -> Self {
        ApiError::unauthorized(err.code(), err.to_string())
    }
}

/// 요청 헤더에서 토큰 문자열 추출.
///
/// `Authorization` 헤더가 있으면 그것만 봅니다. Bearer 형식이 아니면 에러입니다.
pub fn extract_token(headers: &HeaderMap, cookie_name: &str) -> Result<String, JwtAuthError> {
    if let Some(value) = headers.get(AUTHORIZATION) {
        let value = value.to_str().map_err(|_| JwtAuthError::InvalidAuthHeader)?;
        let token = value
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(JwtAuthError::InvalidAuthHeader)?;
        return Ok(token.to_string());
    }

    cookie_value(headers, cookie_name).ok_or(JwtAuthError::MissingToken)
}

/// `Cookie` 헤더에서 이름이 일치하는 값 찾기.
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, v)| *k == name && !v.is_empty())
        .map(|(_, v)| v.to_string())
}

impl FromRequestParts<Arc<AppState>> for JwtAuth {
    type Rejection = JwtAuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_token(&parts.headers, &state.auth.cookie_name)?;

        let token_data = decode_token(&token, state.auth.secret()).map_err(|e| {
            debug!(error = %e, "Token rejected");
            match e {
                JwtError::TokenExpired => JwtAuthError::TokenExpired,
                _ => JwtAuthError::InvalidToken,
            }
        })?;

        if state.users.find_by_id(&token_data.claims.sub).await.is_none() {
            return Err(JwtAuthError::UserNotFound);
        }

        Ok(JwtAuth(token_data.claims))
    }
}
