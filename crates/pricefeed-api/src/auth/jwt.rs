//! JWT 토큰 처리.
//!
//! HS256 Access Token 생성/검증 로직.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};

/// JWT Access Token 페이로드.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - 사용자 ID
    pub sub: String,
    /// 사용자 이메일
    pub email: String,
    /// 사용자 이름
    pub username: String,
    /// Issued At - 토큰 발급 시간 (Unix timestamp)
    pub iat: i64,
    /// Expiration - 토큰 만료 시간 (Unix timestamp)
    pub exp: i64,
    /// JWT ID - 토큰 고유 식별자
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

impl Claims {
    /// 새로운 Claims 생성.
    ///
    /// # Arguments
    ///
    /// * `user_id` - 사용자 ID
    /// * `email` - 사용자 이메일
    /// * `username` - 사용자 이름
    /// * `expires_in_minutes` - 만료 시간 (분)
    ///
    /// # Errors
    ///
    /// 만료 시각이 표현 범위를 벗어나면 `JwtError::InvalidExpiry`.
    pub fn new(
        user_id: impl Into<String>,
        email: impl Into<String>,
        username: impl Into<String>,
        expires_in_minutes: i64,
    ) -> Result<Self, JwtError> {
        let now = Utc::now();
        let exp = Duration::try_minutes(expires_in_minutes)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or(JwtError::InvalidExpiry(expires_in_minutes))?;

        Ok(Self {
            sub: user_id.into(),
            email: email.into(),
            username: username.into(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Some(uuid::Uuid::new_v4().to_string()),
        })
    }
}

/// JWT 토큰 처리 에러.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("토큰 인코딩 실패: {0}")]
    EncodingError(#[from] jsonwebtoken::errors::Error),
    #[error("토큰 디코딩 실패")]
    DecodingError,
    #[error("토큰이 만료되었습니다")]
    TokenExpired,
    #[error("잘못된 토큰 형식")]
    InvalidToken,
    #[error("토큰 만료 시간이 범위를 벗어났습니다: {0}분")]
    InvalidExpiry(i64),
}

/// Access Token 생성.
///
/// # Returns
///
/// 인코딩된 JWT 문자열
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(JwtError::from)
}

/// JWT 토큰 디코딩 및 검증.
pub fn decode_token(token: &str, secret: &str) -> Result<TokenData<Claims>, JwtError> {
    let mut validation = Validation::default();
    validation.validate_exp = true;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
        jsonwebtoken::errors::ErrorKind::InvalidToken => JwtError::InvalidToken,
        _ => JwtError::DecodingError,
    })
}
