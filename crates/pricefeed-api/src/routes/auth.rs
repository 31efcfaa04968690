//! 가입/로그인/로그아웃 endpoint.
//!
//! 성공 응답은 본문에 토큰을 담고, 같은 토큰을 HttpOnly 쿠키로도 내려줍니다.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header::SET_COOKIE, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::{
    create_token, is_valid_email, validate_password_strength, Claims, JwtAuth, User, UserProfile,
    UserStoreError,
};
use crate::error::{ApiError, ApiResult};
use crate::state::{AppState, AuthSettings};

/// 로그아웃 시 쿠키에 남기는 값.
const LOGGED_OUT: &str = "loggedout";

/// 가입 요청.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// 로그인 요청.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// 가입/로그인 성공 응답.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub status: &'static str,
    pub token: String,
    pub user: UserProfile,
}

/// 단순 상태 응답.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

/// 현재 사용자 응답.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub status: &'static str,
    pub user: UserProfile,
}

/// 토큰 쿠키 생성.
fn token_cookie(auth: &AuthSettings, value: &str, max_age_secs: i64) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        auth.cookie_name, value, max_age_secs
    );
    if auth.cookie_secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// 토큰 발급 후 응답 조립.
fn issue_token(
    state: &AppState,
    user: &User,
    status: StatusCode,
) -> ApiResult<impl IntoResponse> {
    let claims = Claims::new(
        user.id.to_string(),
        &user.email,
        &user.username,
        state.auth.token_expiry_minutes,
    )
    .map_err(|e| ApiError::internal(format!("token claims failed: {}", e)))?;
    let token = create_token(&claims, state.auth.secret())
        .map_err(|e| ApiError::internal(format!("token encoding failed: {}", e)))?;

    let cookie = token_cookie(&state.auth, &token, state.auth.cookie_max_age_secs());
    Ok((
        status,
        [(SET_COOKIE, cookie)],
        Json(AuthResponse {
            status: "success",
            token,
            user: user.profile(),
        }),
    ))
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let username = req.username.trim();
    let email = req.email.trim();
    if username.is_empty() || email.is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request(
            "MISSING_FIELDS",
            "Please provide username, email and password",
        ));
    }
    if !is_valid_email(email) {
        return Err(ApiError::bad_request("INVALID_EMAIL", "Invalid email address"));
    }
    validate_password_strength(&req.password)
        .map_err(|msg| ApiError::bad_request("WEAK_PASSWORD", msg))?;

    let user = state
        .users
        .create(username, email, &req.password)
        .await
        .map_err(|e| match e {
            UserStoreError::EmailTaken | UserStoreError::UsernameTaken => {
                ApiError::conflict("USER_EXISTS", e.to_string())
            }
            UserStoreError::Password(_) | UserStoreError::Task(_) => {
                ApiError::internal(e.to_string())
            }
        })?;

    issue_token(&state, &user, StatusCode::CREATED)
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request(
            "MISSING_FIELDS",
            "Please provide email and password",
        ));
    }

    let user = state
        .users
        .authenticate(&req.email, &req.password)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;
    let Some(user) = user else {
        warn!(email = %req.email.trim(), "Login failed");
        return Err(ApiError::unauthorized(
            "INVALID_CREDENTIALS",
            "Incorrect email or password",
        ));
    };

    info!(user_id = %user.id, "User logged in");
    issue_token(&state, &user, StatusCode::OK)
}

/// POST /api/auth/logout
///
/// 쿠키를 무효 값으로 덮어쓰고 곧 만료시킵니다.
pub async fn logout(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let cookie = token_cookie(&state.auth, LOGGED_OUT, 10);
    (
        StatusCode::OK,
        [(SET_COOKIE, cookie)],
        Json(StatusResponse { status: "success" }),
    )
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<Arc<AppState>>,
    JwtAuth(claims): JwtAuth,
) -> ApiResult<Json<MeResponse>> {
    let user = state
        .users
        .find_by_id(&claims.sub)
        .await
        .ok_or_else(|| ApiError::unauthorized("USER_NOT_FOUND", "User no longer exists"))?;

    Ok(Json(MeResponse {
        status: "success",
        user: user.profile(),
    }))
}

/// 인증 라우터 생성.
pub fn auth_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
}
