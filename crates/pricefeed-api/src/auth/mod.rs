//! 인증.
//!
//! 이메일/비밀번호 가입과 로그인, JWT 기반 요청 인증을 제공합니다.
//!
//! # 구성 요소
//!
//! - [`Claims`]: JWT 페이로드 구조체
//! - [`JwtAuth`]: Axum 핸들러용 JWT 검증 추출기
//! - [`UserStore`]: 인메모리 사용자 저장소
//! - 비밀번호 해싱 및 입력 검증 함수
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! async fn protected_handler(JwtAuth(claims): JwtAuth) -> impl IntoResponse {
//!     format!("Hello, {}!", claims.username)
//! }
//! ```

mod credentials;
mod jwt;
mod middleware;
mod users;

pub use credentials::{
    hash_password, is_valid_email, normalize_email, validate_password_strength, verify_password,
    PasswordError,
};
pub use jwt::{create_token, decode_token, Claims, JwtError};
pub use middleware::{extract_token, JwtAuth, JwtAuthError};
pub use users::{User, UserProfile, UserStore, UserStoreError};
