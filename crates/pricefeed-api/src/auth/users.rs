//! 인메모리 사용자 저장소.
//!
//! 프로세스 수명 동안만 유지됩니다. 재시작하면 가입 정보가 사라집니다.
//!
//! Argon2 해싱/검증은 CPU를 오래 쓰므로 `spawn_blocking`으로 blocking thread pool에서 실행합니다.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use super::credentials::{hash_password, normalize_email, verify_password, PasswordError};

/// 저장된 사용자.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// 응답용 프로필 (해시 제외).
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.to_string(),
            username: self.username.clone(),
            email: self.email.clone(),
            created_at: self.created_at,
        }
    }
}

/// 외부로 노출되는 사용자 정보.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// 사용자 저장소 에러.
#[derive(Debug, thiserror::Error)]
pub enum UserStoreError {
    #[error("이미 등록된 이메일입니다")]
    EmailTaken,
    #[error("이미 사용 중인 사용자 이름입니다")]
    UsernameTaken,
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error("비밀번호 처리 작업 실패: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// 사용자 저장소.
#[derive(Default)]
pub struct UserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 사용자 생성.
    ///
    /// 이메일은 소문자로 정규화해 비교합니다. 사용자 이름은 대소문자를 구분합니다.
    pub async fn create(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, UserStoreError> {
        let username = username.trim().to_string();
        let email = normalize_email(email);

        // 해싱은 락 밖에서
        let password = password.to_owned();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password)).await??;

        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == email) {
            return Err(UserStoreError::EmailTaken);
        }
        if users.values().any(|u| u.username == username) {
            return Err(UserStoreError::UsernameTaken);
        }

        let user = User {
            id: Uuid::new_v4(),
            username,
            email,
            password_hash,
            created_at: Utc::now(),
        };
        users.insert(user.id, user.clone());

        info!(user_id = %user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// 이메일과 비밀번호로 사용자 확인.
    ///
    /// 이메일이 없거나 비밀번호가 틀리면 `Ok(None)`.
    /// 검증 작업 자체가 실패하면 `Err`입니다.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, UserStoreError> {
        let email = normalize_email(email);
        let user = {
            let users = self.users.read().await;
            users.values().find(|u| u.email == email).cloned()
        };
        let Some(user) = user else {
            return Ok(None);
        };

        let password = password.to_owned();
        let hash = user.password_hash.clone();
        let verified = tokio::task::spawn_blocking(move || verify_password(&password, &hash)).await?;

        Ok(verified.is_ok().then_some(user))
    }

    /// ID로 사용자 조회.
    pub async fn find_by_id(&self, id: &str) -> Option<User> {
        let id = Uuid::parse_str(id).ok()?;
        self.users.read().await.get(&id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
