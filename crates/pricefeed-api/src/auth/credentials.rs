//! 자격 증명 검증 및 비밀번호 해싱.
//!
//! 비밀번호는 Argon2id PHC 문자열로만 저장합니다.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// 비밀번호 처리 에러.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("비밀번호 해싱 실패")]
    HashingFailed,
    #[error("비밀번호 검증 실패")]
    VerificationFailed,
    #[error("잘못된 해시 형식")]
    InvalidHashFormat,
}

/// 비밀번호를 Argon2id로 해싱 (솔트 자동 생성).
///
/// # Example
///
/// ```rust,ignore
/// let hash = hash_password("hunter2hunter2").unwrap();
/// // "$argon2id$v=19$m=19456,t=2,p=1$..."
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| PasswordError::HashingFailed)
}

/// 저장된 PHC 해시와 평문 비밀번호 비교.
pub fn verify_password(password: &str, hash: &str) -> Result<(), PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHashFormat)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| PasswordError::VerificationFailed)
}

/// 비밀번호 강도 검증.
///
/// 8자 이상이며 숫자와 영문자를 각각 하나 이상 포함해야 합니다.
pub fn validate_password_strength(password: &str) -> Result<(), &'static str> {
    if password.chars().count() < 8 {
        return Err("Password must be at least 8 characters");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must contain at least one digit");
    }
    if !password.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err("Password must contain at least one letter");
    }
    Ok(())
}

/// 이메일 정규화 (공백 제거, 소문자).
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// 이메일 형식 검증.
///
/// `local@domain.tld` 형태만 확인합니다. 실제 수신 가능 여부는 보지 않습니다.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("chart4ever").unwrap();
        assert!(hash.starts_with("$argon2id$"));

        assert!(verify_password("chart4ever", &hash).is_ok());
        assert!(matches!(
            verify_password("chart5ever", &hash),
            Err(PasswordError::VerificationFailed)
        ));
    }

    #[test]
    fn test_salted_hashes_differ() {
        let a = hash_password("Password1").unwrap();
        let b = hash_password("Password1").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_invalid_hash_format() {
        let result = verify_password("password", "not-a-valid-hash");
        assert!(matches!(result, Err(PasswordError::InvalidHashFormat)));
    }

    #[test]
    fn test_password_strength() {
        assert!(validate_password_strength("abcd1234").is_ok());
        assert!(validate_password_strength("Pass1").is_err());
        assert!(validate_password_strength("Password").is_err());
        assert!(validate_password_strength("12345678").is_err());
        assert!(validate_password_strength("").is_err());
    }

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("trader@example.com"));
        assert!(is_valid_email("a.b+c@sub.example.io"));

        assert!(!is_valid_email("no-at-sign.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@localhost"));
        assert!(!is_valid_email("user@@example.com"));
        assert!(!is_valid_email("us er@example.com"));
        assert!(!is_valid_email("user@.com"));
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Trader@Example.COM "), "trader@example.com");
    }
}
