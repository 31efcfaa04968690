//! 설정 관리.
//!
//! 로딩 순서 (뒤가 앞을 덮어씀):
//! 1. 구조체 기본값
//! 2. TOML 파일 (`PRICEFEED_CONFIG`, 기본 `config/default.toml`, 없어도 됨)
//! 3. `PRICEFEED__SECTION__KEY` 형식의 환경 변수
//! 4. 기존 배포에서 쓰던 평면 환경 변수 (`SYMBOLS`, `STREAM_URL`, `API_URL`,
//!    `JWT_SECRET`, `JWT_EXPIRES_IN`, `PORT`)

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{CoreError, CoreResult};

/// 설정 파일 경로를 지정하는 환경 변수.
pub const CONFIG_PATH_ENV: &str = "PRICEFEED_CONFIG";

/// 토큰 만료 시간 상한 (365일).
pub const MAX_TOKEN_EXPIRY_MINUTES: u64 = 365 * 24 * 60;

/// 설정 파일 기본 경로.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

const ENV_PREFIX: &str = "PRICEFEED";

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP 서버 설정
    pub server: ServerConfig,
    /// 가격 피드 설정
    pub feed: FeedConfig,
    /// 인증 설정
    pub auth: AuthConfig,
    /// 로깅 설정
    pub logging: LoggingConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
    /// 정적 파일 디렉토리 (대시보드 프론트엔드)
    pub static_dir: String,
    /// 요청 타임아웃 (초)
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            static_dir: "public".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// 가격 피드 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FeedConfig {
    /// 추적할 심볼 목록 (대문자로 정규화)
    #[serde(deserialize_with = "deserialize_symbols")]
    pub symbols: Vec<String>,
    /// 실시간 스트림 기본 URL (예: `wss://stream.binance.com:9443/ws`)
    pub stream_url: String,
    /// 과거 데이터 REST 기본 URL (예: `https://api.binance.com/api/v3`)
    pub api_url: String,
    /// 보존 기간 (일)
    pub retention_days: u32,
    /// 백필 호출 타임아웃 (초)
    pub backfill_timeout_secs: u64,
    /// 백필 호출당 최대 캔들 수
    pub backfill_limit: u32,
    /// 응답 최대 포인트 수 (0이면 다운샘플링 안 함)
    pub max_points: usize,
    /// 재연결 초기 대기 (밀리초)
    pub reconnect_initial_ms: u64,
    /// 재연결 최대 대기 (밀리초)
    pub reconnect_max_ms: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            symbols: Vec::new(),
            stream_url: String::new(),
            api_url: String::new(),
            retention_days: 30,
            backfill_timeout_secs: 5,
            backfill_limit: 1000,
            max_points: 100,
            reconnect_initial_ms: 1_000,
            reconnect_max_ms: 60_000,
        }
    }
}

impl FeedConfig {
    /// 보존 윈도우 (밀리초).
    pub fn retention_ms(&self) -> i64 {
        i64::from(self.retention_days) * 86_400_000
    }

    pub fn backfill_timeout(&self) -> Duration {
        Duration::from_secs(self.backfill_timeout_secs)
    }

    pub fn reconnect_initial(&self) -> Duration {
        Duration::from_millis(self.reconnect_initial_ms)
    }

    pub fn reconnect_max(&self) -> Duration {
        Duration::from_millis(self.reconnect_max_ms)
    }
}

/// 인증 설정.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// JWT 서명 비밀키
    pub jwt_secret: String,
    /// 토큰 유효 기간 (분)
    pub token_expiry_minutes: u64,
    /// 토큰을 담는 쿠키 이름
    pub cookie_name: String,
    /// 쿠키에 `Secure` 속성 부여 여부
    pub cookie_secure: bool,
    /// `/api/prices`에 인증 요구 여부
    pub protect_prices: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_expiry_minutes: 24 * 60,
            cookie_name: "jwt".to_string(),
            cookie_secure: false,
            protect_prices: true,
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("token_expiry_minutes", &self.token_expiry_minutes)
            .field("cookie_name", &self.cookie_name)
            .field("cookie_secure", &self.cookie_secure)
            .field("protect_prices", &self.protect_prices)
            .finish()
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 건너뜁니다. 검증은 하지 않으므로 호출 측에서 [`AppConfig::validate`]를 부릅니다.
    pub fn load() -> CoreResult<Self> {
        let path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::load_from(&path, |key| std::env::var(key).ok())
    }

    /// 지정한 파일과 평면 변수 조회 함수로 설정을 로드합니다.
    pub fn load_from<F>(path: &Path, lookup: F) -> CoreResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let builder = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            );

        let builder = apply_legacy_overrides(builder, lookup)?;
        let config: AppConfig = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 로드합니다 (환경 변수 무시).
    pub fn from_toml_str(toml: &str) -> CoreResult<Self> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// 필수 값 검증.
    pub fn validate(&self) -> CoreResult<()> {
        if self.feed.stream_url.trim().is_empty() {
            return Err(CoreError::Config("feed.stream_url (STREAM_URL) is required".into()));
        }
        if self.feed.api_url.trim().is_empty() {
            return Err(CoreError::Config("feed.api_url (API_URL) is required".into()));
        }
        if self.feed.symbols.is_empty() {
            return Err(CoreError::Config("feed.symbols (SYMBOLS) must not be empty".into()));
        }
        if self.auth.jwt_secret.is_empty() {
            return Err(CoreError::Config("auth.jwt_secret (JWT_SECRET) is required".into()));
        }
        if self.feed.retention_days == 0 {
            return Err(CoreError::Config("feed.retention_days must be positive".into()));
        }
        if self.auth.token_expiry_minutes == 0
            || self.auth.token_expiry_minutes > MAX_TOKEN_EXPIRY_MINUTES
        {
            return Err(CoreError::Config(format!(
                "auth.token_expiry_minutes (JWT_EXPIRES_IN) must be between 1 and {} minutes",
                MAX_TOKEN_EXPIRY_MINUTES
            )));
        }
        Ok(())
    }
}

fn apply_legacy_overrides<F>(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
    lookup: F,
) -> CoreResult<config::ConfigBuilder<config::builder::DefaultState>>
where
    F: Fn(&str) -> Option<String>,
{
    let expiry = match lookup("JWT_EXPIRES_IN") {
        Some(raw) => Some(parse_expiry_minutes(&raw).ok_or_else(|| {
            CoreError::Config(format!("JWT_EXPIRES_IN has invalid value: {raw}"))
        })? as i64),
        None => None,
    };

    let builder = builder
        .set_override_option("feed.symbols", lookup("SYMBOLS"))?
        .set_override_option("feed.stream_url", lookup("STREAM_URL"))?
        .set_override_option("feed.api_url", lookup("API_URL"))?
        .set_override_option("auth.jwt_secret", lookup("JWT_SECRET"))?
        .set_override_option("auth.token_expiry_minutes", expiry)?
        .set_override_option("server.port", lookup("PORT"))?;

    Ok(builder)
}

/// 토큰 만료 표기를 분으로 변환합니다.
///
/// `90`, `90m`, `12h`, `7d`를 지원합니다. 숫자만 있으면 분 단위입니다.
pub fn parse_expiry_minutes(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    let (digits, unit) = match raw.char_indices().last()? {
        (idx, c) if c.is_ascii_alphabetic() => (&raw[..idx], c.to_ascii_lowercase()),
        _ => (raw, 'm'),
    };

    let value: u64 = digits.parse().ok()?;
    let minutes = match unit {
        'm' => value,
        'h' => value.checked_mul(60)?,
        'd' => value.checked_mul(24 * 60)?,
        _ => return None,
    };

    (minutes > 0).then_some(minutes)
}

/// 심볼 목록 정규화: 공백 제거, 대문자화, 빈 항목 및 중복 제거.
pub fn normalize_symbols<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for item in raw {
        let symbol = item.as_ref().trim().to_uppercase();
        if !symbol.is_empty() && !out.contains(&symbol) {
            out.push(symbol);
        }
    }
    out
}

fn deserialize_symbols<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawSymbols {
        List(Vec<String>),
        Csv(String),
    }

    Ok(match RawSymbols::deserialize(deserializer)? {
        RawSymbols::List(list) => normalize_symbols(list),
        RawSymbols::Csv(csv) => normalize_symbols(csv.split(',')),
    })
}
