//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! AppState는 Arc로 래핑되어 여러 요청 간에 공유됩니다.

use std::sync::Arc;
use std::time::Instant;

use pricefeed_core::{AuthConfig, Clock, HistoricalDataProvider};
use pricefeed_data::{CachedPriceHistory, HistoricalBackfill, PriceHistoryStore};
use secrecy::{ExposeSecret, SecretString};

use crate::auth::UserStore;

/// 인증 관련 런타임 설정.
pub struct AuthSettings {
    secret: SecretString,
    /// 토큰 만료 시간 (분)
    pub token_expiry_minutes: i64,
    /// 토큰을 담는 쿠키 이름
    pub cookie_name: String,
    /// 쿠키에 `Secure` 속성 부여 여부
    pub cookie_secure: bool,
    /// `/api/prices` 인증 요구 여부
    pub protect_prices: bool,
}

impl AuthSettings {
    pub fn from_config(config: &AuthConfig) -> Self {
        Self {
            secret: SecretString::from(config.jwt_secret.clone()),
            token_expiry_minutes: i64::try_from(config.token_expiry_minutes).unwrap_or(i64::MAX / 60),
            cookie_name: config.cookie_name.clone(),
            cookie_secure: config.cookie_secure,
            protect_prices: config.protect_prices,
        }
    }

    /// 서명 키.
    pub fn secret(&self) -> &str {
        self.secret.expose_secret()
    }

    /// 토큰 쿠키 수명 (초).
    pub fn cookie_max_age_secs(&self) -> i64 {
        self.token_expiry_minutes.saturating_mul(60)
    }
}

impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("secret", &"[REDACTED]")
            .field("token_expiry_minutes", &self.token_expiry_minutes)
            .field("cookie_name", &self.cookie_name)
            .field("cookie_secure", &self.cookie_secure)
            .field("protect_prices", &self.protect_prices)
            .finish()
    }
}

/// 애플리케이션 공유 상태.
///
/// Axum의 State extractor를 통해 핸들러에 주입됩니다.
pub struct AppState {
    /// 캐시 우선 가격 조회 서비스 (저장소 포함)
    pub prices: CachedPriceHistory,

    /// 가입 사용자
    pub users: UserStore,

    /// 인증 설정
    pub auth: AuthSettings,

    /// API 버전
    pub version: String,

    /// 서버 시작 시간
    pub started_at: Instant,
}

impl AppState {
    pub fn new(prices: CachedPriceHistory, auth: AuthSettings) -> Self {
        Self {
            prices,
            users: UserStore::new(),
            auth,
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: Instant::now(),
        }
    }

    /// 가격 저장소.
    pub fn store(&self) -> &Arc<PriceHistoryStore> {
        self.prices.store()
    }

    /// 서버 업타임 (초).
    pub fn uptime_secs(&self) -> i64 {
        self.started_at.elapsed().as_secs() as i64
    }
}

/// 테스트용 상태 조립.
///
/// 심볼은 `XRPUSDT`, `BTCUSDT`, 보존 기간 30일, 다운샘플링 상한 100.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state_with(
    provider: Arc<dyn HistoricalDataProvider>,
    clock: Arc<dyn Clock>,
    protect_prices: bool,
) -> AppState {
    use std::time::Duration;

    const RETENTION_MS: i64 = 30 * 86_400_000;

    let store = Arc::new(PriceHistoryStore::new(
        ["XRPUSDT", "BTCUSDT"],
        RETENTION_MS,
        clock,
    ));
    let backfill = HistoricalBackfill::new(provider, Duration::from_secs(5), 1000);
    let prices = CachedPriceHistory::new(store, backfill, 100);

    let auth = AuthSettings::from_config(&AuthConfig {
        jwt_secret: "test-secret-key-for-jwt-testing-minimum-32-chars".to_string(),
        protect_prices,
        ..AuthConfig::default()
    });

    AppState::new(prices, auth)
}

/// 업스트림이 항상 빈 결과를 주는 테스트 상태 (인증 필요).
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state() -> AppState {
    use pricefeed_core::ManualClock;

    create_test_state_with(
        Arc::new(test_support::EmptyProvider),
        Arc::new(ManualClock::new(1_700_000_000_000)),
        true,
    )
}

#[cfg(any(test, feature = "test-utils"))]
pub mod test_support {
    //! 라우트 테스트용 가짜 업스트림.

    use async_trait::async_trait;
    use pricefeed_core::{BackfillPlan, HistoricalDataProvider, PriceSample, ProviderError};

    /// 항상 빈 결과.
    pub struct EmptyProvider;

    #[async_trait]
    impl HistoricalDataProvider for EmptyProvider {
        async fn fetch_prices(
            &self,
            _symbol: &str,
            _plan: &BackfillPlan,
        ) -> Result<Vec<PriceSample>, ProviderError> {
            Ok(Vec::new())
        }

        fn name(&self) -> &str {
            "empty"
        }
    }

    /// 고정된 샘플 반환.
    pub struct FixedProvider(pub Vec<PriceSample>);

    #[async_trait]
    impl HistoricalDataProvider for FixedProvider {
        async fn fetch_prices(
            &self,
            _symbol: &str,
            _plan: &BackfillPlan,
        ) -> Result<Vec<PriceSample>, ProviderError> {
            Ok(self.0.clone())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }
}
