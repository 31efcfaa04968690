//! 과거 가격 데이터 제공자 추상화.
//!
//! 외부 시장 데이터 API에서 범위 조회를 수행하는 거래소 중립적 인터페이스입니다.
//! 실제 구현은 `pricefeed-exchange`에 있고, 조회 경로(`pricefeed-data`)는 이 trait에만 의존합니다.

use async_trait::async_trait;
use thiserror::Error;

use super::BackfillPlan;
use crate::types::PriceSample;

// =============================================================================
// 에러 타입
// =============================================================================

/// HistoricalDataProvider 에러.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// 네트워크 에러
    #[error("네트워크 에러: {0}")]
    Network(String),

    /// 응답 대기 시간 초과
    #[error("타임아웃: {0}")]
    Timeout(String),

    /// 업스트림 API 에러 (HTTP 상태 코드 포함)
    #[error("API 에러 {status}: {message}")]
    Api { status: u16, message: String },

    /// 응답 파싱 에러
    #[error("파싱 에러: {0}")]
    Parse(String),

    /// 기타 에러
    #[error("기타 에러: {0}")]
    Other(String),
}

// =============================================================================
// HistoricalDataProvider Trait
// =============================================================================

/// 과거 가격 데이터 제공자 trait.
///
/// # 구현 예시
///
/// ```ignore
/// pub struct BinanceKlineClient { /* ... */ }
///
/// #[async_trait]
/// impl HistoricalDataProvider for BinanceKlineClient {
///     async fn fetch_prices(&self, symbol: &str, plan: &BackfillPlan)
///         -> Result<Vec<PriceSample>, ProviderError>
///     {
///         // GET /klines 호출 후 (open time, close) 추출
///     }
/// }
/// ```
#[async_trait]
pub trait HistoricalDataProvider: Send + Sync {
    /// 계획된 범위의 가격 샘플 조회.
    ///
    /// 반환값은 업스트림 순서를 따르며 정렬은 보장하지 않습니다.
    ///
    /// # Errors
    ///
    /// - `ProviderError::Network` / `ProviderError::Timeout`: 연결 실패
    /// - `ProviderError::Api`: 2xx가 아닌 응답
    /// - `ProviderError::Parse`: 배열이 아닌 응답 본문 등
    async fn fetch_prices(
        &self,
        symbol: &str,
        plan: &BackfillPlan,
    ) -> Result<Vec<PriceSample>, ProviderError>;

    /// 제공자 이름 (로그용).
    fn name(&self) -> &str;
}
