//! Binance 공개 시장 데이터 커넥터.
//!
//! 인증이 필요 없는 `/klines` 범위 조회만 사용합니다.
//! 캔들 행에서 (open time, close) 두 값만 가격 샘플로 추출합니다.

use std::time::Duration;

use async_trait::async_trait;
use pricefeed_core::{BackfillPlan, HistoricalDataProvider, PriceSample, ProviderError};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::traits::ExchangeResult;
use crate::ExchangeError;

// ============================================================================
// 설정
// ============================================================================

/// Binance 클라이언트 설정.
#[derive(Debug, Clone)]
pub struct BinanceConfig {
    /// REST 기본 URL (`/klines`가 뒤에 붙음)
    pub rest_base_url: String,
    /// WebSocket 기본 URL (`/{symbol}@ticker`가 뒤에 붙음)
    pub ws_base_url: String,
    /// 요청 타임아웃 (초)
    pub timeout_secs: u64,
}

impl Default for BinanceConfig {
    fn default() -> Self {
        Self {
            rest_base_url: "https://api.binance.com/api/v3".to_string(),
            ws_base_url: "wss://stream.binance.com:9443/ws".to_string(),
            timeout_secs: 10,
        }
    }
}

impl BinanceConfig {
    /// 새 설정 생성.
    pub fn new(rest_base_url: impl Into<String>, ws_base_url: impl Into<String>) -> Self {
        Self {
            rest_base_url: rest_base_url.into(),
            ws_base_url: ws_base_url.into(),
            ..Default::default()
        }
    }

    /// 요청 타임아웃 설정.
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// 심볼의 티커 스트림 URL.
    pub fn ticker_stream_url(&self, symbol: &str) -> String {
        format!(
            "{}/{}@ticker",
            self.ws_base_url.trim_end_matches('/'),
            symbol.to_lowercase()
        )
    }
}

// ============================================================================
// API 응답 타입
// ============================================================================

#[derive(Debug, Deserialize)]
struct BinanceError {
    #[allow(dead_code)]
    code: i64,
    msg: String,
}

/// 숫자 또는 숫자 문자열을 f64로 변환.
///
/// Binance는 가격을 문자열로 보내지만 호환 서버는 숫자로 보내기도 합니다.
pub(crate) fn lenient_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// 캔들 행 하나를 가격 샘플로 변환. 형식이 맞지 않으면 `None`.
fn kline_row_to_sample(row: &Value) -> Option<PriceSample> {
    let fields = row.as_array()?;
    let open_time = fields.first()?.as_i64()?;
    let close = lenient_f64(fields.get(4)?)?;

    let sample = PriceSample::new(open_time, close);
    sample.is_valid().then_some(sample)
}

// ============================================================================
// Binance 클라이언트
// ============================================================================

/// Binance 공개 REST 클라이언트.
pub struct BinanceClient {
    config: BinanceConfig,
    client: Client,
}

impl BinanceClient {
    /// 새 Binance 클라이언트 생성.
    ///
    /// # Errors
    /// HTTP 클라이언트 생성에 실패하면 `ExchangeError::NetworkError`를 반환합니다.
    pub fn new(config: BinanceConfig) -> Result<Self, ExchangeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                ExchangeError::NetworkError(format!("HTTP 클라이언트 생성 실패: {}", e))
            })?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &BinanceConfig {
        &self.config
    }

    /// 공개 API 요청 (인증 불필요).
    async fn public_get(&self, endpoint: &str, params: &[(&str, String)]) -> ExchangeResult<Value> {
        let url = format!(
            "{}{}",
            self.config.rest_base_url.trim_end_matches('/'),
            endpoint
        );

        debug!(url = %url, ?params, "GET");

        let response = self.client.get(&url).query(params).send().await?;
        self.handle_response(response).await
    }

    /// API 응답 처리.
    async fn handle_response(&self, response: reqwest::Response) -> ExchangeResult<Value> {
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            serde_json::from_str(&body).map_err(|e| {
                warn!("Failed to parse response: {} - Body: {}", e, body);
                ExchangeError::ParseError(e.to_string())
            })
        } else {
            let message = serde_json::from_str::<BinanceError>(&body)
                .map(|e| e.msg)
                .unwrap_or(body);
            Err(ExchangeError::ApiError {
                code: status.as_u16(),
                message,
            })
        }
    }

    /// 캔들 범위 조회 후 가격 샘플로 변환.
    ///
    /// 응답 본문이 배열이 아니면 `ParseError`입니다. 형식이 맞지 않는 행은 버립니다.
    pub async fn get_price_klines(
        &self,
        symbol: &str,
        plan: &BackfillPlan,
    ) -> ExchangeResult<Vec<PriceSample>> {
        let body = self
            .public_get(
                "/klines",
                &[
                    ("symbol", symbol.to_uppercase()),
                    ("interval", plan.interval.to_binance_interval().to_string()),
                    ("startTime", plan.start_time.to_string()),
                    ("endTime", plan.end_time.to_string()),
                    ("limit", plan.limit.to_string()),
                ],
            )
            .await?;

        let rows = body.as_array().ok_or_else(|| {
            ExchangeError::ParseError(format!("klines response is not an array: {}", body))
        })?;

        let samples: Vec<PriceSample> = rows.iter().filter_map(kline_row_to_sample).collect();
        if samples.len() < rows.len() {
            debug!(
                symbol,
                dropped = rows.len() - samples.len(),
                "Dropped malformed kline rows"
            );
        }

        Ok(samples)
    }
}

#[async_trait]
impl HistoricalDataProvider for BinanceClient {
    async fn fetch_prices(
        &self,
        symbol: &str,
        plan: &BackfillPlan,
    ) -> Result<Vec<PriceSample>, ProviderError> {
        Ok(self.get_price_klines(symbol, plan).await?)
    }

    fn name(&self) -> &str {
        "binance"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use pricefeed_core::KlineInterval;
    use serde_json::json;

    fn plan() -> BackfillPlan {
        BackfillPlan {
            start_time: 1_000,
            end_time: 10_000,
            interval: KlineInterval::M5,
            limit: 1000,
        }
    }

    fn client_for(server: &mockito::Server) -> BinanceClient {
        BinanceClient::new(BinanceConfig::new(server.url(), "ws://unused").with_timeout_secs(2))
            .unwrap()
    }

    #[test]
    fn test_ticker_stream_url() {
        let config = BinanceConfig::new("https://api", "wss://stream.binance.com:9443/ws/");
        assert_eq!(
            config.ticker_stream_url("XRPUSDT"),
            "wss://stream.binance.com:9443/ws/xrpusdt@ticker"
        );
    }

    #[test]
    fn test_kline_row_parsing() {
        let row = json!([1000, "0.5", "0.6", "0.4", "0.55", "100", 1999, "55", 10, "1", "1", "0"]);
        assert_eq!(kline_row_to_sample(&row), Some(PriceSample::new(1000, 0.55)));

        let numeric = json!([2000, 1, 1, 1, 0.75]);
        assert_eq!(kline_row_to_sample(&numeric), Some(PriceSample::new(2000, 0.75)));

        assert_eq!(kline_row_to_sample(&json!([3000, "1"])), None);
        assert_eq!(kline_row_to_sample(&json!(["x", 1, 1, 1, "1"])), None);
        assert_eq!(kline_row_to_sample(&json!([3000, 1, 1, 1, "nan?"])), None);
        assert_eq!(kline_row_to_sample(&json!([3000, 1, 1, 1, "-2"])), None);
        assert_eq!(kline_row_to_sample(&json!({"t": 1})), None);
    }

    #[tokio::test]
    async fn test_fetch_klines_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/klines")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("symbol".into(), "XRPUSDT".into()),
                Matcher::UrlEncoded("interval".into(), "5m".into()),
                Matcher::UrlEncoded("startTime".into(), "1000".into()),
                Matcher::UrlEncoded("endTime".into(), "10000".into()),
                Matcher::UrlEncoded("limit".into(), "1000".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!([
                    [1000, "0.50", "0", "0", "0.51", "0"],
                    [4000, "0.51", "0", "0", "0.52", "0"]
                ])
                .to_string(),
            )
            .create_async()
            .await;

        let client = client_for(&server);
        let samples = client.fetch_prices("xrpusdt", &plan()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(
            samples,
            vec![PriceSample::new(1000, 0.51), PriceSample::new(4000, 0.52)]
        );
    }

    #[tokio::test]
    async fn test_fetch_klines_non_array_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/klines")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"unexpected": true}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.fetch_prices("XRPUSDT", &plan()).await.unwrap_err();
        assert!(matches!(err, ProviderError::Parse(_)));
    }

    #[tokio::test]
    async fn test_fetch_klines_http_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/klines")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body(r#"{"code": -1121, "msg": "Invalid symbol."}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.fetch_prices("NOPE", &plan()).await.unwrap_err();
        match err {
            ProviderError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Invalid symbol.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_klines_drops_malformed_rows() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/klines")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                json!([
                    [1000, "0", "0", "0", "1.5"],
                    "garbage",
                    [2000],
                    [3000, "0", "0", "0", "oops"],
                    [4000, "0", "0", "0", 2.5]
                ])
                .to_string(),
            )
            .create_async()
            .await;

        let client = client_for(&server);
        let samples = client.fetch_prices("BTCUSDT", &plan()).await.unwrap();
        assert_eq!(
            samples,
            vec![PriceSample::new(1000, 1.5), PriceSample::new(4000, 2.5)]
        );
    }
}
