//! 업스트림 캔들 조회 간격 정의.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// 과거 데이터 조회 시 사용하는 캔들 간격.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KlineInterval {
    /// 5분봉
    #[serde(rename = "5m")]
    M5,
    /// 1시간봉
    #[serde(rename = "1h")]
    H1,
    /// 4시간봉
    #[serde(rename = "4h")]
    H4,
    /// 일봉
    #[serde(rename = "1d")]
    D1,
}

impl KlineInterval {
    /// 간격의 기간.
    pub fn duration(&self) -> Duration {
        match self {
            KlineInterval::M5 => Duration::from_secs(5 * 60),
            KlineInterval::H1 => Duration::from_secs(60 * 60),
            KlineInterval::H4 => Duration::from_secs(4 * 60 * 60),
            KlineInterval::D1 => Duration::from_secs(24 * 60 * 60),
        }
    }

    /// 밀리초 단위 길이.
    pub fn as_millis(&self) -> i64 {
        self.duration().as_millis() as i64
    }

    /// 바이낸스 `interval` 파라미터 문자열.
    pub fn to_binance_interval(&self) -> &'static str {
        match self {
            KlineInterval::M5 => "5m",
            KlineInterval::H1 => "1h",
            KlineInterval::H4 => "4h",
            KlineInterval::D1 => "1d",
        }
    }
}

impl fmt::Display for KlineInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_binance_interval())
    }
}
