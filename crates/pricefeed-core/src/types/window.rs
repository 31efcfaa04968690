//! 가격 조회 필터 윈도우.
//!
//! 프론트엔드가 `filter` 쿼리 파라미터로 보내는 기간을 표현합니다.
//! 윈도우별 업스트림 캔들 간격과 강제 갱신 여부를 한 테이블에서 관리합니다.
//!
//! | 윈도우 | 별칭 | 기간 | 캔들 간격 | 강제 갱신 |
//! |--------|------|------|-----------|-----------|
//! | Day | `1d`, `24h` | 24시간 | 5m | 아니오 |
//! | Week | `1w`, `7d` | 7일 | 1h | 아니오 |
//! | Month | `1m`, `30d` | 30일 | 4h | 아니오 |
//! | SixMonths | `6m` | 180일 | 1d | 예 |
//! | Year | `1y` | 365일 | 1d | 예 |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::KlineInterval;
use crate::error::CoreError;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// 조회 필터 윈도우 (닫힌 열거형).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterWindow {
    /// 최근 24시간
    Day,
    /// 최근 7일
    Week,
    /// 최근 30일
    Month,
    /// 최근 180일
    SixMonths,
    /// 최근 365일
    Year,
}

impl FilterWindow {
    /// 지원하는 모든 윈도우 (짧은 순).
    pub const ALL: [FilterWindow; 5] = [
        FilterWindow::Day,
        FilterWindow::Week,
        FilterWindow::Month,
        FilterWindow::SixMonths,
        FilterWindow::Year,
    ];

    /// 필터 문자열 파싱 (대소문자 무시).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1d" | "24h" => Some(FilterWindow::Day),
            "1w" | "7d" => Some(FilterWindow::Week),
            "1m" | "30d" => Some(FilterWindow::Month),
            "6m" => Some(FilterWindow::SixMonths),
            "1y" => Some(FilterWindow::Year),
            _ => None,
        }
    }

    /// 쿼리 파라미터 값에서 윈도우 결정.
    ///
    /// 없거나 인식할 수 없는 값은 `None`(전체 보존 시계열)입니다.
    pub fn from_query(raw: Option<&str>) -> Option<Self> {
        raw.and_then(Self::parse)
    }

    /// 윈도우 길이 (밀리초).
    pub fn span_millis(&self) -> i64 {
        match self {
            FilterWindow::Day => DAY_MS,
            FilterWindow::Week => 7 * DAY_MS,
            FilterWindow::Month => 30 * DAY_MS,
            FilterWindow::SixMonths => 180 * DAY_MS,
            FilterWindow::Year => 365 * DAY_MS,
        }
    }

    /// 백필에 사용할 캔들 간격.
    pub fn kline_interval(&self) -> KlineInterval {
        match self {
            FilterWindow::Day => KlineInterval::M5,
            FilterWindow::Week => KlineInterval::H1,
            FilterWindow::Month => KlineInterval::H4,
            FilterWindow::SixMonths | FilterWindow::Year => KlineInterval::D1,
        }
    }

    /// 캐시 상태와 무관하게 매번 업스트림에서 가져와야 하는지 여부.
    ///
    /// 라이브 피드 누적만으로는 채울 수 없는 수개월 단위 윈도우입니다.
    pub fn forces_refresh(&self) -> bool {
        matches!(self, FilterWindow::SixMonths | FilterWindow::Year)
    }

    /// 정규 문자열 표현.
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterWindow::Day => "1d",
            FilterWindow::Week => "1w",
            FilterWindow::Month => "1m",
            FilterWindow::SixMonths => "6m",
            FilterWindow::Year => "1y",
        }
    }
}

impl fmt::Display for FilterWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterWindow {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| CoreError::InvalidInput(format!("Unknown filter: {}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!(FilterWindow::parse("1d"), Some(FilterWindow::Day));
        assert_eq!(FilterWindow::parse("24h"), Some(FilterWindow::Day));
        assert_eq!(FilterWindow::parse("7d"), Some(FilterWindow::Week));
        assert_eq!(FilterWindow::parse("1W"), Some(FilterWindow::Week));
        assert_eq!(FilterWindow::parse("30d"), Some(FilterWindow::Month));
        assert_eq!(FilterWindow::parse("1m"), Some(FilterWindow::Month));
        assert_eq!(FilterWindow::parse("6m"), Some(FilterWindow::SixMonths));
        assert_eq!(FilterWindow::parse(" 1y "), Some(FilterWindow::Year));
    }

    #[test]
    fn test_unknown_filter_means_unfiltered() {
        assert_eq!(FilterWindow::from_query(None), None);
        assert_eq!(FilterWindow::from_query(Some("")), None);
        assert_eq!(FilterWindow::from_query(Some("5y")), None);
        assert!("5y".parse::<FilterWindow>().is_err());
    }

    #[test]
    fn test_windows_are_ordered_by_span() {
        for pair in FilterWindow::ALL.windows(2) {
            assert!(pair[0].span_millis() < pair[1].span_millis());
        }
    }

    #[test]
    fn test_granularity_table() {
        assert_eq!(FilterWindow::Day.kline_interval(), KlineInterval::M5);
        assert_eq!(FilterWindow::Week.kline_interval(), KlineInterval::H1);
        assert_eq!(FilterWindow::Month.kline_interval(), KlineInterval::H4);
        assert_eq!(FilterWindow::Year.kline_interval(), KlineInterval::D1);

        assert!(!FilterWindow::Month.forces_refresh());
        assert!(FilterWindow::SixMonths.forces_refresh());
    }
}
