//! 백필 계획.
//!
//! 조회 필터를 업스트림 범위 조회 파라미터(`startTime`, `endTime`, `interval`, `limit`)로 변환합니다.

use serde::{Deserialize, Serialize};

use crate::types::{FilterWindow, KlineInterval};

/// 업스트림이 한 번의 호출에 허용하는 최대 캔들 수.
pub const MAX_KLINES_PER_CALL: u32 = 1000;

/// 필터 없는 조회(전체 보존 시계열)에 사용하는 캔들 간격.
pub const UNFILTERED_INTERVAL: KlineInterval = KlineInterval::H1;

/// 단일 백필 호출의 범위와 해상도.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackfillPlan {
    /// 조회 시작 (밀리초, 포함)
    pub start_time: i64,
    /// 조회 끝 (밀리초, 포함)
    pub end_time: i64,
    /// 캔들 간격
    pub interval: KlineInterval,
    /// 호출당 최대 캔들 수
    pub limit: u32,
}

impl BackfillPlan {
    /// 필터 윈도우에 맞는 계획 생성.
    ///
    /// `window`가 `None`이면 보존 윈도우 전체를 1시간봉으로 가져옵니다.
    /// `limit`은 [`MAX_KLINES_PER_CALL`]로 제한됩니다.
    pub fn for_window(
        window: Option<FilterWindow>,
        now_ms: i64,
        retention_ms: i64,
        limit: u32,
    ) -> Self {
        let (span, interval) = match window {
            Some(w) => (w.span_millis(), w.kline_interval()),
            None => (retention_ms, UNFILTERED_INTERVAL),
        };

        Self {
            start_time: now_ms - span,
            end_time: now_ms,
            interval,
            limit: limit.clamp(1, MAX_KLINES_PER_CALL),
        }
    }

    /// 계획된 범위의 길이 (밀리초).
    pub fn span_millis(&self) -> i64 {
        self.end_time - self.start_time
    }
}
