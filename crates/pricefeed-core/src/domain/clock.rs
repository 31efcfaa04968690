//! 시계 추상화.
//!
//! 보존 윈도우와 필터 계산은 모두 "현재 시각"에 의존하므로
//! 저장소와 수집기에는 시계를 주입합니다.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

/// 밀리초 단위 현재 시각 제공자.
pub trait Clock: Send + Sync {
    /// Unix epoch 기준 현재 시각 (밀리초).
    fn now_millis(&self) -> i64;
}

/// 시스템 벽시계.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// 수동으로 움직이는 시계 (테스트 및 재현용).
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: AtomicI64,
}

impl ManualClock {
    pub fn new(now_ms: i64) -> Self {
        Self {
            now_ms: AtomicI64::new(now_ms),
        }
    }

    pub fn set(&self, now_ms: i64) {
        self.now_ms.store(now_ms, Ordering::SeqCst);
    }

    pub fn advance(&self, delta_ms: i64) {
        self.now_ms.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(1_000);
        assert_eq!(clock.now_millis(), 1_000);

        clock.advance(500);
        assert_eq!(clock.now_millis(), 1_500);

        clock.set(10);
        assert_eq!(clock.now_millis(), 10);
    }

    #[test]
    fn test_system_clock_is_epoch_millis() {
        // 2020-01-01 이후
        assert!(SystemClock.now_millis() > 1_577_836_800_000);
    }
}
