//! 재연결 지수 백오프.

use std::time::Duration;

/// 재연결 대기 시간 계산기.
///
/// 실패할 때마다 대기 시간이 두 배가 되고 `max`에서 멈춥니다.
/// 연결에 성공하면 [`ReconnectBackoff::reset`]으로 초기값으로 돌아갑니다.
#[derive(Debug, Clone)]
pub struct ReconnectBackoff {
    initial: Duration,
    max: Duration,
    current: Duration,
    attempts: u32,
}

impl ReconnectBackoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        let max = max.max(initial);
        Self {
            initial,
            max,
            current: initial,
            attempts: 0,
        }
    }

    /// 이번에 기다릴 시간을 반환하고 다음 대기 시간을 늘립니다.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(self.max);
        self.attempts = self.attempts.saturating_add(1);
        delay
    }

    pub fn reset(&mut self) {
        self.current = self.initial;
        self.attempts = 0;
    }

    /// 마지막 성공 이후 연속 실패 횟수.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

impl Default for ReconnectBackoff {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(60))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doubles_until_max() {
        let mut backoff = ReconnectBackoff::new(Duration::from_millis(100), Duration::from_millis(500));
        let delays: Vec<u64> = (0..5).map(|_| backoff.next_delay().as_millis() as u64).collect();
        assert_eq!(delays, vec![100, 200, 400, 500, 500]);
        assert_eq!(backoff.attempts(), 5);
    }

    #[test]
    fn test_reset() {
        let mut backoff = ReconnectBackoff::default();
        backoff.next_delay();
        backoff.next_delay();
        backoff.reset();
        assert_eq!(backoff.next_delay(), Duration::from_secs(1));
        assert_eq!(backoff.attempts(), 1);
    }

    #[test]
    fn test_max_below_initial() {
        let mut backoff = ReconnectBackoff::new(Duration::from_secs(5), Duration::from_secs(1));
        assert_eq!(backoff.next_delay(), Duration::from_secs(5));
        assert_eq!(backoff.next_delay(), Duration::from_secs(5));
    }
}
