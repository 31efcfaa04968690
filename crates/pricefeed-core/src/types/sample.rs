//! 가격 샘플 정의.

use serde::{Deserialize, Serialize};

/// 시계열의 단일 가격 관측값.
///
/// 프론트엔드로 그대로 직렬화됩니다: `{"timestamp": 1700000000000, "price": 0.52}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceSample {
    /// Unix epoch 기준 밀리초
    pub timestamp: i64,
    /// 가격
    pub price: f64,
}

impl PriceSample {
    /// 새 샘플 생성.
    pub fn new(timestamp: i64, price: f64) -> Self {
        Self { timestamp, price }
    }

    /// 저장 가능한 샘플인지 확인.
    ///
    /// 가격은 유한한 양수, 타임스탬프는 양수여야 합니다.
    pub fn is_valid(&self) -> bool {
        self.timestamp > 0 && self.price.is_finite() && self.price > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_validity() {
        assert!(PriceSample::new(1_000, 0.5).is_valid());

        assert!(!PriceSample::new(0, 0.5).is_valid());
        assert!(!PriceSample::new(-5, 0.5).is_valid());
        assert!(!PriceSample::new(1_000, 0.0).is_valid());
        assert!(!PriceSample::new(1_000, -1.0).is_valid());
        assert!(!PriceSample::new(1_000, f64::NAN).is_valid());
        assert!(!PriceSample::new(1_000, f64::INFINITY).is_valid());
    }

    #[test]
    fn test_sample_json_shape() {
        let json = serde_json::to_value(PriceSample::new(2_000, 0.52)).unwrap();
        assert_eq!(json, serde_json::json!({"timestamp": 2000, "price": 0.52}));
    }
}
