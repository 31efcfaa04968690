//! 응답 크기 제한을 위한 stride 다운샘플링.

use pricefeed_core::PriceSample;

/// `floor(len / max_points)` 간격으로 샘플을 고릅니다.
///
/// 첫 샘플은 항상 포함되고 순서는 유지됩니다. 보간은 하지 않습니다.
/// `len <= max_points`이거나 `max_points == 0`이면 입력을 그대로 반환합니다.
/// 나눗셈을 내림하므로 결과는 `max_points`보다 길 수 있습니다 (최대 `2 * max_points - 1`).
pub fn downsample(samples: Vec<PriceSample>, max_points: usize) -> Vec<PriceSample> {
    if max_points == 0 || samples.len() <= max_points {
        return samples;
    }

    let stride = samples.len() / max_points;
    samples.into_iter().step_by(stride).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn series(len: usize) -> Vec<PriceSample> {
        (0..len)
            .map(|i| PriceSample::new(1_000 + i as i64 * 60_000, 1.0 + i as f64))
            .collect()
    }

    #[test]
    fn test_short_series_unchanged() {
        let input = series(100);
        assert_eq!(downsample(input.clone(), 100), input);
    }

    #[test]
    fn test_zero_max_disables() {
        let input = series(500);
        assert_eq!(downsample(input.clone(), 0), input);
    }

    #[test]
    fn test_250_to_125() {
        let input = series(250);
        let out = downsample(input.clone(), 100);
        assert_eq!(out.len(), 125);
        assert_eq!(out[0], input[0]);
        assert_eq!(out[1], input[2]);
        assert_eq!(out[124], input[248]);
    }

    #[test]
    fn test_exact_multiple() {
        let out = downsample(series(1000), 100);
        assert_eq!(out.len(), 100);
    }

    proptest! {
        #[test]
        fn prop_downsample_keeps_first_and_order(len in 0usize..2000, max in 1usize..300) {
            let input = series(len);
            let out = downsample(input.clone(), max);

            if len <= max {
                prop_assert_eq!(&out, &input);
            } else {
                prop_assert_eq!(out[0], input[0]);
                prop_assert!(out.len() < 2 * max);
                prop_assert!(out.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
            }
        }
    }
}
