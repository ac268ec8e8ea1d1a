#[cfg(test)]
mod tests {
    use super::super::indicators::*;

    // Helper function to create sample price data
    fn sample_prices() -> Vec<f64> {
        vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08,
            45.89, 46.03, 45.61, 46.28, 46.28, 46.00, 46.03, 46.41, 46.22, 45.64,
        ]
    }

    // Falls for `turn` days, then rises steadily
    fn v_shaped(turn: usize, len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| {
                if i < turn {
                    100.0 - i as f64
                } else {
                    100.0 - turn as f64 + 2.0 * (i - turn) as f64
                }
            })
            .collect()
    }

    #[test]
    fn test_sma_basic() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let result = sma(&data, 3);

        assert_eq!(result.len(), 3);
        assert!((result[0] - 2.0).abs() < 0.001); // (1+2+3)/3 = 2
        assert!((result[1] - 3.0).abs() < 0.001); // (2+3+4)/3 = 3
        assert!((result[2] - 4.0).abs() < 0.001); // (3+4+5)/3 = 4
    }

    #[test]
    fn test_sma_insufficient_data() {
        let data = vec![1.0, 2.0];
        let result = sma(&data, 5);

        assert_eq!(result.len(), 0);
    }

    #[test]
    fn test_sma_real_prices() {
        let prices = sample_prices();
        let result = sma(&prices, 5);

        assert!(!result.is_empty());
        // First SMA(5) should be average of first 5 prices
        let expected_first = (44.34 + 44.09 + 44.15 + 43.61 + 44.33) / 5.0;
        assert!((result[0] - expected_first).abs() < 0.01);
    }

    #[test]
    fn test_rolling_mean_is_aligned() {
        let result = rolling_mean(&[1.0, 2.0, 3.0, 4.0], 3);

        assert_eq!(result.len(), 4);
        assert_eq!(result[0], None);
        assert_eq!(result[1], None);
        assert!((result[2].unwrap() - 2.0).abs() < 1e-12);
        assert!((result[3].unwrap() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_ema_is_seeded_by_first_value() {
        let data = vec![22.0, 24.0, 23.0, 25.0, 26.0];
        let result = ema(&data, 3);

        assert_eq!(result.len(), data.len());
        assert_eq!(result[0], 22.0);
        // alpha = 0.5: 22 + 0.5 * (24 - 22) = 23
        assert!((result[1] - 23.0).abs() < 1e-12);
        // 23 + 0.5 * (23 - 23) = 23
        assert!((result[2] - 23.0).abs() < 1e-12);
        assert!((result[3] - 24.0).abs() < 1e-12);
    }

    #[test]
    fn test_ema_empty_data() {
        let data: Vec<f64> = vec![];
        let result = ema(&data, 5);

        assert_eq!(result.len(), 0);
    }

    #[test]
    fn test_ema_increases_with_uptrend() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
        let result = ema(&data, 3);

        // EMA should generally increase with uptrend
        for i in 1..result.len() {
            assert!(result[i] > result[i - 1]);
        }
    }

    #[test]
    fn test_macd_lines_are_aligned() {
        let prices = sample_prices();
        let result = macd(&prices, 12, 26, 9);

        assert_eq!(result.macd_line.len(), prices.len());
        assert_eq!(result.signal_line.len(), prices.len());
        assert_eq!(result.macd_line[0], 0.0);
    }

    #[test]
    fn test_macd_invalid_spans() {
        let result = macd(&sample_prices(), 26, 12, 9);
        assert!(result.macd_line.is_empty());
    }

    #[test]
    fn test_crossed_above_requires_prior_at_or_below() {
        let fast = [Some(1.0), Some(2.0), Some(3.0), Some(1.0), Some(2.5)];
        let slow = [Some(2.0), Some(2.0), Some(2.0), Some(2.0), Some(2.0)];

        // index 1 touches (not above), index 2 crosses, index 4 crosses again
        assert_eq!(crossed_above(&fast, &slow), vec![false, false, true, false, true]);
    }

    #[test]
    fn test_crossed_above_undefined_values() {
        let fast = [Some(1.0), Some(3.0), Some(4.0)];
        let slow = [None, Some(2.0), Some(2.0)];

        assert_eq!(crossed_above(&fast, &slow), vec![false, false, false]);
    }

    #[test]
    fn test_macd_single_upward_crossover() {
        let turn = 60;
        let prices = v_shaped(turn, 150);
        let result = macd(&prices, 12, 26, 9);
        let flags = macd_crossovers(&prices, 12, 26, 9);

        let crossings: Vec<usize> = flags
            .iter()
            .enumerate()
            .filter(|(_, &up)| up)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(crossings.len(), 1);

        let i = crossings[0];
        assert!(i > turn);
        assert!(result.macd_line[i] > result.signal_line[i]);
        assert!(result.macd_line[i - 1] <= result.signal_line[i - 1]);
    }

    #[test]
    fn test_moving_average_crossovers_flat_series() {
        let flags = moving_average_crossovers(&[5.0; 10], 3);
        assert!(flags.iter().all(|&f| !f));
    }
}
