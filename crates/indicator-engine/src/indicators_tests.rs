#[cfg(test)]
mod tests {
    use super::super::indicators::*;
    use chrono::Utc;
    use sentinel_core::Bar;

    // Helper function to create sample price data
    fn sample_prices() -> Vec<f64> {
        vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08,
            45.89, 46.03, 45.61, 46.28, 46.28, 46.00, 46.03, 46.41, 46.22, 45.64,
        ]
    }

    // Helper function to create sample bars with a volume spike at the end
    fn sample_bars(volumes: &[f64]) -> Vec<Bar> {
        volumes
            .iter()
            .enumerate()
            .map(|(i, &volume)| Bar {
                timestamp: Utc::now() - chrono::Duration::days((volumes.len() - i) as i64),
                open: 100.0,
                high: 101.0,
                low: 99.0,
                close: 100.0,
                volume,
            })
            .collect()
    }

    #[test]
    fn test_sma_basic() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let result = sma(&data, 3).unwrap();
        assert!((result - 4.0).abs() < 0.001); // (3+4+5)/3 = 4
    }

    #[test]
    fn test_sma_full_window() {
        let data = vec![2.0, 4.0, 6.0];
        assert!((sma(&data, 3).unwrap() - 4.0).abs() < 0.001);
    }

    #[test]
    fn test_sma_insufficient_data() {
        let data = vec![1.0, 2.0];
        assert_eq!(sma(&data, 3), None);
        assert_eq!(sma(&data, 0), None);
    }

    #[test]
    fn test_ema_seeded_with_sma() {
        let data = vec![10.0, 10.0, 10.0, 10.0];
        // Constant series: EMA equals the constant.
        assert!((ema(&data, 3).unwrap() - 10.0).abs() < 0.001);
    }

    #[test]
    fn test_ema_tracks_recent_values() {
        let data: Vec<f64> = (1..=30).map(|i| i as f64).collect();
        let ema_val = ema(&data, 10).unwrap();
        let sma_val = sma(&data, 10).unwrap();
        // Rising series: EMA leans toward the latest values.
        assert!(ema_val > sma_val - 5.0);
        assert!(ema_val < 30.0);
    }

    #[test]
    fn test_ema_insufficient_data() {
        assert_eq!(ema(&[1.0, 2.0], 3), None);
    }

    #[test]
    fn test_rsi_known_series() {
        let rsi_val = rsi(&sample_prices(), 14).unwrap();
        // Classic Wilder example series lands around 66 after smoothing.
        assert!(rsi_val > 50.0 && rsi_val < 80.0, "rsi = {rsi_val}");
    }

    #[test]
    fn test_rsi_all_gains_is_100() {
        let data: Vec<f64> = (1..=20).map(|i| i as f64).collect();
        assert!((rsi(&data, 14).unwrap() - 100.0).abs() < 0.001);
    }

    #[test]
    fn test_rsi_all_losses_is_0() {
        let data: Vec<f64> = (1..=20).rev().map(|i| i as f64).collect();
        assert!(rsi(&data, 14).unwrap() < 0.001);
    }

    #[test]
    fn test_rsi_bounds() {
        let rsi_val = rsi(&sample_prices(), 14).unwrap();
        assert!((0.0..=100.0).contains(&rsi_val));
    }

    #[test]
    fn test_rsi_insufficient_data() {
        // Needs period + 1 closes for the first average.
        let data: Vec<f64> = (1..=14).map(|i| i as f64).collect();
        assert_eq!(rsi(&data, 14), None);
    }

    #[test]
    fn test_macd_uptrend_is_bullish() {
        let data: Vec<f64> = (0..60).map(|i| 100.0 * 1.01f64.powi(i)).collect();
        let result = macd(&data, 12, 26, 9).unwrap();
        assert!(result.macd > 0.0);
        assert!(result.bullish);
    }

    #[test]
    fn test_macd_accelerating_decline_is_bearish() {
        // The drop steepens over time, so the MACD line keeps falling
        // away from its signal.
        let data: Vec<f64> = (0..60).map(|i| 200.0 - 0.02 * (i * i) as f64).collect();
        let result = macd(&data, 12, 26, 9).unwrap();
        assert!(result.macd < 0.0);
        assert!(!result.bullish);
    }

    #[test]
    fn test_macd_insufficient_data() {
        // 26 + 9 = 35 closes minimum.
        let data: Vec<f64> = (0..34).map(|i| i as f64).collect();
        assert_eq!(macd(&data, 12, 26, 9), None);
    }

    #[test]
    fn test_macd_rejects_inverted_windows() {
        let data: Vec<f64> = (0..60).map(|i| i as f64).collect();
        assert_eq!(macd(&data, 26, 12, 9), None);
    }

    #[test]
    fn test_bollinger_band_ordering() {
        let bands = bollinger(&sample_prices(), 20, 2.0).unwrap();
        assert!(bands.upper > bands.middle);
        assert!(bands.middle > bands.lower);
    }

    #[test]
    fn test_bollinger_percent_b_within_bands() {
        let bands = bollinger(&sample_prices(), 20, 2.0).unwrap();
        assert!((0.0..=1.0).contains(&bands.percent_b));
    }

    #[test]
    fn test_bollinger_flat_series_collapses() {
        let data = vec![50.0; 25];
        let bands = bollinger(&data, 20, 2.0).unwrap();
        assert!((bands.upper - bands.lower).abs() < 0.001);
        assert!((bands.percent_b - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_bollinger_insufficient_data() {
        assert_eq!(bollinger(&[1.0, 2.0, 3.0], 20, 2.0), None);
    }

    #[test]
    fn test_volume_variation_spike() {
        let mut volumes = vec![1_000_000.0; 30];
        volumes.push(2_000_000.0);
        let bars = sample_bars(&volumes);
        let variation = volume_variation(&bars, 30).unwrap();
        // Last bar doubles the recent average, which itself includes the spike.
        assert!(variation > 80.0 && variation < 100.0, "variation = {variation}");
    }

    #[test]
    fn test_volume_variation_flat() {
        let bars = sample_bars(&vec![1_000_000.0; 35]);
        let variation = volume_variation(&bars, 30).unwrap();
        assert!(variation.abs() < 0.001);
    }

    #[test]
    fn test_volume_variation_zero_average() {
        let bars = sample_bars(&vec![0.0; 35]);
        assert_eq!(volume_variation(&bars, 30), None);
    }

    #[test]
    fn test_volume_variation_insufficient_data() {
        let bars = sample_bars(&vec![1_000_000.0; 10]);
        assert_eq!(volume_variation(&bars, 30), None);
    }
}
