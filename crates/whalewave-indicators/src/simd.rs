//! SIMD window kernels.
//!
//! Uses the `wide` crate for portable f64x4 lanes. Bollinger, regression and
//! historical-volatility windows run their inner reductions through here.

use wide::f64x4;

#[inline]
fn lanes(data: &[f64], idx: usize) -> f64x4 {
    f64x4::new([data[idx], data[idx + 1], data[idx + 2], data[idx + 3]])
}

/// Sum of a slice.
pub fn sum_simd(data: &[f64]) -> f64 {
    let chunks = data.len() / 4;
    let mut simd_sum = f64x4::splat(0.0);

    for i in 0..chunks {
        simd_sum += lanes(data, i * 4);
    }

    let mut result = simd_sum.reduce_add();
    for &value in &data[(chunks * 4)..] {
        result += value;
    }

    result
}

/// Sum of squared deviations from `mean`.
pub fn sum_sq_dev_simd(data: &[f64], mean: f64) -> f64 {
    let chunks = data.len() / 4;
    let mean_vec = f64x4::splat(mean);
    let mut simd_sum = f64x4::splat(0.0);

    for i in 0..chunks {
        let diff = lanes(data, i * 4) - mean_vec;
        simd_sum += diff * diff;
    }

    let mut result = simd_sum.reduce_add();
    for &value in &data[(chunks * 4)..] {
        let diff = value - mean;
        result += diff * diff;
    }

    result
}

/// Dot product over the shorter of the two slices.
pub fn dot_product_simd(a: &[f64], b: &[f64]) -> f64 {
    let len = a.len().min(b.len());
    let chunks = len / 4;
    let mut simd_sum = f64x4::splat(0.0);

    for i in 0..chunks {
        simd_sum += lanes(a, i * 4) * lanes(b, i * 4);
    }

    let mut result = simd_sum.reduce_add();
    for i in (chunks * 4)..len {
        result += a[i] * b[i];
    }

    result
}

/// Rolling population standard deviation, 0.0 before the first full window.
pub fn rolling_std_dev_simd(data: &[f64], period: usize) -> Vec<f64> {
    let mut result = vec![0.0; data.len()];
    if period == 0 || data.len() < period {
        return result;
    }

    let period_f64 = period as f64;
    for (offset, window) in data.windows(period).enumerate() {
        let mean = sum_simd(window) / period_f64;
        result[offset + period - 1] = (sum_sq_dev_simd(window, mean) / period_f64).sqrt();
    }

    result
}

/// Minimum and maximum of a slice.
pub fn minmax_simd(data: &[f64]) -> Option<(f64, f64)> {
    if data.is_empty() {
        return None;
    }

    let chunks = data.len() / 4;
    let mut min_vec = f64x4::splat(f64::INFINITY);
    let mut max_vec = f64x4::splat(f64::NEG_INFINITY);

    for i in 0..chunks {
        let values = lanes(data, i * 4);
        min_vec = min_vec.min(values);
        max_vec = max_vec.max(values);
    }

    let mut min = min_vec.to_array().into_iter().fold(f64::INFINITY, f64::min);
    let mut max = max_vec.to_array().into_iter().fold(f64::NEG_INFINITY, f64::max);

    for &value in &data[(chunks * 4)..] {
        min = min.min(value);
        max = max.max(value);
    }

    Some((min, max))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_simd() {
        let data: Vec<f64> = (1..=100).map(|x| x as f64).collect();
        assert!((sum_simd(&data) - 5050.0).abs() < 1e-10);
    }

    #[test]
    fn test_sum_sq_dev_simd() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        // mean 5, squared deviations sum to 32
        assert!((sum_sq_dev_simd(&data, 5.0) - 32.0).abs() < 1e-10);
    }

    #[test]
    fn test_rolling_std_dev_simd() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let result = rolling_std_dev_simd(&data, 8);

        assert_eq!(result.len(), 8);
        assert_eq!(result[6], 0.0);
        assert!((result[7] - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_dot_product_simd() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0];
        let b = [5.0, 6.0, 7.0, 8.0, 1.0];
        // 5 + 12 + 21 + 32 + 5
        assert!((dot_product_simd(&a, &b) - 75.0).abs() < 1e-10);
    }

    #[test]
    fn test_minmax_simd() {
        let data = [5.0, 2.0, 8.0, 1.0, 9.0, 3.0, 7.0, 4.0, 0.5];
        let (min, max) = minmax_simd(&data).unwrap();

        assert!((min - 0.5).abs() < 1e-10);
        assert!((max - 9.0).abs() < 1e-10);
    }

    #[test]
    fn test_empty_data() {
        assert_eq!(sum_simd(&[]), 0.0);
        assert!(rolling_std_dev_simd(&[], 5).is_empty());
        assert!(minmax_simd(&[]).is_none());
    }
}
