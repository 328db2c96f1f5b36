// posefuse_core/src/utils/stats.rs

use num_traits::Float;

/// Median of a sample, averaging the two middle values for even lengths.
///
/// Sorts `values` in place. NaNs sort last, so a few of them only shift the
/// result by a rank. Returns `None` for an empty slice.
pub fn median_in_place<T: Float>(values: &mut [T]) -> Option<T> {
    if values.is_empty() {
        return None;
    }
    values.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or_else(|| nan_last(*a, *b)));

    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        let two = T::one() + T::one();
        Some((values[mid - 1] + values[mid]) / two)
    }
}

/// Median of an iterator of values.
pub fn median<T: Float, I: IntoIterator<Item = T>>(values: I) -> Option<T> {
    let mut buf: Vec<T> = values.into_iter().collect();
    median_in_place(&mut buf)
}

fn nan_last<T: Float>(a: T, b: T) -> std::cmp::Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, false) => std::cmp::Ordering::Greater,
        (false, true) => std::cmp::Ordering::Less,
        _ => std::cmp::Ordering::Equal,
    }
}

/// Clamps the magnitude of `(x, y)` to `max_norm`, rescaling both axes.
pub fn clamp_norm(x: f64, y: f64, max_norm: f64) -> (f64, f64) {
    let norm = x.hypot(y);
    if norm > max_norm && norm > 0.0 {
        let scale = max_norm / norm;
        (x * scale, y * scale)
    } else {
        (x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(vec![3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(vec![4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(Vec::<f64>::new()), None);
    }

    #[test]
    fn test_median_ignores_a_minority_of_outliers() {
        let mut values = vec![2.0_f64; 9];
        values.push(500.0);
        assert_eq!(median(values), Some(2.0));
    }

    #[test]
    fn test_clamp_norm_rescales_proportionally() {
        let (x, y) = clamp_norm(30.0, 40.0, 10.0);
        assert_abs_diff_eq!(x, 6.0, epsilon = 1e-12);
        assert_abs_diff_eq!(y, 8.0, epsilon = 1e-12);

        let (x, y) = clamp_norm(1.0, 1.0, 10.0);
        assert_eq!((x, y), (1.0, 1.0));
    }
}
