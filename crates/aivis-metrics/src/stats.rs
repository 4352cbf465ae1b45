//! Small numeric helpers. Counts in this crate are bounded by run size, so
//! the `usize → f64` conversions below never lose precision in practice.

/// `part / whole` as a percentage; `0.0` when `whole` is zero.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Population standard deviation.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn std_dev(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

/// Rounds to one decimal place.
#[must_use]
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Gini coefficient of non-negative values; `0.0` for fewer than two values
/// or an all-zero distribution.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn gini(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let total: f64 = values.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }
    let mut abs_diff_sum = 0.0;
    for a in values {
        for b in values {
            abs_diff_sum += (a - b).abs();
        }
    }
    let n = n as f64;
    let mean = total / n;
    abs_diff_sum / (2.0 * n * n * mean)
}

/// Rounds to the nearest integer and clamps into `1..=10`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn score_1_to_10(value: f64) -> u8 {
    value.round().clamp(1.0, 10.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_of_zero_is_zero() {
        assert!(percent(3, 0).abs() < f64::EPSILON);
        assert!((percent(1, 4) - 25.0).abs() < 1e-9);
    }

    #[test]
    fn gini_of_equal_shares_is_zero() {
        assert!(gini(&[0.25, 0.25, 0.25, 0.25]).abs() < 1e-9);
    }

    #[test]
    fn gini_of_monopoly_is_max() {
        // Max Gini for n values is (n-1)/n.
        let g = gini(&[1.0, 0.0, 0.0, 0.0]);
        assert!((g - 0.75).abs() < 1e-9, "got {g}");
    }

    #[test]
    fn std_dev_of_constant_is_zero() {
        assert_eq!(std_dev(&[2.0, 2.0, 2.0]), Some(0.0));
        assert_eq!(std_dev(&[]), None);
    }

    #[test]
    fn score_is_clamped() {
        assert_eq!(score_1_to_10(0.2), 1);
        assert_eq!(score_1_to_10(12.0), 10);
        assert_eq!(score_1_to_10(5.5), 6);
    }
}
