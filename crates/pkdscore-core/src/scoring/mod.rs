//! Per-source sector normalizers and the score blender.

pub mod blend;
pub mod ceidg;
pub mod gus;
pub mod market;

/// Median of the finite values, `None` when there are none.
pub(crate) fn median(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let mut sorted: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Round half away from zero to two decimal places.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_of_odd_and_even_sets() {
        assert_eq!(median([3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median([4.0, 1.0, 3.0, 2.0]), Some(2.5));
    }

    #[test]
    fn median_skips_non_finite_values() {
        assert_eq!(median([f64::NAN, 5.0, f64::INFINITY]), Some(5.0));
        assert_eq!(median(Vec::<f64>::new()), None);
        assert_eq!(median([f64::NAN]), None);
    }

    #[test]
    fn round2_rounds_to_cents() {
        assert!((round2(12.345_6) - 12.35).abs() < 1e-9);
        assert!((round2(-0.004) - 0.0).abs() < 1e-9);
    }
}
