use argminmax::ArgMinMax;

/// Largest value in a non-empty slice.
#[inline]
pub(crate) fn get_max(vec: &[f64]) -> f64 {
    let max_index: usize = vec.argmax();
    vec[max_index]
}

/// Smallest value in a non-empty slice.
#[inline]
pub(crate) fn get_min(vec: &[f64]) -> f64 {
    let min_index: usize = vec.argmin();
    vec[min_index]
}

/// Percentage move of `price` relative to `reference` (1.0 == 1%).
#[inline]
pub fn calculate_percent_diff(price: f64, reference: f64) -> f64 {
    if reference == 0.0 {
        return 0.0;
    }
    (price - reference) / reference * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extrema_pick_values_not_positions() {
        let data = [3.0, 7.5, 7.5, -1.0, 2.0];
        assert_eq!(get_max(&data), 7.5);
        assert_eq!(get_min(&data), -1.0);
    }

    #[test]
    fn percent_diff_is_signed() {
        assert!((calculate_percent_diff(101.0, 100.0) - 1.0).abs() < 1e-12);
        assert!((calculate_percent_diff(95.0, 100.0) + 5.0).abs() < 1e-12);
        assert_eq!(calculate_percent_diff(5.0, 0.0), 0.0);
    }
}
