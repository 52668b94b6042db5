//! Tests for the median and rational approximation helpers

#[cfg(test)]
mod tests {
    use photomosaic::math::statistics::{limit_denominator, median};

    // Tests odd-length samples return the middle value
    // Verified by returning the first sorted value
    #[test]
    fn test_median_odd() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
    }

    // Tests even-length samples average the two middle values
    // Verified by returning the upper middle value
    #[test]
    fn test_median_even() {
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
    }

    // Tests non-finite values are ignored and empty input yields None
    // Verified by removing the finiteness filter
    #[test]
    fn test_median_ignores_non_finite() {
        assert_eq!(median(&[f64::NAN, 1.0, f64::INFINITY]), Some(1.0));
        assert_eq!(median(&[]), None);
        assert_eq!(median(&[f64::NAN]), None);
    }

    // Tests common photo aspect ratios are recovered exactly
    // Verified by stopping after the first convergent
    #[test]
    fn test_limit_denominator_exact_ratios() {
        assert_eq!(limit_denominator(0.75, 20), (3, 4));
        assert_eq!(limit_denominator(1.5, 20), (3, 2));
        assert_eq!(limit_denominator(16.0 / 9.0, 20), (16, 9));
        assert_eq!(limit_denominator(1.0, 20), (1, 1));
    }

    // Tests irrational values snap to the best bounded approximation
    // Verified by dropping the semiconvergent comparison
    #[test]
    fn test_limit_denominator_bounded() {
        assert_eq!(limit_denominator(std::f64::consts::PI, 20), (22, 7));
        assert_eq!(limit_denominator(std::f64::consts::SQRT_2, 5), (7, 5));
    }

    // Tests the denominator bound is respected for ratios near a photo aspect
    // Verified by raising the denominator limit inside the function
    #[test]
    fn test_limit_denominator_respects_bound() {
        let (num, den) = limit_denominator(5472.0 / 3648.0 + 0.001, 20);
        assert!(den <= 20);
        assert_eq!((num, den), (3, 2));
    }

    // Tests degenerate input returns a zero fraction
    // Verified by removing the positivity guard
    #[test]
    fn test_limit_denominator_degenerate() {
        assert_eq!(limit_denominator(0.0, 20), (0, 1));
        assert_eq!(limit_denominator(f64::NAN, 20), (0, 1));
    }
}
