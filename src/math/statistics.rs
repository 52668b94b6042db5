//! Order statistics and rational approximation helpers

/// Median of a sample, averaging the two middle values for even lengths
///
/// Non-finite values are ignored. Returns `None` when no finite value remains.
pub fn median(values: &[f64]) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        let low = sorted.get(mid - 1)?;
        let high = sorted.get(mid)?;
        Some(f64::midpoint(*low, *high))
    } else {
        sorted.get(mid).copied()
    }
}

/// Closest fraction to `value` with denominator at most `max_denominator`
///
/// Walks the continued fraction expansion and compares the last convergent
/// with the best semiconvergent, so results match the classic
/// `limit_denominator` behavior. Returns (numerator, denominator).
///
/// ```
/// # use photomosaic::math::statistics::limit_denominator;
/// assert_eq!(limit_denominator(0.75, 20), (3, 4));
/// assert_eq!(limit_denominator(16.0 / 9.0, 20), (16, 9));
/// ```
pub fn limit_denominator(value: f64, max_denominator: u64) -> (u64, u64) {
    if !value.is_finite() || value <= 0.0 {
        return (0, 1);
    }
    let max_denominator = max_denominator.max(1);

    // Convergents p/q, seeded with 0/1 and 1/0
    let (mut p0, mut q0, mut p1, mut q1) = (0_u64, 1_u64, 1_u64, 0_u64);
    let mut remainder = value;

    loop {
        let whole = remainder.floor();
        let a = whole as u64;
        let q2 = q0.saturating_add(a.saturating_mul(q1));
        if q2 > max_denominator {
            break;
        }
        (p0, q0, p1, q1) = (p1, q1, p0.saturating_add(a.saturating_mul(p1)), q2);

        let fraction = remainder - whole;
        if fraction < 1e-12 {
            break;
        }
        remainder = 1.0 / fraction;
    }

    if q1 == 0 {
        return (value.round().max(0.0) as u64, 1);
    }

    let k = (max_denominator - q0) / q1;
    let semi = (p0 + k * p1, q0 + k * q1);
    let convergent = (p1, q1);

    let error = |(p, q): (u64, u64)| (p as f64 / q as f64 - value).abs();
    if error(semi) < error(convergent) {
        semi
    } else {
        convergent
    }
}
