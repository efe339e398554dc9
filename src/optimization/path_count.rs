use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of distinct buy/wait strategies over a horizon.
///
/// Exact while it fits in a `u64`, approximate beyond that.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PathCount {
    Exact(u64),
    Approx(f64),
}

impl PathCount {
    /// True if at least `k` strategies exist.
    pub fn covers(&self, k: usize) -> bool {
        match *self {
            PathCount::Exact(n) => n >= k as u64,
            PathCount::Approx(n) => n >= k as f64,
        }
    }
}

/// Count every strategy reaching `num_months`, treating a wait as a
/// one-month step alongside each tenor.
///
/// # Examples
///
/// ```
/// use bond_optimiser::optimization::path_count::{count_paths, PathCount};
///
/// // Tenor 2 over 3 months: w1w1w1, b2w1, w1b2.
/// assert_eq!(count_paths(&[2], 3), PathCount::Exact(3));
/// ```
pub fn count_paths(tenors: &[u32], num_months: usize) -> PathCount {
    let mut steps: Vec<usize> = Vec::with_capacity(tenors.len() + 1);
    steps.push(1);
    steps.extend(tenors.iter().map(|&t| t as usize));

    let mut exact = vec![0u64; num_months + 1];
    exact[0] = 1;

    for month in 1..=num_months {
        for &step in &steps {
            if step > month {
                continue;
            }
            match exact[month].checked_add(exact[month - step]) {
                Some(total) => exact[month] = total,
                None => return count_approx(&steps, num_months, &exact[..month]),
            }
        }
    }

    PathCount::Exact(exact[num_months])
}

/// Continue the count in `f64` from the exact prefix computed so far.
fn count_approx(steps: &[usize], num_months: usize, exact_prefix: &[u64]) -> PathCount {
    let mut approx = vec![0f64; num_months + 1];
    for (month, &count) in exact_prefix.iter().enumerate() {
        approx[month] = count as f64;
    }
    for month in exact_prefix.len()..=num_months {
        for &step in steps {
            if step <= month {
                approx[month] += approx[month - step];
            }
        }
    }
    PathCount::Approx(approx[num_months])
}

/// Format an integer with `,` thousands separators.
fn with_separators(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

impl fmt::Display for PathCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Largest integer an f64 holds exactly.
        const MAX_EXACT_F64: f64 = (1u64 << f64::MANTISSA_DIGITS) as f64;

        match *self {
            PathCount::Exact(n) => write!(f, "{}", with_separators(n)),
            PathCount::Approx(n) if !n.is_finite() => write!(f, "Over {:.3e}", f64::MAX),
            PathCount::Approx(n) if n > MAX_EXACT_F64 => write!(f, "{:.3e}", n),
            PathCount::Approx(n) => write!(f, "{}", with_separators(n as u64)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_monthly_tenor_doubles() {
        assert_eq!(count_paths(&[1], 5), PathCount::Exact(32));
    }

    #[test]
    fn test_mixed_tenors() {
        // f(n) = f(n-1) + f(n-2) + f(n-3)
        assert_eq!(count_paths(&[2, 3], 5), PathCount::Exact(13));
        assert_eq!(count_paths(&[2, 4], 5), PathCount::Exact(10));
    }

    #[test]
    fn test_zero_months_has_one_strategy() {
        assert_eq!(count_paths(&[3], 0), PathCount::Exact(1));
    }

    #[test]
    fn test_overflow_switches_to_approx() {
        // 2^70 does not fit in a u64.
        match count_paths(&[1], 70) {
            PathCount::Approx(n) => assert_eq!(n, 2f64.powi(70)),
            other => panic!("expected approximate count, got {:?}", other),
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(PathCount::Exact(1234567).to_string(), "1,234,567");
        assert_eq!(PathCount::Exact(12).to_string(), "12");
        assert_eq!(PathCount::Approx(2f64.powi(70)).to_string(), "1.181e21");
        assert_eq!(PathCount::Approx(f64::INFINITY).to_string(), "Over 1.798e308");
    }

    #[test]
    fn test_covers() {
        assert!(PathCount::Exact(13).covers(13));
        assert!(!PathCount::Exact(13).covers(14));
        assert!(PathCount::Approx(1e30).covers(usize::MAX));
    }
}
