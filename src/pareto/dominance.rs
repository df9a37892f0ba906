//! Tolerant Pareto dominance (maximization).

use crate::math::{float_is_less, DEFAULT_TOLERANCE};

/// Dominance comparison result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dominance {
    /// Left dominates right.
    Left,
    /// Right dominates left.
    Right,
    /// Neither dominates the other.
    Neither,
}

/// Compares two fitness vectors for Pareto dominance, **maximizing** every objective.
///
/// A component only counts as better when it exceeds the other by more than
/// `eps` (see [`float_is_less`]), so vectors that differ by rounding noise
/// never dominate each other.
///
/// # Example
///
/// ```
/// use u_moea::pareto::{dominance_cmp_eps, Dominance};
///
/// assert_eq!(dominance_cmp_eps(&[2.0, 2.0], &[1.0, 2.0], 1e-10), Dominance::Left);
/// assert_eq!(dominance_cmp_eps(&[1.0, 2.0], &[1.0, 2.0 + 1e-13], 1e-10), Dominance::Neither);
/// ```
pub fn dominance_cmp_eps(a: &[f64], b: &[f64], eps: f64) -> Dominance {
    debug_assert_eq!(a.len(), b.len());

    let mut a_better_in_some = false;
    let mut b_better_in_some = false;

    for (&va, &vb) in a.iter().zip(b.iter()) {
        if float_is_less(vb, va, eps) {
            a_better_in_some = true;
        } else if float_is_less(va, vb, eps) {
            b_better_in_some = true;
        }
        if a_better_in_some && b_better_in_some {
            return Dominance::Neither;
        }
    }

    match (a_better_in_some, b_better_in_some) {
        (true, false) => Dominance::Left,
        (false, true) => Dominance::Right,
        _ => Dominance::Neither,
    }
}

/// [`dominance_cmp_eps`] with [`DEFAULT_TOLERANCE`].
pub fn dominance_cmp(a: &[f64], b: &[f64]) -> Dominance {
    dominance_cmp_eps(a, b, DEFAULT_TOLERANCE)
}

/// Returns `true` if `a` dominates `b`.
pub fn dominates(a: &[f64], b: &[f64]) -> bool {
    dominance_cmp(a, b) == Dominance::Left
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_dominance() {
        assert_eq!(dominance_cmp(&[3.0, 3.0], &[1.0, 1.0]), Dominance::Left);
        assert_eq!(dominance_cmp(&[1.0, 1.0], &[3.0, 3.0]), Dominance::Right);
    }

    #[test]
    fn test_weak_dominance_counts() {
        // Equal in one objective, better in the other.
        assert!(dominates(&[2.0, 5.0], &[2.0, 4.0]));
    }

    #[test]
    fn test_trade_off_is_neither() {
        assert_eq!(dominance_cmp(&[1.0, 5.0], &[5.0, 1.0]), Dominance::Neither);
    }

    #[test]
    fn test_equal_is_neither() {
        assert_eq!(dominance_cmp(&[2.0, 2.0], &[2.0, 2.0]), Dominance::Neither);
    }

    #[test]
    fn test_noise_is_ignored() {
        let a = [0.1 + 0.2, 1.0];
        let b = [0.3, 1.0];
        assert_eq!(dominance_cmp(&a, &b), Dominance::Neither);
    }

    #[test]
    fn test_zero_uses_absolute_tolerance() {
        assert_eq!(dominance_cmp(&[0.0, 1.0], &[1e-12, 1.0]), Dominance::Neither);
        assert_eq!(dominance_cmp(&[0.0, 1.0], &[1e-3, 1.0]), Dominance::Right);
    }
}
