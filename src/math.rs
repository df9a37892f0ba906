//! Small numeric helpers on objective vectors.
//!
//! Equality and ordering of fitness values go through [`float_is_equal`] and
//! [`float_is_less`] so that floating-point noise does not make candidates
//! flip between fronts from one generation to the next.

/// Default relative tolerance for comparing objective values.
pub const DEFAULT_TOLERANCE: f64 = 1e-10;

/// Returns `true` if `lhs` and `rhs` are equal within `eps`.
///
/// The comparison is relative to the larger magnitude, except when either
/// side is exactly zero, where `eps` is used as an absolute bound.
pub fn float_is_equal(lhs: f64, rhs: f64, eps: f64) -> bool {
    debug_assert!((0.0..=1.0).contains(&eps));

    if lhs == 0.0 || rhs == 0.0 {
        (lhs - rhs).abs() <= eps
    } else {
        (lhs - rhs).abs() <= lhs.abs().max(rhs.abs()) * eps
    }
}

/// Returns `true` if `lhs` is smaller than `rhs` by more than `eps`.
///
/// Uses the same relative/absolute rule as [`float_is_equal`], so two values
/// are always exactly one of: equal, less, or greater.
pub fn float_is_less(lhs: f64, rhs: f64, eps: f64) -> bool {
    debug_assert!((0.0..=1.0).contains(&eps));

    let tolerance = if lhs == 0.0 || rhs == 0.0 {
        eps
    } else {
        lhs.abs().max(rhs.abs()) * eps
    };
    (rhs - lhs) > tolerance
}

/// Inner product of two equal-length vectors.
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Euclidean norm.
pub fn norm(v: &[f64]) -> f64 {
    dot(v, v).sqrt()
}

/// Squared Euclidean distance.
pub fn euclidean_distance_sq(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Squared distance from `point` to the line through the origin along `line`.
///
/// `line` does not need to be normalized but must be non-zero.
pub fn perpendicular_distance_sq(line: &[f64], point: &[f64]) -> f64 {
    debug_assert_eq!(line.len(), point.len());
    debug_assert!(!line.is_empty());

    let k = dot(line, point) / dot(line, line);

    line.iter()
        .zip(point)
        .map(|(&l, &p)| (p - k * l) * (p - k * l))
        .sum()
}

/// Scales `v` to unit length. Zero vectors are returned unchanged.
pub fn normalized(mut v: Vec<f64>) -> Vec<f64> {
    let n = norm(&v);
    if n > 0.0 {
        v.iter_mut().for_each(|x| *x /= n);
    }
    v
}

/// Component-wise maximum, written into `acc`.
pub fn elementwise_max(acc: &mut [f64], other: &[f64]) {
    debug_assert_eq!(acc.len(), other.len());
    for (a, &b) in acc.iter_mut().zip(other) {
        *a = a.max(b);
    }
}

/// Component-wise minimum, written into `acc`.
pub fn elementwise_min(acc: &mut [f64], other: &[f64]) {
    debug_assert_eq!(acc.len(), other.len());
    for (a, &b) in acc.iter_mut().zip(other) {
        *a = a.min(b);
    }
}

/// Component-wise maximum over a non-empty set of vectors.
pub fn max_fitness<F: AsRef<[f64]>>(fitness: &[F]) -> Vec<f64> {
    let mut iter = fitness.iter();
    let mut acc = iter
        .next()
        .map(|f| f.as_ref().to_vec())
        .unwrap_or_default();
    for f in iter {
        elementwise_max(&mut acc, f.as_ref());
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_is_equal_relative() {
        assert!(float_is_equal(1.0, 1.0 + 1e-12, 1e-10));
        assert!(!float_is_equal(1.0, 1.001, 1e-10));
        assert!(float_is_equal(1e6, 1e6 + 1e-5, 1e-10));
    }

    #[test]
    fn test_float_is_equal_zero_is_absolute() {
        assert!(float_is_equal(0.0, 1e-11, 1e-10));
        assert!(!float_is_equal(0.0, 1e-9, 1e-10));
    }

    #[test]
    fn test_float_is_less() {
        assert!(float_is_less(1.0, 2.0, 1e-10));
        assert!(!float_is_less(2.0, 1.0, 1e-10));
        assert!(!float_is_less(1.0, 1.0 + 1e-12, 1e-10));
    }

    #[test]
    fn test_perpendicular_distance() {
        // Point (1, 1) to the x axis: distance 1.
        assert!((perpendicular_distance_sq(&[1.0, 0.0], &[1.0, 1.0]) - 1.0).abs() < 1e-12);
        // Point on the line: zero.
        assert!(perpendicular_distance_sq(&[2.0, 2.0], &[0.5, 0.5]).abs() < 1e-12);
    }

    #[test]
    fn test_perpendicular_distance_is_scale_invariant_in_line() {
        let p = [0.3, 0.9, 0.1];
        let d1 = perpendicular_distance_sq(&[1.0, 2.0, 3.0], &p);
        let d2 = perpendicular_distance_sq(&[10.0, 20.0, 30.0], &p);
        assert!((d1 - d2).abs() < 1e-12);
    }

    #[test]
    fn test_normalized() {
        let v = normalized(vec![3.0, 4.0]);
        assert!((v[0] - 0.6).abs() < 1e-12);
        assert!((v[1] - 0.8).abs() < 1e-12);
        assert_eq!(normalized(vec![0.0, 0.0]), vec![0.0, 0.0]);
    }

    #[test]
    fn test_max_fitness() {
        let fmat = vec![vec![1.0, 5.0], vec![3.0, 2.0], vec![2.0, 4.0]];
        assert_eq!(max_fitness(&fmat), vec![3.0, 5.0]);
    }
}
