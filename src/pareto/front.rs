//! Pareto-front (maximal vector) finders.
//!
//! Each finder returns the non-dominated subset of a candidate index list.
//! They differ only in cost:
//!
//! | Finder | Complexity | Notes |
//! |--------|-----------|-------|
//! | [`front_1d`] | O(n) | single objective only |
//! | [`front_sort_filter`] | O(n log n + n·k) | k = front size |
//! | [`front_kung`] | O(n log n · log n) for d ≤ 3 | divide and conquer |
//! | [`front_best`] | O(k·n) | output-sensitive |
//!
//! All objectives are maximized and compared with [`DEFAULT_TOLERANCE`].
//!
//! # References
//!
//! - Kung, Luccio & Preparata (1975), "On finding the maxima of a set of
//!   vectors", Journal of the ACM 22(4), 469-476
//! - Godfrey, Shipley & Gryz (2007), "Algorithms and analyses for maximal
//!   vector computation", The VLDB Journal 16(1), 5-28

use super::dominance::{dominance_cmp, Dominance};
use crate::math::{float_is_equal, float_is_less, DEFAULT_TOLERANCE};
use std::cmp::Ordering;

/// Front of a single-objective set: every candidate tied with the maximum.
pub fn front_1d<F: AsRef<[f64]>>(fitness: &[F], indices: &[usize]) -> Vec<usize> {
    let max = indices
        .iter()
        .map(|&i| fitness[i].as_ref()[0])
        .fold(f64::NEG_INFINITY, f64::max);

    indices
        .iter()
        .copied()
        .filter(|&i| float_is_equal(max, fitness[i].as_ref()[0], DEFAULT_TOLERANCE))
        .collect()
}

/// Sorts lexicographically descending, then keeps every candidate not
/// dominated by one already kept.
///
/// In descending lexicographic order no candidate can dominate one that
/// precedes it, so a single pass suffices.
pub fn front_sort_filter<F: AsRef<[f64]>>(fitness: &[F], indices: &[usize]) -> Vec<usize> {
    let sorted = lexicographic_desc(fitness, indices);
    let mut front: Vec<usize> = Vec::new();

    for idx in sorted {
        let dominated = front
            .iter()
            .any(|&kept| dominance_cmp(fitness[kept].as_ref(), fitness[idx].as_ref()) == Dominance::Left);
        if !dominated {
            front.push(idx);
        }
    }

    front
}

/// Kung's divide-and-conquer maxima algorithm.
pub fn front_kung<F: AsRef<[f64]>>(fitness: &[F], indices: &[usize]) -> Vec<usize> {
    if indices.is_empty() {
        return Vec::new();
    }
    let sorted = lexicographic_desc(fitness, indices);
    kung_recursive(fitness, &sorted)
}

fn kung_recursive<F: AsRef<[f64]>>(fitness: &[F], sorted: &[usize]) -> Vec<usize> {
    if sorted.len() == 1 {
        return vec![sorted[0]];
    }

    let (top, bottom) = sorted.split_at(sorted.len() / 2);
    let mut front = kung_recursive(fitness, top);
    let bottom_front = kung_recursive(fitness, bottom);
    let top_len = front.len();

    for bad in bottom_front {
        let dominated = front[..top_len]
            .iter()
            .any(|&good| kung_dominated(fitness[bad].as_ref(), fitness[good].as_ref()));
        if !dominated {
            front.push(bad);
        }
    }

    front
}

/// Dominance test for a `bad` candidate that sorts after `good`.
///
/// The sort guarantees `good[0] >= bad[0]`, so the first objective can only
/// decide dominance when all other objectives are tied.
fn kung_dominated(bad: &[f64], good: &[f64]) -> bool {
    let eps = DEFAULT_TOLERANCE;
    let mut good_better = false;

    for (&b, &g) in bad[1..].iter().zip(&good[1..]) {
        if float_is_less(g, b, eps) {
            return false;
        }
        if float_is_less(b, g, eps) {
            good_better = true;
        }
    }

    good_better || float_is_less(bad[0], good[0], eps)
}

/// The BEST algorithm.
///
/// Repeatedly scans the remaining candidates for one that is certainly
/// optimal, discarding everything it dominates along the way. The cost is
/// proportional to the size of the front times the number of candidates.
pub fn front_best<F: AsRef<[f64]>>(fitness: &[F], indices: &[usize]) -> Vec<usize> {
    let f = |i: usize| fitness[i].as_ref();

    let mut idx = indices.to_vec();
    let mut front = Vec::with_capacity(idx.len());
    let mut first = 0;
    let mut last = idx.len();

    while first < last {
        let mut best = first;
        let mut it = first + 1;
        while it < last {
            match dominance_cmp(f(idx[best]), f(idx[it])) {
                Dominance::Left => {
                    // Drop `it`; the element swapped in is examined next.
                    last -= 1;
                    idx.swap(it, last);
                }
                Dominance::Right => {
                    // Drop the old best. It can't go to the back, which is
                    // still unexamined, so it goes to the front.
                    idx.swap(best, first);
                    first += 1;
                    best = it;
                    it += 1;
                }
                Dominance::Neither => it += 1,
            }
        }

        front.push(idx[best]);

        // Candidates before `best` were never compared against it.
        for p in first..best {
            if dominance_cmp(f(idx[best]), f(idx[p])) == Dominance::Left {
                idx.swap(p, first);
                first += 1;
            }
        }

        last -= 1;
        idx.swap(best, last);
    }

    front
}

fn lexicographic_desc<F: AsRef<[f64]>>(fitness: &[F], indices: &[usize]) -> Vec<usize> {
    let mut sorted = indices.to_vec();
    sorted.sort_by(|&a, &b| {
        let (fa, fb) = (fitness[a].as_ref(), fitness[b].as_ref());
        fa.iter()
            .zip(fb)
            .map(|(x, y)| y.total_cmp(x))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
    sorted
}

/// Indices of the non-dominated candidates of the whole set.
///
/// Uses the 1-D shortcut for single-objective sets and Kung's algorithm
/// otherwise. The order of the returned indices is unspecified.
pub fn find_pareto_front<F: AsRef<[f64]>>(fitness: &[F]) -> Vec<usize> {
    let all: Vec<usize> = (0..fitness.len()).collect();
    match fitness.first().map(|f| f.as_ref().len()) {
        None => Vec::new(),
        Some(1) => front_1d(fitness, &all),
        Some(_) => front_kung(fitness, &all),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::AtomicSplitmix64;
    use rand::Rng;

    type Finder = fn(&[Vec<f64>], &[usize]) -> Vec<usize>;

    fn finders() -> [(&'static str, Finder); 3] {
        [
            ("sort_filter", front_sort_filter::<Vec<f64>>),
            ("kung", front_kung::<Vec<f64>>),
            ("best", front_best::<Vec<f64>>),
        ]
    }

    fn sorted(mut v: Vec<usize>) -> Vec<usize> {
        v.sort_unstable();
        v
    }

    fn brute_force(fitness: &[Vec<f64>]) -> Vec<usize> {
        (0..fitness.len())
            .filter(|&i| {
                !(0..fitness.len()).any(|j| dominance_cmp(&fitness[j], &fitness[i]) == Dominance::Left)
            })
            .collect()
    }

    fn grid_points(n: usize, dim: usize, seed: u64) -> Vec<Vec<f64>> {
        // Integer grid values: distinct values are far apart relative to the
        // tolerance, and ties are common.
        let gen = AtomicSplitmix64::new(seed);
        let mut rng = gen.handle();
        (0..n)
            .map(|_| (0..dim).map(|_| rng.random_range(0..10) as f64).collect())
            .collect()
    }

    #[test]
    fn test_1d_keeps_ties() {
        let fmat = vec![vec![1.0], vec![3.0], vec![3.0], vec![2.0]];
        assert_eq!(sorted(front_1d(&fmat, &[0, 1, 2, 3])), vec![1, 2]);
    }

    #[test]
    fn test_simple_front() {
        let fmat = vec![
            vec![1.0, 5.0],
            vec![3.0, 3.0],
            vec![5.0, 1.0],
            vec![2.0, 2.0], // dominated by [1]
        ];
        for (name, finder) in finders() {
            assert_eq!(sorted(finder(&fmat, &[0, 1, 2, 3])), vec![0, 1, 2], "{name}");
        }
    }

    #[test]
    fn test_duplicates_are_all_optimal() {
        let fmat = vec![vec![2.0, 2.0], vec![2.0, 2.0], vec![1.0, 1.0]];
        for (name, finder) in finders() {
            assert_eq!(sorted(finder(&fmat, &[0, 1, 2])), vec![0, 1], "{name}");
        }
    }

    #[test]
    fn test_subset_of_indices() {
        let fmat = vec![vec![9.0, 9.0], vec![1.0, 2.0], vec![2.0, 1.0], vec![0.0, 0.0]];
        for (name, finder) in finders() {
            assert_eq!(sorted(finder(&fmat, &[1, 2, 3])), vec![1, 2], "{name}");
        }
    }

    #[test]
    fn test_finders_match_brute_force() {
        for (dim, seed) in [(2, 1), (3, 2), (4, 3), (5, 4)] {
            let fmat = grid_points(150, dim, seed);
            let all: Vec<usize> = (0..fmat.len()).collect();
            let expected = brute_force(&fmat);
            for (name, finder) in finders() {
                assert_eq!(sorted(finder(&fmat, &all)), expected, "{name}, dim {dim}");
            }
        }
    }

    #[test]
    fn test_find_pareto_front_dispatch() {
        let single = vec![vec![1.0], vec![4.0], vec![4.0]];
        assert_eq!(sorted(find_pareto_front(&single)), vec![1, 2]);

        let multi = vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.0, 0.0]];
        assert_eq!(sorted(find_pareto_front(&multi)), vec![0, 1]);

        let empty: Vec<Vec<f64>> = Vec::new();
        assert!(find_pareto_front(&empty).is_empty());
    }
}
