//! Reference directions on the unit simplex.
//!
//! Directions are generated with the Das–Dennis construction: every point
//! whose coordinates are multiples of `1/H` and sum to 1, for a division
//! count `H`. With `M` objectives this yields `C(H + M - 1, M - 1)` points,
//! so the count can only approximate a requested population size.
//!
//! | Objectives | H | Directions |
//! |-----------|---|-----------|
//! | 2 | 99 | 100 |
//! | 3 | 12 | 91 |
//! | 5 | 6 | 210 |
//!
//! # References
//!
//! - Das, I. & Dennis, J. E. (1998). "Normal-boundary intersection: A new
//!   method for generating the Pareto surface in nonlinear multicriteria
//!   optimization problems". SIAM J. Optim. 8(3), 631-657.
//! - Deb, K. & Jain, H. (2014). "An evolutionary many-objective optimization
//!   algorithm using reference-point-based nondominated sorting approach".
//!   IEEE TEC 18(4), 577-601.

use crate::error::{MoeaError, Result};

/// Binomial coefficient `C(n, k)`, saturating at `usize::MAX`.
pub fn n_combinations(n: usize, k: usize) -> usize {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut result: usize = 1;
    for i in 0..k {
        // result * (n - i) is always divisible by (i + 1)
        result = match result.checked_mul(n - i) {
            Some(v) => v / (i + 1),
            None => return usize::MAX,
        };
    }
    result
}

/// Number of Das–Dennis points for `dim` objectives and `divisions`.
pub fn reference_count(dim: usize, divisions: usize) -> usize {
    if dim == 0 {
        return 0;
    }
    n_combinations(divisions + dim - 1, dim - 1)
}

/// Division count whose point count is nearest to `target`.
///
/// Ties go to the smaller division count. Never returns less than 1.
pub fn divisions_for(dim: usize, target: usize) -> usize {
    if dim <= 1 {
        return 1;
    }

    let mut h = 1;
    while reference_count(dim, h) < target {
        h += 1;
    }
    if h == 1 {
        return 1;
    }

    let over = reference_count(dim, h) - target;
    let under = target - reference_count(dim, h - 1);
    if under <= over {
        h - 1
    } else {
        h
    }
}

/// All points of the simplex lattice with `divisions` steps per axis.
///
/// Points are emitted in lexicographic order of their coordinates, first
/// coordinate ascending. Returns an empty set when `dim` or `divisions`
/// is zero.
pub fn das_dennis(dim: usize, divisions: usize) -> Vec<Vec<f64>> {
    if dim == 0 || divisions == 0 {
        return Vec::new();
    }

    let mut points = Vec::with_capacity(reference_count(dim, divisions));
    let mut point = vec![0.0_f64; dim];
    das_dennis_recursive(divisions, 0, divisions, &mut point, &mut points);
    points
}

fn das_dennis_recursive(
    divisions: usize,
    depth: usize,
    remaining: usize,
    current: &mut Vec<f64>,
    result: &mut Vec<Vec<f64>>,
) {
    if depth == current.len() - 1 {
        current[depth] = remaining as f64 / divisions as f64;
        result.push(current.clone());
        return;
    }

    for i in 0..=remaining {
        current[depth] = i as f64 / divisions as f64;
        das_dennis_recursive(divisions, depth + 1, remaining - i, current, result);
    }
}

/// Reference directions for a run with `dim` objectives.
///
/// Uses `divisions` when given, otherwise [`divisions_for`] the target
/// population size.
///
/// # Errors
///
/// Returns [`MoeaError::Configuration`] for fewer than two objectives or an
/// explicit division count of zero.
pub fn reference_directions(
    dim: usize,
    target: usize,
    divisions: Option<usize>,
) -> Result<Vec<Vec<f64>>> {
    if dim < 2 {
        return Err(MoeaError::Configuration(format!(
            "reference directions need at least 2 objectives, got {dim}"
        )));
    }
    let h = match divisions {
        Some(0) => {
            return Err(MoeaError::Configuration(
                "division count must be > 0".into(),
            ))
        }
        Some(h) => h,
        None => divisions_for(dim, target),
    };
    Ok(das_dennis(dim, h))
}
