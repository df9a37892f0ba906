//! Crowding distance (Deb et al., 2002).

/// Computes crowding distance for every solution of a single front.
///
/// Crowding distance measures how isolated a solution is within its front.
/// Solutions at the boundaries receive `f64::INFINITY`. Interior solutions
/// receive a finite distance based on the normalized objective-space gap
/// between their neighbors.
///
/// # Arguments
///
/// * `objectives` - Objective vectors for solutions in the same front
///
/// # Returns
///
/// Crowding distance for each solution (same order as input).
/// Larger values indicate more isolated (preferred) solutions.
pub fn crowding_distance<F: AsRef<[f64]>>(objectives: &[F]) -> Vec<f64> {
    let all: Vec<usize> = (0..objectives.len()).collect();
    crowding_distance_of(objectives, &all)
}

/// Crowding distance of the members of `front`, indexing into `objectives`.
///
/// The result is aligned with `front`, not with `objectives`.
pub fn crowding_distance_of<F: AsRef<[f64]>>(objectives: &[F], front: &[usize]) -> Vec<f64> {
    let n = front.len();
    if n <= 2 {
        return vec![f64::INFINITY; n];
    }

    let m = objectives[front[0]].as_ref().len();
    let value = |pos: usize, obj: usize| objectives[front[pos]].as_ref()[obj];
    let mut distances = vec![0.0f64; n];

    for obj_idx in 0..m {
        // Positions within `front`, sorted by this objective
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| value(a, obj_idx).total_cmp(&value(b, obj_idx)));

        // Boundary solutions get infinity
        distances[order[0]] = f64::INFINITY;
        distances[order[n - 1]] = f64::INFINITY;

        // Objective range for normalization
        let min_val = value(order[0], obj_idx);
        let max_val = value(order[n - 1], obj_idx);
        let range = max_val - min_val;

        if range > 0.0 {
            for i in 1..(n - 1) {
                let prev = value(order[i - 1], obj_idx);
                let next = value(order[i + 1], obj_idx);
                distances[order[i]] += (next - prev) / range;
            }
        }
    }

    distances
}
