//! Non-dominated sorting and partial-front detection.

use super::dominance::{dominance_cmp, Dominance};
use super::front::{front_1d, front_best, front_kung};

/// Algorithm used by [`non_dominated_sort_with`].
///
/// Every strategy assigns the same ranks to inputs whose distinct objective
/// values differ by more than the comparison tolerance. They differ only in
/// running time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SortStrategy {
    /// Fast non-dominated sort (Deb et al., 2002). O(m·n²) regardless of input.
    #[default]
    Pairwise,

    /// Front peeling with Kung's divide-and-conquer maxima algorithm.
    Kung,

    /// Front peeling with the output-sensitive BEST algorithm.
    ///
    /// Fastest when fronts are small relative to the population.
    Best,

    /// One-dimensional shortcut for single-objective input, Kung otherwise.
    Auto,
}

/// Result of non-dominated sorting.
///
/// Each element of `ranks` corresponds to the Pareto rank of the solution
/// at the same index. Rank 0 is the Pareto front (non-dominated solutions).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParetoFronts {
    /// Pareto rank for each solution (0 = front).
    pub ranks: Vec<usize>,

    /// Indices grouped by front: `fronts[0]` contains rank-0 indices, etc.
    pub fronts: Vec<Vec<usize>>,
}

impl ParetoFronts {
    /// Number of ranked solutions.
    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    /// Returns `true` if nothing was ranked.
    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    /// All indices ordered by rank (front 0 first).
    ///
    /// Positions in this list are the coordinates used by [`PartialFront`].
    pub fn ordered(&self) -> Vec<usize> {
        self.fronts.iter().flatten().copied().collect()
    }

    /// Finds the front straddling `target`; see [`find_partial_front`].
    pub fn partial_front(&self, target: usize) -> PartialFront {
        find_partial_front(&self.fronts, target)
    }
}

/// Boundary of the front that does not fit completely into a population.
///
/// `first..last` are positions in [`ParetoFronts::ordered`]. Every front
/// before `first` fits completely (`first <= target`); the front in
/// `first..last` overflows it (`last > target`). When everything fits,
/// `front` is `None` and `first == last == total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartialFront {
    /// Rank of the partial front, if there is one.
    pub front: Option<usize>,
    /// Position of the first member of the partial front.
    pub first: usize,
    /// Position one past the last member of the partial front.
    pub last: usize,
}

impl PartialFront {
    /// Number of candidates in the partial front.
    pub fn len(&self) -> usize {
        self.last - self.first
    }

    /// Returns `true` if there is no partial front.
    pub fn is_empty(&self) -> bool {
        self.first == self.last
    }
}

/// Finds the first front that would push the population past `target`.
///
/// # Example
///
/// ```
/// use u_moea::pareto::find_partial_front;
///
/// let fronts = vec![vec![0, 1], vec![2, 3, 4], vec![5]];
/// let partial = find_partial_front(&fronts, 4);
/// assert_eq!(partial.front, Some(1));
/// assert_eq!((partial.first, partial.last), (2, 5));
/// ```
pub fn find_partial_front(fronts: &[Vec<usize>], target: usize) -> PartialFront {
    let mut start = 0;
    for (rank, front) in fronts.iter().enumerate() {
        let end = start + front.len();
        if end > target {
            return PartialFront {
                front: Some(rank),
                first: start,
                last: end,
            };
        }
        start = end;
    }
    PartialFront {
        front: None,
        first: start,
        last: start,
    }
}

/// Fast non-dominated sorting.
///
/// Assigns a Pareto rank to each solution based on dominance relationships.
/// All objectives are **maximized**: higher values are better. Values within
/// the comparison tolerance of each other count as equal.
///
/// # Algorithm (Deb et al., 2002)
///
/// 1. For each pair of solutions, determine dominance
/// 2. Solutions dominated by no other belong to front 0 (rank 0)
/// 3. Remove front 0, repeat to find subsequent fronts
///
/// # Complexity
///
/// O(m * n²) where m = number of objectives, n = number of solutions
///
/// # Example
///
/// ```
/// use u_moea::pareto::non_dominated_sort;
///
/// let objectives = vec![
///     vec![5.0, 1.0],  // Solution A
///     vec![3.0, 3.0],  // Solution B
///     vec![1.0, 5.0],  // Solution C
///     vec![2.0, 2.0],  // Solution D, dominated by B
/// ];
///
/// let result = non_dominated_sort(&objectives);
///
/// assert_eq!(result.ranks, vec![0, 0, 0, 1]);
/// ```
pub fn non_dominated_sort<F: AsRef<[f64]>>(objectives: &[F]) -> ParetoFronts {
    let n = objectives.len();
    if n == 0 {
        return ParetoFronts::default();
    }
    if n == 1 {
        return ParetoFronts {
            ranks: vec![0],
            fronts: vec![vec![0]],
        };
    }

    debug_assert!(
        objectives
            .iter()
            .all(|o| o.as_ref().len() == objectives[0].as_ref().len()),
        "all objective vectors must have the same length"
    );

    let mut domination_count = vec![0usize; n];
    let mut dominated_by: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut ranks = vec![0usize; n];
    let mut front_0 = Vec::new();

    for i in 0..n {
        for j in (i + 1)..n {
            match dominance_cmp(objectives[i].as_ref(), objectives[j].as_ref()) {
                Dominance::Left => {
                    dominated_by[i].push(j);
                    domination_count[j] += 1;
                }
                Dominance::Right => {
                    dominated_by[j].push(i);
                    domination_count[i] += 1;
                }
                Dominance::Neither => {}
            }
        }

        // Pairs (k, i) with k < i were counted in earlier iterations.
        if domination_count[i] == 0 {
            front_0.push(i);
        }
    }

    let mut fronts = vec![front_0];
    while let Some(current) = fronts.last() {
        let mut next_front = Vec::new();

        for &i in current {
            for &j in &dominated_by[i] {
                domination_count[j] -= 1;
                if domination_count[j] == 0 {
                    ranks[j] = fronts.len();
                    next_front.push(j);
                }
            }
        }

        if next_front.is_empty() {
            break;
        }
        fronts.push(next_front);
    }

    ParetoFronts { ranks, fronts }
}

/// Non-dominated sorting with an explicit [`SortStrategy`].
///
/// Front-peeling strategies extract the non-dominated set of the remaining
/// candidates, assign it the next rank and repeat. Within each front, indices
/// are returned in ascending order for every strategy.
pub fn non_dominated_sort_with<F: AsRef<[f64]>>(
    objectives: &[F],
    strategy: SortStrategy,
) -> ParetoFronts {
    let dim = objectives.first().map_or(0, |f| f.as_ref().len());

    let mut result = match strategy {
        SortStrategy::Pairwise => non_dominated_sort(objectives),
        SortStrategy::Kung => peel_fronts(objectives, front_kung),
        SortStrategy::Best => peel_fronts(objectives, front_best),
        SortStrategy::Auto if dim == 1 => peel_fronts(objectives, front_1d),
        SortStrategy::Auto => peel_fronts(objectives, front_kung),
    };

    result.fronts.iter_mut().for_each(|f| f.sort_unstable());
    result
}

fn peel_fronts<F: AsRef<[f64]>>(objectives: &[F], finder: fn(&[F], &[usize]) -> Vec<usize>) -> ParetoFronts {
    let n = objectives.len();
    let mut ranks = vec![0usize; n];
    let mut fronts = Vec::new();
    let mut remaining: Vec<usize> = (0..n).collect();
    let mut in_front = vec![false; n];

    while !remaining.is_empty() {
        let front = finder(objectives, &remaining);
        for &i in &front {
            ranks[i] = fronts.len();
            in_front[i] = true;
        }
        remaining.retain(|&i| !in_front[i]);
        fronts.push(front);
    }

    ParetoFronts { ranks, fronts }
}

// ============================================================================
// Tests
// ============================================================================
