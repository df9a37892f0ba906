//! Pareto dominance, front extraction and ranking.
//!
//! All routines **maximize** every objective. Fitness matrices are passed
//! as slices of anything that dereferences to `[f64]` (`Vec<f64>`, `&[f64]`,
//! arrays), one row per candidate.
//!
//! # Example
//!
//! ```
//! use u_moea::pareto::{non_dominated_sort_with, SortStrategy};
//!
//! let fitness = vec![
//!     vec![1.0, 4.0],
//!     vec![4.0, 1.0],
//!     vec![2.0, 2.0],
//!     vec![0.5, 0.5],
//! ];
//!
//! let sorted = non_dominated_sort_with(&fitness, SortStrategy::Best);
//! assert_eq!(sorted.fronts, vec![vec![0, 1, 2], vec![3]]);
//! ```
//!
//! # References
//!
//! - Deb, K., Pratap, A., Agarwal, S., & Meyarivan, T. (2002). "A fast and
//!   elitist multiobjective genetic algorithm: NSGA-II". IEEE TEC 6(2), 182-197.
//! - Kung, Luccio & Preparata (1975), "On finding the maxima of a set of vectors".
//! - Godfrey, Shipley & Gryz (2007), "Algorithms and analyses for maximal
//!   vector computation".

mod crowding;
mod dominance;
mod front;
mod sort;

pub use crowding::{crowding_distance, crowding_distance_of};
pub use dominance::{dominance_cmp, dominance_cmp_eps, dominates, Dominance};
pub use front::{find_pareto_front, front_1d, front_best, front_kung, front_sort_filter};
pub use sort::{
    find_partial_front, non_dominated_sort, non_dominated_sort_with, ParetoFronts, PartialFront,
    SortStrategy,
};
