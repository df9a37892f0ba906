//! NSGA-III survivor selection with reference-direction niching.
//!
//! Every generation the combined parent and child population is sorted into
//! Pareto fronts. Complete fronts survive as a whole. The front that does
//! not fit is thinned by niching: each candidate is associated with its
//! closest reference direction, and candidates of the least crowded
//! directions are admitted first.
//!
//! Association normalizes each candidate by the running ideal and nadir
//! estimates and looks the result up in a [`ConeTree`] over the reference
//! directions, so a lookup does not scan every direction.
//!
//! Parent selection uses the U-NSGA-III niched tournament: two candidates
//! sharing a reference direction are compared by rank, then by distance to
//! the direction; candidates of different directions are picked by a fair
//! coin flip.
//!
//! # References
//!
//! - Deb, K. & Jain, H. (2014). "An evolutionary many-objective optimization
//!   algorithm using reference-point-based nondominated sorting approach,
//!   part I". IEEE TEC 18(4), 577-601.
//! - Seada, H. & Deb, K. (2016). "A unified evolutionary optimization
//!   procedure for single, multiple, and many objectives". IEEE TEC 20(3),
//!   358-369.

use log::{debug, trace, warn};
use rand::Rng;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::config::PolicyConfig;
use super::SelectionPolicy;
use crate::cone_tree::ConeTree;
use crate::error::{check_dimensions, MoeaError, Result};
use crate::math::{elementwise_max, elementwise_min, max_fitness, normalized, perpendicular_distance_sq};
use crate::pareto::non_dominated_sort_with;
use crate::random::{self, AtomicSplitmix64};
use crate::reference::{divisions_for, reference_directions};

/// Off-axis weight of the achievement scalarization used for extreme points.
const ASF_OFF_AXIS_WEIGHT: f64 = 1e-6;

/// Lower bound on the ideal-nadir span of an axis during normalization.
const NORMALIZATION_FLOOR: f64 = 1e-6;

/// Per-candidate association with a reference direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateInfo {
    /// Pareto rank (0 = non-dominated).
    pub rank: usize,
    /// Position of the associated direction in [`Nsga3::reference_directions`].
    pub ref_idx: usize,
    /// Squared perpendicular distance to the associated direction.
    pub ref_dist: f64,
}

impl Default for CandidateInfo {
    fn default() -> Self {
        Self {
            rank: 0,
            ref_idx: 0,
            ref_dist: f64::INFINITY,
        }
    }
}

/// Run state created by `initialize`.
#[derive(Debug)]
struct State {
    ideal: Vec<f64>,
    nadir: Vec<f64>,
    extremes: Vec<Vec<f64>>,
    refs: ConeTree,
    niche_counts: Vec<usize>,
    info: Vec<CandidateInfo>,
}

impl State {
    fn dim(&self) -> usize {
        self.ideal.len()
    }

    fn update_ideal_point<F: AsRef<[f64]>>(&mut self, fitness: &[F]) {
        elementwise_max(&mut self.ideal, &max_fitness(fitness));
    }

    /// Replaces every extreme point by the candidate (or previous extreme
    /// point) with the lowest axis-biased scalarized distance to the ideal.
    fn update_extreme_points<F: AsRef<[f64]>>(&mut self, fitness: &[F]) {
        let dim = self.dim();

        let extremes = (0..dim)
            .map(|axis| {
                let weights = weight_vector(dim, axis);
                let mut best: Option<(&[f64], f64)> = None;

                let candidates = fitness
                    .iter()
                    .map(|f| f.as_ref())
                    .chain(self.extremes.iter().map(Vec::as_slice));
                for f in candidates {
                    let d = achievement_scalarization(&self.ideal, &weights, f);
                    if best.map_or(true, |(_, best_d)| d < best_d) {
                        best = Some((f, d));
                    }
                }
                best.map_or_else(|| self.ideal.clone(), |(f, _)| f.to_vec())
            })
            .collect();

        self.extremes = extremes;
    }

    fn update_nadir_point(&mut self) {
        let mut iter = self.extremes.iter();
        if let Some(first) = iter.next() {
            let mut nadir = first.clone();
            for p in iter {
                elementwise_min(&mut nadir, p);
            }
            self.nadir = nadir;
        }
    }

    fn update_estimates<F: AsRef<[f64]>>(&mut self, fitness: &[F]) {
        self.update_ideal_point(fitness);
        self.update_extreme_points(fitness);
        self.update_nadir_point();
    }

    fn normalize(&self, f: &[f64]) -> Vec<f64> {
        self.ideal
            .iter()
            .zip(&self.nadir)
            .zip(f)
            .map(|((&ideal, &nadir), &v)| (ideal - v) / (ideal - nadir).max(NORMALIZATION_FLOOR))
            .collect()
    }

    /// Closest reference direction of one candidate and its squared distance.
    fn associate_one(&self, f: &[f64]) -> (usize, f64) {
        let fnorm = self.normalize(f);
        let best = self.refs.find_best_match(&fnorm);
        let dist = perpendicular_distance_sq(&self.refs.points()[best.index], &fnorm);
        (best.index, dist)
    }

    fn associate<F: AsRef<[f64]> + Sync>(
        &self,
        fitness: &[F],
        candidates: &[usize],
        info: &mut [CandidateInfo],
        parallel: bool,
    ) {
        let links = map_candidates(candidates, parallel, |i| self.associate_one(fitness[i].as_ref()));

        for (&i, (ref_idx, ref_dist)) in candidates.iter().zip(links) {
            info[i].ref_idx = ref_idx;
            info[i].ref_dist = ref_dist;
        }
    }

    /// Recounts niches from scratch over `members`.
    fn recalc_niche_counts(&mut self, info: &[CandidateInfo], members: &[usize]) -> Result<()> {
        self.niche_counts.iter_mut().for_each(|c| *c = 0);
        for &i in members {
            self.niche_counts[info[i].ref_idx] += 1;
        }

        let total: usize = self.niche_counts.iter().sum();
        if total != members.len() {
            return Err(MoeaError::invariant(format!(
                "niche counts sum to {total} after recounting {} candidates",
                members.len()
            )));
        }
        Ok(())
    }

    /// U-NSGA-III comparison: returns `true` if `lhs` is preferred.
    fn niched_compare(&self, lhs: usize, rhs: usize, rng: &AtomicSplitmix64) -> bool {
        let (l, r) = (&self.info[lhs], &self.info[rhs]);
        if l.ref_idx == r.ref_idx {
            if l.rank != r.rank {
                l.rank < r.rank
            } else {
                l.ref_dist < r.ref_dist
            }
        } else {
            rng.next_bool()
        }
    }
}

fn weight_vector(dim: usize, axis: usize) -> Vec<f64> {
    let mut weights = vec![ASF_OFF_AXIS_WEIGHT; dim];
    weights[axis] = 1.0;
    weights
}

fn achievement_scalarization(ideal: &[f64], weights: &[f64], f: &[f64]) -> f64 {
    ideal
        .iter()
        .zip(weights)
        .zip(f)
        .map(|((&z, &w), &v)| (z - v) / w)
        .fold(f64::NEG_INFINITY, f64::max)
}

#[cfg(feature = "parallel")]
fn map_candidates<T, M>(candidates: &[usize], parallel: bool, op: M) -> Vec<T>
where
    T: Send,
    M: Fn(usize) -> T + Sync + Send,
{
    if parallel {
        candidates.par_iter().map(|&i| op(i)).collect()
    } else {
        candidates.iter().map(|&i| op(i)).collect()
    }
}

#[cfg(not(feature = "parallel"))]
fn map_candidates<T, M>(candidates: &[usize], _parallel: bool, op: M) -> Vec<T>
where
    M: Fn(usize) -> T,
{
    candidates.iter().map(|&i| op(i)).collect()
}

/// NSGA-III selection policy.
///
/// The per-run state is created by [`initialize`](SelectionPolicy::initialize)
/// and owned exclusively by this value. The type is deliberately not `Clone`.
///
/// # Example
///
/// ```
/// use u_moea::policy::{Nsga3, PolicyConfig, SelectionPolicy};
///
/// let config = PolicyConfig::for_population(4).with_seed(1).with_divisions(3);
/// let mut nsga3 = Nsga3::new(config).unwrap();
///
/// let parents = vec![vec![1.0, 0.0], vec![0.7, 0.3], vec![0.3, 0.7], vec![0.0, 1.0]];
/// nsga3.initialize(&parents).unwrap();
///
/// let children = vec![vec![0.5, 0.5], vec![0.1, 0.1], vec![0.2, 0.2], vec![0.9, 0.05]];
/// let survivors = nsga3.next_population(&parents, &children).unwrap();
/// assert_eq!(survivors.len(), 4);
/// ```
#[derive(Debug)]
pub struct Nsga3 {
    config: PolicyConfig,
    rng: AtomicSplitmix64,
    state: Option<State>,
}

impl Nsga3 {
    /// Creates an uninitialized policy.
    ///
    /// # Errors
    /// Returns [`MoeaError::Configuration`] if `config` is invalid.
    pub fn new(config: PolicyConfig) -> Result<Self> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(random::next_seed);
        Ok(Self {
            config,
            rng: AtomicSplitmix64::new(seed),
            state: None,
        })
    }

    /// The configuration this policy was created with.
    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Returns `true` once `initialize` has succeeded.
    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// Current ideal point estimate.
    pub fn ideal_point(&self) -> Option<&[f64]> {
        self.state.as_ref().map(|s| s.ideal.as_slice())
    }

    /// Current nadir point estimate.
    pub fn nadir_point(&self) -> Option<&[f64]> {
        self.state.as_ref().map(|s| s.nadir.as_slice())
    }

    /// Current extreme points, one per objective.
    pub fn extreme_points(&self) -> Option<&[Vec<f64>]> {
        self.state.as_ref().map(|s| s.extremes.as_slice())
    }

    /// Unit reference directions, in the order used by [`CandidateInfo::ref_idx`].
    pub fn reference_directions(&self) -> Option<&[Vec<f64>]> {
        self.state.as_ref().map(|s| s.refs.points())
    }

    /// Niche count of each reference direction.
    pub fn niche_counts(&self) -> Option<&[usize]> {
        self.state.as_ref().map(|s| s.niche_counts.as_slice())
    }

    /// Association of every member of the current population.
    pub fn associations(&self) -> Option<&[CandidateInfo]> {
        self.state.as_ref().map(|s| s.info.as_slice())
    }

    fn state(&self) -> Result<&State> {
        self.state.as_ref().ok_or(MoeaError::NotInitialized)
    }
}

impl SelectionPolicy for Nsga3 {
    fn initialize(&mut self, fitness: &[Vec<f64>]) -> Result<()> {
        let pop_size = self.config.population_size;
        let dim = check_dimensions(fitness)?;
        if dim < 2 {
            return Err(MoeaError::Configuration(format!(
                "NSGA-III needs at least 2 objectives, got {dim}"
            )));
        }
        if fitness.len() != pop_size {
            return Err(MoeaError::Configuration(format!(
                "initial population has {} candidates, expected {pop_size}",
                fitness.len()
            )));
        }

        let divisions = self
            .config
            .n_divisions
            .unwrap_or_else(|| divisions_for(dim, pop_size));
        let directions = reference_directions(dim, pop_size, Some(divisions))?;
        debug!(
            "NSGA-III: {dim} objectives, {divisions} divisions, {} reference directions, population {pop_size}",
            directions.len()
        );
        if directions.len() > 2 * pop_size || 2 * directions.len() < pop_size {
            warn!(
                "NSGA-III: {} reference directions for a population of {pop_size}",
                directions.len()
            );
        }

        let refs = ConeTree::new(directions.into_iter().map(normalized).collect())?;
        let mut state = State {
            ideal: max_fitness(fitness),
            nadir: Vec::new(),
            extremes: Vec::new(),
            niche_counts: vec![0; refs.len()],
            refs,
            info: Vec::new(),
        };

        let sorted = non_dominated_sort_with(fitness, self.config.sort_strategy);
        let order = sorted.ordered();

        state.update_estimates(fitness);

        let mut info: Vec<CandidateInfo> = sorted
            .ranks
            .iter()
            .map(|&rank| CandidateInfo {
                rank,
                ..CandidateInfo::default()
            })
            .collect();
        state.associate(fitness, &order, &mut info, self.config.parallel);
        state.recalc_niche_counts(&info, &order)?;
        state.info = info;

        self.state = Some(state);
        Ok(())
    }

    fn prepare_selections(&mut self, _fitness: &[Vec<f64>]) -> Result<()> {
        // Associations are already current after initialize/next_population.
        self.state().map(|_| ())
    }

    fn select(&self, fitness: &[Vec<f64>]) -> Result<usize> {
        let state = self.state()?;
        let n = state.info.len();
        if fitness.len() != n {
            return Err(MoeaError::Configuration(format!(
                "selecting from {} candidates, population has {n}",
                fitness.len()
            )));
        }

        let mut rng = self.rng.handle();
        let idx1 = rng.random_range(0..n);
        let idx2 = rng.random_range(0..n);

        Ok(if state.niched_compare(idx1, idx2, &self.rng) {
            idx1
        } else {
            idx2
        })
    }

    fn next_population(&mut self, parents: &[Vec<f64>], children: &[Vec<f64>]) -> Result<Vec<usize>> {
        let Self { config, rng, state } = self;
        let state = state.as_mut().ok_or(MoeaError::NotInitialized)?;
        let pop_size = config.population_size;

        if parents.len() != pop_size {
            return Err(MoeaError::Configuration(format!(
                "got {} parents, expected {pop_size}",
                parents.len()
            )));
        }
        let combined: Vec<&[f64]> = parents.iter().chain(children).map(Vec::as_slice).collect();
        let dim = check_dimensions(&combined)?;
        if dim != state.dim() {
            return Err(MoeaError::DimensionMismatch {
                index: 0,
                expected: state.dim(),
                found: dim,
            });
        }

        let sorted = non_dominated_sort_with(&combined, config.sort_strategy);
        let order = sorted.ordered();
        let partial = sorted.partial_front(pop_size);

        state.update_estimates(&combined);

        let mut info: Vec<CandidateInfo> = sorted
            .ranks
            .iter()
            .map(|&rank| CandidateInfo {
                rank,
                ..CandidateInfo::default()
            })
            .collect();

        // Candidates after the partial front can never survive.
        state.associate(&combined, &order[..partial.last], &mut info, config.parallel);
        state.recalc_niche_counts(&info, &order[..partial.first])?;

        let mut survivors: Vec<usize> = Vec::with_capacity(pop_size);
        survivors.extend_from_slice(&order[..partial.first]);

        let mut remaining: Vec<usize> = order[partial.first..partial.last].to_vec();
        let mut pool: Vec<usize> = remaining.iter().map(|&i| info[i].ref_idx).collect();
        pool.sort_unstable();
        pool.dedup();
        pool.sort_by_key(|&r| state.niche_counts[r]);

        while survivors.len() < pop_size {
            let Some(&first_ref) = pool.first() else {
                return Err(MoeaError::invariant(format!(
                    "reference pool exhausted with {} of {pop_size} survivors",
                    survivors.len()
                )));
            };

            // Uniform choice among the least crowded directions.
            let min_count = state.niche_counts[first_ref];
            let n_minimal = pool
                .iter()
                .position(|&r| state.niche_counts[r] != min_count)
                .unwrap_or(pool.len());
            let pos = rng.handle().random_range(0..n_minimal);
            let ref_idx = pool[pos];

            let mut n_candidates = 0;
            let mut closest: Option<usize> = None;
            for (k, &i) in remaining.iter().enumerate() {
                if info[i].ref_idx != ref_idx {
                    continue;
                }
                n_candidates += 1;
                if closest.map_or(true, |c| info[i].ref_dist < info[remaining[c]].ref_dist) {
                    closest = Some(k);
                }
            }
            let Some(closest) = closest else {
                return Err(MoeaError::invariant(format!(
                    "reference direction {ref_idx} has no remaining candidate"
                )));
            };

            survivors.push(remaining.swap_remove(closest));

            if n_candidates == 1 {
                pool.remove(pos);
            } else {
                state.niche_counts[ref_idx] += 1;
                let count = state.niche_counts[ref_idx];
                let end = pool[pos + 1..]
                    .iter()
                    .position(|&r| state.niche_counts[r] >= count)
                    .map_or(pool.len(), |p| pos + 1 + p);
                pool.swap(pos, end - 1);
            }
        }

        trace!(
            "NSGA-III: {} fronts, partial front {:?} at {}..{}, {} survivors, ideal {:?}, nadir {:?}",
            sorted.fronts.len(),
            partial.front,
            partial.first,
            partial.last,
            survivors.len(),
            state.ideal,
            state.nadir
        );

        state.info = survivors.iter().map(|&i| info[i]).collect();
        Ok(survivors)
    }

    fn optimal_solutions(&self) -> Option<Vec<usize>> {
        let state = self.state.as_ref()?;
        Some(
            state
                .info
                .iter()
                .enumerate()
                .filter(|(_, c)| c.rank == 0)
                .map(|(i, _)| i)
                .collect(),
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
