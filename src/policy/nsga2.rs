//! NSGA-II survivor selection: Pareto rank, then crowding distance.
//!
//! # References
//!
//! - Deb, K., Pratap, A., Agarwal, S., & Meyarivan, T. (2002). "A fast and
//!   elitist multiobjective genetic algorithm: NSGA-II". IEEE TEC 6(2), 182-197.

use log::trace;
use rand::Rng;

use super::config::PolicyConfig;
use super::SelectionPolicy;
use crate::error::{check_dimensions, MoeaError, Result};
use crate::pareto::{crowding_distance_of, non_dominated_sort_with, ParetoFronts};
use crate::random::{self, AtomicSplitmix64};

/// Rank and crowding distance of every member of the population.
#[derive(Debug, Clone, Default)]
struct Ranking {
    ranks: Vec<usize>,
    crowding: Vec<f64>,
}

impl Ranking {
    /// Crowding distances computed front by front.
    fn from_fronts<F: AsRef<[f64]>>(fitness: &[F], sorted: ParetoFronts) -> Self {
        let mut crowding = vec![0.0; sorted.ranks.len()];
        for front in &sorted.fronts {
            for (&i, d) in front.iter().zip(crowding_distance_of(fitness, front)) {
                crowding[i] = d;
            }
        }
        Self {
            ranks: sorted.ranks,
            crowding,
        }
    }

    /// Crowded-comparison operator: lower rank, then larger crowding distance.
    fn crowded_less(&self, lhs: usize, rhs: usize) -> bool {
        self.ranks[lhs] < self.ranks[rhs]
            || (self.ranks[lhs] == self.ranks[rhs] && self.crowding[lhs] > self.crowding[rhs])
    }
}

/// NSGA-II selection policy.
///
/// Ranks and crowding distances of the current population are cached by
/// `initialize` and `next_population`, so selection never re-sorts.
#[derive(Debug)]
pub struct Nsga2 {
    config: PolicyConfig,
    rng: AtomicSplitmix64,
    ranking: Option<Ranking>,
    dim: usize,
}

impl Nsga2 {
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
            ranking: None,
            dim: 0,
        })
    }

    /// The configuration this policy was created with.
    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Cached Pareto rank of each population member.
    pub fn ranks(&self) -> Option<&[usize]> {
        self.ranking.as_ref().map(|r| r.ranks.as_slice())
    }

    /// Cached crowding distance of each population member.
    pub fn crowding_distances(&self) -> Option<&[f64]> {
        self.ranking.as_ref().map(|r| r.crowding.as_slice())
    }

    fn ranking(&self) -> Result<&Ranking> {
        self.ranking.as_ref().ok_or(MoeaError::NotInitialized)
    }
}

impl SelectionPolicy for Nsga2 {
    fn initialize(&mut self, fitness: &[Vec<f64>]) -> Result<()> {
        let dim = check_dimensions(fitness)?;
        if dim < 2 {
            return Err(MoeaError::Configuration(format!(
                "NSGA-II needs at least 2 objectives, got {dim}"
            )));
        }
        if fitness.len() != self.config.population_size {
            return Err(MoeaError::Configuration(format!(
                "initial population has {} candidates, expected {}",
                fitness.len(),
                self.config.population_size
            )));
        }

        let sorted = non_dominated_sort_with(fitness, self.config.sort_strategy);
        self.ranking = Some(Ranking::from_fronts(fitness, sorted));
        self.dim = dim;
        Ok(())
    }

    fn prepare_selections(&mut self, _fitness: &[Vec<f64>]) -> Result<()> {
        self.ranking().map(|_| ())
    }

    fn select(&self, fitness: &[Vec<f64>]) -> Result<usize> {
        let ranking = self.ranking()?;
        let n = ranking.ranks.len();
        if fitness.len() != n {
            return Err(MoeaError::Configuration(format!(
                "selecting from {} candidates, population has {n}",
                fitness.len()
            )));
        }

        let mut rng = self.rng.handle();
        let idx1 = rng.random_range(0..n);
        let idx2 = rng.random_range(0..n);

        Ok(if ranking.crowded_less(idx2, idx1) { idx2 } else { idx1 })
    }

    fn next_population(&mut self, parents: &[Vec<f64>], children: &[Vec<f64>]) -> Result<Vec<usize>> {
        self.ranking()?;
        let pop_size = self.config.population_size;
        if parents.len() != pop_size {
            return Err(MoeaError::Configuration(format!(
                "got {} parents, expected {pop_size}",
                parents.len()
            )));
        }
        let combined: Vec<&[f64]> = parents.iter().chain(children).map(Vec::as_slice).collect();
        let dim = check_dimensions(&combined)?;
        if dim != self.dim {
            return Err(MoeaError::DimensionMismatch {
                index: 0,
                expected: self.dim,
                found: dim,
            });
        }

        let sorted = non_dominated_sort_with(&combined, self.config.sort_strategy);
        let n_fronts = sorted.fronts.len();
        let partial = sorted.partial_front(pop_size);
        let order = sorted.ordered();
        let ranking = Ranking::from_fronts(&combined, sorted);

        let mut survivors: Vec<usize> = order[..partial.first].to_vec();

        let mut last_front = order[partial.first..partial.last].to_vec();
        // Most isolated first; the sort is stable so ties keep front order.
        last_front.sort_by(|&a, &b| ranking.crowding[b].total_cmp(&ranking.crowding[a]));
        survivors.extend(last_front.into_iter().take(pop_size - survivors.len()));

        trace!(
            "NSGA-II: {n_fronts} fronts, partial front {:?}, {} survivors",
            partial.front,
            survivors.len()
        );

        self.ranking = Some(Ranking {
            ranks: survivors.iter().map(|&i| ranking.ranks[i]).collect(),
            crowding: survivors.iter().map(|&i| ranking.crowding[i]).collect(),
        });
        Ok(survivors)
    }

    fn optimal_solutions(&self) -> Option<Vec<usize>> {
        let ranking = self.ranking.as_ref()?;
        Some(
            ranking
                .ranks
                .iter()
                .enumerate()
                .filter(|(_, r)| **r == 0)
                .map(|(i, _)| i)
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(pop: usize) -> Nsga2 {
        Nsga2::new(PolicyConfig::for_population(pop).with_seed(9)).unwrap()
    }

    #[test]
    fn test_rejects_single_objective() {
        let mut nsga2 = policy(2);
        assert!(matches!(
            nsga2.initialize(&[vec![1.0], vec![2.0]]),
            Err(MoeaError::Configuration(_))
        ));
    }

    #[test]
    fn test_not_initialized() {
        let nsga2 = policy(2);
        let fitness = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        assert_eq!(nsga2.select(&fitness), Err(MoeaError::NotInitialized));
        assert_eq!(nsga2.optimal_solutions(), None);
    }

    #[test]
    fn test_initialize_caches_ranks() {
        let mut nsga2 = policy(4);
        let fitness = vec![
            vec![5.0, 1.0],
            vec![3.0, 3.0],
            vec![1.0, 5.0],
            vec![2.0, 2.0], // dominated by [1]
        ];
        nsga2.initialize(&fitness).unwrap();
        assert_eq!(nsga2.ranks().unwrap(), &[0, 0, 0, 1]);
        assert_eq!(nsga2.optimal_solutions().unwrap(), vec![0, 1, 2]);

        let crowding = nsga2.crowding_distances().unwrap();
        assert!(crowding[0].is_infinite());
        assert!(crowding[1].is_finite());
        assert!(crowding[3].is_infinite()); // alone in its front
    }

    #[test]
    fn test_truncation_keeps_boundaries() {
        let mut nsga2 = policy(3);
        let parents = vec![vec![0.0, 4.0], vec![1.0, 3.0], vec![1.5, 2.5]];
        nsga2.initialize(&parents).unwrap();

        // One front of 6; the boundaries and the most isolated interior point win.
        let children = vec![vec![4.0, 0.0], vec![2.0, 2.0], vec![3.5, 0.5]];
        let survivors = nsga2.next_population(&parents, &children).unwrap();

        assert_eq!(survivors.len(), 3);
        assert!(survivors.contains(&0));
        assert!(survivors.contains(&3));
        assert!(survivors.contains(&4));
    }

    #[test]
    fn test_complete_fronts_survive() {
        let mut nsga2 = policy(2);
        let parents = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        nsga2.initialize(&parents).unwrap();

        let children = vec![vec![2.0, 2.0], vec![0.5, 0.5]];
        let survivors = nsga2.next_population(&parents, &children).unwrap();

        // [2] dominates everything; [0] and [1] tie on rank 1 with infinite
        // crowding, so the first in front order wins the last slot.
        assert_eq!(survivors, vec![2, 0]);
        assert_eq!(nsga2.ranks().unwrap(), &[0, 1]);
        assert_eq!(nsga2.optimal_solutions().unwrap(), vec![0]);
    }

    #[test]
    fn test_select_prefers_lower_rank() {
        let mut nsga2 = policy(4);
        let fitness = vec![vec![9.0, 9.0], vec![1.0, 1.0], vec![0.5, 0.5], vec![0.0, 0.0]];
        nsga2.initialize(&fitness).unwrap();

        let picks: Vec<usize> = (0..400).map(|_| nsga2.select(&fitness).unwrap()).collect();
        let best = picks.iter().filter(|&&i| i == 0).count();
        let worst = picks.iter().filter(|&&i| i == 3).count();
        // P(best) = 7/16, P(worst) = 1/16 for a binary tournament.
        assert!(best > worst * 3, "best {best}, worst {worst}");
    }
}
