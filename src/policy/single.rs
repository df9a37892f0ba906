//! Single-objective selection: tournament selection and keep-best update.

use rand::Rng;

use super::config::PolicyConfig;
use super::SelectionPolicy;
use crate::error::{check_dimensions, MoeaError, Result};
use crate::random::{self, AtomicSplitmix64};

/// Selection policy for problems with exactly one objective (maximized).
///
/// - `select`: tournament of `tournament_size` random candidates, highest
///   fitness wins.
/// - `next_population`: the `population_size` best of parents and children.
///   Ties keep the earlier candidate, so parents win over equal children.
#[derive(Debug)]
pub struct SingleObjective {
    config: PolicyConfig,
    rng: AtomicSplitmix64,
    initialized: bool,
}

impl SingleObjective {
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
            initialized: false,
        })
    }

    /// The configuration this policy was created with.
    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    fn check_initialized(&self) -> Result<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(MoeaError::NotInitialized)
        }
    }
}

fn check_single_objective<F: AsRef<[f64]>>(fitness: &[F]) -> Result<()> {
    let dim = check_dimensions(fitness)?;
    if dim != 1 {
        return Err(MoeaError::Configuration(format!(
            "single-objective selection got {dim} objectives"
        )));
    }
    Ok(())
}

impl SelectionPolicy for SingleObjective {
    fn initialize(&mut self, fitness: &[Vec<f64>]) -> Result<()> {
        check_single_objective(fitness)?;
        if fitness.len() != self.config.population_size {
            return Err(MoeaError::Configuration(format!(
                "initial population has {} candidates, expected {}",
                fitness.len(),
                self.config.population_size
            )));
        }
        self.initialized = true;
        Ok(())
    }

    fn prepare_selections(&mut self, _fitness: &[Vec<f64>]) -> Result<()> {
        self.check_initialized()
    }

    fn select(&self, fitness: &[Vec<f64>]) -> Result<usize> {
        self.check_initialized()?;
        check_single_objective(fitness)?;
        let n = self.config.population_size;
        if fitness.len() != n {
            return Err(MoeaError::Configuration(format!(
                "selecting from {} candidates, population has {n}",
                fitness.len()
            )));
        }

        let mut rng = self.rng.handle();
        let mut best_idx = rng.random_range(0..n);
        for _ in 1..self.config.tournament_size {
            let idx = rng.random_range(0..n);
            if fitness[idx][0] > fitness[best_idx][0] {
                best_idx = idx;
            }
        }
        Ok(best_idx)
    }

    fn next_population(&mut self, parents: &[Vec<f64>], children: &[Vec<f64>]) -> Result<Vec<usize>> {
        self.check_initialized()?;
        let pop_size = self.config.population_size;
        if parents.len() != pop_size {
            return Err(MoeaError::Configuration(format!(
                "got {} parents, expected {pop_size}",
                parents.len()
            )));
        }
        let combined: Vec<&[f64]> = parents.iter().chain(children).map(Vec::as_slice).collect();
        check_single_objective(&combined)?;

        let mut indices: Vec<usize> = (0..combined.len()).collect();
        indices.sort_by(|&a, &b| combined[b][0].total_cmp(&combined[a][0]));
        indices.truncate(pop_size);
        Ok(indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(pop: usize, k: usize) -> SingleObjective {
        let config = PolicyConfig::for_population(pop)
            .with_tournament_size(k)
            .with_seed(5);
        SingleObjective::new(config).unwrap()
    }

    #[test]
    fn test_rejects_multiple_objectives() {
        let mut single = policy(2, 2);
        assert!(matches!(
            single.initialize(&[vec![1.0, 2.0], vec![2.0, 1.0]]),
            Err(MoeaError::Configuration(_))
        ));
    }

    #[test]
    fn test_not_initialized() {
        let single = policy(2, 2);
        assert_eq!(
            single.select(&[vec![1.0], vec![2.0]]),
            Err(MoeaError::NotInitialized)
        );
    }

    #[test]
    fn test_select_rejects_wrong_population() {
        let mut single = policy(3, 2);
        single.initialize(&[vec![1.0], vec![2.0], vec![3.0]]).unwrap();

        let longer: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64]).collect();
        for _ in 0..50 {
            assert!(matches!(
                single.select(&longer),
                Err(MoeaError::Configuration(_))
            ));
        }
        assert!(matches!(
            single.select(&longer[..2]),
            Err(MoeaError::Configuration(_))
        ));
    }

    #[test]
    fn test_keep_best() {
        let mut single = policy(3, 2);
        let parents = vec![vec![1.0], vec![5.0], vec![3.0]];
        single.initialize(&parents).unwrap();

        let children = vec![vec![4.0], vec![0.0], vec![5.0]];
        let survivors = single.next_population(&parents, &children).unwrap();
        // Equal fitness keeps the parent first.
        assert_eq!(survivors, vec![1, 5, 3]);
    }

    #[test]
    fn test_tournament_pressure() {
        let fitness: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64]).collect();

        let mut weak = policy(10, 1);
        weak.initialize(&fitness).unwrap();
        let mut strong = policy(10, 5);
        strong.initialize(&fitness).unwrap();

        let mean = |p: &SingleObjective| -> f64 {
            (0..1000).map(|_| p.select(&fitness).unwrap() as f64).sum::<f64>() / 1000.0
        };
        // k=1 is uniform (mean 4.5); k=5 is strongly biased towards index 9.
        assert!(mean(&strong) > mean(&weak) + 2.0);
    }

    #[test]
    fn test_no_optimal_solutions_fast_path() {
        let mut single = policy(2, 2);
        single.initialize(&[vec![1.0], vec![2.0]]).unwrap();
        assert_eq!(single.optimal_solutions(), None);
    }
}
