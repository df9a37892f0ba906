//! Selection policy configuration.
//!
//! [`PolicyConfig`] holds the parameters shared by every selection policy.

use crate::error::{MoeaError, Result};
use crate::pareto::SortStrategy;

/// Configuration for a selection policy.
///
/// # Defaults
///
/// ```
/// use u_moea::policy::PolicyConfig;
///
/// let config = PolicyConfig::default();
/// assert_eq!(config.population_size, 100);
/// assert_eq!(config.tournament_size, 2);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_moea::pareto::SortStrategy;
/// use u_moea::policy::PolicyConfig;
///
/// let config = PolicyConfig::default()
///     .with_population_size(92)
///     .with_divisions(12)
///     .with_sort_strategy(SortStrategy::Best)
///     .with_seed(42);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PolicyConfig {
    /// Number of survivors kept every generation.
    ///
    /// `next_population` always returns exactly this many indices.
    pub population_size: usize,

    /// Seed for the policy's own random generator.
    ///
    /// `None` draws a seed from the process-wide generator.
    pub seed: Option<u64>,

    /// Whether to associate candidates in parallel using rayon.
    ///
    /// Ignored when the crate is built without the `parallel` feature.
    pub parallel: bool,

    /// Non-dominated sorting algorithm.
    pub sort_strategy: SortStrategy,

    /// Das–Dennis division count for NSGA-III reference directions.
    ///
    /// `None` chooses the count whose direction count is nearest to
    /// `population_size`.
    pub n_divisions: Option<usize>,

    /// Tournament size for single-objective selection.
    pub tournament_size: usize,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            seed: None,
            parallel: true,
            sort_strategy: SortStrategy::default(),
            n_divisions: None,
            tournament_size: 2,
        }
    }
}

impl PolicyConfig {
    /// Default configuration with the given population size.
    pub fn for_population(population_size: usize) -> Self {
        Self::default().with_population_size(population_size)
    }

    /// Picks a sort strategy suited to the population size.
    ///
    /// - `population_size < 200` → [`SortStrategy::Pairwise`]
    /// - `population_size ≥ 200` → [`SortStrategy::Best`]
    ///
    /// The pairwise sort has the lowest constant factor. The combined
    /// parent and child matrix is twice the population size, so large
    /// populations profit from the output-sensitive algorithm.
    pub fn auto_select(population_size: usize) -> Self {
        let strategy = if population_size < 200 {
            SortStrategy::Pairwise
        } else {
            SortStrategy::Best
        };
        Self::for_population(population_size).with_sort_strategy(strategy)
    }

    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enables or disables parallel association.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the non-dominated sorting algorithm.
    pub fn with_sort_strategy(mut self, strategy: SortStrategy) -> Self {
        self.sort_strategy = strategy;
        self
    }

    /// Fixes the Das–Dennis division count.
    pub fn with_divisions(mut self, divisions: usize) -> Self {
        self.n_divisions = Some(divisions);
        self
    }

    /// Sets the tournament size for single-objective selection.
    pub fn with_tournament_size(mut self, k: usize) -> Self {
        self.tournament_size = k;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// Returns [`MoeaError::Configuration`] describing the first invalid
    /// parameter.
    pub fn validate(&self) -> Result<()> {
        if self.population_size < 2 {
            return Err(MoeaError::Configuration(
                "population_size must be at least 2".into(),
            ));
        }
        if self.tournament_size == 0 {
            return Err(MoeaError::Configuration(
                "tournament_size must be at least 1".into(),
            ));
        }
        if self.n_divisions == Some(0) {
            return Err(MoeaError::Configuration(
                "n_divisions must be positive or None".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PolicyConfig::default();
        assert_eq!(config.population_size, 100);
        assert!(config.seed.is_none());
        assert!(config.parallel);
        assert_eq!(config.sort_strategy, SortStrategy::Pairwise);
        assert!(config.n_divisions.is_none());
        assert_eq!(config.tournament_size, 2);
    }

    #[test]
    fn test_builder_pattern() {
        let config = PolicyConfig::default()
            .with_population_size(92)
            .with_seed(7)
            .with_parallel(false)
            .with_sort_strategy(SortStrategy::Kung)
            .with_divisions(12)
            .with_tournament_size(4);

        assert_eq!(config.population_size, 92);
        assert_eq!(config.seed, Some(7));
        assert!(!config.parallel);
        assert_eq!(config.sort_strategy, SortStrategy::Kung);
        assert_eq!(config.n_divisions, Some(12));
        assert_eq!(config.tournament_size, 4);
    }

    #[test]
    fn test_for_population() {
        let config = PolicyConfig::for_population(40);
        assert_eq!(config.population_size, 40);
        assert_eq!(config.tournament_size, 2);
    }

    #[test]
    fn test_auto_select() {
        assert_eq!(PolicyConfig::auto_select(50).sort_strategy, SortStrategy::Pairwise);
        assert_eq!(PolicyConfig::auto_select(500).sort_strategy, SortStrategy::Best);
        assert_eq!(PolicyConfig::auto_select(500).population_size, 500);
    }

    #[test]
    fn test_validate_ok() {
        assert!(PolicyConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_population_too_small() {
        let config = PolicyConfig::default().with_population_size(1);
        assert!(matches!(config.validate(), Err(MoeaError::Configuration(_))));
    }

    #[test]
    fn test_validate_zero_tournament() {
        let config = PolicyConfig::default().with_tournament_size(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_divisions() {
        let config = PolicyConfig::default().with_divisions(0);
        assert!(config.validate().is_err());
    }
}
