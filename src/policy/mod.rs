//! Selection policies.
//!
//! A policy owns everything the evolutionary driver needs between
//! generations to choose parents and survivors. The driver calls, in order:
//!
//! 1. [`initialize`](SelectionPolicy::initialize) once with the initial
//!    population's fitness,
//! 2. then every generation [`prepare_selections`](SelectionPolicy::prepare_selections),
//!    [`select`](SelectionPolicy::select) once per parent (possibly from
//!    several threads), and [`next_population`](SelectionPolicy::next_population)
//!    with the parents' and children's fitness.
//!
//! The surviving indices refer to the concatenation `parents ++ children`.
//! The driver builds the next population in the returned order.
//!
//! | Policy | Objectives | Survivors | Parent selection |
//! |--------|-----------|-----------|------------------|
//! | [`SingleObjective`] | 1 | best fitness | tournament |
//! | [`Nsga2`] | ≥ 2 | rank, crowding distance | crowded binary tournament |
//! | [`Nsga3`] | ≥ 2 | rank, reference-direction niching | niched binary tournament |
//!
//! [`Policy`] picks one of them from the objective count and checks every
//! index it returns.

mod config;
mod nsga2;
mod nsga3;
mod single;

pub use config::PolicyConfig;
pub use nsga2::Nsga2;
pub use nsga3::{CandidateInfo, Nsga3};
pub use single::SingleObjective;

use crate::error::{MoeaError, Result};

/// Interface shared by every selection policy.
///
/// Fitness values are **maximized**. All methods except `initialize` return
/// [`MoeaError::NotInitialized`] before a successful `initialize`.
pub trait SelectionPolicy: Send + Sync {
    /// Sets up the run state from the initial population.
    ///
    /// On error the policy is left unchanged.
    fn initialize(&mut self, fitness: &[Vec<f64>]) -> Result<()>;

    /// Called once per generation before the first `select`.
    fn prepare_selections(&mut self, fitness: &[Vec<f64>]) -> Result<()>;

    /// Chooses one parent from the current population.
    ///
    /// Takes `&self` so that it can be called concurrently.
    fn select(&self, fitness: &[Vec<f64>]) -> Result<usize>;

    /// Chooses the survivors among `parents ++ children`.
    ///
    /// Returns `population_size` unique indices into the concatenation.
    fn next_population(&mut self, parents: &[Vec<f64>], children: &[Vec<f64>]) -> Result<Vec<usize>>;

    /// Indices of the Pareto-optimal members of the current population,
    /// if the policy tracks them.
    fn optimal_solutions(&self) -> Option<Vec<usize>> {
        None
    }
}

/// Which algorithm a [`Policy`] runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PolicyKind {
    /// Tournament selection on a single objective.
    SingleObjective,
    /// NSGA-II.
    Nsga2,
    /// NSGA-III.
    Nsga3,
}

/// A selection policy chosen once per run.
///
/// Wraps the concrete policies and verifies their output at the boundary:
/// an out-of-range or duplicate index is reported as
/// [`MoeaError::InvariantViolation`].
///
/// # Example
///
/// ```
/// use u_moea::policy::{Policy, PolicyConfig, PolicyKind, SelectionPolicy};
///
/// let config = PolicyConfig::for_population(4).with_seed(3);
/// let mut policy = Policy::for_objectives(2, config).unwrap();
/// assert_eq!(policy.kind(), PolicyKind::Nsga3);
///
/// let fitness = vec![vec![1.0, 0.0], vec![0.6, 0.4], vec![0.4, 0.6], vec![0.0, 1.0]];
/// policy.initialize(&fitness).unwrap();
/// assert!(policy.select(&fitness).unwrap() < 4);
/// ```
#[derive(Debug)]
pub enum Policy {
    /// See [`SingleObjective`].
    SingleObjective(SingleObjective),
    /// See [`Nsga2`].
    Nsga2(Nsga2),
    /// See [`Nsga3`].
    Nsga3(Nsga3),
}

impl Policy {
    /// [`SingleObjective`] for one objective, [`Nsga3`] otherwise.
    ///
    /// # Errors
    /// Returns [`MoeaError::Configuration`] for zero objectives or an
    /// invalid `config`.
    pub fn for_objectives(num_objectives: usize, config: PolicyConfig) -> Result<Self> {
        match num_objectives {
            0 => Err(MoeaError::Configuration(
                "number of objectives must be at least 1".into(),
            )),
            1 => Ok(Policy::SingleObjective(SingleObjective::new(config)?)),
            _ => Ok(Policy::Nsga3(Nsga3::new(config)?)),
        }
    }

    /// An [`Nsga2`] policy.
    ///
    /// # Errors
    /// Returns [`MoeaError::Configuration`] for an invalid `config`.
    pub fn nsga2(config: PolicyConfig) -> Result<Self> {
        Ok(Policy::Nsga2(Nsga2::new(config)?))
    }

    /// The wrapped algorithm.
    pub fn kind(&self) -> PolicyKind {
        match self {
            Policy::SingleObjective(_) => PolicyKind::SingleObjective,
            Policy::Nsga2(_) => PolicyKind::Nsga2,
            Policy::Nsga3(_) => PolicyKind::Nsga3,
        }
    }

    /// The configuration of the wrapped policy.
    pub fn config(&self) -> &PolicyConfig {
        match self {
            Policy::SingleObjective(p) => p.config(),
            Policy::Nsga2(p) => p.config(),
            Policy::Nsga3(p) => p.config(),
        }
    }

    /// Number of survivors per generation.
    pub fn population_size(&self) -> usize {
        self.config().population_size
    }

    fn inner(&self) -> &dyn SelectionPolicy {
        match self {
            Policy::SingleObjective(p) => p,
            Policy::Nsga2(p) => p,
            Policy::Nsga3(p) => p,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn SelectionPolicy {
        match self {
            Policy::SingleObjective(p) => p,
            Policy::Nsga2(p) => p,
            Policy::Nsga3(p) => p,
        }
    }
}

impl From<SingleObjective> for Policy {
    fn from(p: SingleObjective) -> Self {
        Policy::SingleObjective(p)
    }
}

impl From<Nsga2> for Policy {
    fn from(p: Nsga2) -> Self {
        Policy::Nsga2(p)
    }
}

impl From<Nsga3> for Policy {
    fn from(p: Nsga3) -> Self {
        Policy::Nsga3(p)
    }
}

impl SelectionPolicy for Policy {
    fn initialize(&mut self, fitness: &[Vec<f64>]) -> Result<()> {
        self.inner_mut().initialize(fitness)
    }

    fn prepare_selections(&mut self, fitness: &[Vec<f64>]) -> Result<()> {
        self.inner_mut().prepare_selections(fitness)
    }

    fn select(&self, fitness: &[Vec<f64>]) -> Result<usize> {
        let idx = self.inner().select(fitness)?;
        let pop_size = self.population_size();
        if idx >= pop_size {
            return Err(MoeaError::invariant(format!(
                "selected index {idx} is outside the population of {pop_size}"
            )));
        }
        Ok(idx)
    }

    fn next_population(&mut self, parents: &[Vec<f64>], children: &[Vec<f64>]) -> Result<Vec<usize>> {
        let survivors = self.inner_mut().next_population(parents, children)?;
        check_survivors(&survivors, self.population_size(), parents.len() + children.len())?;
        Ok(survivors)
    }

    fn optimal_solutions(&self) -> Option<Vec<usize>> {
        self.inner().optimal_solutions()
    }
}

/// Survivors must be `pop_size` unique indices below `range`.
fn check_survivors(survivors: &[usize], pop_size: usize, range: usize) -> Result<()> {
    if survivors.len() != pop_size {
        return Err(MoeaError::invariant(format!(
            "{} survivors returned, expected {pop_size}",
            survivors.len()
        )));
    }

    let mut seen = vec![false; range];
    for &idx in survivors {
        if idx >= range {
            return Err(MoeaError::invariant(format!(
                "survivor index {idx} is outside the combined population of {range}"
            )));
        }
        if std::mem::replace(&mut seen[idx], true) {
            return Err(MoeaError::invariant(format!(
                "survivor index {idx} returned twice"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_objectives_dispatch() {
        let config = PolicyConfig::for_population(4).with_seed(1);
        assert_eq!(
            Policy::for_objectives(1, config.clone()).unwrap().kind(),
            PolicyKind::SingleObjective
        );
        assert_eq!(
            Policy::for_objectives(3, config.clone()).unwrap().kind(),
            PolicyKind::Nsga3
        );
        assert_eq!(Policy::nsga2(config.clone()).unwrap().kind(), PolicyKind::Nsga2);
        assert!(Policy::for_objectives(0, config).is_err());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = PolicyConfig::for_population(1);
        assert!(matches!(
            Policy::for_objectives(2, config),
            Err(MoeaError::Configuration(_))
        ));
    }

    #[test]
    fn test_trait_objects() {
        let config = PolicyConfig::for_population(4).with_seed(2);
        let policies: Vec<Box<dyn SelectionPolicy>> = vec![
            Box::new(Nsga2::new(config.clone()).unwrap()),
            Box::new(Nsga3::new(config).unwrap()),
        ];
        let fitness = vec![vec![1.0, 0.0], vec![0.6, 0.4], vec![0.4, 0.6], vec![0.0, 1.0]];
        for mut policy in policies {
            policy.initialize(&fitness).unwrap();
            assert_eq!(policy.optimal_solutions().unwrap().len(), 4);
        }
    }

    #[test]
    fn test_check_survivors() {
        assert!(check_survivors(&[0, 3, 2], 3, 6).is_ok());

        let short = check_survivors(&[0, 1], 3, 6).unwrap_err();
        assert!(short.is_fatal());
        assert!(check_survivors(&[0, 1, 6], 3, 6).is_err());
        assert!(check_survivors(&[0, 1, 1], 3, 6).is_err());
    }
}
