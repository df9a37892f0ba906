//! Many-objective evolutionary selection.
//!
//! Provides the selection step of a multi-objective evolutionary algorithm:
//! given the fitness of every candidate, rank candidates by Pareto dominance
//! and choose parents and survivors that are both good and well spread.
//!
//! - **Pareto engine** ([`pareto`]): tolerant dominance, Pareto-front finders
//!   (1-D, sort-filter, Kung, BEST), non-dominated sorting and partial-front
//!   detection, crowding distance.
//! - **Reference directions** ([`reference`]): Das–Dennis simplex lattices
//!   sized to a target population.
//! - **Cone tree** ([`cone_tree`]): maximum inner-product search used to
//!   associate candidates with reference directions.
//! - **Selection policies** ([`policy`]): NSGA-III niching, NSGA-II crowding
//!   and single-objective tournament selection behind one
//!   [`SelectionPolicy`](policy::SelectionPolicy) interface.
//!
//! All objectives are **maximized**.
//!
//! # Architecture
//!
//! This crate sits at Layer 2 (Algorithms) in the U-Engine ecosystem. It
//! contains no genome representation, variation operator or fitness
//! function: the caller's evolutionary loop supplies a fitness matrix each
//! generation and applies the survivor indices it gets back.
//!
//! # Example
//!
//! ```
//! use u_moea::policy::{Policy, PolicyConfig, SelectionPolicy};
//!
//! let config = PolicyConfig::for_population(4).with_seed(7);
//! let mut policy = Policy::for_objectives(2, config).unwrap();
//!
//! let parents = vec![vec![1.0, 0.0], vec![0.5, 0.5], vec![0.2, 0.2], vec![0.0, 1.0]];
//! policy.initialize(&parents).unwrap();
//!
//! let children = vec![vec![0.8, 0.3], vec![0.3, 0.8], vec![0.1, 0.1], vec![0.4, 0.4]];
//! let survivors = policy.next_population(&parents, &children).unwrap();
//! assert_eq!(survivors.len(), 4);
//! assert!(!survivors.contains(&2)); // dominated; front 0 alone fills the population
//! ```

pub mod cone_tree;
pub mod error;
pub mod math;
pub mod pareto;
pub mod policy;
pub mod random;
pub mod reference;

pub use error::{MoeaError, Result};
