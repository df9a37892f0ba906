//! Driver-facing lifecycle of every selection policy.

use rand::Rng;
use u_moea::policy::{Policy, PolicyConfig, PolicyKind, SelectionPolicy};
use u_moea::random::AtomicSplitmix64;
use u_moea::MoeaError;

fn random_matrix(rng: &AtomicSplitmix64, rows: usize, dim: usize) -> Vec<Vec<f64>> {
    let mut rng = rng.handle();
    (0..rows)
        .map(|_| (0..dim).map(|_| rng.random_range(-1.0..1.0)).collect())
        .collect()
}

fn policies(pop: usize, dim: usize) -> Vec<Policy> {
    let config = PolicyConfig::for_population(pop).with_seed(17);
    let mut out = vec![Policy::for_objectives(dim, config.clone()).unwrap()];
    if dim > 1 {
        out.push(Policy::nsga2(config).unwrap());
    }
    out
}

#[test]
fn test_every_call_requires_initialize() {
    let rng = AtomicSplitmix64::new(1);
    for dim in [1, 3] {
        for mut policy in policies(6, dim) {
            let fitness = random_matrix(&rng, 6, dim);
            assert_eq!(policy.select(&fitness), Err(MoeaError::NotInitialized));
            assert_eq!(
                policy.prepare_selections(&fitness),
                Err(MoeaError::NotInitialized)
            );
            assert_eq!(
                policy.next_population(&fitness, &fitness),
                Err(MoeaError::NotInitialized)
            );
        }
    }
}

#[test]
fn test_failed_initialize_can_be_retried() {
    let rng = AtomicSplitmix64::new(2);
    let mut policy = Policy::for_objectives(2, PolicyConfig::for_population(5).with_seed(1)).unwrap();

    let mut bad = random_matrix(&rng, 5, 2);
    bad[3].push(0.0);
    let err = policy.initialize(&bad).unwrap_err();
    assert_eq!(
        err,
        MoeaError::DimensionMismatch {
            index: 3,
            expected: 2,
            found: 3
        }
    );
    assert!(!err.is_fatal());

    let good = random_matrix(&rng, 5, 2);
    policy.initialize(&good).unwrap();
    assert!(policy.select(&good).unwrap() < 5);
}

#[test]
fn test_generations_keep_population_size() {
    let rng = AtomicSplitmix64::new(3);
    for (dim, pop) in [(1, 10), (2, 10), (3, 15), (5, 21)] {
        for mut policy in policies(pop, dim) {
            let mut parents = random_matrix(&rng, pop, dim);
            policy.initialize(&parents).unwrap();

            for _ in 0..10 {
                policy.prepare_selections(&parents).unwrap();
                for _ in 0..pop {
                    assert!(policy.select(&parents).unwrap() < pop);
                }

                // One extra child, as an odd-sized offspring batch would produce.
                let children = random_matrix(&rng, pop + 1, dim);
                let survivors = policy.next_population(&parents, &children).unwrap();
                assert_eq!(survivors.len(), pop, "{:?}", policy.kind());

                parents = survivors
                    .iter()
                    .map(|&i| {
                        if i < pop {
                            parents[i].clone()
                        } else {
                            children[i - pop].clone()
                        }
                    })
                    .collect();
            }
        }
    }
}

#[test]
fn test_optimal_solutions_by_kind() {
    let rng = AtomicSplitmix64::new(4);

    let mut single = Policy::for_objectives(1, PolicyConfig::for_population(4)).unwrap();
    single.initialize(&random_matrix(&rng, 4, 1)).unwrap();
    assert_eq!(single.kind(), PolicyKind::SingleObjective);
    assert_eq!(single.optimal_solutions(), None);

    // The ideal candidate dominates every other one.
    let fitness = vec![vec![5.0, 5.0], vec![1.0, 0.0], vec![0.0, 1.0], vec![0.5, 0.5]];
    for mut policy in policies(4, 2) {
        policy.initialize(&fitness).unwrap();
        assert_eq!(policy.optimal_solutions(), Some(vec![0]), "{:?}", policy.kind());
    }
}

#[test]
fn test_wrong_parent_count_is_a_configuration_error() {
    let rng = AtomicSplitmix64::new(5);
    for dim in [1, 2] {
        for mut policy in policies(6, dim) {
            let parents = random_matrix(&rng, 6, dim);
            policy.initialize(&parents).unwrap();

            let children = random_matrix(&rng, 6, dim);
            let err = policy.next_population(&parents[..5], &children).unwrap_err();
            assert!(matches!(err, MoeaError::Configuration(_)));
            assert!(!err.is_fatal());
        }
    }
}

#[test]
fn test_invariant_violations_are_fatal() {
    assert!(MoeaError::InvariantViolation("survivor index 9 returned twice".into()).is_fatal());
    assert!(!MoeaError::NotInitialized.is_fatal());
}

#[test]
fn test_select_on_wrong_population_is_a_configuration_error() {
    let rng = AtomicSplitmix64::new(6);
    for dim in [1, 2] {
        for mut policy in policies(6, dim) {
            policy.initialize(&random_matrix(&rng, 6, dim)).unwrap();

            let longer = random_matrix(&rng, 12, dim);
            let err = policy.select(&longer).unwrap_err();
            assert!(matches!(err, MoeaError::Configuration(_)), "{:?}", policy.kind());
            assert!(!err.is_fatal());
        }
    }
}
