//! Error types shared by every selection policy.

/// Errors reported by the selection subsystem.
///
/// Two classes exist:
///
/// - **Configuration errors** ([`Configuration`](MoeaError::Configuration),
///   [`DimensionMismatch`](MoeaError::DimensionMismatch),
///   [`NotInitialized`](MoeaError::NotInitialized)) are caused by the caller
///   and are detected before any state is mutated.
/// - **Invariant violations** ([`InvariantViolation`](MoeaError::InvariantViolation))
///   indicate a defect in this crate. They are fatal: retrying cannot fix them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoeaError {
    /// Invalid parameters or inputs for the requested policy.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A fitness vector does not have the same number of objectives as the first one.
    #[error("fitness vector {index} has {found} objectives, expected {expected}")]
    DimensionMismatch {
        /// Position of the offending vector in the fitness matrix.
        index: usize,
        /// Objective count of the first vector.
        expected: usize,
        /// Objective count of the offending vector.
        found: usize,
    },

    /// The policy was used before `initialize` was called.
    #[error("selection policy used before initialize()")]
    NotInitialized,

    /// Internal bookkeeping produced an impossible result.
    #[error("internal invariant violated: {0}")]
    InvariantViolation(String),
}

impl MoeaError {
    /// Returns `true` for errors which must abort the run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, MoeaError::InvariantViolation(_))
    }

    /// Builds an [`InvariantViolation`](MoeaError::InvariantViolation) and logs it.
    pub(crate) fn invariant(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        log::error!("invariant violation: {msg}");
        MoeaError::InvariantViolation(msg)
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MoeaError>;

/// Checks that every vector in `fitness` has the same, non-zero length.
///
/// Returns the shared objective count.
pub(crate) fn check_dimensions<F: AsRef<[f64]>>(fitness: &[F]) -> Result<usize> {
    let first = fitness
        .first()
        .ok_or_else(|| MoeaError::Configuration("fitness matrix must not be empty".into()))?;
    let expected = first.as_ref().len();
    if expected == 0 {
        return Err(MoeaError::Configuration(
            "fitness vectors must have at least one objective".into(),
        ));
    }
    for (index, f) in fitness.iter().enumerate() {
        let found = f.as_ref().len();
        if found != expected {
            return Err(MoeaError::DimensionMismatch {
                index,
                expected,
                found,
            });
        }
    }
    Ok(expected)
}
