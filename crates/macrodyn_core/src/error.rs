use thiserror::Error;

/// Errors surfaced by the core API.
///
/// Solver non-convergence is deliberately absent: it is an expected,
/// recoverable outcome carried as data in
/// [`SolveOutcome::Failure`](crate::steady_state::SolveOutcome), so that
/// parameter-sweep callers can continue past individual failures.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Malformed model specification. Fatal at construction.
    #[error("invalid model specification: {0}")]
    Configuration(String),

    /// An input vector does not match the model's state dimension.
    #[error("dimension mismatch: expected {expected} values, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Stability was requested before a steady state was computed, so there
    /// is no point at which to evaluate the Jacobian.
    #[error("no steady state available; solve for one before requesting stability")]
    UndefinedJacobian,
}
