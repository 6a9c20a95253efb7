/// The `macrodyn_core` crate computes deterministic steady states of
/// Ramsey/Solow-family growth models and classifies their local stability.
///
/// Key components:
/// - **Model boundary**: `ModelSpec` (state ordering, parameters, timing) and the
///   `EquationsOfMotion` trait supplied by model-family code.
/// - **Roots**: a closed set of nonlinear root-finding methods behind `solve_root`,
///   where non-convergence is an ordinary reported outcome.
/// - **Steady state**: residual construction (zero flow vs. fixed point of a map)
///   and the mapping between flat solver vectors and named state values.
/// - **Stability**: Jacobian eigenvalues with timing-dependent thresholds,
///   including saddle-path classification against declared jump variables.
pub mod error;
pub mod growth;
pub mod jacobian;
pub mod model;
pub mod roots;
pub mod stability;
pub mod steady_state;
pub mod traits;
