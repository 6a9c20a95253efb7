//! The composition root tying one model specification to the shared solve
//! and classification machinery.

use nalgebra::DMatrix;

use crate::error::ModelError;
use crate::model::ModelSpec;
use crate::roots::{SolverMethod, SolverOptions};
use crate::stability::{classify, StabilityReport, StabilitySettings};
use crate::steady_state::{
    solve_steady_state, ModelJacobianFn, SolveOutcome, SteadyStateValues,
};
use crate::traits::EquationsOfMotion;

/// One growth model: an immutable [`ModelSpec`] plus the mutable slot
/// holding the most recently computed steady state.
///
/// Model families (Ramsey, Solow, ...) differ only in the equations of
/// motion and parameters they inject; solving and stability classification
/// are shared unchanged across all of them.
pub struct GrowthModel<F> {
    spec: ModelSpec<F>,
    steady_state: Option<SteadyStateValues>,
}

impl<F: EquationsOfMotion> GrowthModel<F> {
    pub fn new(spec: ModelSpec<F>) -> Self {
        Self {
            spec,
            steady_state: None,
        }
    }

    pub fn spec(&self) -> &ModelSpec<F> {
        &self.spec
    }

    /// The steady state from the last successful solve, if any.
    pub fn steady_state(&self) -> Option<&SteadyStateValues> {
        self.steady_state.as_ref()
    }

    /// Runs one steady-state search. A `Success` replaces the stored steady
    /// state; a `Failure` leaves it untouched and is handed back for
    /// inspection and retry.
    pub fn solve_steady_state(
        &mut self,
        initial_guess: &[f64],
        method: SolverMethod,
        jacobian: Option<&ModelJacobianFn>,
        options: &SolverOptions,
    ) -> Result<SolveOutcome, ModelError> {
        let outcome = solve_steady_state(&self.spec, initial_guess, method, jacobian, options)?;
        if let SolveOutcome::Success(values) = &outcome {
            self.steady_state = Some(values.clone());
        }
        Ok(outcome)
    }

    /// Classifies the stored steady state.
    ///
    /// `jacobian`, when given, is the model Jacobian evaluated at the steady
    /// state; otherwise it is estimated by finite differences. Fails with
    /// [`ModelError::UndefinedJacobian`] until a solve has succeeded.
    pub fn check_stability(
        &self,
        jacobian: Option<&DMatrix<f64>>,
        settings: &StabilitySettings,
    ) -> Result<StabilityReport, ModelError> {
        let steady_state = self
            .steady_state
            .as_ref()
            .ok_or(ModelError::UndefinedJacobian)?;
        classify(&self.spec, steady_state, jacobian, settings)
    }
}
