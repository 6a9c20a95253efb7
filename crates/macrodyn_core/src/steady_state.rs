//! Steady-state computation: turns a model's equilibrium condition into a
//! root-finding problem over a flat vector and maps the result back to named
//! state values.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::model::{ModelSpec, Parameters, Timing};
use crate::roots::{solve_root, JacobianFn, RootReport, SolverMethod, SolverOptions};
use crate::traits::EquationsOfMotion;

/// Steady-state values keyed by state-variable name, ordered as declared in
/// the owning [`ModelSpec`]. Produced only by a successful solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SteadyStateValues {
    names: Vec<String>,
    values: Vec<f64>,
}

impl SteadyStateValues {
    /// Assembles values directly, for callers that obtained a steady state
    /// elsewhere (e.g. a closed form) and only want classification.
    pub fn from_parts(names: Vec<String>, values: Vec<f64>) -> Result<Self, ModelError> {
        if names.len() != values.len() {
            return Err(ModelError::DimensionMismatch {
                expected: names.len(),
                actual: values.len(),
            });
        }
        Ok(Self { names, values })
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.values[i])
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

/// What the solver reported when it stopped short of a root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveDiagnostics {
    pub message: String,
    pub residual: Vec<f64>,
    pub residual_norm: f64,
    pub iterations: usize,
    pub evaluations: usize,
}

/// Outcome of one steady-state search.
///
/// Non-convergence is data, not an error: nonlinear root finding offers no
/// guarantee from an arbitrary guess, so sweep callers must be able to
/// inspect the diagnostics and retry with another guess or method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SolveOutcome {
    Success(SteadyStateValues),
    Failure(SolveDiagnostics),
}

impl SolveOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn steady_state(&self) -> Option<&SteadyStateValues> {
        match self {
            Self::Success(values) => Some(values),
            Self::Failure(_) => None,
        }
    }

    pub fn diagnostics(&self) -> Option<&SolveDiagnostics> {
        match self {
            Self::Success(_) => None,
            Self::Failure(diagnostics) => Some(diagnostics),
        }
    }
}

/// Analytic Jacobian of the equations of motion, supplied by the caller to
/// sharpen solver convergence.
///
/// This is deliberately distinct from the Jacobian consumed by stability
/// classification: this one shapes the search and is transformed into the
/// residual Jacobian internally; the other one is evaluated at the solved
/// steady state and read for its eigenvalues.
pub type ModelJacobianFn<'a> = dyn Fn(&[f64], &Parameters) -> DMatrix<f64> + 'a;

/// Finds a steady state of `spec` starting from `initial_guess`.
///
/// The residual handed to the root finder depends on timing: a continuous
/// model's steady state is a zero of the flow, so the equations of motion
/// are the residual directly; a discrete model's steady state is a fixed
/// point of the map, so the residual is `f(x) - x`. Conflating the two
/// silently finds the wrong kind of equilibrium.
pub fn solve_steady_state<F: EquationsOfMotion>(
    spec: &ModelSpec<F>,
    initial_guess: &[f64],
    method: SolverMethod,
    jacobian: Option<&ModelJacobianFn>,
    options: &SolverOptions,
) -> Result<SolveOutcome, ModelError> {
    let dim = spec.dimension();
    if initial_guess.len() != dim {
        return Err(ModelError::DimensionMismatch {
            expected: dim,
            actual: initial_guess.len(),
        });
    }

    let timing = spec.timing();
    let residual = |x: &[f64], out: &mut [f64]| {
        spec.evaluate(x, out);
        if timing == Timing::Discrete {
            for i in 0..out.len() {
                out[i] -= x[i];
            }
        }
    };

    // The residual Jacobian differs from the model Jacobian by -I for maps.
    let residual_jacobian = jacobian.map(|model_jacobian| {
        move |x: &[f64]| {
            let mut matrix = model_jacobian(x, spec.parameters());
            if timing == Timing::Discrete {
                for i in 0..matrix.nrows() {
                    matrix[(i, i)] -= 1.0;
                }
            }
            matrix
        }
    });

    let residual_jacobian_ref: Option<&JacobianFn> = match &residual_jacobian {
        Some(jac) => Some(jac),
        None => None,
    };
    let report = solve_root(
        &residual,
        residual_jacobian_ref,
        initial_guess,
        method,
        options,
    );
    Ok(outcome_from_report(spec, report))
}

fn outcome_from_report<F: EquationsOfMotion>(
    spec: &ModelSpec<F>,
    report: RootReport,
) -> SolveOutcome {
    if report.success {
        SolveOutcome::Success(SteadyStateValues {
            names: spec.state_names().to_vec(),
            values: report.solution,
        })
    } else {
        SolveOutcome::Failure(SolveDiagnostics {
            message: report.message,
            residual: report.residual,
            residual_norm: report.residual_norm,
            iterations: report.iterations,
            evaluations: report.evaluations,
        })
    }
}
