//! Local stability classification of a computed steady state.
//!
//! The linearized dynamics are read off the eigenvalues of the model
//! Jacobian at the steady state. What counts as "stable" depends on timing:
//! a flow is judged by real parts against zero, a map by moduli against the
//! unit circle.

use nalgebra::DMatrix;
use num_complex::Complex;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::jacobian::{central_difference_jacobian, DEFAULT_FD_STEP};
use crate::model::{ModelSpec, Timing};
use crate::steady_state::SteadyStateValues;
use crate::traits::EquationsOfMotion;

/// Serializable complex value for reporting eigenvalues.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComplexNumber {
    pub re: f64,
    pub im: f64,
}

impl From<Complex<f64>> for ComplexNumber {
    fn from(value: Complex<f64>) -> Self {
        Self {
            re: value.re,
            im: value.im,
        }
    }
}

impl ComplexNumber {
    pub fn modulus(&self) -> f64 {
        self.re.hypot(self.im)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StabilityVerdict {
    /// Every eigenvalue lies strictly inside the stable region.
    Stable,
    /// Every eigenvalue lies strictly outside it.
    Unstable,
    /// The stable eigenvalue count matches the declared jump variables.
    SaddlePath,
    /// Borderline eigenvalues, or a count that matches no declared split.
    Indeterminate,
}

/// Verdict plus the eigenvalue set it was derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilityReport {
    pub verdict: StabilityVerdict,
    pub eigenvalues: Vec<ComplexNumber>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StabilitySettings {
    /// Relative perturbation for the finite-difference Jacobian.
    pub fd_step: f64,
    /// Eigenvalues closer than this to the stability boundary (zero real
    /// part, or unit modulus) force an indeterminate verdict.
    pub boundary_tolerance: f64,
}

impl Default for StabilitySettings {
    fn default() -> Self {
        Self {
            fd_step: DEFAULT_FD_STEP,
            boundary_tolerance: 1e-9,
        }
    }
}

/// Classifies the local stability of `steady_state`. Pure query: nothing is
/// cached and nothing on the model changes.
///
/// `jacobian`, when supplied, is the Jacobian of the equations of motion
/// evaluated at the steady state; otherwise it is estimated by central
/// finite differences with per-variable step scaling.
pub fn classify<F: EquationsOfMotion>(
    spec: &ModelSpec<F>,
    steady_state: &SteadyStateValues,
    jacobian: Option<&DMatrix<f64>>,
    settings: &StabilitySettings,
) -> Result<StabilityReport, ModelError> {
    let dim = spec.dimension();
    if steady_state.len() != dim {
        return Err(ModelError::DimensionMismatch {
            expected: dim,
            actual: steady_state.len(),
        });
    }

    let estimated;
    let jacobian = match jacobian {
        Some(matrix) => {
            if matrix.nrows() != dim || matrix.ncols() != dim {
                return Err(ModelError::DimensionMismatch {
                    expected: dim,
                    actual: matrix.nrows().max(matrix.ncols()),
                });
            }
            matrix
        }
        None => {
            estimated = central_difference_jacobian(
                |x: &[f64], out: &mut [f64]| spec.evaluate(x, out),
                steady_state.as_slice(),
                settings.fd_step,
            );
            &estimated
        }
    };

    let eigenvalues: Vec<Complex<f64>> = jacobian
        .clone()
        .complex_eigenvalues()
        .iter()
        .cloned()
        .collect();
    let verdict = classify_eigenvalues(
        &eigenvalues,
        spec.timing(),
        spec.jump_variables(),
        settings.boundary_tolerance,
    );
    Ok(StabilityReport {
        verdict,
        eigenvalues: eigenvalues.into_iter().map(ComplexNumber::from).collect(),
    })
}

fn classify_eigenvalues(
    eigenvalues: &[Complex<f64>],
    timing: Timing,
    jump_variables: usize,
    tolerance: f64,
) -> StabilityVerdict {
    // Signed distance from the stability boundary: negative inside.
    let margin = |ev: &Complex<f64>| match timing {
        Timing::Continuous => ev.re,
        Timing::Discrete => ev.norm() - 1.0,
    };
    let inside = eigenvalues.iter().filter(|ev| margin(ev) < -tolerance).count();
    let outside = eigenvalues.iter().filter(|ev| margin(ev) > tolerance).count();
    let dim = eigenvalues.len();

    if inside == dim {
        StabilityVerdict::Stable
    } else if outside == dim {
        StabilityVerdict::Unstable
    } else if inside + outside == dim && inside == jump_variables {
        StabilityVerdict::SaddlePath
    } else {
        StabilityVerdict::Indeterminate
    }
}
