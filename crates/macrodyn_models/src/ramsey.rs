//! Ramsey-Cass-Koopmans model with inelastic labor supply.
//!
//! States, per effective worker: capital `k` (predetermined) and consumption
//! `c` (free to jump). Cobb-Douglas technology `y = k^alpha`, CRRA utility.
//!
//!   k' = k^alpha - c - (n + g + delta) k
//!   c' = (c / theta) (alpha k^(alpha-1) - delta - rho - theta g)
//!
//! The steady state is saddle-path stable: the economy reaches it only along
//! the stable arm, with consumption jumping onto that arm at date zero.

use macrodyn_core::error::ModelError;
use macrodyn_core::growth::GrowthModel;
use macrodyn_core::model::{ModelSpec, Parameters, Timing};
use macrodyn_core::traits::MotionFn;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RamseyParameters {
    /// Capital share in production.
    pub alpha: f64,
    /// Depreciation rate.
    pub delta: f64,
    /// Pure rate of time preference.
    pub rho: f64,
    /// CRRA curvature (inverse intertemporal elasticity of substitution).
    pub theta: f64,
    /// Population growth rate.
    pub n: f64,
    /// Growth rate of labor-augmenting technology.
    pub g: f64,
}

impl Default for RamseyParameters {
    fn default() -> Self {
        Self {
            alpha: 0.33,
            delta: 0.05,
            rho: 0.02,
            theta: 2.0,
            n: 0.01,
            g: 0.02,
        }
    }
}

impl RamseyParameters {
    pub fn as_parameters(&self) -> Parameters {
        Parameters::new()
            .with("alpha", self.alpha)
            .with("delta", self.delta)
            .with("rho", self.rho)
            .with("theta", self.theta)
            .with("n", self.n)
            .with("g", self.g)
    }

    /// Closed-form steady state `(k*, c*)` from the modified golden rule
    /// `f'(k*) = delta + rho + theta g`, used to cross-check the solver.
    pub fn analytic_steady_state(&self) -> (f64, f64) {
        let k = (self.alpha / (self.delta + self.rho + self.theta * self.g))
            .powf(1.0 / (1.0 - self.alpha));
        let c = k.powf(self.alpha) - (self.n + self.g + self.delta) * k;
        (k, c)
    }
}

fn motion(x: &[f64], params: &Parameters, out: &mut [f64]) {
    let (k, c) = (x[0], x[1]);
    let alpha = params["alpha"];
    let delta = params["delta"];
    let rho = params["rho"];
    let theta = params["theta"];
    let n = params["n"];
    let g = params["g"];

    out[0] = k.powf(alpha) - c - (n + g + delta) * k;
    out[1] = c / theta * (alpha * k.powf(alpha - 1.0) - delta - rho - theta * g);
}

/// Analytic model Jacobian in `(k, c)`, usable both to sharpen the solver
/// and as the stability-side Jacobian.
pub fn jacobian(x: &[f64], params: &Parameters) -> DMatrix<f64> {
    let (k, c) = (x[0], x[1]);
    let alpha = params["alpha"];
    let delta = params["delta"];
    let rho = params["rho"];
    let theta = params["theta"];
    let n = params["n"];
    let g = params["g"];

    let marginal_product = alpha * k.powf(alpha - 1.0);
    DMatrix::from_row_slice(
        2,
        2,
        &[
            marginal_product - (n + g + delta),
            -1.0,
            c / theta * alpha * (alpha - 1.0) * k.powf(alpha - 2.0),
            (marginal_product - delta - rho - theta * g) / theta,
        ],
    )
}

/// Builds the Ramsey model: two states in continuous time, consumption
/// declared as the single jump variable.
pub fn ramsey_model(params: RamseyParameters) -> Result<GrowthModel<MotionFn>, ModelError> {
    let spec = ModelSpec::new(
        ["k", "c"],
        params.as_parameters(),
        Timing::Continuous,
        motion as MotionFn,
    )?
    .with_jump_variables(1)?;
    Ok(GrowthModel::new(spec))
}

#[cfg(test)]
mod tests {
    use super::{jacobian, ramsey_model, RamseyParameters};
    use macrodyn_core::roots::{SolverMethod, SolverOptions};
    use macrodyn_core::stability::{StabilitySettings, StabilityVerdict};

    #[test]
    fn solver_recovers_the_modified_golden_rule_steady_state() {
        let params = RamseyParameters::default();
        let (k_star, c_star) = params.analytic_steady_state();
        let mut model = ramsey_model(params).expect("model should build");

        let outcome = model
            .solve_steady_state(
                &[0.8 * k_star, 0.8 * c_star],
                SolverMethod::HybridPowell,
                None,
                &SolverOptions::default(),
            )
            .expect("guess has the right dimension");
        let values = outcome.steady_state().expect("solve should converge");

        assert!((values.get("k").expect("k is a state") - k_star).abs() < 1e-7);
        assert!((values.get("c").expect("c is a state") - c_star).abs() < 1e-7);
    }

    #[test]
    fn an_analytic_jacobian_reaches_the_same_steady_state() {
        let params = RamseyParameters::default();
        let (k_star, c_star) = params.analytic_steady_state();
        let mut model = ramsey_model(params).expect("model should build");

        let outcome = model
            .solve_steady_state(
                &[0.8 * k_star, 0.8 * c_star],
                SolverMethod::LevenbergMarquardt,
                Some(&jacobian),
                &SolverOptions::default(),
            )
            .expect("guess has the right dimension");
        let values = outcome.steady_state().expect("solve should converge");
        assert!((values.get("k").expect("k is a state") - k_star).abs() < 1e-6);
    }

    #[test]
    fn steady_state_is_saddle_path_stable() {
        let params = RamseyParameters::default();
        let mut model = ramsey_model(params).expect("model should build");
        let (k_star, c_star) = params.analytic_steady_state();
        model
            .solve_steady_state(
                &[k_star, c_star],
                SolverMethod::HybridPowell,
                None,
                &SolverOptions::default(),
            )
            .expect("guess has the right dimension");

        let report = model
            .check_stability(None, &StabilitySettings::default())
            .expect("steady state exists");
        assert_eq!(report.verdict, StabilityVerdict::SaddlePath);

        // One eigenvalue on each side of the imaginary axis.
        let negatives = report.eigenvalues.iter().filter(|ev| ev.re < 0.0).count();
        assert_eq!(negatives, 1);
    }

    #[test]
    fn supplied_stability_jacobian_matches_the_estimated_verdict() {
        let params = RamseyParameters::default();
        let (k_star, c_star) = params.analytic_steady_state();
        let mut model = ramsey_model(params).expect("model should build");
        model
            .solve_steady_state(
                &[k_star, c_star],
                SolverMethod::HybridPowell,
                None,
                &SolverOptions::default(),
            )
            .expect("guess has the right dimension");

        let at_steady_state = jacobian(
            model.steady_state().expect("stored").as_slice(),
            model.spec().parameters(),
        );
        let report = model
            .check_stability(Some(&at_steady_state), &StabilitySettings::default())
            .expect("steady state exists");
        assert_eq!(report.verdict, StabilityVerdict::SaddlePath);
    }
}
