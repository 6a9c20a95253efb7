//! Solow growth model with a fixed savings rate.
//!
//! A single predetermined state, capital per effective worker `k`, in either
//! timing convention:
//!
//!   continuous:  k' = s k^alpha - (n + g + delta) k
//!   discrete:    k_{t+1} = (s k^alpha + (1 - delta) k) / ((1 + n)(1 + g))
//!
//! With no jump variables the steady state is locally stable in both cases.

use macrodyn_core::error::ModelError;
use macrodyn_core::growth::GrowthModel;
use macrodyn_core::model::{ModelSpec, Parameters, Timing};
use macrodyn_core::traits::MotionFn;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolowParameters {
    /// Savings rate.
    pub s: f64,
    /// Capital share in production.
    pub alpha: f64,
    /// Depreciation rate.
    pub delta: f64,
    /// Population growth rate.
    pub n: f64,
    /// Growth rate of labor-augmenting technology.
    pub g: f64,
}

impl Default for SolowParameters {
    fn default() -> Self {
        Self {
            s: 0.2,
            alpha: 0.33,
            delta: 0.05,
            n: 0.01,
            g: 0.02,
        }
    }
}

impl SolowParameters {
    pub fn as_parameters(&self) -> Parameters {
        Parameters::new()
            .with("s", self.s)
            .with("alpha", self.alpha)
            .with("delta", self.delta)
            .with("n", self.n)
            .with("g", self.g)
    }

    /// Closed-form steady-state capital stock for the given timing.
    pub fn analytic_steady_state(&self, timing: Timing) -> f64 {
        let effective_depreciation = match timing {
            Timing::Continuous => self.n + self.g + self.delta,
            // Break-even investment of the discrete accumulation equation.
            Timing::Discrete => (1.0 + self.n) * (1.0 + self.g) - 1.0 + self.delta,
        };
        (self.s / effective_depreciation).powf(1.0 / (1.0 - self.alpha))
    }
}

fn continuous_motion(x: &[f64], params: &Parameters, out: &mut [f64]) {
    let k = x[0];
    out[0] = params["s"] * k.powf(params["alpha"])
        - (params["n"] + params["g"] + params["delta"]) * k;
}

fn discrete_motion(x: &[f64], params: &Parameters, out: &mut [f64]) {
    let k = x[0];
    out[0] = (params["s"] * k.powf(params["alpha"]) + (1.0 - params["delta"]) * k)
        / ((1.0 + params["n"]) * (1.0 + params["g"]));
}

/// Builds the Solow model in the requested timing convention.
pub fn solow_model(
    params: SolowParameters,
    timing: Timing,
) -> Result<GrowthModel<MotionFn>, ModelError> {
    let motion = match timing {
        Timing::Continuous => continuous_motion as MotionFn,
        Timing::Discrete => discrete_motion as MotionFn,
    };
    let spec = ModelSpec::new(["k"], params.as_parameters(), timing, motion)?;
    Ok(GrowthModel::new(spec))
}

#[cfg(test)]
mod tests {
    use super::{solow_model, SolowParameters};
    use macrodyn_core::model::Timing;
    use macrodyn_core::roots::{SolverMethod, SolverOptions};
    use macrodyn_core::stability::{StabilitySettings, StabilityVerdict};

    #[test]
    fn continuous_steady_state_matches_the_closed_form_and_is_stable() {
        let params = SolowParameters::default();
        let k_star = params.analytic_steady_state(Timing::Continuous);
        let mut model = solow_model(params, Timing::Continuous).expect("model should build");

        let outcome = model
            .solve_steady_state(
                &[1.0],
                SolverMethod::HybridPowell,
                None,
                &SolverOptions::default(),
            )
            .expect("guess has the right dimension");
        let values = outcome.steady_state().expect("solve should converge");
        assert!((values.get("k").expect("k is a state") - k_star).abs() < 1e-7);

        let report = model
            .check_stability(None, &StabilitySettings::default())
            .expect("steady state exists");
        assert_eq!(report.verdict, StabilityVerdict::Stable);
    }

    #[test]
    fn discrete_steady_state_matches_the_closed_form_and_is_stable() {
        let params = SolowParameters::default();
        let k_star = params.analytic_steady_state(Timing::Discrete);
        let mut model = solow_model(params, Timing::Discrete).expect("model should build");

        let outcome = model
            .solve_steady_state(
                &[1.0],
                SolverMethod::Broyden1,
                None,
                &SolverOptions::default(),
            )
            .expect("guess has the right dimension");
        let values = outcome.steady_state().expect("solve should converge");
        assert!((values.get("k").expect("k is a state") - k_star).abs() < 1e-7);

        // The map Jacobian at k* lies strictly inside the unit circle.
        let report = model
            .check_stability(None, &StabilitySettings::default())
            .expect("steady state exists");
        assert_eq!(report.verdict, StabilityVerdict::Stable);
        assert!(report.eigenvalues[0].modulus() < 1.0);
    }

    #[test]
    fn timing_conventions_produce_distinct_steady_states() {
        let params = SolowParameters::default();
        let continuous = params.analytic_steady_state(Timing::Continuous);
        let discrete = params.analytic_steady_state(Timing::Discrete);
        assert!(
            (continuous - discrete).abs() > 1e-3,
            "the two conventions should not coincide for nonzero n and g"
        );
    }

    #[test]
    fn mixing_methods_handle_the_contractive_continuous_residual() {
        let params = SolowParameters::default();
        let k_star = params.analytic_steady_state(Timing::Continuous);
        let mut model = solow_model(params, Timing::Continuous).expect("model should build");

        // The flow has slope (alpha - 1)(n + g + delta) < 0 at k*, which is
        // the regime the mixing family handles; a large coefficient offsets
        // the shallow slope.
        let outcome = model
            .solve_steady_state(
                &[3.0],
                SolverMethod::LinearMixing,
                None,
                &SolverOptions {
                    mixing: 10.0,
                    max_iterations: 5000,
                    ..SolverOptions::default()
                },
            )
            .expect("guess has the right dimension");
        let values = outcome.steady_state().expect("solve should converge");
        assert!((values.get("k").expect("k is a state") - k_star).abs() < 1e-6);
    }
}
