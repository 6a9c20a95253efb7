use std::collections::BTreeMap;
use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::traits::EquationsOfMotion;

/// Whether the equations of motion describe a flow or a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Timing {
    /// `f(x)` is `dx/dt`; a steady state is a zero of the flow.
    Continuous,
    /// `f(x)` is `x_{t+1}`; a steady state is a fixed point of the map.
    Discrete,
}

/// Named model parameters, immutable once attached to a [`ModelSpec`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Parameters(BTreeMap<String, f64>);

impl Parameters {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder-style insertion; later values for the same name win.
    #[must_use]
    pub fn with(mut self, name: &str, value: f64) -> Self {
        self.0.insert(name.to_string(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(name, value)| (name.as_str(), *value))
    }
}

impl FromIterator<(String, f64)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Panics on a missing name, mirroring map indexing in std. Model-family
/// constructors populate every parameter their equations read, so a miss is
/// a programming error in the model definition, not a runtime condition.
impl Index<&str> for Parameters {
    type Output = f64;

    fn index(&self, name: &str) -> &f64 {
        self.0
            .get(name)
            .unwrap_or_else(|| panic!("unknown model parameter `{name}`"))
    }
}

/// Immutable description of a growth model: state-variable ordering,
/// parameters, timing, and the equations of motion.
///
/// The order of the state names defines the canonical flat-vector layout
/// shared by the steady-state solver and the stability analyzer.
pub struct ModelSpec<F> {
    parameters: Parameters,
    state_names: Vec<String>,
    timing: Timing,
    jump_variables: usize,
    motion: F,
}

impl<F: EquationsOfMotion> ModelSpec<F> {
    pub fn new(
        state_names: impl IntoIterator<Item = impl Into<String>>,
        parameters: Parameters,
        timing: Timing,
        motion: F,
    ) -> Result<Self, ModelError> {
        let state_names: Vec<String> = state_names.into_iter().map(Into::into).collect();
        if state_names.is_empty() {
            return Err(ModelError::Configuration(
                "a model needs at least one state variable".into(),
            ));
        }
        for (i, name) in state_names.iter().enumerate() {
            if state_names[..i].contains(name) {
                return Err(ModelError::Configuration(format!(
                    "duplicate state variable `{name}`"
                )));
            }
        }
        Ok(Self {
            parameters,
            state_names,
            timing,
            jump_variables: 0,
            motion,
        })
    }

    /// Declares how many state variables are non-predetermined (free to jump
    /// on impact). Only saddle-path classification reads this.
    pub fn with_jump_variables(mut self, count: usize) -> Result<Self, ModelError> {
        if count > self.state_names.len() {
            return Err(ModelError::Configuration(format!(
                "{count} jump variables declared for a {}-dimensional model",
                self.state_names.len()
            )));
        }
        self.jump_variables = count;
        Ok(self)
    }

    pub fn dimension(&self) -> usize {
        self.state_names.len()
    }

    pub fn state_names(&self) -> &[String] {
        &self.state_names
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn timing(&self) -> Timing {
        self.timing
    }

    pub fn jump_variables(&self) -> usize {
        self.jump_variables
    }

    /// Evaluates the raw equations of motion, with no residual
    /// transformation applied.
    pub fn evaluate(&self, x: &[f64], out: &mut [f64]) {
        self.motion.apply(x, &self.parameters, out);
    }
}
