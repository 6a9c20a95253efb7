use crate::model::Parameters;

/// The model-definition boundary: a growth model family supplies one
/// vector-valued function describing its equations of motion.
///
/// For `Timing::Continuous` the output is the time derivative of each state
/// variable; for `Timing::Discrete` it is the next-period value. The output
/// buffer always has the same length as `x`, following the canonical state
/// ordering of the owning `ModelSpec`.
pub trait EquationsOfMotion {
    fn apply(&self, x: &[f64], params: &Parameters, out: &mut [f64]);
}

impl<F> EquationsOfMotion for F
where
    F: Fn(&[f64], &Parameters, &mut [f64]),
{
    fn apply(&self, x: &[f64], params: &Parameters, out: &mut [f64]) {
        self(x, params, out)
    }
}

/// Plain-function form of the equations of motion, convenient for model
/// families defined as free functions rather than capturing closures.
pub type MotionFn = fn(&[f64], &Parameters, &mut [f64]);
