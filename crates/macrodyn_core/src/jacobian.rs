use nalgebra::DMatrix;

/// Relative perturbation used when no analytic Jacobian is supplied.
pub const DEFAULT_FD_STEP: f64 = 1e-6;

/// Central-difference Jacobian of `f` at `x`.
///
/// The perturbation of each column is scaled to the magnitude of the
/// corresponding variable, so steady states far from unity do not lose the
/// derivative to cancellation error.
pub fn central_difference_jacobian<F>(f: F, x: &[f64], relative_step: f64) -> DMatrix<f64>
where
    F: Fn(&[f64], &mut [f64]),
{
    let dim = x.len();
    let mut jacobian = DMatrix::zeros(dim, dim);
    let mut forward = vec![0.0; dim];
    let mut backward = vec![0.0; dim];
    let mut point = x.to_vec();

    for j in 0..dim {
        let h = relative_step * x[j].abs().max(1.0);
        let original = point[j];

        point[j] = original + h;
        f(&point, &mut forward);
        point[j] = original - h;
        f(&point, &mut backward);
        point[j] = original;

        for i in 0..dim {
            jacobian[(i, j)] = (forward[i] - backward[i]) / (2.0 * h);
        }
    }
    jacobian
}

#[cfg(test)]
mod tests {
    use super::{central_difference_jacobian, DEFAULT_FD_STEP};

    #[test]
    fn matches_analytic_derivatives_of_a_quadratic_system() {
        // f0 = x^2 + y, f1 = x * y
        let f = |x: &[f64], out: &mut [f64]| {
            out[0] = x[0] * x[0] + x[1];
            out[1] = x[0] * x[1];
        };
        let jac = central_difference_jacobian(f, &[3.0, -2.0], DEFAULT_FD_STEP);

        assert!((jac[(0, 0)] - 6.0).abs() < 1e-6);
        assert!((jac[(0, 1)] - 1.0).abs() < 1e-6);
        assert!((jac[(1, 0)] + 2.0).abs() < 1e-6);
        assert!((jac[(1, 1)] - 3.0).abs() < 1e-6);
    }

    #[test]
    fn perturbation_scales_with_variable_magnitude() {
        // d/dx of x^2 at x = 1e6 is 2e6; an unscaled step would wipe out
        // every significant digit of the difference quotient.
        let f = |x: &[f64], out: &mut [f64]| out[0] = x[0] * x[0];
        let jac = central_difference_jacobian(f, &[1.0e6], DEFAULT_FD_STEP);
        assert!((jac[(0, 0)] - 2.0e6).abs() / 2.0e6 < 1e-9);
    }
}
