//! Nonlinear root finding for steady-state problems.
//!
//! [`solve_root`] is the boundary the steady-state solver talks to: a
//! residual function, an initial guess, a method from the closed
//! [`SolverMethod`] set, and an options block go in; a [`RootReport`] comes
//! out whether or not the iteration converged. Non-convergence is an
//! ordinary outcome here, never an error or a panic, so callers can inspect
//! the diagnostics and retry with a different guess or method.

use std::cell::Cell;

use anyhow::{anyhow, Result};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// The closed set of root-finding algorithms.
///
/// Method selection is an enum rather than a string key so that a typo is a
/// compile error instead of a silent fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolverMethod {
    /// Powell-style dogleg trust region; the general-purpose default.
    HybridPowell,
    /// Levenberg-Marquardt on the squared residual norm.
    LevenbergMarquardt,
    /// Quasi-Newton with Broyden's good (Jacobian) update.
    Broyden1,
    /// Quasi-Newton with Broyden's bad (inverse-Jacobian) update.
    Broyden2,
    /// Anderson mixing over a short residual history.
    Anderson,
    /// Plain damped fixed-point iteration.
    LinearMixing,
    /// Diagonal Broyden approximation of the Jacobian.
    DiagBroyden,
    /// Per-component tuned mixing coefficients.
    ExcitingMixing,
    /// Matrix-free Newton-GMRES; suited to larger systems where forming the
    /// Jacobian is too expensive.
    Krylov,
}

/// Tuning knobs passed through to the individual methods.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SolverOptions {
    /// Maximum outer iterations.
    pub max_iterations: usize,
    /// Convergence threshold on the residual norm.
    pub tolerance: f64,
    /// Relative step for forward-difference Jacobians.
    pub fd_step: f64,
    /// Mixing coefficient for the fixed-point family (linear, diagonal
    /// Broyden, exciting, Anderson).
    pub mixing: f64,
    /// History length for Anderson mixing.
    pub anderson_memory: usize,
    /// Krylov subspace dimension for Newton-GMRES.
    pub krylov_dimension: usize,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            max_iterations: 300,
            tolerance: 1e-9,
            fd_step: 1e-8,
            mixing: 0.5,
            anderson_memory: 5,
            krylov_dimension: 30,
        }
    }
}

/// What a root-finding run reported when it stopped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootReport {
    pub success: bool,
    /// Best iterate at termination (the root, on success).
    pub solution: Vec<f64>,
    /// Residual vector at the final iterate.
    pub residual: Vec<f64>,
    pub residual_norm: f64,
    pub iterations: usize,
    /// Residual function evaluations, finite differences included.
    pub evaluations: usize,
    pub message: String,
}

/// Analytic Jacobian of the residual. Only the Newton-type methods
/// (hybrid Powell, Levenberg-Marquardt, the Broyden seeds) consume it; the
/// mixing family and Newton-GMRES are matrix-free by construction.
pub type JacobianFn<'a> = dyn Fn(&[f64]) -> DMatrix<f64> + 'a;

/// Drives one method to convergence or failure and reports either way.
///
/// Numeric breakdowns inside a backend (singular Jacobian, degenerate
/// least-squares subproblem) are folded into a failed report rather than
/// propagated.
pub fn solve_root(
    residual: &dyn Fn(&[f64], &mut [f64]),
    jacobian: Option<&JacobianFn>,
    initial_guess: &[f64],
    method: SolverMethod,
    options: &SolverOptions,
) -> RootReport {
    let objective = Objective {
        f: residual,
        dim: initial_guess.len(),
        evaluations: Cell::new(0),
    };
    let x0 = DVector::from_column_slice(initial_guess);
    match method {
        SolverMethod::HybridPowell => hybrid_powell(&objective, jacobian, x0, options),
        SolverMethod::LevenbergMarquardt => levenberg_marquardt(&objective, jacobian, x0, options),
        SolverMethod::Broyden1 => broyden1(&objective, jacobian, x0, options),
        SolverMethod::Broyden2 => broyden2(&objective, jacobian, x0, options),
        SolverMethod::Anderson => anderson(&objective, x0, options),
        SolverMethod::LinearMixing => linear_mixing(&objective, x0, options),
        SolverMethod::DiagBroyden => diag_broyden(&objective, x0, options),
        SolverMethod::ExcitingMixing => exciting_mixing(&objective, x0, options),
        SolverMethod::Krylov => newton_krylov(&objective, x0, options),
    }
}

struct Objective<'a> {
    f: &'a dyn Fn(&[f64], &mut [f64]),
    dim: usize,
    evaluations: Cell<usize>,
}

impl Objective<'_> {
    fn eval(&self, x: &DVector<f64>) -> DVector<f64> {
        self.evaluations.set(self.evaluations.get() + 1);
        let mut out = vec![0.0; self.dim];
        (self.f)(x.as_slice(), &mut out);
        DVector::from_vec(out)
    }

    fn forward_jacobian(&self, x: &DVector<f64>, fx: &DVector<f64>, rel_step: f64) -> DMatrix<f64> {
        let dim = self.dim;
        let mut jacobian = DMatrix::zeros(dim, dim);
        let mut point = x.clone();
        for j in 0..dim {
            let h = rel_step.max(f64::EPSILON) * x[j].abs().max(1.0);
            let original = point[j];
            point[j] = original + h;
            let shifted = self.eval(&point);
            point[j] = original;
            for i in 0..dim {
                jacobian[(i, j)] = (shifted[i] - fx[i]) / h;
            }
        }
        jacobian
    }

    fn residual_jacobian(
        &self,
        x: &DVector<f64>,
        fx: &DVector<f64>,
        jacobian: Option<&JacobianFn>,
        rel_step: f64,
    ) -> DMatrix<f64> {
        match jacobian {
            Some(jac) => jac(x.as_slice()),
            None => self.forward_jacobian(x, fx, rel_step),
        }
    }
}

fn finish(
    objective: &Objective,
    x: DVector<f64>,
    fx: DVector<f64>,
    iterations: usize,
    options: &SolverOptions,
    breakdown: Option<String>,
) -> RootReport {
    let residual_norm = fx.norm();
    let success = breakdown.is_none() && residual_norm <= options.tolerance;
    let message = match breakdown {
        Some(reason) => reason,
        None if success => format!("converged: residual norm {residual_norm:.3e}"),
        None => format!(
            "did not converge within {} iterations (residual norm {residual_norm:.3e})",
            options.max_iterations
        ),
    };
    RootReport {
        success,
        solution: x.iter().copied().collect(),
        residual: fx.iter().copied().collect(),
        residual_norm,
        iterations,
        evaluations: objective.evaluations.get(),
        message,
    }
}

fn solve_linear_system(matrix: &DMatrix<f64>, rhs: &DVector<f64>) -> Result<DVector<f64>> {
    matrix
        .clone()
        .lu()
        .solve(rhs)
        .ok_or_else(|| anyhow!("Jacobian is singular"))
}

fn least_squares(matrix: &DMatrix<f64>, rhs: &DVector<f64>) -> Result<DVector<f64>> {
    matrix
        .clone()
        .svd(true, true)
        .solve(rhs, 1e-14)
        .map_err(|reason| anyhow!("least-squares solve failed: {reason}"))
}

/// Dogleg trust-region iteration blending the Newton and Cauchy steps.
fn hybrid_powell(
    objective: &Objective,
    jacobian: Option<&JacobianFn>,
    mut x: DVector<f64>,
    options: &SolverOptions,
) -> RootReport {
    let mut fx = objective.eval(&x);
    let mut radius = x.norm().max(1.0);
    let mut iterations = 0;

    while iterations < options.max_iterations {
        if fx.norm() <= options.tolerance {
            break;
        }
        let jac = objective.residual_jacobian(&x, &fx, jacobian, options.fd_step);
        let grad = jac.transpose() * &fx;
        if grad.norm() <= f64::EPSILON * fx.norm().max(1.0) {
            return finish(
                objective,
                x,
                fx,
                iterations,
                options,
                Some("stalled at a stationary point of the residual norm that is not a root".into()),
            );
        }
        let jg = &jac * &grad;
        if jg.norm_squared() == 0.0 {
            return finish(
                objective,
                x,
                fx,
                iterations,
                options,
                Some("Jacobian annihilates the gradient direction".into()),
            );
        }
        let cauchy = grad.scale(-(grad.norm_squared() / jg.norm_squared()));
        let newton = solve_linear_system(&jac, &fx).ok().map(|delta| -delta);

        let step = dogleg_step(newton.as_ref(), &cauchy, radius);
        let trial = &x + &step;
        let f_trial = objective.eval(&trial);

        let predicted = fx.norm_squared() - (&fx + &jac * &step).norm_squared();
        let actual = fx.norm_squared() - f_trial.norm_squared();
        let ratio = if predicted > 0.0 { actual / predicted } else { 0.0 };

        if ratio > 1e-4 {
            x = trial;
            fx = f_trial;
        }
        if ratio < 0.25 {
            radius *= 0.25;
            if radius < 1e-14 {
                return finish(
                    objective,
                    x,
                    fx,
                    iterations,
                    options,
                    Some("trust region collapsed before reaching the tolerance".into()),
                );
            }
        } else if ratio > 0.75 && step.norm() >= 0.99 * radius {
            radius = (2.0 * radius).min(1e8);
        }
        iterations += 1;
    }
    finish(objective, x, fx, iterations, options, None)
}

fn dogleg_step(
    newton: Option<&DVector<f64>>,
    cauchy: &DVector<f64>,
    radius: f64,
) -> DVector<f64> {
    if let Some(newton) = newton {
        if newton.norm() <= radius {
            return newton.clone();
        }
    }
    let cauchy_norm = cauchy.norm();
    if cauchy_norm >= radius {
        return cauchy.scale(radius / cauchy_norm.max(f64::EPSILON));
    }
    match newton {
        Some(newton) => {
            // Walk from the Cauchy point toward the Newton point until the
            // trust-region boundary.
            let leg = newton - cauchy;
            let a = leg.norm_squared();
            let b = 2.0 * cauchy.dot(&leg);
            let c = cauchy.norm_squared() - radius * radius;
            let discriminant = (b * b - 4.0 * a * c).max(0.0);
            let t = if a > 0.0 {
                ((-b + discriminant.sqrt()) / (2.0 * a)).clamp(0.0, 1.0)
            } else {
                0.0
            };
            cauchy + leg.scale(t)
        }
        None => cauchy.clone(),
    }
}

fn levenberg_marquardt(
    objective: &Objective,
    jacobian: Option<&JacobianFn>,
    mut x: DVector<f64>,
    options: &SolverOptions,
) -> RootReport {
    let mut fx = objective.eval(&x);
    let mut lambda = 1e-3;
    let mut iterations = 0;

    while iterations < options.max_iterations {
        if fx.norm() <= options.tolerance {
            break;
        }
        let jac = objective.residual_jacobian(&x, &fx, jacobian, options.fd_step);
        let jtj = jac.transpose() * &jac;
        let grad = jac.transpose() * &fx;

        let mut improved = false;
        for _ in 0..12 {
            let mut damped = jtj.clone();
            for i in 0..damped.nrows() {
                damped[(i, i)] += lambda * jtj[(i, i)].max(1e-12);
            }
            let step = match solve_linear_system(&damped, &grad) {
                Ok(step) => step,
                Err(_) => {
                    lambda *= 10.0;
                    continue;
                }
            };
            let trial = &x - &step;
            let f_trial = objective.eval(&trial);
            if f_trial.norm() < fx.norm() {
                x = trial;
                fx = f_trial;
                lambda = (lambda * 0.1).max(1e-12);
                improved = true;
                break;
            }
            lambda *= 10.0;
        }
        if !improved {
            return finish(
                objective,
                x,
                fx,
                iterations,
                options,
                Some("damping grew without reducing the residual".into()),
            );
        }
        iterations += 1;
    }
    finish(objective, x, fx, iterations, options, None)
}

fn broyden1(
    objective: &Objective,
    jacobian: Option<&JacobianFn>,
    mut x: DVector<f64>,
    options: &SolverOptions,
) -> RootReport {
    let mut fx = objective.eval(&x);
    let mut jac = objective.residual_jacobian(&x, &fx, jacobian, options.fd_step);
    let mut iterations = 0;

    while iterations < options.max_iterations {
        if fx.norm() <= options.tolerance {
            break;
        }
        let delta = match solve_linear_system(&jac, &fx) {
            Ok(delta) => delta,
            Err(_) => {
                // A stale quasi-Newton matrix can go singular; re-linearize.
                jac = objective.forward_jacobian(&x, &fx, options.fd_step);
                match solve_linear_system(&jac, &fx) {
                    Ok(delta) => delta,
                    Err(error) => {
                        return finish(objective, x, fx, iterations, options, Some(format!("{error:#}")))
                    }
                }
            }
        };

        // Backtracking keeps the full quasi-Newton step from overshooting.
        let mut scale = 1.0;
        let mut trial = &x - &delta;
        let mut f_trial = objective.eval(&trial);
        while f_trial.norm() >= fx.norm() && scale > 1.0 / 64.0 {
            scale *= 0.5;
            trial = &x - &delta.scale(scale);
            f_trial = objective.eval(&trial);
        }

        let dx = &trial - &x;
        let df = &f_trial - &fx;
        let denom = dx.norm_squared();
        if denom > 0.0 {
            let correction = (&df - &jac * &dx).scale(1.0 / denom);
            jac += correction * dx.transpose();
        }
        x = trial;
        fx = f_trial;
        iterations += 1;
    }
    finish(objective, x, fx, iterations, options, None)
}

fn broyden2(
    objective: &Objective,
    jacobian: Option<&JacobianFn>,
    mut x: DVector<f64>,
    options: &SolverOptions,
) -> RootReport {
    let mut fx = objective.eval(&x);
    let seed = objective.residual_jacobian(&x, &fx, jacobian, options.fd_step);
    let mut inverse = match seed.try_inverse() {
        Some(inverse) => inverse,
        None => DMatrix::identity(objective.dim, objective.dim),
    };
    let mut iterations = 0;

    while iterations < options.max_iterations {
        if fx.norm() <= options.tolerance {
            break;
        }
        let delta = &inverse * &fx;

        let mut scale = 1.0;
        let mut trial = &x - &delta;
        let mut f_trial = objective.eval(&trial);
        while f_trial.norm() >= fx.norm() && scale > 1.0 / 64.0 {
            scale *= 0.5;
            trial = &x - &delta.scale(scale);
            f_trial = objective.eval(&trial);
        }

        let dx = &trial - &x;
        let df = &f_trial - &fx;
        let denom = df.norm_squared();
        if denom > 0.0 {
            let correction = (&dx - &inverse * &df).scale(1.0 / denom);
            inverse += correction * df.transpose();
        }
        x = trial;
        fx = f_trial;
        iterations += 1;
    }
    finish(objective, x, fx, iterations, options, None)
}

/// Anderson mixing in the Walker-Ni difference formulation: the next iterate
/// combines the plain mixed step with a least-squares extrapolation over the
/// recent residual history.
fn anderson(objective: &Objective, mut x: DVector<f64>, options: &SolverOptions) -> RootReport {
    let alpha = options.mixing;
    let mut fx = objective.eval(&x);
    let mut dxs: Vec<DVector<f64>> = Vec::new();
    let mut dfs: Vec<DVector<f64>> = Vec::new();
    let mut iterations = 0;

    while iterations < options.max_iterations {
        if fx.norm() <= options.tolerance {
            break;
        }
        let next = if dfs.is_empty() {
            &x + &fx.scale(alpha)
        } else {
            let memory = dfs.len();
            let df_mat = DMatrix::from_fn(objective.dim, memory, |i, j| dfs[j][i]);
            let dx_mat = DMatrix::from_fn(objective.dim, memory, |i, j| dxs[j][i]);
            match least_squares(&df_mat, &fx) {
                Ok(gamma) => {
                    &x + &fx.scale(alpha) - (&dx_mat + &df_mat.scale(alpha)) * &gamma
                }
                // Degenerate history; fall back to plain mixing.
                Err(_) => &x + &fx.scale(alpha),
            }
        };
        let f_next = objective.eval(&next);

        dxs.push(&next - &x);
        dfs.push(&f_next - &fx);
        if dxs.len() > options.anderson_memory.max(1) {
            dxs.remove(0);
            dfs.remove(0);
        }
        x = next;
        fx = f_next;
        iterations += 1;
    }
    finish(objective, x, fx, iterations, options, None)
}

fn linear_mixing(objective: &Objective, mut x: DVector<f64>, options: &SolverOptions) -> RootReport {
    let mut fx = objective.eval(&x);
    let mut iterations = 0;

    while iterations < options.max_iterations && fx.norm() > options.tolerance {
        x += fx.scale(options.mixing);
        fx = objective.eval(&x);
        iterations += 1;
    }
    finish(objective, x, fx, iterations, options, None)
}

fn diag_broyden(objective: &Objective, mut x: DVector<f64>, options: &SolverOptions) -> RootReport {
    let dim = objective.dim;
    let mut fx = objective.eval(&x);
    // Diagonal Jacobian approximation, seeded at -1/alpha like the rest of
    // the mixing family.
    let mut diagonal = DVector::from_element(dim, -1.0 / options.mixing);
    let mut iterations = 0;

    while iterations < options.max_iterations {
        if fx.norm() <= options.tolerance {
            break;
        }
        let mut next = x.clone();
        for i in 0..dim {
            let d = if diagonal[i].abs() < 1e-12 {
                -1.0 / options.mixing
            } else {
                diagonal[i]
            };
            next[i] -= fx[i] / d;
        }
        let f_next = objective.eval(&next);

        let dx = &next - &x;
        let df = &f_next - &fx;
        let denom = dx.norm_squared();
        if denom > 0.0 {
            for i in 0..dim {
                diagonal[i] += (df[i] - diagonal[i] * dx[i]) * dx[i] / denom;
            }
        }
        x = next;
        fx = f_next;
        iterations += 1;
    }
    finish(objective, x, fx, iterations, options, None)
}

fn exciting_mixing(
    objective: &Objective,
    mut x: DVector<f64>,
    options: &SolverOptions,
) -> RootReport {
    let alpha = options.mixing;
    let alpha_max = 1.0_f64.max(alpha);
    let mut coefficients = DVector::from_element(objective.dim, alpha);
    let mut fx = objective.eval(&x);
    let mut iterations = 0;

    while iterations < options.max_iterations {
        if fx.norm() <= options.tolerance {
            break;
        }
        for i in 0..objective.dim {
            x[i] += coefficients[i] * fx[i];
        }
        let f_next = objective.eval(&x);
        for i in 0..objective.dim {
            // Grow the coefficient while the residual keeps its sign; a sign
            // flip means the component overshot, so reset.
            if f_next[i] * fx[i] > 0.0 {
                coefficients[i] = (coefficients[i] + alpha).min(alpha_max);
            } else {
                coefficients[i] = alpha;
            }
        }
        fx = f_next;
        iterations += 1;
    }
    finish(objective, x, fx, iterations, options, None)
}

fn newton_krylov(objective: &Objective, mut x: DVector<f64>, options: &SolverOptions) -> RootReport {
    let mut fx = objective.eval(&x);
    let mut iterations = 0;

    while iterations < options.max_iterations {
        if fx.norm() <= options.tolerance {
            break;
        }
        let step = match gmres(objective, &x, &fx, options) {
            Ok(step) => step,
            Err(error) => {
                return finish(objective, x, fx, iterations, options, Some(format!("{error:#}")))
            }
        };

        let mut scale = 1.0;
        let mut trial = &x + &step;
        let mut f_trial = objective.eval(&trial);
        while f_trial.norm() >= fx.norm() && scale > 1.0 / 64.0 {
            scale *= 0.5;
            trial = &x + &step.scale(scale);
            f_trial = objective.eval(&trial);
        }
        x = trial;
        fx = f_trial;
        iterations += 1;
    }
    finish(objective, x, fx, iterations, options, None)
}

/// Matrix-free GMRES on `J s = -f`, with directional finite differences
/// standing in for Jacobian-vector products.
fn gmres(
    objective: &Objective,
    x: &DVector<f64>,
    fx: &DVector<f64>,
    options: &SolverOptions,
) -> Result<DVector<f64>> {
    let dim = objective.dim;
    let subspace = options.krylov_dimension.min(dim).max(1);
    let rhs = fx.scale(-1.0);
    let beta = rhs.norm();
    if beta == 0.0 {
        return Ok(DVector::zeros(dim));
    }

    let mut basis: Vec<DVector<f64>> = vec![rhs.scale(1.0 / beta)];
    let mut hessenberg = DMatrix::<f64>::zeros(subspace + 1, subspace);
    let mut best: Option<DVector<f64>> = None;

    for j in 0..subspace {
        let mut w = directional_derivative(objective, x, fx, &basis[j], options.fd_step);
        for i in 0..=j {
            hessenberg[(i, j)] = w.dot(&basis[i]);
            w -= basis[i].scale(hessenberg[(i, j)]);
        }
        let w_norm = w.norm();
        hessenberg[(j + 1, j)] = w_norm;

        // Small least-squares problem min ‖beta*e1 - H y‖ over the current
        // subspace.
        let reduced = hessenberg.view((0, 0), (j + 2, j + 1)).into_owned();
        let mut e1 = DVector::zeros(j + 2);
        e1[0] = beta;
        let y = least_squares(&reduced, &e1)?;

        let mut step = DVector::zeros(dim);
        for (index, q) in basis.iter().enumerate().take(j + 1) {
            step += q.scale(y[index]);
        }
        let inner_residual = (&reduced * &y - &e1).norm();
        best = Some(step);

        if inner_residual <= 0.1 * beta || w_norm < 1e-12 {
            break;
        }
        basis.push(w.scale(1.0 / w_norm));
    }
    best.ok_or_else(|| anyhow!("empty Krylov subspace"))
}

fn directional_derivative(
    objective: &Objective,
    x: &DVector<f64>,
    fx: &DVector<f64>,
    direction: &DVector<f64>,
    rel_step: f64,
) -> DVector<f64> {
    let direction_norm = direction.norm();
    if direction_norm == 0.0 {
        return DVector::zeros(x.len());
    }
    let h = rel_step.max(f64::EPSILON) * x.norm().max(1.0) / direction_norm;
    let shifted = x + direction.scale(h);
    let f_shifted = objective.eval(&shifted);
    (f_shifted - fx).scale(1.0 / h)
}

#[cfg(test)]
mod tests {
    use super::{solve_root, SolverMethod, SolverOptions};
    use nalgebra::DMatrix;

    fn linear_residual(x: &[f64], out: &mut [f64]) {
        // A x - b with A = [[3, 1], [1, 2]], b = [5, 5]; root at (1, 2).
        out[0] = 3.0 * x[0] + x[1] - 5.0;
        out[1] = x[0] + 2.0 * x[1] - 5.0;
    }

    fn circle_line_residual(x: &[f64], out: &mut [f64]) {
        // x^2 + y^2 = 4 intersected with x = y; root at (sqrt(2), sqrt(2)).
        out[0] = x[0] * x[0] + x[1] * x[1] - 4.0;
        out[1] = x[0] - x[1];
    }

    fn assert_root(method: SolverMethod, residual: fn(&[f64], &mut [f64]), guess: &[f64], root: &[f64], options: &SolverOptions) {
        let report = solve_root(&residual, None, guess, method, options);
        assert!(report.success, "{method:?} failed: {}", report.message);
        assert!(report.residual_norm <= options.tolerance);
        for (found, expected) in report.solution.iter().zip(root) {
            assert!(
                (found - expected).abs() < 1e-6,
                "{method:?} landed at {:?}, expected {root:?}",
                report.solution
            );
        }
    }

    #[test]
    fn hybrid_powell_solves_a_scalar_quadratic() {
        let residual = |x: &[f64], out: &mut [f64]| out[0] = x[0] * x[0] - 4.0;
        let report = solve_root(
            &residual,
            None,
            &[1.0],
            SolverMethod::HybridPowell,
            &SolverOptions::default(),
        );
        assert!(report.success, "{}", report.message);
        assert!((report.solution[0] - 2.0).abs() < 1e-7);
        assert!(report.evaluations > 0);
    }

    #[test]
    fn newton_type_methods_solve_the_circle_line_system() {
        let root = [2.0_f64.sqrt(), 2.0_f64.sqrt()];
        let options = SolverOptions::default();
        for method in [
            SolverMethod::HybridPowell,
            SolverMethod::LevenbergMarquardt,
            SolverMethod::Broyden1,
            SolverMethod::Broyden2,
        ] {
            assert_root(method, circle_line_residual, &[1.0, 1.5], &root, &options);
        }
    }

    #[test]
    fn krylov_and_anderson_solve_the_linear_system() {
        let options = SolverOptions::default();
        for method in [SolverMethod::Krylov, SolverMethod::Anderson] {
            assert_root(method, linear_residual, &[0.0, 0.0], &[1.0, 2.0], &options);
        }
    }

    #[test]
    fn mixing_family_solves_contractive_residuals() {
        // F(x) = 2 - x: negative-slope residual, the regime the mixing
        // methods are built for.
        let residual = |x: &[f64], out: &mut [f64]| out[0] = 2.0 - x[0];
        for method in [
            SolverMethod::LinearMixing,
            SolverMethod::DiagBroyden,
            SolverMethod::ExcitingMixing,
        ] {
            let report = solve_root(
                &residual,
                None,
                &[0.0],
                method,
                &SolverOptions {
                    max_iterations: 2000,
                    ..SolverOptions::default()
                },
            );
            assert!(report.success, "{method:?} failed: {}", report.message);
            assert!((report.solution[0] - 2.0).abs() < 1e-7, "{method:?}");
        }
    }

    #[test]
    fn supplied_jacobian_is_used_by_newton_methods() {
        let jacobian = |_x: &[f64]| DMatrix::from_row_slice(2, 2, &[3.0, 1.0, 1.0, 2.0]);
        let report = solve_root(
            &linear_residual,
            Some(&jacobian),
            &[10.0, -10.0],
            SolverMethod::HybridPowell,
            &SolverOptions::default(),
        );
        assert!(report.success, "{}", report.message);
        assert!((report.solution[0] - 1.0).abs() < 1e-8);
        assert!((report.solution[1] - 2.0).abs() < 1e-8);
    }

    #[test]
    fn rootless_residual_reports_failure_instead_of_panicking() {
        let residual = |x: &[f64], out: &mut [f64]| out[0] = x[0] * x[0] + 1.0;
        let report = solve_root(
            &residual,
            None,
            &[3.0],
            SolverMethod::HybridPowell,
            &SolverOptions::default(),
        );
        assert!(!report.success);
        assert!(!report.message.is_empty());
        assert!(report.residual_norm > 0.5);
    }

    #[test]
    fn iteration_budget_is_honored() {
        let residual = |x: &[f64], out: &mut [f64]| out[0] = 2.0 - x[0];
        let report = solve_root(
            &residual,
            None,
            &[0.0],
            SolverMethod::LinearMixing,
            &SolverOptions {
                max_iterations: 3,
                ..SolverOptions::default()
            },
        );
        assert!(!report.success);
        assert_eq!(report.iterations, 3);
        assert!(report.message.contains("3 iterations"));
    }

    #[test]
    fn zero_residual_guess_converges_without_iterating() {
        let residual = |_x: &[f64], out: &mut [f64]| out[0] = 0.0;
        let report = solve_root(
            &residual,
            None,
            &[7.0],
            SolverMethod::HybridPowell,
            &SolverOptions::default(),
        );
        assert!(report.success);
        assert_eq!(report.iterations, 0);
        assert!((report.solution[0] - 7.0).abs() < 1e-15);
    }
}
