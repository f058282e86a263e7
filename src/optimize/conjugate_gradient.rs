//! Nonlinear conjugate-gradient minimizer.
//!
//! Polak-Ribière directions with β clipped at zero, a strong-Wolfe line
//! search (bracketing then zoom with cubic/quadratic interpolation) and
//! forward-difference gradients. Termination follows the usual rules: the
//! infinity norm of the gradient drops to `gtol`, the iteration budget runs
//! out, or the line search cannot make progress.

use nalgebra::DVector;
use tracing::{debug, info, warn};

use super::traits::{Objective, OptimizationResult};
use crate::error::{Result, VqeError};

const MSG_SUCCESS: &str = "Optimization terminated successfully.";
const MSG_MAXITER: &str = "Maximum number of iterations has been exceeded.";
const MSG_PRECISION_LOSS: &str = "Desired error not necessarily achieved due to precision loss.";

/// Sufficient-descent factor required of each new direction.
const SIGMA_3: f64 = 0.01;

/// Conjugate-gradient optimizer settings.
#[derive(Clone, Debug)]
pub struct ConjugateGradient {
    /// Gradient infinity-norm tolerance
    pub gtol: f64,
    /// Iteration cap, `200 · len(x)` when unset
    pub max_iterations: Option<usize>,
    /// Absolute forward-difference step
    pub fd_step: f64,
    /// Armijo constant
    pub c1: f64,
    /// Curvature constant
    pub c2: f64,
}

impl Default for ConjugateGradient {
    fn default() -> Self {
        Self {
            gtol: 1e-5,
            max_iterations: None,
            fd_step: f64::EPSILON.sqrt(),
            c1: 1e-4,
            c2: 0.4,
        }
    }
}

/// Objective wrapper counting calls and caching the last value.
struct CountingObjective<'a, O: Objective + ?Sized> {
    objective: &'a mut O,
    fd_step: f64,
    function_evaluations: usize,
    gradient_evaluations: usize,
    last: Option<(DVector<f64>, f64)>,
}

impl<'a, O: Objective + ?Sized> CountingObjective<'a, O> {
    fn call(&mut self, x: &DVector<f64>) -> Result<f64> {
        let value = self.objective.evaluate(x)?;
        self.function_evaluations += 1;
        if !value.is_finite() {
            return Err(VqeError::NonFiniteObjective(value));
        }
        Ok(value)
    }

    fn value(&mut self, x: &DVector<f64>) -> Result<f64> {
        if let Some((cached_x, cached_f)) = &self.last {
            if cached_x == x {
                return Ok(*cached_f);
            }
        }
        let value = self.call(x)?;
        self.last = Some((x.clone(), value));
        Ok(value)
    }

    /// Forward differences `(f(x + h e_i) − f(x)) / h`.
    fn gradient(&mut self, x: &DVector<f64>) -> Result<DVector<f64>> {
        let f0 = self.value(x)?;
        let mut grad = DVector::zeros(x.len());
        let mut shifted = x.clone();
        for i in 0..x.len() {
            shifted[i] = x[i] + self.fd_step;
            let dx = shifted[i] - x[i];
            grad[i] = (self.call(&shifted)? - f0) / dx;
            shifted[i] = x[i];
        }
        self.gradient_evaluations += 1;
        Ok(grad)
    }
}

/// Accepted step of a line search.
struct LineSearchStep {
    alpha: f64,
    value: f64,
    /// Gradient at the new point, when the search computed it
    gradient: Option<DVector<f64>>,
}

/// One-dimensional restriction `φ(α) = f(x + α p)`.
struct LineFunction<'s, 'a, O: Objective + ?Sized> {
    objective: &'s mut CountingObjective<'a, O>,
    x: &'s DVector<f64>,
    direction: &'s DVector<f64>,
    last_gradient: Option<(f64, DVector<f64>)>,
}

impl<'s, 'a, O: Objective + ?Sized> LineFunction<'s, 'a, O> {
    fn point(&self, alpha: f64) -> DVector<f64> {
        self.x + self.direction * alpha
    }

    fn phi(&mut self, alpha: f64) -> Result<f64> {
        let point = self.point(alpha);
        self.objective.value(&point)
    }

    fn derphi(&mut self, alpha: f64) -> Result<f64> {
        let point = self.point(alpha);
        let grad = self.objective.gradient(&point)?;
        let slope = grad.dot(self.direction);
        self.last_gradient = Some((alpha, grad));
        Ok(slope)
    }

    fn gradient_at(&self, alpha: f64) -> Option<&DVector<f64>> {
        match &self.last_gradient {
            Some((a, g)) if *a == alpha => Some(g),
            _ => None,
        }
    }

    fn take_gradient(&mut self, alpha: f64) -> Option<DVector<f64>> {
        match self.last_gradient.take() {
            Some((a, g)) if a == alpha => Some(g),
            _ => None,
        }
    }
}

/// Minimizer of the cubic through `(a, fa)`, `(b, fb)`, `(c, fc)` with slope
/// `fpa` at `a`.
fn cubicmin(a: f64, fa: f64, fpa: f64, b: f64, fb: f64, c: f64, fc: f64) -> Option<f64> {
    let db = b - a;
    let dc = c - a;
    let denom = (db * dc).powi(2) * (db - dc);
    let rb = fb - fa - fpa * db;
    let rc = fc - fa - fpa * dc;
    let aa = (dc * dc * rb - db * db * rc) / denom;
    let bb = (-dc.powi(3) * rb + db.powi(3) * rc) / denom;
    let radical = bb * bb - 3.0 * aa * fpa;
    if radical < 0.0 {
        return None;
    }
    let xmin = a + (-bb + radical.sqrt()) / (3.0 * aa);
    xmin.is_finite().then_some(xmin)
}

/// Minimizer of the quadratic through `(a, fa)`, `(b, fb)` with slope `fpa`
/// at `a`.
fn quadmin(a: f64, fa: f64, fpa: f64, b: f64, fb: f64) -> Option<f64> {
    let db = b - a;
    let bb = (fb - fa - fpa * db) / (db * db);
    let xmin = a - fpa / (2.0 * bb);
    xmin.is_finite().then_some(xmin)
}

struct WolfeParams {
    phi0: f64,
    derphi0: f64,
    c1: f64,
    c2: f64,
}

#[allow(clippy::too_many_arguments)]
fn zoom<O, C>(
    line: &mut LineFunction<'_, '_, O>,
    mut a_lo: f64,
    mut a_hi: f64,
    mut phi_lo: f64,
    mut phi_hi: f64,
    mut derphi_lo: f64,
    params: &WolfeParams,
    extra_condition: &C,
) -> Result<Option<(f64, f64, bool)>>
where
    O: Objective + ?Sized,
    C: Fn(f64, &DVector<f64>) -> bool,
{
    const MAX_ITER: usize = 10;
    const DELTA1: f64 = 0.2;
    const DELTA2: f64 = 0.1;

    let mut phi_rec = params.phi0;
    let mut a_rec = 0.0;

    for i in 0..=MAX_ITER {
        let dalpha = a_hi - a_lo;
        let (a, b) = if dalpha < 0.0 { (a_hi, a_lo) } else { (a_lo, a_hi) };

        let cubic = if i > 0 {
            let cchk = DELTA1 * dalpha;
            cubicmin(a_lo, phi_lo, derphi_lo, a_hi, phi_hi, a_rec, phi_rec)
                .filter(|&a_j| a_j <= b - cchk && a_j >= a + cchk)
        } else {
            None
        };
        let a_j = cubic.unwrap_or_else(|| {
            let qchk = DELTA2 * dalpha;
            quadmin(a_lo, phi_lo, derphi_lo, a_hi, phi_hi)
                .filter(|&a_j| a_j <= b - qchk && a_j >= a + qchk)
                .unwrap_or(a_lo + 0.5 * dalpha)
        });

        let phi_aj = line.phi(a_j)?;
        if phi_aj > params.phi0 + params.c1 * a_j * params.derphi0 || phi_aj >= phi_lo {
            phi_rec = phi_hi;
            a_rec = a_hi;
            a_hi = a_j;
            phi_hi = phi_aj;
        } else {
            let derphi_aj = line.derphi(a_j)?;
            if derphi_aj.abs() <= -params.c2 * params.derphi0 {
                let accepted = line
                    .gradient_at(a_j)
                    .map(|g| extra_condition(a_j, g))
                    .unwrap_or(false);
                if accepted {
                    return Ok(Some((a_j, phi_aj, true)));
                }
            }
            if derphi_aj * (a_hi - a_lo) >= 0.0 {
                phi_rec = phi_hi;
                a_rec = a_hi;
                a_hi = a_lo;
                phi_hi = phi_lo;
            } else {
                phi_rec = phi_lo;
                a_rec = a_lo;
            }
            a_lo = a_j;
            phi_lo = phi_aj;
            derphi_lo = derphi_aj;
        }
    }

    Ok(None)
}

/// Strong-Wolfe line search along `direction` from `x`.
///
/// `old_value` is the objective at the previous iterate and seeds the
/// initial step. Returns `None` when no acceptable step is found.
#[allow(clippy::too_many_arguments)]
fn line_search_wolfe<O, C>(
    objective: &mut CountingObjective<'_, O>,
    x: &DVector<f64>,
    direction: &DVector<f64>,
    gradient: &DVector<f64>,
    value: f64,
    old_value: f64,
    c1: f64,
    c2: f64,
    extra_condition: &C,
) -> Result<Option<LineSearchStep>>
where
    O: Objective + ?Sized,
    C: Fn(f64, &DVector<f64>) -> bool,
{
    const MAX_ITER: usize = 10;

    let params = WolfeParams {
        phi0: value,
        derphi0: gradient.dot(direction),
        c1,
        c2,
    };
    let mut line = LineFunction {
        objective,
        x,
        direction,
        last_gradient: None,
    };

    let mut alpha1 = if params.derphi0 != 0.0 {
        (1.01 * 2.0 * (params.phi0 - old_value) / params.derphi0).min(1.0)
    } else {
        1.0
    };
    if alpha1 < 0.0 {
        alpha1 = 1.0;
    }

    let mut alpha0 = 0.0;
    let mut phi_a1 = line.phi(alpha1)?;
    let mut phi_a0 = params.phi0;
    let mut derphi_a0 = params.derphi0;

    let mut found: Option<(f64, f64, bool)> = None;
    for i in 0..MAX_ITER {
        if alpha1 == 0.0 {
            warn!("Rounding errors prevent the line search from converging");
            return Ok(None);
        }

        if phi_a1 > params.phi0 + c1 * alpha1 * params.derphi0 || (phi_a1 >= phi_a0 && i > 0) {
            found = zoom(
                &mut line,
                alpha0,
                alpha1,
                phi_a0,
                phi_a1,
                derphi_a0,
                &params,
                extra_condition,
            )?;
            if found.is_none() {
                return Ok(None);
            }
            break;
        }

        let derphi_a1 = line.derphi(alpha1)?;
        if derphi_a1.abs() <= -c2 * params.derphi0 {
            let accepted = line
                .gradient_at(alpha1)
                .map(|g| extra_condition(alpha1, g))
                .unwrap_or(false);
            if accepted {
                found = Some((alpha1, phi_a1, true));
                break;
            }
        }

        if derphi_a1 >= 0.0 {
            found = zoom(
                &mut line,
                alpha1,
                alpha0,
                phi_a1,
                phi_a0,
                derphi_a1,
                &params,
                extra_condition,
            )?;
            if found.is_none() {
                return Ok(None);
            }
            break;
        }

        alpha0 = alpha1;
        alpha1 *= 2.0;
        phi_a0 = phi_a1;
        phi_a1 = line.phi(alpha1)?;
        derphi_a0 = derphi_a1;
    }

    let (alpha, value, has_slope) = match found {
        Some(step) => step,
        None => {
            warn!("The line search algorithm did not converge");
            (alpha1, phi_a1, false)
        }
    };
    let gradient = if has_slope {
        line.take_gradient(alpha)
    } else {
        None
    };

    Ok(Some(LineSearchStep {
        alpha,
        value,
        gradient,
    }))
}

fn inf_norm(v: &DVector<f64>) -> f64 {
    v.iter().fold(0.0, |m, x| m.max(x.abs()))
}

impl ConjugateGradient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_gtol(mut self, gtol: f64) -> Self {
        self.gtol = gtol;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: Option<usize>) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_fd_step(mut self, fd_step: f64) -> Self {
        self.fd_step = fd_step;
        self
    }

    /// Minimize `objective` starting from `x0`.
    ///
    /// A line-search failure ends the run with `converged = false`; only
    /// objective errors are returned as `Err`.
    pub fn minimize<O: Objective + ?Sized>(
        &self,
        objective: &mut O,
        x0: &DVector<f64>,
    ) -> Result<OptimizationResult> {
        let mut counted = CountingObjective {
            objective,
            fd_step: self.fd_step,
            function_evaluations: 0,
            gradient_evaluations: 0,
            last: None,
        };

        let mut xk = x0.clone();
        let mut fval = counted.value(&xk)?;
        let mut history = vec![fval];

        if xk.is_empty() {
            info!(energy = fval, "No parameters to optimize");
            return Ok(OptimizationResult {
                energy: fval,
                amplitudes: xk,
                converged: true,
                iterations: 0,
                function_evaluations: counted.function_evaluations,
                gradient_evaluations: 0,
                message: MSG_SUCCESS.to_string(),
                energy_history: history,
            });
        }

        let max_iterations = self.max_iterations.unwrap_or(200 * xk.len());
        let mut gfk = counted.gradient(&xk)?;
        let mut old_old_fval = fval + gfk.norm() / 2.0;
        let mut pk = -&gfk;
        let mut gnorm = inf_norm(&gfk);
        let mut iterations = 0;
        let mut line_search_failed = false;

        while gnorm > self.gtol && iterations < max_iterations {
            if gfk.dot(&pk) >= 0.0 {
                debug!(iteration = iterations, "Restarting along steepest descent");
                pk = -&gfk;
            }
            let deltak = gfk.dot(&gfk);

            let next_direction = |gfkp1: &DVector<f64>| -> DVector<f64> {
                let yk = gfkp1 - &gfk;
                let beta = (yk.dot(gfkp1) / deltak).max(0.0);
                -gfkp1 + &pk * beta
            };
            let gtol = self.gtol;
            let descent_condition = |_alpha: f64, gfkp1: &DVector<f64>| -> bool {
                if inf_norm(gfkp1) <= gtol {
                    return true;
                }
                let pkp1 = next_direction(gfkp1);
                pkp1.dot(gfkp1) <= -SIGMA_3 * gfkp1.dot(gfkp1)
            };

            let step = line_search_wolfe(
                &mut counted,
                &xk,
                &pk,
                &gfk,
                fval,
                old_old_fval,
                self.c1,
                self.c2,
                &descent_condition,
            )?;
            let Some(step) = step else {
                line_search_failed = true;
                break;
            };

            let xkp1 = &xk + &pk * step.alpha;
            let gfkp1 = match step.gradient {
                Some(g) => g,
                None => counted.gradient(&xkp1)?,
            };
            let pkp1 = next_direction(&gfkp1);

            old_old_fval = fval;
            fval = step.value;
            xk = xkp1;
            pk = pkp1;
            gfk = gfkp1;
            gnorm = inf_norm(&gfk);
            iterations += 1;
            history.push(fval);

            debug!(
                iteration = iterations,
                energy = fval,
                gnorm,
                alpha = step.alpha,
                "CG iteration"
            );
        }

        let (converged, message) = if line_search_failed {
            (false, MSG_PRECISION_LOSS)
        } else if gnorm > self.gtol {
            (false, MSG_MAXITER)
        } else {
            (true, MSG_SUCCESS)
        };

        if converged {
            info!("{message}");
        } else {
            warn!("{message}");
        }
        info!(
            "Current function value: {:.6}, Iterations: {}, Function evaluations: {}, Gradient evaluations: {}",
            fval, iterations, counted.function_evaluations, counted.gradient_evaluations
        );

        Ok(OptimizationResult {
            energy: fval,
            amplitudes: xk,
            converged,
            iterations,
            function_evaluations: counted.function_evaluations,
            gradient_evaluations: counted.gradient_evaluations,
            message: message.to_string(),
            energy_history: history,
        })
    }
}
