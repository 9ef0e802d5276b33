//! Root finders shared by the equilibrium, titration and displacement solvers.
//!
//! Every objective is fallible: evaluating it usually means equilibrating a trial solution, which
//! can itself fail. Errors from the objective are propagated unchanged, while failures of the root
//! finder itself are reported as [`IonizeError::NotBracketed`] or [`IonizeError::NotConverged`]
//! tagged with the name of the requesting operation.

use crate::error::IonizeError;
use faer::{Col, Mat, prelude::*};
use rayon::prelude::*;
use std::panic::{self, AssertUnwindSafe};

/// Stopping criteria for a root search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Absolute tolerance on the root.
    pub absolute: f64,
    /// Tolerance on the root relative to its magnitude.
    pub relative: f64,
    /// Maximum number of iterations before giving up.
    pub max_iterations: u32,
}

impl Tolerance {
    fn width(&self, x: f64) -> f64 {
        self.absolute + self.relative * x.abs()
    }
}

/// A converged root and the number of iterations it took.
#[derive(Debug, Clone, PartialEq)]
pub struct Root<T> {
    /// The location of the root.
    pub value: T,
    /// The number of iterations performed.
    pub iterations: u32,
}

/// Finds a root of `f` inside `[lower, upper]` with Brent's method.
///
/// The end points must bracket a sign change. Inverse quadratic interpolation is attempted at
/// every step and replaced by bisection whenever it would not shrink the bracket fast enough,
/// so convergence is guaranteed for continuous objectives.
pub fn brent<F>(
    mut f: F,
    lower: f64,
    upper: f64,
    tolerance: Tolerance,
    operation: &'static str,
) -> Result<Root<f64>, IonizeError>
where
    F: FnMut(f64) -> Result<f64, IonizeError>,
{
    let mut x_pre = lower;
    let mut x_cur = upper;
    let mut f_pre = f(x_pre)?;
    let mut f_cur = f(x_cur)?;

    if f_pre == 0.0 {
        return Ok(Root {
            value: x_pre,
            iterations: 0,
        });
    }
    if f_cur == 0.0 {
        return Ok(Root {
            value: x_cur,
            iterations: 0,
        });
    }
    if !f_pre.is_finite() || !f_cur.is_finite() || (f_pre < 0.0) == (f_cur < 0.0) {
        return Err(IonizeError::NotBracketed {
            operation,
            lower,
            upper,
        });
    }

    let mut x_blk = 0.0;
    let mut f_blk = 0.0;
    let mut s_pre = 0.0;
    let mut s_cur = 0.0;

    for iteration in 1..=tolerance.max_iterations {
        if f_pre != 0.0 && f_cur != 0.0 && (f_pre < 0.0) != (f_cur < 0.0) {
            x_blk = x_pre;
            f_blk = f_pre;
            s_pre = x_cur - x_pre;
            s_cur = s_pre;
        }
        if f_blk.abs() < f_cur.abs() {
            x_pre = x_cur;
            x_cur = x_blk;
            x_blk = x_pre;

            f_pre = f_cur;
            f_cur = f_blk;
            f_blk = f_pre;
        }

        let delta = tolerance.width(x_cur) / 2.0;
        let s_bis = (x_blk - x_cur) / 2.0;
        if f_cur == 0.0 || s_bis.abs() < delta {
            return Ok(Root {
                value: x_cur,
                iterations: iteration,
            });
        }

        if s_pre.abs() > delta && f_cur.abs() < f_pre.abs() {
            let s_try = if x_pre == x_blk {
                // secant
                -f_cur * (x_cur - x_pre) / (f_cur - f_pre)
            } else {
                // inverse quadratic interpolation
                let d_pre = (f_pre - f_cur) / (x_pre - x_cur);
                let d_blk = (f_blk - f_cur) / (x_blk - x_cur);
                -f_cur * (f_blk * d_blk - f_pre * d_pre) / (d_blk * d_pre * (f_blk - f_pre))
            };
            if 2.0 * s_try.abs() < s_pre.abs().min(3.0 * s_bis.abs() - delta) {
                s_pre = s_cur;
                s_cur = s_try;
            } else {
                s_pre = s_bis;
                s_cur = s_bis;
            }
        } else {
            s_pre = s_bis;
            s_cur = s_bis;
        }

        x_pre = x_cur;
        f_pre = f_cur;
        if s_cur.abs() > delta {
            x_cur += s_cur;
        } else {
            x_cur += if s_bis > 0.0 { delta } else { -delta };
        }

        f_cur = f(x_cur)?;
        if !f_cur.is_finite() {
            return Err(IonizeError::NotConverged {
                operation,
                max_iterations: iteration,
                residual: f_cur,
            });
        }
    }

    Err(IonizeError::NotConverged {
        operation,
        max_iterations: tolerance.max_iterations,
        residual: f_cur,
    })
}

/// Finds a root of `f` near `x0` with the secant variant of Newton's method.
///
/// No bracket is needed, but convergence is only local. The second starting point is a small
/// relative perturbation of `x0`.
pub fn newton<F>(
    mut f: F,
    x0: f64,
    tolerance: Tolerance,
    operation: &'static str,
) -> Result<Root<f64>, IonizeError>
where
    F: FnMut(f64) -> Result<f64, IonizeError>,
{
    let offset = if x0 >= 0.0 { 1e-4 } else { -1e-4 };
    let mut p0 = x0;
    let mut p1 = x0 * (1.0 + 1e-4) + offset;
    let mut q0 = f(p0)?;
    let mut q1 = f(p1)?;

    if q1.abs() < q0.abs() {
        std::mem::swap(&mut p0, &mut p1);
        std::mem::swap(&mut q0, &mut q1);
    }

    for iteration in 1..=tolerance.max_iterations {
        if q1 == q0 {
            if p1 != p0 {
                return Err(IonizeError::NotConverged {
                    operation,
                    max_iterations: iteration,
                    residual: q1,
                });
            }
            return Ok(Root {
                value: (p1 + p0) / 2.0,
                iterations: iteration,
            });
        }

        let p = if q1.abs() > q0.abs() {
            (-q0 / q1 * p1 + p0) / (1.0 - q0 / q1)
        } else {
            (-q1 / q0 * p0 + p1) / (1.0 - q1 / q0)
        };

        if !p.is_finite() {
            break;
        }
        if (p - p1).abs() < tolerance.width(p) {
            return Ok(Root {
                value: p,
                iterations: iteration,
            });
        }

        p0 = p1;
        q0 = q1;
        p1 = p;
        q1 = f(p1)?;
    }

    Err(IonizeError::NotConverged {
        operation,
        max_iterations: tolerance.max_iterations,
        residual: q1,
    })
}

/// Solves the square system `f(x) = 0` with a damped Newton iteration.
///
/// The Jacobian is approximated by forward differences, one column per unknown, evaluated in
/// parallel. Each Newton step is shortened by halving until the residual norm decreases. The
/// iteration stops when every component of the residual is below `tolerance.absolute`, or when
/// the step becomes negligible relative to the iterate.
pub fn newton_system<F>(
    f: F,
    x0: Vec<f64>,
    tolerance: Tolerance,
    operation: &'static str,
) -> Result<Root<Vec<f64>>, IonizeError>
where
    F: Fn(&[f64]) -> Result<Vec<f64>, IonizeError> + Sync,
{
    let n = x0.len();
    let mut x = x0;
    let mut fx = f(&x)?;
    let mut norm = residual_norm(&fx);

    for iteration in 1..=tolerance.max_iterations {
        if fx.iter().all(|r| r.abs() < tolerance.absolute) {
            return Ok(Root {
                value: x,
                iterations: iteration - 1,
            });
        }

        let columns = (0..n)
            .into_par_iter()
            .map(|j| {
                let step = 1e-7 * x[j].abs().max(1e-9);
                let mut shifted = x.clone();
                shifted[j] += step;
                let f_shifted = f(&shifted)?;
                Ok(f_shifted
                    .iter()
                    .zip(fx.iter())
                    .map(|(a, b)| (a - b) / step)
                    .collect::<Vec<f64>>())
            })
            .collect::<Result<Vec<Vec<f64>>, IonizeError>>()?;

        let jacobian = Mat::from_fn(n, n, |i, j| columns[j][i]);
        let rhs = Col::from_fn(n, |i| -fx[i]);

        let solve_result =
            panic::catch_unwind(AssertUnwindSafe(|| jacobian.partial_piv_lu().solve(&rhs)));
        let step = match solve_result {
            Ok(sol) => sol,
            Err(_) => {
                return Err(IonizeError::LinalgError(
                    "Jacobian solve panicked. Matrix might be singular.".to_string(),
                ));
            }
        };
        if (0..n).any(|i| !step[i].is_finite()) {
            return Err(IonizeError::LinalgError(format!(
                "{operation}: Jacobian is singular at iteration {iteration}"
            )));
        }

        let mut damping = 1.0;
        let (candidate, f_candidate, candidate_norm) = loop {
            let candidate: Vec<f64> = (0..n).map(|i| x[i] + damping * step[i]).collect();
            let f_candidate = f(&candidate)?;
            let candidate_norm = residual_norm(&f_candidate);
            if candidate_norm < (1.0 - 1e-4 * damping) * norm || damping < 1.0 / 1024.0 {
                break (candidate, f_candidate, candidate_norm);
            }
            damping /= 2.0;
        };

        let negligible_step = (0..n)
            .all(|i| (damping * step[i]).abs() <= tolerance.relative * candidate[i].abs());

        x = candidate;
        fx = f_candidate;
        norm = candidate_norm;

        if negligible_step {
            return Ok(Root {
                value: x,
                iterations: iteration,
            });
        }
    }

    Err(IonizeError::NotConverged {
        operation,
        max_iterations: tolerance.max_iterations,
        residual: norm,
    })
}

fn residual_norm(residual: &[f64]) -> f64 {
    residual.iter().map(|r| r * r).sum::<f64>().sqrt()
}
