//! Dense real polynomials used to assemble the charge-balance equation.
//!
//! Coefficients are stored in ascending order, so `coefficients[k]` multiplies `x^k`. Multiplying
//! two polynomials is a discrete convolution of their coefficient vectors, which is how the
//! charge-balance polynomial is built from one factor per species.

use super::roots::{self, Tolerance};
use crate::error::IonizeError;
use std::ops::Add;

/// A real polynomial with coefficients in ascending order of degree.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polynomial {
    coefficients: Vec<f64>,
}

/// Returns the discrete convolution of two coefficient vectors.
///
/// The result has `a.len() + b.len() - 1` entries, or none if either input is empty.
pub fn convolve(a: &[f64], b: &[f64]) -> Vec<f64> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, &ai) in a.iter().enumerate() {
        for (j, &bj) in b.iter().enumerate() {
            out[i + j] += ai * bj;
        }
    }
    out
}

impl Polynomial {
    /// Creates a polynomial from coefficients in ascending order of degree.
    pub fn new(coefficients: Vec<f64>) -> Self {
        Self { coefficients }
    }

    /// The constant polynomial `1`.
    pub fn one() -> Self {
        Self::new(vec![1.0])
    }

    /// The coefficients in ascending order of degree.
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// The degree after discarding zero leading coefficients; `None` for the zero polynomial.
    pub fn degree(&self) -> Option<usize> {
        self.coefficients.iter().rposition(|&c| c != 0.0)
    }

    /// Multiplies two polynomials.
    pub fn convolve(&self, other: &Polynomial) -> Polynomial {
        Polynomial::new(convolve(&self.coefficients, &other.coefficients))
    }

    /// Multiplies every coefficient by `factor`.
    pub fn scale(&self, factor: f64) -> Polynomial {
        Polynomial::new(self.coefficients.iter().map(|c| c * factor).collect())
    }

    /// Evaluates the polynomial at `x` with Horner's scheme.
    pub fn evaluate(&self, x: f64) -> f64 {
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, &c| acc * x + c)
    }

    /// Returns the polynomial with zero highest-degree coefficients removed.
    pub fn trimmed(&self) -> Polynomial {
        let len = self.degree().map_or(0, |d| d + 1);
        Polynomial::new(self.coefficients[..len].to_vec())
    }

    /// Returns every positive real root, in ascending order.
    ///
    /// Roots are isolated by scanning a logarithmic grid between the Cauchy lower and upper
    /// bounds on root magnitude for sign changes, then refined with Brent's method inside each
    /// isolating interval. A root of even multiplicity does not change sign and is not reported.
    pub fn positive_real_roots(
        &self,
        samples_per_decade: u32,
        tolerance: Tolerance,
    ) -> Result<Vec<f64>, IonizeError> {
        let trimmed = self.trimmed();
        // Zero roots carry no information about positive ones.
        let first = match trimmed.coefficients.iter().position(|&c| c != 0.0) {
            Some(first) => first,
            None => return Ok(Vec::new()),
        };
        let reduced = Polynomial::new(trimmed.coefficients[first..].to_vec());
        let n = reduced.coefficients.len() - 1;
        if n == 0 {
            return Ok(Vec::new());
        }

        let leading = reduced.coefficients[n].abs();
        let constant = reduced.coefficients[0].abs();
        let upper = 1.0
            + reduced.coefficients[..n]
                .iter()
                .map(|c| c.abs() / leading)
                .fold(0.0, f64::max);
        let lower = constant
            / (constant
                + reduced.coefficients[1..]
                    .iter()
                    .map(|c| c.abs())
                    .fold(0.0, f64::max));

        let log_lower = lower.log10();
        let log_upper = upper.log10();
        let steps = (((log_upper - log_lower) * samples_per_decade as f64).ceil() as usize).max(1);
        let grid: Vec<f64> = (0..=steps)
            .map(|k| 10f64.powf(log_lower + (log_upper - log_lower) * k as f64 / steps as f64))
            .collect();

        let mut found = Vec::new();
        let mut previous = (grid[0], reduced.evaluate(grid[0]));
        if previous.1 == 0.0 {
            found.push(previous.0);
        }
        for &x in &grid[1..] {
            let value = reduced.evaluate(x);
            if value == 0.0 {
                found.push(x);
            } else if previous.1 != 0.0 && (previous.1 < 0.0) != (value < 0.0) {
                let root = roots::brent(
                    |x| Ok(reduced.evaluate(x)),
                    previous.0,
                    x,
                    tolerance,
                    "polynomial root isolation",
                )?;
                found.push(root.value);
            }
            previous = (x, value);
        }

        Ok(found)
    }
}

impl Add for &Polynomial {
    type Output = Polynomial;

    /// Adds two polynomials, padding the shorter with zeros.
    fn add(self, other: &Polynomial) -> Polynomial {
        let len = self.coefficients.len().max(other.coefficients.len());
        let coefficient = |p: &Polynomial, k: usize| p.coefficients.get(k).copied().unwrap_or(0.0);
        Polynomial::new(
            (0..len)
                .map(|k| coefficient(self, k) + coefficient(other, k))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const TOLERANCE: Tolerance = Tolerance {
        absolute: 0.0,
        relative: 4.0 * f64::EPSILON,
        max_iterations: 200,
    };

    fn from_roots(roots: &[f64]) -> Polynomial {
        roots.iter().fold(Polynomial::one(), |acc, &r| {
            acc.convolve(&Polynomial::new(vec![-r, 1.0]))
        })
    }

    #[test]
    fn test_convolve_matches_polynomial_product() {
        // (1 + 2x)(3 + x + x^2) = 3 + 7x + 3x^2 + 2x^3
        assert_eq!(convolve(&[1.0, 2.0], &[3.0, 1.0, 1.0]), vec![3.0, 7.0, 3.0, 2.0]);
        assert!(convolve(&[], &[1.0]).is_empty());
    }

    #[test]
    fn test_add_pads_shorter_polynomial() {
        let sum = &Polynomial::new(vec![1.0, 1.0]) + &Polynomial::new(vec![0.0, 0.0, 2.0]);
        assert_eq!(sum.coefficients(), &[1.0, 1.0, 2.0]);
    }

    #[test]
    fn test_evaluate_and_degree() {
        let p = Polynomial::new(vec![-1.0, 0.0, 1.0, 0.0]);
        assert_eq!(p.degree(), Some(2));
        assert_eq!(p.evaluate(3.0), 8.0);
        assert_eq!(p.trimmed().coefficients().len(), 3);
        assert_eq!(Polynomial::new(vec![0.0]).degree(), None);
    }

    #[test]
    fn test_positive_roots_ignores_negative_and_complex_roots() {
        // (x - 2e-8)(x + 5)(x^2 + 1)
        let p = from_roots(&[2e-8, -5.0]).convolve(&Polynomial::new(vec![1.0, 0.0, 1.0]));
        let roots = p.positive_real_roots(16, TOLERANCE).unwrap();
        assert_eq!(roots.len(), 1);
        assert_relative_eq!(roots[0], 2e-8, max_relative = 1e-10);
    }

    #[test]
    fn test_positive_roots_across_many_decades() {
        let p = from_roots(&[1e-9, 3e-4, 70.0]);
        let roots = p.positive_real_roots(16, TOLERANCE).unwrap();
        assert_eq!(roots.len(), 3);
        assert_relative_eq!(roots[0], 1e-9, max_relative = 1e-8);
        assert_relative_eq!(roots[1], 3e-4, max_relative = 1e-8);
        assert_relative_eq!(roots[2], 70.0, max_relative = 1e-8);
    }

    #[test]
    fn test_positive_roots_skips_zero_root() {
        let p = from_roots(&[0.0, 4.0]);
        let roots = p.positive_real_roots(16, TOLERANCE).unwrap();
        assert_eq!(roots.len(), 1);
        assert_relative_eq!(roots[0], 4.0, max_relative = 1e-12);
    }

    #[test]
    fn test_constant_polynomial_has_no_roots() {
        let roots = Polynomial::new(vec![3.0]).positive_real_roots(16, TOLERANCE).unwrap();
        assert!(roots.is_empty());
    }
}
