//! This module defines configuration options for the equilibrium and transport solvers.
//!
//! It provides the `SolverOptions` struct, which lets users adjust the convergence criteria,
//! iteration limits and search ranges used when equilibrating a solution and when solving the
//! titration, buffering and displacement problems built on top of it. Options can be written by
//! hand or read from a TOML table in which every field is optional.

use crate::error::IonizeError;
use crate::math::roots::Tolerance;
use serde::Deserialize;
use std::path::Path;

/// Configuration parameters for the solvers.
///
/// # Examples
///
/// ```
/// use ionize::SolverOptions;
///
/// let options = SolverOptions::load_from_str("max_iterations = 50").unwrap();
/// assert_eq!(options.max_iterations, 50);
/// assert_eq!(options.tolerance, SolverOptions::default().tolerance);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SolverOptions {
    /// Absolute tolerance on the ionic strength, in mol/L.
    ///
    /// Also used as the absolute tolerance of titration and CO₂ root searches.
    pub tolerance: f64,
    /// Tolerance relative to the magnitude of the unknown.
    pub relative_tolerance: f64,
    /// The iteration budget of every root search.
    ///
    /// Exhausting it is reported as `IonizeError::NotConverged`.
    pub max_iterations: u32,
    /// Grid density used to isolate the roots of the charge-balance polynomial.
    ///
    /// Two roots closer than one grid step are not told apart, so raising this value only
    /// matters for pathological compositions.
    pub samples_per_decade: u32,
    /// Upper end of the titrant concentration searched by `Solution::titrate`, in mol/L.
    pub titrant_limit: f64,
    /// Maximum number of refinements of the acid insult in `Solution::buffering_capacity`.
    pub buffer_iterations: u32,
    /// Residual tolerance of the displacement solve, also used as the relative size of a
    /// concentration step small enough to stop at.
    pub displacement_tolerance: f64,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            tolerance: 2.0e-12,
            relative_tolerance: 4.0 * f64::EPSILON,
            max_iterations: 100,
            samples_per_decade: 16,
            titrant_limit: 10.0,
            buffer_iterations: 20,
            displacement_tolerance: 1.0e-10,
        }
    }
}

impl SolverOptions {
    /// Parses options from a TOML string. Missing fields keep their default values.
    ///
    /// # Errors
    ///
    /// Returns `IonizeError::DeserializationError` if the content is not valid TOML or a field
    /// has the wrong type.
    pub fn load_from_str(toml_str: &str) -> Result<Self, IonizeError> {
        toml::from_str(toml_str).map_err(IonizeError::from)
    }

    /// Reads options from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `IonizeError::IoError` if the file cannot be read, or
    /// `IonizeError::DeserializationError` if its content is invalid.
    pub fn load_from_file(path: &Path) -> Result<Self, IonizeError> {
        let content = std::fs::read_to_string(path).map_err(|io_error| IonizeError::IoError {
            path: path.to_path_buf(),
            source: io_error,
        })?;

        Self::load_from_str(&content)
    }

    /// Stopping criteria for root searches over a concentration or ionic strength.
    pub(crate) fn root_tolerance(&self) -> Tolerance {
        Tolerance {
            absolute: self.tolerance,
            relative: self.relative_tolerance,
            max_iterations: self.max_iterations,
        }
    }

    /// Stopping criteria for the hydronium root of the charge-balance polynomial.
    ///
    /// Hydronium concentrations span many decades, so only a relative criterion makes sense.
    pub(crate) fn polynomial_tolerance(&self) -> Tolerance {
        Tolerance {
            absolute: 0.0,
            relative: self.relative_tolerance,
            max_iterations: self.max_iterations.max(200),
        }
    }

    /// Stopping criteria for the displacement system.
    ///
    /// Each residual needs several equilibria, whose own tolerances put a floor under how small
    /// it can get, so the step criterion is as loose as the residual one.
    pub(crate) fn displacement_criteria(&self) -> Tolerance {
        Tolerance {
            absolute: self.displacement_tolerance,
            relative: self.displacement_tolerance,
            max_iterations: self.max_iterations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_values() {
        let options = SolverOptions::default();
        assert_eq!(options.tolerance, 2e-12);
        assert_eq!(options.max_iterations, 100);
        assert_eq!(options.titrant_limit, 10.0);
    }

    #[test]
    fn test_load_from_str_partial() {
        let options = SolverOptions::load_from_str(
            r#"
            tolerance = 1e-10
            samples_per_decade = 32
            "#,
        )
        .unwrap();
        assert_eq!(options.tolerance, 1e-10);
        assert_eq!(options.samples_per_decade, 32);
        assert_eq!(options.buffer_iterations, 20);
    }

    #[test]
    fn test_load_from_str_empty_is_default() {
        assert_eq!(SolverOptions::load_from_str("").unwrap(), SolverOptions::default());
    }

    #[test]
    fn test_load_from_str_wrong_type() {
        let result = SolverOptions::load_from_str("max_iterations = \"many\"");
        assert!(matches!(result, Err(IonizeError::DeserializationError(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "titrant_limit = 2.5").unwrap();
        let options = SolverOptions::load_from_file(temp_file.path()).unwrap();
        assert_eq!(options.titrant_limit, 2.5);
    }

    #[test]
    fn test_tolerances_share_iteration_budget() {
        let options = SolverOptions {
            max_iterations: 7,
            ..Default::default()
        };
        assert_eq!(options.root_tolerance().max_iterations, 7);
        assert_eq!(options.displacement_criteria().absolute, 1e-10);
        assert_eq!(options.polynomial_tolerance().absolute, 0.0);
    }
}
