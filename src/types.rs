//! This module defines the core value types shared by the solver and the solution model.
//!
//! `Conditions` bundles the three ambient variables every species-level computation depends on,
//! and `EquilibriumState` records the outcome of equilibrating a composition. Both are plain
//! `Copy` values so that a solution can hand them out freely.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The ambient conditions a species is evaluated at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Conditions {
    /// The pH of the surrounding solution.
    pub ph: f64,
    /// The ionic strength of the surrounding solution, in mol/L.
    pub ionic_strength: f64,
    /// The temperature, in degrees Celsius.
    pub temperature: f64,
}

/// The root finder that produced an equilibrium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RootMethod {
    /// The ionic-strength residual changed sign on `[0, 2·I₀]` and Brent's method was used.
    Brent,
    /// The residual was not bracketed and the unbracketed secant iteration was used.
    Newton,
    /// The solution holds no species; only water self-ionization was solved.
    PureWater,
}

/// The result of equilibrating a composition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquilibriumState {
    /// The equilibrium pH.
    pub ph: f64,
    /// The equilibrium ionic strength, in mol/L.
    pub ionic_strength: f64,
    /// The temperature the composition was equilibrated at, in degrees Celsius.
    pub temperature: f64,
    /// The number of fixed-point iterations performed.
    pub iterations: u32,
    /// The root finder that produced this state.
    pub method: RootMethod,
}

impl EquilibriumState {
    /// The ambient conditions this state establishes for its species.
    pub fn conditions(&self) -> Conditions {
        Conditions {
            ph: self.ph,
            ionic_strength: self.ionic_strength,
            temperature: self.temperature,
        }
    }
}

impl fmt::Display for RootMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RootMethod::Brent => "brent",
            RootMethod::Newton => "newton",
            RootMethod::PureWater => "pure water",
        };
        f.write_str(name)
    }
}
