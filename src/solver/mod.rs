//! This module contains the solvers behind every solution-level calculation.
//!
//! It includes the `EquilibriumSolver`, which finds the self-consistent pH and ionic strength of
//! a composition, the Onsager-Fuoss interaction solver for mobility corrections, and the
//! `SolverOptions` shared by both and by the titration and displacement searches.

mod equilibrium;
mod interaction;
mod options;

pub use equilibrium::EquilibriumSolver;
pub use interaction::{Interaction, interaction, interaction_of};
pub use options::SolverOptions;
