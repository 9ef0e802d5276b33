//! Equilibrium pH, ionic strength and corrected ion mobilities of aqueous electrolyte solutions.
//!
//! ```
//! use ionize::{Solution, TitrationProperty};
//!
//! let tris = Solution::new(["tris"], &[0.1]).unwrap();
//! let buffer = tris.titrate("hydrochloric acid", 8.1, TitrationProperty::Ph).unwrap();
//! assert!((buffer.ph() - 8.1).abs() < 1e-6);
//! ```

pub mod database;
pub mod error;
pub mod ion;
pub mod math;
pub mod solution;
pub mod solvent;
pub mod solver;
pub mod types;

pub use database::Database;
pub use error::IonizeError;
pub use ion::{Ion, IonRecord, NightingaleData};
pub use solution::{BoundIon, Solution, SolutionRecord, SpeciesRef, TitrationProperty};
pub use solvent::{Aqueous, Solvent};
pub use solver::{EquilibriumSolver, SolverOptions};
pub use types::{Conditions, EquilibriumState, RootMethod};

use std::sync::OnceLock;

static DEFAULT_DATABASE: OnceLock<Database> = OnceLock::new();

/// Returns the ion database bundled with the library.
pub fn default_database() -> &'static Database {
    DEFAULT_DATABASE.get_or_init(|| {
        const DEFAULT_IONS_TOML: &str = include_str!("../resources/ions.toml");
        Database::load_from_str(DEFAULT_IONS_TOML)
            .expect("Failed to parse embedded ion database. This is a library bug.")
    })
}
