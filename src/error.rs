use std::path::PathBuf;
use thiserror::Error;

/// The primary error type for all fallible operations in the `ionize` library.
///
/// Variants fall into four groups: validation of species and compositions,
/// lookups against the ion database, numerical failures of the root finders,
/// and I/O or (de)serialization failures. It implements `std::error::Error`,
/// allowing it to be composed with other error types in application code.
#[derive(Error, Debug)]
pub enum IonizeError {
    /// A species definition violates one of the structural invariants: charge
    /// states must be nonzero integers sorted strictly ascending, every
    /// per-charge-state array must match the charge-state list in length, and
    /// every mobility must carry the sign of its charge state.
    #[error("Invalid species '{name}': {reason}")]
    InvalidSpecies {
        /// The name of the offending species.
        name: String,
        /// A human-readable description of the violated invariant.
        reason: String,
    },

    /// The list of species and the list of concentrations differ in length.
    #[error("Got {species} species but {concentrations} concentrations")]
    LengthMismatch {
        /// The number of species supplied.
        species: usize,
        /// The number of concentrations supplied.
        concentrations: usize,
    },

    /// A concentration was negative or not a finite number.
    #[error("Concentration of '{name}' must be a finite non-negative value, got {concentration}")]
    NegativeConcentration {
        /// The species the concentration was given for.
        name: String,
        /// The rejected concentration, in mol/L.
        concentration: f64,
    },

    /// The same species was listed more than once when building a solution.
    #[error("Species '{0}' is listed more than once")]
    DuplicateSpecies(String),

    /// Hydronium and hydroxide are implicit in every solution and cannot be added.
    #[error("Species '{0}' is provided by the solvent and cannot be added explicitly")]
    ReservedSpecies(String),

    /// The requested species name is not present in the ion database.
    #[error("Species '{0}' not found in the database")]
    SpeciesNotFound(String),

    /// An operation referenced a species that is not part of the solution.
    #[error("Species '{0}' is not present in the solution")]
    MissingSpecies(String),

    /// A bracketed root finder was given an interval whose end points do not
    /// straddle a sign change.
    #[error("{operation}: root is not bracketed by [{lower:.3e}, {upper:.3e}]")]
    NotBracketed {
        /// The operation that requested the root.
        operation: &'static str,
        /// The lower end of the interval.
        lower: f64,
        /// The upper end of the interval.
        upper: f64,
    },

    /// A root finder exhausted its iteration budget. The last residual is
    /// provided for diagnostic purposes.
    #[error("{operation} failed to converge after {max_iterations} iterations. Final residual: {residual:.2e}")]
    NotConverged {
        /// The operation that requested the root.
        operation: &'static str,
        /// The iteration budget that was exhausted.
        max_iterations: u32,
        /// The residual (or step size) at the final iterate.
        residual: f64,
    },

    /// The charge-balance polynomial has no positive real root.
    #[error("Charge balance has no positive hydronium concentration at I = {ionic_strength:.3e} M")]
    NoPhRoot {
        /// The ionic strength at which the polynomial was built.
        ionic_strength: f64,
    },

    /// The tracked species account for less than half of the solved ionic
    /// strength, so the equilibrium cannot be vouched for.
    #[error(
        "Tracked species contribute I = {tracked:.3e} M out of a solved I = {total:.3e} M; the pH estimate is unreliable"
    )]
    PhysicalInconsistency {
        /// Ionic strength recomputed from the species with charge-state data.
        tracked: f64,
        /// The ionic strength returned by the fixed-point solver.
        total: f64,
    },

    /// The Onsager-Fuoss interaction diverges when any charge state is immobile.
    #[error("Onsager-Fuoss correction diverges for immobile species '{0}'")]
    ImmobileSpecies(String),

    /// A failure within the underlying linear algebra solver, for example if the
    /// Jacobian of the displacement problem is singular.
    #[error("Failed to solve the linear matrix system: {0}")]
    LinalgError(String),

    /// An I/O error that occurred while attempting to read a database file.
    #[error("I/O error at path '{path}': {source}")]
    IoError {
        /// The path of the file that caused the I/O error.
        path: PathBuf,
        /// The underlying `std::io::Error`.
        #[source]
        source: std::io::Error,
    },

    /// An error that occurred while parsing a TOML database or options file.
    #[error("Failed to deserialize TOML: {0}")]
    DeserializationError(#[from] toml::de::Error),

    /// An error that occurred while reading or writing the JSON form of an ion
    /// or a solution.
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}
