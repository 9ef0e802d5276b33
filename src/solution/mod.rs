//! This module defines the `Solution` type, an equilibrated aqueous mixture of ionizing species.
//!
//! A solution is built from species (given directly or by database name) and their molar
//! concentrations, validated, and equilibrated before it is returned, so every instance always
//! carries a consistent pH and ionic strength. Solutions are values: composition-changing
//! operations return a new, re-equilibrated solution rather than mutating the old one. The
//! exception is `set_temperature`, which re-equilibrates in place.
//!
//! The submodules group the operations built on the equilibrium state:
//!
//! - `context`: species evaluated in the conditions of a solution,
//! - `properties`: conductivity, transference, buffering capacity and conservation functions,
//! - `titration`: titration, CO₂ equilibration and electrophoretic displacement,
//! - `serialize`: the JSON form of ions and solutions.

mod context;
mod properties;
mod serialize;
mod titration;

pub use context::BoundIon;
pub use serialize::SolutionRecord;
pub use titration::TitrationProperty;

use crate::default_database;
use crate::error::IonizeError;
use crate::ion::{self, Ion};
use crate::math::constants::REFERENCE_TEMPERATURE;
use crate::solver::{self, EquilibriumSolver, Interaction, SolverOptions};
use crate::solvent::{Aqueous, Solvent};
use crate::types::EquilibriumState;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

/// Names that refer to the solvent's own ions and cannot be added to a solution.
const RESERVED_NAMES: [&str; 4] = ["hydronium", "hydroxide", "h+", "oh-"];

/// A species given either by its database name or as a fully specified ion.
#[derive(Debug, Clone, PartialEq)]
pub enum SpeciesRef {
    /// A name or alias to look up in the default database.
    Name(String),
    /// An explicit species definition.
    Ion(Ion),
}

impl SpeciesRef {
    /// The name used to match this species against the members of a solution.
    pub fn name(&self) -> &str {
        match self {
            SpeciesRef::Name(name) => name,
            SpeciesRef::Ion(ion) => ion.name(),
        }
    }

    /// Resolves the reference to an ion, loading names from the default database.
    ///
    /// # Errors
    ///
    /// Returns `IonizeError::SpeciesNotFound` if a name is not in the database.
    pub fn resolve(self) -> Result<Ion, IonizeError> {
        match self {
            SpeciesRef::Name(name) => default_database().load(&name),
            SpeciesRef::Ion(ion) => Ok(ion),
        }
    }
}

impl From<&str> for SpeciesRef {
    fn from(name: &str) -> Self {
        SpeciesRef::Name(name.to_string())
    }
}

impl From<String> for SpeciesRef {
    fn from(name: String) -> Self {
        SpeciesRef::Name(name)
    }
}

impl From<Ion> for SpeciesRef {
    fn from(ion: Ion) -> Self {
        SpeciesRef::Ion(ion)
    }
}

impl From<&Ion> for SpeciesRef {
    fn from(ion: &Ion) -> Self {
        SpeciesRef::Ion(ion.clone())
    }
}

/// An equilibrated aqueous solution.
///
/// # Examples
///
/// ```
/// use ionize::Solution;
///
/// let buffer = Solution::new(["tris", "hydrochloric acid"], &[0.03, 0.01]).unwrap();
/// assert!(buffer.ph() > 7.0 && buffer.ph() < 9.0);
/// assert!(buffer.conductivity() > 0.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(into = "SolutionRecord", try_from = "SolutionRecord")]
pub struct Solution {
    composition: Vec<(Ion, f64)>,
    state: EquilibriumState,
    options: SolverOptions,
    interaction: OnceLock<Option<Interaction>>,
}

impl Solution {
    /// Creates and equilibrates a solution at the reference temperature.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the inputs differ in length, a concentration is negative, a
    /// species is listed twice or is hydronium or hydroxide, a lookup error if a name is not in
    /// the database, or a solver error if equilibrium cannot be established.
    pub fn new<I, S>(species: I, concentrations: &[f64]) -> Result<Self, IonizeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<SpeciesRef>,
    {
        Self::new_at(species, concentrations, REFERENCE_TEMPERATURE)
    }

    /// Creates and equilibrates a solution at `temperature`, in degrees Celsius.
    pub fn new_at<I, S>(
        species: I,
        concentrations: &[f64],
        temperature: f64,
    ) -> Result<Self, IonizeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<SpeciesRef>,
    {
        let ions = species
            .into_iter()
            .map(|s| s.into().resolve())
            .collect::<Result<Vec<Ion>, IonizeError>>()?;
        if ions.len() != concentrations.len() {
            return Err(IonizeError::LengthMismatch {
                species: ions.len(),
                concentrations: concentrations.len(),
            });
        }

        let composition = ions.into_iter().zip(concentrations.iter().copied()).collect();
        Self::from_composition(composition, temperature, SolverOptions::default())
    }

    /// Returns pure water at the reference temperature.
    pub fn water() -> Self {
        let state = EquilibriumSolver::new(REFERENCE_TEMPERATURE)
            .solve(&[])
            .expect("Failed to equilibrate pure water. This is a library bug.");
        Self {
            composition: Vec::new(),
            state,
            options: SolverOptions::default(),
            interaction: OnceLock::new(),
        }
    }

    /// Validates a composition, drops empty entries and equilibrates it.
    pub(crate) fn from_composition(
        composition: Vec<(Ion, f64)>,
        temperature: f64,
        options: SolverOptions,
    ) -> Result<Self, IonizeError> {
        let mut kept: Vec<(Ion, f64)> = Vec::with_capacity(composition.len());
        for (ion, concentration) in composition {
            if !(concentration >= 0.0 && concentration.is_finite()) {
                return Err(IonizeError::NegativeConcentration {
                    name: ion.name().to_string(),
                    concentration,
                });
            }
            if RESERVED_NAMES.iter().any(|name| ion.is_named(name))
                || ion == *ion::hydronium()
                || ion == *ion::hydroxide()
            {
                return Err(IonizeError::ReservedSpecies(ion.name().to_string()));
            }
            if kept.iter().any(|(other, _)| other.is_named(ion.name())) {
                return Err(IonizeError::DuplicateSpecies(ion.name().to_string()));
            }
            kept.push((ion, concentration));
        }
        kept.retain(|(_, concentration)| *concentration > 0.0);

        let state = EquilibriumSolver::new(temperature)
            .with_options(options)
            .solve(&kept)?;

        Ok(Self {
            composition: kept,
            state,
            options,
            interaction: OnceLock::new(),
        })
    }

    /// Rebuilds a solution with the same temperature and options.
    fn derive(&self, composition: Vec<(Ion, f64)>) -> Result<Self, IonizeError> {
        Self::from_composition(composition, self.state.temperature, self.options)
    }

    /// Returns a copy equilibrated under different solver options.
    pub fn with_options(&self, options: SolverOptions) -> Result<Self, IonizeError> {
        Self::from_composition(self.composition.clone(), self.state.temperature, options)
    }

    /// Returns a copy with `concentration` more of `species`.
    ///
    /// A species already present has its concentration increased; a new one is appended.
    pub fn add(
        &self,
        species: impl Into<SpeciesRef>,
        concentration: f64,
    ) -> Result<Self, IonizeError> {
        let species = species.into();
        let mut composition = self.composition.clone();
        match self.index_of(species.name()) {
            Some(index) => composition[index].1 += concentration,
            None => composition.push((species.resolve()?, concentration)),
        }
        self.derive(composition)
    }

    /// Returns a copy without `species`.
    ///
    /// # Errors
    ///
    /// Returns `IonizeError::MissingSpecies` if the species is not present.
    pub fn remove(&self, species: impl Into<SpeciesRef>) -> Result<Self, IonizeError> {
        let species = species.into();
        let index = self
            .index_of(species.name())
            .ok_or_else(|| IonizeError::MissingSpecies(species.name().to_string()))?;
        let mut composition = self.composition.clone();
        composition.remove(index);
        self.derive(composition)
    }

    /// Returns the solution holding the solutes of both `self` and `other` at the sum of their
    /// concentrations, at the temperature of `self`.
    pub fn mix(&self, other: &Solution) -> Result<Self, IonizeError> {
        let mut composition = self.composition.clone();
        for (ion, concentration) in &other.composition {
            match self.index_of(ion.name()) {
                Some(index) => composition[index].1 += concentration,
                None => composition.push((ion.clone(), *concentration)),
            }
        }
        self.derive(composition)
    }

    /// Returns a copy with every concentration multiplied by `factor`.
    ///
    /// # Errors
    ///
    /// Returns `IonizeError::NegativeConcentration` if `factor` is negative.
    pub fn scale(&self, factor: f64) -> Result<Self, IonizeError> {
        let composition = self
            .composition
            .iter()
            .map(|(ion, concentration)| (ion.clone(), concentration * factor))
            .collect();
        self.derive(composition)
    }

    /// Returns a copy equilibrated at `temperature`, in degrees Celsius.
    pub fn with_temperature(&self, temperature: f64) -> Result<Self, IonizeError> {
        Self::from_composition(self.composition.clone(), temperature, self.options)
    }

    /// Changes the temperature and re-equilibrates in place.
    ///
    /// On failure the solution is left unchanged.
    pub fn set_temperature(&mut self, temperature: f64) -> Result<(), IonizeError> {
        *self = self.with_temperature(temperature)?;
        Ok(())
    }

    pub fn ph(&self) -> f64 {
        self.state.ph
    }

    /// The ionic strength, in mol/L.
    pub fn ionic_strength(&self) -> f64 {
        self.state.ionic_strength
    }

    /// The temperature, in degrees Celsius.
    pub fn temperature(&self) -> f64 {
        self.state.temperature
    }

    pub fn state(&self) -> &EquilibriumState {
        &self.state
    }

    pub fn options(&self) -> &SolverOptions {
        &self.options
    }

    /// The concentration of free hydronium, in mol/L.
    pub fn hydronium_concentration(&self) -> f64 {
        10f64.powf(-self.state.ph)
            / Aqueous::activity(1, self.state.ionic_strength, self.state.temperature)
    }

    /// The concentration of free hydroxide, in mol/L.
    pub fn hydroxide_concentration(&self) -> f64 {
        Aqueous::dissociation(self.state.ionic_strength, self.state.temperature)
            / self.hydronium_concentration()
    }

    /// The concentration of the named species, or zero if it is absent.
    pub fn concentration(&self, name: &str) -> f64 {
        self.index_of(name)
            .map_or(0.0, |index| self.composition[index].1)
    }

    /// Returns true if the named species is present.
    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// The number of species, not counting hydronium and hydroxide.
    pub fn len(&self) -> usize {
        self.composition.len()
    }

    pub fn is_empty(&self) -> bool {
        self.composition.is_empty()
    }

    /// Iterates over species and their concentrations in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Ion, f64)> {
        self.composition
            .iter()
            .map(|(ion, concentration)| (ion, *concentration))
    }

    pub fn ions(&self) -> impl Iterator<Item = &Ion> {
        self.composition.iter().map(|(ion, _)| ion)
    }

    pub fn concentrations(&self) -> Vec<f64> {
        self.composition.iter().map(|(_, c)| *c).collect()
    }

    pub(crate) fn composition(&self) -> &[(Ion, f64)] {
        &self.composition
    }

    pub(crate) fn index_of(&self, name: &str) -> Option<usize> {
        self.composition
            .iter()
            .position(|(ion, _)| ion.is_named(name))
    }

    /// The Onsager-Fuoss mobilities of the solution, computed on first use.
    ///
    /// `None` if the correction is undefined for this composition, in which case species fall
    /// back to Robinson-Stokes mobilities.
    pub fn interaction(&self) -> Option<&Interaction> {
        self.interaction
            .get_or_init(|| match solver::interaction(&self.composition, &self.state) {
                Ok(interaction) => Some(interaction),
                Err(e) => {
                    log::warn!("{e}; using Robinson-Stokes mobilities");
                    None
                }
            })
            .as_ref()
    }
}

impl PartialEq for Solution {
    fn eq(&self, other: &Self) -> bool {
        self.composition == other.composition && self.state.temperature == other.state.temperature
    }
}

// Concentrations and temperature are validated finite, so equality is reflexive.
impl Eq for Solution {}

impl Hash for Solution {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.composition.len().hash(state);
        for (ion, concentration) in &self.composition {
            ion.hash(state);
            (concentration + 0.0).to_bits().hash(state);
        }
        (self.state.temperature + 0.0).to_bits().hash(state);
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Solution(pH={}, I={} M)",
            significant(self.state.ph),
            significant(self.state.ionic_strength)
        )
    }
}

/// Formats a value with three significant digits, dropping trailing zeros.
fn significant(value: f64) -> String {
    if value == 0.0 || !value.is_finite() {
        return value.to_string();
    }
    let decimals = (2 - value.abs().log10().floor() as i32).max(0) as usize;
    let text = format!("{value:.decimals$}");
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}
