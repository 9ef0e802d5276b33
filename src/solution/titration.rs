use super::{Solution, SpeciesRef};
use crate::default_database;
use crate::error::IonizeError;
use crate::ion::Ion;
use crate::math::constants::ATMOSPHERIC_CO2;
use crate::math::roots::{brent, newton_system};
use crate::solvent::Aqueous;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The solution property a titration drives to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TitrationProperty {
    Ph,
    IonicStrength,
    Conductivity,
}

impl TitrationProperty {
    fn measure(self, solution: &Solution) -> f64 {
        match self {
            TitrationProperty::Ph => solution.ph(),
            TitrationProperty::IonicStrength => solution.ionic_strength(),
            TitrationProperty::Conductivity => solution.conductivity(),
        }
    }
}

impl fmt::Display for TitrationProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TitrationProperty::Ph => "pH",
            TitrationProperty::IonicStrength => "ionic strength",
            TitrationProperty::Conductivity => "conductivity",
        };
        f.write_str(name)
    }
}

impl Solution {
    /// Adds as much `titrant` as needed to bring `property` to `target`.
    ///
    /// The added concentration is searched with Brent's method between zero and
    /// `SolverOptions::titrant_limit`.
    ///
    /// # Errors
    ///
    /// Returns `IonizeError::NotBracketed` if the target cannot be reached within that range, or
    /// any error raised while equilibrating a trial solution.
    pub fn titrate(
        &self,
        titrant: impl Into<SpeciesRef>,
        target: f64,
        property: TitrationProperty,
    ) -> Result<Solution, IonizeError> {
        let titrant = self.resolve_member(titrant.into())?;
        log::debug!("Titrating {} to {property} = {target} with '{}'", self, titrant.name());

        let root = brent(
            |amount| Ok(property.measure(&self.add(&titrant, amount)?) - target),
            0.0,
            self.options().titrant_limit,
            self.options().root_tolerance(),
            "titration",
        )?;
        self.add(&titrant, root.value)
    }

    /// Equilibrates the solution with atmospheric CO₂.
    pub fn equilibrate_co2(&self) -> Result<Solution, IonizeError> {
        self.equilibrate_co2_at(ATMOSPHERIC_CO2)
    }

    /// Adds carbonic acid until the dissolved neutral CO₂ matches Henry's law at
    /// `partial_pressure`, in bar.
    ///
    /// # Errors
    ///
    /// Returns `IonizeError::NotBracketed` if the required carbonic acid exceeds 1 M, or any error
    /// raised while equilibrating a trial solution.
    pub fn equilibrate_co2_at(&self, partial_pressure: f64) -> Result<Solution, IonizeError> {
        let carbonic = self.resolve_member(SpeciesRef::from("carbonic acid"))?;
        let dissolved = partial_pressure * Aqueous::henry_co2(self.temperature());

        let root = brent(
            |amount| {
                let trial = self.add(&carbonic, amount)?;
                let neutral = trial.ion(&carbonic)?.neutral_fraction();
                Ok(trial.concentration(carbonic.name()) * neutral - dissolved)
            },
            0.0,
            1.0,
            self.options().root_tolerance(),
            "CO2 equilibration",
        )?;
        self.add(&carbonic, root.value)
    }

    /// Computes the zone left behind when `advancing` displaces `receding` in an
    /// electrophoretic moving boundary, or when `receding` simply leaves if `advancing` is
    /// `None`.
    ///
    /// The new zone moves at the velocity of the receding species in this one. Every other
    /// species adjusts its concentration so that its flux across the boundary is conserved.
    ///
    /// # Errors
    ///
    /// Returns `IonizeError::MissingSpecies` if `receding` is absent,
    /// `IonizeError::DuplicateSpecies` if `advancing` is already present, or
    /// `IonizeError::NotConverged` if the conservation equations cannot be solved.
    pub fn displace(
        &self,
        receding: impl Into<SpeciesRef>,
        advancing: Option<SpeciesRef>,
    ) -> Result<Solution, IonizeError> {
        let receding = receding.into();
        let index = self
            .index_of(receding.name())
            .ok_or_else(|| IonizeError::MissingSpecies(receding.name().to_string()))?;
        let receding = self.composition()[index].0.clone();
        let velocity = 1.0 / self.zone_transfer(&receding)?;

        let mut composition = self.composition().to_vec();
        let advancing = match advancing {
            Some(species) => {
                if self.index_of(species.name()).is_some() {
                    return Err(IonizeError::DuplicateSpecies(species.name().to_string()));
                }
                let ion = species.resolve()?;
                composition[index].0 = ion.clone();
                Some(ion)
            }
            None => {
                composition.remove(index);
                None
            }
        };
        log::debug!(
            "Displacing '{}' from {} at {velocity:.3e} m³/(A·s)",
            receding.name(),
            self
        );

        let ions: Vec<Ion> = composition.iter().map(|(ion, _)| ion.clone()).collect();
        let initial: Vec<f64> = composition.iter().map(|(_, c)| *c).collect();
        let mut previous = Vec::with_capacity(ions.len());
        for ion in &ions {
            let rate = match &advancing {
                Some(advancing) if advancing == ion => 0.0,
                _ => 1.0 / self.zone_transfer(ion)? - velocity,
            };
            previous.push(rate);
        }

        let residuals = |x: &[f64]| -> Result<Vec<f64>, IonizeError> {
            let trial = self.derive(ions.iter().cloned().zip(x.iter().map(|c| c.abs())).collect())?;
            ions.iter()
                .zip(x)
                .zip(initial.iter().zip(&previous))
                .map(|((ion, c), (c_old, rate_old))| {
                    let rate_new = 1.0 / trial.zone_transfer(ion)? - velocity;
                    Ok::<f64, IonizeError>(match &advancing {
                        Some(advancing) if advancing == ion => rate_new / velocity,
                        _ => (c.abs() - c_old * rate_old / rate_new) / c_old,
                    })
                })
                .collect()
        };

        let root = newton_system(
            residuals,
            initial.clone(),
            self.options().displacement_criteria(),
            "displacement",
        )?;
        log::debug!("Displacement converged after {} iterations", root.iterations);
        self.derive(
            ions.into_iter()
                .zip(root.value.iter().map(|c| c.abs()))
                .collect(),
        )
    }

    /// Resolves a species, preferring the member of this solution with a matching name.
    fn resolve_member(&self, species: SpeciesRef) -> Result<Ion, IonizeError> {
        match self.index_of(species.name()) {
            Some(index) => Ok(self.composition()[index].0.clone()),
            None => match species {
                SpeciesRef::Name(name) => default_database().load(&name),
                SpeciesRef::Ion(ion) => Ok(ion),
            },
        }
    }
}
