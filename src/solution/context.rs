use super::{RESERVED_NAMES, Solution, SpeciesRef};
use crate::error::IonizeError;
use crate::ion::{self, Ion};
use crate::ion::mobility::effective_mobility;
use crate::ion::transport::separability_of;
use crate::solver;
use crate::types::Conditions;
use std::borrow::Cow;

/// Where a bound species sits relative to the solution it is evaluated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Member(usize),
    Hydronium,
    Hydroxide,
    Trace,
}

/// A species evaluated in the conditions of a particular solution.
///
/// Every property takes its pH, ionic strength and temperature from the solution, and
/// mobilities include the Onsager-Fuoss interaction with the solution's other species. A species
/// that is not part of the solution is treated as a trace ion: it feels the ionic atmosphere
/// without contributing to it.
#[derive(Debug, Clone)]
pub struct BoundIon<'a> {
    ion: Cow<'a, Ion>,
    solution: &'a Solution,
    slot: Slot,
}

impl Solution {
    /// Binds a species to this solution.
    ///
    /// Names are matched against the solution's members first, then against hydronium and
    /// hydroxide, and finally looked up in the default database.
    ///
    /// # Errors
    ///
    /// Returns `IonizeError::SpeciesNotFound` if a name matches nothing.
    pub fn ion(&self, species: impl Into<SpeciesRef>) -> Result<BoundIon<'_>, IonizeError> {
        let species = species.into();
        if let Some(index) = self.index_of(species.name()) {
            let member = &self.composition()[index].0;
            let matches = match &species {
                SpeciesRef::Name(_) => true,
                SpeciesRef::Ion(ion) => ion == member,
            };
            if matches {
                return Ok(BoundIon {
                    ion: Cow::Borrowed(member),
                    solution: self,
                    slot: Slot::Member(index),
                });
            }
        }

        if let SpeciesRef::Name(name) = &species {
            let lower = name.to_lowercase();
            if lower == RESERVED_NAMES[0] || lower == RESERVED_NAMES[2] {
                return Ok(self.hydronium());
            }
            if lower == RESERVED_NAMES[1] || lower == RESERVED_NAMES[3] {
                return Ok(self.hydroxide());
            }
        }

        Ok(BoundIon {
            ion: Cow::Owned(species.resolve()?),
            solution: self,
            slot: Slot::Trace,
        })
    }

    /// Binds every member of the solution, in composition order.
    pub fn bound_ions(&self) -> impl Iterator<Item = BoundIon<'_>> {
        self.composition()
            .iter()
            .enumerate()
            .map(move |(index, (ion, _))| BoundIon {
                ion: Cow::Borrowed(ion),
                solution: self,
                slot: Slot::Member(index),
            })
    }

    /// Binds the solvent's hydronium ion to this solution.
    pub fn hydronium(&self) -> BoundIon<'_> {
        BoundIon {
            ion: Cow::Borrowed(ion::hydronium()),
            solution: self,
            slot: Slot::Hydronium,
        }
    }

    /// Binds the solvent's hydroxide ion to this solution.
    pub fn hydroxide(&self) -> BoundIon<'_> {
        BoundIon {
            ion: Cow::Borrowed(ion::hydroxide()),
            solution: self,
            slot: Slot::Hydroxide,
        }
    }
}

impl<'a> BoundIon<'a> {
    pub fn ion(&self) -> &Ion {
        &self.ion
    }

    pub fn solution(&self) -> &'a Solution {
        self.solution
    }

    pub fn conditions(&self) -> Conditions {
        self.solution.state().conditions()
    }

    /// Returns true if the species is not part of the solution's composition.
    pub fn is_trace(&self) -> bool {
        self.slot == Slot::Trace
    }

    /// The concentration of the species in the solution, in mol/L. Zero for a trace ion.
    pub fn concentration(&self) -> f64 {
        match self.slot {
            Slot::Member(index) => self.solution.composition()[index].1,
            Slot::Hydronium => self.solution.hydronium_concentration(),
            Slot::Hydroxide => self.solution.hydroxide_concentration(),
            Slot::Trace => 0.0,
        }
    }

    pub fn acidity(&self) -> Vec<f64> {
        let c = self.conditions();
        self.ion.acidity(c.ionic_strength, c.temperature)
    }

    pub fn pka(&self) -> Vec<f64> {
        let c = self.conditions();
        self.ion.pka(c.ionic_strength, c.temperature)
    }

    pub fn acidity_product(&self) -> Vec<f64> {
        let c = self.conditions();
        self.ion.acidity_product(c.ionic_strength, c.temperature)
    }

    pub fn ionization_fraction(&self) -> Vec<f64> {
        let c = self.conditions();
        self.ion.ionization_fraction(c.ph, c.ionic_strength, c.temperature)
    }

    pub fn neutral_fraction(&self) -> f64 {
        let c = self.conditions();
        self.ion.neutral_fraction(c.ph, c.ionic_strength, c.temperature)
    }

    /// The `moment`-th moment of the charge distribution; the first moment is the mean charge.
    pub fn charge(&self, moment: i32) -> f64 {
        let c = self.conditions();
        self.ion.charge(c.ph, c.ionic_strength, c.temperature, moment)
    }

    pub fn absolute_mobility(&self) -> Vec<f64> {
        self.ion.absolute_mobility(self.conditions().temperature)
    }

    pub fn robinson_stokes_mobility(&self) -> Vec<f64> {
        let c = self.conditions();
        self.ion.robinson_stokes_mobility(c.ionic_strength, c.temperature)
    }

    /// Per-charge-state mobilities with the Onsager-Fuoss correction, in m²/(V·s).
    ///
    /// Members and the solvent ions read the solution's cached interaction; trace ions run their
    /// own. Robinson-Stokes mobilities are returned when the correction is undefined.
    pub fn actual_mobility(&self) -> Vec<f64> {
        if let Some(interaction) = self.solution.interaction() {
            match self.slot {
                Slot::Member(index) => return interaction.species[index].clone(),
                Slot::Hydronium => return interaction.hydronium.clone(),
                Slot::Hydroxide => return interaction.hydroxide.clone(),
                Slot::Trace => {}
            }
        }
        if self.slot == Slot::Trace {
            let solution = self.solution;
            match solver::interaction_of(&self.ion, solution.composition(), solution.state()) {
                Ok(mobility) => return mobility,
                Err(e) => log::warn!("{e}; using Robinson-Stokes mobilities"),
            }
        }
        self.robinson_stokes_mobility()
    }

    /// The effective mobility, in m²/(V·s).
    pub fn mobility(&self) -> f64 {
        effective_mobility(&self.ionization_fraction(), &self.actual_mobility())
    }

    /// The molar conductivity, in S·L/(m·mol).
    pub fn molar_conductivity(&self) -> f64 {
        self.ion
            .molar_conductivity_from(&self.ionization_fraction(), &self.actual_mobility())
    }

    /// The diffusivity, in m²/s.
    pub fn diffusivity(&self) -> f64 {
        self.ion.diffusivity_from(
            &self.ionization_fraction(),
            &self.actual_mobility(),
            self.conditions().temperature,
        )
    }

    /// The separability of this species from `other` in the same solution.
    pub fn separability(&self, other: impl Into<SpeciesRef>) -> Result<f64, IonizeError> {
        let other = self.solution.ion(other)?;
        Ok(separability_of(self.mobility(), other.mobility()))
    }
}
