use super::{BoundIon, Solution, SpeciesRef};
use crate::error::IonizeError;
use crate::ion::Ion;
use crate::math::constants::LITERS_PER_CUBIC_METER;

/// A species counts as predominantly in one charge state above this fraction.
const DOMINANT_FRACTION: f64 = 0.9;

impl Solution {
    /// The conductivity of the solution, in S/m, including hydronium and hydroxide.
    pub fn conductivity(&self) -> f64 {
        let solutes: f64 = self
            .bound_ions()
            .map(|ion| ion.concentration() * ion.molar_conductivity())
            .sum();
        let solvent: f64 = [self.hydronium(), self.hydroxide()]
            .iter()
            .map(|ion| ion.concentration() * ion.molar_conductivity())
            .sum();
        solutes + solvent
    }

    /// The fraction of the current carried by `species`.
    ///
    /// The transference numbers of all members, hydronium and hydroxide sum to one. A species
    /// that is not in the solution carries no current.
    pub fn transference(&self, species: impl Into<SpeciesRef>) -> Result<f64, IonizeError> {
        let ion = self.ion(species)?;
        Ok(ion.concentration() * ion.molar_conductivity() / self.conductivity())
    }

    /// The zone transfer ratio of `species`: the conductivity divided by its effective mobility.
    ///
    /// Its reciprocal is the velocity of the species per unit current density, so two zones
    /// migrate together when the reciprocals of their zone transfer ratios agree.
    pub fn zone_transfer(&self, species: impl Into<SpeciesRef>) -> Result<f64, IonizeError> {
        let ion = self.ion(species)?;
        Ok(self.conductivity() / ion.mobility())
    }

    /// The buffering capacity, in mol/L per pH unit.
    ///
    /// A small amount of a strong monoprotic acid is added and the pH response measured. The
    /// acid is shrunk until it is within two percent of the capacity it reveals, so the result is
    /// the local slope rather than a secant across a large step.
    ///
    /// # Errors
    ///
    /// Returns `IonizeError::NotConverged` if the acid cannot be made small enough within
    /// `SolverOptions::buffer_iterations` refinements, or if it leaves the pH unchanged.
    pub fn buffering_capacity(&self) -> Result<f64, IonizeError> {
        const OPERATION: &str = "buffering capacity";
        let insult = Ion::new("acid insult", vec![-1], vec![-2.0], vec![-1e-8])?;

        let smallest = if self.is_empty() {
            self.hydronium_concentration().min(self.hydroxide_concentration())
        } else {
            self.composition().iter().map(|(_, c)| *c).fold(f64::INFINITY, f64::min)
        };
        let mut amount = 1e-3 * smallest;
        let mut capacity = 0.0;

        for _ in 0..self.options().buffer_iterations {
            let insulted = self.add(&insult, amount)?;
            let shift = self.ph() - insulted.ph();
            if shift == 0.0 {
                return Err(IonizeError::NotConverged {
                    operation: OPERATION,
                    max_iterations: self.options().buffer_iterations,
                    residual: 0.0,
                });
            }
            capacity = (amount / shift).abs();
            if amount <= 2e-2 * capacity {
                return Ok(capacity);
            }
            amount = 1e-2 * capacity;
        }

        Err(IonizeError::NotConverged {
            operation: OPERATION,
            max_iterations: self.options().buffer_iterations,
            residual: amount / capacity,
        })
    }

    /// The Kohlrausch regulating function, `Σ |z̄|·c / |μ|`, with concentrations in mol/m³.
    ///
    /// It is conserved across a moving boundary only for species that stay in a single charge
    /// state, and a warning is logged for every species that does not.
    pub fn kohlrausch(&self) -> f64 {
        self.bound_ions()
            .map(|ion| {
                let fractions = ion.ionization_fraction();
                if fractions.iter().copied().fold(0.0, f64::max) < DOMINANT_FRACTION {
                    log::warn!(
                        "Kohlrausch function assumes '{}' is in a single charge state",
                        ion.ion().name()
                    );
                }
                let charge = ion.charge(1).abs();
                if charge == 0.0 {
                    return 0.0;
                }
                charge * ion.concentration() * LITERS_PER_CUBIC_METER / ion.mobility().abs()
            })
            .sum()
    }

    /// The Alberty conservation function, `Σ c / |μ_dominant|`.
    ///
    /// Multivalent species contribute through their dominant charge state, with a warning if that
    /// state is not monovalent or not dominant enough to stand for the species.
    pub fn alberty(&self) -> f64 {
        self.bound_ions()
            .map(|ion| {
                let actual = ion.actual_mobility();
                let index = dominant_state(&ion, "Alberty");
                ion.concentration() * LITERS_PER_CUBIC_METER / actual[index].abs()
            })
            .sum()
    }

    /// The Jovin conservation function, `Σ c·z_dominant`.
    pub fn jovin(&self) -> f64 {
        self.bound_ions()
            .map(|ion| {
                let index = dominant_state(&ion, "Jovin");
                ion.concentration() * f64::from(ion.ion().valence()[index])
            })
            .sum()
    }

    /// The gas conservation functions, `alberty - jovin / μ`, with the hydronium mobility first
    /// and the hydroxide mobility second.
    ///
    /// Each value is only meaningful when the other solvent ion is negligible, so the branch
    /// belonging to the less concentrated of hydronium and hydroxide is NaN.
    pub fn gas(&self) -> [f64; 2] {
        let alberty = self.alberty();
        let jovin = self.jovin() * LITERS_PER_CUBIC_METER;
        let hydronium = self.hydronium();
        let hydroxide = self.hydroxide();
        if hydronium.concentration() > hydroxide.concentration() {
            [alberty - jovin / hydronium.mobility(), f64::NAN]
        } else {
            [f64::NAN, alberty - jovin / hydroxide.mobility()]
        }
    }
}

/// Returns the index of the most populated charge state, warning if it is a poor representative.
fn dominant_state(ion: &BoundIon<'_>, function: &str) -> usize {
    let valence = ion.ion().valence();
    if valence.len() == 1 {
        return 0;
    }

    let fractions = ion.ionization_fraction();
    let (index, largest) = fractions
        .iter()
        .copied()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (i, f)| if f > best.1 { (i, f) } else { best });
    let total: f64 = fractions.iter().sum();
    if largest / total < DOMINANT_FRACTION {
        log::warn!(
            "{function} function: '{}' is not predominantly in one charge state",
            ion.ion().name()
        );
    }
    if valence[index].abs() != 1 {
        log::warn!(
            "{function} function: dominant state of '{}' is not monovalent",
            ion.ion().name()
        );
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn potassium_chloride(concentration: f64) -> Solution {
        Solution::new(["potassium", "hydrochloric acid"], &[concentration, concentration]).unwrap()
    }

    fn buffer() -> Solution {
        Solution::new(["tris", "hydrochloric acid"], &[0.03, 0.01]).unwrap()
    }

    #[test]
    fn test_conductivity_of_potassium_chloride() {
        let conductivity = potassium_chloride(0.01).conductivity();
        assert!(conductivity > 0.13 && conductivity < 0.15, "got {conductivity}");
    }

    #[test]
    fn test_water_conductivity_is_small() {
        let conductivity = Solution::water().conductivity();
        assert!(conductivity > 1e-6 && conductivity < 1e-4, "got {conductivity}");
    }

    #[test]
    fn test_transference_numbers_sum_to_one() {
        let solution = buffer();
        let total = solution.transference("tris").unwrap()
            + solution.transference("hydrochloric acid").unwrap()
            + solution.transference("hydronium").unwrap()
            + solution.transference("hydroxide").unwrap();
        assert_relative_eq!(total, 1.0, epsilon = 1e-12);
        assert_eq!(solution.transference("sodium").unwrap(), 0.0);
    }

    #[test]
    fn test_zone_transfer_sign_follows_mobility() {
        let solution = buffer();
        assert!(solution.zone_transfer("tris").unwrap() > 0.0);
        assert!(solution.zone_transfer("hydrochloric acid").unwrap() < 0.0);
    }

    #[test]
    fn test_buffering_capacity_of_tris_buffer() {
        let capacity = buffer().buffering_capacity().unwrap();
        // Tris is one third protonated: 2.303 · 0.03 · (1/3) · (2/3).
        assert!(capacity > 0.01 && capacity < 0.02, "got {capacity}");
    }

    #[test]
    fn test_unbuffered_salt_has_little_capacity() {
        let capacity = potassium_chloride(0.01).buffering_capacity().unwrap();
        assert!(capacity < 1e-5, "got {capacity}");
    }

    #[test]
    fn test_jovin_counts_net_charge() {
        assert_relative_eq!(buffer().jovin(), 0.02, epsilon = 1e-15);
        assert_eq!(Solution::water().jovin(), 0.0);
    }

    #[test]
    fn test_kohlrausch_and_alberty_agree_for_strong_electrolytes() {
        let solution = potassium_chloride(0.01);
        let kohlrausch = solution.kohlrausch();
        let alberty = solution.alberty();
        assert!(kohlrausch > 0.0);
        assert_relative_eq!(kohlrausch, alberty, max_relative = 1e-9);
    }

    #[test]
    fn test_gas_keeps_the_dominant_solvent_ion() {
        let acidic = Solution::new(["hydrochloric acid"], &[0.001]).unwrap();
        let [hydronium, hydroxide] = acidic.gas();
        assert!(hydroxide.is_nan());
        let expected = acidic.alberty()
            - acidic.jovin() * LITERS_PER_CUBIC_METER / acidic.hydronium().mobility();
        assert_relative_eq!(hydronium, expected, max_relative = 1e-12);
        assert!(hydronium > 0.0);

        let basic = Solution::new(["sodium"], &[0.001]).unwrap();
        let [hydronium, hydroxide] = basic.gas();
        assert!(hydronium.is_nan());
        let expected =
            basic.alberty() - basic.jovin() * LITERS_PER_CUBIC_METER / basic.hydroxide().mobility();
        assert_relative_eq!(hydroxide, expected, max_relative = 1e-12);
        assert!(hydroxide > 0.0);
    }
}
