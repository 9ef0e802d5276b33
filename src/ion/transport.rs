use super::Ion;
use crate::math::constants::{BOLTZMANN, ELEMENTARY_CHARGE, FARADAY, LITERS_PER_CUBIC_METER, kelvin};

impl Ion {
    /// Returns the molar conductivity, in S·L/(m·mol), using Robinson-Stokes mobilities.
    ///
    /// Multiplying by a molar concentration gives a conductivity in S/m.
    pub fn molar_conductivity(&self, ph: f64, ionic_strength: f64, temperature: f64) -> f64 {
        let fractions = self.ionization_fraction(ph, ionic_strength, temperature);
        let actual = self.robinson_stokes_mobility(ionic_strength, temperature);
        self.molar_conductivity_from(&fractions, &actual)
    }

    pub(crate) fn molar_conductivity_from(&self, fractions: &[f64], actual: &[f64]) -> f64 {
        let sum: f64 = self
            .valence()
            .iter()
            .zip(fractions)
            .zip(actual)
            .map(|((&z, f), m)| f64::from(z) * f * m)
            .sum();
        LITERS_PER_CUBIC_METER * FARADAY * sum
    }

    /// Returns the diffusivity in m²/s from the Nernst-Einstein relation.
    ///
    /// Each charged state contributes `μ/z · kT/e`, weighted by its share of the charged
    /// population. A species with no charged population has no defined diffusivity here and
    /// returns zero.
    pub fn diffusivity(&self, ph: f64, ionic_strength: f64, temperature: f64) -> f64 {
        let fractions = self.ionization_fraction(ph, ionic_strength, temperature);
        let actual = self.robinson_stokes_mobility(ionic_strength, temperature);
        self.diffusivity_from(&fractions, &actual, temperature)
    }

    pub(crate) fn diffusivity_from(&self, fractions: &[f64], actual: &[f64], temperature: f64) -> f64 {
        let charged: f64 = fractions.iter().sum();
        if charged == 0.0 {
            return 0.0;
        }
        let thermal = BOLTZMANN * kelvin(temperature) / ELEMENTARY_CHARGE;
        let weighted: f64 = self
            .valence()
            .iter()
            .zip(fractions)
            .zip(actual)
            .map(|((&z, f), m)| m * f / f64::from(z))
            .sum();
        weighted * thermal / charged
    }

    /// Returns the separability of this ion from `other`, `|(μ_self − μ_other) / μ_self|`.
    pub fn separability(&self, other: &Ion, ph: f64, ionic_strength: f64, temperature: f64) -> f64 {
        let mobilities = [self, other].map(|ion| ion.mobility(ph, ionic_strength, temperature));
        separability_of(mobilities[0], mobilities[1])
    }
}

pub(crate) fn separability_of(mobility: f64, other: f64) -> f64 {
    ((mobility - other) / mobility).abs()
}
