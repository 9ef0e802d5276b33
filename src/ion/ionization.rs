use super::Ion;
use crate::solvent::{Aqueous, Solvent};

impl Ion {
    /// Returns the acidity-product vector `L`, one entry per state of `valence_zero()`.
    ///
    /// The population of charge state `z` relative to the neutral state is `L[z]·[H+]^z`. The
    /// entry for the neutral state is exactly one.
    pub fn acidity_product(&self, ionic_strength: f64, temperature: f64) -> Vec<f64> {
        let zeros = self.valence_zero();
        let index_zero = self.index_zero();

        let mut acidity = self.acidity(ionic_strength, temperature);
        acidity.insert(index_zero, 1.0);

        let forward: Vec<f64> = acidity
            .iter()
            .scan(1.0, |product, ka| {
                *product *= ka;
                Some(*product)
            })
            .collect();
        let mut reverse: Vec<f64> = acidity
            .iter()
            .rev()
            .scan(1.0, |product, ka| {
                *product *= ka;
                Some(*product)
            })
            .collect();
        reverse.reverse();

        zeros
            .iter()
            .enumerate()
            .map(|(k, &z)| {
                if z >= 0 {
                    forward[index_zero] / forward[k]
                } else {
                    reverse[k] / reverse[index_zero]
                }
            })
            .collect()
    }

    /// Returns the fraction of the species in every state of `valence_zero()`, neutral included.
    fn state_fractions(&self, ph: f64, ionic_strength: f64, temperature: f64) -> Vec<f64> {
        let hydronium = 10f64.powf(-ph) / Aqueous::activity(1, ionic_strength, temperature);
        let terms: Vec<f64> = self
            .acidity_product(ionic_strength, temperature)
            .iter()
            .zip(self.valence_zero())
            .map(|(l, z)| l * hydronium.powi(z))
            .collect();
        let total: f64 = terms.iter().sum();
        terms.into_iter().map(|term| term / total).collect()
    }

    /// Returns the fraction of the species in each nonzero charge state.
    ///
    /// The fractions are normalized over every state including the neutral one, so they sum to
    /// one minus [`Ion::neutral_fraction`].
    pub fn ionization_fraction(&self, ph: f64, ionic_strength: f64, temperature: f64) -> Vec<f64> {
        let mut fractions = self.state_fractions(ph, ionic_strength, temperature);
        fractions.remove(self.index_zero());
        fractions
    }

    /// Returns the fraction of the species in the uncharged state.
    pub fn neutral_fraction(&self, ph: f64, ionic_strength: f64, temperature: f64) -> f64 {
        self.state_fractions(ph, ionic_strength, temperature)[self.index_zero()]
    }

    /// Returns the `moment`-th moment of the charge distribution, `Σ fraction·z^moment`.
    ///
    /// The first moment is the mean charge; the second is the contribution per mole to twice
    /// the ionic strength.
    pub fn charge(&self, ph: f64, ionic_strength: f64, temperature: f64, moment: i32) -> f64 {
        self.ionization_fraction(ph, ionic_strength, temperature)
            .iter()
            .zip(self.valence())
            .map(|(fraction, &z)| fraction * f64::from(z).powi(moment))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use crate::ion::Ion;
    use approx::assert_relative_eq;

    fn phosphate() -> Ion {
        Ion::new(
            "phosphoric acid",
            vec![-3, -2, -1],
            vec![12.67, 7.21, 2.16],
            vec![-71.5e-9, -61.5e-9, -35.1e-9],
        )
        .unwrap()
    }

    fn glycine() -> Ion {
        Ion::new("glycine", vec![-1, 1], vec![9.78, 2.35], vec![-44.2e-9, 41.2e-9]).unwrap()
    }

    #[test]
    fn test_acidity_product_of_triprotic_acid() {
        let l = phosphate().acidity_product(0.0, 25.0);
        let ka: Vec<f64> = [12.67, 7.21, 2.16].iter().map(|p| 10f64.powf(-p)).collect();
        assert_eq!(l.len(), 4);
        assert_eq!(l[3], 1.0);
        assert_relative_eq!(l[2], ka[2], max_relative = 1e-12);
        assert_relative_eq!(l[1], ka[1] * ka[2], max_relative = 1e-12);
        assert_relative_eq!(l[0], ka[0] * ka[1] * ka[2], max_relative = 1e-12);
    }

    #[test]
    fn test_acidity_product_of_base() {
        let tris = Ion::new("tris", vec![1], vec![8.076], vec![29.5e-9]).unwrap();
        let l = tris.acidity_product(0.0, 25.0);
        assert_eq!(l[0], 1.0);
        assert_relative_eq!(l[1], 10f64.powf(8.076), max_relative = 1e-12);
    }

    #[test]
    fn test_fractions_sum_to_one_with_neutral() {
        for ion in [phosphate(), glycine()] {
            for k in 0..=28 {
                let ph = k as f64 * 0.5;
                let charged: f64 = ion.ionization_fraction(ph, 0.01, 25.0).iter().sum();
                let neutral = ion.neutral_fraction(ph, 0.01, 25.0);
                assert_relative_eq!(charged + neutral, 1.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_half_ionized_at_pka() {
        let acetate = Ion::new("acetic acid", vec![-1], vec![4.756], vec![-42.4e-9]).unwrap();
        let fraction = acetate.ionization_fraction(4.756, 0.0, 25.0);
        assert_relative_eq!(fraction[0], 0.5, epsilon = 1e-9);
        assert_relative_eq!(acetate.charge(4.756, 0.0, 25.0, 1), -0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_charge_moments_of_phosphate_at_neutral_ph() {
        let ion = phosphate();
        let mean = ion.charge(12.0, 0.0, 25.0, 1);
        let second = ion.charge(12.0, 0.0, 25.0, 2);
        assert!(mean < -2.0 && mean > -3.0);
        assert!(second > mean * mean);
    }

    #[test]
    fn test_zwitterion_is_mostly_neutral_between_pkas() {
        let ion = glycine();
        assert!(ion.neutral_fraction(6.0, 0.0, 25.0) > 0.99);
        assert_relative_eq!(ion.charge(6.0, 0.0, 25.0, 1), 0.0, epsilon = 1e-3);
    }
}
