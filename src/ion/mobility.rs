use super::Ion;
use crate::math::constants::{
    ELECTROPHORETIC_B, NIGHTINGALE_SCALE, ONSAGER_FUOSS_A, PITTS, REFERENCE_TEMPERATURE,
    ROBINSON_STOKES_A, kelvin,
};
use crate::solvent::{Aqueous, Solvent};

/// The ionic-strength dependence shared by both mobility corrections, `√I / (1 + a·√I)`.
fn screening(ionic_strength: f64) -> f64 {
    let sqrt_i = ionic_strength.sqrt();
    sqrt_i / (1.0 + PITTS * sqrt_i)
}

/// Relaxation and electrophoretic coefficients, scaled from the reference state to `temperature`.
fn drag_coefficients(relaxation_reference: f64, temperature: f64) -> (f64, f64) {
    let ratio = kelvin(REFERENCE_TEMPERATURE) * Aqueous::dielectric(REFERENCE_TEMPERATURE)
        / (kelvin(temperature) * Aqueous::dielectric(temperature));
    let relaxation = relaxation_reference * ratio.powf(1.5);
    let electrophoretic = ELECTROPHORETIC_B * ratio.sqrt()
        * Aqueous::viscosity(REFERENCE_TEMPERATURE)
        / Aqueous::viscosity(temperature);
    (relaxation, electrophoretic)
}

impl Ion {
    /// Returns the signed infinite-dilution mobility of each charge state at `temperature`.
    ///
    /// Species with Nightingale data use their Walden-product fit. Everything else is scaled
    /// from the reference mobility by the ratio of solvent viscosities.
    pub fn absolute_mobility(&self, temperature: f64) -> Vec<f64> {
        match self.nightingale() {
            Some(data) => {
                if !(data.min < temperature && temperature < data.max) {
                    log::warn!(
                        "{}: {} °C is outside the Nightingale fit range [{}, {}]",
                        self.name(),
                        temperature,
                        data.min,
                        data.max
                    );
                }
                let walden = data.evaluate(temperature) * NIGHTINGALE_SCALE
                    / Aqueous::viscosity(temperature);
                self.valence()
                    .iter()
                    .map(|&z| walden * f64::from(z))
                    .collect()
            }
            None => {
                let scale = Aqueous::viscosity(self.reference_temperature())
                    / Aqueous::viscosity(temperature);
                self.reference_mobility()
                    .iter()
                    .map(|m| m * scale)
                    .collect()
            }
        }
    }

    /// Returns the Robinson-Stokes mobility of each charge state.
    ///
    /// This single-ion correction only needs a generic ionic strength and ignores which other
    /// ions make it up.
    pub fn robinson_stokes_mobility(&self, ionic_strength: f64, temperature: f64) -> Vec<f64> {
        let (a, b) = drag_coefficients(ROBINSON_STOKES_A, temperature);
        let s = screening(ionic_strength);

        self.absolute_mobility(temperature)
            .iter()
            .zip(self.valence())
            .map(|(mobility, &z)| {
                let z = f64::from(z);
                mobility - (a * z.abs() * mobility + b * z) * s
            })
            .collect()
    }

    /// Returns the Onsager-Fuoss mobility of each charge state, given the relaxation `factor`
    /// of each charge state computed from the full composition of a solution.
    pub(crate) fn onsager_fuoss_mobility(
        &self,
        ionic_strength: f64,
        temperature: f64,
        factor: &[f64],
    ) -> Vec<f64> {
        let (a, b) = drag_coefficients(ONSAGER_FUOSS_A, temperature);
        let s = screening(ionic_strength);

        self.absolute_mobility(temperature)
            .iter()
            .zip(self.valence())
            .zip(factor)
            .map(|((mobility, &z), f)| {
                let z = f64::from(z);
                mobility - (a * z * f * mobility + b * z) * s
            })
            .collect()
    }

    /// Returns the effective mobility, the ionization-weighted Robinson-Stokes mobility.
    pub fn mobility(&self, ph: f64, ionic_strength: f64, temperature: f64) -> f64 {
        let fractions = self.ionization_fraction(ph, ionic_strength, temperature);
        let actual = self.robinson_stokes_mobility(ionic_strength, temperature);
        effective_mobility(&fractions, &actual)
    }
}

/// Weights per-charge-state mobilities by their ionization fractions.
pub(crate) fn effective_mobility(fractions: &[f64], actual: &[f64]) -> f64 {
    fractions.iter().zip(actual).map(|(f, m)| f * m).sum()
}

#[cfg(test)]
mod tests {
    use crate::ion::{Ion, NightingaleData};
    use crate::math::constants::ONSAGER_FUOSS_SERIES;
    use approx::assert_relative_eq;

    fn sodium() -> Ion {
        Ion::new("sodium", vec![1], vec![13.7], vec![51.9e-9]).unwrap()
    }

    fn chloride() -> Ion {
        Ion::new("hydrochloric acid", vec![-1], vec![-2.0], vec![-79.1e-9]).unwrap()
    }

    #[test]
    fn test_absolute_mobility_at_reference_temperature() {
        assert_eq!(sodium().absolute_mobility(25.0), vec![51.9e-9]);
    }

    #[test]
    fn test_absolute_mobility_rises_with_temperature() {
        let warm = sodium().absolute_mobility(35.0)[0];
        assert!(warm > 51.9e-9);
        // Walden's rule: mobility times viscosity is constant.
        use crate::solvent::{Aqueous, Solvent};
        assert_relative_eq!(
            warm * Aqueous::viscosity(35.0),
            51.9e-9 * Aqueous::viscosity(25.0),
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_nightingale_fit_replaces_viscosity_scaling() {
        let data = NightingaleData {
            fit: vec![0.0, 0.5],
            min: 0.0,
            max: 100.0,
        };
        let ion = sodium().with_nightingale(data).unwrap();
        use crate::solvent::{Aqueous, Solvent};
        let expected = 0.5 * 10.35e-11 / Aqueous::viscosity(25.0);
        assert_relative_eq!(ion.absolute_mobility(25.0)[0], expected, max_relative = 1e-12);
    }

    #[test]
    fn test_robinson_stokes_shrinks_magnitude() {
        for ion in [sodium(), chloride()] {
            let absolute = ion.absolute_mobility(25.0)[0];
            assert_eq!(ion.robinson_stokes_mobility(0.0, 25.0)[0], absolute);
            let corrected = ion.robinson_stokes_mobility(0.01, 25.0)[0];
            assert_eq!(corrected.signum(), absolute.signum());
            assert!(corrected.abs() < absolute.abs());
        }
    }

    #[test]
    fn test_onsager_fuoss_matches_robinson_stokes_for_symmetric_factor() {
        // For a symmetric 1:1 electrolyte the relaxation factor reduces to the leading series term.
        let ion = chloride();
        let factor = [ONSAGER_FUOSS_SERIES[0] * -1.0];
        let of = ion.onsager_fuoss_mobility(0.001, 25.0, &factor)[0];
        let rs = ion.robinson_stokes_mobility(0.001, 25.0)[0];
        assert_relative_eq!(of, rs, max_relative = 1e-3);
    }

    #[test]
    fn test_effective_mobility_of_weak_acid() {
        let acetate = Ion::new("acetic acid", vec![-1], vec![4.756], vec![-42.4e-9]).unwrap();
        assert_relative_eq!(acetate.mobility(4.756, 0.0, 25.0), -21.2e-9, max_relative = 1e-9);
        assert!(acetate.mobility(2.0, 0.0, 25.0).abs() < 1e-10);
    }
}
