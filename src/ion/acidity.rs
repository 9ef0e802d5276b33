use super::Ion;
use crate::math::constants::{GAS_CONSTANT, kelvin};
use crate::solvent::{Aqueous, Solvent};
use std::f64::consts::LN_10;

/// Largest temperature excursion for which the van't Hoff equation is trusted, in K.
const VANT_HOFF_RANGE: f64 = 20.0;
/// Largest temperature excursion for which the Clark-Glew equation is trusted, in K.
const CLARK_GLEW_RANGE: f64 = 100.0;

impl Ion {
    /// Returns the effective acidity constant of each charge-state transition.
    ///
    /// Transition `i` connects `valence_zero()[i]` to `valence_zero()[i + 1]`. The reference pKa
    /// is first extrapolated to `temperature`, then the resulting constant is multiplied by the
    /// ratio of the product and reactant activity coefficients and divided by the activity
    /// coefficient of hydronium.
    pub fn acidity(&self, ionic_strength: f64, temperature: f64) -> Vec<f64> {
        let zeros = self.valence_zero();
        let gamma = Aqueous::activities(&zeros, ionic_strength, temperature);
        let gamma_h = Aqueous::activity(1, ionic_strength, temperature);

        self.temperature_corrected_pka(temperature)
            .iter()
            .enumerate()
            .map(|(i, pka)| 10f64.powf(-pka) * gamma[i + 1] / gamma[i] / gamma_h)
            .collect()
    }

    /// Returns the effective pKa of each charge-state transition.
    pub fn pka(&self, ionic_strength: f64, temperature: f64) -> Vec<f64> {
        self.acidity(ionic_strength, temperature)
            .into_iter()
            .map(|ka| -ka.log10())
            .collect()
    }

    /// Returns the pKa values extrapolated to `temperature`, before any activity correction.
    ///
    /// Uses the Clark-Glew equation when both enthalpy and heat capacity are known, the van't
    /// Hoff equation when only the enthalpy is known, and the reference values otherwise.
    pub fn temperature_corrected_pka(&self, temperature: f64) -> Vec<f64> {
        match (self.enthalpy(), self.heat_capacity()) {
            (Some(enthalpy), Some(heat_capacity)) => {
                self.clark_glew_pka(enthalpy, heat_capacity, temperature)
            }
            (Some(enthalpy), None) => self.vant_hoff_pka(enthalpy, temperature),
            _ => {
                if temperature != self.reference_temperature() {
                    log::warn!(
                        "{}: no enthalpy data to correct pKa from {} °C to {} °C; using reference values",
                        self.name(),
                        self.reference_temperature(),
                        temperature
                    );
                }
                self.reference_pka().to_vec()
            }
        }
    }

    fn vant_hoff_pka(&self, enthalpy: &[f64], temperature: f64) -> Vec<f64> {
        let t = kelvin(temperature);
        let t_ref = kelvin(self.reference_temperature());
        if (t - t_ref).abs() > VANT_HOFF_RANGE {
            log::warn!(
                "{}: van't Hoff correction applied over {:.1} K",
                self.name(),
                (t - t_ref).abs()
            );
        }

        self.reference_pka()
            .iter()
            .zip(enthalpy)
            .map(|(pka, h)| pka - h / (LN_10 * GAS_CONSTANT) * (1.0 / t_ref - 1.0 / t))
            .collect()
    }

    fn clark_glew_pka(&self, enthalpy: &[f64], heat_capacity: &[f64], temperature: f64) -> Vec<f64> {
        let t = kelvin(temperature);
        let t_ref = kelvin(self.reference_temperature());
        if (t - t_ref).abs() > CLARK_GLEW_RANGE {
            log::warn!(
                "{}: Clark-Glew correction applied over {:.1} K",
                self.name(),
                (t - t_ref).abs()
            );
        }

        let shape = t_ref / t - 1.0 + (t / t_ref).ln();
        self.reference_pka()
            .iter()
            .zip(enthalpy)
            .zip(heat_capacity)
            .map(|((pka, h), cp)| {
                pka - h / (LN_10 * GAS_CONSTANT) * (1.0 / t_ref - 1.0 / t)
                    - cp / (LN_10 * GAS_CONSTANT) * shape
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::ion::Ion;
    use approx::assert_relative_eq;

    fn acetate() -> Ion {
        Ion::new("acetic acid", vec![-1], vec![4.756], vec![-42.4e-9]).unwrap()
    }

    #[test]
    fn test_acidity_equals_reference_at_infinite_dilution() {
        let ion = acetate();
        assert_eq!(ion.acidity(0.0, 25.0), vec![10f64.powf(-4.756)]);
        assert_relative_eq!(ion.pka(0.0, 25.0)[0], 4.756, epsilon = 1e-12);
    }

    #[test]
    fn test_ionic_strength_lowers_pka_of_acid() {
        // A neutral acid releasing a monovalent anion is stabilized by screening.
        let ion = acetate();
        assert!(ion.pka(0.05, 25.0)[0] < 4.756);
    }

    #[test]
    fn test_missing_thermodynamics_keeps_reference_pka() {
        let ion = acetate();
        assert_eq!(ion.temperature_corrected_pka(40.0), vec![4.756]);
    }

    #[test]
    fn test_vant_hoff_direction_follows_enthalpy() {
        // Endothermic dissociation is favored at higher temperature.
        let tris = Ion::new("tris", vec![1], vec![8.076], vec![29.5e-9])
            .unwrap()
            .with_enthalpy(vec![47_450.0])
            .unwrap();
        assert_eq!(tris.temperature_corrected_pka(25.0), vec![8.076]);
        let warm = tris.temperature_corrected_pka(35.0)[0];
        assert!(warm < 8.076);
        // roughly -0.028 per degree
        assert_relative_eq!(warm, 8.076 - 0.27, epsilon = 0.03);
    }

    #[test]
    fn test_clark_glew_reduces_to_vant_hoff_near_reference() {
        let base = Ion::new("x", vec![-1], vec![4.756], vec![-42.4e-9])
            .unwrap()
            .with_enthalpy(vec![-410.0])
            .unwrap();
        let with_cp = base.clone().with_heat_capacity(vec![-142.0]).unwrap();
        let vh = base.temperature_corrected_pka(26.0)[0];
        let cg = with_cp.temperature_corrected_pka(26.0)[0];
        assert_relative_eq!(vh, cg, epsilon = 1e-4);
        assert_eq!(with_cp.temperature_corrected_pka(25.0), vec![4.756]);
    }
}
