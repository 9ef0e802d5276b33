//! This module defines the `Ion` type, an immutable description of a partially ionizing species.
//!
//! An ion owns a strictly ascending list of nonzero charge states together with the reference
//! pKa and reference mobility of each state. Everything that depends on the surroundings (pH,
//! ionic strength, temperature) is computed on demand from arguments, never stored. The
//! computations are split by concern across the submodules:
//!
//! - `acidity`: temperature- and activity-corrected dissociation constants,
//! - `ionization`: the acidity-product vector, ionization fractions and mean charge,
//! - `mobility`: infinite-dilution and Robinson-Stokes mobilities,
//! - `transport`: molar conductivity, diffusivity and separability.

mod acidity;
mod ionization;
pub(crate) mod mobility;
pub(crate) mod transport;

use crate::error::IonizeError;
use crate::math::constants::REFERENCE_TEMPERATURE;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

/// Type tag written into the serialized form of an ion.
const ION_TAG: &str = "Ion";

/// A bounded polynomial fit of the Walden product against temperature.
///
/// Used for species whose hydration shell makes the viscosity scaling of mobility inaccurate.
/// Coefficients are ordered from the highest power of temperature (in degrees Celsius) down to
/// the constant term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NightingaleData {
    /// Polynomial coefficients, highest degree first.
    pub fit: Vec<f64>,
    /// Lowest temperature at which the fit is valid, in degrees Celsius.
    pub min: f64,
    /// Highest temperature at which the fit is valid, in degrees Celsius.
    pub max: f64,
}

impl NightingaleData {
    fn evaluate(&self, temperature: f64) -> f64 {
        self.fit.iter().fold(0.0, |acc, &c| acc * temperature + c)
    }
}

/// An ionizing species dissolved in water.
///
/// Instances are validated at construction and never mutated afterwards. Equality compares the
/// full state, and hashing is consistent with it.
///
/// # Examples
///
/// ```
/// use ionize::Ion;
///
/// let acetate = Ion::new("acetic acid", vec![-1], vec![4.756], vec![-42.4e-9]).unwrap();
/// assert_eq!(acetate.valence(), &[-1]);
///
/// let bad = Ion::new("bad", vec![1], vec![8.0], vec![-30e-9]);
/// assert!(bad.is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "IonRecord", try_from = "IonRecord")]
pub struct Ion {
    name: String,
    valence: Vec<i32>,
    reference_pka: Vec<f64>,
    reference_mobility: Vec<f64>,
    reference_temperature: f64,
    enthalpy: Option<Vec<f64>>,
    heat_capacity: Option<Vec<f64>>,
    nightingale: Option<NightingaleData>,
    molecular_weight: Option<f64>,
    alias: Option<Vec<String>>,
}

impl Ion {
    /// Creates and validates an ion at the default reference temperature.
    ///
    /// # Arguments
    ///
    /// * `name` - The identifier of the species.
    /// * `valence` - Nonzero charge states, sorted strictly ascending.
    /// * `reference_pka` - The pKa of each charge state at the reference temperature.
    /// * `reference_mobility` - The signed infinite-dilution mobility of each charge state, in m²/(V·s).
    ///
    /// # Errors
    ///
    /// Returns `IonizeError::InvalidSpecies` if the arrays differ in length, the charge states are
    /// not strictly ascending nonzero values, a value is not finite, or a mobility disagrees in
    /// sign with its charge state.
    pub fn new(
        name: impl Into<String>,
        valence: Vec<i32>,
        reference_pka: Vec<f64>,
        reference_mobility: Vec<f64>,
    ) -> Result<Self, IonizeError> {
        let ion = Self {
            name: name.into(),
            valence,
            reference_pka,
            reference_mobility,
            reference_temperature: REFERENCE_TEMPERATURE,
            enthalpy: None,
            heat_capacity: None,
            nightingale: None,
            molecular_weight: None,
            alias: None,
        };
        ion.validate()?;
        Ok(ion)
    }

    /// Returns a copy with a different reference temperature, in degrees Celsius.
    pub fn with_reference_temperature(mut self, temperature: f64) -> Result<Self, IonizeError> {
        self.reference_temperature = temperature;
        self.validate()?;
        Ok(self)
    }

    /// Returns a copy with per-charge-state enthalpies of ionization, in J/mol.
    pub fn with_enthalpy(mut self, enthalpy: Vec<f64>) -> Result<Self, IonizeError> {
        self.enthalpy = Some(enthalpy);
        self.validate()?;
        Ok(self)
    }

    /// Returns a copy with per-charge-state heat capacities of ionization, in J/(mol·K).
    pub fn with_heat_capacity(mut self, heat_capacity: Vec<f64>) -> Result<Self, IonizeError> {
        self.heat_capacity = Some(heat_capacity);
        self.validate()?;
        Ok(self)
    }

    /// Returns a copy whose mobility follows a Nightingale temperature fit.
    pub fn with_nightingale(mut self, data: NightingaleData) -> Result<Self, IonizeError> {
        self.nightingale = Some(data);
        self.validate()?;
        Ok(self)
    }

    /// Returns a copy with a molecular weight, in g/mol.
    pub fn with_molecular_weight(mut self, molecular_weight: f64) -> Result<Self, IonizeError> {
        self.molecular_weight = Some(molecular_weight);
        self.validate()?;
        Ok(self)
    }

    /// Returns a copy with alternate names.
    pub fn with_alias(mut self, alias: Vec<String>) -> Self {
        self.alias = Some(alias);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn valence(&self) -> &[i32] {
        &self.valence
    }

    pub fn reference_pka(&self) -> &[f64] {
        &self.reference_pka
    }

    pub fn reference_mobility(&self) -> &[f64] {
        &self.reference_mobility
    }

    pub fn reference_temperature(&self) -> f64 {
        self.reference_temperature
    }

    pub fn enthalpy(&self) -> Option<&[f64]> {
        self.enthalpy.as_deref()
    }

    pub fn heat_capacity(&self) -> Option<&[f64]> {
        self.heat_capacity.as_deref()
    }

    pub fn nightingale(&self) -> Option<&NightingaleData> {
        self.nightingale.as_ref()
    }

    pub fn molecular_weight(&self) -> Option<f64> {
        self.molecular_weight
    }

    pub fn alias(&self) -> Option<&[String]> {
        self.alias.as_deref()
    }

    /// Returns the charge states with the neutral state inserted in sorted position.
    pub fn valence_zero(&self) -> Vec<i32> {
        let index_zero = self.index_zero();
        let mut zeros = self.valence.clone();
        zeros.insert(index_zero, 0);
        zeros
    }

    /// Position of the neutral state in `valence_zero`.
    fn index_zero(&self) -> usize {
        self.valence.iter().take_while(|&&z| z < 0).count()
    }

    /// Returns true if `name` matches the ion's name or one of its aliases, ignoring case.
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
            || self
                .alias
                .iter()
                .flatten()
                .any(|alias| alias.eq_ignore_ascii_case(name))
    }

    fn invalid(&self, reason: impl Into<String>) -> IonizeError {
        IonizeError::InvalidSpecies {
            name: self.name.clone(),
            reason: reason.into(),
        }
    }

    fn validate(&self) -> Result<(), IonizeError> {
        if self.valence.is_empty() {
            return Err(self.invalid("at least one charge state is required"));
        }
        if self.valence.contains(&0) {
            return Err(self.invalid("charge states must be nonzero"));
        }
        if self.valence.windows(2).any(|w| w[0] >= w[1]) {
            return Err(self.invalid("charge states must be sorted strictly ascending"));
        }

        let n = self.valence.len();
        let per_state: [(&str, Option<&[f64]>); 4] = [
            ("reference_pKa", Some(&self.reference_pka)),
            ("reference_mobility", Some(&self.reference_mobility)),
            ("enthalpy", self.enthalpy.as_deref()),
            ("heat_capacity", self.heat_capacity.as_deref()),
        ];
        for (label, values) in per_state {
            let Some(values) = values else { continue };
            if values.len() != n {
                return Err(self.invalid(format!(
                    "{label} has {} entries but there are {n} charge states",
                    values.len()
                )));
            }
            if values.iter().any(|v| !v.is_finite()) {
                return Err(self.invalid(format!("{label} must contain finite values")));
            }
        }

        if let Some((z, m)) = self
            .valence
            .iter()
            .zip(&self.reference_mobility)
            .find(|&(&z, &m)| m * f64::from(z) <= 0.0)
        {
            return Err(self.invalid(format!(
                "mobility {m:e} does not carry the sign of charge state {z}"
            )));
        }

        if !self.reference_temperature.is_finite() {
            return Err(self.invalid("reference temperature must be finite"));
        }
        if let Some(data) = &self.nightingale {
            if data.fit.is_empty() || !(data.min < data.max) {
                return Err(self.invalid(
                    "nightingale data needs coefficients and a non-empty temperature range",
                ));
            }
        }
        if let Some(weight) = self.molecular_weight {
            if !(weight > 0.0) {
                return Err(self.invalid("molecular weight must be positive"));
            }
        }
        Ok(())
    }
}

// All floating point fields are validated finite, so equality is reflexive.
impl Eq for Ion {}

impl Hash for Ion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        fn hash_floats<H: Hasher>(values: &[f64], state: &mut H) {
            values.len().hash(state);
            for v in values {
                // +0.0 folds negative zero onto positive zero
                (v + 0.0).to_bits().hash(state);
            }
        }

        self.name.hash(state);
        self.valence.hash(state);
        hash_floats(&self.reference_pka, state);
        hash_floats(&self.reference_mobility, state);
        hash_floats(&[self.reference_temperature], state);
        hash_floats(self.enthalpy.as_deref().unwrap_or_default(), state);
        hash_floats(self.heat_capacity.as_deref().unwrap_or_default(), state);
        self.alias.hash(state);
    }
}

impl std::fmt::Display for Ion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ion('{}')", self.name)
    }
}

static HYDRONIUM: OnceLock<Ion> = OnceLock::new();
static HYDROXIDE: OnceLock<Ion> = OnceLock::new();

/// Returns the hydronium pseudo-species present in every solution.
///
/// Its pKa keeps it fully charged at any pH the solver can produce.
pub fn hydronium() -> &'static Ion {
    HYDRONIUM.get_or_init(|| {
        Ion::new("hydronium", vec![1], vec![100.0], vec![362e-9])
            .expect("Hydronium definition is invalid. This is a library bug.")
    })
}

/// Returns the hydroxide pseudo-species present in every solution.
pub fn hydroxide() -> &'static Ion {
    HYDROXIDE.get_or_init(|| {
        Ion::new("hydroxide", vec![-1], vec![-100.0], vec![-205e-9])
            .expect("Hydroxide definition is invalid. This is a library bug.")
    })
}

/// The unvalidated, serializable form of an ion.
///
/// This is both the database record format and the JSON form of an `Ion`. Charge states are
/// read as floating point numbers so that non-integer values are reported as validation errors
/// rather than opaque parse failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IonRecord {
    #[serde(rename = "__ion__", default = "default_ion_tag")]
    pub tag: String,
    #[serde(default)]
    pub name: String,
    pub valence: Vec<f64>,
    #[serde(rename = "reference_pKa")]
    pub reference_pka: Vec<f64>,
    pub reference_mobility: Vec<f64>,
    #[serde(default = "default_reference_temperature")]
    pub reference_temperature: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enthalpy: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heat_capacity: Option<Vec<f64>>,
    #[serde(
        default,
        rename = "nightingale_data",
        skip_serializing_if = "Option::is_none"
    )]
    pub nightingale: Option<NightingaleData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub molecular_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<Vec<String>>,
}

fn default_ion_tag() -> String {
    ION_TAG.to_string()
}

fn default_reference_temperature() -> f64 {
    REFERENCE_TEMPERATURE
}

impl From<Ion> for IonRecord {
    fn from(ion: Ion) -> Self {
        Self {
            tag: default_ion_tag(),
            name: ion.name,
            valence: ion.valence.into_iter().map(f64::from).collect(),
            reference_pka: ion.reference_pka,
            reference_mobility: ion.reference_mobility,
            reference_temperature: ion.reference_temperature,
            enthalpy: ion.enthalpy,
            heat_capacity: ion.heat_capacity,
            nightingale: ion.nightingale,
            molecular_weight: ion.molecular_weight,
            alias: ion.alias,
        }
    }
}

impl TryFrom<IonRecord> for Ion {
    type Error = IonizeError;

    fn try_from(record: IonRecord) -> Result<Self, Self::Error> {
        let invalid = |reason: String| IonizeError::InvalidSpecies {
            name: record.name.clone(),
            reason,
        };

        if record.tag != ION_TAG {
            return Err(invalid(format!("unexpected type tag '{}'", record.tag)));
        }
        if record.name.is_empty() {
            return Err(invalid("a name is required".to_string()));
        }
        let valence = record
            .valence
            .iter()
            .map(|&z| {
                if z.fract() == 0.0 && z.abs() <= f64::from(i32::MAX) {
                    Ok(z as i32)
                } else {
                    Err(invalid(format!("charge state {z} is not an integer")))
                }
            })
            .collect::<Result<Vec<i32>, IonizeError>>()?;

        let ion = Self {
            name: record.name,
            valence,
            reference_pka: record.reference_pka,
            reference_mobility: record.reference_mobility,
            reference_temperature: record.reference_temperature,
            enthalpy: record.enthalpy,
            heat_capacity: record.heat_capacity,
            nightingale: record.nightingale,
            molecular_weight: record.molecular_weight,
            alias: record.alias,
        };
        ion.validate()?;
        Ok(ion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn phosphate() -> Ion {
        Ion::new(
            "phosphoric acid",
            vec![-3, -2, -1],
            vec![12.67, 7.21, 2.16],
            vec![-71.5e-9, -61.5e-9, -35.1e-9],
        )
        .unwrap()
    }

    #[test]
    fn test_valence_zero_inserts_neutral_state() {
        assert_eq!(phosphate().valence_zero(), vec![-3, -2, -1, 0]);
        let histidine = Ion::new(
            "histidine",
            vec![-1, 1, 2],
            vec![9.33, 6.04, 1.8],
            vec![-28.2e-9, 29.6e-9, 40.0e-9],
        )
        .unwrap();
        assert_eq!(histidine.valence_zero(), vec![-1, 0, 1, 2]);
    }

    #[test]
    fn test_rejects_unsorted_valence() {
        let result = Ion::new("x", vec![-1, -2], vec![4.0, 9.0], vec![-30e-9, -40e-9]);
        assert!(matches!(result, Err(IonizeError::InvalidSpecies { .. })));
    }

    #[test]
    fn test_rejects_zero_and_empty_valence() {
        assert!(Ion::new("x", vec![0], vec![4.0], vec![30e-9]).is_err());
        assert!(Ion::new("x", vec![], vec![], vec![]).is_err());
    }

    #[test]
    fn test_rejects_length_mismatch() {
        let result = Ion::new("x", vec![-1], vec![4.0, 5.0], vec![-30e-9]);
        let message = result.unwrap_err().to_string();
        assert!(message.contains("reference_pKa"));
    }

    #[test]
    fn test_rejects_mobility_sign_mismatch() {
        let result = Ion::new("x", vec![-1, 1], vec![9.0, 3.0], vec![-30e-9, -30e-9]);
        assert!(result.unwrap_err().to_string().contains("sign"));
    }

    #[test]
    fn test_rejects_mismatched_enthalpy() {
        let result = phosphate().with_enthalpy(vec![1.0, 2.0]);
        assert!(matches!(result, Err(IonizeError::InvalidSpecies { .. })));
    }

    #[test]
    fn test_record_rejects_fractional_valence() {
        let record = IonRecord {
            valence: vec![-1.5],
            ..IonRecord::from(phosphate())
        };
        let result = Ion::try_from(record);
        assert!(result.unwrap_err().to_string().contains("not an integer"));
    }

    #[test]
    fn test_record_round_trip() {
        let ion = phosphate().with_alias(vec!["phosphate".to_string()]);
        let back = Ion::try_from(IonRecord::from(ion.clone())).unwrap();
        assert_eq!(back, ion);
    }

    #[test]
    fn test_is_named_matches_aliases() {
        let ion = phosphate().with_alias(vec!["Phosphate".to_string()]);
        assert!(ion.is_named("PHOSPHORIC ACID"));
        assert!(ion.is_named("phosphate"));
        assert!(!ion.is_named("sulfate"));
    }

    #[test]
    fn test_hash_consistent_with_equality() {
        let mut set = HashSet::new();
        set.insert(phosphate());
        set.insert(phosphate());
        assert_eq!(set.len(), 1);
        set.insert(phosphate().with_alias(vec!["p".to_string()]));
        assert_eq!(set.len(), 2);
    }
}
