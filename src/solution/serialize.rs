use super::Solution;
use crate::error::IonizeError;
use crate::ion::{Ion, IonRecord};
use crate::math::constants::REFERENCE_TEMPERATURE;
use crate::solver::SolverOptions;
use serde::{Deserialize, Serialize};

const SOLUTION_TAG: &str = "Solution";

/// The serializable form of a solution: its composition and temperature.
///
/// The equilibrium state is not stored. Deserializing re-equilibrates the solution with default
/// solver options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionRecord {
    #[serde(rename = "__solution__", default = "default_solution_tag")]
    pub tag: String,
    pub ions: Vec<Ion>,
    pub concentrations: Vec<f64>,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

fn default_solution_tag() -> String {
    SOLUTION_TAG.to_string()
}

fn default_temperature() -> f64 {
    REFERENCE_TEMPERATURE
}

impl From<Solution> for SolutionRecord {
    fn from(solution: Solution) -> Self {
        let temperature = solution.temperature();
        let (ions, concentrations): (Vec<Ion>, Vec<f64>) =
            solution.composition.into_iter().unzip();
        Self {
            tag: default_solution_tag(),
            ions,
            concentrations,
            temperature,
        }
    }
}

impl TryFrom<SolutionRecord> for Solution {
    type Error = IonizeError;

    fn try_from(record: SolutionRecord) -> Result<Self, Self::Error> {
        if record.tag != SOLUTION_TAG {
            return Err(IonizeError::InvalidSpecies {
                name: record.tag,
                reason: "not a serialized solution".to_string(),
            });
        }
        if record.ions.len() != record.concentrations.len() {
            return Err(IonizeError::LengthMismatch {
                species: record.ions.len(),
                concentrations: record.concentrations.len(),
            });
        }
        let composition = record.ions.into_iter().zip(record.concentrations).collect();
        Solution::from_composition(composition, record.temperature, SolverOptions::default())
    }
}

impl Ion {
    /// Serializes the ion to JSON.
    ///
    /// # Examples
    ///
    /// ```
    /// use ionize::Ion;
    ///
    /// let tris = Ion::new("tris", vec![1], vec![8.076], vec![29.5e-9]).unwrap();
    /// let json = tris.to_json().unwrap();
    /// assert!(json.contains("\"__ion__\":\"Ion\""));
    /// assert_eq!(Ion::from_json(&json).unwrap(), tris);
    /// ```
    pub fn to_json(&self) -> Result<String, IonizeError> {
        serde_json::to_string(self).map_err(IonizeError::from)
    }

    /// Parses and validates an ion from JSON.
    ///
    /// # Errors
    ///
    /// Returns `IonizeError::JsonError` if the text is not an ion record, or
    /// `IonizeError::InvalidSpecies` if the record describes an invalid ion.
    pub fn from_json(json: &str) -> Result<Self, IonizeError> {
        let record: IonRecord = serde_json::from_str(json)?;
        Ion::try_from(record)
    }
}

impl Solution {
    /// Serializes the composition and temperature of the solution to JSON.
    pub fn to_json(&self) -> Result<String, IonizeError> {
        serde_json::to_string(self).map_err(IonizeError::from)
    }

    /// Parses a solution from JSON and equilibrates it.
    pub fn from_json(json: &str) -> Result<Self, IonizeError> {
        serde_json::from_str(json).map_err(IonizeError::from)
    }
}
