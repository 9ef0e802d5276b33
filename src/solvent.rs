//! This module describes the background solvent as pure functions of temperature and ionic strength.
//!
//! The `Solvent` trait supplies the correlations every other component relies on: dielectric
//! constant, viscosity, the solvent's own dissociation constant, the Debye-Hückel constant and
//! the extended Debye-Hückel activity coefficients. Implementors only provide the empirical
//! correlations and the thermodynamic data of self-dissociation; everything else is derived.
//!
//! None of these functions validate their inputs. Temperatures far outside the liquid range
//! produce finite but physically meaningless values.

use crate::math::constants::{
    ACTIVITY_LINEAR_COEFFICIENT, AVOGADRO, BOLTZMANN, ELEMENTARY_CHARGE, GAS_CONSTANT,
    LITERS_PER_CUBIC_METER, PITTS, REFERENCE_TEMPERATURE, VACUUM_PERMITTIVITY, kelvin,
};
use std::f64::consts::{LN_10, PI};

/// A solvent whose properties are stateless functions of temperature (in degrees Celsius).
pub trait Solvent {
    /// Self-dissociation constant at the reference temperature, in mol²/L².
    const REFERENCE_DISSOCIATION: f64;
    /// Enthalpy of self-dissociation, in J/mol.
    const ENTHALPY: f64;
    /// Heat capacity of self-dissociation, in J/(mol·K).
    const HEAT_CAPACITY: f64;

    /// Relative permittivity at `temperature`.
    fn dielectric(temperature: f64) -> f64;

    /// Dynamic viscosity at `temperature`, in Pa·s.
    fn viscosity(temperature: f64) -> f64;

    /// The reference pKs of self-dissociation.
    fn reference_pks() -> f64 {
        -Self::REFERENCE_DISSOCIATION.log10()
    }

    /// Returns the self-dissociation constant corrected for temperature and ionic strength.
    ///
    /// The reference value is extrapolated to `temperature` with the Clark-Glew expansion, then
    /// divided by the square of the activity coefficient of a monovalent ion, which turns the
    /// thermodynamic constant into a concentration product.
    fn dissociation(ionic_strength: f64, temperature: f64) -> f64 {
        let dissociation = if temperature == REFERENCE_TEMPERATURE {
            Self::REFERENCE_DISSOCIATION
        } else {
            let t_ref = kelvin(REFERENCE_TEMPERATURE);
            let t = kelvin(temperature);
            let enthalpy_term = Self::ENTHALPY / (LN_10 * GAS_CONSTANT) * (1.0 / t_ref - 1.0 / t);
            let heat_capacity_term = Self::HEAT_CAPACITY / (LN_10 * GAS_CONSTANT)
                * (t_ref / t - 1.0 + (t / t_ref).ln());
            10f64.powf(-(Self::reference_pks() - enthalpy_term - heat_capacity_term))
        };

        dissociation / Self::activity(1, ionic_strength, temperature).powi(2)
    }

    /// The effective pKs at the given conditions.
    fn pks(ionic_strength: f64, temperature: f64) -> f64 {
        -Self::dissociation(ionic_strength, temperature).log10()
    }

    /// Returns the Debye-Hückel constant A, in (L/mol)^(1/2).
    fn debye_huckel(temperature: f64) -> f64 {
        let dh = ELEMENTARY_CHARGE.powi(3) * AVOGADRO.sqrt()
            / 2f64.powf(2.5)
            / PI
            / (Self::dielectric(temperature) * VACUUM_PERMITTIVITY * BOLTZMANN * kelvin(temperature))
                .powf(1.5);

        // base-10 logarithm, cubic meters to liters
        dh / LN_10 * LITERS_PER_CUBIC_METER.sqrt()
    }

    /// Returns the activity coefficient of a charge state.
    ///
    /// `gamma = 10^(z² (B·I − A·√I / (1 + a·√I)))`, the extended Debye-Hückel form.
    fn activity(valence: i32, ionic_strength: f64, temperature: f64) -> f64 {
        let sqrt_i = ionic_strength.sqrt();
        let a = Self::debye_huckel(temperature) * sqrt_i / (1.0 + PITTS * sqrt_i);
        let b = ACTIVITY_LINEAR_COEFFICIENT * ionic_strength;
        10f64.powf(f64::from(valence * valence) * (b - a))
    }

    /// Returns the activity coefficients of several charge states at once.
    fn activities(valences: &[i32], ionic_strength: f64, temperature: f64) -> Vec<f64> {
        valences
            .iter()
            .map(|&z| Self::activity(z, ionic_strength, temperature))
            .collect()
    }

    /// Returns the Bjerrum length, in meters.
    fn bjerrum_length(temperature: f64) -> f64 {
        ELEMENTARY_CHARGE.powi(2)
            / (4.0
                * PI
                * Self::dielectric(temperature)
                * VACUUM_PERMITTIVITY
                * BOLTZMANN
                * kelvin(temperature))
    }

    /// Returns the Debye screening length at the given ionic strength, in meters.
    fn debye_length(ionic_strength: f64, temperature: f64) -> f64 {
        (Self::dielectric(temperature) * VACUUM_PERMITTIVITY * BOLTZMANN * kelvin(temperature)
            / ELEMENTARY_CHARGE.powi(2)
            / (2.0 * ionic_strength * LITERS_PER_CUBIC_METER)
            / AVOGADRO)
            .sqrt()
    }
}

/// Water, the only solvent the library models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Aqueous;

impl Aqueous {
    /// Returns the Henry's law constant of CO₂, in mol/(L·bar).
    pub fn henry_co2(temperature: f64) -> f64 {
        let t = kelvin(temperature);
        let t_ref = kelvin(REFERENCE_TEMPERATURE);
        0.034 * (2400.0 * (1.0 / t - 1.0 / t_ref)).exp()
    }
}

impl Solvent for Aqueous {
    const REFERENCE_DISSOCIATION: f64 = 1e-14;
    const ENTHALPY: f64 = 55_815.0;
    const HEAT_CAPACITY: f64 = -224.0;

    /// Quadratic correlation from the CRC handbook.
    fn dielectric(temperature: f64) -> f64 {
        let t = kelvin(temperature);
        249.21 - 0.790_69 * t + 0.729_97e-3 * t * t
    }

    /// Correlation from Fox and McDonald's Introduction to Fluid Mechanics.
    fn viscosity(temperature: f64) -> f64 {
        let t = kelvin(temperature);
        2.414e-5 * 10f64.powf(247.8 / (t - 140.0))
    }
}
