//! This module defines the physical and empirical constants used throughout the ionize library.
//!
//! Fundamental constants are given in SI units. Concentrations elsewhere in the library are
//! molar (mol/L), so `LITERS_PER_CUBIC_METER` appears wherever the two systems meet.

/// Faraday's constant in C/mol.
pub const FARADAY: f64 = 96_485.3415;

/// Universal gas constant in J/(mol·K).
pub const GAS_CONSTANT: f64 = 8.31;

/// Boltzmann's constant in J/K.
pub const BOLTZMANN: f64 = 1.380_649e-23;

/// Elementary charge in C.
pub const ELEMENTARY_CHARGE: f64 = 1.602_176_634e-19;

/// Avogadro's number in 1/mol.
pub const AVOGADRO: f64 = 6.022_140_76e23;

/// Vacuum permittivity in F/m.
pub const VACUUM_PERMITTIVITY: f64 = 8.854_187_812_8e-12;

/// Liters per cubic meter.
pub const LITERS_PER_CUBIC_METER: f64 = 1000.0;

/// Offset between the Celsius and Kelvin scales.
pub const KELVIN_OFFSET: f64 = 273.15;

/// Reference temperature of tabulated species data, in degrees Celsius.
pub const REFERENCE_TEMPERATURE: f64 = 25.0;

/// Linear (salting-out) coefficient of the extended Debye-Hückel activity model, in L/mol.
pub const ACTIVITY_LINEAR_COEFFICIENT: f64 = 0.1;

/// Ion-size parameter of the extended Debye-Hückel model, in (L/mol)^(1/2).
///
/// Also used as the denominator coefficient of the Robinson-Stokes and
/// Onsager-Fuoss mobility corrections.
pub const PITTS: f64 = 1.5;

/// Relaxation coefficient of the Robinson-Stokes correction at the reference state.
pub const ROBINSON_STOKES_A: f64 = 0.2297;

/// Electrophoretic coefficient of the Robinson-Stokes and Onsager-Fuoss corrections at the
/// reference state, in m²/(V·s)·(L/mol)^(1/2).
pub const ELECTROPHORETIC_B: f64 = 31.410e-9;

/// Relaxation coefficient of the Onsager-Fuoss correction at the reference state.
pub const ONSAGER_FUOSS_A: f64 = 0.78420;

/// Coefficients of the Onsager-Fuoss series expansion of the relaxation effect.
pub const ONSAGER_FUOSS_SERIES: [f64; 6] = [0.2929, -0.3536, 0.0884, -0.0442, 0.0276, -0.0193];

/// Scale converting a Nightingale fit value into an absolute mobility, in Pa·m²/(V).
pub const NIGHTINGALE_SCALE: f64 = 10.35e-11;

/// Typical partial pressure of atmospheric CO₂, in bar.
pub const ATMOSPHERIC_CO2: f64 = 3.9e-4;

/// Converts a temperature in degrees Celsius to Kelvin.
#[inline]
pub fn kelvin(celsius: f64) -> f64 {
    celsius + KELVIN_OFFSET
}
