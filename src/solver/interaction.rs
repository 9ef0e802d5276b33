//! This module implements the Onsager-Fuoss correction of ionic mobilities.
//!
//! Unlike the Robinson-Stokes estimate, which only sees a generic ionic strength, the
//! Onsager-Fuoss treatment couples every charge state of every ion in the solution through the
//! relaxation of their shared ionic atmosphere. The coupling is expressed as a matrix over all
//! charge states present (including hydronium and hydroxide), and the relaxation factor of each
//! state is a truncated series in powers of that matrix.

use crate::error::IonizeError;
use crate::ion::{self, Ion};
use crate::math::constants::{FARADAY, ONSAGER_FUOSS_SERIES};
use crate::solvent::{Aqueous, Solvent};
use crate::types::EquilibriumState;
use faer::{Col, Mat};

/// Onsager-Fuoss mobilities of every charge state in a solution.
#[derive(Debug, Clone, PartialEq)]
pub struct Interaction {
    /// Corrected mobilities of each species, in composition order.
    pub species: Vec<Vec<f64>>,
    /// Corrected mobility of hydronium.
    pub hydronium: Vec<f64>,
    /// Corrected mobility of hydroxide.
    pub hydroxide: Vec<f64>,
}

/// Computes the Onsager-Fuoss mobilities of a composition at its equilibrium state.
///
/// # Errors
///
/// Returns `IonizeError::ImmobileSpecies` if any charge state has zero mobility, since the
/// relaxation series diverges in that case.
pub fn interaction(
    composition: &[(Ion, f64)],
    state: &EquilibriumState,
) -> Result<Interaction, IonizeError> {
    let entries = participants(composition, state, None);
    let mut mobilities = corrected_mobilities(&entries, state)?;

    let hydroxide = mobilities.pop().unwrap_or_default();
    let hydronium = mobilities.pop().unwrap_or_default();
    Ok(Interaction {
        species: mobilities,
        hydronium,
        hydroxide,
    })
}

/// Computes the Onsager-Fuoss mobility of `ion` as a trace species in a composition.
///
/// If `ion` is already part of the composition its regular entry is used; otherwise it joins
/// the interaction at zero concentration, so it feels the atmosphere without shaping it.
pub fn interaction_of(
    ion: &Ion,
    composition: &[(Ion, f64)],
    state: &EquilibriumState,
) -> Result<Vec<f64>, IonizeError> {
    let entries = participants(composition, state, Some(ion));
    let index = entries
        .iter()
        .position(|(candidate, _)| *candidate == ion)
        .unwrap_or(entries.len() - 1);
    let mut mobilities = corrected_mobilities(&entries, state)?;
    Ok(mobilities.swap_remove(index))
}

/// Lists the species that take part in the interaction with their concentrations.
///
/// Hydronium and hydroxide always follow the composition; a trace ion, if any, comes last.
fn participants<'a>(
    composition: &'a [(Ion, f64)],
    state: &EquilibriumState,
    trace: Option<&'a Ion>,
) -> Vec<(&'a Ion, f64)> {
    let hydronium_concentration =
        10f64.powf(-state.ph) / Aqueous::activity(1, state.ionic_strength, state.temperature);
    let hydroxide_concentration =
        Aqueous::dissociation(state.ionic_strength, state.temperature) / hydronium_concentration;

    let mut entries: Vec<(&Ion, f64)> = composition
        .iter()
        .filter(|(_, concentration)| *concentration > 0.0)
        .map(|(ion, concentration)| (ion, *concentration))
        .collect();
    entries.push((ion::hydronium(), hydronium_concentration));
    entries.push((ion::hydroxide(), hydroxide_concentration));

    if let Some(trace) = trace {
        if !entries.iter().any(|(ion, _)| *ion == trace) {
            entries.push((trace, 0.0));
        }
    }
    entries
}

fn corrected_mobilities(
    entries: &[(&Ion, f64)],
    state: &EquilibriumState,
) -> Result<Vec<Vec<f64>>, IonizeError> {
    let factors = relaxation_factors(entries, state)?;

    let mut offset = 0;
    Ok(entries
        .iter()
        .map(|(ion, _)| {
            let n = ion.valence().len();
            let mobility = ion.onsager_fuoss_mobility(
                state.ionic_strength,
                state.temperature,
                &factors[offset..offset + n],
            );
            offset += n;
            mobility
        })
        .collect())
}

/// Returns the relaxation factor of every charge state of every entry, flattened in order.
fn relaxation_factors(
    entries: &[(&Ion, f64)],
    state: &EquilibriumState,
) -> Result<Vec<f64>, IonizeError> {
    let mut omega = Vec::new();
    let mut valence = Vec::new();
    let mut potential = Vec::new();

    for (ion, concentration) in entries {
        let absolute = ion.absolute_mobility(state.temperature);
        let fractions = ion.ionization_fraction(state.ph, state.ionic_strength, state.temperature);
        for ((&z, mobility), fraction) in ion.valence().iter().zip(&absolute).zip(&fractions) {
            let z = f64::from(z);
            let w = mobility / z / FARADAY;
            if w == 0.0 {
                return Err(IonizeError::ImmobileSpecies(ion.name().to_string()));
            }
            omega.push(w);
            valence.push(z);
            potential.push(concentration * fraction * z * z / (2.0 * state.ionic_strength));
        }
    }

    let n = omega.len();
    let mut h = Mat::<f64>::zeros(n, n);
    for i in 0..n {
        for j in 0..n {
            let total = omega[i] + omega[j];
            h[(i, j)] = if total == 0.0 {
                potential[j] / 2.0
            } else {
                potential[j] * omega[j] / total
            };
        }
    }

    let row_sums: Vec<f64> = (0..n).map(|i| (0..n).map(|j| h[(i, j)]).sum()).collect();
    let b = Mat::<f64>::from_fn(n, n, |i, j| {
        let diagonal = if i == j { row_sums[i] } else { 0.0 };
        let identity = if i == j { 1.0 } else { 0.0 };
        2.0 * (h[(i, j)] + diagonal) - identity
    });

    let mobility_weight: f64 = (0..n).map(|i| potential[i] / omega[i]).sum();
    let charge_weight: f64 = (0..n).map(|i| valence[i] * potential[i]).sum();
    let mut r = Col::<f64>::from_fn(n, |i| {
        valence[i] - charge_weight / mobility_weight / omega[i]
    });

    let mut factor = vec![0.0; n];
    for (k, &coefficient) in ONSAGER_FUOSS_SERIES.iter().enumerate() {
        if k > 0 {
            r = &b * &r;
        }
        for (i, f) in factor.iter_mut().enumerate() {
            *f += coefficient * r[i];
        }
    }

    Ok(factor)
}
