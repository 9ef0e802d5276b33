//! This module implements the `EquilibriumSolver`, which finds the self-consistent pH and ionic
//! strength of a composition.
//!
//! The two unknowns are coupled through the activity coefficients: the pH that satisfies charge
//! balance depends on the ionic strength, and the ionic strength depends on how far each species
//! is ionized at that pH. The solver treats this as a one-dimensional fixed point over ionic
//! strength. Each evaluation builds the charge-balance polynomial in the hydronium concentration
//! for the trial ionic strength, takes its positive root, and recomputes the ionic strength from
//! the ionization state at the resulting pH.

use super::options::SolverOptions;
use crate::error::IonizeError;
use crate::ion::Ion;
use crate::math::constants::REFERENCE_TEMPERATURE;
use crate::math::polynomial::Polynomial;
use crate::math::roots;
use crate::solvent::{Aqueous, Solvent};
use crate::types::{EquilibriumState, RootMethod};

/// Ionic strength above which the extended Debye-Hückel model is no longer trusted, in mol/L.
const ACTIVITY_MODEL_LIMIT: f64 = 1.0;

/// The solver for the equilibrium pH and ionic strength of a composition.
///
/// # Examples
///
/// ```
/// use ionize::{EquilibriumSolver, Ion};
///
/// let hcl = Ion::new("hydrochloric acid", vec![-1], vec![-2.0], vec![-79.1e-9]).unwrap();
/// let state = EquilibriumSolver::new(25.0).solve(&[(hcl, 0.01)]).unwrap();
///
/// assert!(state.ph > 2.0 && state.ph < 2.1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquilibriumSolver {
    temperature: f64,
    options: SolverOptions,
}

impl Default for EquilibriumSolver {
    fn default() -> Self {
        Self::new(REFERENCE_TEMPERATURE)
    }
}

impl EquilibriumSolver {
    /// Creates a solver at `temperature` (in degrees Celsius) with default options.
    pub fn new(temperature: f64) -> Self {
        Self {
            temperature,
            options: SolverOptions::default(),
        }
    }

    /// Configures the solver with custom options.
    pub fn with_options(mut self, options: SolverOptions) -> Self {
        self.options = options;
        self
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn options(&self) -> &SolverOptions {
        &self.options
    }

    /// Equilibrates a composition of species and molar concentrations.
    ///
    /// # Errors
    ///
    /// Returns `IonizeError::NoPhRoot` if charge balance cannot be satisfied at some trial ionic
    /// strength, `IonizeError::NotConverged` if neither the bracketed nor the unbracketed search
    /// settles, and `IonizeError::PhysicalInconsistency` if the converged state does not
    /// reproduce its own ionic strength.
    pub fn solve(&self, composition: &[(Ion, f64)]) -> Result<EquilibriumState, IonizeError> {
        if composition.is_empty() {
            return Ok(self.solve_water());
        }

        let residual = |ionic_strength: f64| -> Result<f64, IonizeError> {
            let ph = self.ph_from_ionic_strength(composition, ionic_strength)?;
            Ok(self.ionic_strength_from_ph(composition, ph, ionic_strength) - ionic_strength)
        };

        let seed = {
            let ph = self.ph_from_ionic_strength(composition, 0.0)?;
            self.ionic_strength_from_ph(composition, ph, 0.0)
        };
        let upper = 2.0 * seed;
        let tolerance = self.options.root_tolerance();

        let bracketed = residual(upper)? < 0.0;
        let brent_result = if bracketed {
            match roots::brent(residual, 0.0, upper, tolerance, "ionic strength") {
                Ok(root) => Some(root),
                Err(IonizeError::NotBracketed { .. }) | Err(IonizeError::NotConverged { .. }) => {
                    log::warn!("Bracketed ionic strength search failed; falling back to Newton");
                    None
                }
                Err(e) => return Err(e),
            }
        } else {
            log::warn!(
                "Ionic strength is not bracketed by [0, {upper:.3e}]; falling back to Newton"
            );
            None
        };

        let (root, method) = match brent_result {
            Some(root) => (root, RootMethod::Brent),
            None => (
                roots::newton(residual, seed, tolerance, "ionic strength")?,
                RootMethod::Newton,
            ),
        };

        let ionic_strength = root.value;
        let ph = self.ph_from_ionic_strength(composition, ionic_strength)?;

        if ionic_strength > ACTIVITY_MODEL_LIMIT {
            log::warn!(
                "Ionic strength {ionic_strength:.3} M is beyond the range of the activity model"
            );
        }

        let tracked = self.ionic_strength_from_ph(composition, ph, ionic_strength);
        if !(tracked >= ionic_strength / 2.0) {
            return Err(IonizeError::PhysicalInconsistency {
                tracked,
                total: ionic_strength,
            });
        }

        log::debug!(
            "Equilibrated {} species: pH {ph:.4}, I {ionic_strength:.4e} M after {} iterations ({method})",
            composition.len(),
            root.iterations
        );

        Ok(EquilibriumState {
            ph,
            ionic_strength,
            temperature: self.temperature,
            iterations: root.iterations,
            method,
        })
    }

    fn solve_water(&self) -> EquilibriumState {
        let ph = -Aqueous::dissociation(0.0, self.temperature).sqrt().log10();
        let ionic_strength = self.ionic_strength_from_ph(&[], ph, 0.0);
        EquilibriumState {
            ph,
            ionic_strength,
            temperature: self.temperature,
            iterations: 0,
            method: RootMethod::PureWater,
        }
    }

    /// Builds the charge-balance polynomial in the hydronium concentration at `ionic_strength`.
    ///
    /// Species `i` contributes the polynomial `D_i` whose coefficients are its acidity products
    /// (shifted so the lowest charge state has degree zero) and the charge-weighted polynomial
    /// `P_i`. Clearing denominators from `Σ c_i·P_i/D_i + cH − Kw/cH = 0` gives
    /// `Σ c_i·cH·P_i·Π_{j≠i} D_j + (cH² − Kw)·Π D_j = 0`.
    pub fn charge_balance_polynomial(
        &self,
        composition: &[(Ion, f64)],
        ionic_strength: f64,
    ) -> Polynomial {
        let (denominators, numerators): (Vec<Polynomial>, Vec<Polynomial>) = composition
            .iter()
            .map(|(ion, _)| self.species_polynomials(ion, ionic_strength))
            .unzip();

        let water = Polynomial::new(vec![
            -Aqueous::dissociation(ionic_strength, self.temperature),
            0.0,
            1.0,
        ]);
        let hydronium = Polynomial::new(vec![0.0, 1.0]);

        let product = denominators
            .iter()
            .fold(Polynomial::one(), |acc, d| acc.convolve(d));
        let mut balance = product.convolve(&water);

        for (i, (_, concentration)) in composition.iter().enumerate() {
            let others = denominators
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .fold(Polynomial::one(), |acc, (_, d)| acc.convolve(d));
            let term = numerators[i]
                .convolve(&others)
                .convolve(&hydronium)
                .scale(*concentration);
            balance = &balance + &term;
        }

        balance
    }

    /// Returns the acidity-product polynomial of a species and its charge-weighted counterpart.
    fn species_polynomials(&self, ion: &Ion, ionic_strength: f64) -> (Polynomial, Polynomial) {
        let zeros = ion.valence_zero();
        let lowest = zeros[0];
        let degree = (zeros[zeros.len() - 1] - lowest) as usize;

        let mut plain = vec![0.0; degree + 1];
        let mut weighted = vec![0.0; degree + 1];
        for (l, z) in ion
            .acidity_product(ionic_strength, self.temperature)
            .into_iter()
            .zip(zeros)
        {
            let k = (z - lowest) as usize;
            plain[k] = l;
            weighted[k] = l * f64::from(z);
        }
        (Polynomial::new(plain), Polynomial::new(weighted))
    }

    /// Returns the pH that satisfies charge balance at a fixed ionic strength.
    ///
    /// When several positive roots are found, a warning is logged and the largest is used.
    ///
    /// # Errors
    ///
    /// Returns `IonizeError::NoPhRoot` if the charge-balance polynomial has no positive root.
    pub fn ph_from_ionic_strength(
        &self,
        composition: &[(Ion, f64)],
        ionic_strength: f64,
    ) -> Result<f64, IonizeError> {
        let polynomial = self.charge_balance_polynomial(composition, ionic_strength);
        let roots = polynomial.positive_real_roots(
            self.options.samples_per_decade,
            self.options.polynomial_tolerance(),
        )?;

        let hydronium = select_hydronium(&roots, ionic_strength)?;
        Ok(-(hydronium * Aqueous::activity(1, ionic_strength, self.temperature)).log10())
    }

    /// Returns the ionic strength implied by the ionization state of every species at `ph`.
    ///
    /// Activities are evaluated at `ionic_strength_guess`. Each species contributes half its
    /// concentration times the second moment of its charge distribution, and the solvent
    /// contributes half the sum of the hydronium and hydroxide concentrations.
    pub fn ionic_strength_from_ph(
        &self,
        composition: &[(Ion, f64)],
        ph: f64,
        ionic_strength_guess: f64,
    ) -> f64 {
        let species: f64 = composition
            .iter()
            .map(|(ion, concentration)| {
                concentration * ion.charge(ph, ionic_strength_guess, self.temperature, 2)
            })
            .sum();

        let hydronium =
            10f64.powf(-ph) / Aqueous::activity(1, ionic_strength_guess, self.temperature);
        let hydroxide = Aqueous::dissociation(ionic_strength_guess, self.temperature) / hydronium;

        (species + hydronium + hydroxide) / 2.0
    }
}

/// Picks the hydronium concentration among the ascending positive roots of the charge balance.
///
/// The largest root is taken when several exist.
fn select_hydronium(roots: &[f64], ionic_strength: f64) -> Result<f64, IonizeError> {
    match roots {
        [] => Err(IonizeError::NoPhRoot { ionic_strength }),
        [root] => Ok(*root),
        [.., largest] => {
            log::warn!(
                "Charge balance has {} positive roots at I = {ionic_strength:.3e} M; using the largest",
                roots.len()
            );
            Ok(*largest)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn hcl() -> Ion {
        Ion::new("hydrochloric acid", vec![-1], vec![-2.0], vec![-79.1e-9]).unwrap()
    }

    fn acetic() -> Ion {
        Ion::new("acetic acid", vec![-1], vec![4.756], vec![-42.4e-9]).unwrap()
    }

    fn sodium() -> Ion {
        Ion::new("sodium", vec![1], vec![13.7], vec![51.9e-9]).unwrap()
    }

    fn phosphate() -> Ion {
        Ion::new(
            "phosphoric acid",
            vec![-3, -2, -1],
            vec![12.67, 7.21, 2.16],
            vec![-71.5e-9, -61.5e-9, -35.1e-9],
        )
        .unwrap()
    }

    fn net_charge(solver: &EquilibriumSolver, composition: &[(Ion, f64)], ph: f64, i: f64) -> f64 {
        let hydronium = 10f64.powf(-ph) / Aqueous::activity(1, i, solver.temperature());
        let hydroxide = Aqueous::dissociation(i, solver.temperature()) / hydronium;
        composition
            .iter()
            .map(|(ion, c)| c * ion.charge(ph, i, solver.temperature(), 1))
            .sum::<f64>()
            + hydronium
            - hydroxide
    }

    #[test]
    fn test_pure_water() {
        let state = EquilibriumSolver::new(25.0).solve(&[]).unwrap();
        assert_relative_eq!(state.ph, 7.0, epsilon = 1e-10);
        assert_relative_eq!(state.ionic_strength, 1e-7, max_relative = 1e-6);
        assert_eq!(state.method, RootMethod::PureWater);
    }

    #[test]
    fn test_warm_water_is_more_acidic() {
        let state = EquilibriumSolver::new(50.0).solve(&[]).unwrap();
        assert!(state.ph < 7.0);
    }

    #[test]
    fn test_weak_acid_ph_at_zero_ionic_strength() {
        let solver = EquilibriumSolver::new(25.0);
        let ph = solver.ph_from_ionic_strength(&[(acetic(), 0.1)], 0.0).unwrap();
        assert_relative_eq!(ph, 2.88, epsilon = 0.01);
    }

    #[test]
    fn test_polynomial_root_satisfies_charge_balance() {
        let solver = EquilibriumSolver::new(25.0);
        let composition = vec![(phosphate(), 0.02), (sodium(), 0.03), (acetic(), 0.01)];
        let ph = solver.ph_from_ionic_strength(&composition, 0.02).unwrap();
        let residual = net_charge(&solver, &composition, ph, 0.02);
        assert!(residual.abs() < 1e-10, "residual {residual:e}");
    }

    #[test]
    fn test_strong_acid() {
        let state = EquilibriumSolver::new(25.0).solve(&[(hcl(), 0.01)]).unwrap();
        assert!(state.ph > 2.0 && state.ph < 2.1, "pH {}", state.ph);
        assert_relative_eq!(state.ionic_strength, 0.01, max_relative = 1e-3);
    }

    #[test]
    fn test_strong_base() {
        let state = EquilibriumSolver::new(25.0).solve(&[(sodium(), 0.01)]).unwrap();
        assert!(state.ph > 11.5 && state.ph < 12.5, "pH {}", state.ph);
    }

    #[test]
    fn test_fixed_point_is_self_consistent() {
        let solver = EquilibriumSolver::new(25.0);
        let composition = vec![(phosphate(), 0.05), (sodium(), 0.08)];
        let state = solver.solve(&composition).unwrap();
        let recomputed = solver.ionic_strength_from_ph(&composition, state.ph, state.ionic_strength);
        assert_relative_eq!(recomputed, state.ionic_strength, max_relative = 1e-8);
        assert_eq!(state.method, RootMethod::Brent);
        // Mostly HPO4(2-) and H2PO4(-)
        assert!(state.ph > 6.5 && state.ph < 7.5, "pH {}", state.ph);
    }

    #[test]
    fn test_multiple_roots_choose_largest() {
        assert_eq!(select_hydronium(&[1e-9, 1e-7, 3e-5], 0.01).unwrap(), 3e-5);
        assert_eq!(select_hydronium(&[2e-8], 0.01).unwrap(), 2e-8);
        assert!(matches!(
            select_hydronium(&[], 0.01),
            Err(IonizeError::NoPhRoot { .. })
        ));
    }

    #[test]
    fn test_polynomial_degree_matches_charge_span() {
        let solver = EquilibriumSolver::new(25.0);
        let polynomial = solver.charge_balance_polynomial(&[(phosphate(), 0.01)], 0.0);
        // phosphate spans 4 states (degree 3), times cH² from water
        assert_eq!(polynomial.degree(), Some(5));
    }
}
