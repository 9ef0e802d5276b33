use approx::assert_relative_eq;
use ionize::{Ion, Solution};

fn potassium_chloride(concentration: f64) -> Solution {
    Solution::new(["potassium", "hydrochloric acid"], &[concentration, concentration]).unwrap()
}

#[test]
fn test_onsager_fuoss_approaches_infinite_dilution() {
    let mut previous_ratio = 0.0;
    for concentration in [1e-3, 1e-4, 1e-5, 1e-6] {
        let solution = potassium_chloride(concentration);
        let potassium = solution.ion("potassium").unwrap();
        let absolute = potassium.absolute_mobility()[0];
        let actual = potassium.actual_mobility()[0];
        let ratio = actual / absolute;
        assert!(ratio > 0.0 && ratio < 1.0, "ratio {ratio} at {concentration} M");
        assert!(ratio > previous_ratio, "correction should shrink with dilution");
        previous_ratio = ratio;
    }
    assert!(previous_ratio > 0.99);
}

#[test]
fn test_onsager_fuoss_stays_close_to_robinson_stokes() {
    let fast = Solution::new(["potassium", "hydrochloric acid"], &[0.01, 0.01]).unwrap();
    let slow = Solution::new(["potassium", "acetic acid"], &[0.01, 0.01]).unwrap();
    for solution in [&fast, &slow] {
        let potassium = solution.ion("potassium").unwrap();
        let rs = potassium.robinson_stokes_mobility()[0];
        let of = potassium.actual_mobility()[0];
        assert_relative_eq!(of, rs, max_relative = 0.05);
    }
}

#[test]
fn test_ionization_fractions_sum_to_one() {
    let solution = Solution::new(["phosphoric acid", "sodium"], &[0.05, 0.08]).unwrap();
    for name in ["phosphoric acid", "sodium", "glycine", "citric acid"] {
        let ion = solution.ion(name).unwrap();
        let total: f64 = ion.ionization_fraction().iter().sum::<f64>() + ion.neutral_fraction();
        assert_relative_eq!(total, 1.0, epsilon = 1e-12);
    }
}

#[test]
fn test_effective_mobility_follows_ionization() {
    let acidic = Solution::new(["hydrochloric acid"], &[0.001]).unwrap();
    let basic = Solution::new(["sodium"], &[0.001]).unwrap();
    let acetate = |solution: &Solution| solution.ion("acetic acid").unwrap().mobility();
    // Acetic acid is neutral at pH 3 and fully ionized at pH 11.
    assert!(acetate(&acidic).abs() < 0.1 * acetate(&basic).abs());
    assert!(acetate(&basic) < 0.0);
}

#[test]
fn test_trace_ion_definition_overrides_name() {
    let solution = potassium_chloride(0.01);
    let custom = Ion::new("potassium", vec![1], vec![14.0], vec![50e-9]).unwrap();
    let bound = solution.ion(&custom).unwrap();
    assert!(bound.is_trace());
    assert!(bound.mobility() < 50e-9);
}
