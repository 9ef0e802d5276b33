mod common;

use common::{TestCase, run_group_test};
use ionize::{RootMethod, Solution};

#[test]
fn test_strong_electrolytes() {
    let cases = vec![
        TestCase {
            name: "HCl 10 mM",
            species: vec!["hydrochloric acid"],
            concentrations: vec![0.01],
            expected_ph: 2.043,
        },
        TestCase {
            name: "HCl 1 mM",
            species: vec!["hydrochloric acid"],
            concentrations: vec![0.001],
            expected_ph: 3.015,
        },
        TestCase {
            name: "Sodium 1 mM",
            species: vec!["sodium"],
            concentrations: vec![0.001],
            expected_ph: 10.985,
        },
    ];

    run_group_test("Strong Electrolytes", cases, 0.02, 0.05);
}

#[test]
fn test_weak_acids_and_buffers() {
    let cases = vec![
        TestCase {
            name: "Acetic acid 100 mM",
            species: vec!["acetic acid"],
            concentrations: vec![0.1],
            expected_ph: 2.88,
        },
        TestCase {
            name: "Acetic acid 10 mM",
            species: vec!["acetic acid"],
            concentrations: vec![0.01],
            expected_ph: 3.39,
        },
        TestCase {
            name: "Acetate buffer 10/5 mM",
            species: vec!["acetic acid", "sodium"],
            concentrations: vec![0.01, 0.005],
            expected_ph: 4.72,
        },
        TestCase {
            name: "Tris buffer 10/5 mM",
            species: vec!["tris", "hydrochloric acid"],
            concentrations: vec![0.01, 0.005],
            expected_ph: 8.11,
        },
    ];

    run_group_test("Weak Acids and Buffers", cases, 0.02, 0.05);
}

#[test]
fn test_acid_sweep_lowers_ph() {
    let phs: Vec<f64> = (0..=12)
        .map(|step| 0.005 * f64::from(step))
        .map(|acid| {
            Solution::new(["tris", "hydrochloric acid"], &[0.03, acid])
                .unwrap()
                .ph()
        })
        .collect();
    for pair in phs.windows(2) {
        assert!(pair[1] < pair[0], "pH should fall as acid is added: {phs:?}");
    }
}

#[test]
fn test_tris_buffer_state() {
    let buffer = Solution::new(["tris", "hydrochloric acid"], &[0.03, 0.01]).unwrap();
    assert!(buffer.ph() > 7.0 && buffer.ph() < 9.0);
    assert!(buffer.ionic_strength() > 0.009 && buffer.ionic_strength() < 0.011);
    assert_ne!(buffer.state().method, RootMethod::PureWater);
}

#[test]
fn test_pure_water() {
    let water = Solution::water();
    assert_eq!(water.state().method, RootMethod::PureWater);
    assert!((water.ph() - 7.0).abs() < 0.01);

    let warm = water.with_temperature(50.0).unwrap();
    assert!(warm.ph() < water.ph());
}
