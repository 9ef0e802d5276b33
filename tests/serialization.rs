use ionize::{Database, Ion, NightingaleData, Solution, default_database};
use std::collections::HashSet;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_ion_json_keeps_optional_data() {
    let ion = Ion::new("custom", vec![-2, -1], vec![9.0, 4.0], vec![-50e-9, -30e-9])
        .unwrap()
        .with_enthalpy(vec![1000.0, 2000.0])
        .unwrap()
        .with_nightingale(NightingaleData {
            fit: vec![0.0, 0.5, 20.0],
            min: 5.0,
            max: 90.0,
        })
        .unwrap()
        .with_alias(vec!["thing".to_string()]);

    let json = ion.to_json().unwrap();
    assert!(json.contains("\"reference_pKa\""));
    assert!(json.contains("\"nightingale_data\""));
    assert!(!json.contains("\"heat_capacity\""));
    assert_eq!(Ion::from_json(&json).unwrap(), ion);
}

#[test]
fn test_database_ions_survive_json() {
    let database = default_database();
    for name in database.names() {
        let ion = database.load(name).unwrap();
        assert_eq!(Ion::from_json(&ion.to_json().unwrap()).unwrap(), ion);
    }
}

#[test]
fn test_solution_json_and_hashing() {
    let a = Solution::new(["tris", "hydrochloric acid"], &[0.03, 0.01]).unwrap();
    let b = Solution::from_json(&a.to_json().unwrap()).unwrap();
    let c = a.with_temperature(30.0).unwrap();

    let set: HashSet<Solution> = [a.clone(), b, c].into_iter().collect();
    assert_eq!(set.len(), 2);
    assert!(set.contains(&a));
}

#[test]
fn test_custom_database_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
        [ions."Weak Base"]
        valence = [1]
        reference_pKa = [9.0]
        reference_mobility = [30e-9]
        alias = ["wb"]
        "#
    )
    .unwrap();

    let database = Database::load_from_file(file.path()).unwrap();
    let ion = database.load("WB").unwrap();
    assert_eq!(ion.name(), "weak base");

    let solution = Solution::new([ion], &[0.01]).unwrap();
    assert!(solution.ph() > 7.0);
}
