use ionize::Solution;

pub struct TestCase<'a> {
    pub name: &'a str,
    pub species: Vec<&'a str>,
    pub concentrations: Vec<f64>,
    pub expected_ph: f64,
}

pub fn run_group_test(
    group_name: &str,
    cases: Vec<TestCase>,
    group_avg_limit: f64,
    group_max_limit: f64,
) {
    let mut group_total_error = 0.0;
    let mut group_max_error = 0.0;
    let mut total_data_points = 0;

    println!("\nRunning Group Test: {}", group_name);
    println!("{:-<80}", "");
    println!(
        "{:<30} | {:<10} | {:<10} | {:<10}",
        "Solution", "Expected", "Calculated", "I (M)"
    );

    for case in cases {
        let solution = Solution::new(case.species.clone(), &case.concentrations)
            .expect("Equilibrium failed");
        let error = (solution.ph() - case.expected_ph).abs();

        println!(
            "{:<30} | {:<10.4} | {:<10.4} | {:<10.3e} (Err: {:.4})",
            case.name,
            case.expected_ph,
            solution.ph(),
            solution.ionic_strength(),
            error
        );

        group_total_error += error;
        if error > group_max_error {
            group_max_error = error;
        }
        total_data_points += 1;
    }

    let group_avg_error = if total_data_points > 0 {
        group_total_error / total_data_points as f64
    } else {
        0.0
    };

    println!("{:-<80}", "");
    println!("Group Statistics for '{}':", group_name);
    println!("  Total Data Points: {}", total_data_points);
    println!(
        "  Group Avg Error:   {:.4} (Limit: {:.4})",
        group_avg_error, group_avg_limit
    );
    println!(
        "  Group Max Error:   {:.4} (Limit: {:.4})",
        group_max_error, group_max_limit
    );
    println!("{:-<80}\n", "");

    assert!(
        group_avg_error <= group_avg_limit,
        "Group average error {:.4} exceeds limit {:.4}",
        group_avg_error,
        group_avg_limit
    );

    assert!(
        group_max_error <= group_max_limit,
        "Group maximum error {:.4} exceeds limit {:.4}",
        group_max_error,
        group_max_limit
    );
}
