use approx::assert_relative_eq;
use bond_optimiser::core::action::{format_path, ActionKind, InvestmentAction};
use bond_optimiser::core::return_grid::ReturnGrid;
use bond_optimiser::io::csv_loader::{load_return_csv, parse_return_csv, CsvError};
use bond_optimiser::io::results_output::{write_results, OutputFormat, OutputOptions};
use bond_optimiser::optimization::dynamic::{DynamicOptimiser, OptimiserError, OverflowDirection};
use bond_optimiser::optimization::path_count::{count_paths, PathCount};
use std::io::Write;

/// Apply each purchase's return factor in order, skipping waits.
fn replay(grid: &ReturnGrid, path: &[InvestmentAction]) -> f64 {
    path.iter()
        .filter(|a| a.is_buy())
        .map(|a| {
            let row = grid.tenor_row(a.length() as u32).expect("tenor in grid");
            1.0 + grid.return_at(row, a.start_month())
        })
        .product()
}

/// Full pipeline: CSV text → grid → optimiser → rendered CSV rows.
#[test]
fn full_pipeline_from_csv_text() {
    let text = "\
Tenor,0,1,2,3,4,5
6,0.060,0.058,0.061,0.059,0.057,0.060
1,0.004,0.005,0.006,0.004,0.003,0.005
3,0.020,0.018,0.021,0.019,0.022,0.020
";
    let grid = parse_return_csv(text.as_bytes()).unwrap();
    assert_eq!(grid.tenors(), &[1, 3, 6]);

    let results = DynamicOptimiser::optimal_sequences(&grid, 5).unwrap();
    assert_eq!(results.len(), 5);

    // The 6-month bond at month 0 beats every combination of shorter ones.
    assert_eq!(results.paths[0], vec![InvestmentAction::buy(0, 6)]);
    assert_relative_eq!(results.crfs[0], 1.06, epsilon = 1e-12);

    for (crf, path) in results.iter() {
        assert_relative_eq!(crf, replay(&grid, path), max_relative = 1e-12);
    }

    let mut out = Vec::new();
    let options = OutputOptions {
        format: OutputFormat::Csv,
        ..Default::default()
    };
    write_results(&results, &options, &mut out).unwrap();
    let csv = String::from_utf8(out).unwrap();
    assert_eq!(csv.lines().count(), 5);
    assert!(csv.starts_with("1,6.00%,\"b6\"\n"));
    assert!(!csv.ends_with('\n'));
}

#[test]
fn load_from_file() {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(file, "Tenor,0,1,2").unwrap();
    writeln!(file, "1,0.01,0.02,0.00").unwrap();
    file.flush().unwrap();

    let grid = load_return_csv(file.path()).unwrap();
    let results = DynamicOptimiser::optimal_sequences(&grid, 1).unwrap();
    assert_relative_eq!(results.crfs[0], 1.0302, epsilon = 1e-12);
    assert_eq!(format_path(&results.paths[0]), "b1,b1,b1");
}

#[test]
fn load_rejects_spreadsheet() {
    let file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
    assert!(matches!(
        load_return_csv(file.path()),
        Err(CsvError::SpreadsheetExtension(_))
    ));
}

#[test]
fn under_supply_returns_every_strategy() {
    // Tenors {2, 3} over 5 months: 13 strategies in total.
    let grid = ReturnGrid::new(vec![2, 3], 5, vec![
        0.010, 0.011, 0.012, 0.013, 0.014, //
        0.020, 0.021, 0.022, 0.023, 0.024,
    ])
    .unwrap();
    assert_eq!(count_paths(grid.tenors(), grid.num_months()), PathCount::Exact(13));

    let results = DynamicOptimiser::optimal_sequences(&grid, 100).unwrap();
    assert_eq!(results.len(), 13);
    assert!(results.crfs.windows(2).all(|w| w[0] >= w[1]));

    // Every strategy appears exactly once.
    let mut rendered: Vec<String> = results.paths.iter().map(|p| format_path(p)).collect();
    rendered.sort();
    rendered.dedup();
    assert_eq!(rendered.len(), 13);
}

#[test]
fn top_result_matches_exhaustive_best() {
    let grid = ReturnGrid::new(vec![1, 2, 4], 6, vec![
        0.003, 0.004, 0.002, 0.006, 0.001, 0.005, //
        0.009, 0.007, 0.012, 0.008, 0.010, 0.006, //
        0.021, 0.019, 0.020, 0.018, 0.022, 0.017,
    ])
    .unwrap();

    let total = match count_paths(grid.tenors(), grid.num_months()) {
        PathCount::Exact(n) => n as usize,
        PathCount::Approx(_) => unreachable!("small grid"),
    };
    let results = DynamicOptimiser::optimal_sequences(&grid, total).unwrap();
    assert_eq!(results.len(), total);

    // With K covering every strategy, the list is the complete ranking.
    let replayed: Vec<f64> = results.paths.iter().map(|p| replay(&grid, p)).collect();
    let best = replayed.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    assert_relative_eq!(results.crfs[0], best, max_relative = 1e-12);
    let worst = replayed.iter().cloned().fold(f64::INFINITY, f64::min);
    assert_relative_eq!(results.crfs[total - 1], worst, max_relative = 1e-12);
}

#[test]
fn paths_are_compressed_and_span_horizon() {
    let grid = ReturnGrid::new(vec![2, 5], 9, vec![-0.001; 18]).unwrap();
    let results = DynamicOptimiser::optimal_sequences(&grid, 30).unwrap();

    // Negative returns everywhere: doing nothing is best.
    assert_eq!(results.paths[0], vec![InvestmentAction::wait(0, 9)]);
    assert_relative_eq!(results.crfs[0], 1.0);

    for path in &results.paths {
        let mut month = 0;
        for action in path {
            assert_eq!(action.start_month(), month);
            month = action.end_month();
        }
        assert_eq!(month, 9);
        assert!(path
            .windows(2)
            .all(|w| !(w[0].kind() == ActionKind::Wait && w[1].kind() == ActionKind::Wait)));
    }
}

#[test]
fn overflow_aborts_without_results() {
    let grid = ReturnGrid::new(vec![1, 2], 3, vec![
        1e200, 1e200, 1e200, //
        0.0, 0.0, 0.0,
    ])
    .unwrap();
    let err = DynamicOptimiser::optimal_sequences(&grid, 4).unwrap_err();
    assert_eq!(
        err,
        OptimiserError::CrfOverflow {
            month: 2,
            direction: OverflowDirection::Positive
        }
    );
    assert_eq!(
        err.to_string(),
        "return exceeding finite limit (1.798e308) possible by month 2"
    );
}

#[test]
fn repeated_runs_are_identical() {
    let grid = ReturnGrid::new(vec![1, 3], 8, vec![0.01; 16]).unwrap();
    let first = DynamicOptimiser::optimal_sequences(&grid, 40).unwrap();
    let second = DynamicOptimiser::optimal_sequences(&grid, 40).unwrap();
    assert_eq!(first, second);
}

#[test]
fn json_round_trip_of_results() {
    let grid = ReturnGrid::new(vec![1], 2, vec![0.01, 0.02]).unwrap();
    let results = DynamicOptimiser::optimal_sequences(&grid, 4).unwrap();
    let json = serde_json::to_string(&results).unwrap();
    let decoded: bond_optimiser::optimization::dynamic::OptimalResults =
        serde_json::from_str(&json).unwrap();
    assert_eq!(decoded.paths, results.paths);
    for (a, b) in decoded.crfs.iter().zip(&results.crfs) {
        assert_relative_eq!(*a, *b, max_relative = 1e-15);
    }
}
