//! Basic top-K optimisation example.
//!
//! Builds a small return grid by hand, finds the best purchase sequences
//! and prints them alongside the size of the full strategy space.

use bond_optimiser::core::return_grid::ReturnGrid;
use bond_optimiser::optimization::dynamic::DynamicOptimiser;
use bond_optimiser::optimization::path_count::count_paths;

fn main() {
    println!("╔══════════════════════════════════════════════╗");
    println!("║  bond-optimiser: Basic Optimisation Example  ║");
    println!("╚══════════════════════════════════════════════╝\n");

    // --- Scenario 1: a single 1-month bond ---
    println!("━━━ Scenario 1: Rolling a 1-month bond ━━━\n");

    let grid = ReturnGrid::new(vec![1], 3, vec![0.01, 0.02, 0.00]).expect("valid grid");
    let results = DynamicOptimiser::optimal_sequences(&grid, 4).expect("no overflow");
    println!("{}", results);

    // --- Scenario 2: short vs long bonds ---
    println!("━━━ Scenario 2: 1, 3 and 6-month bonds over 6 months ━━━\n");

    let grid = ReturnGrid::new(
        vec![1, 3, 6],
        6,
        vec![
            0.004, 0.005, 0.006, 0.004, 0.003, 0.005, // 1-month
            0.020, 0.018, 0.021, 0.019, 0.022, 0.020, // 3-month
            0.060, 0.058, 0.061, 0.059, 0.057, 0.060, // 6-month
        ],
    )
    .expect("valid grid");

    println!(
        "Strategy space: {}\n",
        count_paths(grid.tenors(), grid.num_months())
    );

    let results = DynamicOptimiser::optimal_sequences(&grid, 5).expect("no overflow");
    println!("{}", results);

    println!("━━━ Top strategy, step by step ━━━\n");
    if let Some((_, path)) = results.iter().next() {
        for action in path {
            println!("  {:#}", action);
        }
    };
}
