//! bond-optimiser CLI
//!
//! Find the best bond purchase sequences from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Top 10 strategies from a CSV grid
//! bond-optimiser optimise --input returns.csv --results 10
//!
//! # Export as CSV next to the data
//! bond-optimiser optimise --input returns.csv --results 100 --format csv --output-dir .
//!
//! # How many strategies exist at all
//! bond-optimiser count --input returns.csv
//!
//! # Generate a random grid for testing
//! bond-optimiser generate --tenors 1,3,6,12 --months 36 --seed 7
//! ```

use bond_optimiser::core::return_grid::ReturnGrid;
use bond_optimiser::io::csv_loader::{load_return_csv, write_return_csv};
use bond_optimiser::io::results_output::{
    export_results, next_output_path, write_results, OutputOptions,
};
use bond_optimiser::optimization::dynamic::DynamicOptimiser;
use bond_optimiser::optimization::path_count::count_paths;
use bond_optimiser::simulation::random_grid::{generate_random_grid, GridConfig};
use log::warn;
use std::fs;
use std::path::PathBuf;
use std::process;

/// Requests above this size get a memory warning before running.
const LARGE_RESULT_COUNT: usize = 10_000_000;

fn print_usage() {
    eprintln!(
        r#"bond-optimiser — top-K bond purchase sequence optimisation

USAGE:
    bond-optimiser <COMMAND> [OPTIONS]

COMMANDS:
    optimise    Find the best buy/wait strategies for a return grid
    count       Count every possible strategy for a return grid
    generate    Generate a random return grid (for testing)
    help        Show this message

OPTIONS (optimise):
    --input <FILE>        Path to CSV return grid (.csv or .txt)
    --results <K>         Number of results to find (default: 10)
    --format <FORMAT>     Output format: text (default), json or csv
    --output <FILE>       Write to file instead of stdout
    --output-dir <DIR>    Write to the next free results file in DIR
    --limit <N>           Render only the best N of the results found
    --verbose             Spell out each action (text format)

OPTIONS (count):
    --input <FILE>        Path to CSV return grid

OPTIONS (generate):
    --tenors <LIST>       Comma-separated tenors in months (default: 1,3,6,12)
    --months <N>          Number of months (default: 24)
    --seed <N>            Seed for reproducible output
    --output <FILE>       Write to file instead of stdout

ENVIRONMENT:
    RUST_LOG              Log level filter (e.g. info, debug)

EXAMPLES:
    bond-optimiser optimise --input returns.csv --results 5
    bond-optimiser optimise --input returns.csv --results 100 --format csv --output top100.csv
    bond-optimiser optimise --input returns.csv --results 1000 --limit 20 --verbose
    bond-optimiser count --input returns.csv
    bond-optimiser generate --tenors 1,3,6 --months 12 --output returns.csv"#
    );
}

fn load_grid(path: &str) -> ReturnGrid {
    load_return_csv(path).unwrap_or_else(|e| {
        eprintln!("Error loading '{}': {}", path, e);
        eprintln!("Expected format:");
        eprintln!("Tenor,0,1,2\n1,0.010,0.012,0.011\n3,0.031,0.030,0.032");
        process::exit(1);
    })
}

fn required_value(args: &[String], i: usize, flag: &str, what: &str) -> String {
    args.get(i).cloned().unwrap_or_else(|| {
        eprintln!("{} requires {}", flag, what);
        process::exit(1);
    })
}

fn cmd_optimise(args: &[String]) {
    let mut input_path = None;
    let mut requested: i64 = 10;
    let mut options = OutputOptions::default();
    let mut output_path: Option<PathBuf> = None;
    let mut output_dir: Option<PathBuf> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                i += 1;
                input_path = Some(required_value(args, i, "--input", "a file path"));
            }
            "--results" => {
                i += 1;
                requested = required_value(args, i, "--results", "a number")
                    .parse()
                    .unwrap_or_else(|_| {
                        eprintln!("--results requires a whole number");
                        process::exit(1);
                    });
            }
            "--format" => {
                i += 1;
                options.format = required_value(args, i, "--format", "'text', 'json' or 'csv'")
                    .parse()
                    .unwrap_or_else(|e| {
                        eprintln!("{}", e);
                        process::exit(1);
                    });
            }
            "--output" => {
                i += 1;
                output_path = Some(required_value(args, i, "--output", "a file path").into());
            }
            "--output-dir" => {
                i += 1;
                output_dir = Some(required_value(args, i, "--output-dir", "a directory").into());
            }
            "--limit" => {
                i += 1;
                options.limit = Some(required_value(args, i, "--limit", "a number").parse().unwrap_or_else(
                    |_| {
                        eprintln!("--limit requires a whole number");
                        process::exit(1);
                    },
                ));
            }
            "--verbose" => options.verbose = true,
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let path = input_path.unwrap_or_else(|| {
        eprintln!("Error: --input <FILE> is required");
        process::exit(1);
    });

    let k = DynamicOptimiser::requested_results(requested).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(1);
    });

    let grid = load_grid(&path);
    let strategies = count_paths(grid.tenors(), grid.num_months());
    if !strategies.covers(k) {
        eprintln!(
            "Only {} strategies exist for this data ({} requested)",
            strategies, k
        );
    } else if k > LARGE_RESULT_COUNT {
        warn!("{} results requested, this may use a lot of memory", k);
    }

    let results = DynamicOptimiser::optimal_sequences(&grid, k).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(1);
    });

    if let Some(dir) = output_dir {
        output_path = Some(next_output_path(&dir, options.format).unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            process::exit(1);
        }));
    }

    match output_path {
        Some(out) => {
            export_results(&results, &options, &out).unwrap_or_else(|e| {
                eprintln!("Error writing to '{}': {}", out.display(), e);
                process::exit(1);
            });
            eprintln!("Export complete, saved to: {}", out.display());
        }
        None => {
            let stdout = std::io::stdout();
            write_results(&results, &options, stdout.lock()).unwrap_or_else(|e| {
                eprintln!("Error: {}", e);
                process::exit(1);
            });
        }
    }
}

fn cmd_count(args: &[String]) {
    let mut input_path = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                i += 1;
                input_path = Some(required_value(args, i, "--input", "a file path"));
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let path = input_path.unwrap_or_else(|| {
        eprintln!("Error: --input <FILE> is required");
        process::exit(1);
    });

    let grid = load_grid(&path);
    println!("Tenors:     {:?}", grid.tenors());
    println!("Months:     {}", grid.num_months());
    println!("Strategies: {}", count_paths(grid.tenors(), grid.num_months()));
}

fn cmd_generate(args: &[String]) {
    let mut config = GridConfig::default();
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--tenors" => {
                i += 1;
                config.tenors = required_value(args, i, "--tenors", "a comma-separated list")
                    .split(',')
                    .map(|s| s.trim().parse::<u32>())
                    .collect::<Result<_, _>>()
                    .unwrap_or_else(|_| {
                        eprintln!("--tenors requires positive whole numbers");
                        process::exit(1);
                    });
            }
            "--months" => {
                i += 1;
                config.num_months = required_value(args, i, "--months", "a number")
                    .parse()
                    .unwrap_or_else(|_| {
                        eprintln!("--months requires a number");
                        process::exit(1);
                    });
            }
            "--seed" => {
                i += 1;
                config.seed = Some(required_value(args, i, "--seed", "a number").parse().unwrap_or_else(
                    |_| {
                        eprintln!("--seed requires a number");
                        process::exit(1);
                    },
                ));
            }
            "--output" => {
                i += 1;
                output_path = Some(required_value(args, i, "--output", "a file path"));
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let grid = generate_random_grid(&config).unwrap_or_else(|e| {
        eprintln!("Error generating grid: {}", e);
        process::exit(1);
    });

    let mut buffer = Vec::new();
    write_return_csv(&grid, &mut buffer).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(1);
    });

    if let Some(path) = output_path {
        fs::write(&path, &buffer).unwrap_or_else(|e| {
            eprintln!("Error writing to '{}': {}", path, e);
            process::exit(1);
        });
        eprintln!(
            "Generated {} tenors x {} months → {}",
            grid.num_tenors(),
            grid.num_months(),
            path
        );
    } else {
        print!("{}", String::from_utf8_lossy(&buffer));
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "optimise" | "optimize" => cmd_optimise(rest),
        "count" => cmd_count(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
