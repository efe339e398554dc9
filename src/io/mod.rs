pub mod csv_loader;
pub mod results_output;
