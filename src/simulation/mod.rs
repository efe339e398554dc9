pub mod random_grid;
