pub mod action;
pub mod return_grid;
