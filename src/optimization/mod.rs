pub mod dynamic;
pub mod frontier;
pub mod history;
pub mod matrix;
pub mod path_count;
pub mod reconstruct;
pub mod trellis;
