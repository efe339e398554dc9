//! # bond-optimiser
//!
//! Top-K bond purchase sequence optimisation.
//!
//! Given a grid of bond returns indexed by (tenor, purchase month), this
//! engine computes the K best cumulative return factors reachable at the end
//! of the horizon, each with a reconstructable sequence of buy/wait actions.
//!
//! ## Architecture
//!
//! - **core** — Foundational types: return grid, investment actions
//! - **optimization** — Multi-result dynamic programme, strategy counting
//! - **io** — CSV loading, result rendering and export
//! - **simulation** — Synthetic return grids for testing and benchmarks

pub mod core;
pub mod io;
pub mod optimization;
pub mod simulation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::core::action::{ActionKind, InvestmentAction};
    pub use crate::core::return_grid::{GridError, ReturnGrid};
    pub use crate::optimization::dynamic::{DynamicOptimiser, OptimalResults, OptimiserError};
    pub use crate::optimization::path_count::{count_paths, PathCount};
}
