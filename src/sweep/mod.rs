//! Scenario sweeps over the shared vehicle record.
//!
//! Responsibilities:
//!
//! - generate annual-km grids and evaluate the TCO at each point (parallel)
//! - Monte Carlo sensitivity on energy prices and annual distance

pub mod grid;
pub mod monte_carlo;

pub use grid::*;
pub use monte_carlo::*;
