//! Schelling segregation simulation engine.
//!
//! This crate implements the 2D grid where agents of two groups live, the
//! satisfaction and relocation rules, the simulation loop, and the clustering
//! statistics computed over the evolving grid.

pub mod grid;
pub mod neighborhood;
pub mod policy;
pub mod simulation;
pub mod stats;
pub mod sweep;

pub use grid::{CellCounts, Grid};
pub use neighborhood::Neighborhood;
pub use policy::MovePolicy;
pub use simulation::{RunState, Simulation, SimulationResult, StepRecord};
pub use stats::SegregationEstimator;
pub use sweep::{RunJob, RunReport, SweepJob};
