//! Configuration types for the simulation.

use crate::error::{Error, Result};
use crate::types::BoundaryPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Immutable parameters for one simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Side length of the square grid
    pub grid_size: i32,
    /// Fraction of GroupA among occupied cells (0.0 to 1.0)
    pub group_ratio: f64,
    /// Fraction of cells left empty (0.0 inclusive to 1.0 exclusive)
    pub empty_fraction: f64,
    /// Satisfaction threshold on the similarity fraction (0.0 to 1.0)
    pub neighbor_tol: f64,
    /// Moore neighborhood radius
    pub neighborhood_radius: i32,
    /// Edge behavior of the neighborhood
    pub boundary: BoundaryPolicy,
    /// Step budget before the run is cut off
    pub max_iterations: u64,
    /// Random seed for reproducibility
    pub seed: u64,
    /// Sample the clustering statistic every this many steps (0 disables)
    pub stats_interval: u64,
    /// Number of Monte Carlo samples per statistics invocation
    pub stats_samples: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            grid_size: 50,
            group_ratio: 0.5,
            empty_fraction: 0.1,
            neighbor_tol: 0.3,
            neighborhood_radius: 1,
            boundary: BoundaryPolicy::Toroidal,
            max_iterations: 100,
            seed: 0,
            stats_interval: 1,
            stats_samples: 500,
        }
    }
}

impl SimConfig {
    /// Check all parameter ranges. Called once before a grid is built.
    pub fn validate(&self) -> Result<()> {
        if self.grid_size <= 0 {
            return Err(Error::Config(format!(
                "grid_size must be positive, got {}",
                self.grid_size
            )));
        }
        if !(0.0..=1.0).contains(&self.group_ratio) {
            return Err(Error::Config(format!(
                "group_ratio must be in [0, 1], got {}",
                self.group_ratio
            )));
        }
        if !(0.0..1.0).contains(&self.empty_fraction) {
            return Err(Error::Config(format!(
                "empty_fraction must be in [0, 1), got {}",
                self.empty_fraction
            )));
        }
        if !(0.0..=1.0).contains(&self.neighbor_tol) {
            return Err(Error::Config(format!(
                "neighbor_tol must be in [0, 1], got {}",
                self.neighbor_tol
            )));
        }
        if self.neighborhood_radius < 1 {
            return Err(Error::Config(format!(
                "neighborhood_radius must be at least 1, got {}",
                self.neighborhood_radius
            )));
        }
        // The neighborhood window must fit inside the grid. A wider window
        // would wrap onto the same cell twice under the toroidal policy and
        // skew the similarity denominator.
        if 2 * self.neighborhood_radius + 1 > self.grid_size {
            return Err(Error::Config(format!(
                "neighborhood window (radius {}) does not fit a grid of size {}",
                self.neighborhood_radius, self.grid_size
            )));
        }
        if self.max_iterations == 0 {
            return Err(Error::Config("max_iterations must be positive".to_string()));
        }
        Ok(())
    }

    /// Parse a configuration from a JSON string. Missing fields fall back to
    /// the defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Total number of cells.
    pub fn capacity(&self) -> usize {
        (self.grid_size as usize) * (self.grid_size as usize)
    }

    /// Number of occupied cells implied by the empty fraction.
    pub fn population(&self) -> usize {
        let occupied = (self.capacity() as f64) * (1.0 - self.empty_fraction);
        occupied.round() as usize
    }

    /// Number of GroupA agents implied by the group ratio.
    pub fn group_a_count(&self) -> usize {
        ((self.population() as f64) * self.group_ratio).round() as usize
    }
}
