//! Satisfaction test and relocation policy.

use crate::grid::Grid;
use crate::neighborhood::Neighborhood;
use rand_chacha::ChaCha8Rng;
use schelling_core::{Coord, Result, SimConfig};
use serde::{Deserialize, Serialize};

/// Decides whether an agent stays put and where a dissatisfied one goes.
///
/// Destination choice is uniform over the current empty set, matching
/// Schelling's original formulation. Agents whose similarity is undefined
/// (no occupied neighbors) count as satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovePolicy {
    pub threshold: f64,
    pub neighborhood: Neighborhood,
}

impl MovePolicy {
    pub fn new(threshold: f64, neighborhood: Neighborhood) -> Self {
        Self {
            threshold,
            neighborhood,
        }
    }

    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            threshold: config.neighbor_tol,
            neighborhood: Neighborhood::new(config.neighborhood_radius, config.boundary),
        }
    }

    /// Whether the occupant at `coord` meets the similarity threshold.
    pub fn is_satisfied(&self, grid: &Grid, coord: Coord) -> bool {
        match self.neighborhood.similarity(grid, coord) {
            Some(fraction) => fraction >= self.threshold,
            None => true,
        }
    }

    /// Uniformly random destination among the empty cells, if any.
    pub fn select_destination(&self, grid: &Grid, rng: &mut ChaCha8Rng) -> Option<Coord> {
        grid.random_empty(rng)
    }

    /// Relocate the occupant at `src` to a random empty cell.
    ///
    /// Returns the destination, or `None` when the grid has no empty cell
    /// left to move into.
    pub fn relocate(
        &self,
        grid: &mut Grid,
        src: Coord,
        rng: &mut ChaCha8Rng,
    ) -> Result<Option<Coord>> {
        match self.select_destination(grid, rng) {
            Some(dst) => {
                grid.move_agent(src, dst)?;
                Ok(Some(dst))
            }
            None => Ok(None),
        }
    }
}
