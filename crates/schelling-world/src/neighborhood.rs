//! Neighborhood queries over the grid.
//!
//! The neighborhood is a pure function of (grid, coordinate, policy). Grid
//! contents change every step, so nothing here caches anything.

use crate::grid::Grid;
use schelling_core::{BoundaryPolicy, Coord};
use serde::{Deserialize, Serialize};

/// Moore neighborhood of a fixed radius under a fixed boundary policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighborhood {
    pub radius: i32,
    pub boundary: BoundaryPolicy,
}

impl Neighborhood {
    pub fn new(radius: i32, boundary: BoundaryPolicy) -> Self {
        Self { radius, boundary }
    }

    /// Neighbor coordinates of `origin` on a square grid of the given size.
    ///
    /// The origin itself is excluded. Under `Toroidal` every offset wraps and
    /// the set is always full; under `Clipped` offsets falling outside the
    /// grid are dropped. The window must fit the grid (`2·radius + 1 <=
    /// size`, enforced by config validation), so no two offsets ever wrap to
    /// the same coordinate.
    pub fn of(&self, size: i32, origin: Coord) -> Vec<Coord> {
        let mut neighbors = Vec::with_capacity(((2 * self.radius + 1).pow(2) - 1) as usize);
        for dy in -self.radius..=self.radius {
            for dx in -self.radius..=self.radius {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let coord = origin.offset(dx, dy);
                match self.boundary {
                    BoundaryPolicy::Toroidal => neighbors.push(coord.wrap(size)),
                    BoundaryPolicy::Clipped => {
                        if coord.in_bounds(size) {
                            neighbors.push(coord);
                        }
                    }
                }
            }
        }
        neighbors
    }

    /// Fraction of occupied neighbors sharing the occupant's group label.
    ///
    /// Returns `None` when the similarity is undefined: the cell itself is
    /// empty, or no neighbor is occupied. The move policy treats `None` as
    /// satisfied, since a lone agent has no evidence of dissimilarity.
    pub fn similarity(&self, grid: &Grid, coord: Coord) -> Option<f64> {
        let group = grid.get(coord).group()?;

        let mut occupied = 0u32;
        let mut matching = 0u32;
        for neighbor in self.of(grid.size(), coord) {
            if let Some(other) = grid.get(neighbor).group() {
                occupied += 1;
                if other == group {
                    matching += 1;
                }
            }
        }

        if occupied == 0 {
            None
        } else {
            Some(f64::from(matching) / f64::from(occupied))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schelling_core::{CellState, Group};

    fn neighborhood(boundary: BoundaryPolicy) -> Neighborhood {
        Neighborhood::new(1, boundary)
    }

    #[test]
    fn test_toroidal_neighbor_counts() {
        let hood = neighborhood(BoundaryPolicy::Toroidal);
        // On a 3x3 torus every coordinate has the full Moore set.
        for y in 0..3 {
            for x in 0..3 {
                assert_eq!(hood.of(3, Coord::new(x, y)).len(), 8);
            }
        }
    }

    #[test]
    fn test_clipped_neighbor_counts() {
        let hood = neighborhood(BoundaryPolicy::Clipped);
        // Corners see 3 neighbors, edges 5, the center 8.
        assert_eq!(hood.of(3, Coord::new(0, 0)).len(), 3);
        assert_eq!(hood.of(3, Coord::new(2, 2)).len(), 3);
        assert_eq!(hood.of(3, Coord::new(1, 0)).len(), 5);
        assert_eq!(hood.of(3, Coord::new(0, 1)).len(), 5);
        assert_eq!(hood.of(3, Coord::new(1, 1)).len(), 8);
    }

    #[test]
    fn test_toroidal_tightest_window_has_distinct_neighbors() {
        // 2r + 1 == size: the wrapped window covers the whole grid minus the
        // origin, with every neighbor counted exactly once.
        let hood = Neighborhood::new(2, BoundaryPolicy::Toroidal);
        let origin = Coord::new(0, 0);
        let neighbors = hood.of(5, origin);

        assert_eq!(neighbors.len(), 24);
        let unique: std::collections::HashSet<_> = neighbors.iter().collect();
        assert_eq!(unique.len(), 24);
        assert!(!neighbors.contains(&origin));
    }

    #[test]
    fn test_radius_two_counts() {
        let hood = Neighborhood::new(2, BoundaryPolicy::Toroidal);
        assert_eq!(hood.of(7, Coord::new(3, 3)).len(), 24);

        let hood = Neighborhood::new(2, BoundaryPolicy::Clipped);
        assert_eq!(hood.of(7, Coord::new(0, 0)).len(), 8);
    }

    #[test]
    fn test_similarity_fraction() {
        let mut grid = Grid::new(3);
        let center = Coord::new(1, 1);
        grid.set(center, CellState::Occupied(Group::A));
        grid.set(Coord::new(0, 0), CellState::Occupied(Group::A));
        grid.set(Coord::new(2, 0), CellState::Occupied(Group::B));
        grid.set(Coord::new(0, 2), CellState::Occupied(Group::B));

        let hood = neighborhood(BoundaryPolicy::Clipped);
        assert_eq!(hood.similarity(&grid, center), Some(1.0 / 3.0));
    }

    #[test]
    fn test_similarity_undefined_without_occupied_neighbors() {
        let mut grid = Grid::new(5);
        let lone = Coord::new(2, 2);
        grid.set(lone, CellState::Occupied(Group::A));

        let hood = neighborhood(BoundaryPolicy::Toroidal);
        assert_eq!(hood.similarity(&grid, lone), None);
    }

    #[test]
    fn test_similarity_undefined_for_empty_cell() {
        let grid = Grid::new(5);
        let hood = neighborhood(BoundaryPolicy::Toroidal);
        assert_eq!(hood.similarity(&grid, Coord::new(0, 0)), None);
    }

    #[test]
    fn test_toroidal_similarity_sees_across_edge() {
        let mut grid = Grid::new(3);
        let corner = Coord::new(0, 0);
        grid.set(corner, CellState::Occupied(Group::A));
        // Opposite corner is a wrapped diagonal neighbor of (0, 0)
        grid.set(Coord::new(2, 2), CellState::Occupied(Group::A));

        let toroidal = neighborhood(BoundaryPolicy::Toroidal);
        assert_eq!(toroidal.similarity(&grid, corner), Some(1.0));

        // Clipped at the same corner cannot see it
        let clipped = neighborhood(BoundaryPolicy::Clipped);
        assert_eq!(clipped.similarity(&grid, corner), None);
    }
}
