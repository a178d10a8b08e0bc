//! 2D cell grid for the segregation model.

use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use schelling_core::{CellState, Coord, Error, Group, Result, SimConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A square grid of cells with an incrementally maintained set of empty
/// coordinates.
///
/// The empty set supports O(1) membership updates and O(1) uniform random
/// choice, which is all the move policy needs. It always mirrors the actual
/// cell contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "GridRepr", into = "GridRepr")]
pub struct Grid {
    size: i32,
    cells: Vec<CellState>,
    empty: Vec<Coord>,
    empty_slot: HashMap<Coord, usize>,
}

// The empty-coordinate index is derived data; two grids are equal when their
// cells are.
impl PartialEq for Grid {
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size && self.cells == other.cells
    }
}

impl Eq for Grid {}

/// Serialized form of a grid: just the cells. The empty-coordinate index is
/// rebuilt on deserialization.
#[derive(Serialize, Deserialize)]
struct GridRepr {
    size: i32,
    cells: Vec<CellState>,
}

impl From<Grid> for GridRepr {
    fn from(grid: Grid) -> Self {
        Self {
            size: grid.size,
            cells: grid.cells,
        }
    }
}

impl From<GridRepr> for Grid {
    fn from(repr: GridRepr) -> Self {
        let mut grid = Grid {
            size: repr.size,
            cells: repr.cells,
            empty: Vec::new(),
            empty_slot: HashMap::new(),
        };
        for index in 0..grid.cells.len() {
            if grid.cells[index].is_empty() {
                let coord = grid.index_to_coord(index);
                grid.push_empty(coord);
            }
        }
        grid
    }
}

impl Grid {
    /// Create a grid with every cell empty.
    pub fn new(size: i32) -> Self {
        let capacity = (size * size) as usize;
        let mut grid = Self {
            size,
            cells: vec![CellState::Empty; capacity],
            empty: Vec::with_capacity(capacity),
            empty_slot: HashMap::with_capacity(capacity),
        };
        for index in 0..capacity {
            let coord = grid.index_to_coord(index);
            grid.push_empty(coord);
        }
        grid
    }

    /// Place agents and empties according to the configured ratios.
    ///
    /// All N² coordinates are shuffled once (sampling without replacement);
    /// the first block becomes GroupA, the next GroupB, the rest stays empty.
    pub fn from_config(config: &SimConfig, rng: &mut ChaCha8Rng) -> Result<Self> {
        config.validate()?;

        let mut grid = Self::new(config.grid_size);
        let mut coords: Vec<Coord> = grid.coords().collect();
        coords.shuffle(rng);

        let population = config.population();
        let group_a = config.group_a_count();
        for (rank, coord) in coords.into_iter().take(population).enumerate() {
            let group = if rank < group_a { Group::A } else { Group::B };
            grid.set(coord, CellState::Occupied(group));
        }

        Ok(grid)
    }

    /// Side length of the square grid.
    pub fn size(&self) -> i32 {
        self.size
    }

    /// Cell state at a coordinate. The coordinate must be in bounds.
    pub fn get(&self, coord: Coord) -> CellState {
        debug_assert!(coord.in_bounds(self.size));
        self.cells[self.coord_to_index(coord)]
    }

    /// Set the cell state at a coordinate, keeping the empty set consistent.
    pub fn set(&mut self, coord: Coord, state: CellState) {
        debug_assert!(coord.in_bounds(self.size));
        let index = self.coord_to_index(coord);
        let was_empty = self.cells[index].is_empty();
        self.cells[index] = state;
        match (was_empty, state.is_empty()) {
            (true, false) => self.remove_empty(coord),
            (false, true) => self.push_empty(coord),
            _ => {}
        }
    }

    /// Move the occupant at `src` to `dst`, leaving `src` empty.
    ///
    /// `src` must be occupied and `dst` empty; anything else is a logic
    /// defect and surfaces as an invariant violation.
    pub fn move_agent(&mut self, src: Coord, dst: Coord) -> Result<()> {
        let occupant = self.get(src);
        if occupant.is_empty() {
            return Err(Error::InvariantViolation(format!(
                "move from empty cell ({}, {})",
                src.x, src.y
            )));
        }
        if !self.get(dst).is_empty() {
            return Err(Error::InvariantViolation(format!(
                "move onto occupied cell ({}, {})",
                dst.x, dst.y
            )));
        }
        self.set(dst, occupant);
        self.set(src, CellState::Empty);
        Ok(())
    }

    /// Number of empty cells.
    pub fn empty_count(&self) -> usize {
        self.empty.len()
    }

    /// Current empty coordinates, in no particular order.
    pub fn empty_coords(&self) -> &[Coord] {
        &self.empty
    }

    /// Uniformly random empty coordinate, if any cell is empty.
    pub fn random_empty(&self, rng: &mut ChaCha8Rng) -> Option<Coord> {
        if self.empty.is_empty() {
            None
        } else {
            Some(self.empty[rng.gen_range(0..self.empty.len())])
        }
    }

    /// All currently occupied coordinates, in row-major order.
    pub fn occupied_coords(&self) -> Vec<Coord> {
        self.iter()
            .filter(|(_, state)| !state.is_empty())
            .map(|(coord, _)| coord)
            .collect()
    }

    /// Per-state cell counts.
    pub fn counts(&self) -> CellCounts {
        let mut counts = CellCounts::default();
        for state in &self.cells {
            match state {
                CellState::Empty => counts.empty += 1,
                CellState::Occupied(Group::A) => counts.group_a += 1,
                CellState::Occupied(Group::B) => counts.group_b += 1,
            }
        }
        counts
    }

    /// Iterator over all coordinates, row-major.
    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        (0..self.cells.len()).map(move |i| self.index_to_coord(i))
    }

    /// Iterator over all cells with their coordinates, row-major.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, &CellState)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, state)| (self.index_to_coord(i), state))
    }

    /// Rows of the grid, top to bottom, for rendering.
    pub fn rows(&self) -> impl Iterator<Item = &[CellState]> {
        self.cells.chunks(self.size as usize)
    }

    fn coord_to_index(&self, coord: Coord) -> usize {
        (coord.y * self.size + coord.x) as usize
    }

    fn index_to_coord(&self, index: usize) -> Coord {
        let x = (index as i32) % self.size;
        let y = (index as i32) / self.size;
        Coord::new(x, y)
    }

    fn push_empty(&mut self, coord: Coord) {
        self.empty_slot.insert(coord, self.empty.len());
        self.empty.push(coord);
    }

    fn remove_empty(&mut self, coord: Coord) {
        if let Some(slot) = self.empty_slot.remove(&coord) {
            self.empty.swap_remove(slot);
            if slot < self.empty.len() {
                let moved = self.empty[slot];
                self.empty_slot.insert(moved, slot);
            }
        }
    }
}

/// Number of cells in each state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellCounts {
    pub group_a: usize,
    pub group_b: usize,
    pub empty: usize,
}

impl CellCounts {
    pub fn total(&self) -> usize {
        self.group_a + self.group_b + self.empty
    }

    pub fn occupied(&self) -> usize {
        self.group_a + self.group_b
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_grid_creation() {
        let grid = Grid::new(10);
        assert_eq!(grid.size(), 10);
        assert_eq!(grid.counts().total(), 100);
        assert_eq!(grid.empty_count(), 100);
    }

    #[test]
    fn test_grid_from_config_counts() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let config = SimConfig {
            grid_size: 10,
            group_ratio: 0.5,
            empty_fraction: 0.1,
            ..Default::default()
        };

        let grid = Grid::from_config(&config, &mut rng).unwrap();
        let counts = grid.counts();
        assert_eq!(counts.total(), 100);
        assert_eq!(counts.empty, 10);
        assert_eq!(counts.group_a, 45);
        assert_eq!(counts.group_b, 45);
        assert_eq!(grid.empty_count(), 10);
    }

    #[test]
    fn test_grid_from_config_rejects_invalid() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let config = SimConfig {
            grid_size: -3,
            ..Default::default()
        };
        assert!(matches!(
            Grid::from_config(&config, &mut rng),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_move_agent() {
        let mut grid = Grid::new(5);
        let src = Coord::new(1, 1);
        let dst = Coord::new(3, 3);
        grid.set(src, CellState::Occupied(Group::A));

        grid.move_agent(src, dst).unwrap();
        assert_eq!(grid.get(dst), CellState::Occupied(Group::A));
        assert_eq!(grid.get(src), CellState::Empty);

        // Empty set tracks both sides of the move
        assert!(grid.empty_coords().contains(&src));
        assert!(!grid.empty_coords().contains(&dst));
        assert_eq!(grid.empty_count(), 24);
    }

    #[test]
    fn test_move_agent_invariants() {
        let mut grid = Grid::new(5);
        grid.set(Coord::new(0, 0), CellState::Occupied(Group::A));
        grid.set(Coord::new(1, 0), CellState::Occupied(Group::B));

        // Moving from an empty cell is a defect
        let err = grid.move_agent(Coord::new(2, 2), Coord::new(3, 3));
        assert!(matches!(err, Err(Error::InvariantViolation(_))));

        // Moving onto an occupied cell is a defect
        let err = grid.move_agent(Coord::new(0, 0), Coord::new(1, 0));
        assert!(matches!(err, Err(Error::InvariantViolation(_))));
    }

    #[test]
    fn test_random_empty_uniform_and_consistent() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut grid = Grid::new(3);
        for coord in grid.coords().collect::<Vec<_>>() {
            grid.set(coord, CellState::Occupied(Group::A));
        }
        assert_eq!(grid.random_empty(&mut rng), None);

        let hole = Coord::new(2, 1);
        grid.set(hole, CellState::Empty);
        assert_eq!(grid.random_empty(&mut rng), Some(hole));
    }

    #[test]
    fn test_serde_round_trip_rebuilds_empty_index() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let config = SimConfig {
            grid_size: 8,
            ..Default::default()
        };
        let grid = Grid::from_config(&config, &mut rng).unwrap();

        let json = serde_json::to_string(&grid).unwrap();
        let restored: Grid = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, grid);
        assert_eq!(restored.empty_count(), grid.empty_count());
        for coord in restored.empty_coords() {
            assert!(restored.get(*coord).is_empty());
        }
    }
}
