//! Simulation engine driving the relocation dynamics.

use crate::grid::Grid;
use crate::policy::MovePolicy;
use crate::stats::SegregationEstimator;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use schelling_core::{Result, SimConfig};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// Where the scheduler currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    Running,
    /// A quiescent step occurred: no agent wanted to move.
    Converged,
    /// The step budget ran out before quiescence.
    StepLimitReached,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Running => write!(f, "running"),
            RunState::Converged => write!(f, "converged"),
            RunState::StepLimitReached => write!(f, "step limit reached"),
        }
    }
}

/// Per-step log entry, append-only during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: u64,
    pub moves: u64,
    /// Sampled clustering statistic, when this step was sampled.
    pub clustering: Option<f64>,
}

/// One simulation run: a grid, a policy, and a seeded RNG of its own.
///
/// All randomness (initial placement, scan order, destination choice, Monte
/// Carlo sampling) draws from the single per-run RNG, so identical configs
/// produce bit-identical runs.
pub struct Simulation {
    grid: Grid,
    policy: MovePolicy,
    estimator: SegregationEstimator,
    config: SimConfig,
    rng: ChaCha8Rng,
    steps: u64,
    state: RunState,
    records: Vec<StepRecord>,
}

impl Simulation {
    pub fn new(config: SimConfig) -> Result<Self> {
        config.validate()?;

        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let grid = Grid::from_config(&config, &mut rng)?;
        let policy = MovePolicy::from_config(&config);
        let estimator = SegregationEstimator::from_config(&config);

        Ok(Self {
            grid,
            policy,
            estimator,
            config,
            rng,
            steps: 0,
            state: RunState::Running,
            records: Vec::new(),
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    /// Execute one time step, returning the number of moves made.
    ///
    /// Occupied coordinates are snapshotted and visited in a shuffled order
    /// re-randomized each step, avoiding positional bias. Each agent is
    /// evaluated exactly once per step: destinations are cells that were
    /// empty, so a not-yet-visited coordinate still holds its original
    /// occupant, and a mover's new home is not re-evaluated until the next
    /// step.
    pub fn step(&mut self) -> Result<u64> {
        let mut occupied = self.grid.occupied_coords();
        occupied.shuffle(&mut self.rng);

        let mut moves = 0u64;
        for coord in occupied {
            if self.policy.is_satisfied(&self.grid, coord) {
                continue;
            }
            if let Some(dst) = self.policy.relocate(&mut self.grid, coord, &mut self.rng)? {
                debug!(
                    src_x = coord.x,
                    src_y = coord.y,
                    dst_x = dst.x,
                    dst_y = dst.y,
                    "agent relocated"
                );
                moves += 1;
            }
        }

        Ok(moves)
    }

    /// Run until convergence or the step budget, consuming the simulation.
    pub fn run(mut self) -> Result<SimulationResult> {
        info!(
            grid_size = self.config.grid_size,
            population = self.config.population(),
            neighbor_tol = self.config.neighbor_tol,
            seed = self.config.seed,
            max_iterations = self.config.max_iterations,
            "starting run"
        );

        while self.state == RunState::Running {
            let step_index = self.steps;
            let moves = self.step()?;
            self.steps += 1;

            let sampled = self.config.stats_interval > 0
                && step_index % self.config.stats_interval == 0;
            let clustering = if sampled {
                Some(self.estimator.estimate(&self.grid, &mut self.rng))
            } else {
                None
            };

            self.records.push(StepRecord {
                step: step_index,
                moves,
                clustering,
            });

            debug!(step = step_index, moves, clustering, "step complete");

            if moves == 0 {
                self.state = RunState::Converged;
            } else if self.steps >= self.config.max_iterations {
                self.state = RunState::StepLimitReached;
            }
        }

        let counts = self.grid.counts();
        info!(
            event = "run_summary",
            outcome = %self.state,
            steps = self.steps,
            group_a = counts.group_a,
            group_b = counts.group_b,
            empty = counts.empty,
            "run finished"
        );

        Ok(SimulationResult {
            grid: self.grid,
            records: self.records,
            outcome: self.state,
            steps: self.steps,
        })
    }
}

/// Final grid plus the convergence trace, handed to external reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub grid: Grid,
    pub records: Vec<StepRecord>,
    pub outcome: RunState,
    pub steps: u64,
}
