//! Independent run jobs for parameter sweeps.
//!
//! Each job owns its configuration and seed; runs never share a grid or RNG,
//! so a sweep is embarrassingly parallel across runs.

use crate::grid::CellCounts;
use crate::simulation::{RunState, Simulation, StepRecord};
use schelling_core::{Result, RunId, SimConfig};
use serde::{Deserialize, Serialize};
use tracing::info;

/// A single run that can be executed in isolation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunJob {
    pub run_id: RunId,
    pub config: SimConfig,
}

impl RunJob {
    pub fn new(config: SimConfig) -> Self {
        Self {
            run_id: RunId::new(),
            config,
        }
    }

    /// Execute this run to completion.
    pub fn execute(self) -> Result<RunReport> {
        info!(run_id = %self.run_id, seed = self.config.seed, "executing run job");

        let simulation = Simulation::new(self.config)?;
        let result = simulation.run()?;
        let final_clustering = result.records.iter().rev().find_map(|r| r.clustering);

        Ok(RunReport {
            run_id: self.run_id,
            outcome: result.outcome,
            steps: result.steps,
            counts: result.grid.counts(),
            final_clustering,
            records: result.records,
        })
    }
}

/// Summary produced by one run, consumable by external reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: RunId,
    pub outcome: RunState,
    pub steps: u64,
    pub counts: CellCounts,
    /// Last sampled clustering statistic, if sampling was enabled.
    pub final_clustering: Option<f64>,
    pub records: Vec<StepRecord>,
}

/// A sweep: one base configuration replicated across seeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepJob {
    pub base: SimConfig,
    pub seeds: Vec<u64>,
}

impl SweepJob {
    pub fn new(base: SimConfig, seeds: Vec<u64>) -> Self {
        Self { base, seeds }
    }

    /// Expand into one independent job per seed.
    pub fn jobs(&self) -> Vec<RunJob> {
        self.seeds
            .iter()
            .map(|&seed| {
                RunJob::new(SimConfig {
                    seed,
                    ..self.base.clone()
                })
            })
            .collect()
    }

    /// Execute every run in sequence.
    pub fn execute(self) -> Result<Vec<RunReport>> {
        self.jobs().into_iter().map(RunJob::execute).collect()
    }
}
