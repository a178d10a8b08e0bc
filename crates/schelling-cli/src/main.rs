//! Thin command-line wrapper around the simulation engine.
//!
//! Loads a JSON configuration (or the defaults), runs one simulation, and
//! prints the final grid plus the convergence trace. Rendering beyond text
//! and result persistence are left to external tooling.

use anyhow::{Context, Result};
use schelling_core::{CellState, Group, SimConfig};
use schelling_world::{stats, MovePolicy, Simulation};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => SimConfig::from_json_file(&path)
            .with_context(|| format!("failed to load configuration from {path}"))?,
        None => SimConfig::default(),
    };

    info!(seed = config.seed, grid_size = config.grid_size, "configuration loaded");

    let policy = MovePolicy::from_config(&config);
    let simulation = Simulation::new(config)?;
    let result = simulation.run()?;

    render_grid(&result.grid);

    let counts = result.grid.counts();
    println!();
    println!(
        "outcome: {} after {} steps ({} A, {} B, {} empty)",
        result.outcome, result.steps, counts.group_a, counts.group_b, counts.empty
    );
    println!(
        "fraction satisfied: {:.4}",
        stats::fraction_satisfied(&result.grid, &policy)
    );
    if let Some(clustering) = result.records.iter().rev().find_map(|r| r.clustering) {
        println!("final clustering entropy: {clustering:.4}");
    }

    println!();
    println!("step  moves  clustering");
    for record in &result.records {
        match record.clustering {
            Some(value) => println!("{:>4}  {:>5}  {:.4}", record.step, record.moves, value),
            None => println!("{:>4}  {:>5}  -", record.step, record.moves),
        }
    }

    Ok(())
}

fn render_grid(grid: &schelling_world::Grid) {
    for row in grid.rows() {
        let line: String = row
            .iter()
            .map(|state| match state {
                CellState::Empty => '·',
                CellState::Occupied(Group::A) => 'A',
                CellState::Occupied(Group::B) => 'B',
            })
            .collect();
        println!("{line}");
    }
}
