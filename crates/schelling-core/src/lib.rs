//! Core types and utilities for the Schelling segregation simulation.

pub mod config;
pub mod error;
pub mod types;

pub use config::SimConfig;
pub use error::{Error, Result};
pub use types::*;
