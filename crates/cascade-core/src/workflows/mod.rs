//! # Workflows Module
//!
//! High-level entry points that run a complete simulation from a loaded
//! [`LevelDatabase`](crate::core::models::database::LevelDatabase) and a validated
//! [`SimulationConfig`](crate::engine::config::SimulationConfig).
//!
//! - **Simulation Workflow** ([`simulate`]) - checks the level scheme, runs a seeded
//!   Monte Carlo batch of cascades and summarises the resulting recoil energies.

pub mod simulate;
