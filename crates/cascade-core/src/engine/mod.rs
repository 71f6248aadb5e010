//! # Engine Module
//!
//! The stochastic core of the simulator: a weighted random walk over the level graph
//! that accumulates photon recoil momentum, and the Monte Carlo driver that repeats it.
//!
//! - **Cascade Walk** ([`cascade`]) - `CascadeGenerator`, one cascade per call, with an
//!   explicit continue/terminate state machine and a step cap for runaway cascades
//! - **Batch Driver** ([`driver`]) - `MonteCarloDriver`, sequential batches over an
//!   injected random source and chunk-seeded (optionally parallel) batches
//! - **Configuration** ([`config`]) - Simulation parameters and their builder
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress events
//! - **Error Handling** ([`error`]) - The error taxonomy surfaced to callers
//!
//! The engine never performs I/O; level data arrives as a read-only
//! [`LevelDatabase`](crate::core::models::database::LevelDatabase).

pub mod cascade;
pub mod config;
pub mod driver;
pub mod error;
pub mod progress;
pub mod utils;
