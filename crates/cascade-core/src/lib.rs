//! # Gamma Cascade Core Library
//!
//! Monte Carlo simulation of the recoil kinetic energy a nucleus picks up while it
//! de-excites through a cascade of prompt gamma-ray emissions.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture, each layer depending only on the
//! ones beneath it.
//!
//! - **[`core`]: The Foundation.** Immutable data models for nuclear energy levels
//!   (`LevelRecord`, `LevelDatabase`), the readers that turn level files into those
//!   models, and small numeric utilities such as isotropic direction sampling.
//!
//! - **[`engine`]: The Logic Core.** The stochastic cascade walk (`CascadeGenerator`),
//!   the Monte Carlo batch driver, configuration, progress reporting and the error
//!   taxonomy surfaced to callers.
//!
//! - **[`workflows`]: The Public API.** Complete procedures that tie the `engine` and
//!   `core` together, such as running a seeded batch and summarising its samples.

pub mod core;
pub mod engine;
pub mod workflows;
