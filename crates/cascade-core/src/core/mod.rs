//! # Core Module
//!
//! Fundamental building blocks shared by the cascade engine.
//!
//! - **Level Representation** ([`models`]) - `LevelRecord`, its stable `LevelKey`
//!   identity and the read-only `LevelDatabase` with its validation pass
//! - **File I/O** ([`io`]) - Readers and writers for per-level `.dat` files and
//!   multi-level TOML schemes, plus explicit source discovery
//! - **Numerics** ([`utils`]) - Isotropic direction sampling on the unit sphere

pub mod io;
pub mod models;
pub mod utils;
