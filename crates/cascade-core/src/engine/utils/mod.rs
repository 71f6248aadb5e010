//! Utility functions for the engine module.
//!
//! Currently this holds the weighted discrete sampling used to pick the next level of
//! a cascade from its branching ratios.

pub mod sampling;
