//! Data models describing a nuclear level scheme.
//!
//! A [`level::LevelRecord`] is an immutable description of one excited (or ground)
//! state. Records are collected into a [`database::LevelDatabase`], keyed by a
//! quantized energy so that destination energies parsed independently from different
//! files still resolve to the same record.

pub mod database;
pub mod level;
