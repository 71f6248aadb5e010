//! Provides input/output functionality for level-scheme files.
//!
//! Two on-disk representations are supported behind the common [`traits::LevelFile`]
//! interface: the one-level-per-file `.dat` format ([`dat`]) and a multi-level TOML
//! scheme ([`scheme`]). [`sources`] turns an explicit list of files and directories
//! into a [`LevelDatabase`](crate::core::models::database::LevelDatabase) without
//! touching any process-global state.

pub mod dat;
pub mod scheme;
pub mod sources;
pub mod traits;
