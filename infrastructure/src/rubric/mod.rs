//! Rubric and transcript file loading
//!
//! - [`RubricLoader`] - Reads a rubric from TOML (`[[categories]]`) or JSON

mod loader;

pub use loader::{RubricError, RubricLoader};
