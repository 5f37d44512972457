//! Configuration module for Ferrite Search
//!
//! This module handles search preferences and their persistence, along with
//! persistence of the shared search history, using JSON files in the
//! platform-specific config directory.

mod persistence;
mod settings;

pub use persistence::*;
pub use settings::*;
