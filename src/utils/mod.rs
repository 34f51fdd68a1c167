//! Utility modules shared across the importer.

pub mod path;
pub mod plural;
