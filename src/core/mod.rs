//! Core types - pure abstractions shared across the codebase.

mod link;

pub use link::{LinkTarget, points_into_assets};
