//! Kinship
//!
//! Ranks past incidents by how strongly their indicators of compromise
//! overlap with a target incident. Indicators are weighted by how rare they
//! are across the related incidents, so a shared rare indicator counts for
//! more than a shared common one.

pub mod cli;
pub mod config;
pub mod engine;
pub mod enrich;
pub mod errors;
pub mod fetch;
pub mod models;
pub mod reporter;
pub mod store;

pub use config::SimilarityConfig;
pub use engine::SimilarityEngine;
pub use errors::{KinshipError, KinshipResult};
pub use store::{IncidentStore, SnapshotStore};
