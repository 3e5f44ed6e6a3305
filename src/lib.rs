//! # Ping-Pong Catalog
//!
//! A school table-tennis player catalog with ratings, radar charts and an
//! AI assistant.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (players, stat blocks, groups, skills)
//! - **catalog**: The validated, immutable dataset
//! - **calculate**: Averages, ranks and orderings
//! - **radar**: Pentagon chart geometry
//! - **view**: UI selection state and derived views
//! - **agents**: AI assistant and chat sessions
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod agents;
pub mod api;
pub mod calculate;
pub mod catalog;
pub mod config;
pub mod models;
pub mod radar;
pub mod view;

pub use models::*;

use std::path::Path;

use catalog::{Catalog, CatalogError};

/// Load the catalog from `path`, or the built-in dataset when `None`.
pub fn load_catalog(path: Option<&Path>) -> Result<Catalog, CatalogError> {
    match path {
        Some(p) => Catalog::from_file(p),
        None => Ok(Catalog::builtin()),
    }
}
