//! Core data models for the catalog.

mod group;
mod player;
mod skill;
mod stats;

pub use group::*;
pub use player::*;
pub use skill::*;
pub use stats::*;
