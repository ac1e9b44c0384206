//! The physical world of the Hearth simulation.
//!
//! This crate owns the [`World`] aggregate and the pieces of world logic
//! that do not depend on agent behavior: straight-line geometry on the
//! bounded plane, the weather Markov chain, resource harvesting and
//! regeneration, and cooperative construction.
//!
//! # Modules
//!
//! - [`error`] -- Error types for world lookups and insertions.
//! - [`geometry`] -- Clamping, distances, headings, and stepping.
//! - [`resource`] -- Yields, tool multipliers, depletion, regeneration.
//! - [`structure`] -- Blueprints, site rules, and the construction pass.
//! - [`weather`] -- The weather Markov chain and its check cadence.
//! - [`world`] -- The [`World`] aggregate, event log, and views.

pub mod error;
pub mod geometry;
pub mod resource;
pub mod structure;
pub mod weather;
pub mod world;

// Re-export primary types at crate root.
pub use error::WorldError;
pub use structure::{Blueprint, CompletedBuilding, ShelterBonus, blueprint};
pub use weather::WeatherSystem;
pub use world::World;
