//! Core state model for Fabula, an LLM-driven interactive fiction engine.
//!
//! This crate owns the cognitive data model: [`Character`]s with emotions,
//! beliefs, goals, and theory of mind, the [`World`] that holds the cast and
//! event history, and the scenario configuration a session starts from.
//! Every scalar lives in `[0.0, 1.0]` and updates clamp on assignment, so
//! collaborator output cannot push existing state out of range. Snapshots
//! are the only serialization surface; live state never deserializes
//! directly.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod character;
pub mod error;
pub mod scenario;
pub mod update;
pub mod world;

pub use character::{Character, CharacterSnapshot, TOM_VARIATION};
pub use error::{FabulaError, Result};
pub use scenario::{CharacterSeed, ScenarioConfig};
pub use update::{AppraisalUpdate, TurnResult};
pub use world::{RECENT_HISTORY_LEN, World, WorldSnapshot};
