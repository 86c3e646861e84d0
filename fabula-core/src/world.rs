//! World state: setting, shared state map, cast, and event history.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::character::{Character, CharacterSnapshot};
use crate::error::{FabulaError, Result};

/// Number of trailing history events included in a world snapshot.
pub const RECENT_HISTORY_LEN: usize = 5;

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// The shared fictional world: setting, mutable state, cast, and history.
///
/// A world owns its characters, indexed by name. All mutation goes through
/// methods here or on [`Character`]; snapshots are the only way state leaves
/// this module.
#[derive(Debug, Clone)]
pub struct World {
    setting: String,
    background: String,
    state: BTreeMap<String, serde_json::Value>,
    characters: BTreeMap<String, Character>,
    history: Vec<String>,
}

impl World {
    /// Builds a world from a setting, background, and cast.
    ///
    /// Each character's theory of mind is seeded against the full cast list.
    /// Fails with [`FabulaError::DuplicateCharacter`] if two characters share
    /// a name.
    pub fn new(
        setting: impl Into<String>,
        background: impl Into<String>,
        characters: Vec<Character>,
    ) -> Result<Self> {
        let cast: Vec<String> = characters.iter().map(|c| c.name().to_string()).collect();
        let mut rng = rand::thread_rng();
        let mut indexed = BTreeMap::new();
        for mut character in characters {
            character.initialize_theory_of_mind(&cast, &mut rng);
            let name = character.name().to_string();
            if indexed.insert(name.clone(), character).is_some() {
                return Err(FabulaError::DuplicateCharacter(name));
            }
        }
        Ok(Self {
            setting: setting.into(),
            background: background.into(),
            state: BTreeMap::new(),
            characters: indexed,
            history: Vec::new(),
        })
    }

    /// Narrative setting, e.g. a one-line description of the location.
    #[must_use]
    pub fn setting(&self) -> &str {
        &self.setting
    }

    /// Background prose establishing the scenario.
    #[must_use]
    pub fn background(&self) -> &str {
        &self.background
    }

    /// Shared world-state facts keyed by name.
    #[must_use]
    pub fn state(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.state
    }

    /// All characters, indexed by name.
    #[must_use]
    pub fn characters(&self) -> &BTreeMap<String, Character> {
        &self.characters
    }

    /// Looks up a character by name.
    #[must_use]
    pub fn character(&self, name: &str) -> Option<&Character> {
        self.characters.get(name)
    }

    /// Looks up a character by name for mutation.
    pub fn character_mut(&mut self, name: &str) -> Option<&mut Character> {
        self.characters.get_mut(name)
    }

    /// Full event history, oldest first.
    #[must_use]
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// The last [`RECENT_HISTORY_LEN`] events, oldest first.
    #[must_use]
    pub fn recent_history(&self) -> &[String] {
        let start = self.history.len().saturating_sub(RECENT_HISTORY_LEN);
        &self.history[start..]
    }

    /// Appends an event to the history.
    pub fn add_to_history(&mut self, event: impl Into<String>) {
        self.history.push(event.into());
    }

    /// Merges state updates into the shared world state.
    ///
    /// Existing keys are overwritten, new keys inserted. There is no delete.
    pub fn update_world_state(&mut self, updates: BTreeMap<String, serde_json::Value>) {
        self.state.extend(updates);
    }

    /// Returns an owned, serializable copy of the current world.
    ///
    /// History is truncated to the recent window; prompts never see the
    /// full log.
    #[must_use]
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            setting: self.setting.clone(),
            background: self.background.clone(),
            state: self.state.clone(),
            characters: self
                .characters
                .iter()
                .map(|(name, character)| (name.clone(), character.snapshot()))
                .collect(),
            recent_history: self.recent_history().to_vec(),
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Point-in-time copy of the world, for prompts and display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorldSnapshot {
    /// Narrative setting.
    pub setting: String,
    /// Background prose.
    pub background: String,
    /// Shared world-state facts.
    pub state: BTreeMap<String, serde_json::Value>,
    /// Snapshot of every character, indexed by name.
    pub characters: BTreeMap<String, CharacterSnapshot>,
    /// The trailing window of history events, oldest first.
    pub recent_history: Vec<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
