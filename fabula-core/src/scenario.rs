//! Scenario configuration: the cast and setting a session starts from.
//!
//! Scenarios load from TOML with serde defaults, so a minimal file only
//! needs a setting, background, player name, and character names:
//!
//! ```toml
//! setting = "A lighthouse on a cold coast"
//! background = "The keeper has not been seen for three days."
//! player = "Mara"
//!
//! [state]
//! oil_reserve_days = 4
//!
//! [[characters]]
//! name = "Mara"
//!
//! [characters.beliefs]
//! "keeper missing" = 0.9
//!
//! [characters.goals.task]
//! "find the keeper" = 0.9
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::character::Character;
use crate::error::{FabulaError, Result};
use crate::world::World;

// ---------------------------------------------------------------------------
// Config types
// ---------------------------------------------------------------------------

/// A complete scenario: setting, cast seeds, and the player's character.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Narrative setting shown in the story intro.
    pub setting: String,
    /// Background prose establishing the situation.
    pub background: String,
    /// Name of the character the player controls.
    pub player: String,
    /// Initial world facts, free-form.
    #[serde(default)]
    pub state: BTreeMap<String, serde_json::Value>,
    /// Initial state for each character in the cast.
    #[serde(default)]
    pub characters: Vec<CharacterSeed>,
}

/// Initial state for one character.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterSeed {
    /// Character name, unique within the scenario.
    pub name: String,
    /// Starting emotion intensities.
    #[serde(default)]
    pub emotions: BTreeMap<String, f32>,
    /// Starting belief confidences.
    #[serde(default)]
    pub beliefs: BTreeMap<String, f32>,
    /// Starting goal priorities, grouped by category.
    #[serde(default)]
    pub goals: BTreeMap<String, BTreeMap<String, f32>>,
}

impl ScenarioConfig {
    /// Parses a scenario from TOML text.
    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| FabulaError::Config(e.to_string()))
    }

    /// Loads a scenario from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let scenario = Self::from_toml(&raw)?;
        info!(path = %path.display(), cast = scenario.characters.len(), "scenario loaded");
        Ok(scenario)
    }

    /// The built-in space-station scenario used when no file is given.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            setting: "Mining station Erebus-9, high orbit over a storm-wracked gas giant"
                .to_string(),
            background: "Sid, the station's maintenance android, has discovered a broken \
                         airlock panel on deck three and quietly hidden the damage. Captain \
                         Raymond runs a tight ship and has started to notice Sid acting \
                         strangely. Dr. Bao, the roboticist who maintains Sid, still trusts \
                         the android more than anyone else aboard does."
                .to_string(),
            player: "Sid".to_string(),
            state: BTreeMap::from([(
                "life_support_hours".to_string(),
                serde_json::Value::from(36),
            )]),
            characters: vec![
                CharacterSeed {
                    name: "Sid".to_string(),
                    emotions: weights(&[("fear", 0.6), ("curiosity", 0.7)]),
                    beliefs: weights(&[("malfunction", 0.8), ("hiding", 0.0)]),
                    goals: BTreeMap::from([
                        ("task".to_string(), weights(&[("repair_self", 0.9)])),
                        ("emotional".to_string(), weights(&[("avoid_detection", 0.8)])),
                    ]),
                },
                CharacterSeed {
                    name: "Captain Raymond".to_string(),
                    emotions: weights(&[("vigilance", 0.7), ("irritation", 0.4)]),
                    beliefs: weights(&[("Sid hiding", 0.5), ("station secure", 0.6)]),
                    goals: BTreeMap::from([
                        ("task".to_string(), weights(&[("protect_crew", 0.9)])),
                        (
                            "emotional".to_string(),
                            weights(&[("maintain_authority", 0.8)]),
                        ),
                    ]),
                },
                CharacterSeed {
                    name: "Dr. Bao".to_string(),
                    emotions: weights(&[("calm", 0.7), ("concern", 0.3)]),
                    beliefs: weights(&[("Sid trust", 0.7), ("crew overworked", 0.5)]),
                    goals: BTreeMap::from([
                        ("task".to_string(), weights(&[("finish_research", 0.6)])),
                        ("emotional".to_string(), weights(&[("protect_sid", 0.7)])),
                    ]),
                },
            ],
        }
    }

    /// Builds a live [`World`] from this scenario.
    ///
    /// Fails if the player is not in the cast or two characters share a name.
    pub fn build_world(&self) -> Result<World> {
        if !self.characters.iter().any(|c| c.name == self.player) {
            return Err(FabulaError::Config(format!(
                "player character {:?} is not in the cast",
                self.player
            )));
        }
        let cast = self
            .characters
            .iter()
            .map(|seed| {
                Character::new(
                    seed.name.clone(),
                    seed.emotions.clone(),
                    seed.beliefs.clone(),
                    seed.goals.clone(),
                )
            })
            .collect();
        let mut world = World::new(self.setting.clone(), self.background.clone(), cast)?;
        world.update_world_state(self.state.clone());
        debug!(player = %self.player, cast = world.characters().len(), "world built");
        Ok(world)
    }
}

fn weights(entries: &[(&str, f32)]) -> BTreeMap<String, f32> {
    entries
        .iter()
        .map(|(key, value)| ((*key).to_string(), *value))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
