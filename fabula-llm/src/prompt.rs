//! Prompt templates for story generation and appraisal.
//!
//! Every prompt is a versioned, testable artifact. The builtin constants
//! below are the defaults; a directory of TOML files with the same names can
//! override them at runtime. Placeholders use `{key}` syntax and are filled
//! by [`render_template`].

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use crate::error::LlmError;

/// System prompt for the cognitive appraisal call.
pub const APPRAISAL_SYSTEM: &str =
    "You are an expert at modeling character emotions and beliefs using the OCC appraisal model.";

/// User prompt for the cognitive appraisal call.
///
/// Placeholders: `{world_state}`, `{character_state}`, `{action}`.
pub const APPRAISAL_USER: &str = r#"# OCC Appraisal Model Evaluation

## World State
{world_state}

## Character Performing Appraisal
{character_state}

## Action to Appraise
{action}

## Task
Update the character's state in response to the action, following the OCC
model for cognitive appraisal of emotion. Apply the adjustments below to the
character's current values and return the resulting new values. All values
are decimals between 0 and 1; clamp every result into that range.

**a. Goal Congruence:**
- If the action strongly hinders one of the character's goals: decrease that
  goal's priority by 0.10 and increase related negative emotions (e.g.,
  anger, sadness) by 0.15.
- If it moderately hinders a goal: decrease the priority by 0.05 and
  increase related negative emotions by 0.10.
- If it strongly facilitates a goal: increase the priority by 0.10 and
  increase related positive emotions (e.g., happiness) by 0.15.
- If it moderately facilitates a goal: increase the priority by 0.05 and
  increase related positive emotions by 0.10.

**b. Unexpectedness:**
- For a highly unexpected event, add 0.20 to arousal-based emotions (e.g.,
  fear, surprise).
- For a moderately unexpected event, add 0.10.

**c. Responsibility Attribution:**
- Note whether the event is self-caused, caused by another agent, or due to
  external factors, and adjust the corresponding emotions (e.g.,
  guilt or defensiveness) by 0.10 accordingly.

**d. Updating Beliefs:**
- If the action confirms a belief, increase it by 0.10.
- If the action contradicts a belief, decrease it by 0.10.

**e. Updating Theory of Mind:**
- For each belief about another character: if the observed behavior supports
  that belief, increase it by 0.10; if it contradicts it, decrease it by
  0.10.

## Output Format
Return a JSON object with the following structure:
```json
{
    "emotional_updates": {
        "emotion_name": new_value
    },
    "belief_updates": {
        "belief_name": new_value
    },
    "theory_of_mind_updates": {
        "character_name": {
            "belief_name": new_value
        }
    },
    "goal_updates": {
        "goal_category": {
            "goal_name": new_value
        }
    },
    "appraisal_explanation": "Why these changes occurred, based on the OCC model"
}
```"#;

/// System prompt for the player-turn narration call.
pub const PLAYER_TURN_SYSTEM: &str =
    "You are an interactive storytelling engine creating a realistic sci-fi narrative.";

/// User prompt for the player-turn narration call.
///
/// Placeholders: `{world_state}`, `{player_state}`, `{player_input}`.
pub const PLAYER_TURN_USER: &str = r#"# Interactive Story Generation

## World State
{world_state}

## Player Character
{player_state}

## Player's Action
{player_input}

## Task
Generate the next part of the interactive story based on the player's action.

1. Determine how other characters would realistically react.
2. Update the world state if necessary.
3. Provide a narrative description of what happens.

## Output Format
Return a JSON object with the following structure:
```json
{
    "narrative": "Description of what happens in the story",
    "character_actions": {
        "character_name": "Description of this character's reaction"
    },
    "world_state_updates": {
        "state_key": "new value"
    }
}
```"#;

/// System prompt for the NPC-turn narration call.
pub const NPC_TURN_SYSTEM: &str =
    "You are an interactive storytelling engine creating realistic character actions.";

/// User prompt for the NPC-turn narration call.
///
/// Placeholder: `{world_state}`.
pub const NPC_TURN_USER: &str = r#"# NPC Character Actions

## World State
{world_state}

## Task
Generate the next actions for the non-player characters in the story.
Consider each character's goals, beliefs, and emotional state.
Characters should act in ways that are consistent with their beliefs and
goals.

## Output Format
Return a JSON object with the following structure:
```json
{
    "narrative": "Description of what the NPCs do",
    "character_actions": {
        "character_name": "Description of this character's action"
    },
    "world_state_updates": {
        "state_key": "new value"
    }
}
```"#;

/// Simple template interpolation for prompts.
///
/// Replaces `{key}` with the corresponding value. Unknown placeholders are
/// left untouched.
#[must_use]
pub fn render_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{key}}}"), value);
    }
    result
}

// ---------------------------------------------------------------------------
// PromptLibrary: versioned TOML template loader
// ---------------------------------------------------------------------------

/// Identifies a prompt template by purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptId {
    /// OCC cognitive appraisal of one action by one character.
    Appraisal,
    /// Narration of the consequences of a player action.
    PlayerTurn,
    /// Narration of what the NPCs do next.
    NpcTurn,
}

impl PromptId {
    /// Returns the TOML filename (without path) for this prompt.
    #[must_use]
    pub fn filename(self) -> &'static str {
        match self {
            Self::Appraisal => "appraisal.toml",
            Self::PlayerTurn => "player_turn.toml",
            Self::NpcTurn => "npc_turn.toml",
        }
    }

    /// All prompt IDs.
    #[must_use]
    pub fn all() -> &'static [PromptId] {
        &[Self::Appraisal, Self::PlayerTurn, Self::NpcTurn]
    }
}

impl fmt::Display for PromptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Appraisal => "appraisal",
            Self::PlayerTurn => "player_turn",
            Self::NpcTurn => "npc_turn",
        };
        write!(f, "{name}")
    }
}

impl FromStr for PromptId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "appraisal" => Ok(Self::Appraisal),
            "player_turn" => Ok(Self::PlayerTurn),
            "npc_turn" => Ok(Self::NpcTurn),
            _ => Err(format!("unknown prompt id: '{s}'")),
        }
    }
}

/// File wrapper for a TOML prompt: the `[prompt]` section.
#[derive(Debug, Clone, Deserialize)]
struct TomlPromptFile {
    prompt: TomlPromptData,
}

#[derive(Debug, Clone, Deserialize)]
struct TomlPromptData {
    version: String,
    max_tokens: u32,
    temperature: f32,
    system: String,
    user: String,
}

/// A loaded, ready-to-render prompt template.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// Prompt version string (e.g., "1.0", or "builtin").
    pub version: String,
    /// Maximum output tokens for calls using this prompt.
    pub max_tokens: u32,
    /// Sampling temperature for calls using this prompt.
    pub temperature: f32,
    /// System prompt template.
    pub system: String,
    /// User prompt template (contains `{key}` placeholders).
    pub user: String,
}

/// Loads prompt templates and renders them with variables.
#[derive(Debug, Clone)]
pub struct PromptLibrary {
    templates: HashMap<PromptId, PromptTemplate>,
}

impl PromptLibrary {
    /// Creates a library holding the compiled-in templates.
    #[must_use]
    pub fn builtin() -> Self {
        let mut templates = HashMap::new();
        templates.insert(
            PromptId::Appraisal,
            PromptTemplate {
                version: "builtin".into(),
                max_tokens: 1000,
                temperature: 0.7,
                system: APPRAISAL_SYSTEM.into(),
                user: APPRAISAL_USER.into(),
            },
        );
        templates.insert(
            PromptId::PlayerTurn,
            PromptTemplate {
                version: "builtin".into(),
                max_tokens: 1000,
                temperature: 0.7,
                system: PLAYER_TURN_SYSTEM.into(),
                user: PLAYER_TURN_USER.into(),
            },
        );
        templates.insert(
            PromptId::NpcTurn,
            PromptTemplate {
                version: "builtin".into(),
                max_tokens: 1000,
                temperature: 0.7,
                system: NPC_TURN_SYSTEM.into(),
                user: NPC_TURN_USER.into(),
            },
        );
        Self { templates }
    }

    /// Loads prompt templates from a directory of TOML files.
    ///
    /// Files are matched by [`PromptId::filename`]; ids without a file fall
    /// back to the builtin template. Fails if the directory provides no
    /// recognized file at all, or a present file does not parse.
    pub fn from_directory(dir: impl AsRef<Path>) -> Result<Self, LlmError> {
        let dir = dir.as_ref();
        let mut library = Self::builtin();
        let mut loaded = 0usize;

        for id in PromptId::all() {
            let path: PathBuf = dir.join(id.filename());
            if !path.exists() {
                continue;
            }
            let content = std::fs::read_to_string(&path).map_err(|e| {
                LlmError::Config(format!("failed to read {}: {e}", path.display()))
            })?;
            let parsed: TomlPromptFile = toml::from_str(&content).map_err(|e| {
                LlmError::Config(format!("failed to parse {}: {e}", path.display()))
            })?;
            let data = parsed.prompt;
            library.templates.insert(
                *id,
                PromptTemplate {
                    version: data.version,
                    max_tokens: data.max_tokens,
                    temperature: data.temperature,
                    system: data.system,
                    user: data.user,
                },
            );
            loaded += 1;
        }

        if loaded == 0 {
            return Err(LlmError::Config(format!(
                "no prompt templates found in directory: {}",
                dir.display()
            )));
        }
        Ok(library)
    }

    /// Gets a loaded template by id.
    #[must_use]
    pub fn get(&self, id: PromptId) -> Option<&PromptTemplate> {
        self.templates.get(&id)
    }

    /// Renders both system and user prompts for a given id.
    ///
    /// Returns `(system, user)` with all provided `{key}` placeholders
    /// replaced.
    pub fn render(
        &self,
        id: PromptId,
        vars: &[(&str, &str)],
    ) -> Result<(String, String), LlmError> {
        let template = self
            .get(id)
            .ok_or_else(|| LlmError::Config(format!("prompt template '{id}' not loaded")))?;
        let system = render_template(&template.system, vars);
        let user = render_template(&template.user, vars);
        Ok((system, user))
    }

    /// Number of loaded templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether no templates are loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
