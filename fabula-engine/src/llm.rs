//! LLM-backed collaborator implementations.
//!
//! One [`LlmCollaborator`] serves as both [`Narrator`] and [`Appraiser`]:
//! it renders the matching prompt template with pretty-printed snapshots,
//! makes a single completion call, and digs the JSON payload out of the
//! reply. The struct is cheap to clone (the HTTP client is shared), so the
//! same value can fill both collaborator slots of a session.

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use fabula_core::{AppraisalUpdate, CharacterSnapshot, TurnResult, WorldSnapshot};
use fabula_llm::{CompletionRequest, LlmClient, LlmError, PromptId, PromptLibrary, extract_json};

use crate::error::EngineError;
use crate::traits::{Appraiser, Narrator};

/// Narrator and appraiser backed by an [`LlmClient`].
#[derive(Clone)]
pub struct LlmCollaborator {
    client: LlmClient,
    prompts: PromptLibrary,
    player: String,
    timeout_ms: Option<u64>,
}

impl LlmCollaborator {
    /// Creates a collaborator for the given player character.
    ///
    /// The player name is used to pull the player's own snapshot out of the
    /// world when rendering the player-turn prompt.
    pub fn new(client: LlmClient, prompts: PromptLibrary, player: impl Into<String>) -> Self {
        Self {
            client,
            prompts,
            player: player.into(),
            timeout_ms: None,
        }
    }

    /// Overrides the transport default timeout for every call.
    #[must_use]
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    async fn complete_json<T: DeserializeOwned>(
        &self,
        id: PromptId,
        vars: &[(&str, &str)],
    ) -> Result<T, EngineError> {
        let template = self
            .prompts
            .get(id)
            .ok_or_else(|| LlmError::Config(format!("prompt template '{id}' not loaded")))?;
        let (system, user) = self.prompts.render(id, vars)?;

        let mut request = CompletionRequest::new(system, user)
            .with_max_tokens(template.max_tokens)
            .with_temperature(template.temperature);
        if let Some(timeout_ms) = self.timeout_ms {
            request = request.with_timeout(timeout_ms);
        }

        let response = self.client.complete(&request).await?;
        debug!(
            prompt = %id,
            latency_ms = response.latency_ms,
            tokens = response.tokens_generated,
            "completion finished"
        );
        extract_json(&response.text).map_err(|e| match e {
            LlmError::Parse(msg) => EngineError::Malformed(msg),
            other => EngineError::Llm(other),
        })
    }

    fn pretty<T: serde::Serialize>(value: &T) -> Result<String, EngineError> {
        serde_json::to_string_pretty(value).map_err(|e| EngineError::Serialization(e.to_string()))
    }

    fn player_state(&self, world: &WorldSnapshot) -> Result<String, EngineError> {
        match world.characters.get(&self.player) {
            Some(snapshot) => Self::pretty(snapshot),
            None => {
                warn!(player = %self.player, "player character missing from world snapshot");
                Ok("{}".to_string())
            }
        }
    }
}

impl Narrator for LlmCollaborator {
    async fn narrate(
        &self,
        world: &WorldSnapshot,
        player_input: &str,
    ) -> Result<TurnResult, EngineError> {
        let world_state = Self::pretty(world)?;
        let player_state = self.player_state(world)?;
        self.complete_json(
            PromptId::PlayerTurn,
            &[
                ("world_state", &world_state),
                ("player_state", &player_state),
                ("player_input", player_input),
            ],
        )
        .await
    }

    async fn npc_turn(&self, world: &WorldSnapshot) -> Result<TurnResult, EngineError> {
        let world_state = Self::pretty(world)?;
        self.complete_json(PromptId::NpcTurn, &[("world_state", &world_state)])
            .await
    }
}

impl Appraiser for LlmCollaborator {
    async fn appraise(
        &self,
        character: &CharacterSnapshot,
        world: &WorldSnapshot,
        action: &str,
    ) -> Result<AppraisalUpdate, EngineError> {
        let world_state = Self::pretty(world)?;
        let character_state = Self::pretty(character)?;
        self.complete_json(
            PromptId::Appraisal,
            &[
                ("world_state", &world_state),
                ("character_state", &character_state),
                ("action", action),
            ],
        )
        .await
    }
}
