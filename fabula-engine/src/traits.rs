//! Collaborator interfaces for narration and appraisal.
//!
//! The engine reaches its model-backed collaborators only through these two
//! traits. Tests drive full turns with the scripted implementations in
//! [`crate::scripted`]; production sessions use [`crate::llm::LlmCollaborator`].

use fabula_core::{AppraisalUpdate, CharacterSnapshot, TurnResult, WorldSnapshot};

use crate::error::EngineError;

/// Proposes per-character state changes in response to an observed action.
#[allow(async_fn_in_trait)]
pub trait Appraiser {
    /// Appraises `action` from `character`'s perspective, given the world
    /// as it stands at the moment of appraisal.
    async fn appraise(
        &self,
        character: &CharacterSnapshot,
        world: &WorldSnapshot,
        action: &str,
    ) -> Result<AppraisalUpdate, EngineError>;
}

/// Produces narrative beats and their side effects.
#[allow(async_fn_in_trait)]
pub trait Narrator {
    /// Narrates the consequences of the player's input.
    async fn narrate(
        &self,
        world: &WorldSnapshot,
        player_input: &str,
    ) -> Result<TurnResult, EngineError>;

    /// Narrates what the non-player characters do next, with no player
    /// action in between.
    async fn npc_turn(&self, world: &WorldSnapshot) -> Result<TurnResult, EngineError>;
}
