//! The story session: world ownership and the turn loop.
//!
//! `StoryEngine` is the single writer of world state. A turn always runs in
//! the same order: narrate, merge world-state updates, append history, then
//! appraise each acting character against a fresh snapshot, so later
//! appraisals observe earlier characters' changes.

use std::fmt;

use tracing::{debug, info, warn};
use uuid::Uuid;

use fabula_core::{AppraisalUpdate, TurnResult, World};

use crate::error::EngineError;
use crate::traits::{Appraiser, Narrator};

/// Identifier attached to every log line of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionId(Uuid);

impl SessionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What one processed turn produced.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// Narrative prose for the player.
    pub narrative: String,
    /// Characters whose state changed through appraisal this turn.
    pub appraised: Vec<String>,
}

/// Drives a story session: owns the world and routes collaborator calls.
pub struct StoryEngine<N, A> {
    world: World,
    player: String,
    narrator: N,
    appraiser: A,
    session_id: SessionId,
}

impl<N: Narrator, A: Appraiser> StoryEngine<N, A> {
    /// Creates a session over `world` with the given collaborators.
    pub fn new(world: World, player: impl Into<String>, narrator: N, appraiser: A) -> Self {
        let session_id = SessionId::new();
        let player = player.into();
        info!(session = %session_id, %player, cast = world.characters().len(), "session started");
        Self {
            world,
            player,
            narrator,
            appraiser,
            session_id,
        }
    }

    /// The world as it currently stands.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Name of the character the player controls.
    pub fn player(&self) -> &str {
        &self.player
    }

    /// The appraiser collaborator.
    pub fn appraiser(&self) -> &A {
        &self.appraiser
    }

    /// This session's identifier.
    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// The opening text block: setting, background, and player billing.
    pub fn intro(&self) -> String {
        format!(
            "# {}\n\n{}\n\nYou are playing as {}.",
            self.world.setting(),
            self.world.background(),
            self.player
        )
    }

    /// Processes one player action.
    ///
    /// On narrator failure nothing is applied and the error propagates; the
    /// caller reports it and the session stays usable.
    pub async fn player_turn(&mut self, input: &str) -> Result<TurnOutcome, EngineError> {
        let result = self.narrator.narrate(&self.world.snapshot(), input).await?;
        debug!(
            session = %self.session_id,
            actions = result.character_actions.len(),
            state_updates = result.world_state_updates.len(),
            "player turn narrated"
        );
        self.world.update_world_state(result.world_state_updates.clone());
        self.world.add_to_history(input);
        self.world.add_to_history(result.narrative.clone());
        let appraised = self.appraise_actions(&result).await;
        Ok(TurnOutcome {
            narrative: result.narrative,
            appraised,
        })
    }

    /// Lets the non-player characters act, with no player input in between.
    ///
    /// Identical to a player turn except that only the narrative is added
    /// to history.
    pub async fn npc_turn(&mut self) -> Result<TurnOutcome, EngineError> {
        let result = self.narrator.npc_turn(&self.world.snapshot()).await?;
        debug!(
            session = %self.session_id,
            actions = result.character_actions.len(),
            state_updates = result.world_state_updates.len(),
            "npc turn narrated"
        );
        self.world.update_world_state(result.world_state_updates.clone());
        self.world.add_to_history(result.narrative.clone());
        let appraised = self.appraise_actions(&result).await;
        Ok(TurnOutcome {
            narrative: result.narrative,
            appraised,
        })
    }

    /// Appraises every acting character in `result`, skipping the player
    /// and unknown names. Each appraisal sees the world as left by the
    /// previous one. A failed appraisal leaves that character unchanged.
    async fn appraise_actions(&mut self, result: &TurnResult) -> Vec<String> {
        let mut appraised = Vec::new();
        for (name, action) in &result.character_actions {
            if *name == self.player {
                debug!(
                    session = %self.session_id,
                    character = %name,
                    "player acts for themselves; skipping appraisal"
                );
                continue;
            }
            let Some(character) = self.world.character(name) else {
                warn!(
                    session = %self.session_id,
                    character = %name,
                    "narrator referenced an unknown character"
                );
                continue;
            };
            let character_snapshot = character.snapshot();
            let world_snapshot = self.world.snapshot();
            match self
                .appraiser
                .appraise(&character_snapshot, &world_snapshot, action)
                .await
            {
                Ok(update) => {
                    self.apply_update(name, &update);
                    appraised.push(name.clone());
                }
                Err(e) => {
                    warn!(
                        session = %self.session_id,
                        character = %name,
                        error = %e,
                        "appraisal failed; leaving character unchanged"
                    );
                }
            }
        }
        appraised
    }

    fn apply_update(&mut self, name: &str, update: &AppraisalUpdate) {
        let Some(character) = self.world.character_mut(name) else {
            return;
        };
        character.update_state(update);
        if let Some(explanation) = &update.appraisal_explanation {
            debug!(
                session = %self.session_id,
                character = %name,
                %explanation,
                "appraisal applied"
            );
        }
    }
}
