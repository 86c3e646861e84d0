//! Deterministic collaborators for tests and offline sessions.
//!
//! When no LLM provider is configured the CLI runs on these: the narrator
//! replays a queue of prepared beats, and the appraiser applies a fixed
//! update while recording everything it was asked to judge.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use fabula_core::{AppraisalUpdate, CharacterSnapshot, TurnResult, WorldSnapshot};

use crate::error::EngineError;
use crate::traits::{Appraiser, Narrator};

/// Narration used when a scripted queue runs dry.
pub const QUIET_BEAT: &str = "The moment passes quietly; nothing changes.";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// ScriptedNarrator
// ---------------------------------------------------------------------------

/// Narrator that replays a fixed queue of beats.
///
/// Player and NPC turns pull from the same queue in order. An exhausted
/// queue yields [`QUIET_BEAT`] with no side effects rather than an error.
#[derive(Default)]
pub struct ScriptedNarrator {
    beats: Mutex<VecDeque<TurnResult>>,
}

impl ScriptedNarrator {
    /// Creates a narrator with an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a narrator preloaded with beats.
    pub fn with_beats(beats: impl IntoIterator<Item = TurnResult>) -> Self {
        Self {
            beats: Mutex::new(beats.into_iter().collect()),
        }
    }

    /// Queues another beat.
    pub fn push(&self, beat: TurnResult) {
        lock(&self.beats).push_back(beat);
    }

    fn next_beat(&self) -> TurnResult {
        lock(&self.beats).pop_front().unwrap_or_else(|| TurnResult {
            narrative: QUIET_BEAT.to_string(),
            character_actions: BTreeMap::new(),
            world_state_updates: BTreeMap::new(),
        })
    }
}

impl Narrator for ScriptedNarrator {
    async fn narrate(
        &self,
        _world: &WorldSnapshot,
        _player_input: &str,
    ) -> Result<TurnResult, EngineError> {
        Ok(self.next_beat())
    }

    async fn npc_turn(&self, _world: &WorldSnapshot) -> Result<TurnResult, EngineError> {
        Ok(self.next_beat())
    }
}

// ---------------------------------------------------------------------------
// ScriptedAppraiser
// ---------------------------------------------------------------------------

/// Appraiser that returns a fixed update and records what it saw.
#[derive(Default)]
pub struct ScriptedAppraiser {
    update: AppraisalUpdate,
    seen: Mutex<Vec<(String, String)>>,
}

impl ScriptedAppraiser {
    /// Creates an appraiser that proposes no changes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an appraiser that proposes `update` for every character.
    #[must_use]
    pub fn with_update(update: AppraisalUpdate) -> Self {
        Self {
            update,
            seen: Mutex::new(Vec::new()),
        }
    }

    /// The `(character, action)` pairs appraised so far, in call order.
    #[must_use]
    pub fn seen(&self) -> Vec<(String, String)> {
        lock(&self.seen).clone()
    }
}

impl Appraiser for ScriptedAppraiser {
    async fn appraise(
        &self,
        character: &CharacterSnapshot,
        _world: &WorldSnapshot,
        action: &str,
    ) -> Result<AppraisalUpdate, EngineError> {
        lock(&self.seen).push((character.name.clone(), action.to_string()));
        Ok(self.update.clone())
    }
}

// ---------------------------------------------------------------------------
// Failing collaborators
// ---------------------------------------------------------------------------

/// Appraiser that always fails, for exercising the skip-and-continue policy.
#[derive(Debug, Default)]
pub struct FailingAppraiser;

impl Appraiser for FailingAppraiser {
    async fn appraise(
        &self,
        _character: &CharacterSnapshot,
        _world: &WorldSnapshot,
        _action: &str,
    ) -> Result<AppraisalUpdate, EngineError> {
        Err(EngineError::Malformed(
            "scripted appraisal failure".to_string(),
        ))
    }
}

/// Narrator that always fails.
#[derive(Debug, Default)]
pub struct FailingNarrator;

impl Narrator for FailingNarrator {
    async fn narrate(
        &self,
        _world: &WorldSnapshot,
        _player_input: &str,
    ) -> Result<TurnResult, EngineError> {
        Err(EngineError::Malformed(
            "scripted narration failure".to_string(),
        ))
    }

    async fn npc_turn(&self, _world: &WorldSnapshot) -> Result<TurnResult, EngineError> {
        Err(EngineError::Malformed(
            "scripted narration failure".to_string(),
        ))
    }
}
