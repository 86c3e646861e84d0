//! Inbound update payloads proposed by collaborators.
//!
//! These are the deserialization targets for collaborator output. Sections a
//! collaborator omits default to empty, with one exception: a turn with no
//! narrative is a parse failure, not a silent blank, so a malformed response
//! leaves the world untouched.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Proposed new state values for a single character, from an appraisal pass.
///
/// Each number is the proposed new value, not an offset; applying them
/// through the `Character` update methods clamps on assignment.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppraisalUpdate {
    /// New emotion intensities keyed by emotion name.
    #[serde(default)]
    pub emotional_updates: BTreeMap<String, f32>,
    /// New belief confidences keyed by belief name.
    #[serde(default)]
    pub belief_updates: BTreeMap<String, f32>,
    /// New believed values keyed by other-character name, then belief.
    #[serde(default)]
    pub theory_of_mind_updates: BTreeMap<String, BTreeMap<String, f32>>,
    /// New goal priorities keyed by goal category, then goal name.
    #[serde(default)]
    pub goal_updates: BTreeMap<String, BTreeMap<String, f32>>,
    /// Free-text rationale for the changes, for logging only.
    #[serde(default)]
    pub appraisal_explanation: Option<String>,
}

/// A narrator's response to one turn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TurnResult {
    /// Narrative prose describing what happens. Required.
    pub narrative: String,
    /// What each named character visibly does, keyed by character name.
    #[serde(default)]
    pub character_actions: BTreeMap<String, String>,
    /// Facts to merge into the shared world state.
    #[serde(default)]
    pub world_state_updates: BTreeMap<String, serde_json::Value>,
}
