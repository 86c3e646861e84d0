//! Character state: emotions, beliefs, goals, and theory of mind.
//!
//! Every scalar in a character's state is a confidence/intensity value in
//! `[0.0, 1.0]`. Mutations go through [`Character::update_state`], which
//! assigns proposed new values clamped back into range, so state can never
//! drift outside the unit interval no matter what a collaborator proposes.

use std::collections::BTreeMap;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::update::AppraisalUpdate;

/// Half-width of the random perturbation applied when seeding a character's
/// theory of mind from their own beliefs.
pub const TOM_VARIATION: f32 = 0.2;

fn clamp01(value: f32) -> f32 {
    value.clamp(0.0, 1.0)
}

// ---------------------------------------------------------------------------
// Character
// ---------------------------------------------------------------------------

/// A single character's cognitive state.
///
/// Fields are private; reads go through the accessor methods and writes go
/// through [`update_state`](Self::update_state) so the clamping invariant
/// holds. Maps are `BTreeMap` so serialized snapshots are deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct Character {
    name: String,
    emotions: BTreeMap<String, f32>,
    beliefs: BTreeMap<String, f32>,
    theory_of_mind: BTreeMap<String, BTreeMap<String, f32>>,
    goals: BTreeMap<String, BTreeMap<String, f32>>,
}

impl Character {
    /// Creates a character with the given initial state.
    ///
    /// Initial emotion, belief, and goal values are clamped to `[0.0, 1.0]`.
    /// Theory of mind starts empty; seed it with
    /// [`initialize_theory_of_mind`](Self::initialize_theory_of_mind) once the
    /// full cast is known.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        emotions: BTreeMap<String, f32>,
        beliefs: BTreeMap<String, f32>,
        goals: BTreeMap<String, BTreeMap<String, f32>>,
    ) -> Self {
        Self {
            name: name.into(),
            emotions: emotions.into_iter().map(|(k, v)| (k, clamp01(v))).collect(),
            beliefs: beliefs.into_iter().map(|(k, v)| (k, clamp01(v))).collect(),
            theory_of_mind: BTreeMap::new(),
            goals: goals
                .into_iter()
                .map(|(category, goals)| {
                    let goals = goals.into_iter().map(|(k, v)| (k, clamp01(v))).collect();
                    (category, goals)
                })
                .collect(),
        }
    }

    /// The character's unique name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current emotion intensities.
    #[must_use]
    pub fn emotions(&self) -> &BTreeMap<String, f32> {
        &self.emotions
    }

    /// Current belief confidences.
    #[must_use]
    pub fn beliefs(&self) -> &BTreeMap<String, f32> {
        &self.beliefs
    }

    /// What this character believes each *other* character believes.
    #[must_use]
    pub fn theory_of_mind(&self) -> &BTreeMap<String, BTreeMap<String, f32>> {
        &self.theory_of_mind
    }

    /// Current goal priorities, grouped by category (e.g. "task",
    /// "emotional").
    #[must_use]
    pub fn goals(&self) -> &BTreeMap<String, BTreeMap<String, f32>> {
        &self.goals
    }

    // -----------------------------------------------------------------------
    // Updates
    // -----------------------------------------------------------------------

    /// Applies one appraisal's proposed values across all four state maps.
    ///
    /// Each map in `update` may be empty; an empty map leaves that part of
    /// the state untouched. Values land through the clamped setters below,
    /// so out-of-range proposals saturate at the bounds instead of failing.
    /// One asymmetry is preserved on purpose: a brand-new emotion key is
    /// inserted with its raw value, unclamped, while everything else clamps
    /// on both the insert and overwrite paths. See
    /// `new_emotion_key_is_inserted_verbatim` for the pinned behavior.
    pub fn update_state(&mut self, update: &AppraisalUpdate) {
        for (emotion, value) in &update.emotional_updates {
            self.update_emotion(emotion.clone(), *value);
        }
        for (belief, value) in &update.belief_updates {
            self.update_belief(belief.clone(), *value);
        }
        for (other, beliefs) in &update.theory_of_mind_updates {
            for (belief, value) in beliefs {
                self.update_theory_of_mind(other.clone(), belief.clone(), *value);
            }
        }
        for (category, goals) in &update.goal_updates {
            for (goal, value) in goals {
                self.update_goal(category.clone(), goal.clone(), *value);
            }
        }
    }

    /// Existing emotions are set to the clamped value; a new key is inserted
    /// verbatim.
    fn update_emotion(&mut self, emotion: impl Into<String>, value: f32) {
        let emotion = emotion.into();
        match self.emotions.get_mut(&emotion) {
            Some(slot) => *slot = clamp01(value),
            None => {
                self.emotions.insert(emotion, value);
            }
        }
    }

    /// Beliefs clamp on both the insert and overwrite paths.
    fn update_belief(&mut self, belief: impl Into<String>, value: f32) {
        self.beliefs.insert(belief.into(), clamp01(value));
    }

    /// The nested map for `category` is created on first use.
    fn update_goal(&mut self, category: impl Into<String>, goal: impl Into<String>, value: f32) {
        self.goals
            .entry(category.into())
            .or_default()
            .insert(goal.into(), clamp01(value));
    }

    /// The nested map for `other` is created on first use.
    fn update_theory_of_mind(
        &mut self,
        other: impl Into<String>,
        belief: impl Into<String>,
        value: f32,
    ) {
        self.theory_of_mind
            .entry(other.into())
            .or_default()
            .insert(belief.into(), clamp01(value));
    }

    /// Seeds theory of mind for every other character in the cast.
    ///
    /// For each name in `cast` other than this character's own, the nested
    /// map is reset and filled with this character's own beliefs, each
    /// perturbed by a uniform random offset in `[-TOM_VARIATION,
    /// TOM_VARIATION]` and clamped. Characters start out assuming others
    /// roughly share their view of the world.
    pub fn initialize_theory_of_mind<S: AsRef<str>>(&mut self, cast: &[S], rng: &mut impl Rng) {
        for other in cast {
            let other = other.as_ref();
            if other == self.name {
                continue;
            }
            let projected = self.theory_of_mind.entry(other.to_string()).or_default();
            projected.clear();
            for (belief, value) in &self.beliefs {
                let variation = rng.gen_range(-TOM_VARIATION..=TOM_VARIATION);
                projected.insert(belief.clone(), clamp01(value + variation));
            }
        }
    }

    /// Returns an owned, serializable copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> CharacterSnapshot {
        CharacterSnapshot {
            name: self.name.clone(),
            emotions: self.emotions.clone(),
            beliefs: self.beliefs.clone(),
            theory_of_mind: self.theory_of_mind.clone(),
            goals: self.goals.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Point-in-time copy of a character's state, for prompts and display.
///
/// Snapshots are the serialization boundary: they can be rendered to JSON
/// for a collaborator prompt or shown to the player, but they never flow
/// back into a [`Character`] directly, so deserialization cannot bypass the
/// clamping invariant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CharacterSnapshot {
    /// Character name.
    pub name: String,
    /// Emotion intensities at snapshot time.
    pub emotions: BTreeMap<String, f32>,
    /// Belief confidences at snapshot time.
    pub beliefs: BTreeMap<String, f32>,
    /// Nested beliefs-about-others at snapshot time.
    pub theory_of_mind: BTreeMap<String, BTreeMap<String, f32>>,
    /// Goal priorities by category at snapshot time.
    pub goals: BTreeMap<String, BTreeMap<String, f32>>,
}

impl fmt::Display for CharacterSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string_pretty(self).map_err(|_| fmt::Error)?;
        write!(f, "{json}")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn sid() -> Character {
        Character::new(
            "Sid",
            BTreeMap::from([("fear".to_string(), 0.5), ("curiosity".to_string(), 0.9)]),
            BTreeMap::from([("malfunction".to_string(), 0.8), ("hiding".to_string(), 0.0)]),
            BTreeMap::from([(
                "task".to_string(),
                BTreeMap::from([("stay_hidden".to_string(), 0.9)]),
            )]),
        )
    }

    #[test]
    fn new_clamps_initial_values() {
        let c = Character::new(
            "Test",
            BTreeMap::from([("joy".to_string(), 1.7)]),
            BTreeMap::from([("doomed".to_string(), -0.4)]),
            BTreeMap::from([(
                "task".to_string(),
                BTreeMap::from([("escape".to_string(), 2.0)]),
            )]),
        );
        assert_eq!(c.emotions()["joy"], 1.0);
        assert_eq!(c.beliefs()["doomed"], 0.0);
        assert_eq!(c.goals()["task"]["escape"], 1.0);
    }

    #[test]
    fn update_emotion_sets_and_clamps_existing_keys() {
        let mut c = sid();
        c.update_emotion("curiosity", 0.2);
        assert_eq!(c.emotions()["curiosity"], 0.2);
        c.update_emotion("curiosity", 1.5);
        assert_eq!(c.emotions()["curiosity"], 1.0);
        c.update_emotion("fear", -0.9);
        assert_eq!(c.emotions()["fear"], 0.0);
    }

    #[test]
    fn new_emotion_key_is_inserted_verbatim() {
        let mut c = sid();
        c.update_emotion("dread", -0.3);
        assert_eq!(c.emotions()["dread"], -0.3);
        c.update_emotion("awe", 1.4);
        assert_eq!(c.emotions()["awe"], 1.4);
        // Updates to the now-existing key clamp as usual.
        c.update_emotion("awe", 1.2);
        assert_eq!(c.emotions()["awe"], 1.0);
    }

    #[test]
    fn update_belief_clamps_new_and_existing_keys() {
        let mut c = sid();
        c.update_belief("malfunction", 0.3);
        assert_eq!(c.beliefs()["malfunction"], 0.3);
        c.update_belief("station_safe", -0.6);
        assert_eq!(c.beliefs()["station_safe"], 0.0);
        c.update_belief("rescue_coming", 1.8);
        assert_eq!(c.beliefs()["rescue_coming"], 1.0);
    }

    #[test]
    fn update_goal_sets_and_clamps() {
        let mut c = sid();
        c.update_goal("task", "stay_hidden", 0.7);
        assert_eq!(c.goals()["task"]["stay_hidden"], 0.7);
        c.update_goal("task", "stay_hidden", 1.8);
        assert_eq!(c.goals()["task"]["stay_hidden"], 1.0);
    }

    #[test]
    fn update_goal_creates_missing_category() {
        let mut c = sid();
        c.update_goal("emotional", "find_allies", 1.4);
        assert_eq!(c.goals()["emotional"]["find_allies"], 1.0);
        assert!(c.goals()["task"].contains_key("stay_hidden"));
    }

    #[test]
    fn theory_of_mind_creates_nested_map() {
        let mut c = sid();
        c.update_theory_of_mind("Raymond", "Sid hiding", 0.6);
        assert_eq!(c.theory_of_mind()["Raymond"]["Sid hiding"], 0.6);
        c.update_theory_of_mind("Raymond", "Sid hiding", 1.5);
        assert_eq!(c.theory_of_mind()["Raymond"]["Sid hiding"], 1.0);
    }

    #[test]
    fn update_state_applies_all_four_maps() {
        let mut c = sid();
        c.update_state(&AppraisalUpdate {
            emotional_updates: BTreeMap::from([("fear".to_string(), 0.9)]),
            belief_updates: BTreeMap::from([("malfunction".to_string(), 0.95)]),
            theory_of_mind_updates: BTreeMap::from([(
                "Raymond".to_string(),
                BTreeMap::from([("Sid hiding".to_string(), 0.7)]),
            )]),
            goal_updates: BTreeMap::from([(
                "task".to_string(),
                BTreeMap::from([("stay_hidden".to_string(), 1.0)]),
            )]),
            appraisal_explanation: None,
        });
        assert_eq!(c.emotions()["fear"], 0.9);
        assert_eq!(c.beliefs()["malfunction"], 0.95);
        assert_eq!(c.theory_of_mind()["Raymond"]["Sid hiding"], 0.7);
        assert_eq!(c.goals()["task"]["stay_hidden"], 1.0);
    }

    #[test]
    fn update_state_with_empty_maps_is_a_no_op() {
        let mut c = sid();
        let before = serde_json::to_string(&c.snapshot()).expect("serialize");
        c.update_state(&AppraisalUpdate::default());
        let after = serde_json::to_string(&c.snapshot()).expect("serialize");
        assert_eq!(before, after);
    }

    #[test]
    fn initialize_theory_of_mind_skips_self_and_stays_in_range() {
        let mut c = sid();
        let cast = ["Sid".to_string(), "Raymond".to_string(), "Bao".to_string()];
        let mut rng = StdRng::seed_from_u64(7);
        c.initialize_theory_of_mind(&cast, &mut rng);

        assert!(!c.theory_of_mind().contains_key("Sid"));
        for other in ["Raymond", "Bao"] {
            let projected = &c.theory_of_mind()[other];
            assert_eq!(projected.len(), c.beliefs().len());
            for (belief, value) in projected {
                assert!(
                    (0.0..=1.0).contains(value),
                    "{other} -> {belief} out of range: {value}"
                );
            }
        }
    }

    #[test]
    fn seeded_estimates_stay_near_the_base_belief() {
        for seed in 0..32 {
            let mut c = Character::new(
                "Sid",
                BTreeMap::new(),
                BTreeMap::from([("trust".to_string(), 0.5), ("doom".to_string(), 0.95)]),
                BTreeMap::new(),
            );
            let cast = ["Sid".to_string(), "Bao".to_string()];
            let mut rng = StdRng::seed_from_u64(seed);
            c.initialize_theory_of_mind(&cast, &mut rng);

            let trust = c.theory_of_mind()["Bao"]["trust"];
            assert!(
                (trust - 0.5).abs() <= TOM_VARIATION + 1e-6,
                "seed {seed}: trust estimate {trust} strayed from the base"
            );
            let doom = c.theory_of_mind()["Bao"]["doom"];
            assert!(doom <= 1.0, "seed {seed}: doom estimate {doom} above 1");
            assert!(doom >= 0.95 - TOM_VARIATION - 1e-6);
        }
    }

    #[test]
    fn initialize_theory_of_mind_resets_stale_projections() {
        let mut c = sid();
        c.update_theory_of_mind("Raymond", "old_rumor", 0.5);
        let cast = ["Sid".to_string(), "Raymond".to_string()];
        let mut rng = StdRng::seed_from_u64(7);
        c.initialize_theory_of_mind(&cast, &mut rng);
        assert!(!c.theory_of_mind()["Raymond"].contains_key("old_rumor"));
    }

    #[test]
    fn snapshot_serializes_deterministically() {
        let c = sid();
        let a = serde_json::to_string(&c.snapshot()).expect("serialize");
        let b = serde_json::to_string(&c.snapshot()).expect("serialize");
        assert_eq!(a, b);
        // BTreeMap ordering: "curiosity" before "fear".
        let curiosity = a.find("curiosity").expect("curiosity present");
        let fear = a.find("fear").expect("fear present");
        assert!(curiosity < fear);
    }

    #[test]
    fn snapshot_display_is_pretty_json() {
        let shown = sid().snapshot().to_string();
        assert!(shown.contains("\"name\": \"Sid\""));
        assert!(shown.contains('\n'));
        let parsed: serde_json::Value = serde_json::from_str(&shown).expect("valid json");
        assert_eq!(parsed["name"], "Sid");
    }
}
