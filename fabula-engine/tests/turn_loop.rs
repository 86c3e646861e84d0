//! Integration tests driving full turns through `StoryEngine` with scripted
//! collaborators: ordering of state changes, the player and unknown-name
//! skips, and the keep-going behavior on collaborator failures.

use std::collections::BTreeMap;
use std::sync::Mutex;

use fabula_core::{AppraisalUpdate, Character, CharacterSnapshot, TurnResult, World, WorldSnapshot};
use fabula_engine::scripted::QUIET_BEAT;
use fabula_engine::{
    Appraiser, EngineError, FailingAppraiser, FailingNarrator, ScriptedAppraiser,
    ScriptedNarrator, StoryEngine,
};
use serde_json::json;

fn character(name: &str) -> Character {
    Character::new(
        name,
        BTreeMap::from([("fear".to_string(), 0.5)]),
        BTreeMap::from([("station_safe".to_string(), 0.5)]),
        BTreeMap::from([(
            "task".to_string(),
            BTreeMap::from([("do_job".to_string(), 0.5)]),
        )]),
    )
}

fn station() -> World {
    World::new(
        "Mining station Erebus-9",
        "A maintenance android hides a broken airlock panel.",
        vec![character("Sid"), character("Raymond"), character("Bao")],
    )
    .expect("world builds")
}

fn beat(
    narrative: &str,
    actions: &[(&str, &str)],
    state: &[(&str, serde_json::Value)],
) -> TurnResult {
    TurnResult {
        narrative: narrative.to_string(),
        character_actions: actions
            .iter()
            .map(|(name, action)| ((*name).to_string(), (*action).to_string()))
            .collect(),
        world_state_updates: state
            .iter()
            .map(|(key, value)| ((*key).to_string(), value.clone()))
            .collect(),
    }
}

fn fear_spike() -> AppraisalUpdate {
    AppraisalUpdate {
        emotional_updates: BTreeMap::from([("fear".to_string(), 0.9)]),
        ..AppraisalUpdate::default()
    }
}

#[tokio::test]
async fn player_turn_applies_the_full_beat_in_order() {
    // 1. One beat: a state update plus a reaction from Raymond.
    let narrator = ScriptedNarrator::with_beats([beat(
        "Raymond rounds the corner just as the panel snaps back into place.",
        &[("Raymond", "Raymond narrows his eyes at Sid.")],
        &[("deck_three_panel", json!("concealed"))],
    )]);
    let appraiser = ScriptedAppraiser::with_update(fear_spike());
    let mut engine = StoryEngine::new(station(), "Sid", narrator, appraiser);

    // 2. Run the turn.
    let outcome = engine
        .player_turn("I hide the panel before anyone sees.")
        .await
        .expect("turn succeeds");

    // 3. Narrative comes back and Raymond was appraised.
    assert!(outcome.narrative.contains("snaps back into place"));
    assert_eq!(outcome.appraised, vec!["Raymond".to_string()]);

    // 4. World state merged, then history in input/narrative order.
    let world = engine.world();
    assert_eq!(world.state()["deck_three_panel"], json!("concealed"));
    assert_eq!(
        world.history(),
        &[
            "I hide the panel before anyone sees.".to_string(),
            "Raymond rounds the corner just as the panel snaps back into place.".to_string(),
        ]
    );

    // 5. The appraisal landed on Raymond.
    let raymond = world.character("Raymond").expect("in cast");
    assert_eq!(raymond.emotions()["fear"], 0.9);
}

#[tokio::test]
async fn player_character_is_never_appraised() {
    let narrator = ScriptedNarrator::with_beats([beat(
        "Sid freezes; Bao looks up from her console.",
        &[
            ("Sid", "Sid stands very still."),
            ("Bao", "Bao watches Sid with concern."),
        ],
        &[],
    )]);
    let appraiser = ScriptedAppraiser::with_update(fear_spike());
    let mut engine = StoryEngine::new(station(), "Sid", narrator, appraiser);

    let outcome = engine.player_turn("freeze").await.expect("turn succeeds");

    assert_eq!(outcome.appraised, vec!["Bao".to_string()]);
    // The appraiser was only ever asked about Bao.
    let seen = engine.appraiser().seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, "Bao");
    // Sid's state is exactly as seeded.
    let sid = engine.world().character("Sid").expect("in cast");
    assert_eq!(sid.emotions()["fear"], 0.5);
}

#[tokio::test]
async fn unknown_characters_are_skipped_with_the_rest_processed() {
    let narrator = ScriptedNarrator::with_beats([beat(
        "A voice crackles over the intercom.",
        &[
            ("Commander Vale", "Vale demands a status report."),
            ("Raymond", "Raymond mutes the intercom."),
        ],
        &[],
    )]);
    let appraiser = ScriptedAppraiser::new();
    let mut engine = StoryEngine::new(station(), "Sid", narrator, appraiser);

    let outcome = engine.player_turn("listen").await.expect("turn succeeds");

    // Only the known character is appraised; the ghost is ignored.
    assert_eq!(outcome.appraised, vec!["Raymond".to_string()]);
    assert!(engine.world().character("Commander Vale").is_none());
}

#[tokio::test]
async fn appraiser_sees_the_action_text_not_the_narrative() {
    let narrator = ScriptedNarrator::with_beats([beat(
        "The deck shudders and the lights stutter.",
        &[("Bao", "Bao grabs the rail.")],
        &[],
    )]);
    let appraiser = ScriptedAppraiser::new();
    let mut engine = StoryEngine::new(station(), "Sid", narrator, appraiser);

    engine.player_turn("brace").await.expect("turn succeeds");

    let seen = engine.appraiser().seen();
    assert_eq!(
        seen,
        vec![("Bao".to_string(), "Bao grabs the rail.".to_string())]
    );
}

#[tokio::test]
async fn npc_turn_adds_only_the_narrative_to_history() {
    let narrator = ScriptedNarrator::with_beats([beat(
        "Raymond files a quiet incident report.",
        &[("Raymond", "Raymond types at his terminal.")],
        &[("incident_logged", json!(true))],
    )]);
    let appraiser = ScriptedAppraiser::new();
    let mut engine = StoryEngine::new(station(), "Sid", narrator, appraiser);

    let outcome = engine.npc_turn().await.expect("turn succeeds");

    assert_eq!(outcome.narrative, "Raymond files a quiet incident report.");
    assert_eq!(
        engine.world().history(),
        &["Raymond files a quiet incident report.".to_string()]
    );
    assert_eq!(engine.world().state()["incident_logged"], json!(true));
}

#[tokio::test]
async fn failed_narration_leaves_the_world_untouched() {
    let mut engine = StoryEngine::new(station(), "Sid", FailingNarrator, ScriptedAppraiser::new());

    let result = engine.player_turn("open the hatch").await;
    assert!(result.is_err());

    assert!(engine.world().history().is_empty());
    assert!(engine.world().state().is_empty());

    // The session keeps working afterwards.
    let result = engine.npc_turn().await;
    assert!(result.is_err());
    assert!(engine.world().history().is_empty());
}

#[tokio::test]
async fn failed_appraisal_skips_the_character_but_keeps_the_turn() {
    let narrator = ScriptedNarrator::with_beats([beat(
        "Bao flinches at the alarm.",
        &[("Bao", "Bao drops her stylus.")],
        &[],
    )]);
    let mut engine = StoryEngine::new(station(), "Sid", narrator, FailingAppraiser);

    let outcome = engine
        .player_turn("sound the alarm")
        .await
        .expect("turn succeeds");

    // Turn applied: history and narrative are there.
    assert_eq!(engine.world().history().len(), 2);
    // But no character state changed and nobody counts as appraised.
    assert!(outcome.appraised.is_empty());
    let bao = engine.world().character("Bao").expect("in cast");
    assert_eq!(bao.emotions()["fear"], 0.5);
}

#[tokio::test]
async fn exhausted_script_yields_the_quiet_beat() {
    let narrator = ScriptedNarrator::new();
    let mut engine = StoryEngine::new(station(), "Sid", narrator, ScriptedAppraiser::new());

    let outcome = engine.player_turn("wait").await.expect("turn succeeds");

    assert_eq!(outcome.narrative, QUIET_BEAT);
    assert!(outcome.appraised.is_empty());
    assert_eq!(
        engine.world().history(),
        &["wait".to_string(), QUIET_BEAT.to_string()]
    );
}

#[tokio::test]
async fn intro_presents_setting_background_and_player() {
    let engine = StoryEngine::new(
        station(),
        "Sid",
        ScriptedNarrator::new(),
        ScriptedAppraiser::new(),
    );
    let intro = engine.intro();
    assert!(intro.contains("# Mining station Erebus-9"));
    assert!(intro.contains("broken airlock panel"));
    assert!(intro.contains("You are playing as Sid."));
}

/// Appraiser that records what Raymond's appraisal saw of Bao's fear, to
/// pin the fresh-snapshot-per-appraisal behavior.
#[derive(Default)]
struct SnoopingAppraiser {
    bao_fear_at_raymonds_turn: Mutex<Option<f32>>,
}

impl Appraiser for SnoopingAppraiser {
    async fn appraise(
        &self,
        character: &CharacterSnapshot,
        world: &WorldSnapshot,
        _action: &str,
    ) -> Result<AppraisalUpdate, EngineError> {
        if character.name == "Raymond" {
            let fear = world.characters["Bao"].emotions["fear"];
            *self.bao_fear_at_raymonds_turn.lock().unwrap() = Some(fear);
        }
        Ok(fear_spike())
    }
}

#[tokio::test]
async fn sequential_appraisals_observe_earlier_updates() {
    // Actions iterate in name order, so Bao is appraised before Raymond.
    // Raymond's appraisal must already see Bao's raised fear.
    let narrator = ScriptedNarrator::with_beats([beat(
        "Both crew members react.",
        &[
            ("Bao", "Bao backs away."),
            ("Raymond", "Raymond steps forward."),
        ],
        &[],
    )]);
    let mut engine = StoryEngine::new(station(), "Sid", narrator, SnoopingAppraiser::default());

    let outcome = engine
        .player_turn("reveal the damage")
        .await
        .expect("turn succeeds");

    assert_eq!(
        outcome.appraised,
        vec!["Bao".to_string(), "Raymond".to_string()]
    );
    let observed = engine
        .appraiser()
        .bao_fear_at_raymonds_turn
        .lock()
        .unwrap()
        .expect("Raymond was appraised");
    assert_eq!(
        observed, 0.9,
        "Raymond's appraisal saw Bao at stale fear {observed}"
    );
}
