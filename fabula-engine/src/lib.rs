//! # fabula-engine: the Fabula turn loop
//!
//! Orchestrates a story session: the [`StoryEngine`] owns the world, calls
//! its [`Narrator`] and [`Appraiser`] collaborators, and applies their
//! proposals through the clamped update methods of `fabula-core`. The
//! collaborators are trait parameters, so the same loop runs against the
//! LLM-backed implementations or the scripted ones used offline and in
//! tests. Collaborator failures are never fatal: a bad narration changes
//! nothing, a bad appraisal skips one character, and the session continues.

pub mod error;
pub mod llm;
pub mod scripted;
pub mod session;
pub mod traits;

pub use error::EngineError;
pub use llm::LlmCollaborator;
pub use scripted::{FailingAppraiser, FailingNarrator, ScriptedAppraiser, ScriptedNarrator};
pub use session::{SessionId, StoryEngine, TurnOutcome};
pub use traits::{Appraiser, Narrator};
