//! The `fabula` binary: interactive fiction at the terminal.
//!
//! Loads a scenario (a TOML file, or the builtin mining-station cast),
//! builds the world, and runs the turn loop against LLM collaborators or
//! the scripted ones when the provider is `"none"`. At the prompt, `state`
//! pretty-prints every character, and `quit` or `exit` ends the session.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use fabula_core::ScenarioConfig;
use fabula_engine::{
    Appraiser, LlmCollaborator, Narrator, ScriptedAppraiser, ScriptedNarrator, StoryEngine,
};
use fabula_llm::{LlmClient, LlmConfig, PromptLibrary};

/// Config file consulted when `--config` is not given.
const DEFAULT_CONFIG_PATH: &str = "fabula.toml";

#[derive(Parser)]
#[command(name = "fabula")]
#[command(about = "LLM-driven interactive fiction", version)]
struct Cli {
    /// Scenario TOML to play (builtin scenario when omitted)
    #[arg(short, long)]
    scenario: Option<PathBuf>,

    /// Configuration file (falls back to ./fabula.toml, then defaults)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Top-level configuration file. Currently a single `[llm]` table.
#[derive(Debug, Default, Deserialize)]
struct FabulaConfig {
    #[serde(default)]
    llm: LlmConfig,
}

/// Loads the configuration file.
///
/// An explicit `--config` path must exist and parse. Without one, a
/// `fabula.toml` in the working directory is used if present, and the
/// defaults otherwise.
fn load_config(path: Option<&Path>) -> Result<FabulaConfig> {
    let path = match path {
        Some(path) => path,
        None => {
            let fallback = Path::new(DEFAULT_CONFIG_PATH);
            if !fallback.exists() {
                return Ok(FabulaConfig::default());
            }
            fallback
        }
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = load_config(cli.config.as_deref())?;

    let scenario = match &cli.scenario {
        Some(path) => ScenarioConfig::from_file(path)
            .with_context(|| format!("loading scenario {}", path.display()))?,
        None => ScenarioConfig::builtin(),
    };
    let player = scenario.player.clone();
    let world = scenario.build_world().context("building the world")?;

    if config.llm.provider == "none" {
        info!("llm provider is \"none\", using scripted collaborators");
        let engine = StoryEngine::new(
            world,
            &player,
            ScriptedNarrator::new(),
            ScriptedAppraiser::new(),
        );
        run_session(engine).await
    } else {
        info!(
            provider = %config.llm.provider,
            model = %config.llm.model,
            "llm backend configured"
        );
        let client = LlmClient::new(&config.llm).context("configuring the llm client")?;
        let prompts = match &config.llm.prompts_dir {
            Some(dir) => PromptLibrary::from_directory(dir)
                .with_context(|| format!("loading prompts from {}", dir.display()))?,
            None => PromptLibrary::builtin(),
        };
        let collaborator =
            LlmCollaborator::new(client, prompts, &player).with_timeout(config.llm.timeout_ms);
        let engine = StoryEngine::new(world, &player, collaborator.clone(), collaborator);
        run_session(engine).await
    }
}

/// The interactive loop. Collaborator errors are reported and the session
/// keeps going; only I/O errors end it.
async fn run_session<N: Narrator, A: Appraiser>(mut engine: StoryEngine<N, A>) -> Result<()> {
    println!("{}", engine.intro());
    println!("(type `state` to inspect the cast, `quit` or `exit` to leave)");

    let stdin = io::stdin();
    let mut input = String::new();
    loop {
        print!("\n[{}] > ", engine.player());
        io::stdout().flush()?;

        input.clear();
        if stdin.read_line(&mut input)? == 0 {
            println!();
            break;
        }
        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        let lowered = line.to_lowercase();
        if lowered.contains("quit") || lowered.contains("exit") {
            println!("Ending the story. Thanks for playing!");
            break;
        }
        if lowered == "state" {
            for snapshot in engine.world().snapshot().characters.values() {
                println!("\n{snapshot}");
            }
            continue;
        }

        match engine.player_turn(line).await {
            Ok(outcome) => println!("\n{}", outcome.narrative),
            Err(err) => {
                eprintln!("Narration failed: {err}");
                continue;
            }
        }
        match engine.npc_turn().await {
            Ok(outcome) => println!("\n{}", outcome.narrative),
            Err(err) => eprintln!("NPC turn failed: {err}"),
        }
    }

    Ok(())
}
