//! Vaultchat REPL binary.
//!
//! A rustyline-based chat loop: player input is submitted to the
//! [`ConversationController`] on a background task, and transcript events
//! come back over an mpsc channel so the printer never blocks the prompt.

use std::borrow::Cow::{self, Borrowed, Owned};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result, anyhow};
use clap::Parser;
use colored::{Color, Colorize};
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use vaultchat_core::{
    CompletionGateway, ConversationController, InMemorySpeakerRegistry, Message, RenderObserver,
    SpeakerProfile, SpeakerRegistry, TranscriptRepository, TranscriptStore, VaultError,
};
use vaultchat_infrastructure::{JsonTranscriptRepository, TomlSpeakerProfileRepository};
use vaultchat_interaction::{OpenAiGateway, ScriptedGateway};

mod config;

use config::VaultchatConfig;

/// Survival vault chat REPL.
#[derive(Parser)]
#[command(name = "vaultchat", version, about = "Chat with a vault resident")]
struct Cli {
    /// Path to a config TOML (defaults to the platform config directory).
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Use the offline scripted gateway even when an API key is set.
    #[arg(long)]
    offline: bool,
}

/// CLI helper for rustyline that provides completion, highlighting, and hints.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        Self {
            commands: vec!["/history".to_string(), "/who".to_string()],
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with('/') {
            let candidates: Vec<Pair> = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd.clone(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

/// Transcript events routed from controller callbacks to the print loop.
enum UiEvent {
    Appended(Message),
    TurnFailed(VaultError),
    PersistFailed(VaultError),
}

/// Observer that forwards every callback onto the UI channel.
///
/// Callbacks fire on whichever task runs the turn, so the observer only
/// enqueues; all printing happens on the dedicated printer task.
struct ChannelObserver {
    tx: mpsc::UnboundedSender<UiEvent>,
}

impl RenderObserver for ChannelObserver {
    fn on_message_appended(&self, message: &Message) {
        let _ = self.tx.send(UiEvent::Appended(message.clone()));
    }

    fn on_turn_failed(&self, error: &VaultError) {
        let _ = self.tx.send(UiEvent::TurnFailed(error.clone()));
    }

    fn on_persist_failed(&self, error: &VaultError) {
        let _ = self.tx.send(UiEvent::PersistFailed(error.clone()));
    }
}

fn paint(text: &str, hint: &str, fallback: Color) -> colored::ColoredString {
    if hint.is_empty() {
        text.color(fallback)
    } else {
        text.color(Color::from(hint))
    }
}

fn print_message(message: &Message) {
    let profile = &message.speaker;
    let name = paint(&profile.name, &profile.name_color, Color::BrightMagenta);
    let text = paint(&message.raw_text, &profile.text_color, Color::White);
    println!("{}: {}", name.bold(), text);
}

/// Built-in profiles used when no speaker asset file exists yet.
fn default_profiles() -> Vec<SpeakerProfile> {
    let mut player = SpeakerProfile::new("YOU");
    player.name_color = "green".to_string();

    let mut marcus = SpeakerProfile::new("Marcus");
    marcus.backstory = "Vault engineer since the doors sealed; keeps the generator alive and \
                        remembers every resident's name"
        .to_string();
    marcus.personality = "dry, practical, quietly protective of the younger residents".to_string();
    marcus.permitted_actions =
        "repair machinery, ration supplies, share vault gossip".to_string();
    marcus.name_color = "cyan".to_string();

    vec![player, marcus]
}

fn load_profiles(config: &VaultchatConfig) -> Result<Vec<SpeakerProfile>> {
    let path = config.speakers_path()?;
    match TomlSpeakerProfileRepository::new(&path).load_all() {
        Ok(profiles) if !profiles.is_empty() => Ok(profiles),
        Ok(_) => {
            tracing::info!(path = %path.display(), "speaker asset file is empty, using built-ins");
            Ok(default_profiles())
        }
        Err(err) if err.is_io() => {
            tracing::info!(path = %path.display(), "no speaker asset file, using built-ins");
            Ok(default_profiles())
        }
        Err(err) => Err(err).context("failed to load speaker profiles"),
    }
}

fn build_gateway(config: &VaultchatConfig, offline: bool) -> Arc<dyn CompletionGateway> {
    if !offline {
        match OpenAiGateway::try_from_env() {
            Ok(gateway) => {
                let gateway = match &config.model {
                    Some(model) => gateway.with_model(model),
                    None => gateway,
                };
                return Arc::new(gateway);
            }
            Err(err) => {
                println!(
                    "{}",
                    format!("{err}; falling back to scripted replies.").yellow()
                );
            }
        }
    }
    Arc::new(ScriptedGateway::default())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = VaultchatConfig::load(cli.config).context("failed to load configuration")?;

    // ===== Backend Initialization =====
    let profiles = load_profiles(&config)?;
    let registry = InMemorySpeakerRegistry::from_profiles(profiles);
    let player = registry
        .resolve(&config.player)
        .ok_or_else(|| anyhow!("no speaker profile named '{}'", config.player))?;
    let npc = registry
        .resolve(&config.npc)
        .ok_or_else(|| anyhow!("no speaker profile named '{}'", config.npc))?;

    let repository: Arc<dyn TranscriptRepository> =
        Arc::new(JsonTranscriptRepository::new(config.transcript_path()?));
    let gateway = build_gateway(&config, cli.offline);

    let (tx, mut rx) = mpsc::unbounded_channel::<UiEvent>();
    let observer = Arc::new(ChannelObserver { tx });

    let controller = Arc::new(ConversationController::new(
        TranscriptStore::new(config.max_messages),
        repository,
        gateway,
        observer,
        player.clone(),
        npc.clone(),
        config.story.clone(),
    ));

    // Restore the previous session; a corrupt or unreadable transcript
    // starts fresh instead of aborting.
    match controller.load_history(&registry).await {
        Ok(count) if count > 0 => {
            println!("{}", format!("Restored {count} messages.").bright_black());
            for message in controller.messages().await {
                print_message(&message);
            }
        }
        Ok(_) => {}
        Err(err) => {
            eprintln!(
                "{}",
                format!("Could not restore the transcript ({err}); starting fresh.").yellow()
            );
        }
    }

    // Spawn the printer task: the single place transcript output happens.
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                UiEvent::Appended(message) => print_message(&message),
                UiEvent::TurnFailed(err) => {
                    eprintln!("{}", format!("The reply failed: {err}").red());
                }
                UiEvent::PersistFailed(err) => {
                    eprintln!("{}", format!("Could not save the transcript: {err}").yellow());
                }
            }
        }
    });

    // ===== REPL Setup =====
    let mut rl = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));

    println!("{}", "=== Vaultchat ===".bright_magenta().bold());
    println!(
        "{}",
        format!(
            "You are {}. Talk to {}. '/history' replays the log, 'quit' exits.",
            player.name, npc.name
        )
        .bright_black()
    );
    println!();

    // ===== Main REPL Loop =====
    loop {
        match rl.readline(">> ") {
            Ok(line) => {
                let trimmed = line.trim();

                if trimmed == "quit" || trimmed == "exit" {
                    println!("{}", "Goodbye!".bright_green());
                    break;
                }

                if trimmed.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(&line);

                if trimmed == "/history" {
                    for message in controller.messages().await {
                        print_message(&message);
                    }
                    continue;
                }

                if trimmed == "/who" {
                    for name in registry.names() {
                        println!("  {}", name.bright_cyan());
                    }
                    continue;
                }

                let controller = Arc::clone(&controller);
                let speaker = player.clone();
                let input = trimmed.to_string();

                // Run the turn in the background so the prompt stays live.
                tokio::spawn(async move {
                    if let Err(err) = controller.submit(&input, &speaker).await {
                        if err.is_busy() {
                            println!(
                                "{}",
                                "Still waiting on the last reply; try again in a moment."
                                    .yellow()
                            );
                        }
                        // Other failures reach the printer via the observer.
                    }
                });
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {err:?}").red());
                break;
            }
        }
    }

    // The observer's sender lives inside the controller; dropping our handle
    // lets the printer drain outstanding turns and exit.
    drop(controller);
    let _ = printer.await;

    Ok(())
}
