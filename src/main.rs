//! SafeTutor - methodology-driven tutoring with a fail-closed safety pipeline
//!
//! Command-line front end: an interactive chat session, offline prompt
//! rendering, environment diagnostics and configuration display.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use safetutor::{
    config::{self, DeploymentMode, TutorConfig, SERVER_API_KEY_ENV},
    methodology,
    model::{GeminiClient, SamplingOverrides},
    notify::NotifyOutcome,
    prompt::{
        normalize_topics, PromptAssembler, PromptInputs, PromptSection, SectionMarkers, TemplateSource,
    },
    session::{Session, SessionDefaults, Turn},
    Error, TutorEngine, TutorSession,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use zeroize::Zeroizing;

#[derive(Parser)]
#[command(name = "safetutor")]
#[command(author = "A3S Lab Team")]
#[command(version)]
#[command(about = "Methodology-driven tutoring with a fail-closed safety pipeline")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "SAFETUTOR_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive tutoring session
    Chat {
        /// Model profile to use
        #[arg(short, long)]
        model: Option<String>,

        /// Methodology key
        #[arg(short, long)]
        subject: Option<String>,

        /// Initial study topics (comma separated)
        #[arg(short, long)]
        topics: Option<String>,
    },

    /// Render the system prompt without contacting the model
    Prompt {
        /// Methodology key
        #[arg(short, long, default_value = methodology::DEFAULT_METHODOLOGY)]
        subject: String,

        /// Study topics (comma separated)
        #[arg(short, long)]
        topics: Option<String>,

        /// Show the identity section instead of masking it
        #[arg(long)]
        full: bool,
    },

    /// Run diagnostics
    Doctor,

    /// Show configuration
    Config {
        /// Show default configuration
        #[arg(long)]
        default: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("safetutor={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    let config = TutorConfig::load_or_default(cli.config.as_deref()).with_context(|| match &cli.config {
        Some(path) => format!("failed to load {}", path.display()),
        None => "failed to load the default configuration file".to_string(),
    })?;

    match cli.command {
        Commands::Chat {
            model,
            subject,
            topics,
        } => {
            run_chat(config, model, subject, topics).await?;
        }
        Commands::Prompt {
            subject,
            topics,
            full,
        } => {
            render_prompt(&config, &subject, topics.as_deref(), full).await?;
        }
        Commands::Doctor => {
            run_doctor(&config).await?;
        }
        Commands::Config { default } => {
            show_config(if default { None } else { Some(&config) })?;
        }
    }

    Ok(())
}

const HELP: &str = "\
Commands:
  /topics <a, b, c>      set study topics (empty clears)
  /subject <key|auto>    switch methodology, or detect it from the chat
  /principles <k1,k2>    select pedagogical principles
  /custom <text>         set custom principles (empty clears)
  /section <name> <text> override identity, methodology or rules (no text clears)
  /params <k=v ...>      set temperature=<0-2> top_k=<n> (empty clears)
  /suggest               suggest topics for the current methodology
  /upload <path>         queue a file for analysis
  /process               analyse queued files
  /prompt                show the current system prompt
  /stats                 show security counters
  /reset                 start over
  /quit                  leave";

async fn run_chat(
    config: TutorConfig,
    model: Option<String>,
    subject: Option<String>,
    topics: Option<String>,
) -> Result<()> {
    let mode = TutorConfig::deployment_mode();
    let api_key = Zeroizing::new(match mode {
        DeploymentMode::Server => std::env::var(SERVER_API_KEY_ENV)?,
        DeploymentMode::UserKey => read_secret("API key: ").await?,
    });
    let client = GeminiClient::new(
        config.models.api_base_url.clone(),
        api_key.as_str(),
        Duration::from_secs(config.models.request_timeout_secs),
    )?;

    let engine = TutorEngine::from_config(config, mode, Arc::new(client)).await?;
    let mut ts = engine.start_session();
    if mode == DeploymentMode::UserKey {
        engine.set_api_key(&mut ts, &api_key);
    }
    drop(api_key);

    if let Some(model) = model {
        engine.set_model(&mut ts, &model);
    }
    if let Some(subject) = subject {
        engine.set_methodology(&mut ts, &subject)?;
    }
    if let Some(topics) = topics {
        engine.set_topics(&mut ts, &topics).await?;
    }
    engine.notify_changes(&mut ts).await;

    print_turns(&engine, &ts.session.history);
    println!("(type /help for commands)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::Write::flush(&mut std::io::stdout())?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let before = ts.session.history.len();
        if let Some(command) = line.strip_prefix('/') {
            if !run_command(&engine, &mut ts, command).await? {
                break;
            }
        } else {
            match engine.send_message(&mut ts, line).await {
                Ok(_) => {}
                Err(Error::Blocked { reason }) => println!("⚠ Message blocked: {}", reason),
                Err(e) => println!("✗ {}", e),
            }
        }
        // a reset shrinks the history; show it from the welcome turn
        let from = if ts.session.history.len() < before { 0 } else { before };
        print_turns(&engine, &ts.session.history[from..]);
    }

    Ok(())
}

/// Handle a slash command. Returns `false` when the session should end.
async fn run_command(engine: &TutorEngine, ts: &mut TutorSession, command: &str) -> Result<bool> {
    let (name, arg) = command
        .split_once(' ')
        .map(|(n, a)| (n, a.trim()))
        .unwrap_or((command, ""));

    let result: safetutor::Result<()> = match name {
        "quit" | "exit" => return Ok(false),
        "help" => {
            println!("{}", HELP);
            Ok(())
        }
        "topics" => engine.set_topics(ts, arg).await,
        "subject" => {
            let key = if arg == "auto" {
                engine.detect_subject(ts).await
            } else {
                arg
            };
            engine.set_methodology(ts, key)
        }
        "principles" => {
            let keys: Vec<&str> = arg
                .split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .collect();
            let custom = ts.session.custom_principles.clone();
            engine.set_principles(ts, keys, custom.as_deref()).await
        }
        "custom" => {
            let keys: Vec<String> = ts.session.principles.iter().cloned().collect();
            engine.set_principles(ts, keys, Some(arg)).await
        }
        "section" => {
            let (section, text) = arg.split_once(' ').unwrap_or((arg, ""));
            match section.parse::<PromptSection>() {
                Ok(section) => engine.set_prompt_section(ts, section, Some(text.trim())).await,
                Err(e) => Err(e),
            }
        }
        "params" => match arg.parse::<SamplingOverrides>() {
            Ok(overrides) => engine.set_generation_overrides(ts, overrides),
            Err(e) => Err(e),
        },
        "suggest" => {
            for topic in engine.suggest_topics(&ts.session.methodology).await {
                println!("  • {}", topic);
            }
            Ok(())
        }
        "upload" => {
            let path = PathBuf::from(arg);
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            match tokio::fs::read(&path).await {
                Ok(data) => {
                    println!("{:?}", engine.enqueue_artifact(ts, &name, data));
                    Ok(())
                }
                Err(e) => Err(e.into()),
            }
        }
        "process" => engine
            .process_artifacts(ts, |p| println!("  [{}/{}] {}", p.index + 1, p.total, p.name))
            .await
            .map(|report| {
                for failure in &report.failed {
                    println!("  ✗ {}: {}", failure.name, failure.error);
                }
                println!(
                    "  {} analysed, {} failed, {} skipped",
                    report.succeeded.len(),
                    report.failed.len(),
                    report.skipped.len()
                );
            }),
        "prompt" => {
            match engine.display_prompt(ts) {
                Some(prompt) => println!("{}", prompt),
                None => println!("(no system prompt; the template could not be used)"),
            }
            Ok(())
        }
        "stats" => {
            println!("{}", serde_json::to_string_pretty(&engine.guard_stats(ts))?);
            Ok(())
        }
        "reset" => {
            engine.reset(ts);
            Ok(())
        }
        other => {
            println!("Unknown command /{} (try /help)", other);
            Ok(())
        }
    };

    match result {
        Ok(()) => {
            if let NotifyOutcome::Failed(kind) = engine.notify_changes(ts).await {
                tracing::debug!(change = %kind, "No notification shown");
            }
        }
        Err(Error::Blocked { reason }) => println!("⚠ Blocked: {}", reason),
        Err(e) => println!("✗ {}", e),
    }
    Ok(true)
}

fn print_turns(engine: &TutorEngine, turns: &[Turn]) {
    for turn in turns {
        if turn.role == safetutor::session::TurnRole::Assistant {
            println!("\n{}\n", engine.render(&turn.text));
        }
    }
}

async fn read_secret(prompt: &str) -> Result<String> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(prompt.as_bytes()).await?;
    stdout.flush().await?;
    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
    let key = line.trim().to_string();
    anyhow::ensure!(!key.is_empty(), "an API key is required in user-key mode");
    Ok(key)
}

async fn render_prompt(config: &TutorConfig, subject: &str, topics: Option<&str>, full: bool) -> Result<()> {
    let markers = SectionMarkers::from_config(&config.prompt);
    let source = TemplateSource::load(&config.prompt.template_path, &markers).await;

    let mut session = Session::new(SessionDefaults::from_config(config, DeploymentMode::UserKey));
    session.methodology = methodology::methodology(subject).key.to_string();
    session.topics = topics.and_then(normalize_topics);

    let assembler = PromptAssembler::new(markers);
    let prompt = assembler.build(&source, &PromptInputs::from_session(&session))?;
    if full {
        println!("{}", prompt);
    } else {
        println!("{}", assembler.display_form(&prompt));
    }
    Ok(())
}

async fn run_doctor(config: &TutorConfig) -> Result<()> {
    println!("🔍 SafeTutor Doctor");
    println!();

    println!("Checking prompt template...");
    let markers = SectionMarkers::from_config(&config.prompt);
    match TemplateSource::load(&config.prompt.template_path, &markers).await {
        TemplateSource::Ready(template) => {
            println!("  ✓ Template loaded: {}", config.prompt.template_path.display());
            if !template.has_identity_section() {
                println!("  ℹ Identity section not found; identity overrides will fail");
            }
            if !template.has_rules_section() {
                println!("  ℹ Rules section not found; rules overrides will fail");
            }
        }
        TemplateSource::Invalid { reason } => {
            println!("  ✗ Template unusable: {}", reason);
        }
    }

    println!();
    println!("Checking API key...");
    match TutorConfig::deployment_mode() {
        DeploymentMode::Server => println!("  ✓ {} set (server mode)", SERVER_API_KEY_ENV),
        DeploymentMode::UserKey => println!("  ℹ {} not set; users bring their own key", SERVER_API_KEY_ENV),
    }

    println!();
    println!("Checking configuration...");
    match config::validate(config) {
        Ok(()) => println!("  ✓ Configuration valid"),
        Err(e) => println!("  ✗ {}", e),
    }
    if let Some(path) = config::default_config_path() {
        if path.exists() {
            println!("  ✓ Configuration file found: {}", path.display());
        } else {
            println!("  ℹ No configuration file found (using defaults)");
        }
    }

    println!();
    println!("Doctor check complete!");

    Ok(())
}

fn show_config(config: Option<&TutorConfig>) -> Result<()> {
    let config = config.cloned().unwrap_or_default();
    let toml = toml::to_string_pretty(&config)?;
    println!("{}", toml);
    Ok(())
}
