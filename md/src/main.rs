//! Mentord - goal-tracking coach daemon
//!
//! CLI entry point: serve the HTTP API, or poke the store and coach
//! directly from the terminal.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{CommandFactory, Parser};
use eyre::{Context, Result};
use goalstore::Store;
use tokio::sync::Mutex;
use tracing::info;

use mentord::cli::{Cli, Command};
use mentord::coach::{Coach, HistoryTurn};
use mentord::config::Config;
use mentord::defaults::default_domains;
use mentord::llm::{LlmClient, create_client};
use mentord::prayer::PrayerService;
use mentord::prompts::PromptLoader;
use mentord::server::{AppState, serve};

fn setup_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    match cli.command {
        Some(Command::Serve { port }) => cmd_serve(&config, port).await,
        Some(Command::Chat { message }) => cmd_chat(&config, &message).await,
        Some(Command::Domains) => cmd_domains(&config),
        Some(Command::Reset) => cmd_reset(&config),
        Some(Command::Status) => cmd_status(&config),
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Command implementations
// ---------------------------------------------------------------------------

async fn cmd_serve(config: &Config, port: Option<u16>) -> Result<()> {
    let store = bootstrap_store(config)?;
    let coach = build_coach(config, store.clone())?;
    let prayer = Arc::new(PrayerService::new(&config.prayer));

    let ai_mode = config.llm.is_configured();
    info!(
        mode = if ai_mode { "ai" } else { "fallback" },
        model = %config.llm.model,
        "starting mentord"
    );

    let state = AppState {
        store,
        coach,
        prayer,
        ai_mode,
        history_limit: config.chat.history_limit,
    };

    let port = port.unwrap_or(config.server.port);
    serve(state, &config.server.bind, port).await
}

async fn cmd_chat(config: &Config, message: &str) -> Result<()> {
    let store = bootstrap_store(config)?;
    let coach = build_coach(config, store.clone())?;

    let (domains, history) = {
        let store = store.lock().await;
        let domains = store.domains()?;
        let history: Vec<HistoryTurn> = store
            .chat_history(config.chat.history_window)?
            .iter()
            .map(HistoryTurn::from)
            .collect();
        (domains, history)
    };

    let outcome = coach
        .chat(message, &domains, &history)
        .await
        .context("Chat failed")?;

    println!("{}", outcome.reply);
    for update in &outcome.progress_updates {
        println!("  → {} set to {}%", update.id, update.progress);
    }

    Ok(())
}

fn cmd_domains(config: &Config) -> Result<()> {
    let store = open_store(config)?;
    let domains = store.domains()?;

    if domains.is_empty() {
        println!("No domains yet. Run `md serve` or `md chat` once to seed defaults.");
        return Ok(());
    }

    for d in domains {
        println!(
            "{} {:<20} {:>3}%  {:>4}d  {:<8}  {}",
            d.icon, d.label, d.progress, d.days, d.urgency.to_string(), d.status
        );
    }
    Ok(())
}

fn cmd_reset(config: &Config) -> Result<()> {
    let store = open_store(config)?;
    store.reset_all()?;
    println!("All progress reset to 0.");
    Ok(())
}

fn cmd_status(config: &Config) -> Result<()> {
    let store = open_store(config)?;
    let domains = store.domains()?;
    let messages = store.chat_count()?;

    println!("Mentord Status");
    println!("--------------");
    println!(
        "Mode:      {}",
        if config.llm.is_configured() { "ai" } else { "fallback" }
    );
    println!("Model:     {}", config.llm.model);
    println!("Database:  {}", config.storage.db_path);
    println!("Domains:   {}", domains.len());
    println!("Messages:  {}", messages);
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn open_store(config: &Config) -> Result<Store> {
    let path = PathBuf::from(&config.storage.db_path);
    Store::open(&path).context(format!("Failed to open database at {}", path.display()))
}

/// Open the store and seed the default domains on first run.
fn bootstrap_store(config: &Config) -> Result<Arc<Mutex<Store>>> {
    let store = open_store(config)?;

    if store.domains()?.is_empty() {
        let defaults = default_domains();
        info!(count = defaults.len(), "seeding default domains");
        for domain in &defaults {
            store.upsert_domain(domain)?;
        }
    }

    Ok(Arc::new(Mutex::new(store)))
}

fn build_coach(config: &Config, store: Arc<Mutex<Store>>) -> Result<Arc<Coach>> {
    let llm: Option<Arc<dyn LlmClient>> = if config.llm.is_configured() {
        Some(create_client(&config.llm)?)
    } else {
        info!("no API key configured, coach runs in fallback-only mode");
        None
    };

    let prompt_dir = dirs::config_dir().map(|d| d.join("mentord").join("prompts"));
    let prompts = PromptLoader::new(prompt_dir.as_deref());

    Ok(Arc::new(Coach::new(
        llm,
        store,
        prompts,
        config.chat.history_window,
        config.llm.max_tokens,
    )))
}
