//! CLI command definitions, routing, and tracing setup.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use dsamaster_core::{RefreshProgress, RefreshReport, Refresher, Snapshot, TopicStore};
use dsamaster_shared::{AppConfig, RefreshSettings, init_config, load_config};
use dsamaster_sources::{ChallengePicker, build_client};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

use crate::display;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// DSA Master: data-structure and algorithm notes on demand.
#[derive(Parser)]
#[command(
    name = "dsamaster",
    version,
    about = "Look up DSA topics from a periodically refreshed, multi-source knowledge base.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Rebuild the topic tables from the configured sources.
    Refresh {
        /// Refresh even if the snapshot is still fresh.
        #[arg(long)]
        force: bool,
    },

    /// Explain a topic: summary, complexity, C++ snippet, top links.
    Dsa {
        /// Topic name (free text, typos allowed).
        #[arg(required = true, num_args = 1..)]
        topic: Vec<String>,
    },

    /// List every collected link for a topic.
    Resources {
        /// Topic name (free text, typos allowed).
        #[arg(required = true, num_args = 1..)]
        topic: Vec<String>,
    },

    /// Print a random LeetCode problem.
    Challenge,

    /// Show snapshot location, size, and freshness.
    Status,

    /// Refresh in the background and answer `!` commands from stdin.
    Serve,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr so replies on
/// stdout stay clean.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "dsamaster=info",
        1 => "dsamaster=debug",
        _ => "dsamaster=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Refresh { force } => cmd_refresh(force).await,
        Command::Dsa { topic } => cmd_dsa(&topic.join(" ")).await,
        Command::Resources { topic } => cmd_resources(&topic.join(" ")).await,
        Command::Challenge => cmd_challenge().await,
        Command::Status => cmd_status().await,
        Command::Serve => cmd_serve().await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_refresh(force: bool) -> Result<()> {
    let config = load_config()?;
    let refresher = Refresher::from_config(&config)?;

    info!(force, "refreshing topic tables");
    let reporter = CliProgress::new();
    let report = refresher.refresh_with_report(force, &reporter).await;

    println!();
    if !report.ran {
        println!("  Snapshot is still fresh; nothing to do (use --force to refresh anyway).");
    } else {
        println!("  Refresh complete.");
        println!("  Topics:    {}", report.topics);
        println!("  Stubbed:   {}", report.stubbed);
        println!("  Skipped:   {}", report.skipped);
        println!(
            "  Topics:    {} ({})",
            refresher.store().topics_path().display(),
            written(report.topics_persisted)
        );
        println!(
            "  Resources: {} ({})",
            refresher.store().resources_path().display(),
            written(report.resources_persisted)
        );
        println!("  Time:      {:.1}s", report.elapsed.as_secs_f64());
    }
    println!();

    Ok(())
}

fn written(ok: bool) -> &'static str {
    if ok { "written" } else { "FAILED, previous file kept" }
}

async fn cmd_dsa(topic: &str) -> Result<()> {
    let snapshot = load_snapshot(&load_config()?)?;
    println!("{}", display::topic_reply(snapshot.as_ref(), topic));
    Ok(())
}

async fn cmd_resources(topic: &str) -> Result<()> {
    let snapshot = load_snapshot(&load_config()?)?;
    println!("{}", display::resources_reply(snapshot.as_ref(), topic));
    Ok(())
}

async fn cmd_challenge() -> Result<()> {
    let config = load_config()?;
    let picker = challenge_picker(&config)?;
    println!("{}", display::challenge_reply(picker.pick_random().await.as_ref()));
    Ok(())
}

async fn cmd_status() -> Result<()> {
    let config = load_config()?;
    let settings = RefreshSettings::from(&config);
    let store = TopicStore::from_settings(&settings);

    println!();
    println!("  Topics file:    {}", store.topics_path().display());
    println!("  Resources file: {}", store.resources_path().display());
    println!("  Sources:        {}", config.enrichment.sources.join(", "));

    match store.load() {
        Ok(Some(snapshot)) => {
            let refreshed = snapshot
                .refreshed_at()
                .map(|t| DateTime::<Local>::from(t).format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "unknown".to_string());
            println!("  Topics:         {}", snapshot.len());
            println!("  Last refresh:   {refreshed}");
            println!(
                "  Fresh:          {}",
                if store.is_fresh(settings.staleness) { "yes" } else { "no, refresh due" }
            );
        }
        Ok(None) => println!("  Snapshot:       not built yet"),
        Err(e) => println!("  Snapshot:       unreadable ({e})"),
    }
    println!();

    Ok(())
}

async fn cmd_serve() -> Result<()> {
    let config = load_config()?;
    let refresher = Arc::new(Refresher::from_config(&config)?);
    let picker = challenge_picker(&config)?;
    let interval = Duration::from_secs(config.schedule.update_interval_minutes.max(1) * 60);

    // Refreshes run on their own task; replies only ever read the persisted snapshot.
    let background = Arc::clone(&refresher);
    let refresh_task = tokio::spawn(async move {
        background.refresh(false).await;
        loop {
            tokio::time::sleep(interval).await;
            background.refresh(true).await;
        }
    });

    info!(
        interval_minutes = interval.as_secs() / 60,
        "serving; type !help for commands"
    );
    println!("{}", display::HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.wrap_err("failed to read stdin")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (command, arg) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let arg = arg.trim();

        let reply = match command {
            "!dsa" | "!resources" if arg.is_empty() => format!("Usage: {command} <topic>"),
            "!dsa" => with_snapshot(refresher.store(), |s| display::topic_reply(s, arg)),
            "!resources" => with_snapshot(refresher.store(), |s| display::resources_reply(s, arg)),
            "!challenge" => display::challenge_reply(picker.pick_random().await.as_ref()),
            "!help" => display::HELP.to_string(),
            "!quit" => break,
            _ => format!("Unknown command {command:?}. Type !help for commands."),
        };
        println!("{reply}\n");
    }

    refresh_task.abort();
    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_snapshot(config: &AppConfig) -> Result<Option<Snapshot>> {
    let store = TopicStore::from_settings(&RefreshSettings::from(config));
    Ok(store.load()?)
}

/// Render a reply from the current snapshot. Read failures become a notice.
fn with_snapshot(store: &TopicStore, render: impl FnOnce(Option<&Snapshot>) -> String) -> String {
    match store.load() {
        Ok(snapshot) => render(snapshot.as_ref()),
        Err(e) => {
            error!(error = %e, "failed to read snapshot");
            display::READ_FAILED.to_string()
        }
    }
}

fn challenge_picker(config: &AppConfig) -> Result<ChallengePicker> {
    let client = build_client(Duration::from_secs(config.enrichment.request_timeout_secs))?;
    Ok(ChallengePicker::new(client, &config.challenge))
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(Duration::from_millis(80));
        Self { spinner }
    }
}

impl RefreshProgress for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn topic_started(&self, topic: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Enriching [{current}/{total}] {topic}"));
    }

    fn done(&self, report: &RefreshReport) {
        if report.ran && !(report.topics_persisted && report.resources_persisted) {
            warn!("refresh finished but not every table was written");
        }
        self.spinner.finish_and_clear();
    }
}
