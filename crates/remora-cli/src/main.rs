mod config;
mod output;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use remora_core::agent::ClaudeCodeAdapter;
use remora_core::driver::Driver;
use remora_core::hook::{self, CaptureMode, FiringPolicy, HookKind};
use remora_core::scenario::{Scenario, scenario_for};
use remora_core::store::ArtifactStore;
use remora_core::suite::{self, ModeReport};

use config::{Overrides, RemoraConfig};

#[derive(Parser)]
#[command(
    name = "remora",
    about = "Dual-mode hook verification harness for LLM coding agents"
)]
struct Cli {
    /// Path to the agent binary (overrides REMORA_AGENT_BINARY)
    #[arg(long, global = true)]
    agent_binary: Option<String>,

    /// Model identifier passed to the agent (overrides REMORA_MODEL)
    #[arg(long, global = true)]
    model: Option<String>,

    /// Working directory for agent runs (overrides REMORA_PROJECT_DIR)
    #[arg(long, global = true)]
    project_dir: Option<PathBuf>,

    /// Directory hook artifacts are written to (overrides REMORA_LOGS_DIR)
    #[arg(long, global = true)]
    logs_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the dual-mode harness for one hook kind
    Run {
        /// Hook kind to test (e.g. PreToolUse)
        kind: String,
    },
    /// Run the dual-mode harness for all 11 hook kinds
    Suite,
    /// List hook kinds with their scenarios and firing policies
    List,
    /// Delete all captured artifacts from the logs directory
    Clean,
    /// Write a hook payload from stdin into the artifact store
    ///
    /// This is the command declarative settings files point the agent at;
    /// it is not meant to be invoked by hand.
    #[command(hide = true)]
    LogEvent {
        /// Capture mode tag for the artifact
        #[arg(long, default_value = "declarative")]
        mode: String,
        /// Artifact directory to write into
        #[arg(long)]
        logs_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let overrides = Overrides {
        agent_binary: cli.agent_binary.clone(),
        model: cli.model.clone(),
        project_dir: cli.project_dir.clone(),
        logs_dir: cli.logs_dir.clone(),
    };

    match cli.command {
        Commands::Run { kind } => {
            let config = RemoraConfig::resolve(&overrides)?;
            let kind: HookKind = kind
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))
                .context("use `remora list` to see valid hook kinds")?;
            let report = cmd_run(&config, kind).await?;
            if !report.passed() {
                std::process::exit(1);
            }
        }
        Commands::Suite => {
            let config = RemoraConfig::resolve(&overrides)?;
            let report = cmd_suite(&config).await?;
            if !report.all_passed() {
                std::process::exit(1);
            }
        }
        Commands::List => {
            cmd_list();
        }
        Commands::Clean => {
            let config = RemoraConfig::resolve(&overrides)?;
            let store = ArtifactStore::new(&config.logs_dir);
            let removed = store.clean()?;
            println!("Removed {removed} artifact(s) from {}", config.logs_dir.display());
        }
        Commands::LogEvent { mode, logs_dir } => {
            cmd_log_event(&mode, &logs_dir)?;
        }
    }

    Ok(())
}

/// Build the driver from resolved configuration.
fn build_driver(config: &RemoraConfig) -> Result<Driver> {
    let agent = ClaudeCodeAdapter::with_binary(&config.agent_binary);
    let store = ArtifactStore::new(&config.logs_dir);

    // The declarative settings file points the agent back at this binary.
    let exe = std::env::current_exe().context("failed to resolve the remora binary path")?;
    let hook_command = format!(
        "\"{}\" log-event --mode declarative --logs-dir \"{}\"",
        exe.display(),
        config.logs_dir.display()
    );

    Ok(Driver::new(
        Arc::new(agent),
        store,
        &config.project_dir,
        &config.model,
        hook_command,
    ))
}

async fn cmd_run(config: &RemoraConfig, kind: HookKind) -> Result<suite::KindReport> {
    let driver = build_driver(config)?;
    let scenario = scenario_for(kind);

    output::print_header(kind.as_str(), scenario.description);
    let report = suite::run_kind(&driver, &scenario).await;

    print_mode_validation(&driver, kind, "Programmatic", &report.programmatic);
    print_mode_validation(&driver, kind, "Declarative", &report.declarative);
    output::print_kind_report(&report);

    Ok(report)
}

/// Re-validate a captured artifact for display, the way each mode reports
/// its capture.
fn print_mode_validation(driver: &Driver, kind: HookKind, label: &str, report: &ModeReport) {
    let ModeReport::Passed { path } = report else {
        return;
    };
    match driver.store().read(path) {
        Ok(payload) => {
            println!("\n--- {label} ---");
            if let Some(name) = path.file_name() {
                println!("  Hook fired - logged to {}", name.to_string_lossy());
            }
            if let Ok(event) = hook::HookEvent::from_value(&payload) {
                println!("  {}", event.summary());
            }
            let validation = hook::validate(kind, &payload);
            output::print_validation(&validation, &format!("{kind}HookInput"));
        }
        Err(e) => {
            println!("\n--- {label} ---");
            println!("  Could not re-read artifact for display: {e}");
        }
    }
}

async fn cmd_suite(config: &RemoraConfig) -> Result<suite::SuiteReport> {
    let driver = build_driver(config)?;
    let session_file = config.session_file();

    let report = suite::run_suite(&driver, &HookKind::ALL, Some(&session_file)).await;
    output::print_suite_report(&report);
    Ok(report)
}

fn cmd_list() {
    println!("{:<18} {:<12} {}", "KIND", "FIRING", "SCENARIO");
    for scenario in Scenario::all() {
        let policy = match scenario.kind.firing_policy() {
            FiringPolicy::Required => "required",
            FiringPolicy::BestEffort => "best-effort",
        };
        println!(
            "{:<18} {:<12} {}",
            scenario.kind.as_str(),
            policy,
            scenario.description
        );
    }
}

/// Read a hook payload from stdin and persist it as an artifact.
fn cmd_log_event(mode: &str, logs_dir: &Path) -> Result<()> {
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("failed to read hook payload from stdin")?;
    let path = write_event(&input, mode, logs_dir)?;
    tracing::debug!(path = %path.display(), "hook artifact written");
    Ok(())
}

/// Parse a raw hook payload and write it into the store.
///
/// The hook kind is taken from the payload's own `hook_event_name`
/// discriminant, so the settings file does not need to repeat it.
fn write_event(input: &str, mode: &str, logs_dir: &Path) -> Result<PathBuf> {
    let mode: CaptureMode = mode.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let payload: serde_json::Value =
        serde_json::from_str(input).context("hook payload is not valid JSON")?;

    let kind: HookKind = payload
        .get("hook_event_name")
        .and_then(|n| n.as_str())
        .context("hook payload has no hook_event_name")?
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    let store = ArtifactStore::new(logs_dir);
    Ok(store.write(kind, mode, &payload)?)
}
