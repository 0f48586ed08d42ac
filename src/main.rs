use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::{LevelFilter, info, warn};
use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use promptlab::frontend::FrontendRunner;
use promptlab::session::{PhaseKind, SessionController, SubmitOutcome};
use promptlab::tools::{ToolDescriptor, ToolDispatcher, ToolRegistry};
use promptlab::transport::HttpTransport;

mod cli;
mod config;

use cli::Cli;
use cli::commands::Commands;
use config::Config;

/// Level used until the config file says otherwise
const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Info;

/// Runs before the config is loaded so config warnings reach the log file.
/// Without RUST_LOG the filter admits everything and the global max level
/// does the narrowing, which lets the config adjust it afterwards.
fn setup_logging(rust_log_set: bool) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("promptlab")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("promptlab.log");

    // Setup env_logger with file output; the terminal belongs to the session
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("trace"))
        .target(env_logger::Target::Pipe(target))
        .init();

    if !rust_log_set {
        log::set_max_level(DEFAULT_LOG_LEVEL);
    }

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

/// Level requested by the config file; RUST_LOG always wins
fn log_level_override(rust_log_set: bool, configured: Option<&str>) -> Option<LevelFilter> {
    if rust_log_set {
        return None;
    }
    let configured = configured?;
    match configured.parse::<LevelFilter>() {
        Ok(level) => Some(level),
        Err(_) => {
            warn!("Unknown log_level {:?} in config, keeping {}", configured, DEFAULT_LOG_LEVEL);
            None
        }
    }
}

async fn run_application(cli: &Cli, config: &Config) -> Result<ExitCode> {
    info!("Starting application");

    let base_url = cli
        .base_url
        .clone()
        .unwrap_or_else(|| config.backend.base_url.clone());

    if cli.is_verbose() {
        println!("{} {}", "Backend:".yellow(), base_url);
    }

    let registry = config.registry()?;

    match &cli.command {
        Commands::List => handle_list_command(&registry),
        Commands::Show { slug } => handle_show_command(&registry, slug),
        Commands::Run { slug, prompt } => {
            handle_run_command(&registry, slug, prompt.as_deref(), &base_url, config).await
        }
    }
}

fn resolve_tool(registry: &ToolRegistry, slug: &str) -> Result<Arc<ToolDescriptor>> {
    registry.resolve(slug).ok_or_else(|| {
        let known: Vec<&str> = registry.list().iter().map(|t| t.slug.as_str()).collect();
        eyre::eyre!("Tool not found: {} (available: {})", slug, known.join(", "))
    })
}

fn handle_list_command(registry: &ToolRegistry) -> Result<ExitCode> {
    info!("Listing {} tools", registry.len());
    let dispatcher = ToolDispatcher::builtin();

    for tool in registry.list() {
        let slug = format!("{:<24}", tool.slug);
        let mut line = format!("{} {}", slug.as_str().bold(), tool.display_name);
        if tool.is_new {
            line.push_str(&format!(" {}", "[new]".green()));
        }
        if !dispatcher.supports(&tool.id) {
            line.push_str(&format!(" {}", "[unsupported]".dimmed()));
        }
        println!("{}", line);
        if !tool.description.is_empty() {
            println!("  {}", tool.description.as_str().dimmed());
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_show_command(registry: &ToolRegistry, slug: &str) -> Result<ExitCode> {
    let tool = resolve_tool(registry, slug)?;
    info!("Showing tool: {}", tool.id);

    println!("{} {}", "Tool:".green(), tool.display_name);
    println!("{} {}", "Page:".green(), tool.href());
    println!("{} {}", "Category:".green(), tool.category.as_str());
    print!("{}", serde_yaml::to_string(tool.as_ref()).context("Failed to serialize tool")?);
    Ok(ExitCode::SUCCESS)
}

async fn handle_run_command(
    registry: &ToolRegistry,
    slug: &str,
    prompt: Option<&str>,
    base_url: &str,
    config: &Config,
) -> Result<ExitCode> {
    let tool = resolve_tool(registry, slug)?;
    info!("Running tool '{}' against {}", tool.id, base_url);

    let transport = HttpTransport::new(base_url, config.backend.timeout())
        .context("Failed to create HTTP transport")?;
    let mut session = SessionController::new(Arc::clone(&tool), Arc::new(transport));

    let dispatcher = ToolDispatcher::builtin();
    let mount = dispatcher.renderer_for(&tool);

    let Some(prompt) = prompt else {
        let mut runner = FrontendRunner::new(session, mount, io::stdout());
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        runner.run(stdin).await.context("Session failed")?;
        return Ok(ExitCode::SUCCESS);
    };

    if !mount.is_supported() {
        println!("{}", mount.render(session.state()));
        return Ok(ExitCode::FAILURE);
    }

    if let SubmitOutcome::Rejected(error) = session.submit(prompt) {
        println!("{}", promptlab::render::render_error(&error.display()));
        return Ok(ExitCode::FAILURE);
    }

    let phase = tokio::select! {
        phase = session.settle() => phase,
        _ = tokio::signal::ctrl_c() => {
            session.cancel();
            session.phase()
        }
    };

    println!("{}", mount.render(session.state()));

    Ok(match phase {
        PhaseKind::Success => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    })
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Parse CLI arguments
    let cli = Cli::parse();

    let rust_log_set = env::var_os("RUST_LOG").is_some();
    setup_logging(rust_log_set).context("Failed to setup logging")?;

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    if let Some(level) = log_level_override(rust_log_set, config.log_level.as_deref()) {
        log::set_max_level(level);
    }

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    let code = run_application(&cli, &config).await.context("Application failed")?;

    Ok(code)
}
