//! TaskPlan - LLM-driven objective planner
//!
//! CLI entry point.

use std::fs;
use std::path::PathBuf;

use clap::{CommandFactory, FromArgMatches};
use colored::*;
use eyre::{Context, Result, bail};
use tracing::{debug, info};

use taskplan::cli::{Cli, Command, OutputFormat, generate_after_help, get_log_path};
use taskplan::config::Config;
use taskplan::llm::{FailureKind, create_client};
use taskplan::planning::{PlanError, Planner, REQUIRED_STEPS};
use taskplan::prompts::{PlanPromptContext, PromptLoader};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Note: Can't log params here since logging isn't initialized yet
    let log_path = get_log_path();
    let log_dir = log_path.parent().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Determine log level with priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cmd = Cli::command().after_help(generate_after_help());
    let cli = Cli::from_arg_matches(&cmd.get_matches())?;

    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!(provider = %config.llm.provider, model = %config.llm.model, "TaskPlan loaded config");

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Plan { objective, format } => cmd_plan(&config, &objective, format).await,
        Command::Prompt { objective } => cmd_prompt(&config, &objective),
        Command::Required => {
            cmd_required();
            Ok(())
        }
    }
}

async fn cmd_plan(config: &Config, objective: &str, format: OutputFormat) -> Result<()> {
    debug!(%format, "cmd_plan: called");
    if objective.trim().is_empty() {
        bail!(PlanError::EmptyObjective);
    }

    config.validate().context("No API key available")?;
    let llm = create_client(&config.llm).context("Failed to create LLM client")?;
    let planner = Planner::from_config(llm, config);

    let plan = match planner.plan(objective).await {
        Ok(plan) => plan,
        Err(e) => {
            print_failure_hint(config, &e);
            return Err(e).context("Planning failed");
        }
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&plan)?),
        OutputFormat::Text => {
            for (idx, step) in plan.iter().enumerate() {
                println!("{} {}", format!("{:>2}.", idx + 1).as_str().cyan(), step);
            }
        }
    }
    Ok(())
}

fn cmd_prompt(config: &Config, objective: &str) -> Result<()> {
    debug!("cmd_prompt: called");
    let objective = objective.trim();
    if objective.is_empty() {
        bail!(PlanError::EmptyObjective);
    }

    let loader = PromptLoader::new(&config.planner.prompts_dir);
    let prompt = loader.render_plan(&PlanPromptContext::new(objective, &REQUIRED_STEPS))?;
    println!("{}", prompt);
    Ok(())
}

fn cmd_required() {
    for step in REQUIRED_STEPS {
        println!("{} {}", "•".green(), step);
    }
}

fn print_failure_hint(config: &Config, err: &PlanError) {
    let Some(llm) = err.as_llm() else {
        return;
    };
    match llm.kind() {
        FailureKind::Authentication => eprintln!(
            "{} check the API key in ${} (provider: {})",
            "hint:".yellow(),
            config.llm.api_key_env,
            config.llm.provider
        ),
        FailureKind::RateLimit => eprintln!(
            "{} rate limit or quota exhausted; retry after {:?}",
            "hint:".yellow(),
            llm.retry_after().unwrap_or_default()
        ),
        FailureKind::Transport => {}
    }
}
