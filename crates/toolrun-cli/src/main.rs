//! toolrun CLI — entry point.
//!
//! # Commands
//!
//! - `toolrun run -g GOAL` — run one session with the built-in tools
//! - `toolrun tools` — list the built-in tools
//! - `toolrun init` — write a default config file
//! - `toolrun status` — show configuration and endpoint status

mod helpers;
mod init;
mod status;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use toolrun_agent::tools::{CalculatorTool, CurrentTimeTool};
use toolrun_agent::{Agent, AgentBuilder, SessionOptions};
use toolrun_core::config::{load_config, Config};
use toolrun_core::utils::expand_home;
use toolrun_providers::{HttpModelClient, ModelClient, RetryPolicy};

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// toolrun — let a model answer a goal by calling local tools
#[derive(Parser)]
#[command(name = "toolrun", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one session for a goal and print the answer
    Run {
        /// What the agent should accomplish
        #[arg(short, long)]
        goal: String,

        /// Config file (default: ~/.toolrun/config.json)
        #[arg(short, long)]
        config: Option<String>,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// List the built-in tools and their parameters
    Tools,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing config
        #[arg(long, default_value_t = false)]
        force: bool,
    },

    /// Show configuration and endpoint status
    Status,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { goal, config, logs } => {
            init_logging(logs);
            let path = config.as_deref().map(expand_home);
            run_goal(&goal, path).await
        }
        Commands::Tools => {
            helpers::print_tools(builtin_tools(&Config::default())?.build()?.tools());
            Ok(())
        }
        Commands::Init { force } => init::run(None, force),
        Commands::Status => status::run(None),
    }
}

// ─────────────────────────────────────────────
// Run command
// ─────────────────────────────────────────────

async fn run_goal(goal: &str, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path.as_deref());
    if !config.provider.is_configured() {
        bail!("no API key configured: set provider.apiKey or TOOLRUN_PROVIDER__API_KEY");
    }

    let agent = builtin_tools(&config)?
        .build()
        .context("failed to build agent")?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling session");
            on_interrupt.cancel();
        }
    });

    info!(goal = %goal, "running session");
    let options = SessionOptions::default().with_cancel(cancel);
    match agent.run_with(goal, options).await {
        Ok(report) => {
            helpers::print_answer(&report.answer);
            helpers::print_usage(report.turns, &report.usage);
            Ok(())
        }
        Err(failure) => {
            helpers::print_failure(&failure);
            std::process::exit(1);
        }
    }
}

/// An agent builder from `config` with the built-in tools attached.
fn builtin_tools(config: &Config) -> Result<AgentBuilder> {
    let client = HttpModelClient::new(&config.provider, RetryPolicy::from(&config.retry))
        .context("failed to create model client")?;
    let client: Arc<dyn ModelClient> = Arc::new(client);

    Ok(Agent::from_config(&config.agent, client)
        .tool(CalculatorTool)
        .tool(CurrentTimeTool))
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("toolrun=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_run_command() {
        let cli = Cli::try_parse_from(["toolrun", "run", "-g", "What is 2+2?", "--logs"]).unwrap();
        match cli.command {
            Commands::Run { goal, config, logs } => {
                assert_eq!(goal, "What is 2+2?");
                assert!(config.is_none());
                assert!(logs);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn run_requires_goal() {
        assert!(Cli::try_parse_from(["toolrun", "run"]).is_err());
    }

    #[test]
    fn builtin_tools_registered() {
        let agent = builtin_tools(&Config::default()).unwrap().build().unwrap();
        assert_eq!(agent.tools().names(), vec!["calculator", "current_time"]);
    }
}
