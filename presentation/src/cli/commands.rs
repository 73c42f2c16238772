//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for permitflow
#[derive(Parser, Debug)]
#[command(name = "permitflow")]
#[command(author, version, about = "Conversational permit intake with multi-reviewer consensus")]
#[command(long_about = r#"
permitflow runs a conversational intake service for permit applications.

Each session moves through three tollgates:
1. Intake:    the bot collects the permit type's required fields
2. Review:    specialist reviewers assess the application concurrently
3. Finalize:  a veto rule and a weighted score decide APPROVE or DECLINE

Clients connect over WebSocket (/ws/flowbot) or Server-Sent Events (/events)
and may submit out of band with POST /send.

Configuration files are loaded from (in priority order):
1. PERMITFLOW_* environment variables
2. --config <path>       Explicit config file
3. ./permitflow.toml     Project-level config
4. ~/.config/permitflow/config.toml   Global config

Example:
  permitflow --bind 0.0.0.0:8000 -v
  PERMITFLOW_LLM__ENDPOINT=http://localhost:11434/v1 permitflow
"#)]
pub struct Cli {
    /// Address to listen on (overrides [server].bind)
    #[arg(short, long, value_name = "ADDR")]
    pub bind: Option<String>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Also write diagnostic logs to a daily-rolling file in this directory
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Append workflow events as JSON lines to this file
    #[arg(long, value_name = "PATH")]
    pub conversation_log: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}
