//! TaskSage CLI
//!
//! Runs suggestions and parses in-process against the configured provider,
//! and checks a running server.

#![allow(clippy::print_stdout)]

use std::path::PathBuf;

use ai_core::InferenceConfig;
use anyhow::Context;
use application::{CancellationToken, SuggestionService};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use domain::SuggestionRequest;
use infrastructure::{AppConfig, build_suggestion_service};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// TaskSage CLI
#[derive(Debug, Parser)]
#[command(name = "tasksage-cli")]
#[command(author, version, about = "TaskSage task suggestion CLI", long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file (defaults to ./config.toml when present)
    #[arg(short, long, global = true, env = "TASKSAGE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Suggest a category, priority and tips for a task
    ///
    /// Example: tasksage-cli suggest "Buy groceries: milk, eggs, bread"
    Suggest {
        /// Task text
        text: String,

        /// Longer description of the task
        #[arg(short, long)]
        description: Option<String>,

        /// Due date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_due_date)]
        due: Option<NaiveDate>,

        /// Use the rule-based engine only
        #[arg(long)]
        offline: bool,
    },

    /// Parse free text into a title, description and category
    Parse {
        /// Free text
        text: String,

        /// Use the rule-based engine only
        #[arg(long)]
        offline: bool,
    },

    /// Print the rule-based category for a task
    Classify {
        /// Task text
        text: String,
    },

    /// Show readiness of a running server
    Status {
        /// Server URL
        #[arg(short, long, default_value = "http://localhost:3000")]
        url: String,
    },

    /// Exit non-zero unless a running server is ready
    Health {
        /// Server URL
        #[arg(short, long, default_value = "http://localhost:3000")]
        url: String,
    },
}

/// Determine log filter level from verbosity count
const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Format endpoint URL
fn endpoint_url(base_url: &str, path: &str) -> String {
    format!("{}{path}", base_url.trim_end_matches('/'))
}

fn parse_due_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

fn load_config(path: Option<&PathBuf>, offline: bool) -> anyhow::Result<AppConfig> {
    let mut config = AppConfig::load_from(path.map(PathBuf::as_path))
        .context("failed to load configuration")?;
    if offline {
        config.inference = InferenceConfig::disabled();
    }
    Ok(config)
}

fn build_service(path: Option<&PathBuf>, offline: bool) -> anyhow::Result<SuggestionService> {
    let config = load_config(path, offline)?;
    Ok(build_suggestion_service(&config)?)
}

/// Token cancelled by Ctrl+C; the service then answers from rules
fn ctrl_c_token() -> CancellationToken {
    let token = CancellationToken::new();
    let on_signal = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });
    token
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(log_filter_from_verbosity(cli.verbose)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Suggest {
            text,
            description,
            due,
            offline,
        } => {
            let service = build_service(cli.config.as_ref(), offline)?;
            let mut request = SuggestionRequest::new(text)?;
            if let Some(description) = description {
                request = request.with_description(description);
            }
            if let Some(due) = due {
                request = request.with_due_date(due);
            }

            let cancel = ctrl_c_token();
            let result = service.suggest_request(&request, Some(&cancel)).await?;
            print_json(&result)?;
        },

        Commands::Parse { text, offline } => {
            let service = build_service(cli.config.as_ref(), offline)?;
            let request = SuggestionRequest::new(text)?;

            let cancel = ctrl_c_token();
            let task = service.parse_request(&request, Some(&cancel)).await?;
            print_json(&task)?;
        },

        Commands::Classify { text } => {
            let service = build_service(cli.config.as_ref(), true)?;
            println!("{}", service.classify_offline(&text));
        },

        Commands::Status { url } => {
            let resp = reqwest::Client::new()
                .get(endpoint_url(&url, "/ready"))
                .send()
                .await?
                .json::<serde_json::Value>()
                .await?;
            print_json(&resp)?;
        },

        Commands::Health { url } => {
            match reqwest::Client::new().get(endpoint_url(&url, "/ready")).send().await {
                Ok(resp) if resp.status().is_success() => {
                    println!("Healthy");
                },
                Ok(resp) => {
                    println!("Unhealthy: HTTP {}", resp.status());
                    std::process::exit(1);
                },
                Err(e) => {
                    println!("Unhealthy: {e}");
                    std::process::exit(1);
                },
            }
        },
    }

    Ok(())
}
