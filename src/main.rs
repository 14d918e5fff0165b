mod config;

use std::io::{self, Read};
use std::process::ExitCode;

use ai_llm_service::config::default_config::config_openai;
use ai_llm_service::health_service::HealthService;
use ai_llm_service::{OpenAiService, telemetry};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use content_assist::{AssistRequest, ContentAssistant};
use domain_schema::SCHEMA;
use qa_store::QaStore;
use tracing::{Level, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::DatabaseConfig;

#[derive(Debug, Parser)]
#[command(name = "qa-backend", version, about = "Q&A platform backend tools")]
struct Cli {
    /// Log workspace crates at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the PostgreSQL DDL for every table.
    Schema,
    /// Create missing tables and indexes in DATABASE_URL.
    Migrate,
    /// Check a JSON insert payload read from stdin against a table's rules.
    Validate { table: String },
    /// Transform content read from stdin with the AI assistant.
    Assist {
        /// polish | suggest-title | clarify | concise
        #[arg(long)]
        action: String,
        /// question | answer
        #[arg(long)]
        context: Option<String>,
    },
    /// Suggest related questions for a topic.
    Suggest { topic: String },
    /// Probe the configured chat provider.
    Health,
    /// Delete expired sessions.
    SweepSessions,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // A missing .env is fine; the environment may already be populated.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::registry()
        .with(telemetry::env_filter_with_level("warn", level))
        .with(telemetry::layer())
        .init();

    match cli.command {
        Command::Schema => {
            for statement in SCHEMA.create_statements() {
                println!("{statement};\n");
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Migrate => {
            let store = connect().await?;
            store.migrate().await?;
            println!("{}", "schema is up to date".green());
            Ok(ExitCode::SUCCESS)
        }
        Command::Validate { table } => validate(&table),
        Command::Assist { action, context } => {
            let content = read_stdin()?;
            let assistant = ContentAssistant::new(OpenAiService::new(config_openai()?)?);
            let response = assistant
                .process_content(&AssistRequest {
                    content,
                    action,
                    context,
                })
                .await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Suggest { topic } => {
            let assistant = ContentAssistant::new(OpenAiService::new(config_openai()?)?);
            let questions = assistant.generate_question_suggestions(&topic).await;
            println!("{}", serde_json::to_string_pretty(&questions)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Health => {
            let cfg = config_openai()?;
            let status = HealthService::new(cfg.timeout_secs)?.check(&cfg).await;
            println!("{}", serde_json::to_string_pretty(&status)?);
            Ok(if status.ok {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::SweepSessions => {
            let store = connect().await?;
            let swept = store
                .sweep_expired_sessions(chrono::Utc::now().naive_utc())
                .await?;
            info!(swept, "expired sessions swept");
            println!("{swept}");
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn connect() -> Result<QaStore> {
    let db = DatabaseConfig::from_env()?;
    let store = QaStore::connect(&db.url, db.max_connections)
        .await
        .context("connecting to DATABASE_URL")?;
    Ok(store)
}

fn validate(table: &str) -> Result<ExitCode> {
    let table = SCHEMA.table(table)?;
    let raw = read_stdin()?;
    let payload: serde_json::Value =
        serde_json::from_str(&raw).context("stdin is not valid JSON")?;

    match table.insert_rules().validate(&payload) {
        Ok(fields) => {
            println!("{} {} payload", "valid".green().bold(), table.name);
            println!("{}", serde_json::to_string_pretty(&fields)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            println!("{} {} payload", "invalid".red().bold(), table.name);
            for issue in &err.issues {
                println!("  {} {issue}", "-".red());
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .context("reading stdin")?;
    Ok(buf)
}
