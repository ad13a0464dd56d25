//! # PromptLab Server
//!
//! Serves the JSON API over the shared prompt state and offers a few
//! offline commands against the same database.

mod api;

use axum::{routing::get, Json, Router};
use chrono::Utc;
use clap::{Parser, Subcommand};
use promptlab_core::state::{export, io, ExportFormat};
use promptlab_core::{ApplicationState, LabConfig, LabDb};
use serde::Serialize;
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tokio::{net::TcpListener, sync::Mutex};

/// Application state shared by every handler
pub struct AppState {
    pub lab: Mutex<ApplicationState>,
    /// Runtime directory holding the database and config.json
    pub runtime: PathBuf,
}

pub type SharedState = Arc<AppState>;

#[derive(Parser, Clone)]
#[command(author, version, about = "PromptLab - system prompt editor and tester")]
struct Args {
    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Subcommand, Clone)]
enum CliCommand {
    /// Start the API server (default)
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
        /// Keep all state in memory for this run
        #[arg(long)]
        in_memory: bool,
    },
    /// Print the current prompt
    Show,
    /// List prompt versions, newest first
    History,
    /// Restore a stored version as the current prompt
    Revert {
        /// Version id as shown by `history`
        id: String,
    },
    /// Export the prompt and its history
    Export {
        /// markdown, json or text
        #[arg(short, long, default_value = "markdown")]
        format: String,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("promptlab=info,promptlab_core=info")),
        )
        .init();
}

fn open_state(runtime: &std::path::Path, config: LabConfig, in_memory: bool) -> anyhow::Result<ApplicationState> {
    if in_memory {
        return Ok(ApplicationState::in_memory(config));
    }
    let db = LabDb::open_at(runtime.join("promptlab.db"))?;
    Ok(ApplicationState::open(&db, config))
}

pub async fn run_server(state: SharedState, port: u16) -> anyhow::Result<()> {
    let app = Router::new()
        .nest("/api/v1", api::routes())
        .route("/health", get(health))
        .with_state(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    println!("PromptLab server running at http://{}", addr);
    println!("   Prompt:    /api/v1/prompt, /versions, /export");
    println!("   Chat:      /api/v1/chat, /conversation, /scenarios");
    println!("   Assist:    /api/v1/suggestion, /optimize, /organize, /analyze, /generate");
    println!("   Catalog:   /api/v1/templates, /components, /wizard");
    println!("   Knowledge: /api/v1/knowledge");
    println!("   Settings:  /api/v1/config, /providers, /api-key");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let runtime = io::ensure_runtime_dir().await?;
    let _ = dotenvy::dotenv();
    let _ = dotenvy::from_path(runtime.join(".env"));

    let config = LabConfig::load(&runtime).await;
    let args = Args::parse();

    match args.command {
        Some(CliCommand::Show) => {
            let lab = open_state(&runtime, config, false)?;
            println!("{}", lab.current_prompt());
        }
        Some(CliCommand::History) => {
            let lab = open_state(&runtime, config, false)?;
            if lab.versions().is_empty() {
                println!("No versions recorded yet");
            }
            for version in lab.versions().newest_first() {
                println!(
                    "{}  {}  {}",
                    version.id,
                    version.created_at.format("%Y-%m-%d %H:%M:%S"),
                    version.reason.as_deref().unwrap_or("-")
                );
            }
        }
        Some(CliCommand::Revert { id }) => {
            let mut lab = open_state(&runtime, config, false)?;
            let prompt = lab.revert_to_version(&id)?;
            println!("Reverted to {}:\n\n{}", id, prompt);
        }
        Some(CliCommand::Export { format, output }) => {
            let format = ExportFormat::from_str(&format)
                .ok_or_else(|| anyhow::anyhow!("unknown export format: {}", format))?;
            let lab = open_state(&runtime, config, false)?;
            let now = Utc::now();
            let rendered = export(&lab, format, now)?;

            match output {
                Some(path) => {
                    tokio::fs::write(&path, rendered).await?;
                    println!("Exported to {}", path.display());
                }
                None => println!("{}", rendered),
            }
        }
        Some(CliCommand::Serve { port, in_memory }) => {
            let lab = open_state(&runtime, config, in_memory)?;
            let state = Arc::new(AppState {
                lab: Mutex::new(lab),
                runtime,
            });
            run_server(state, port).await?;
        }
        None => {
            let lab = open_state(&runtime, config, false)?;
            let state = Arc::new(AppState {
                lab: Mutex::new(lab),
                runtime,
            });
            run_server(state, 8080).await?;
        }
    }

    Ok(())
}
