// src/main.rs
// Iris - image context bridge for voice agents

use anyhow::Result;
use clap::{Parser, Subcommand};
use iris::config::IrisConfig;
use iris::correlation::{CorrelationEngine, CorrelationStore, EngineOptions};
use iris::llm::create_dispatcher;
use iris::storage::LocalImageStore;
use iris::voice::{CredentialIssuer, NoCredentials, SignedUrlIssuer};
use iris::web;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "iris")]
#[command(about = "Correlates images uploaded by voice clients with the agent's LLM calls")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server (default)
    Serve {
        /// Host to bind (overrides IRIS_HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides IRIS_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Validate configuration and print a report
    CheckConfig,
}

fn init_logging() -> Result<()> {
    let filter = std::env::var("IRIS_LOG_LEVEL")
        .ok()
        .map(EnvFilter::new)
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

async fn run_server(mut config: IrisConfig, host: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }

    let validation = config.validate();
    for warning in &validation.warnings {
        warn!("{}", warning);
    }
    if !validation.is_valid() {
        anyhow::bail!("Invalid configuration:\n{}", validation.report());
    }

    let images = Arc::new(LocalImageStore::open(&config.upload_dir, &config.public_base_url).await?);
    let options = EngineOptions {
        max_upload_bytes: config.max_upload_bytes,
        inline_images: config.inline_images,
        image_note: config.image_note.clone(),
    };
    let engine = Arc::new(CorrelationEngine::new(
        Arc::new(CorrelationStore::new()),
        images.clone(),
        options,
    ));

    let credentials: Arc<dyn CredentialIssuer> = if config.voice.is_configured() {
        Arc::new(SignedUrlIssuer::new(config.voice.clone()))
    } else {
        Arc::new(NoCredentials)
    };

    let state = web::state::AppState::new(engine, create_dispatcher(&config.llm), credentials, images);
    let app = web::create_router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        addr = %addr,
        public_base_url = %config.public_base_url,
        provider = %config.llm.provider,
        "Iris listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_logging()?;

    let config = IrisConfig::from_env();

    match cli.command {
        None => run_server(config, None, None).await?,
        Some(Commands::Serve { host, port }) => run_server(config, host, port).await?,
        Some(Commands::CheckConfig) => {
            let validation = config.validate();
            println!("{}", validation.report());
            if !validation.is_valid() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
