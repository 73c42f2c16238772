//! CLI entrypoint for permitflow
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result};
use clap::Parser;
use permitflow_application::{
    ConversationLogger, FieldCollector, FieldExtractor, JudgmentError, JudgmentService,
    NoConversationLogger, NoFieldExtractor, NoJudgmentService, PermitConversation,
    ReviewCoordinator, SessionBroadcastHub, WorkflowServices,
};
use permitflow_infrastructure::{
    ConfigLoader, HttpJudgmentClient, InMemoryApplicationRepository, JsonlConversationLogger,
    LlmFieldExtractor, reviewers_from_config,
};
use permitflow_presentation::{AppState, Cli, serve};
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Install the tracing subscriber.
///
/// `RUST_LOG` wins over the `-v` count. The returned guard flushes the log
/// file and must live until exit.
fn init_tracing(verbose: u8, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let stderr = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    match log_dir {
        Some(dir) => {
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, "permitflow.log"));
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(writer),
                )
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry().with(filter).with(stderr).init();
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_tracing(cli.verbose, cli.log_dir.as_deref());

    if cli.show_config {
        ConfigLoader::print_config_sources();
        return Ok(());
    }

    info!("Starting permitflow {}", env!("CARGO_PKG_VERSION"));

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref()).context("Failed to load configuration")?
    };

    // === Dependency Injection ===
    let conversation_logger: Arc<dyn ConversationLogger> = match &cli.conversation_log {
        Some(path) => {
            let logger = JsonlConversationLogger::open(path).with_context(|| {
                format!("Could not open conversation log {}", path.display())
            })?;
            info!("Writing workflow events to {}", logger.path().display());
            Arc::new(logger)
        }
        None => Arc::new(NoConversationLogger),
    };

    let judgment: Arc<dyn JudgmentService> = match HttpJudgmentClient::from_config(&config.llm) {
        Ok(client) => {
            info!("Judgment service: {} (model {})", client.url(), client.model());
            Arc::new(client)
        }
        Err(JudgmentError::NotConfigured) => {
            warn!("No [llm] endpoint configured; reviewers will fail and applications will be declined");
            Arc::new(NoJudgmentService)
        }
        Err(e) => return Err(e).context("Failed to create judgment service client"),
    };

    let extractor: Arc<dyn FieldExtractor> = if config.llm.is_configured() {
        Arc::new(LlmFieldExtractor::new(judgment.clone()))
    } else {
        Arc::new(NoFieldExtractor)
    };

    let hub_params = config.hub.to_hub_params();
    let services = WorkflowServices {
        catalog: Arc::new(config.to_catalog()),
        collector: Arc::new(
            FieldCollector::new(extractor).with_conversation_logger(conversation_logger.clone()),
        ),
        coordinator: Arc::new(
            ReviewCoordinator::new(
                reviewers_from_config(&config.review, judgment),
                config.review.to_review_params(),
            )
            .with_conversation_logger(conversation_logger.clone()),
        ),
        engine: Arc::new(config.review.to_consensus_engine()),
        repository: Arc::new(InMemoryApplicationRepository::new()),
        conversation_logger: conversation_logger.clone(),
        transcript_capacity: hub_params.history_capacity,
    };

    let hub = Arc::new(
        SessionBroadcastHub::new(hub_params, move |session| {
            PermitConversation::new(session, services.clone())
        })
        .with_conversation_logger(conversation_logger),
    );

    let bind = cli.bind.unwrap_or(config.server.bind);
    let listener = TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Could not bind {bind}"))?;

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Received Ctrl+C, initiating graceful shutdown");
                    shutdown.cancel();
                }
                Err(e) => warn!("Could not install Ctrl+C handler: {}", e),
            }
        }
    });

    serve(listener, AppState::new(hub, shutdown)).await?;
    Ok(())
}
