use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use accounting_agent::application::ports::{
    AccountingCapability, CommandHistoryRepository, LlmClient, TranscriptionEngine,
};
use accounting_agent::application::services::CommandProcessor;
use accounting_agent::infrastructure::accounting::InMemoryAccounting;
use accounting_agent::infrastructure::audio::OpenAiWhisperEngine;
use accounting_agent::infrastructure::llm::OpenAiClient;
use accounting_agent::infrastructure::observability::init_tracing;
use accounting_agent::infrastructure::persistence::{
    InMemoryCommandHistoryRepository, PgCommandHistoryRepository, create_pool,
};
use accounting_agent::presentation::{AppState, Environment, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;
    let settings = Settings::load(environment).context("Failed to load settings")?;

    init_tracing(&settings.logging, environment);
    tracing::info!(environment = %environment, "Starting accounting agent");

    let llm_client: Arc<dyn LlmClient> = Arc::new(OpenAiClient::new(&settings.llm));
    let transcription_engine: Arc<dyn TranscriptionEngine> = Arc::new(OpenAiWhisperEngine::new(
        settings.llm.api_key.clone(),
        &settings.llm.base_url,
        &settings.transcription,
    ));
    let accounting: Arc<dyn AccountingCapability> = Arc::new(InMemoryAccounting::new());

    let history: Arc<dyn CommandHistoryRepository> = match &settings.database.url {
        Some(url) => {
            let pool = create_pool(url, settings.database.max_connections)
                .await
                .context("Failed to connect to PostgreSQL")?;
            Arc::new(PgCommandHistoryRepository::new(pool))
        }
        None => {
            tracing::warn!("No database URL configured, command history is kept in memory");
            Arc::new(InMemoryCommandHistoryRepository::new())
        }
    };

    let command_processor = Arc::new(CommandProcessor::new(
        llm_client,
        transcription_engine,
        Arc::clone(&accounting),
        history,
        settings.commands.min_confidence,
    ));

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("Invalid server address")?;

    let state = AppState::new(command_processor, accounting, settings, environment);
    let router = create_router(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
