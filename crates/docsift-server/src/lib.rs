//! Docsift Server
//!
//! HTTP front end for the document pipeline. Wires the SQLite document
//! store, the S3-compatible blob store and the OpenRouter provider into a
//! [`DocumentPipeline`] and serves it with axum.

#![warn(missing_docs)]

pub mod config;
pub mod handlers;

use config::ServerConfig;
use docsift_blob::{BlobConfig, BlobError, S3BlobStore, StorageConfigError};
use docsift_llm::{LlmError, OpenRouterProvider};
use docsift_pipeline::{DocumentPipeline, UploadPolicy};
use docsift_store::{SqliteStore, StoreError};
use handlers::{create_router, AppState};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Blob store environment is incomplete
    #[error(transparent)]
    StorageConfig(#[from] StorageConfigError),

    /// Document store could not be opened
    #[error("Failed to open document store: {0}")]
    Store(#[from] StoreError),

    /// Blob store client could not be built
    #[error("Failed to initialize blob store: {0}")]
    Blob(#[from] BlobError),

    /// LLM client could not be built
    #[error("Failed to initialize LLM provider: {0}")]
    Llm(#[from] LlmError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Start the HTTP server
///
/// Blob store credentials are read from the environment before anything
/// is bound, so a misconfigured deployment fails at startup. Returns after
/// Ctrl-C once in-flight requests have drained.
pub async fn start_server(config: ServerConfig, api_key: String) -> Result<(), ServerError> {
    config.validate()?;

    info!("Starting Docsift server");
    info!("Bind address: {}", config.bind_addr());
    info!("Database: {}", config.database_path.display());
    info!("Upload limit: {} bytes", config.upload.max_bytes);

    let blob_config = BlobConfig::from_env()?;
    let blobs = S3BlobStore::new(&blob_config)?;
    info!(bucket = blobs.bucket_name(), endpoint = %blob_config.endpoint, "Blob store ready");

    let store = SqliteStore::open(&config.database_path)?;

    let provider = OpenRouterProvider::with_timeout(api_key, config.request_timeout())?
        .with_endpoint(&config.llm.endpoint)
        .with_model(&config.llm.model);
    info!(model = %config.llm.model, endpoint = %config.llm.endpoint, "LLM provider ready");

    let pipeline = DocumentPipeline::new(store, blobs, provider)
        .with_policy(UploadPolicy::new(config.upload.max_bytes));

    let shutdown = CancellationToken::new();
    let state = AppState::new(pipeline, shutdown.clone(), config.analysis_timeout());
    let app = create_router(state);

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Server listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    info!("Server stopped");
    Ok(())
}

/// Resolve on Ctrl-C, cancelling every in-flight analysis
async fn shutdown_signal(shutdown: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown requested"),
        Err(e) => {
            error!(error = %e, "Failed to listen for Ctrl-C; shutting down");
        }
    }
    shutdown.cancel();
}
