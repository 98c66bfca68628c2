//! Server startup.

use std::{io, sync::Arc};

use tokio::net::TcpListener;

use crate::config::{ConfigError, ServerConfig};

use super::{router::build_router, signal::shutdown_signal, state::AppState};

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to bind {addr}: {source}")]
    Bind { addr: String, source: io::Error },

    #[error("Server error: {0}")]
    Serve(#[from] io::Error),
}

/// Bind the configured address and serve until a shutdown signal arrives
pub async fn run(config: ServerConfig) -> Result<(), ServerError> {
    config.validate()?;
    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.to_string(),
            source,
        })?;

    tracing::info!("Listening on ws://{addr}/ws");
    tracing::info!(
        "Serving uploads from {} at {}",
        config.upload_dir.display(),
        config.upload_route()
    );

    serve(listener, Arc::new(AppState::new(config)), shutdown_signal()).await
}

/// Serve on an already bound listener
pub async fn serve(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ServerError> {
    let app = build_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    tracing::info!("Server stopped");
    Ok(())
}
