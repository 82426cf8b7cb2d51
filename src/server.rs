//! Wiring of stores, resources and the HTTP listener.

use std::sync::Arc;

use axum::Router;
use crudgate_axum::{CorsConfig, Gateway};
use crudgate_mongodb::{MongoClient, MongoStore};
use crudgate_query::{DocumentStore, MemoryStore};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::cli::Cli;
use crate::error::ServerResult;
use crate::models::User;

/// Open the document store selected on the command line.
pub async fn connect_store(cli: &Cli) -> ServerResult<Arc<dyn DocumentStore>> {
    if cli.memory {
        warn!("serving from the in-memory store; records are lost on exit");
        return Ok(Arc::new(MemoryStore::new()));
    }
    let config = cli.mongo_config()?;
    info!(uri = %config.redacted_uri(), database = %config.database, "connecting to MongoDB");
    let client = MongoClient::connect(config).await?;
    Ok(Arc::new(MongoStore::new(client)))
}

/// The gateway with every served resource mounted.
pub fn gateway(store: Arc<dyn DocumentStore>) -> Gateway {
    Gateway::new(store).resource::<User>("users")
}

/// The complete application router.
pub fn app(store: Arc<dyn DocumentStore>, cors: CorsConfig) -> ServerResult<Router> {
    Ok(gateway(store).cors(cors).into_service()?)
}

/// Run the server until interrupted.
pub async fn run(cli: Cli) -> ServerResult<()> {
    let addr = cli.bind_addr()?;
    let store = connect_store(&cli).await?;
    let router = app(store, cli.cors())?;

    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "crudgate listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("crudgate stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
