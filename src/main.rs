use clap::Parser;
use tokio::net::TcpListener;

use spa_edge::lifecycle::{self, signals, Shutdown};
use spa_edge::observability::{logging, metrics};
use spa_edge::{EdgeServer, EdgeSettings};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = EdgeSettings::parse();
    logging::init()?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "spa-edge starting");

    if let Some(addr) = settings.metrics_address {
        metrics::init_metrics(addr)?;
    }

    let state = lifecycle::prepare(&settings).await?;

    tracing::info!(
        gzip = settings.enable_gzip,
        cache = settings.enable_cache,
        cache_max_age = settings.cache_max_age,
        logging = settings.enable_logging,
        cors_origins = ?settings.cors_origins,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(settings.bind_address()).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = EdgeServer::new(&settings, state);
    let receiver = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait().await;
        shutdown.trigger();
    });

    server.run(listener, receiver).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
