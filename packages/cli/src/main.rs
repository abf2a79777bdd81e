use std::net::SocketAddr;

use tracing::info;
use tracing_subscriber::EnvFilter;

use proposalpilot_cli::{build_router, Config};
use proposalpilot_proposals::DbState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    info!("Starting ProposalPilot server on port {}", config.port);

    let db = DbState::init_with_path(config.database_path.clone()).await?;

    let app = build_router(db, &config.cors_origin)?;

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
