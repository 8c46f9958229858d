use std::sync::Arc;

use tracing::info;

use pagechunk_server::app_config::{build_state, load_config};
use pagechunk_server::build_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = load_config();
    config.log_summary();

    let addr = config.server.bind_addr();
    let port = config.server.port;
    let state = Arc::new(build_state(config)?);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://localhost:{}", port);
    info!("API docs at http://localhost:{}/docs", port);
    axum::serve(listener, app).await?;

    Ok(())
}
