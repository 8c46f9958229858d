//! Application configuration builders.
//!
//! Constructs the processing pipeline from `Config`.

use tracing::info;

use pagechunk_core::Config;
use pagechunk_ingest::setup::build_pipeline;

use crate::state::AppState;

/// Load configuration from `.env` and environment variables.
pub fn load_config() -> Config {
    pagechunk_core::config::load_dotenv();
    Config::from_env()
}

/// Build the shared state: pipeline plus the config it came from.
pub fn build_state(config: Config) -> anyhow::Result<AppState> {
    let pipeline = build_pipeline(&config)?;
    match pipeline.embedding_model() {
        Some(model) => info!(model, policy = %pipeline.policy(), "embeddings enabled"),
        None => info!("embeddings disabled, /pdf/process will return 503"),
    }
    Ok(AppState::new(pipeline, config))
}
