use pagechunk_core::Config;
use pagechunk_ingest::Pipeline;

/// Shared, read-only application state.
pub struct AppState {
    pub pipeline: Pipeline,
    pub config: Config,
}

impl AppState {
    pub fn new(pipeline: Pipeline, config: Config) -> Self {
        Self { pipeline, config }
    }
}
