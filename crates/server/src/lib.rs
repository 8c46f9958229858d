//! HTTP service: PDF upload → chunks (and embeddings).

pub mod api;
pub mod app_config;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
