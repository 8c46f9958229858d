use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_u16(profile: &str, key: &str, default: u16) -> u16 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_u32(profile: &str, key: &str, default: u32) -> u32 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_bool(profile: &str, key: &str, default: bool) -> bool {
    profiled_env_opt(profile, key)
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub server: ServerConfig,
    pub embedding: EmbeddingConfig,
    pub openai: OpenAiConfig,
    pub ollama: OllamaConfig,
    pub chunking: ChunkingConfig,
    pub ingest: IngestConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `PAGECHUNK_PROFILE`. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("PAGECHUNK_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            server: ServerConfig::from_env_profiled(p),
            embedding: EmbeddingConfig::from_env_profiled(p),
            openai: OpenAiConfig::from_env_profiled(p),
            ollama: OllamaConfig::from_env_profiled(p),
            chunking: ChunkingConfig::from_env_profiled(p),
            ingest: IngestConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  server:      {}:{}, cors={}", self.server.host, self.server.port, self.server.cors_origin);
        tracing::info!(
            "  embedding:   provider={}, model={}, dims={}, policy={}",
            self.embedding.provider, self.embedding.model, self.embedding.dimensions, self.embedding.policy
        );
        tracing::info!("  openai:      key={}", if self.openai.is_configured() { "set" } else { "(none)" });
        tracing::info!("  ollama:      url={}", self.ollama.url);
        tracing::info!(
            "  chunking:    context_style={}, merge_list_items={}",
            self.chunking.context_style, self.chunking.merge_list_items
        );
        tracing::info!("  ingest:      input_dir={}", self.ingest.input_dir.display());
        tracing::debug!(config = %self.redacted_summary(), "effective config");
    }

    /// Return a redacted view safe for logs and API responses (no secrets).
    pub fn redacted_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "profile": self.profile_label(),
            "server": {
                "host": self.server.host,
                "port": self.server.port,
                "cors_origin": self.server.cors_origin,
                "max_upload_mb": self.server.max_upload_mb,
            },
            "embedding": {
                "provider": self.embedding.provider,
                "model": self.embedding.model,
                "dimensions": self.embedding.dimensions,
                "policy": self.embedding.policy,
            },
            "openai": {
                "base_url": self.openai.base_url,
                "configured": self.openai.is_configured(),
            },
            "ollama": { "url": self.ollama.url },
            "chunking": {
                "context_style": self.chunking.context_style,
                "merge_list_items": self.chunking.merge_list_items,
            },
        })
    }
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// `*` for any origin, otherwise a single allowed origin.
    pub cors_origin: String,
    pub max_upload_mb: u32,
}

impl ServerConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            host: profiled_env_or(p, "HOST", "0.0.0.0"),
            port: profiled_env_u16(p, "PORT", 8000),
            cors_origin: profiled_env_or(p, "CORS_ORIGIN", "http://localhost:3000"),
            max_upload_mb: profiled_env_u32(p, "MAX_UPLOAD_MB", 100),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb as usize * 1024 * 1024
    }
}

// ── Embedding ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// "openai", "ollama", "none"
    pub provider: String,
    pub model: String,
    pub dimensions: u32,
    /// "required" or "best_effort"
    pub policy: String,
}

impl EmbeddingConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            provider: profiled_env_or(p, "EMBEDDING_PROVIDER", "openai"),
            model: profiled_env_or(p, "EMBEDDING_MODEL", "text-embedding-3-small"),
            dimensions: profiled_env_u32(p, "EMBEDDING_DIMENSIONS", 1536),
            policy: profiled_env_or(p, "EMBEDDING_POLICY", "required"),
        }
    }
}

// ── OpenAI ────────────────────────────────────────────────────

#[derive(Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl OpenAiConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            api_key: profiled_env_opt(p, "OPENAI_API_KEY"),
            base_url: profiled_env_opt(p, "OPENAI_BASE_URL"),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

// ── Ollama (local models) ─────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    pub url: String,
}

impl OllamaConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            url: profiled_env_or(p, "OLLAMA_URL", "http://localhost:11434"),
        }
    }
}

// ── Chunking ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// "plain" or "markdown"
    pub context_style: String,
    pub merge_list_items: bool,
}

impl ChunkingConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            context_style: profiled_env_or(p, "CONTEXT_STYLE", "plain"),
            merge_list_items: profiled_env_bool(p, "CHUNK_MERGE_LIST_ITEMS", false),
        }
    }
}

// ── Batch ingest ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    pub input_dir: PathBuf,
    pub markdown_dir: PathBuf,
    pub chunks_dir: PathBuf,
}

impl IngestConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            input_dir: PathBuf::from(profiled_env_or(p, "INGEST_INPUT_DIR", "pdf")),
            markdown_dir: PathBuf::from(profiled_env_or(p, "INGEST_MARKDOWN_DIR", "md")),
            chunks_dir: PathBuf::from(profiled_env_or(p, "INGEST_CHUNKS_DIR", "chunks")),
        }
    }
}
