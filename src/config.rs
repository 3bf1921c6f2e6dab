use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Configuration for the CulinAIry server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Address the HTTP server binds to
    pub host: String,
    /// Port the HTTP server listens on
    pub port: u16,
    /// URL for the database connection
    pub database_url: String,
    /// Path of the recipe database JSON file
    pub recipes_path: String,
    /// Base URL that relative recipe image paths are joined onto
    pub image_base_url: String,
    /// Base URL of the OpenAI-compatible chat endpoint (up to and including `/v1`)
    pub llm_url: String,
    /// Chat model name
    pub llm_model: String,
    /// Bearer token for the model endpoints, if they require one
    pub llm_api_key: Option<String>,
    /// Default sampling temperature
    pub llm_temperature: f32,
    /// Default cap on generated tokens
    pub llm_max_tokens: u32,
    /// Base URL of the OpenAI-compatible embeddings endpoint
    pub embeddings_url: String,
    /// Embedding model name
    pub embeddings_model: String,
    /// Timeout for a single model request, in seconds
    pub request_timeout_secs: u64,
    /// Whether to build the semantic search index when the server starts
    pub index_on_startup: bool,
}

/// Update structure for Config with all fields optional
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ConfigUpdate {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default)]
    pub recipes_path: Option<String>,
    #[serde(default)]
    pub image_base_url: Option<String>,
    #[serde(default)]
    pub llm_url: Option<String>,
    #[serde(default)]
    pub llm_model: Option<String>,
    #[serde(default)]
    pub llm_api_key: Option<String>,
    #[serde(default)]
    pub llm_temperature: Option<f32>,
    #[serde(default)]
    pub llm_max_tokens: Option<u32>,
    #[serde(default)]
    pub embeddings_url: Option<String>,
    #[serde(default)]
    pub embeddings_model: Option<String>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub index_on_startup: Option<bool>,
    /// Server URL used by the CLI client (ignored by the server)
    #[serde(default)]
    pub server_url: Option<String>,
}

/// Command line arguments for the server
#[derive(Parser, Debug, Default)]
#[clap(name = "culinairy", about = "CulinAIry agentic meal planner API")]
pub struct CliArgs {
    /// Address to bind to
    #[clap(long, env = "CULINAIRY_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[clap(long, env = "CULINAIRY_PORT")]
    pub port: Option<u16>,

    /// Database URL
    #[clap(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Recipe database JSON file
    #[clap(long, env = "RECIPES_PATH")]
    pub recipes_path: Option<String>,

    /// Base URL for recipe images
    #[clap(long, env = "IMAGE_BASE_URL")]
    pub image_base_url: Option<String>,

    /// Chat endpoint base URL
    #[clap(long, env = "NIM_URL")]
    pub llm_url: Option<String>,

    /// Chat model name
    #[clap(long, env = "NIM_MODEL")]
    pub llm_model: Option<String>,

    /// API key for the model endpoints
    #[clap(long, env = "NIM_API_KEY", hide_env_values = true)]
    pub llm_api_key: Option<String>,

    /// Default sampling temperature
    #[clap(long, env = "NIM_TEMPERATURE")]
    pub llm_temperature: Option<f32>,

    /// Default maximum tokens per reply
    #[clap(long, env = "NIM_MAX_TOKENS")]
    pub llm_max_tokens: Option<u32>,

    /// Embeddings endpoint base URL
    #[clap(long, env = "EMBEDDINGS_URL")]
    pub embeddings_url: Option<String>,

    /// Embedding model name
    #[clap(long, env = "EMBEDDINGS_MODEL")]
    pub embeddings_model: Option<String>,

    /// Timeout for model requests in seconds
    #[clap(long, env = "CULINAIRY_REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: Option<u64>,

    /// Build the semantic search index at startup
    #[clap(long, env = "CULINAIRY_INDEX_ON_STARTUP")]
    pub index_on_startup: Option<bool>,

    /// Debug mode
    #[clap(long, env = "CULINAIRY_DEBUG", default_value_t = false)]
    pub debug: bool,

    /// Emit logs as JSON
    #[clap(long, env = "CULINAIRY_LOG_JSON", default_value_t = false)]
    pub log_json: bool,

    /// Directory for daily rotated log files
    #[clap(long, env = "CULINAIRY_LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

impl Config {
    /// Applies a config update to the current configuration
    pub fn apply_update(self, update: ConfigUpdate) -> Self {
        Self {
            host: update.host.unwrap_or(self.host),
            port: update.port.unwrap_or(self.port),
            database_url: update.database_url.unwrap_or(self.database_url),
            recipes_path: update.recipes_path.unwrap_or(self.recipes_path),
            image_base_url: update.image_base_url.unwrap_or(self.image_base_url),
            llm_url: update.llm_url.unwrap_or(self.llm_url),
            llm_model: update.llm_model.unwrap_or(self.llm_model),
            llm_api_key: update.llm_api_key.or(self.llm_api_key),
            llm_temperature: update.llm_temperature.unwrap_or(self.llm_temperature),
            llm_max_tokens: update.llm_max_tokens.unwrap_or(self.llm_max_tokens),
            embeddings_url: update.embeddings_url.unwrap_or(self.embeddings_url),
            embeddings_model: update.embeddings_model.unwrap_or(self.embeddings_model),
            request_timeout_secs: update.request_timeout_secs.unwrap_or(self.request_timeout_secs),
            index_on_startup: update.index_on_startup.unwrap_or(self.index_on_startup),
        }
    }

    /// Returns the model request timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Returns the `host:port` address the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Returns the base (default) configuration
///
/// With a config directory, the database file lives inside it.
pub fn base_config(config_path: Option<PathBuf>) -> Config {
    let database_url = config_path.map_or("culinairy.db".to_string(), |path| {
        path.join("culinairy.db").to_string_lossy().to_string()
    });

    Config {
        host: "0.0.0.0".to_string(),
        port: 8080,
        database_url,
        recipes_path: "recipes_updated.json".to_string(),
        image_base_url: "/images".to_string(),
        llm_url: "http://localhost:8000/v1".to_string(),
        llm_model: "nvidia/llama-3.1-nemotron-nano-8b-v1".to_string(),
        llm_api_key: None,
        llm_temperature: 0.7,
        llm_max_tokens: 300,
        embeddings_url: "http://localhost:8001/v1".to_string(),
        embeddings_model: "nvidia/llama-3.2-nv-embedqa-1b-v2".to_string(),
        request_timeout_secs: 300,
        index_on_startup: true,
    }
}

/// Loads configuration from a TOML file
///
/// A missing path or file yields an empty update.
pub fn config_from_file(config_path: Option<PathBuf>) -> Result<ConfigUpdate, String> {
    let Some(config_path) = config_path else {
        return Ok(ConfigUpdate::default());
    };

    if !config_path.exists() {
        info!("Config file not found at {:?}, using defaults", config_path);
        return Ok(ConfigUpdate::default());
    }

    match fs::read_to_string(&config_path) {
        Ok(content) => match toml::from_str::<ConfigUpdate>(&content) {
            Ok(config) => {
                info!("Loaded configuration from {:?}", config_path);
                Ok(config)
            }
            Err(e) => {
                warn!("Failed to parse config file: {}", e);
                Err(format!("Failed to parse config file: {}", e))
            }
        },
        Err(e) => {
            warn!("Failed to read config file: {}", e);
            Err(format!("Failed to read config file: {}", e))
        }
    }
}

/// Loads configuration from command line arguments
pub fn config_from_args(args: CliArgs) -> ConfigUpdate {
    ConfigUpdate {
        host: args.host,
        port: args.port,
        database_url: args.database_url,
        recipes_path: args.recipes_path,
        image_base_url: args.image_base_url,
        llm_url: args.llm_url,
        llm_model: args.llm_model,
        llm_api_key: args.llm_api_key,
        llm_temperature: args.llm_temperature,
        llm_max_tokens: args.llm_max_tokens,
        embeddings_url: args.embeddings_url,
        embeddings_model: args.embeddings_model,
        request_timeout_secs: args.request_timeout_secs,
        index_on_startup: args.index_on_startup,
        server_url: None,
    }
}

/// Returns the XDG config directory if it exists
pub fn get_config_dir_path() -> Option<PathBuf> {
    let Some(proj_dirs) = ProjectDirs::from("com", "culinairy", "culinairy") else {
        warn!("Could not determine XDG config directory, skipping config file");
        return None;
    };

    let path = proj_dirs.config_dir().to_path_buf();
    if path.exists() {
        Some(path)
    } else {
        info!("Config path not found at {:?}, using defaults", path);
        None
    }
}

/// Gets the complete configuration by combining defaults with
/// values from config file, environment variables, and command line arguments
/// in order of increasing precedence
pub fn get_config(args: CliArgs) -> Config {
    let config_path = get_config_dir_path();
    let base = base_config(config_path.clone());

    let config = base
        .apply_update(config_from_file(config_path.map(|dir| dir.join("config.toml"))).unwrap_or_default())
        .apply_update(config_from_args(args));

    info!(
        "Final configuration: bind={}, database_url={}, recipes_path={}, llm_url={}, embeddings_url={}",
        config.bind_address(),
        config.database_url,
        config.recipes_path,
        config.llm_url,
        config.embeddings_url
    );

    config
}

#[cfg(test)]
mod tests;
