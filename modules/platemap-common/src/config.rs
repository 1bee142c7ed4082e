use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Web server
    pub web_host: String,
    pub web_port: u16,

    // Dataset
    pub dataset_path: String,

    // Chat relay (optional — the map works without it)
    pub anthropic_api_key: Option<String>,
    pub relay_model: String,
}

impl Config {
    /// Load configuration from environment variables.
    /// Everything has a sensible default except the relay key, which is
    /// simply absent when unset (the chat panel degrades to a notice).
    pub fn from_env() -> Self {
        Self {
            web_host: env::var("WEB_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            web_port: env::var("WEB_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("WEB_PORT must be a number"),
            dataset_path: env::var("DATASET_PATH")
                .unwrap_or_else(|_| "data/places.geojson".to_string()),
            anthropic_api_key: env::var("ANTHROPIC_API_KEY").ok().filter(|k| !k.is_empty()),
            relay_model: env::var("RELAY_MODEL")
                .unwrap_or_else(|_| "claude-3-5-haiku-latest".to_string()),
        }
    }
}
