use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "Consilium";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default Gemini API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default generation model.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Default per-request timeout. Generation calls are network-bound and can
/// take multiple seconds; this bounds how long a single role can block.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Tracing filter used when RUST_LOG is not set.
pub fn default_log_filter() -> String {
    "consilium=info,reqwest=warn".to_string()
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No API key configured. Set GEMINI_API_KEY before starting an analysis.")]
    MissingApiKey,

    #[error("Invalid value for {var}: {value}")]
    InvalidValue { var: String, value: String },
}

/// Connection settings for the generation backend.
///
/// Built once at startup; a missing API key is the one fatal setup failure
/// and is surfaced here, before any pipeline run starts.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl GeminiConfig {
    /// Config with defaults for everything except the key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Read configuration from the environment.
    ///
    /// `GEMINI_API_KEY` is required (`API_KEY` is accepted as a fallback
    /// name). `GEMINI_BASE_URL`, `GEMINI_MODEL` and `GEMINI_TIMEOUT_SECS`
    /// override the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("API_KEY"))
            .map_err(|_| ConfigError::MissingApiKey)?;

        let mut config = Self::new(api_key);

        if let Ok(base_url) = std::env::var("GEMINI_BASE_URL") {
            config.base_url = base_url;
        }
        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            config.model = model;
        }
        if let Ok(raw) = std::env::var("GEMINI_TIMEOUT_SECS") {
            config.timeout_secs = parse_timeout(&raw)?;
        }

        Ok(config)
    }
}

fn parse_timeout(raw: &str) -> Result<u64, ConfigError> {
    raw.parse::<u64>()
        .ok()
        .filter(|secs| *secs > 0)
        .ok_or_else(|| ConfigError::InvalidValue {
            var: "GEMINI_TIMEOUT_SECS".to_string(),
            value: raw.to_string(),
        })
}
