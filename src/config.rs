use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-3-pro-image-preview";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Resolution tier requested for every card background.
pub const IMAGE_SIZE: &str = "1K";
pub const ASPECT_RATIO: &str = "9:16";
pub const DEFAULT_OUTPUT: &str = "tet-card.png";

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub request_timeout: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub gemini: GeminiConfig,
    pub output_path: PathBuf,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        GeminiConfig {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: None,
        }
    }
}

impl GeminiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `GEMINI_*` variables, falling back to `API_KEY` for the key.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let api_key = env_api_key();
        let model = env::var("GEMINI_MODEL").unwrap_or(defaults.model);
        let base_url = env::var("GEMINI_BASE_URL").unwrap_or(defaults.base_url);
        let request_timeout = env::var("GEMINI_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs);

        GeminiConfig {
            api_key,
            model,
            base_url,
            request_timeout,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            gemini: GeminiConfig::default(),
            output_path: PathBuf::from(DEFAULT_OUTPUT),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let output_path = env::var("TETCARD_OUTPUT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_OUTPUT));

        Config {
            gemini: GeminiConfig::from_env(),
            output_path,
        }
    }

    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }
}

/// Current API key from the environment, ignoring blank values.
pub fn env_api_key() -> Option<String> {
    ["GEMINI_API_KEY", "API_KEY"]
        .iter()
        .filter_map(|name| env::var(name).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_the_image_preview_model() {
        let config = GeminiConfig::new();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert!(config.request_timeout.is_none());
        assert!(config.api_key.is_none());
        assert_eq!(
            config.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-3-pro-image-preview:generateContent"
        );
    }

    #[test]
    fn builder_trims_trailing_slash() {
        let config = GeminiConfig::new()
            .with_base_url("http://127.0.0.1:9000/")
            .with_model("test-model")
            .with_api_key("k");
        assert_eq!(
            config.endpoint(),
            "http://127.0.0.1:9000/models/test-model:generateContent"
        );
        assert_eq!(config.api_key.as_deref(), Some("k"));
    }

    #[test]
    fn config_output_builder() {
        let config = Config::new().with_output("out/card.png");
        assert_eq!(config.output_path, PathBuf::from("out/card.png"));
    }

    #[test]
    fn timeout_builder_sets_request_timeout() {
        let config = GeminiConfig::new().with_timeout(Duration::from_secs(45));
        assert_eq!(config.request_timeout, Some(Duration::from_secs(45)));
    }
}
