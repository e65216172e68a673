pub mod image_client;

use crate::{
    config::GeminiConfig,
    credential::KeyStore,
    error::{CardError, GenerationError, Result},
    models::{ImageArtifact, StyleOption},
};
use async_trait::async_trait;
use reqwest::Client;

pub use image_client::{build_prompt, extract_artifact, ImageClient};

/// One-shot background generation for a style.
///
/// Implementations send exactly one request per call. Callers are expected to
/// keep at most one call outstanding.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn invoke(&self, style: StyleOption) -> std::result::Result<ImageArtifact, GenerationError>;
}

#[derive(Clone)]
pub struct GeminiClient {
    image_client: ImageClient,
    keys: KeyStore,
}

impl GeminiClient {
    /// Builds the HTTP client and seeds the key store from `config.api_key`.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let keys = KeyStore::with_key(config.api_key.clone());
        Self::with_key_store(config, keys)
    }

    pub fn with_key_store(config: GeminiConfig, keys: KeyStore) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| CardError::Config(format!("failed to build HTTP client: {}", e)))?;

        log::debug!("Gemini endpoint: {}", config.endpoint());

        Ok(Self {
            image_client: ImageClient::new(client, config, keys.clone()),
            keys,
        })
    }

    pub fn image(&self) -> &ImageClient {
        &self.image_client
    }

    pub fn key_store(&self) -> &KeyStore {
        &self.keys
    }
}
