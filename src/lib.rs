//! Tết Bính Ngọ 2026 greeting cards: a credential-gated request to Google
//! Gemini for a festive background, plus the state machine that drives the UI
//! around it.

pub mod config;
pub mod controller;
pub mod credential;
pub mod error;
pub mod gemini;
pub mod logger;
pub mod models;
pub mod preview;

pub use config::{Config, GeminiConfig};
pub use controller::{CardController, GenerateOutcome};
pub use credential::{
    CredentialCapability, CredentialGate, EnvCapability, KeyStore, PromptCapability,
    UnavailableCapability,
};
pub use error::{CardError, GenerationError, Result, SelectionError};
pub use gemini::{build_prompt, GeminiClient, ImageClient, ImageGenerator};
pub use models::*;
pub use preview::{CardOverlay, CardPreview};
