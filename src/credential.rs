//! Credential gate: answers "is an API key selected?" and runs the selection
//! dialog provided by the host.

use crate::config;
use crate::error::{CardError, Result, SelectionError};
use async_trait::async_trait;
use std::io::Write;
use std::sync::{Arc, RwLock};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::Mutex;

/// Host-provided key selection affordance.
#[async_trait]
pub trait CredentialCapability: Send + Sync {
    /// Feature detection. When this is false the gate never calls the other methods.
    fn is_available(&self) -> bool {
        true
    }

    async fn has_selected_api_key(&self) -> Result<bool>;

    /// Opens the selection dialog and resolves once it closes.
    async fn open_select_key(&self) -> Result<()>;
}

/// Stand-in used when the host offers no key selection at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableCapability;

#[async_trait]
impl CredentialCapability for UnavailableCapability {
    fn is_available(&self) -> bool {
        false
    }

    async fn has_selected_api_key(&self) -> Result<bool> {
        Ok(false)
    }

    async fn open_select_key(&self) -> Result<()> {
        Err(CardError::Config("no credential capability".into()))
    }
}

/// Shared slot holding the currently selected API key.
#[derive(Debug, Clone, Default)]
pub struct KeyStore {
    inner: Arc<RwLock<Option<String>>>,
}

impl KeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(key: Option<String>) -> Self {
        let store = Self::new();
        if let Some(key) = key {
            store.set(key);
        }
        store
    }

    pub fn get(&self) -> Option<String> {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Blank keys clear the slot.
    pub fn set(&self, key: impl Into<String>) {
        let key = key.into().trim().to_string();
        let value = if key.is_empty() { None } else { Some(key) };
        match self.inner.write() {
            Ok(mut guard) => *guard = value,
            Err(poisoned) => *poisoned.into_inner() = value,
        }
    }

    pub fn clear(&self) {
        self.set("");
    }

    pub fn is_set(&self) -> bool {
        self.get().is_some()
    }
}

/// Key selection backed by process environment variables.
#[derive(Debug, Clone)]
pub struct EnvCapability {
    store: KeyStore,
}

impl EnvCapability {
    pub fn new(store: KeyStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CredentialCapability for EnvCapability {
    async fn has_selected_api_key(&self) -> Result<bool> {
        Ok(self.store.is_set())
    }

    async fn open_select_key(&self) -> Result<()> {
        match config::env_api_key() {
            Some(key) => {
                log::info!("🔑 API key picked up from environment");
                self.store.set(key);
            }
            None => log::warn!("⚠️  GEMINI_API_KEY is not set; no key selected"),
        }
        Ok(())
    }
}

/// Interactive selection: reads one line (the key) from `reader`.
///
/// An empty line closes the dialog without choosing a key. That still
/// counts as completion.
pub struct PromptCapability<R> {
    store: KeyStore,
    reader: Mutex<R>,
}

impl<R> PromptCapability<R>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    pub fn new(store: KeyStore, reader: R) -> Self {
        Self {
            store,
            reader: Mutex::new(reader),
        }
    }
}

#[async_trait]
impl<R> CredentialCapability for PromptCapability<R>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    async fn has_selected_api_key(&self) -> Result<bool> {
        Ok(self.store.is_set())
    }

    async fn open_select_key(&self) -> Result<()> {
        print!("🔑 Paste a Gemini API key (billing-enabled project): ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        let read = self.reader.lock().await.read_line(&mut line).await?;
        if read == 0 {
            return Err(CardError::Request("key prompt closed before input".into()));
        }

        let key = line.trim();
        if key.is_empty() {
            log::warn!("⚠️  Key dialog closed without a key");
        } else {
            self.store.set(key);
        }
        Ok(())
    }
}

/// Wraps a capability so callers never have to feature-detect it themselves.
#[derive(Clone)]
pub struct CredentialGate {
    capability: Arc<dyn CredentialCapability>,
}

impl Default for CredentialGate {
    fn default() -> Self {
        Self::new(Arc::new(UnavailableCapability))
    }
}

impl CredentialGate {
    pub fn new(capability: Arc<dyn CredentialCapability>) -> Self {
        Self { capability }
    }

    pub fn is_available(&self) -> bool {
        self.capability.is_available()
    }

    /// Read-only check. Unavailable capabilities and host failures read as `false`.
    pub async fn check_credential(&self) -> bool {
        if !self.capability.is_available() {
            log::debug!("Credential capability not available");
            return false;
        }
        match self.capability.has_selected_api_key().await {
            Ok(selected) => selected,
            Err(e) => {
                log::error!("Key check failed: {}", e);
                false
            }
        }
    }

    /// Runs the selection dialog. `Ok` only means the dialog closed; the key
    /// is not re-verified here.
    pub async fn request_credential_selection(
        &self,
    ) -> std::result::Result<(), SelectionError> {
        if !self.capability.is_available() {
            log::error!("AI Studio environment not detected.");
            return Err(SelectionError::CapabilityUnavailable);
        }
        self.capability
            .open_select_key()
            .await
            .map_err(|e| SelectionError::Dialog(e.to_string()))
    }
}
