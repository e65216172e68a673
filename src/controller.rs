//! Drives the card UI through idle → generating → success/failed, gating every
//! attempt on a selected credential.

use crate::{
    credential::CredentialGate,
    error::{GenerationError, SelectionError},
    gemini::ImageGenerator,
    models::{
        random_wish, CredentialState, FormInput, ImageArtifact, PresentationState, StyleOption,
        UiState,
    },
    preview::CardPreview,
};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateOutcome {
    /// Another attempt is in flight; this call did nothing.
    AlreadyGenerating,
    /// No credential selected; the prompt is shown and nothing was sent.
    CredentialRequired,
    /// The attempt ran to completion and left the controller in this state.
    Finished(UiState),
}

#[derive(Debug, Default)]
struct ControllerState {
    ui: UiState,
    credential: CredentialState,
    prompt_visible: bool,
    error_message: Option<String>,
    form: FormInput,
    submitted: Option<FormInput>,
}

pub struct CardController {
    gate: CredentialGate,
    generator: Arc<dyn ImageGenerator>,
    state: Mutex<ControllerState>,
}

impl CardController {
    pub fn new(gate: CredentialGate, generator: Arc<dyn ImageGenerator>) -> Self {
        Self {
            gate,
            generator,
            state: Mutex::new(ControllerState::default()),
        }
    }

    pub fn with_form(self, form: FormInput) -> Self {
        self.lock().form = form;
        self
    }

    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Startup credential check. Shows the prompt when no key is selected.
    pub async fn initialize(&self) -> bool {
        let selected = self.gate.check_credential().await;
        let mut state = self.lock();
        state.credential = CredentialState::Checked(selected);
        state.prompt_visible = !selected;
        if selected {
            log::info!("✅ API key already selected");
        } else {
            log::warn!("⚠️  No API key selected");
        }
        selected
    }

    pub async fn generate(&self) -> GenerateOutcome {
        let credential = {
            let state = self.lock();
            if state.ui.is_generating() {
                log::debug!("generate() ignored: request already in flight");
                return GenerateOutcome::AlreadyGenerating;
            }
            state.credential
        };

        let checked = match credential {
            CredentialState::Unknown => Some(self.gate.check_credential().await),
            CredentialState::Checked(_) => None,
        };

        let style = {
            let mut state = self.lock();
            if state.ui.is_generating() {
                return GenerateOutcome::AlreadyGenerating;
            }
            if let Some(selected) = checked {
                if state.credential == CredentialState::Unknown {
                    state.credential = CredentialState::Checked(selected);
                }
            }
            if !state.credential.is_selected() {
                log::info!("🔑 No credential selected, showing key prompt");
                state.ui = UiState::AwaitingCredential;
                state.prompt_visible = true;
                if !self.gate.is_available() {
                    state.error_message =
                        Some(GenerationError::CapabilityUnavailable.user_message());
                }
                return GenerateOutcome::CredentialRequired;
            }

            state.error_message = None;
            state.submitted = Some(state.form.clone());
            state.ui = UiState::Generating;
            state.form.style
        };

        log::info!("🎨 Generating card background ({})", style.id());
        let result = self.generator.invoke(style).await;

        let mut state = self.lock();
        match result {
            Ok(artifact) => {
                log::info!("✅ Card background ready");
                state.ui = UiState::Success(artifact);
            }
            Err(err) => {
                let err = err.reclassified();
                log::error!("❌ Generation failed: {}", err);
                state.error_message = Some(err.user_message());
                if err.is_auth_class() {
                    log::warn!("🔑 Authorization failure, asking for a key again");
                    state.credential = CredentialState::Checked(false);
                    state.prompt_visible = true;
                    state.ui = UiState::AwaitingCredential;
                } else {
                    state.ui = UiState::Failed(err);
                }
            }
        }
        GenerateOutcome::Finished(state.ui.clone())
    }

    /// Opens the host's key dialog. On completion the flag is set optimistically
    /// and an `AwaitingCredential` state returns to `Idle`; on failure nothing changes.
    pub async fn complete_credential_prompt(&self) -> Result<(), SelectionError> {
        if let Err(e) = self.gate.request_credential_selection().await {
            log::warn!("⚠️  Key selection did not complete: {}", e);
            return Err(e);
        }

        let mut state = self.lock();
        state.credential = CredentialState::Checked(true);
        state.prompt_visible = false;
        if state.ui == UiState::AwaitingCredential {
            state.ui = UiState::Idle;
        }
        Ok(())
    }

    pub fn set_sender_name(&self, name: impl Into<String>) {
        self.lock().form.set_sender_name(name);
    }

    pub fn set_wish_text(&self, wish: impl Into<String>) {
        self.lock().form.set_wish_text(wish);
    }

    pub fn set_style(&self, style: StyleOption) {
        self.lock().form.style = style;
    }

    /// Replaces the wish with one of the built-in suggestions.
    pub fn randomize_wish(&self) -> String {
        let wish = random_wish();
        self.lock().form.set_wish_text(wish);
        wish.to_string()
    }

    pub fn ui_state(&self) -> UiState {
        self.lock().ui.clone()
    }

    pub fn artifact(&self) -> Option<ImageArtifact> {
        self.lock().ui.artifact().cloned()
    }

    pub fn snapshot(&self) -> PresentationState {
        let state = self.lock();
        PresentationState {
            ui_state: state.ui.clone(),
            artifact: state.ui.artifact().cloned(),
            error_message: state.error_message.clone(),
            credential_prompt_visible: state.prompt_visible,
            has_credential: state.credential.is_selected(),
            form: state.form.clone(),
            submitted: state.submitted.clone(),
        }
    }

    pub fn preview(&self) -> CardPreview {
        let state = self.lock();
        CardPreview::from_state(&state.ui, &state.form)
    }
}
