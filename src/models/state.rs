use crate::error::GenerationError;
use crate::models::card::FormInput;
use crate::models::image::ImageArtifact;

/// Whether a usable API key is selected in the host, as last observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CredentialState {
    #[default]
    Unknown,
    Checked(bool),
}

impl CredentialState {
    pub fn is_selected(&self) -> bool {
        matches!(self, CredentialState::Checked(true))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UiState {
    #[default]
    Idle,
    AwaitingCredential,
    Generating,
    Success(ImageArtifact),
    Failed(GenerationError),
}

impl UiState {
    pub fn name(&self) -> &'static str {
        match self {
            UiState::Idle => "idle",
            UiState::AwaitingCredential => "awaiting-credential",
            UiState::Generating => "generating",
            UiState::Success(_) => "success",
            UiState::Failed(_) => "failed",
        }
    }

    pub fn is_generating(&self) -> bool {
        matches!(self, UiState::Generating)
    }

    pub fn artifact(&self) -> Option<&ImageArtifact> {
        match self {
            UiState::Success(artifact) => Some(artifact),
            _ => None,
        }
    }
}

/// Everything the rendering layer needs from the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentationState {
    pub ui_state: UiState,
    pub artifact: Option<ImageArtifact>,
    pub error_message: Option<String>,
    pub credential_prompt_visible: bool,
    pub has_credential: bool,
    pub form: FormInput,
    pub submitted: Option<FormInput>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_names_are_stable() {
        assert_eq!(UiState::default().name(), "idle");
        assert_eq!(UiState::AwaitingCredential.name(), "awaiting-credential");
        assert_eq!(UiState::Generating.name(), "generating");
        assert_eq!(UiState::Success(ImageArtifact::png("AAAA")).name(), "success");
        assert_eq!(
            UiState::Failed(GenerationError::NoImageReturned).name(),
            "failed"
        );
    }

    #[test]
    fn only_success_carries_an_artifact() {
        let artifact = ImageArtifact::png("AAAA");
        assert_eq!(
            UiState::Success(artifact.clone()).artifact(),
            Some(&artifact)
        );
        assert!(UiState::Generating.artifact().is_none());
        assert!(UiState::Generating.is_generating());
        assert!(!CredentialState::Unknown.is_selected());
        assert!(CredentialState::Checked(true).is_selected());
    }
}
