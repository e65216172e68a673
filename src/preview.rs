use crate::models::{FormInput, UiState};
use serde::Serialize;

pub const CARD_TITLE: &str = "Chúc Mừng Năm Mới";
pub const CARD_SUBTITLE: &str = "2026 • Bính Ngọ";
pub const SENDER_PREFIX: &str = "Người gửi: ";

/// Text laid over the generated background.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardOverlay {
    pub title: String,
    pub subtitle: String,
    pub wish: Option<String>,
    pub sender: Option<String>,
}

impl CardOverlay {
    pub fn from_form(form: &FormInput) -> Self {
        Self {
            title: CARD_TITLE.to_string(),
            subtitle: CARD_SUBTITLE.to_string(),
            wish: (!form.wish_text.is_empty()).then(|| form.wish_text.clone()),
            sender: (!form.sender_name.is_empty())
                .then(|| format!("{}{}", SENDER_PREFIX, form.sender_name)),
        }
    }

    pub fn lines(&self) -> Vec<&str> {
        let mut lines = vec![self.title.as_str(), self.subtitle.as_str()];
        if let Some(wish) = &self.wish {
            lines.extend(wish.lines());
        }
        if let Some(sender) = &self.sender {
            lines.push(sender.as_str());
        }
        lines
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CardPreview {
    Loading,
    Empty,
    Ready {
        image_data_uri: String,
        overlay: CardOverlay,
    },
}

impl CardPreview {
    pub fn from_state(ui: &UiState, form: &FormInput) -> Self {
        match ui {
            UiState::Generating => CardPreview::Loading,
            UiState::Success(artifact) => CardPreview::Ready {
                image_data_uri: artifact.to_data_uri(),
                overlay: CardOverlay::from_form(form),
            },
            _ => CardPreview::Empty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenerationError;
    use crate::models::ImageArtifact;

    #[test]
    fn loading_while_generating() {
        assert_eq!(
            CardPreview::from_state(&UiState::Generating, &FormInput::default()),
            CardPreview::Loading
        );
    }

    #[test]
    fn empty_without_artifact() {
        let form = FormInput::default();
        assert_eq!(CardPreview::from_state(&UiState::Idle, &form), CardPreview::Empty);
        assert_eq!(
            CardPreview::from_state(&UiState::Failed(GenerationError::NoImageReturned), &form),
            CardPreview::Empty
        );
    }

    #[test]
    fn ready_overlays_form_text() {
        let form = FormInput::new()
            .with_sender_name("Gia đình Hùng")
            .with_wish_text("Vạn sự như ý\nTỷ sự như mơ");
        let artifact = ImageArtifact::png("AAAA");
        let preview = CardPreview::from_state(&UiState::Success(artifact), &form);

        let CardPreview::Ready {
            image_data_uri,
            overlay,
        } = preview
        else {
            panic!("expected a ready preview");
        };
        assert_eq!(image_data_uri, "data:image/png;base64,AAAA");
        assert_eq!(overlay.wish.as_deref(), Some("Vạn sự như ý\nTỷ sự như mơ"));
        assert_eq!(
            overlay.lines(),
            vec![
                "Chúc Mừng Năm Mới",
                "2026 • Bính Ngọ",
                "Vạn sự như ý",
                "Tỷ sự như mơ",
                "Người gửi: Gia đình Hùng",
            ]
        );
    }

    #[test]
    fn empty_fields_are_omitted() {
        let form = FormInput::new().with_wish_text("");
        let overlay = CardOverlay::from_form(&form);
        assert_eq!(overlay.wish, None);
        assert_eq!(overlay.sender, None);
        assert_eq!(overlay.lines().len(), 2);
    }
}
