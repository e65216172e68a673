use crate::{
    config::{GeminiConfig, ASPECT_RATIO, IMAGE_SIZE},
    credential::KeyStore,
    error::GenerationError,
    gemini::ImageGenerator,
    logger,
    models::{
        ApiErrorResponse, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
        ImageArtifact, ImageConfig, RequestContent, StyleOption, TextPart,
    },
};
use async_trait::async_trait;
use reqwest::Client;

const PROMPT_TEMPLATE: &str = "A vertical (9:16 aspect ratio) festive background image for a Vietnamese New Year 2026 (Tet Binh Ngo - Year of the Horse) greeting card.
The image should have empty negative space in the CENTER or TOP CENTER to place text overlay.
Key elements: A majestic or cute horse (depending on style), apricot blossoms (yellow), peach blossoms (pink), red lanterns, lucky money envelopes.
Colors: Vibrant Red and Gold. High resolution, 8k quality.

Specific Style: ";

/// Prompt text for a card background in the given style.
pub fn build_prompt(style: StyleOption) -> String {
    format!("{}{}", PROMPT_TEMPLATE, style.label())
}

pub fn build_request(style: StyleOption) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![RequestContent {
            parts: vec![TextPart {
                text: build_prompt(style),
            }],
        }],
        generation_config: GenerationConfig {
            response_modalities: vec!["TEXT".to_string(), "IMAGE".to_string()],
            image_config: ImageConfig {
                aspect_ratio: ASPECT_RATIO.to_string(),
                image_size: IMAGE_SIZE.to_string(),
            },
        },
    }
}

/// First inline image part of the first candidate, wrapped as PNG.
pub fn extract_artifact(
    response: &GenerateContentResponse,
) -> Result<ImageArtifact, GenerationError> {
    response
        .candidates
        .first()
        .and_then(|candidate| candidate.content.as_ref())
        .and_then(|content| content.parts.iter().find_map(|part| part.inline_data.as_ref()))
        .map(|inline| ImageArtifact::png(inline.data.clone()))
        .ok_or(GenerationError::NoImageReturned)
}

#[derive(Clone)]
pub struct ImageClient {
    client: Client,
    config: GeminiConfig,
    keys: KeyStore,
}

impl ImageClient {
    pub fn new(client: Client, config: GeminiConfig, keys: KeyStore) -> Self {
        Self {
            client,
            config,
            keys,
        }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    pub async fn generate(&self, style: StyleOption) -> Result<ImageArtifact, GenerationError> {
        // Read on every call so a key chosen after startup is used.
        let api_key = self
            .keys
            .get()
            .ok_or_else(|| GenerationError::classify("No API key selected"))?;

        let request = build_request(style);
        log::info!(
            "Generating card background with model: {} (style: {})",
            self.config.model,
            style.id()
        );
        log::debug!("Image prompt: {}", request.contents[0].parts[0].text);

        let _timer = logger::timer("gemini generateContent");
        let response = self
            .client
            .post(self.config.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                log::error!("Error generating image: {}", e);
                GenerationError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    log::warn!("Could not read error body for HTTP {}: {}", status.as_u16(), e);
                    String::new()
                }
            };
            let detail = serde_json::from_str::<ApiErrorResponse>(&body)
                .ok()
                .and_then(|e| e.error.message)
                .unwrap_or(body);
            let err = GenerationError::classify(format!("HTTP {}: {}", status.as_u16(), detail));
            log::error!("Error generating image: {}", err);
            return Err(err);
        }

        let payload: GenerateContentResponse = response.json().await.map_err(|e| {
            log::error!("Malformed generateContent response: {}", e);
            GenerationError::Transport(format!("Malformed response: {}", e))
        })?;

        let artifact = extract_artifact(&payload)?;
        log::info!("Image received: {} base64 characters", artifact.data.len());
        Ok(artifact)
    }
}

#[async_trait]
impl ImageGenerator for ImageClient {
    async fn invoke(&self, style: StyleOption) -> Result<ImageArtifact, GenerationError> {
        self.generate(style).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Candidate, CandidateContent, InlineData, ResponsePart};

    fn response_with(parts: Vec<ResponsePart>) -> GenerateContentResponse {
        GenerateContentResponse {
            candidates: vec![Candidate {
                content: Some(CandidateContent { parts }),
            }],
        }
    }

    fn text_part(text: &str) -> ResponsePart {
        ResponsePart {
            text: Some(text.to_string()),
            inline_data: None,
        }
    }

    fn image_part(data: &str) -> ResponsePart {
        ResponsePart {
            text: None,
            inline_data: Some(InlineData {
                mime_type: Some("image/jpeg".to_string()),
                data: data.to_string(),
            }),
        }
    }

    #[test]
    fn prompt_is_deterministic_and_names_style_once() {
        for style in StyleOption::ALL {
            let first = build_prompt(style);
            assert_eq!(first, build_prompt(style));
            assert_eq!(first.matches(style.label()).count(), 1, "{:?}", style);
            assert!(first.contains("9:16"));
            assert!(first.contains("horse"));
            assert!(first.contains("lanterns"));
            assert!(first.contains("Red and Gold"));
            assert!(first.contains("negative space"));
        }
    }

    #[test]
    fn request_carries_fixed_image_config() {
        let request = build_request(StyleOption::Cyberpunk);
        assert_eq!(request.generation_config.image_config.aspect_ratio, "9:16");
        assert_eq!(request.generation_config.image_config.image_size, "1K");
        assert_eq!(
            request.contents[0].parts[0].text,
            build_prompt(StyleOption::Cyberpunk)
        );
    }

    #[test]
    fn first_inline_part_wins() {
        let response = response_with(vec![
            text_part("Here you go"),
            image_part("Zmlyc3Q="),
            image_part("c2Vjb25k"),
        ]);
        let artifact = extract_artifact(&response).unwrap();
        assert_eq!(artifact.data, "Zmlyc3Q=");
        assert_eq!(artifact.mime_type, "image/png");
    }

    #[test]
    fn text_only_response_is_no_image() {
        let response = response_with(vec![text_part("I can't draw that")]);
        assert_eq!(
            extract_artifact(&response),
            Err(GenerationError::NoImageReturned)
        );
        assert_eq!(
            extract_artifact(&GenerateContentResponse::default()),
            Err(GenerationError::NoImageReturned)
        );
    }

    fn client_for(base_url: &str, key: Option<&str>) -> ImageClient {
        let config = GeminiConfig::new()
            .with_base_url(base_url)
            .with_model("test-image-model");
        ImageClient::new(
            Client::new(),
            config,
            KeyStore::with_key(key.map(String::from)),
        )
    }

    #[tokio::test]
    async fn successful_call_returns_inline_image() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/models/test-image-model:generateContent")
            .match_header("x-goog-api-key", "test-key")
            .match_header("content-type", "application/json")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "contents": [{"parts": [{"text": build_prompt(StyleOption::Watercolor)}]}],
                "generationConfig": {
                    "imageConfig": {"aspectRatio": "9:16", "imageSize": "1K"}
                }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"candidates":[{"content":{"parts":[{"text":"ok"},{"inlineData":{"mimeType":"image/png","data":"iVBORw0KGgo="}}]}}]}"#,
            )
            .expect(1)
            .create_async()
            .await;

        let artifact = client_for(&server.url(), Some("test-key"))
            .generate(StyleOption::Watercolor)
            .await
            .unwrap();
        assert_eq!(artifact, ImageArtifact::png("iVBORw0KGgo="));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn forbidden_status_is_auth_class() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/models/test-image-model:generateContent")
            .with_status(403)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"error":{"code":403,"message":"The caller does not have permission","status":"PERMISSION_DENIED"}}"#,
            )
            .create_async()
            .await;

        let err = client_for(&server.url(), Some("test-key"))
            .generate(StyleOption::Traditional)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            GenerationError::AuthClass("HTTP 403: The caller does not have permission".into())
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn server_error_is_transport() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/models/test-image-model:generateContent")
            .with_status(500)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"error":{"code":500,"message":"Internal error encountered.","status":"INTERNAL"}}"#,
            )
            .create_async()
            .await;

        let err = client_for(&server.url(), Some("test-key"))
            .generate(StyleOption::Traditional)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            GenerationError::Transport("HTTP 500: Internal error encountered.".into())
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn plain_text_error_body_is_kept() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/models/test-image-model:generateContent")
            .with_status(502)
            .with_body("Bad Gateway")
            .create_async()
            .await;

        let err = client_for(&server.url(), Some("test-key"))
            .generate(StyleOption::Traditional)
            .await
            .unwrap_err();
        assert_eq!(err, GenerationError::Transport("HTTP 502: Bad Gateway".into()));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn text_only_success_is_no_image() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/models/test-image-model:generateContent")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"candidates":[{"content":{"parts":[{"text":"no picture today"}]}}]}"#)
            .create_async()
            .await;

        let err = client_for(&server.url(), Some("test-key"))
            .generate(StyleOption::Traditional)
            .await
            .unwrap_err();
        assert_eq!(err, GenerationError::NoImageReturned);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn missing_key_is_auth_class_without_network() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", mockito::Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let err = client_for(&server.url(), None)
            .generate(StyleOption::Traditional)
            .await
            .unwrap_err();
        assert!(err.is_auth_class(), "{:?}", err);
        mock.assert_async().await;
    }
}
