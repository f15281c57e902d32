mod types;

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

pub use types::*;

use crate::config::Config;
use crate::core::data_url::{self, DataUrl};
use crate::core::{EditRequest, EditResult, VintageError};
use crate::http_client;

const INVALID_RESPONSE_MESSAGE: &str = "Invalid response structure from API.";

/// Anything that can apply an edit instruction to an image
#[async_trait]
pub trait ImageEditor: Send + Sync {
    /// Submit one edit. Never returns [`EditResult::Declined`] from a real
    /// provider; a missing image is reported as
    /// [`VintageError::NoImageReturned`].
    async fn submit_edit(&self, request: &EditRequest) -> Result<EditResult, VintageError>;
}

/// Gemini API client
pub struct GeminiClient {
    http: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    /// Create a new client from config
    pub fn from_config(config: &Config) -> Result<Self, VintageError> {
        let api_key = config
            .api_key()
            .ok_or(VintageError::MissingCredential)?
            .to_string();

        let http = http_client::build(Duration::from_secs(config.api.timeout_secs))?;

        Ok(Self {
            http,
            api_key,
            base_url: config.api.base_url.trim_end_matches('/').to_string(),
            model: config.api.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Call generateContent and return the raw response
    pub async fn generate(&self, request: &EditRequest) -> Result<GenerateResponse, VintageError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = build_generate_request(request);

        tracing::debug!("Sending edit request to: {}", url);
        tracing::debug!(
            "Image: {} ({} base64 chars), prompt: {}",
            request.mime_type(),
            request.base64_data().len(),
            request.prompt()
        );

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        tracing::debug!("Response status: {}", status);
        tracing::trace!("Response body: {}", text);

        if !status.is_success() {
            let message = match serde_json::from_str::<ApiErrorResponse>(&text) {
                Ok(body) => {
                    tracing::warn!(
                        "Gemini API error {} ({}): {}",
                        body.error.code,
                        body.error.status,
                        body.error.message
                    );
                    body.error.message
                }
                Err(_) => format!("{} {}", status, text.trim()),
            };
            return Err(VintageError::provider(message));
        }

        serde_json::from_str(&text).map_err(|e| {
            tracing::debug!("Failed to parse Gemini API response: {}", e);
            VintageError::MalformedResponse(INVALID_RESPONSE_MESSAGE.to_string())
        })
    }
}

#[async_trait]
impl ImageEditor for GeminiClient {
    async fn submit_edit(&self, request: &EditRequest) -> Result<EditResult, VintageError> {
        let result = self
            .generate(request)
            .await
            .and_then(parse_response)
            .and_then(|result| match result {
                EditResult::Declined { message } => Err(VintageError::NoImageReturned(message)),
                edited => Ok(edited),
            });

        if let Err(e) = &result {
            tracing::warn!("Error editing image with Gemini API: {}", e);
        }
        result
    }
}

/// Build the API request body: the image first, then the instruction
pub fn build_generate_request(request: &EditRequest) -> GenerateRequest {
    GenerateRequest {
        contents: vec![Content {
            parts: vec![
                Part::inline_data(request.mime_type(), request.base64_data()),
                Part::text(request.prompt()),
            ],
            role: None,
        }],
        generation_config: Some(GenerationConfig {
            response_modalities: Some(vec!["IMAGE".to_string(), "TEXT".to_string()]),
        }),
    }
}

/// Turn a response into an [`EditResult`].
///
/// Only the first candidate is read, and it must have at least one part.
/// Parts are folded in order; for each kind the last occurrence wins, so a
/// later text part replaces earlier advisory text and a later inline image
/// replaces an earlier one. Empty text and empty inline data are skipped,
/// and a part carrying text is never read as an image.
pub fn parse_response(response: GenerateResponse) -> Result<EditResult, VintageError> {
    if let Some(usage) = &response.usage_metadata {
        tracing::debug!(
            "Token usage: prompt={:?} candidates={:?} total={:?}",
            usage.prompt_token_count,
            usage.candidates_token_count,
            usage.total_token_count
        );
    }

    let block_reason = response
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.clone());

    let Some(candidate) = response.candidates.unwrap_or_default().into_iter().next() else {
        return Err(malformed(block_reason));
    };

    let parts = candidate.content.map(|c| c.parts).unwrap_or_default();
    if parts.is_empty() {
        if let Some(reason) = &candidate.finish_reason {
            tracing::warn!("Candidate finished without content: {}", reason);
        }
        return Err(malformed(block_reason));
    }

    let (image, text) = parts.into_iter().fold(
        (None::<DataUrl>, None::<String>),
        |(image, text), part| match (part.text.filter(|t| !t.is_empty()), part.inline_data) {
            (Some(part_text), _) => (image, Some(part_text)),
            (None, Some(inline)) if !inline.data.is_empty() => (
                Some(data_url::from_base64(&inline.data, &inline.mime_type)),
                text,
            ),
            _ => (image, text),
        },
    );

    if let Some(text) = &text {
        tracing::debug!("Response text: {}", text);
    }

    // finishMessage only explains a missing image
    let text = match image {
        Some(_) => text,
        None => text.or(candidate.finish_message),
    };
    Ok(EditResult::from_parts(image, text))
}

fn malformed(block_reason: Option<String>) -> VintageError {
    let message = match block_reason {
        Some(reason) => format!("{} (prompt blocked: {})", INVALID_RESPONSE_MESSAGE, reason),
        None => INVALID_RESPONSE_MESSAGE.to_string(),
    };
    VintageError::MalformedResponse(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::NO_IMAGE_MESSAGE;
    use crate::core::VINTAGE_PROMPT;

    fn response(json: &str) -> GenerateResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn request_has_image_then_prompt() {
        let req = EditRequest::vintage(data_url::decode("data:image/jpeg;base64,AAEC"));
        let body = serde_json::to_value(build_generate_request(&req)).unwrap();

        let parts = &body["contents"][0]["parts"];
        assert_eq!(parts.as_array().unwrap().len(), 2);
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(parts[0]["inlineData"]["data"], "AAEC");
        assert!(parts[0].get("text").is_none());
        assert_eq!(parts[1]["text"], VINTAGE_PROMPT);
        assert_eq!(
            body["generationConfig"]["responseModalities"],
            serde_json::json!(["IMAGE", "TEXT"])
        );
    }

    #[test]
    fn text_and_image_parts() {
        let resp = response(
            r#"{"candidates":[{"content":{"parts":[
                {"text":"looks great"},
                {"inlineData":{"mimeType":"image/png","data":"iVBORw0KGgo="}}
            ]},"finishReason":"STOP"}]}"#,
        );

        let result = parse_response(resp).unwrap();
        assert_eq!(
            result.image().unwrap().as_str(),
            "data:image/png;base64,iVBORw0KGgo="
        );
        assert_eq!(result.message(), Some("looks great"));
    }

    #[test]
    fn last_part_of_each_kind_wins() {
        let resp = response(
            r#"{"candidates":[{"content":{"parts":[
                {"inlineData":{"mimeType":"image/png","data":"Zmlyc3Q="}},
                {"text":"first"},
                {"inline_data":{"mime_type":"image/jpeg","data":"c2Vjb25k"}},
                {"text":"second"},
                {"inlineData":{"mimeType":"image/webp","data":""}}
            ]}}]}"#,
        );

        let result = parse_response(resp).unwrap();
        assert_eq!(
            result.image().unwrap().as_str(),
            "data:image/jpeg;base64,c2Vjb25k"
        );
        assert_eq!(result.message(), Some("second"));
    }

    #[test]
    fn empty_text_part_keeps_earlier_advisory() {
        let resp = response(
            r#"{"candidates":[{"content":{"parts":[
                {"text":"I can't edit faces"},
                {"text":""}
            ]},"finishMessage":"fm"}]}"#,
        );
        assert_eq!(parse_response(resp).unwrap().message(), Some("I can't edit faces"));

        let resp = response(
            r#"{"candidates":[{"content":{"parts":[{"text":""}]},"finishMessage":"fm"}]}"#,
        );
        assert_eq!(parse_response(resp).unwrap().message(), Some("fm"));
    }

    #[test]
    fn text_part_is_not_read_as_image() {
        let resp = response(
            r#"{"candidates":[{"content":{"parts":[
                {"text":"caption","inlineData":{"mimeType":"image/png","data":"Zmlyc3Q="}}
            ]}}]}"#,
        );
        assert_eq!(
            parse_response(resp).unwrap(),
            EditResult::Declined {
                message: "caption".to_string()
            }
        );
    }

    #[test]
    fn finish_message_is_not_success_text() {
        let resp = response(
            r#"{"candidates":[{"content":{"parts":[
                {"inlineData":{"mimeType":"image/png","data":"iVBORw0KGgo="}}
            ]},"finishReason":"STOP","finishMessage":"Model generated function call(s)."}]}"#,
        );
        let result = parse_response(resp).unwrap();
        assert!(result.image().is_some());
        assert_eq!(result.message(), None);
    }

    #[test]
    fn candidate_without_parts_is_malformed() {
        let resp = response(r#"{"candidates":[{"content":{"parts":[]}}]}"#);
        assert!(matches!(
            parse_response(resp),
            Err(VintageError::MalformedResponse(_))
        ));

        let resp = response(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#);
        assert!(matches!(
            parse_response(resp),
            Err(VintageError::MalformedResponse(_))
        ));
    }

    #[test]
    fn no_candidates_mentions_block_reason() {
        let resp = response(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#);
        let err = parse_response(resp).unwrap_err();
        assert_eq!(
            err.to_string(),
            "AI processing failed: Invalid response structure from API. (prompt blocked: SAFETY)"
        );
    }

    #[test]
    fn text_only_is_declined_with_text() {
        let resp = response(r#"{"candidates":[{"content":{"parts":[{"text":"I can't do that"}]}}]}"#);
        assert_eq!(
            parse_response(resp).unwrap(),
            EditResult::Declined {
                message: "I can't do that".to_string()
            }
        );
    }

    #[test]
    fn empty_image_data_is_declined_with_fallback() {
        let resp = response(
            r#"{"candidates":[{"content":{"parts":[{"inlineData":{"mimeType":"image/png","data":""}}]}}]}"#,
        );
        assert_eq!(parse_response(resp).unwrap().message(), Some(NO_IMAGE_MESSAGE));
    }

    #[test]
    fn finish_message_backs_up_missing_text() {
        let resp = response(
            r#"{"candidates":[{"content":{"parts":[{"inlineData":{"mimeType":"image/png","data":""}}]},
                "finishReason":"IMAGE_SAFETY","finishMessage":"Image blocked"}]}"#,
        );
        assert_eq!(parse_response(resp).unwrap().message(), Some("Image blocked"));
    }

    #[test]
    fn missing_key_is_fatal() {
        let mut config = Config::default();
        config.api.key = None;
        assert!(matches!(
            GeminiClient::from_config(&config),
            Err(VintageError::MissingCredential)
        ));
    }

    #[test]
    fn client_uses_configured_model() {
        let mut config = Config::default();
        config.api.key = Some("test-key".to_string());
        config.api.model = "gemini-2.5-flash-image".to_string();

        let client = GeminiClient::from_config(&config).unwrap();
        assert_eq!(client.model(), "gemini-2.5-flash-image");
    }
}
