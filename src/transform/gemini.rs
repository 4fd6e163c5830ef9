/// Gemini image generation over the `generateContent` REST endpoint
///
/// One request per source image: the prompt text plus the image as inline
/// data, asking for an IMAGE response modality.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::payload::{decode_payload, InlinePayload};
use super::TransformClient;
use crate::pipeline::data::{TransformRequest, TransformResult};

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

const API_KEY_HEADER: &str = "x-goog-api-key";
const NO_IMAGE_RETURNED: &str = "no image returned";

/// HTTP client for the Gemini API
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    api_base: String,
}

impl GeminiClient {
    pub fn new(api_base: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.api_base, model)
    }

    async fn call(
        &self,
        request: &TransformRequest,
        api_key: &str,
    ) -> Result<GenerateContentResponse, String> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    RequestPart::Text {
                        text: &request.prompt,
                    },
                    RequestPart::Inline {
                        inline_data: InlineData {
                            mime_type: request.source.mime_type(),
                            data: STANDARD.encode(&request.source.bytes),
                        },
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_modalities: vec!["IMAGE"],
            },
        };

        let response = self
            .http
            .post(self.endpoint(&request.model))
            .header(API_KEY_HEADER, api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(format!("HTTP {}: {}", status, text.trim()));
        }

        response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| format!("invalid response body: {}", e))
    }
}

#[async_trait]
impl TransformClient for GeminiClient {
    async fn transform(&self, request: &TransformRequest, api_key: &str) -> TransformResult {
        info!(model = %request.model, prompt = %request.prompt, "calling image model");

        match self.call(request, api_key).await {
            Ok(response) => extract_image(response),
            Err(detail) => TransformResult::Unavailable(detail),
        }
    }
}

/// Pick the first inline image out of the first candidate
fn extract_image(response: GenerateContentResponse) -> TransformResult {
    let Some(parts) = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts)
    else {
        return TransformResult::Unavailable(NO_IMAGE_RETURNED.to_string());
    };

    let mut texts = Vec::new();
    for part in parts {
        if let Some(inline) = part.inline_data {
            return match decode_payload(inline.data) {
                Ok(bytes) => {
                    debug!(
                        bytes = bytes.len(),
                        mime_type = inline.mime_type.as_deref().unwrap_or("unknown"),
                        "image returned"
                    );
                    TransformResult::Generated(bytes)
                }
                Err(detail) => TransformResult::Unavailable(detail),
            };
        }
        if let Some(text) = part.text {
            texts.push(text);
        }
    }

    if !texts.is_empty() {
        info!(text = %texts.join("\n"), "model replied with text only");
    }
    TransformResult::Unavailable(NO_IMAGE_RETURNED.to_string())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart<'a> {
    Text {
        text: &'a str,
    },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: &'static str,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<&'static str>,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    text: Option<String>,
    #[serde(alias = "inline_data")]
    inline_data: Option<ResponseInlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseInlineData {
    #[serde(alias = "mime_type")]
    mime_type: Option<String>,
    data: InlinePayload,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::data::SourceFrame;
    use httpmock::prelude::*;
    use image::ImageFormat;
    use serde_json::json;

    const MODEL: &str = "gemini-3-pro-image-preview";
    const PATH: &str = "/v1beta/models/gemini-3-pro-image-preview:generateContent";

    fn request() -> TransformRequest {
        let source = SourceFrame {
            bytes: b"SOURCE".to_vec(),
            format: ImageFormat::Jpeg,
            width: 1,
            height: 1,
        };
        TransformRequest::new(source, "make it a watercolor", MODEL)
    }

    fn client(server: &MockServer) -> GeminiClient {
        GeminiClient::new(server.base_url(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn sends_prompt_image_and_modality() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(PATH)
                    .header(API_KEY_HEADER, "secret")
                    .json_body(json!({
                        "contents": [{
                            "parts": [
                                { "text": "make it a watercolor" },
                                { "inlineData": { "mimeType": "image/jpeg", "data": STANDARD.encode(b"SOURCE") } }
                            ]
                        }],
                        "generationConfig": { "responseModalities": ["IMAGE"] }
                    }));
                then.status(200).json_body(json!({
                    "candidates": [{
                        "content": {
                            "parts": [
                                { "text": "Here you go" },
                                { "inlineData": { "mimeType": "image/png", "data": STANDARD.encode(b"PNGDATA") } }
                            ]
                        }
                    }]
                }));
            })
            .await;

        let result = client(&server).transform(&request(), "secret").await;

        mock.assert_async().await;
        assert_eq!(result, TransformResult::Generated(b"PNGDATA".to_vec()));
    }

    #[tokio::test]
    async fn text_only_reply_is_unavailable() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(PATH);
                then.status(200).json_body(json!({
                    "candidates": [{ "content": { "parts": [{ "text": "I cannot do that" }] } }]
                }));
            })
            .await;

        let result = client(&server).transform(&request(), "secret").await;

        assert_eq!(result, TransformResult::Unavailable(NO_IMAGE_RETURNED.to_string()));
    }

    #[tokio::test]
    async fn missing_candidates_is_unavailable() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(PATH);
                then.status(200).json_body(json!({ "promptFeedback": { "blockReason": "SAFETY" } }));
            })
            .await;

        let result = client(&server).transform(&request(), "secret").await;

        assert_eq!(result, TransformResult::Unavailable(NO_IMAGE_RETURNED.to_string()));
    }

    #[tokio::test]
    async fn accepts_snake_case_raw_bytes() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(PATH);
                then.status(200).json_body(json!({
                    "candidates": [{
                        "content": {
                            "parts": [{ "inline_data": { "mime_type": "image/png", "data": [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 1, 2] } }]
                        }
                    }]
                }));
            })
            .await;

        let result = client(&server).transform(&request(), "secret").await;

        assert_eq!(
            result,
            TransformResult::Generated(vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 1, 2])
        );
    }

    #[tokio::test]
    async fn http_error_carries_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(PATH);
                then.status(429).body("quota exceeded");
            })
            .await;

        let result = client(&server).transform(&request(), "secret").await;

        match result {
            TransformResult::Unavailable(detail) => {
                assert!(detail.contains("429"), "{detail}");
                assert!(detail.contains("quota exceeded"), "{detail}");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_unavailable() {
        let client = GeminiClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let result = client.transform(&request(), "secret").await;
        assert!(matches!(result, TransformResult::Unavailable(_)));
    }
}
