//! HTTP client for the Gemini `generateContent` endpoint

use super::{GenerationRequest, Generator, Role, SafetySetting};
use crate::error::{Error, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use zeroize::Zeroizing;

/// Gemini REST client.
///
/// The API key is held in zeroizing storage and sent as a header, never in
/// the URL.
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: Zeroizing<String>,
}

impl GeminiClient {
    /// Create a client for `base_url` (e.g. `https://generativelanguage.googleapis.com`).
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let api_key = Zeroizing::new(api_key.into());
        if api_key.trim().is_empty() {
            return Err(Error::Config("API key is empty".to_string()));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    safety_settings: Vec<SafetySetting>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<GeminiBlob>,
}

impl GeminiPart {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiBlob {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

fn build_request(request: &GenerationRequest) -> GeminiRequest {
    let mut contents: Vec<GeminiContent> = request
        .contents
        .iter()
        .map(|c| GeminiContent {
            role: Some(
                match c.role {
                    Role::User => "user",
                    Role::Model => "model",
                }
                .to_string(),
            ),
            parts: vec![GeminiPart::text(c.text.clone())],
        })
        .collect();

    if let Some(media) = &request.media {
        let blob = GeminiPart {
            text: None,
            inline_data: Some(GeminiBlob {
                mime_type: media.mime_type.clone(),
                data: STANDARD.encode(&media.data),
            }),
        };
        match contents.iter_mut().rev().find(|c| c.role.as_deref() == Some("user")) {
            Some(last_user) => last_user.parts.push(blob),
            None => contents.push(GeminiContent {
                role: Some("user".to_string()),
                parts: vec![blob],
            }),
        }
    }

    GeminiRequest {
        system_instruction: request.system_instruction.as_ref().map(|text| GeminiContent {
            role: None,
            parts: vec![GeminiPart::text(text.clone())],
        }),
        contents,
        generation_config: GeminiGenerationConfig {
            temperature: request.params.temperature,
            top_p: request.params.top_p,
            top_k: request.params.top_k,
            max_output_tokens: request.params.max_output_tokens,
        },
        safety_settings: request.params.safety_settings.clone(),
    }
}

fn extract_text(response: GeminiResponse) -> Result<String> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(Error::Capability(format!("prompt blocked by backend: {}", reason)));
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| Error::Capability("response contained no candidates".to_string()))?;

    let text: String = candidate
        .content
        .map(|c| {
            c.parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "UNKNOWN".to_string());
        return Err(Error::Capability(format!(
            "response contained no text (finish reason: {})",
            reason
        )));
    }
    Ok(text)
}

#[async_trait]
impl Generator for GeminiClient {
    async fn generate(&self, request: GenerationRequest) -> Result<String> {
        let url = self.endpoint(&request.model);
        let body = build_request(&request);

        tracing::debug!(
            model = %request.model,
            turns = body.contents.len(),
            has_media = request.media.is_some(),
            "Sending generateContent request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.api_key.as_str())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Gemini request failed: {}", e);
                Error::Capability(format!("Gemini request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Gemini returned error {}: {}", status, error_text);
            return Err(Error::Capability(format!(
                "Gemini returned error {}: {}",
                status, error_text
            )));
        }

        let parsed: GeminiResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Gemini response: {}", e);
            Error::Capability(format!("Failed to parse Gemini response: {}", e))
        })?;

        extract_text(parsed)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Content, GenerationParams, MediaPayload};
    use bytes::Bytes;

    #[test]
    fn test_build_request_shape() {
        let request = GenerationRequest::conversation(
            "gemini-2.5-flash",
            vec![Content::user("hi"), Content::model("hello"), Content::user("explain")],
        )
        .with_system_instruction("be a tutor");

        let json = serde_json::to_value(build_request(&request)).unwrap();
        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "be a tutor");
        assert_eq!(json["contents"].as_array().unwrap().len(), 3);
        assert_eq!(json["contents"][1]["role"], "model");
        let temperature = json["generationConfig"]["temperature"].as_f64().unwrap();
        assert!((temperature - 0.7).abs() < 1e-6);
        assert_eq!(
            json["safetySettings"][0]["category"],
            "HARM_CATEGORY_HARASSMENT"
        );
        assert_eq!(json["safetySettings"][0]["threshold"], "BLOCK_LOW_AND_ABOVE");
    }

    #[test]
    fn test_build_request_inline_media() {
        let request = GenerationRequest::new("m", "describe").with_media(MediaPayload {
            mime_type: "image/png".to_string(),
            data: Bytes::from_static(b"abc"),
        });
        let json = serde_json::to_value(build_request(&request)).unwrap();
        let parts = &json["contents"][0]["parts"];
        assert_eq!(parts[0]["text"], "describe");
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[1]["inlineData"]["data"], "YWJj");
    }

    #[test]
    fn test_build_request_omits_unset_params() {
        let request =
            GenerationRequest::new("m", "x").with_params(GenerationParams::short(0.0, Some(20)));
        let json = serde_json::to_value(build_request(&request)).unwrap();
        assert!(json["generationConfig"].get("topK").is_none());
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 20);
        assert!(json.get("safetySettings").is_none());
        assert!(json.get("systemInstruction").is_none());
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let response: GeminiResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Hello "},{"text":"there"}]},"finishReason":"STOP"}]}"#,
        )
        .unwrap();
        assert_eq!(extract_text(response).unwrap(), "Hello there");
    }

    #[test]
    fn test_extract_text_blocked_prompt() {
        let response: GeminiResponse =
            serde_json::from_str(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap();
        let err = extract_text(response).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn test_extract_text_empty_candidate() {
        let response: GeminiResponse =
            serde_json::from_str(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#).unwrap();
        assert!(matches!(extract_text(response), Err(Error::Capability(_))));
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let result = GeminiClient::new("https://example.invalid", "  ", Duration::from_secs(1));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_endpoint_trims_slash() {
        let client =
            GeminiClient::new("https://example.invalid/", "k", Duration::from_secs(1)).unwrap();
        assert_eq!(
            client.endpoint("gemini-2.5-pro"),
            "https://example.invalid/v1beta/models/gemini-2.5-pro:generateContent"
        );
    }
}
