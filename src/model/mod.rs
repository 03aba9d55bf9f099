//! Generation capability
//!
//! Every external model call (classification, chat, notifications, artifact
//! analysis, helpers) goes through the [`Generator`] trait and is bounded by
//! [`bounded_generate`]. [`GeminiClient`] is the HTTP implementation.

pub mod gemini;
pub mod helpers;
#[cfg(test)]
pub(crate) mod mock;

pub use gemini::GeminiClient;
pub use helpers::{detect_subject, TopicSuggester, FALLBACK_TOPICS};

use crate::config::ModelsConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Author of a conversation turn as the model sees it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// One turn of model input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content {
    pub role: Role,
    pub text: String,
}

impl Content {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}

/// Harm categories the backend can filter on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HarmCategory {
    #[serde(rename = "HARM_CATEGORY_HARASSMENT")]
    Harassment,
    #[serde(rename = "HARM_CATEGORY_HATE_SPEECH")]
    HateSpeech,
    #[serde(rename = "HARM_CATEGORY_SEXUALLY_EXPLICIT")]
    SexuallyExplicit,
    #[serde(rename = "HARM_CATEGORY_DANGEROUS_CONTENT")]
    DangerousContent,
}

/// Probability threshold at which content is blocked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarmBlockThreshold {
    BlockLowAndAbove,
    BlockMediumAndAbove,
    BlockOnlyHigh,
    BlockNone,
}

/// A content-safety threshold for one harm category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetySetting {
    pub category: HarmCategory,
    pub threshold: HarmBlockThreshold,
}

/// Strictest thresholds for every category; used for all tutoring traffic.
pub fn default_safety_settings() -> Vec<SafetySetting> {
    [
        HarmCategory::Harassment,
        HarmCategory::HateSpeech,
        HarmCategory::SexuallyExplicit,
        HarmCategory::DangerousContent,
    ]
    .into_iter()
    .map(|category| SafetySetting {
        category,
        threshold: HarmBlockThreshold::BlockLowAndAbove,
    })
    .collect()
}

/// Sampling and safety parameters for one call
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub top_p: Option<f32>,
    pub top_k: Option<u32>,
    pub max_output_tokens: Option<u32>,
    pub safety_settings: Vec<SafetySetting>,
}

impl GenerationParams {
    /// Parameters with only a temperature and output cap, as used by the
    /// short auxiliary calls (classifier, notifications, helpers).
    pub fn short(temperature: f32, max_output_tokens: Option<u32>) -> Self {
        Self {
            temperature,
            top_p: None,
            top_k: None,
            max_output_tokens,
            safety_settings: Vec::new(),
        }
    }
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: None,
            top_k: None,
            max_output_tokens: None,
            safety_settings: default_safety_settings(),
        }
    }
}

/// Binary payload attached to a request (image, PDF, audio)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPayload {
    pub mime_type: String,
    pub data: Bytes,
}

/// A complete request to the generation capability
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub model: String,
    pub system_instruction: Option<String>,
    pub contents: Vec<Content>,
    pub params: GenerationParams,
    pub media: Option<MediaPayload>,
}

impl GenerationRequest {
    /// Single-turn request with default parameters.
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system_instruction: None,
            contents: vec![Content::user(prompt)],
            params: GenerationParams::default(),
            media: None,
        }
    }

    /// Multi-turn request over an existing conversation.
    pub fn conversation(model: impl Into<String>, contents: Vec<Content>) -> Self {
        Self {
            model: model.into(),
            system_instruction: None,
            contents,
            params: GenerationParams::default(),
            media: None,
        }
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    /// Attach media to the last user turn.
    pub fn with_media(mut self, media: MediaPayload) -> Self {
        self.media = Some(media);
        self
    }

    /// Text of the last user turn, if any.
    pub fn last_user_text(&self) -> Option<&str> {
        self.contents
            .iter()
            .rev()
            .find(|c| c.role == Role::User)
            .map(|c| c.text.as_str())
    }
}

/// External text generation capability.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate text for the request. Fails on transport errors, non-success
    /// responses, blocked or empty candidates.
    async fn generate(&self, request: GenerationRequest) -> Result<String>;

    /// Backend name for logs.
    fn name(&self) -> &str;
}

/// Run a generation call bounded by `timeout`. Elapsed time is reported as
/// `Error::Capability`.
pub async fn bounded_generate(
    generator: &dyn Generator,
    request: GenerationRequest,
    timeout: Duration,
) -> Result<String> {
    match tokio::time::timeout(timeout, generator.generate(request)).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(
                backend = generator.name(),
                timeout_ms = timeout.as_millis() as u64,
                "Generation call timed out"
            );
            Err(Error::Capability(format!(
                "{} did not answer within {}s",
                generator.name(),
                timeout.as_secs_f32()
            )))
        }
    }
}

/// Per-session sampling overrides set by the user
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SamplingOverrides {
    pub temperature: Option<f32>,
    pub top_k: Option<u32>,
}

impl std::str::FromStr for SamplingOverrides {
    type Err = Error;

    /// Parse `temperature=<f32> top_k=<u32>` pairs, in any order and
    /// separated by spaces or commas. An empty string clears both.
    fn from_str(s: &str) -> Result<Self> {
        let mut overrides = Self::default();
        for pair in s.split(|c: char| c == ',' || c.is_whitespace()).filter(|p| !p.is_empty()) {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| Error::Validation(format!("expected key=value, got '{}'", pair)))?;
            let bad = || Error::Validation(format!("invalid value for {}: '{}'", key, value));
            match key {
                "temperature" | "temp" => overrides.temperature = Some(value.parse().map_err(|_| bad())?),
                "top_k" => overrides.top_k = Some(value.parse().map_err(|_| bad())?),
                other => return Err(Error::Validation(format!("unknown parameter '{}'", other))),
            }
        }
        Ok(overrides)
    }
}

/// Resolve the model id and chat parameters for a methodology.
///
/// Precedence: session override, then the model's per-methodology override,
/// then the model base. Unknown model ids fall back to the configured
/// default model.
pub fn resolve_params(
    models: &ModelsConfig,
    model: &str,
    methodology_key: &str,
    overrides: SamplingOverrides,
) -> (String, GenerationParams) {
    let (model_id, profile) = match models.profiles.get(model) {
        Some(profile) => (model.to_string(), Some(profile)),
        None => (
            models.default_model.clone(),
            models.profiles.get(&models.default_model),
        ),
    };

    let Some(profile) = profile else {
        return (model_id, GenerationParams::default());
    };

    let subject = profile.subject_overrides.get(methodology_key);
    let temperature = overrides
        .temperature
        .or(subject.map(|s| s.temperature))
        .unwrap_or(profile.temperature);
    let top_k = overrides
        .top_k
        .or(subject.map(|s| s.top_k))
        .unwrap_or(profile.top_k);

    (
        model_id,
        GenerationParams {
            temperature,
            top_p: Some(profile.top_p),
            top_k: Some(top_k),
            max_output_tokens: Some(profile.max_output_tokens),
            safety_settings: default_safety_settings(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::mock::MockGenerator;
    use super::*;

    #[test]
    fn test_sampling_overrides_from_str() {
        let parsed: SamplingOverrides = "top_k=20, temperature=0.3".parse().unwrap();
        assert_eq!(
            parsed,
            SamplingOverrides {
                temperature: Some(0.3),
                top_k: Some(20),
            }
        );
        assert_eq!("".parse::<SamplingOverrides>().unwrap(), SamplingOverrides::default());
        assert!("top_k=-1".parse::<SamplingOverrides>().is_err());
        assert!("seed=4".parse::<SamplingOverrides>().is_err());
        assert!("temperature".parse::<SamplingOverrides>().is_err());
    }

    #[tokio::test]
    async fn test_bounded_generate_passes_through() {
        let generator = MockGenerator::with_responses(["hello"]);
        let out = bounded_generate(
            &generator,
            GenerationRequest::new("m", "hi"),
            Duration::from_secs(1),
        )
        .await
        .unwrap();
        assert_eq!(out, "hello");
        assert_eq!(generator.call_count(), 1);
    }

    #[tokio::test]
    async fn test_bounded_generate_times_out() {
        let generator = MockGenerator::stalling(Duration::from_secs(5));
        let err = bounded_generate(
            &generator,
            GenerationRequest::new("m", "hi"),
            Duration::from_millis(20),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Capability(_)));
    }

    #[test]
    fn test_resolve_params_base() {
        let models = ModelsConfig::default();
        let (id, params) = resolve_params(
            &models,
            "gemini-2.5-flash",
            "general",
            SamplingOverrides::default(),
        );
        assert_eq!(id, "gemini-2.5-flash");
        assert_eq!(params.temperature, 0.7);
        assert_eq!(params.top_k, Some(40));
        assert_eq!(params.max_output_tokens, Some(4096));
        assert_eq!(params.safety_settings.len(), 4);
    }

    #[test]
    fn test_resolve_params_subject_override() {
        let models = ModelsConfig::default();
        let (_, params) = resolve_params(
            &models,
            "gemini-2.5-pro",
            "logic_math",
            SamplingOverrides::default(),
        );
        assert_eq!(params.temperature, 0.3);
        assert_eq!(params.top_k, Some(20));
        assert_eq!(params.top_p, Some(0.95));
    }

    #[test]
    fn test_resolve_params_session_override_wins() {
        let models = ModelsConfig::default();
        let overrides = SamplingOverrides {
            temperature: Some(0.1),
            top_k: None,
        };
        let (_, params) = resolve_params(&models, "gemini-2.5-flash", "logic_math", overrides);
        assert_eq!(params.temperature, 0.1);
        assert_eq!(params.top_k, Some(15));
    }

    #[test]
    fn test_resolve_params_unknown_model_falls_back() {
        let models = ModelsConfig::default();
        let (id, params) =
            resolve_params(&models, "gpt-x", "general", SamplingOverrides::default());
        assert_eq!(id, "gemini-2.5-flash");
        assert_eq!(params.top_k, Some(40));
    }

    #[test]
    fn test_default_safety_settings_block_low() {
        let settings = default_safety_settings();
        assert!(settings
            .iter()
            .all(|s| s.threshold == HarmBlockThreshold::BlockLowAndAbove));
    }

    #[test]
    fn test_last_user_text() {
        let req = GenerationRequest::conversation(
            "m",
            vec![Content::user("a"), Content::model("b"), Content::user("c")],
        );
        assert_eq!(req.last_user_text(), Some("c"));
    }
}
