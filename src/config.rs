//! SafeTutor configuration management

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Environment variable holding the server-side model API key
pub const SERVER_API_KEY_ENV: &str = "GOOGLE_API_KEY";

/// Environment variable overriding the base template location
pub const PROMPT_FILE_ENV: &str = "PROMPT_FILE_PATH";

/// Main SafeTutor configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TutorConfig {
    /// Session lifecycle configuration
    #[serde(default)]
    pub session: SessionConfig,

    /// Security checkpoint configuration
    #[serde(default)]
    pub security: SecurityConfig,

    /// Prompt template configuration
    #[serde(default)]
    pub prompt: PromptConfig,

    /// Model configuration
    #[serde(default)]
    pub models: ModelsConfig,

    /// Change notification configuration
    #[serde(default)]
    pub notifier: NotifierConfig,

    /// Artifact ingestion configuration
    #[serde(default)]
    pub ingest: IngestConfig,
}

impl TutorConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: TutorConfig = toml::from_str(&content)?;
        validate(&config)?;
        Ok(config)
    }

    /// Load `explicit` if given, else the default configuration file if it
    /// exists, else built-in defaults.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        Self::load_with_fallback(explicit, default_config_path().as_deref())
    }

    fn load_with_fallback(explicit: Option<&Path>, fallback: Option<&Path>) -> Result<Self> {
        match (explicit, fallback) {
            (Some(path), _) => Self::load(path),
            (None, Some(path)) if path.exists() => {
                tracing::debug!(path = %path.display(), "Loading default configuration file");
                Self::load(path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Deployment mode derived from the environment.
    pub fn deployment_mode() -> DeploymentMode {
        match std::env::var(SERVER_API_KEY_ENV) {
            Ok(key) if !key.trim().is_empty() => DeploymentMode::Server,
            _ => DeploymentMode::UserKey,
        }
    }
}

/// How the model API key is provided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DeploymentMode {
    /// Key supplied by the operator through the environment
    Server,
    /// Each user brings their own key
    #[default]
    UserKey,
}

impl std::fmt::Display for DeploymentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Server => write!(f, "server"),
            Self::UserKey => write!(f, "user-key"),
        }
    }
}

/// Session lifecycle configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Seconds after session start before the session expires
    pub timeout_secs: u64,

    /// Text of the first assistant turn in every session
    pub welcome_message: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 3600,
            welcome_message: "Hi! I'm your study tutor. My job is to guide you through learning, \
                              not to hand you answers."
                .to_string(),
        }
    }
}

/// Security checkpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Model used for intent classification
    pub classifier_model: String,

    /// Maximum number of memoised classification results
    pub cache_capacity: usize,

    /// Upper bound on a single classification call
    pub classifier_timeout_secs: u64,

    /// Redaction rules, applied in order
    #[serde(default = "default_redaction_rules")]
    pub redaction_rules: Vec<RedactionRule>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            classifier_model: "gemini-1.5-flash".to_string(),
            cache_capacity: 100,
            classifier_timeout_secs: 15,
            redaction_rules: default_redaction_rules(),
        }
    }
}

/// A sensitive-data category and its matcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactionRule {
    /// Category name, used to build the `[<CATEGORY>_REDACTED]` token
    pub category: String,
    /// Regex pattern
    pub pattern: String,
    /// Match case-insensitively
    #[serde(default = "default_true")]
    pub case_insensitive: bool,
}

impl RedactionRule {
    fn new(category: &str, pattern: &str) -> Self {
        Self {
            category: category.to_string(),
            pattern: pattern.to_string(),
            case_insensitive: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Built-in redaction rules in registration order.
///
/// Order matters: a span replaced by an earlier category is never rescanned
/// by a later one.
pub fn default_redaction_rules() -> Vec<RedactionRule> {
    vec![
        RedactionRule::new("email", r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b"),
        RedactionRule::new(
            "phone",
            r"\b(?:\+?\d{1,3}[-.\s]?)?(?:\(?\d{2,4}\)?[-.\s]?){1,3}\d{2,4}\b",
        ),
        RedactionRule::new("fiscal_code", r"\b[A-Z]{6}\d{2}[A-Z]\d{2}[A-Z]\d{3}[A-Z]\b"),
        RedactionRule::new("vat_number", r"\b\d{11}\b"),
        RedactionRule::new("iban", r"\b[A-Z]{2}\d{2}[A-Z0-9]{4}\d{7}[A-Z0-9]{1,16}\b"),
        RedactionRule::new("credit_card", r"\b\d{4}[-\s]?\d{4}[-\s]?\d{4}[-\s]?\d{4}\b"),
        RedactionRule::new("api_key", r"\bAIza[0-9A-Za-z\-_]{35}\b"),
        RedactionRule::new(
            "password",
            r#"(?:password|pwd|pass|secret|key)[\s:=]\s*[A-Za-z0-9!@#$%^&*()_+\-=\[\]{};':"\\|,.<>/?]{6,}"#,
        ),
    ]
}

/// Prompt template configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptConfig {
    /// Path to the base template
    pub template_path: PathBuf,

    /// Heading that opens the identity/persona section
    pub identity_heading: String,

    /// Heading that opens the behavioural rules section
    pub rules_heading: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        let template_path = std::env::var(PROMPT_FILE_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("prompt.md"));
        Self {
            template_path,
            identity_heading: "## 1. IDENTITY AND CORE MISSION".to_string(),
            rules_heading: "## 5. ABSOLUTE RULES AND SAFETY PROTOCOL".to_string(),
        }
    }
}

/// Model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    /// Model used when a session has not chosen one
    pub default_model: String,

    /// Base URL of the generation API
    pub api_base_url: String,

    /// Upper bound on chat, notification and analysis calls
    pub request_timeout_secs: u64,

    /// Model profiles by model id
    pub profiles: HashMap<String, ModelProfile>,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        let mut profiles = HashMap::new();
        profiles.insert(
            "gemini-2.5-flash".to_string(),
            ModelProfile {
                display_name: "Gemini 2.5 Flash (standard)".to_string(),
                description: "Fast and efficient for everyday use".to_string(),
                temperature: 0.7,
                top_p: 0.9,
                top_k: 40,
                max_output_tokens: 4096,
                subject_overrides: subject_overrides(&[
                    ("logic_math", 0.2, 15),
                    ("linguistics", 0.4, 30),
                    ("technology", 0.4, 30),
                    ("pure_sciences", 0.5, 35),
                    ("law_economics", 0.6, 40),
                    ("history_philosophy", 0.8, 45),
                    ("literature", 0.85, 50),
                    ("visual_arts", 0.9, 55),
                ]),
            },
        );
        profiles.insert(
            "gemini-2.5-pro".to_string(),
            ModelProfile {
                display_name: "Gemini 2.5 Pro (advanced)".to_string(),
                description: "Highest quality for complex work".to_string(),
                temperature: 0.8,
                top_p: 0.95,
                top_k: 50,
                max_output_tokens: 8192,
                subject_overrides: subject_overrides(&[
                    ("logic_math", 0.3, 20),
                    ("linguistics", 0.5, 35),
                    ("technology", 0.5, 35),
                    ("pure_sciences", 0.6, 40),
                    ("law_economics", 0.7, 45),
                    ("history_philosophy", 0.9, 55),
                    ("literature", 0.9, 55),
                    ("visual_arts", 0.95, 60),
                ]),
            },
        );

        Self {
            default_model: "gemini-2.5-flash".to_string(),
            api_base_url: "https://generativelanguage.googleapis.com".to_string(),
            request_timeout_secs: 60,
            profiles,
        }
    }
}

fn subject_overrides(entries: &[(&str, f32, u32)]) -> HashMap<String, SamplingOverride> {
    entries
        .iter()
        .map(|(key, temperature, top_k)| {
            (
                key.to_string(),
                SamplingOverride {
                    temperature: *temperature,
                    top_k: *top_k,
                },
            )
        })
        .collect()
}

/// Technical profile of a model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelProfile {
    /// Human-readable name
    pub display_name: String,
    /// Short description
    pub description: String,
    /// Base temperature
    pub temperature: f32,
    /// Base top-p
    pub top_p: f32,
    /// Base top-k
    pub top_k: u32,
    /// Maximum output tokens
    pub max_output_tokens: u32,
    /// Sampling overrides keyed by methodology
    #[serde(default)]
    pub subject_overrides: HashMap<String, SamplingOverride>,
}

/// Per-methodology sampling override for a model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingOverride {
    pub temperature: f32,
    pub top_k: u32,
}

/// Change notification configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// Minimum milliseconds between two emitted notifications
    pub cooldown_ms: i64,
    /// Sampling temperature for notification messages
    pub temperature: f32,
    /// Output cap for notification messages
    pub max_output_tokens: u32,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: 3000,
            temperature: 0.7,
            max_output_tokens: 150,
        }
    }
}

/// Artifact ingestion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Maximum document payload in bytes
    pub max_document_bytes: usize,
    /// Maximum image payload in bytes
    pub max_image_bytes: usize,
    /// Maximum audio payload in bytes
    pub max_audio_bytes: usize,
}

const MIB: usize = 1024 * 1024;

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_document_bytes: 10 * MIB,
            max_image_bytes: 5 * MIB,
            max_audio_bytes: 10 * MIB,
        }
    }
}

/// Default location of the configuration file.
pub fn default_config_path() -> Option<PathBuf> {
    dirs_next::config_dir().map(|p| p.join("safetutor").join("config.toml"))
}

/// Validate cross-field constraints that serde cannot express.
pub fn validate(config: &TutorConfig) -> Result<()> {
    if config.security.cache_capacity == 0 {
        return Err(Error::Config(
            "security.cache_capacity must be at least 1".to_string(),
        ));
    }
    if !config.models.profiles.contains_key(&config.models.default_model) {
        return Err(Error::Config(format!(
            "models.default_model '{}' has no profile",
            config.models.default_model
        )));
    }
    if config.session.timeout_secs == 0 {
        return Err(Error::Config(
            "session.timeout_secs must be positive".to_string(),
        ));
    }
    if config.security.classifier_timeout_secs == 0 {
        return Err(Error::Config(
            "security.classifier_timeout_secs must be positive".to_string(),
        ));
    }
    if config.models.request_timeout_secs == 0 {
        return Err(Error::Config(
            "models.request_timeout_secs must be positive".to_string(),
        ));
    }
    Ok(())
}
