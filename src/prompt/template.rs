//! Base template source

use crate::config::PromptConfig;
use crate::error::{Error, Result};
use regex::Regex;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::OnceLock;

/// Placeholders every base template must contain.
pub const REQUIRED_PLACEHOLDERS: [&str; 2] = ["base_methodology", "user_topics"];

/// Headings delimiting the overridable structural sections
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionMarkers {
    pub identity: String,
    pub rules: String,
}

impl SectionMarkers {
    pub fn from_config(config: &PromptConfig) -> Self {
        Self {
            identity: config.identity_heading.clone(),
            rules: config.rules_heading.clone(),
        }
    }
}

impl Default for SectionMarkers {
    fn default() -> Self {
        Self::from_config(&PromptConfig::default())
    }
}

/// Matches `{{`, `}}` and `{key}` in one pass.
pub(crate) fn placeholder_regex() -> Result<&'static Regex> {
    static RE: OnceLock<std::result::Result<Regex, regex::Error>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{|\}\}|\{([a-z_]+)\}"))
        .as_ref()
        .map_err(|e| Error::Internal(format!("placeholder pattern failed to compile: {}", e)))
}

/// Placeholder keys referenced by `text`, ignoring `{{`/`}}` escapes.
pub(crate) fn placeholders_in(text: &str) -> Result<BTreeSet<String>> {
    Ok(placeholder_regex()?
        .captures_iter(text)
        .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
        .collect())
}

/// Byte range of the line starting with `heading` (case-insensitive) through
/// to the next `## ` heading line or end of text. First occurrence only.
pub(crate) fn find_section(text: &str, heading: &str) -> Option<(usize, usize, usize)> {
    let wanted = heading.trim().to_lowercase();
    let mut offset = 0;
    let mut start: Option<(usize, usize)> = None;

    for line in text.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();
        match start {
            None => {
                if line.trim_start().to_lowercase().starts_with(&wanted) {
                    start = Some((line_start, offset));
                }
            }
            Some((s, heading_end)) => {
                if line.starts_with("## ") {
                    return Some((s, heading_end, line_start));
                }
            }
        }
    }
    start.map(|(s, heading_end)| (s, heading_end, text.len()))
}

/// A validated base template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseTemplate {
    text: String,
    has_identity: bool,
    has_rules: bool,
}

impl BaseTemplate {
    /// Validate `text`: both required placeholders must be present. Missing
    /// section headings are recorded; overriding such a section later is an
    /// error.
    pub fn parse(text: impl Into<String>, markers: &SectionMarkers) -> Result<Self> {
        let text = text.into();
        let present = placeholders_in(&text)?;
        for key in REQUIRED_PLACEHOLDERS {
            if !present.contains(key) {
                return Err(Error::Config(format!(
                    "base template is missing the {{{}}} placeholder",
                    key
                )));
            }
        }

        let has_identity = find_section(&text, &markers.identity).is_some();
        let has_rules = find_section(&text, &markers.rules).is_some();
        if !has_identity {
            tracing::warn!(heading = %markers.identity, "Base template has no identity section");
        }
        if !has_rules {
            tracing::warn!(heading = %markers.rules, "Base template has no rules section");
        }

        Ok(Self {
            text,
            has_identity,
            has_rules,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn has_identity_section(&self) -> bool {
        self.has_identity
    }

    pub fn has_rules_section(&self) -> bool {
        self.has_rules
    }
}

/// Either a usable template or the reason it could not be loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    Ready(BaseTemplate),
    Invalid { reason: String },
}

impl TemplateSource {
    pub fn from_text(text: impl Into<String>, markers: &SectionMarkers) -> Self {
        match BaseTemplate::parse(text, markers) {
            Ok(template) => Self::Ready(template),
            Err(e) => {
                tracing::error!(error = %e, "Base template rejected");
                Self::Invalid {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Read and validate the template at `path`. Failures are captured as
    /// `Invalid` and surface when a prompt is built.
    pub async fn load(path: &Path, markers: &SectionMarkers) -> Self {
        match tokio::fs::read_to_string(path).await {
            Ok(text) => {
                let source = Self::from_text(text, markers);
                if source.is_ready() {
                    tracing::info!(path = %path.display(), "Base template loaded");
                }
                source
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Base template not readable");
                Self::Invalid {
                    reason: format!("cannot read base template '{}': {}", path.display(), e),
                }
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// The template, or the configuration error that replaced it.
    pub fn template(&self) -> Result<&BaseTemplate> {
        match self {
            Self::Ready(t) => Ok(t),
            Self::Invalid { reason } => Err(Error::Config(reason.clone())),
        }
    }
}
