//! System prompt assembly

use super::template::{find_section, placeholder_regex, placeholders_in, SectionMarkers, TemplateSource, REQUIRED_PLACEHOLDERS};
use crate::error::{Error, Result};
use crate::methodology;
use regex::Captures;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use zeroize::Zeroize;

/// Substituted for `{user_topics}` when no topics are set.
pub const NO_TOPICS: &str = "No specific topics provided.";

/// Substituted for `{custom_methodology}` when no principles are selected.
pub const NO_PRINCIPLES: &str = "None.";

const HIDDEN_SECTION: &str = "[SECTION HIDDEN]";

/// Every placeholder key the assembler knows how to fill.
pub const KNOWN_PLACEHOLDERS: [&str; 4] = [
    "subject_methodology_type",
    "base_methodology",
    "custom_methodology",
    "user_topics",
];

/// One of the three user-overridable prompt fragments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptSection {
    Identity,
    BaseMethodology,
    Rules,
}

impl std::str::FromStr for PromptSection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "identity" => Ok(Self::Identity),
            "base_methodology" | "methodology" => Ok(Self::BaseMethodology),
            "rules" => Ok(Self::Rules),
            other => Err(Error::Validation(format!("unknown prompt section '{}'", other))),
        }
    }
}

/// User overrides for the three sections; unset means "use the default"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptSections {
    pub identity: Option<String>,
    pub base_methodology: Option<String>,
    pub rules: Option<String>,
}

impl PromptSections {
    pub fn get(&self, section: PromptSection) -> Option<&str> {
        match section {
            PromptSection::Identity => self.identity.as_deref(),
            PromptSection::BaseMethodology => self.base_methodology.as_deref(),
            PromptSection::Rules => self.rules.as_deref(),
        }
    }

    /// Set or clear an override. Blank text clears.
    pub fn set(&mut self, section: PromptSection, text: Option<String>) {
        let text = text.filter(|t| !t.trim().is_empty());
        let slot = match section {
            PromptSection::Identity => &mut self.identity,
            PromptSection::BaseMethodology => &mut self.base_methodology,
            PromptSection::Rules => &mut self.rules,
        };
        if let Some(old) = slot.as_mut() {
            old.zeroize();
        }
        *slot = text;
    }

    pub fn erase(&mut self) {
        for slot in [&mut self.identity, &mut self.base_methodology, &mut self.rules] {
            if let Some(text) = slot.as_mut() {
                text.zeroize();
            }
            *slot = None;
        }
    }
}

/// Everything that varies per session
#[derive(Debug, Clone, Copy)]
pub struct PromptInputs<'a> {
    pub methodology_key: &'a str,
    pub sections: &'a PromptSections,
    pub principles: &'a BTreeSet<String>,
    pub custom_principles: Option<&'a str>,
    pub topics: Option<&'a str>,
}

impl<'a> PromptInputs<'a> {
    pub fn from_session(session: &'a crate::session::Session) -> Self {
        Self {
            methodology_key: &session.methodology,
            sections: &session.sections,
            principles: &session.principles,
            custom_principles: session.custom_principles.as_deref(),
            topics: session.topics.as_deref(),
        }
    }
}

/// Builds the system instruction from a base template and session inputs.
#[derive(Debug, Clone, Default)]
pub struct PromptAssembler {
    markers: SectionMarkers,
}

impl PromptAssembler {
    pub fn new(markers: SectionMarkers) -> Self {
        Self { markers }
    }

    pub fn markers(&self) -> &SectionMarkers {
        &self.markers
    }

    /// Render the system prompt.
    ///
    /// Fails with `Error::Config` if the template source is invalid, an
    /// identity/rules override targets a section the template lacks, a
    /// required placeholder is gone after section patching, or the text
    /// references a placeholder outside [`KNOWN_PLACEHOLDERS`].
    pub fn build(&self, source: &TemplateSource, inputs: &PromptInputs<'_>) -> Result<String> {
        let template = source.template()?;
        let profile = methodology::methodology(inputs.methodology_key);

        let mut text = template.text().to_string();
        if let Some(identity) = inputs.sections.identity.as_deref() {
            text = patch_section(&text, &self.markers.identity, identity)?;
        }
        if let Some(rules) = inputs.sections.rules.as_deref() {
            text = patch_section(&text, &self.markers.rules, rules)?;
        }

        let present = placeholders_in(&text)?;
        for key in REQUIRED_PLACEHOLDERS {
            if !present.contains(key) {
                return Err(Error::Config(format!(
                    "placeholder {{{}}} is missing from the template after section overrides",
                    key
                )));
            }
        }
        if let Some(unknown) = present.iter().find(|k| !KNOWN_PLACEHOLDERS.contains(&k.as_str())) {
            return Err(Error::Config(format!(
                "unknown placeholder {{{}}} in template",
                unknown
            )));
        }

        let base_methodology = inputs
            .sections
            .base_methodology
            .as_deref()
            .unwrap_or(profile.template);
        let custom = render_principles(inputs.principles, inputs.custom_principles);
        let topics = inputs
            .topics
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(NO_TOPICS);

        let rendered = placeholder_regex()?.replace_all(&text, |caps: &Captures<'_>| {
            let whole = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
            match whole {
                "{{" => return "{".to_string(),
                "}}" => return "}".to_string(),
                _ => {}
            }
            match caps.get(1).map(|m| m.as_str()) {
                Some("subject_methodology_type") => profile.display_name.to_string(),
                Some("base_methodology") => base_methodology.to_string(),
                Some("custom_methodology") => custom.clone(),
                Some("user_topics") => topics.to_string(),
                // unreachable: unknown keys are rejected above
                _ => whole.to_string(),
            }
        });

        let overrides = [
            &inputs.sections.identity,
            &inputs.sections.base_methodology,
            &inputs.sections.rules,
        ]
        .iter()
        .filter(|s| s.is_some())
        .count();
        tracing::debug!(
            methodology = profile.key,
            principles = inputs.principles.len(),
            overrides,
            len = rendered.len(),
            "System prompt assembled"
        );

        Ok(rendered.into_owned())
    }

    /// Copy of `prompt` with the identity section body masked, for display.
    pub fn display_form(&self, prompt: &str) -> String {
        match find_section(prompt, &self.markers.identity) {
            Some((start, heading_end, end)) => {
                let mut out = String::with_capacity(prompt.len());
                out.push_str(&prompt[..start]);
                out.push_str(&prompt[start..heading_end]);
                out.push_str(HIDDEN_SECTION);
                out.push_str("\n\n");
                out.push_str(&prompt[end..]);
                out
            }
            None => prompt.to_string(),
        }
    }
}

/// Replace the body of the section opened by `heading` with `body`.
fn patch_section(text: &str, heading: &str, body: &str) -> Result<String> {
    let (start, heading_end, end) = find_section(text, heading).ok_or_else(|| {
        Error::Config(format!("template has no section headed '{}'", heading))
    })?;

    let mut heading_line = text[start..heading_end].to_string();
    if !heading_line.ends_with('\n') {
        heading_line.push('\n');
    }

    let mut out = String::with_capacity(text.len() + body.len());
    out.push_str(&text[..start]);
    out.push_str(&heading_line);
    out.push_str(body.trim_end());
    out.push('\n');
    if end < text.len() {
        out.push('\n');
    }
    out.push_str(&text[end..]);
    Ok(out)
}

/// Render selected principles as bullets, followed by any free-text block.
fn render_principles(selected: &BTreeSet<String>, custom: Option<&str>) -> String {
    let mut parts = Vec::new();

    let bullets: Vec<String> = selected
        .iter()
        .filter_map(|key| methodology::principle(key))
        .map(|p| format!("- **{}:** {}", p.name, p.text))
        .collect();
    if !bullets.is_empty() {
        parts.push("**ADDITIONAL PEDAGOGICAL PRINCIPLES:**".to_string());
        parts.extend(bullets);
    }

    if let Some(text) = custom.map(str::trim).filter(|t| !t.is_empty()) {
        parts.push("**CUSTOM PRINCIPLES:**".to_string());
        parts.push(text.to_string());
    }

    if parts.is_empty() {
        NO_PRINCIPLES.to_string()
    } else {
        parts.join("\n")
    }
}

/// Split topics on commas and newlines, trim, drop blanks and duplicates
/// (first occurrence wins), and re-join with ", ". `None` when nothing is
/// left.
pub fn normalize_topics(raw: &str) -> Option<String> {
    let mut seen = BTreeSet::new();
    let topics: Vec<&str> = raw
        .split(|c: char| c == ',' || c == '\n')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(*t))
        .collect();
    if topics.is_empty() {
        None
    } else {
        Some(topics.join(", "))
    }
}
