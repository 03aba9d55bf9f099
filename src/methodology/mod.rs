//! Methodology and pedagogical-principle registries
//!
//! Both registries are static, immutable tables. Lookups never fail: an
//! unknown methodology key resolves to the `general` profile, and unknown
//! principle keys are skipped.

mod principles;
mod profiles;

pub use profiles::DEFAULT_METHODOLOGY;

/// Pedagogical strategy and sampling defaults for a subject domain
#[derive(Debug, PartialEq)]
pub struct MethodologyProfile {
    pub key: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    pub temperature: f32,
    pub top_k: u32,
    /// Base methodology text substituted into `{base_methodology}`
    pub template: &'static str,
    pub starters: PromptStarters,
}

/// Suggested opening lines for each editable prompt section
#[derive(Debug, PartialEq)]
pub struct PromptStarters {
    pub identity: &'static [&'static str],
    pub methodology: &'static [&'static str],
    pub rules: &'static [&'static str],
}

/// A selectable teaching principle
#[derive(Debug, PartialEq, Eq)]
pub struct Principle {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Instruction text rendered into the prompt
    pub text: &'static str,
}

/// Look up a methodology, falling back to `general` for unknown keys.
pub fn methodology(key: &str) -> &'static MethodologyProfile {
    profiles::PROFILES
        .iter()
        .find(|p| p.key == key)
        .unwrap_or(&profiles::PROFILES[0])
}

/// Whether `key` names a registered methodology.
pub fn is_known_methodology(key: &str) -> bool {
    profiles::PROFILES.iter().any(|p| p.key == key)
}

/// All methodologies in registry order.
pub fn methodologies() -> &'static [MethodologyProfile] {
    profiles::PROFILES
}

/// Look up a principle by key.
pub fn principle(key: &str) -> Option<&'static Principle> {
    principles::PRINCIPLES.iter().find(|p| p.key == key)
}

/// All principles in registry order.
pub fn principles() -> &'static [Principle] {
    principles::PRINCIPLES
}
