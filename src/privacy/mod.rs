//! Content-safety pipeline
//!
//! Everything a user types passes through here before it is stored or sent
//! to a model:
//! - Regex-based redaction of personal data and secrets
//! - Markup sanitization for rendered content
//! - Model-backed intent classification (fail-closed, memoised)
//! - The per-session `SecurityGuard` composing the two

pub mod cache;
pub mod guard;
pub mod intent;
pub mod redactor;

pub use cache::LruCache;
pub use guard::{GuardStats, SafeText, SecurityGuard};
pub use intent::{IntentClassifier, Verdict, SUBSYSTEM_ERROR_REASON};
pub use redactor::{Detection, PatternRedactor};
