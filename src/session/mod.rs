//! Session state and lifecycle
//!
//! A [`Session`] is plain data owned by the caller and passed by `&mut` to
//! every component; there is no ambient global state. Lifecycle:
//! `uninitialized -> active -> expired`, with [`Session::reset`] returning
//! to a fresh active state under the same anonymous identity.

mod turn;

pub use turn::{Erasable, Turn, TurnRole, TurnTag};

use crate::config::{DeploymentMode, TutorConfig};
use crate::ingest::{AnalyzedArtifact, QueuedArtifact};
use crate::methodology::DEFAULT_METHODOLOGY;
use crate::model::SamplingOverrides;
use crate::notify::ConfigSnapshot;
use crate::prompt::PromptSections;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::{BTreeSet, VecDeque};
use uuid::Uuid;
use zeroize::Zeroize;

/// Computed lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Uninitialized,
    Active,
    Expired,
}

/// Values a session is (re)initialised from
#[derive(Debug, Clone)]
pub struct SessionDefaults {
    pub timeout_secs: u64,
    pub welcome_message: String,
    pub deployment_mode: DeploymentMode,
    pub model: String,
}

impl SessionDefaults {
    pub fn from_config(config: &TutorConfig, deployment_mode: DeploymentMode) -> Self {
        Self {
            timeout_secs: config.session.timeout_secs,
            welcome_message: config.session.welcome_message.clone(),
            deployment_mode,
            model: config.models.default_model.clone(),
        }
    }
}

/// One user's tutoring context
#[derive(Debug)]
pub struct Session {
    /// Opaque identity, stable across resets
    pub anonymous_id: String,
    /// Unix milliseconds of first initialisation, stable across resets
    pub started_at: Option<i64>,
    /// Unix milliseconds from which the timeout is measured
    pub renewed_at: Option<i64>,
    pub defaults: SessionDefaults,

    pub methodology: String,
    pub model: String,
    pub history: Vec<Turn>,
    /// `None` means no topics were provided
    pub topics: Option<String>,
    pub principles: BTreeSet<String>,
    /// Free-text principles entered by the user
    pub custom_principles: Option<String>,
    pub sections: PromptSections,
    pub overrides: SamplingOverrides,

    pub system_prompt: Option<String>,
    pub model_ready: bool,
    /// sha256 hex of a user-supplied API key
    pub api_key_digest: Option<String>,

    pub pending: VecDeque<QueuedArtifact>,
    pub analyzed: Vec<AnalyzedArtifact>,
    pub ingest_busy: bool,

    pub notifier_shadow: Option<ConfigSnapshot>,
    /// Unix milliseconds of the last emitted notification
    pub last_notification_at: Option<i64>,
}

impl Session {
    /// Create an uninitialised session with a fresh anonymous id.
    pub fn new(defaults: SessionDefaults) -> Self {
        let id = Uuid::new_v4().simple().to_string();
        Self::with_identity(format!("session_{}", &id[..12]), defaults)
    }

    fn with_identity(anonymous_id: String, defaults: SessionDefaults) -> Self {
        let model = defaults.model.clone();
        Self {
            anonymous_id,
            started_at: None,
            renewed_at: None,
            defaults,
            methodology: DEFAULT_METHODOLOGY.to_string(),
            model,
            history: Vec::new(),
            topics: None,
            principles: BTreeSet::new(),
            custom_principles: None,
            sections: PromptSections::default(),
            overrides: SamplingOverrides::default(),
            system_prompt: None,
            model_ready: false,
            api_key_digest: None,
            pending: VecDeque::new(),
            analyzed: Vec::new(),
            ingest_busy: false,
            notifier_shadow: None,
            last_notification_at: None,
        }
    }

    /// Populate defaults and the welcome turn. No-op once a start timestamp
    /// exists.
    pub fn initialize(&mut self) {
        self.initialize_at(chrono::Utc::now().timestamp_millis());
    }

    pub fn initialize_at(&mut self, now_ms: i64) {
        if self.started_at.is_some() {
            return;
        }
        self.started_at = Some(now_ms);
        self.renewed_at = Some(now_ms);
        self.history
            .push(Turn::tagged(self.defaults.welcome_message.clone(), TurnTag::Welcome));
        tracing::info!(session_id = %self.anonymous_id, "Session initialized");
    }

    pub fn state(&self) -> SessionState {
        self.state_at(chrono::Utc::now().timestamp_millis())
    }

    pub fn state_at(&self, now_ms: i64) -> SessionState {
        if self.started_at.is_none() {
            SessionState::Uninitialized
        } else if self.is_expired_at(now_ms) {
            SessionState::Expired
        } else {
            SessionState::Active
        }
    }

    /// Whether the timeout has elapsed. Pure; an uninitialised session is
    /// never expired.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(chrono::Utc::now().timestamp_millis())
    }

    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        match self.renewed_at {
            Some(from) => {
                let timeout_ms = (self.defaults.timeout_secs as i64).saturating_mul(1000);
                now_ms.saturating_sub(from) > timeout_ms
            }
            None => false,
        }
    }

    /// Discard everything except the anonymous id and the original start
    /// timestamp, then re-initialise. Discarded conversation text is
    /// zeroized first.
    pub fn reset(&mut self) {
        self.reset_at(chrono::Utc::now().timestamp_millis());
    }

    pub fn reset_at(&mut self, now_ms: i64) {
        self.erase();

        let anonymous_id = std::mem::take(&mut self.anonymous_id);
        let started_at = self.started_at;
        let defaults = self.defaults.clone();

        *self = Self::with_identity(anonymous_id, defaults);
        self.initialize_at(now_ms);
        if started_at.is_some() {
            self.started_at = started_at;
        }
        tracing::info!(session_id = %self.anonymous_id, "Session reset");
    }

    /// Record the digest of a user-supplied API key; the key itself is not
    /// retained.
    pub fn set_api_key(&mut self, api_key: &str) {
        let digest = Sha256::digest(api_key.as_bytes());
        self.api_key_digest = Some(digest.iter().map(|b| format!("{:02x}", b)).collect());
    }

    /// Snapshot of the fields the change notifier watches.
    pub fn snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot {
            methodology: self.methodology.clone(),
            topics: self.topics.clone(),
            principles: self.principles.clone(),
        }
    }

    /// Name already queued or analysed.
    pub fn knows_artifact(&self, name: &str) -> bool {
        self.pending.iter().any(|a| a.name == name) || self.analyzed.iter().any(|a| a.name == name)
    }

    /// Turns replayed to the model as context.
    pub fn context(&self) -> Vec<crate::model::Content> {
        self.history
            .iter()
            .filter(|t| t.is_context())
            .map(Turn::to_content)
            .collect()
    }
}

impl Erasable for Session {
    fn erase(&mut self) {
        self.history.erase();
        if let Some(topics) = self.topics.as_mut() {
            topics.zeroize();
        }
        if let Some(text) = self.custom_principles.as_mut() {
            text.zeroize();
        }
        if let Some(prompt) = self.system_prompt.as_mut() {
            prompt.zeroize();
        }
        self.sections.erase();
        for artifact in self.pending.iter_mut() {
            artifact.erase();
        }
        self.pending.clear();
    }
}
