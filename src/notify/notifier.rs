//! Change notifier

use super::ChangeKind;
use crate::config::NotifierConfig;
use crate::methodology;
use crate::model::{bounded_generate, GenerationParams, GenerationRequest, Generator};
use crate::session::{Session, Turn, TurnTag};
use std::sync::Arc;
use std::time::Duration;

/// Why a detected change did not produce a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressReason {
    ModelNotReady,
    Cooldown,
    IngestBusy,
}

/// Result of one notifier pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// First pass for this session; shadow captured, nothing compared
    Initialized,
    NoChange,
    Suppressed {
        kind: ChangeKind,
        reason: SuppressReason,
    },
    Emitted(ChangeKind),
    /// Generation failed; the change still counts as seen
    Failed(ChangeKind),
}

/// Emits at most one contextual message per pass.
pub struct ChangeNotifier {
    generator: Arc<dyn Generator>,
    config: NotifierConfig,
    timeout: Duration,
}

impl ChangeNotifier {
    pub fn new(generator: Arc<dyn Generator>, config: NotifierConfig, timeout: Duration) -> Self {
        Self {
            generator,
            config,
            timeout,
        }
    }

    pub async fn check(&self, session: &mut Session) -> NotifyOutcome {
        self.check_at(session, chrono::Utc::now().timestamp_millis())
            .await
    }

    /// Compare the session's shadow with its live configuration.
    ///
    /// The shadow always advances to the live values, whether the message
    /// was emitted, suppressed or failed.
    pub async fn check_at(&self, session: &mut Session, now_ms: i64) -> NotifyOutcome {
        let current = session.snapshot();
        let Some(shadow) = session.notifier_shadow.replace(current.clone()) else {
            return NotifyOutcome::Initialized;
        };

        let Some(kind) = shadow.first_change(&current) else {
            return NotifyOutcome::NoChange;
        };

        if let Some(reason) = self.suppression(session, now_ms) {
            tracing::debug!(
                session_id = %session.anonymous_id,
                change = %kind,
                ?reason,
                "Change notification suppressed"
            );
            return NotifyOutcome::Suppressed { kind, reason };
        }

        let mut request = GenerationRequest::new(session.model.clone(), notification_prompt(kind, session))
            .with_params(GenerationParams::short(
                self.config.temperature,
                Some(self.config.max_output_tokens),
            ));
        if let Some(system) = session.system_prompt.as_deref() {
            request = request.with_system_instruction(system);
        }

        match bounded_generate(self.generator.as_ref(), request, self.timeout).await {
            Ok(text) if !text.trim().is_empty() => {
                session.last_notification_at = Some(now_ms);
                session
                    .history
                    .push(Turn::tagged(text.trim(), TurnTag::Notification { change: kind }));
                tracing::info!(
                    session_id = %session.anonymous_id,
                    change = %kind,
                    "Change notification emitted"
                );
                NotifyOutcome::Emitted(kind)
            }
            Ok(_) => {
                tracing::warn!(change = %kind, "Change notification came back empty");
                NotifyOutcome::Failed(kind)
            }
            Err(e) => {
                tracing::error!(change = %kind, error = %e, "Change notification failed");
                NotifyOutcome::Failed(kind)
            }
        }
    }

    fn suppression(&self, session: &Session, now_ms: i64) -> Option<SuppressReason> {
        if !session.model_ready {
            return Some(SuppressReason::ModelNotReady);
        }
        if let Some(last) = session.last_notification_at {
            if now_ms.saturating_sub(last) < self.config.cooldown_ms {
                return Some(SuppressReason::Cooldown);
            }
        }
        if session.ingest_busy {
            return Some(SuppressReason::IngestBusy);
        }
        None
    }
}

fn notification_prompt(kind: ChangeKind, session: &Session) -> String {
    let name = methodology::methodology(&session.methodology).display_name;
    let topics = session.topics.as_deref().unwrap_or("general topics");

    match kind {
        ChangeKind::Methodology => format!(
            "As SafeTutor, you have just noticed the teaching methodology switched to \"{name}\". \
             React as if you spotted the change yourself. Briefly explain its advantages and how it \
             will shape your explanations, tying it to the current topics ({topics}). End with a \
             specific invitation. STYLE: enthusiastic, proactive, at most 100 words."
        ),
        ChangeKind::Topics => format!(
            "As SafeTutor using the {name} methodology, you have noticed new study topics: \
             \"{topics}\". Show enthusiasm, explain how the methodology fits them and suggest a \
             first activity. STYLE: engaging, specific, at most 100 words."
        ),
        ChangeKind::Principles => {
            let names: Vec<&str> = session
                .principles
                .iter()
                .filter_map(|k| methodology::principle(k))
                .map(|p| p.name)
                .collect();
            format!(
                "As SafeTutor using the {name} methodology, you have adopted these principles: {}. \
                 Explain how they combine with {name} and how your approach will change, tying it to \
                 the topics ({topics}). STYLE: professional, specific, at most 100 words.",
                names.join(", ")
            )
        }
    }
}
