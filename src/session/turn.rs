//! Conversation turns

use crate::model::Content;
use crate::notify::ChangeKind;
use serde::Serialize;
use zeroize::Zeroize;

/// Author of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

/// Why an assistant turn was produced, when it was not a direct reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnTag {
    /// Fixed greeting inserted at session start
    Welcome,
    /// Reaction to a configuration change
    Notification { change: ChangeKind },
    /// Result of analysing an uploaded artifact
    Analysis { artifact: String },
    /// Visible substitute for a failed generation
    Error,
}

/// One entry in a session's history. Never mutated after append.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Turn {
    pub role: TurnRole,
    pub text: String,
    pub tag: Option<TurnTag>,
    /// Unix milliseconds
    pub at: i64,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(TurnRole::User, text, None)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(TurnRole::Assistant, text, None)
    }

    pub fn tagged(text: impl Into<String>, tag: TurnTag) -> Self {
        Self::new(TurnRole::Assistant, text, Some(tag))
    }

    fn new(role: TurnRole, text: impl Into<String>, tag: Option<TurnTag>) -> Self {
        Self {
            role,
            text: text.into(),
            tag,
            at: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Whether the turn should be replayed to the model as conversation
    /// context. Error turns are shown to the user only.
    pub fn is_context(&self) -> bool {
        !matches!(self.tag, Some(TurnTag::Error))
    }

    /// Model-facing form of this turn.
    pub fn to_content(&self) -> Content {
        match self.role {
            TurnRole::User => Content::user(self.text.clone()),
            TurnRole::Assistant => Content::model(self.text.clone()),
        }
    }
}

/// Types holding conversation text that must be wiped before drop.
pub trait Erasable {
    fn erase(&mut self);
}

impl Erasable for Turn {
    fn erase(&mut self) {
        self.text.zeroize();
        if let Some(TurnTag::Analysis { artifact }) = &mut self.tag {
            artifact.zeroize();
        }
    }
}

impl Erasable for Vec<Turn> {
    fn erase(&mut self) {
        for turn in self.iter_mut() {
            turn.erase();
        }
        self.clear();
    }
}
