//! Configuration change notifications
//!
//! Compares a per-session shadow of {methodology, topics, principles}
//! against the live values and, for the first change found, asks the model
//! for a short in-character reaction that is appended to the conversation.

mod notifier;

pub use notifier::{ChangeNotifier, NotifyOutcome, SuppressReason};

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Which watched field changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Methodology,
    Topics,
    Principles,
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Methodology => write!(f, "methodology"),
            Self::Topics => write!(f, "topics"),
            Self::Principles => write!(f, "principles"),
        }
    }
}

/// Last-observed values of the watched fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSnapshot {
    pub methodology: String,
    pub topics: Option<String>,
    pub principles: BTreeSet<String>,
}

impl ConfigSnapshot {
    /// First change from `self` (the shadow) to `current`, in precedence
    /// order methodology, topics, principles.
    ///
    /// Topics cleared back to unset and principles cleared to empty are not
    /// reported.
    pub fn first_change(&self, current: &ConfigSnapshot) -> Option<ChangeKind> {
        if self.methodology != current.methodology {
            return Some(ChangeKind::Methodology);
        }
        if self.topics != current.topics && current.topics.is_some() {
            return Some(ChangeKind::Topics);
        }
        if self.principles != current.principles && !current.principles.is_empty() {
            return Some(ChangeKind::Principles);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(methodology: &str, topics: Option<&str>, principles: &[&str]) -> ConfigSnapshot {
        ConfigSnapshot {
            methodology: methodology.to_string(),
            topics: topics.map(String::from),
            principles: principles.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn test_no_change() {
        let a = snap("general", Some("rome"), &["gamification"]);
        assert_eq!(a.first_change(&a.clone()), None);
    }

    #[test]
    fn test_precedence() {
        let shadow = snap("general", None, &[]);
        let all = snap("music", Some("bach"), &["gamification"]);
        assert_eq!(shadow.first_change(&all), Some(ChangeKind::Methodology));

        let topics_and_principles = snap("general", Some("bach"), &["gamification"]);
        assert_eq!(
            shadow.first_change(&topics_and_principles),
            Some(ChangeKind::Topics)
        );

        let principles_only = snap("general", None, &["gamification"]);
        assert_eq!(
            shadow.first_change(&principles_only),
            Some(ChangeKind::Principles)
        );
    }

    #[test]
    fn test_clearing_is_not_a_change() {
        let shadow = snap("general", Some("rome"), &["gamification"]);
        assert_eq!(shadow.first_change(&snap("general", None, &[])), None);
    }

    #[test]
    fn test_principle_set_order_irrelevant() {
        let a = snap("general", None, &["a", "b"]);
        let b = snap("general", None, &["b", "a"]);
        assert_eq!(a.first_change(&b), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(ChangeKind::Topics.to_string(), "topics");
    }
}
