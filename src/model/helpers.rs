//! Small generation helpers built on the `Generator` capability

use super::{bounded_generate, GenerationParams, GenerationRequest, Generator};
use crate::methodology::{self, DEFAULT_METHODOLOGY};
use crate::privacy::LruCache;
use crate::session::{Session, TurnRole};
use std::sync::Arc;
use std::time::Duration;

/// Topics offered when suggestion generation fails.
pub const FALLBACK_TOPICS: [&str; 6] = [
    "The Punic Wars between Rome and Carthage",
    "The Pythagorean theorem",
    "Dante's Divine Comedy",
    "The animal cell",
    "The French Revolution",
    "The laws of thermodynamics",
];

const SUGGESTION_CACHE_CAPACITY: usize = 32;

/// Suggests six study topics per methodology, memoised per methodology key.
pub struct TopicSuggester {
    generator: Arc<dyn Generator>,
    model: String,
    timeout: Duration,
    cache: LruCache<String, Vec<String>>,
}

impl TopicSuggester {
    pub fn new(generator: Arc<dyn Generator>, model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            generator,
            model: model.into(),
            timeout,
            cache: LruCache::new(SUGGESTION_CACHE_CAPACITY),
        }
    }

    /// Topic suggestions for a methodology key. Never fails; a backend
    /// failure yields [`FALLBACK_TOPICS`] and is not memoised.
    pub async fn suggest(&self, methodology_key: &str) -> Vec<String> {
        let profile = methodology::methodology(methodology_key);
        let key = profile.key.to_string();
        if let Some(topics) = self.cache.get(&key).await {
            return topics;
        }

        let prompt = format!(
            "You assist secondary-school teachers. Suggest exactly 6 study topics for the subject \
             \"{}\".\n\n\
             REQUIREMENTS:\n\
             - Level: suitable for students aged 14-18.\n\
             - Simplicity: clear, direct language.\n\
             - Brevity: each topic is a short phrase of at most 10 words.\n\
             - Specificity: avoid generic topics (\"The history of Rome\"); be specific \
             (\"The Punic Wars between Rome and Carthage\").\n\n\
             FORMAT:\n\
             Reply ONLY with the 6 topics separated by commas, without numbering, dashes or \
             explanations.",
            profile.display_name
        );
        let request = GenerationRequest::new(self.model.clone(), prompt)
            .with_params(GenerationParams::short(0.8, Some(250)));

        match bounded_generate(self.generator.as_ref(), request, self.timeout).await {
            Ok(text) => {
                let topics = split_topics(&text);
                if topics.is_empty() {
                    return fallback_topics();
                }
                self.cache.put(key, topics.clone()).await;
                topics
            }
            Err(e) => {
                tracing::error!(methodology = %profile.key, error = %e, "Topic suggestion failed");
                fallback_topics()
            }
        }
    }
}

fn fallback_topics() -> Vec<String> {
    FALLBACK_TOPICS.iter().map(|t| t.to_string()).collect()
}

fn split_topics(text: &str) -> Vec<String> {
    text.split(|c: char| c == ',' || c == '\n')
        .map(|t| t.trim().trim_start_matches(['-', '*']).trim())
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

/// Guess the methodology key best matching the recent conversation and the
/// analysed artifacts. Unknown answers and failures yield the default key.
pub async fn detect_subject(
    generator: &dyn Generator,
    model: &str,
    session: &Session,
    timeout: Duration,
) -> &'static str {
    let start = session.history.len().saturating_sub(4);
    let history: Vec<String> = session.history[start..]
        .iter()
        .map(|turn| {
            let role = match turn.role {
                TurnRole::User => "user",
                TurnRole::Assistant => "model",
            };
            format!("{}: {}", role, turn.text)
        })
        .collect();
    let files: Vec<&str> = session.analyzed.iter().map(|a| a.name.as_str()).collect();

    let options: Vec<String> = methodology::methodologies()
        .iter()
        .map(|p| format!("- Key: '{}', Name: '{}'", p.key, p.display_name))
        .collect();

    let prompt = format!(
        "You are an expert academic classifier. Your only task is to analyse the text below and \
         return the \"Key\" of the most relevant subject from this list.\n\n\
         AVAILABLE SUBJECTS:\n{}\n\n\
         RULES:\n\
         - Reply ONLY with the subject key (e.g. 'history_philosophy').\n\
         - If the context is unclear or generic, reply '{}'.\n\
         - Do not add explanations or other words.\n\n\
         --- TEXT TO CLASSIFY ---\n\
         CHAT CONTEXT:\n{}\n\nANALYSED FILES:\n{}",
        options.join("\n"),
        DEFAULT_METHODOLOGY,
        history.join("\n"),
        files.join(", ")
    );
    let request = GenerationRequest::new(model, prompt).with_params(GenerationParams::short(0.0, None));

    match bounded_generate(generator, request, timeout).await {
        Ok(answer) => {
            let key = answer
                .trim()
                .trim_matches(|c: char| !c.is_ascii_alphanumeric() && c != '_')
                .to_ascii_lowercase();
            if methodology::is_known_methodology(&key) {
                methodology::methodology(&key).key
            } else {
                tracing::debug!(answer_len = answer.len(), "Subject detection answer not recognised");
                DEFAULT_METHODOLOGY
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Subject detection failed");
            DEFAULT_METHODOLOGY
        }
    }
}
