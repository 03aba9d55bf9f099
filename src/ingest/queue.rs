//! Sequential artifact analysis

use super::artifact::{AnalyzedArtifact, ArtifactKind, QueuedArtifact};
use crate::config::{IngestConfig, ModelsConfig};
use crate::error::{Error, Result};
use crate::methodology;
use crate::model::{bounded_generate, resolve_params, GenerationRequest, Generator, MediaPayload};
use crate::session::{Session, Turn, TurnTag};
use bytes::Bytes;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

/// Result of an enqueue attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    Queued,
    /// Same name already pending; queue unchanged
    AlreadyQueued,
    /// Same name already analysed in this session; queue unchanged
    AlreadyAnalyzed,
}

/// Progress event emitted before each artifact is handled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestProgress {
    /// Zero-based position in the batch
    pub index: usize,
    pub total: usize,
    pub name: String,
}

/// Per-artifact failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactFailure {
    pub name: String,
    pub error: String,
}

/// Summary of one `process_all` batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub succeeded: Vec<String>,
    pub failed: Vec<ArtifactFailure>,
    /// Unknown kinds and names analysed earlier
    pub skipped: Vec<String>,
}

impl BatchReport {
    pub fn processed(&self) -> usize {
        self.succeeded.len() + self.failed.len() + self.skipped.len()
    }
}

/// Strict FIFO processor over a session's pending artifacts.
///
/// The queue itself lives in the session; this type only carries the
/// analysis backend and limits, so one instance serves every session.
pub struct IngestQueue {
    generator: Arc<dyn Generator>,
    limits: IngestConfig,
    models: ModelsConfig,
    timeout: Duration,
}

impl IngestQueue {
    pub fn new(generator: Arc<dyn Generator>, limits: IngestConfig, models: ModelsConfig) -> Self {
        let timeout = Duration::from_secs(models.request_timeout_secs);
        Self {
            generator,
            limits,
            models,
            timeout,
        }
    }

    /// Append an artifact unless its name is already pending or analysed.
    pub fn enqueue(&self, session: &mut Session, artifact: QueuedArtifact) -> EnqueueOutcome {
        if session.analyzed.iter().any(|a| a.name == artifact.name) {
            tracing::info!(artifact = %artifact.name, "Artifact already analysed, not queued");
            return EnqueueOutcome::AlreadyAnalyzed;
        }
        if session.pending.iter().any(|a| a.name == artifact.name) {
            tracing::info!(artifact = %artifact.name, "Artifact already queued");
            return EnqueueOutcome::AlreadyQueued;
        }
        tracing::debug!(
            artifact = %artifact.name,
            kind = %artifact.kind,
            size = artifact.size(),
            "Artifact queued"
        );
        session.pending.push_back(artifact);
        EnqueueOutcome::Queued
    }

    /// Analyse every pending artifact in order.
    ///
    /// Fails with `Error::Busy` if a batch is already running. Individual
    /// artifact failures are collected in the report and never abort the
    /// batch. Every artifact of the batch leaves the queue, and the busy flag
    /// clears, once the batch ends. If the future is dropped mid-batch the
    /// busy flag still clears and the unfinished artifacts go back to the
    /// head of the queue.
    pub async fn process_all<F>(&self, session: &mut Session, mut progress: F) -> Result<BatchReport>
    where
        F: FnMut(IngestProgress),
    {
        let mut run = BatchRun::start(session)?;
        let total = run.batch.len();
        tracing::info!(session_id = %run.session.anonymous_id, total, "Artifact batch started");

        let mut report = BatchReport::default();
        let mut index = 0;
        while let Some(artifact) = run.batch.front() {
            progress(IngestProgress {
                index,
                total,
                name: artifact.name.clone(),
            });
            index += 1;

            if artifact.kind == ArtifactKind::Unknown
                || run.session.analyzed.iter().any(|a| a.name == artifact.name)
            {
                tracing::debug!(artifact = %artifact.name, "Artifact skipped");
                report.skipped.push(artifact.name.clone());
            } else {
                match self.analyze(&*run.session, artifact).await {
                    Ok(text) => {
                        run.session.history.push(Turn::tagged(
                            text,
                            TurnTag::Analysis {
                                artifact: artifact.name.clone(),
                            },
                        ));
                        run.session.analyzed.push(AnalyzedArtifact {
                            name: artifact.name.clone(),
                            kind: artifact.kind,
                            analyzed_at: chrono::Utc::now().timestamp_millis(),
                        });
                        tracing::info!(artifact = %artifact.name, kind = %artifact.kind, "Artifact analysed");
                        report.succeeded.push(artifact.name.clone());
                    }
                    Err(e) => {
                        tracing::error!(artifact = %artifact.name, error = %e, "Artifact analysis failed");
                        report.failed.push(ArtifactFailure {
                            name: artifact.name.clone(),
                            error: e.to_string(),
                        });
                    }
                }
            }

            if let Some(mut done) = run.batch.pop_front() {
                done.erase();
            }
        }

        tracing::info!(
            session_id = %run.session.anonymous_id,
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            skipped = report.skipped.len(),
            "Artifact batch finished"
        );
        Ok(report)
    }

    async fn analyze(&self, session: &Session, artifact: &QueuedArtifact) -> Result<String> {
        if let Some(limit) = artifact.kind.max_bytes(&self.limits) {
            if artifact.size() > limit {
                return Err(Error::Validation(format!(
                    "'{}' is too large ({:.1}MB, limit {:.1}MB)",
                    artifact.name,
                    artifact.size() as f64 / (1024.0 * 1024.0),
                    limit as f64 / (1024.0 * 1024.0)
                )));
            }
        }

        let system = match (&session.system_prompt, session.model_ready) {
            (Some(system), true) => system,
            _ => return Err(Error::Capability("model not initialized".to_string())),
        };

        let (model, params) = resolve_params(
            &self.models,
            &session.model,
            &session.methodology,
            session.overrides,
        );
        let request = GenerationRequest::new(model, analysis_prompt(session, artifact))
            .with_system_instruction(system.as_str())
            .with_params(params)
            .with_media(MediaPayload {
                mime_type: artifact.mime_type().to_string(),
                data: Bytes::copy_from_slice(&artifact.data),
            });

        let text = bounded_generate(self.generator.as_ref(), request, self.timeout).await?;
        if text.trim().is_empty() {
            return Err(Error::Capability("empty analysis".to_string()));
        }
        Ok(text)
    }
}

/// A running batch. Owns the artifacts taken from the session queue and
/// holds the session's busy flag until dropped.
struct BatchRun<'a> {
    session: &'a mut Session,
    batch: VecDeque<QueuedArtifact>,
}

impl<'a> BatchRun<'a> {
    fn start(session: &'a mut Session) -> Result<Self> {
        if session.ingest_busy {
            return Err(Error::Busy("artifact batch already in progress".to_string()));
        }
        session.ingest_busy = true;
        let batch = std::mem::take(&mut session.pending);
        Ok(Self { session, batch })
    }
}

impl Drop for BatchRun<'_> {
    fn drop(&mut self) {
        if !self.batch.is_empty() {
            tracing::warn!(
                session_id = %self.session.anonymous_id,
                unfinished = self.batch.len(),
                "Artifact batch interrupted, requeueing"
            );
            let mut requeued = std::mem::take(&mut self.batch);
            requeued.append(&mut self.session.pending);
            self.session.pending = requeued;
        }
        self.session.ingest_busy = false;
    }
}

fn analysis_prompt(session: &Session, artifact: &QueuedArtifact) -> String {
    let name = methodology::methodology(&session.methodology).display_name;
    let topics = session.topics.as_deref().unwrap_or("general topics");
    let file = &artifact.name;

    match artifact.kind {
        ArtifactKind::Image => format!(
            "You are an expert tutor specialised in **{name}**. Analyse the image ('{file}') in the \
             context of these topics: **{topics}**.\n\
             1. Describe the key elements of the image.\n\
             2. Highlight its teaching value for the {name} methodology.\n\
             3. Connect the image to the study topics.\n\
             4. Finish with a targeted question that stimulates learning."
        ),
        ArtifactKind::Document => format!(
            "You are an expert tutor in {name}. Analyse the PDF '{file}'.\n\
             1. Identify the main content.\n\
             2. Extract the key concepts relevant to {name}.\n\
             3. Connect the content to these topics: {topics}.\n\
             4. Propose follow-up questions specific to {name}."
        ),
        ArtifactKind::Audio | ArtifactKind::Unknown => format!(
            "You are an expert tutor in {name}. Analyse the audio file '{file}'.\n\
             ANALYSIS FOR {upper}:\n\
             1. **Content**: transcribe significant parts or describe the content.\n\
             2. **Disciplinary analysis**: analyse it according to the principles of {name}.\n\
             3. **Teaching connections**: connect it to these topics: {topics}.\n\
             4. **Guiding questions**: propose questions specific to {name}.",
            upper = name.to_uppercase()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeploymentMode;
    use crate::model::mock::MockGenerator;
    use crate::session::SessionDefaults;

    fn queue(generator: &MockGenerator) -> IngestQueue {
        let limits = IngestConfig {
            max_document_bytes: 64,
            max_image_bytes: 32,
            max_audio_bytes: 64,
        };
        IngestQueue::new(Arc::new(generator.clone()), limits, ModelsConfig::default())
    }

    fn ready_session() -> Session {
        let mut s = Session::new(SessionDefaults {
            timeout_secs: 3600,
            welcome_message: "hi".to_string(),
            deployment_mode: DeploymentMode::UserKey,
            model: "gemini-2.5-flash".to_string(),
        });
        s.initialize();
        s.system_prompt = Some("system".to_string());
        s.model_ready = true;
        s
    }

    #[test]
    fn test_enqueue_dedup() {
        let generator = MockGenerator::new();
        let q = queue(&generator);
        let mut s = ready_session();

        assert_eq!(
            q.enqueue(&mut s, QueuedArtifact::new("a.png", vec![1])),
            EnqueueOutcome::Queued
        );
        assert_eq!(
            q.enqueue(&mut s, QueuedArtifact::new("a.png", vec![2])),
            EnqueueOutcome::AlreadyQueued
        );
        assert_eq!(s.pending.len(), 1);
        assert_eq!(s.pending[0].data, vec![1]);
    }

    #[test]
    fn test_enqueue_rejects_analyzed_name() {
        let generator = MockGenerator::new();
        let q = queue(&generator);
        let mut s = ready_session();
        s.analyzed.push(AnalyzedArtifact {
            name: "notes.pdf".to_string(),
            kind: ArtifactKind::Document,
            analyzed_at: 0,
        });

        assert_eq!(
            q.enqueue(&mut s, QueuedArtifact::new("notes.pdf", vec![1])),
            EnqueueOutcome::AlreadyAnalyzed
        );
        assert!(s.pending.is_empty());
    }

    #[tokio::test]
    async fn test_batch_isolates_oversize_artifact() {
        let generator = MockGenerator::with_responses(["first analysis", "third analysis"]);
        let q = queue(&generator);
        let mut s = ready_session();
        q.enqueue(&mut s, QueuedArtifact::new("one.png", vec![0; 8]));
        q.enqueue(&mut s, QueuedArtifact::new("two.png", vec![0; 33]));
        q.enqueue(&mut s, QueuedArtifact::new("three.pdf", vec![0; 8]));

        let report = q.process_all(&mut s, |_| {}).await.unwrap();

        assert_eq!(report.succeeded, vec!["one.png", "three.pdf"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].name, "two.png");
        assert!(report.failed[0].error.contains("too large"));
        assert!(s.pending.is_empty());
        assert!(!s.ingest_busy);
        assert_eq!(generator.call_count(), 2);
        assert_eq!(s.analyzed.len(), 2);

        let last = s.history.last().unwrap();
        assert_eq!(last.text, "third analysis");
        assert_eq!(
            last.tag,
            Some(TurnTag::Analysis {
                artifact: "three.pdf".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_busy_rejects_reentry() {
        let generator = MockGenerator::new();
        let q = queue(&generator);
        let mut s = ready_session();
        q.enqueue(&mut s, QueuedArtifact::new("a.png", vec![1]));
        s.ingest_busy = true;

        let err = q.process_all(&mut s, |_| {}).await.unwrap_err();
        assert!(matches!(err, Error::Busy(_)));
        assert_eq!(s.pending.len(), 1);
        assert!(s.ingest_busy);
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn test_dropped_batch_clears_busy_and_requeues() {
        let stalled = MockGenerator::stalling(Duration::from_secs(5));
        let q = queue(&stalled);
        let mut s = ready_session();
        q.enqueue(&mut s, QueuedArtifact::new("a.png", vec![1]));
        q.enqueue(&mut s, QueuedArtifact::new("b.png", vec![2]));

        let cut = tokio::time::timeout(Duration::from_millis(20), q.process_all(&mut s, |_| {})).await;
        assert!(cut.is_err());
        assert!(!s.ingest_busy);
        let names: Vec<&str> = s.pending.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["a.png", "b.png"]);
        assert_eq!(s.pending[0].data, vec![1]);

        let generator = MockGenerator::with_responses(["a", "b"]);
        let report = queue(&generator).process_all(&mut s, |_| {}).await.unwrap();
        assert_eq!(report.succeeded, vec!["a.png", "b.png"]);
        assert!(s.pending.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_kind_skipped_and_removed() {
        let generator = MockGenerator::new();
        let q = queue(&generator);
        let mut s = ready_session();
        q.enqueue(&mut s, QueuedArtifact::new("essay.docx", vec![1]));

        let report = q.process_all(&mut s, |_| {}).await.unwrap();
        assert_eq!(report.skipped, vec!["essay.docx"]);
        assert!(s.pending.is_empty());
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn test_model_not_initialized_fails_each() {
        let generator = MockGenerator::new();
        let q = queue(&generator);
        let mut s = ready_session();
        s.model_ready = false;
        q.enqueue(&mut s, QueuedArtifact::new("a.png", vec![1]));

        let report = q.process_all(&mut s, |_| {}).await.unwrap();
        assert_eq!(report.failed.len(), 1);
        assert!(report.failed[0].error.contains("model not initialized"));
        assert!(s.analyzed.is_empty());
    }

    #[tokio::test]
    async fn test_backend_failure_continues() {
        let generator = MockGenerator::new();
        generator.push_failure("quota");
        let q = queue(&generator);
        let mut s = ready_session();
        q.enqueue(&mut s, QueuedArtifact::new("a.mp3", vec![1]));
        q.enqueue(&mut s, QueuedArtifact::new("b.mp3", vec![1]));

        let report = q.process_all(&mut s, |_| {}).await.unwrap();
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.succeeded, vec!["b.mp3"]);
        assert_eq!(report.processed(), 2);
    }

    #[tokio::test]
    async fn test_request_carries_media_and_context() {
        let generator = MockGenerator::new();
        let q = queue(&generator);
        let mut s = ready_session();
        s.methodology = "music".to_string();
        s.topics = Some("Baroque".to_string());
        q.enqueue(&mut s, QueuedArtifact::new("fugue.wav", vec![7, 7]));

        let mut events = Vec::new();
        q.process_all(&mut s, |p| events.push(p)).await.unwrap();

        let req = generator.last_request().unwrap();
        let media = req.media.as_ref().unwrap();
        assert_eq!(media.mime_type, "audio/wav");
        assert_eq!(&media.data[..], &[7u8, 7]);
        assert_eq!(req.system_instruction.as_deref(), Some("system"));
        let prompt = req.last_user_text().unwrap();
        assert!(prompt.contains("Baroque"));
        assert!(prompt.contains("fugue.wav"));

        assert_eq!(
            events,
            vec![IngestProgress {
                index: 0,
                total: 1,
                name: "fugue.wav".to_string()
            }]
        );
    }
}
