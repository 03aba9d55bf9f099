//! Artifact ingestion
//!
//! Uploaded images, PDFs and audio files are queued per session and analysed
//! one at a time by the multi-modal model. Each successful analysis becomes an
//! assistant turn and a ledger entry; the ledger keeps a name from being
//! analysed twice.

mod artifact;
mod queue;

pub use artifact::{mime_type, AnalyzedArtifact, ArtifactKind, QueuedArtifact};
pub use queue::{ArtifactFailure, BatchReport, EnqueueOutcome, IngestProgress, IngestQueue};
