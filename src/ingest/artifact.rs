//! Uploaded artifact types
//!
//! An artifact is a named file awaiting multi-modal analysis. Its kind is
//! derived from the name's extension; the kind decides the size limit, the
//! declared mime type and the analysis prompt.

use crate::config::IngestConfig;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// Broad content category of an artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Image,
    Document,
    Audio,
    /// Not analysable; dropped from the queue without a model call
    Unknown,
}

impl ArtifactKind {
    /// Classify a file name by its extension (case-insensitive).
    pub fn from_name(name: &str) -> Self {
        let Some((_, ext)) = name.rsplit_once('.') else {
            return Self::Unknown;
        };
        match ext.to_ascii_lowercase().as_str() {
            "png" | "jpg" | "jpeg" | "webp" | "gif" | "bmp" | "tiff" => Self::Image,
            "pdf" => Self::Document,
            "mp3" | "wav" | "ogg" | "m4a" | "flac" | "aac" => Self::Audio,
            _ => Self::Unknown,
        }
    }

    /// Maximum payload size for this kind, if any.
    pub fn max_bytes(&self, limits: &IngestConfig) -> Option<usize> {
        match self {
            Self::Image => Some(limits.max_image_bytes),
            Self::Document => Some(limits.max_document_bytes),
            Self::Audio => Some(limits.max_audio_bytes),
            Self::Unknown => None,
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Image => write!(f, "image"),
            Self::Document => write!(f, "document"),
            Self::Audio => write!(f, "audio"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Mime type declared to the analysis backend for a file name.
pub fn mime_type(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tiff" => "image/tiff",
        "pdf" => "application/pdf",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "m4a" => "audio/mp4",
        "flac" => "audio/flac",
        "aac" => "audio/aac",
        _ => "application/octet-stream",
    }
}

/// An artifact waiting in a session's queue
#[derive(Debug, Clone)]
pub struct QueuedArtifact {
    /// Unique within a session; also the dedup key
    pub name: String,
    pub kind: ArtifactKind,
    pub data: Vec<u8>,
}

impl QueuedArtifact {
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        let name = name.into();
        Self {
            kind: ArtifactKind::from_name(&name),
            name,
            data,
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn mime_type(&self) -> &'static str {
        mime_type(&self.name)
    }

    /// Overwrite name and payload before the artifact is dropped.
    pub fn erase(&mut self) {
        self.name.zeroize();
        self.data.zeroize();
    }
}

/// Ledger entry for a successfully analysed artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzedArtifact {
    pub name: String,
    pub kind: ArtifactKind,
    /// Unix milliseconds
    pub analyzed_at: i64,
}
