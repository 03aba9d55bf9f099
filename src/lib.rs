//! SafeTutor - methodology-driven tutoring core with a fail-closed safety pipeline
//!
//! SafeTutor wraps a generative model behind a security checkpoint and a
//! configurable system prompt, so that students talk to a tutor that follows a
//! chosen teaching methodology and never sees, or leaks, more than it should.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                          TutorEngine                              │
//! │                                                                    │
//! │  user text ──► SecurityGuard ─────────────► Session history        │
//! │                 ├─ PatternRedactor (PII → placeholders, markup)    │
//! │                 └─ IntentClassifier (LRU cache, fail-closed)       │
//! │                                                                    │
//! │  methodology / topics / principles ──► PromptAssembler ──► system  │
//! │                                          (base template)   prompt │
//! │                                                                    │
//! │  ChangeNotifier: shadow diff ──► one contextual message per change │
//! │  IngestQueue:    FIFO artifacts ──► multi-modal analysis turns     │
//! └───────────────────────────────┬──────────────────────────────────┘
//!                                 │ Generator trait
//!                        ┌────────▼────────┐
//!                        │  GeminiClient   │
//!                        └─────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`privacy`]: redaction, intent classification and the security guard
//! - [`prompt`]: base template validation and system prompt assembly
//! - [`session`]: per-user session state and lifecycle
//! - [`notify`]: configuration change notifications
//! - [`ingest`]: uploaded artifact queue and analysis
//! - [`methodology`]: static methodology and principle registries
//! - [`model`]: generation capability, HTTP backend and helpers
//! - [`tutor`]: the engine tying it together
//! - [`config`]: configuration management

pub mod config;
pub mod error;
pub mod ingest;
pub mod methodology;
pub mod model;
pub mod notify;
pub mod privacy;
pub mod prompt;
pub mod session;
pub mod tutor;

pub use config::TutorConfig;
pub use error::{Error, Result};
pub use tutor::{TutorEngine, TutorSession};
