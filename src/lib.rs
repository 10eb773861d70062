//! Lenslate - image text translation library
//!
//! This library extracts text from images through a generative inference
//! service, translates it into a chosen language, fetches a short cultural
//! note, renders the translation back onto the image, and records results
//! in a per-user history with favoriting and annotation.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `session`: The session controller tying capture, pipeline, overlay,
//!   and persistence together behind a single `start()` operation
//! - `inference`: Inference service abstraction, the Gemini client, and
//!   the extract/translate/contextualize pipeline
//! - `imaging`: Transport encoding, thumbnails, and the overlay renderer
//! - `history`: Live ordered history views and create/patch mutations
//! - `auth`: Identity provider seam with anonymous sign-in
//! - `capture`/`speech`: Capture surface and speech synthesis seams
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use lenslate::auth::AnonymousAuth;
//! use lenslate::history::{HistoryStore, MemoryDocumentStore};
//! use lenslate::inference::GeminiService;
//! use lenslate::language::Language;
//! use lenslate::session::SessionController;
//!
//! # async fn example(image_bytes: Vec<u8>) -> anyhow::Result<()> {
//! let service = Arc::new(GeminiService::new(Default::default())?);
//! let history = HistoryStore::new(Arc::new(MemoryDocumentStore::new()));
//! let auth = Arc::new(AnonymousAuth::new("lenslate"));
//! let controller = SessionController::new(service, None, history, auth, 100);
//!
//! let snapshot = controller.start(Some(image_bytes), Language::Spanish).await?;
//! println!("{:?}", snapshot.translated_text);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod capture;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod history;
pub mod imaging;
pub mod inference;
pub mod language;
pub mod prompts;
pub mod session;
pub mod speech;

// Re-export commonly used types
pub use config::Config;
pub use error::{LenslateError, Result};
pub use history::{HistoryEntry, HistoryPatch, HistoryStore, NewHistoryEntry};
pub use imaging::{OverlayRenderer, TransportImage};
pub use inference::{GeminiService, InferencePipeline, InferenceService};
pub use language::Language;
pub use session::{SessionController, SessionSnapshot, SessionStage};
