//! Translation session orchestration
//!
//! The SessionController ties capture, pipeline, overlay, and persistence
//! together behind a single `start()` operation plus `reset()`. At most one
//! session is active at a time: each `start()` bumps a generation counter
//! and every continuation (stage update, render result, persist result)
//! re-checks that counter before touching session state, so late callbacks
//! of a superseded session are structurally no-ops. Last call wins.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::auth::AuthProvider;
use crate::error::{LenslateError, Result};
use crate::history::{HistoryStore, NewHistoryEntry};
use crate::imaging::{self, OverlayRenderer, TransportImage};
use crate::inference::{InferencePipeline, InferenceService, PipelineStage};
use crate::language::Language;

/// Stages of a translation session, in forward order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionStage {
    Idle,
    Extracting,
    Translating,
    Contextualizing,
    Rendering,
    Persisting,
    Done,
    Failed,
}

impl SessionStage {
    /// Forward position of this stage; used to enforce that a session
    /// never moves backward (except to Idle on explicit reset)
    fn rank(self) -> u8 {
        match self {
            SessionStage::Idle => 0,
            SessionStage::Extracting => 1,
            SessionStage::Translating => 2,
            SessionStage::Contextualizing => 3,
            SessionStage::Rendering => 4,
            SessionStage::Persisting => 5,
            SessionStage::Done => 6,
            SessionStage::Failed => 7,
        }
    }
}

/// Read-only copy of the current session for display
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    /// Identity of the session this snapshot belongs to
    pub generation: u64,
    pub stage: SessionStage,
    pub target_language: Language,
    /// Encoded source image; immutable once the run starts
    pub source_image: Option<TransportImage>,
    pub extracted_text: Option<String>,
    pub translated_text: Option<String>,
    pub contextual_info: Option<String>,
    pub overlay_image: Option<TransportImage>,
    /// User-facing message of a fatal run error
    pub error: Option<String>,
    /// Reported (never retried) history write failure, if any
    pub persistence_error: Option<String>,
    /// Id of the appended history entry, once persisted
    pub history_id: Option<String>,
}

/// Mutable session state behind the controller's lock
#[derive(Debug)]
struct SessionState {
    generation: u64,
    stage: SessionStage,
    target_language: Language,
    source_image: Option<TransportImage>,
    extracted_text: Option<String>,
    translated_text: Option<String>,
    contextual_info: Option<String>,
    overlay_image: Option<TransportImage>,
    error: Option<String>,
    persistence_error: Option<String>,
    history_id: Option<String>,
}

impl SessionState {
    fn idle(generation: u64) -> Self {
        Self {
            generation,
            stage: SessionStage::Idle,
            target_language: Language::English,
            source_image: None,
            extracted_text: None,
            translated_text: None,
            contextual_info: None,
            overlay_image: None,
            error: None,
            persistence_error: None,
            history_id: None,
        }
    }

    fn fresh(generation: u64, target_language: Language, source_image: TransportImage) -> Self {
        Self {
            target_language,
            source_image: Some(source_image),
            ..Self::idle(generation)
        }
    }

    /// Advance the stage, never backward
    fn advance(&mut self, next: SessionStage) {
        if next.rank() > self.stage.rank() {
            self.stage = next;
        }
    }

    /// Drop in-progress partial fields after a fatal error
    fn clear_partial(&mut self) {
        self.extracted_text = None;
        self.translated_text = None;
        self.contextual_info = None;
        self.overlay_image = None;
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            generation: self.generation,
            stage: self.stage,
            target_language: self.target_language,
            source_image: self.source_image.clone(),
            extracted_text: self.extracted_text.clone(),
            translated_text: self.translated_text.clone(),
            contextual_info: self.contextual_info.clone(),
            overlay_image: self.overlay_image.clone(),
            error: self.error.clone(),
            persistence_error: self.persistence_error.clone(),
            history_id: self.history_id.clone(),
        }
    }
}

/// Orchestrates one translation session at a time
///
/// Shared by reference; `start()` and `reset()` take `&self` and
/// synchronize internally.
pub struct SessionController {
    pipeline: InferencePipeline,
    renderer: Option<OverlayRenderer>,
    history: HistoryStore,
    auth: Arc<dyn AuthProvider>,
    thumbnail_width: u32,
    state: Mutex<SessionState>,
    generation: AtomicU64,
}

impl SessionController {
    /// Create a controller over the given collaborators
    ///
    /// `renderer` is optional: without one (e.g. no usable font), every
    /// run degrades to "no overlay, no thumbnail" but still translates
    /// and persists.
    pub fn new(
        service: Arc<dyn InferenceService>,
        renderer: Option<OverlayRenderer>,
        history: HistoryStore,
        auth: Arc<dyn AuthProvider>,
        thumbnail_width: u32,
    ) -> Self {
        Self {
            pipeline: InferencePipeline::new(service),
            renderer,
            history,
            auth,
            thumbnail_width,
            state: Mutex::new(SessionState::idle(0)),
            generation: AtomicU64::new(0),
        }
    }

    /// Read the current session state
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.lock().expect("session lock poisoned").snapshot()
    }

    /// Change the target language; only allowed before a run starts
    pub fn set_target_language(&self, language: Language) -> bool {
        let mut state = self.state.lock().expect("session lock poisoned");
        if state.stage == SessionStage::Idle {
            state.target_language = language;
            true
        } else {
            false
        }
    }

    /// Clear the session back to Idle
    ///
    /// Safe to call at any stage; outstanding continuations of the old
    /// session become no-ops.
    pub fn reset(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let mut state = self.state.lock().expect("session lock poisoned");
        *state = SessionState::idle(generation);
        tracing::debug!(generation, "Session reset");
    }

    /// Run one end-to-end translation session
    ///
    /// Rejects with `NoImage` when no bytes are supplied. Otherwise resets
    /// any previous session, runs the pipeline, renders the overlay on
    /// success, and appends a history entry (with thumbnail when rendering
    /// succeeded, without one when it degraded). A fatal pipeline error is
    /// returned and recorded; render, persistence, and auth failures
    /// degrade. If the session is superseded mid-run its remaining effects
    /// are discarded and the superseding session's state is returned.
    pub async fn start(
        &self,
        image_bytes: Option<Vec<u8>>,
        language: Language,
    ) -> Result<SessionSnapshot> {
        let bytes = image_bytes.ok_or(LenslateError::NoImage)?;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let image = imaging::encode(&bytes);

        {
            let mut state = self.state.lock().expect("session lock poisoned");
            *state = SessionState::fresh(generation, language, image.clone());
        }
        tracing::info!(generation, language = %language, "Translation session started");

        let run = self
            .pipeline
            .run_observed(&image, language, |stage| {
                let mapped = match stage {
                    PipelineStage::Extracting => SessionStage::Extracting,
                    PipelineStage::Translating => SessionStage::Translating,
                    PipelineStage::Contextualizing => SessionStage::Contextualizing,
                    // Done/Aborted are applied with their results below.
                    _ => return,
                };
                self.apply(generation, |s| s.advance(mapped));
            })
            .await;

        let outcome = match run {
            Ok(outcome) => outcome,
            Err(e) => {
                let message = e.to_string();
                let applied = self.apply(generation, |s| {
                    s.stage = SessionStage::Failed;
                    s.clear_partial();
                    s.error = Some(message);
                });
                if applied {
                    return Err(e);
                }
                tracing::debug!(generation, "Suppressing error from superseded session");
                return Ok(self.snapshot());
            }
        };

        let translated = outcome.translated_text.clone();
        self.apply(generation, |s| {
            s.extracted_text = outcome.extracted_text.clone();
            s.translated_text = outcome.translated_text.clone();
            s.contextual_info = outcome.contextual_info.clone();
        });

        let Some(translated) = translated else {
            // No usable text in the image: terminal non-error, nothing to
            // render or persist.
            self.apply(generation, |s| s.advance(SessionStage::Done));
            return Ok(self.snapshot());
        };

        self.apply(generation, |s| s.advance(SessionStage::Rendering));
        let rendered = match &self.renderer {
            Some(renderer) => renderer.render(&image, &translated),
            None => Err(LenslateError::RenderFailed("no overlay font available".into()).into()),
        };
        let (overlay_image, thumbnail) = match rendered {
            Ok(overlay) => {
                let thumbnail = match imaging::thumbnail(&image, self.thumbnail_width) {
                    Ok(thumb) => Some(thumb.data),
                    Err(e) => {
                        tracing::warn!("Thumbnail production failed: {:#}", e);
                        None
                    }
                };
                (Some(overlay), thumbnail)
            }
            Err(e) => {
                tracing::warn!("Overlay degraded to no overlay, no thumbnail: {:#}", e);
                (None, None)
            }
        };

        // The render result arrives like a late decode callback: it only
        // lands if this session is still the current one.
        if !self.apply(generation, |s| s.overlay_image = overlay_image.clone()) {
            tracing::debug!(generation, "Discarding render result from superseded session");
            return Ok(self.snapshot());
        }

        self.apply(generation, |s| s.advance(SessionStage::Persisting));
        if !self.is_current(generation) {
            return Ok(self.snapshot());
        }
        let record = NewHistoryEntry::new(
            outcome.extracted_text.unwrap_or_default(),
            translated,
            outcome.contextual_info.unwrap_or_default(),
            language,
            thumbnail,
        );
        match self.auth.current_identity().await {
            Ok(identity) => match self.history.append(&identity.uid, record).await {
                Ok(id) => {
                    self.apply(generation, |s| s.history_id = Some(id));
                }
                Err(e) => {
                    tracing::warn!("History append failed (not retried): {:#}", e);
                    let message = e.to_string();
                    self.apply(generation, |s| s.persistence_error = Some(message));
                }
            },
            Err(e) => {
                tracing::warn!("History blocked without an identity: {:#}", e);
                let message = e.to_string();
                self.apply(generation, |s| s.persistence_error = Some(message));
            }
        }

        self.apply(generation, |s| s.advance(SessionStage::Done));
        Ok(self.snapshot())
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Mutate session state iff `generation` is still the active session
    ///
    /// Returns whether the mutation was applied. This is the structural
    /// guard that turns a superseded session's continuations into no-ops.
    fn apply<F: FnOnce(&mut SessionState)>(&self, generation: u64, f: F) -> bool {
        let mut state = self.state.lock().expect("session lock poisoned");
        if state.generation != generation {
            return false;
        }
        f(&mut state);
        true
    }
}
