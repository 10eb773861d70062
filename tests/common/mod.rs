//! Shared helpers for integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Notify};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use lenslate::auth::{AuthProvider, Identity};
use lenslate::config::InferenceConfig;
use lenslate::error::{LenslateError, Result};
use lenslate::history::{DocumentStore, HistoryEntry, HistoryPatch, NewHistoryEntry};
use lenslate::imaging::{OverlayRenderer, TransportImage};
use lenslate::inference::InferenceService;
use lenslate::language::Language;

/// Path of the generateContent endpoint for the default test model
pub const GEMINI_PATH: &str = "/v1beta/models/gemini-2.0-flash:generateContent";

/// Encode a small in-memory JPEG for use as capture bytes
pub fn tiny_jpeg(width: u32, height: u32) -> Vec<u8> {
    let pixels = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 7 % 256) as u8, (y * 5 % 256) as u8, 90])
    });
    let mut buf = Vec::new();
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, 90);
    pixels.write_with_encoder(encoder).unwrap();
    buf
}

/// Build a generateContent response body carrying one candidate text
pub fn gemini_body(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [
            { "content": { "parts": [ { "text": text } ] } }
        ]
    })
}

/// Inference config pointing at a mock server
pub fn inference_config(server: &MockServer) -> InferenceConfig {
    InferenceConfig {
        api_base: server.uri(),
        ..Default::default()
    }
}

/// Mount a mock for one pipeline stage, selected by a prompt substring
pub async fn mount_stage(
    server: &MockServer,
    prompt_marker: &str,
    response: ResponseTemplate,
) {
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .and(body_string_contains(prompt_marker))
        .respond_with(response)
        .mount(server)
        .await;
}

/// An overlay renderer built from whatever system font is around, if any
///
/// Tests that need actual glyph rasterization return early when this is
/// `None`; layout and degrade behavior are covered without a font.
pub fn system_font_renderer() -> Option<OverlayRenderer> {
    const CANDIDATES: &[&str] = &[
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/System/Library/Fonts/Supplemental/Arial.ttf",
    ];
    CANDIDATES
        .iter()
        .find_map(|p| std::fs::read(p).ok())
        .and_then(|bytes| OverlayRenderer::new(bytes).ok())
}

/// Inference stub whose first translate call blocks until released
///
/// Lets a test hold one session mid-flight while a second session starts
/// and finishes, to exercise last-call-wins suppression.
#[derive(Clone)]
pub struct GatedInference {
    translate_calls: Arc<AtomicUsize>,
    /// Signaled when the first translate call has begun
    pub started: Arc<Notify>,
    /// Released by the test to let the first translate call return
    pub gate: Arc<Notify>,
}

impl GatedInference {
    pub fn new() -> Self {
        Self {
            translate_calls: Arc::new(AtomicUsize::new(0)),
            started: Arc::new(Notify::new()),
            gate: Arc::new(Notify::new()),
        }
    }
}

#[async_trait]
impl InferenceService for GatedInference {
    async fn extract_text(&self, _image: &TransportImage) -> Result<String> {
        Ok("OPEN".to_string())
    }

    async fn translate(&self, _text: &str, _language: Language) -> Result<String> {
        if self.translate_calls.fetch_add(1, Ordering::SeqCst) == 0 {
            self.started.notify_one();
            self.gate.notified().await;
            Ok("FIRST".to_string())
        } else {
            Ok("SECOND".to_string())
        }
    }

    async fn contextualize(&self, _text: &str) -> Result<String> {
        Ok("ctx".to_string())
    }
}

/// Document store whose mutations always fail
pub struct FailingStore;

#[async_trait]
impl DocumentStore for FailingStore {
    async fn create(&self, _owner_id: &str, _entry: NewHistoryEntry) -> Result<String> {
        Err(LenslateError::PersistenceFailed("store offline".to_string()).into())
    }

    async fn update(&self, _owner_id: &str, _id: &str, _patch: HistoryPatch) -> Result<()> {
        Err(LenslateError::PersistenceFailed("store offline".to_string()).into())
    }

    async fn watch(&self, _owner_id: &str) -> Result<watch::Receiver<Vec<HistoryEntry>>> {
        let (_sender, receiver) = watch::channel(Vec::new());
        Ok(receiver)
    }
}

/// Auth provider that never yields an identity
pub struct FailingAuth;

#[async_trait]
impl AuthProvider for FailingAuth {
    async fn current_identity(&self) -> Result<Identity> {
        Err(LenslateError::AuthUnavailable("no identity available".to_string()).into())
    }
}
