//! Generative inference service client
//!
//! This module defines the InferenceService trait covering the three call
//! shapes the pipeline needs (extract, translate, contextualize) and a
//! Gemini `generateContent` implementation. All three calls share one wire
//! format: a `contents` list of parts carrying text and/or inline image
//! data, answered by a candidate list whose first candidate's text is used.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::InferenceConfig;
use crate::error::{LenslateError, Result};
use crate::imaging::TransportImage;
use crate::language::Language;
use crate::prompts;

/// The three inference call shapes used by the pipeline
///
/// Implementations must treat an answer without candidates as an empty
/// result, not a transport error; the pipeline decides what emptiness
/// means per stage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InferenceService: Send + Sync {
    /// Extract all visible text from the image
    async fn extract_text(&self, image: &TransportImage) -> Result<String>;

    /// Translate `text` into the target language
    async fn translate(&self, text: &str, language: Language) -> Result<String>;

    /// Produce a short cultural note for `text`
    async fn contextualize(&self, text: &str) -> Result<String>;
}

/// Request structure for the generateContent API
#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

/// A single content turn in the request
#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

/// One request part: text, inline image data, or both
#[derive(Debug, Serialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "inlineData", skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

impl Part {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    fn inline_image(image: &TransportImage) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: image.mime_type.clone(),
                data: image.data.clone(),
            }),
        }
    }
}

/// Inline image payload in Gemini format
#[derive(Debug, Serialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

/// Response structure from the generateContent API
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

/// Gemini generateContent client
///
/// Connects to the configured API base (overridable for tests) with a
/// per-request timeout so a hung call surfaces as a stage failure instead
/// of stalling the run forever.
pub struct GeminiService {
    client: Client,
    config: InferenceConfig,
}

impl GeminiService {
    /// Create a new Gemini client
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: InferenceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("lenslate/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                LenslateError::Inference(format!("failed to create HTTP client: {}", e))
            })?;

        tracing::info!(
            "Initialized inference client: base={}, model={}",
            config.api_base,
            config.model
        );

        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            self.config.model
        )
    }

    /// Send one generateContent request and read the first candidate's text
    ///
    /// Absence of candidates yields `Ok("")`. Non-2xx statuses and payload
    /// parse failures are transport errors.
    async fn generate(&self, parts: Vec<Part>) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts,
            }],
        };

        let mut builder = self.client.post(self.endpoint());
        if let Some(key) = &self.config.api_key {
            builder = builder.query(&[("key", key.as_str())]);
        }

        let response = builder.json(&request).send().await.map_err(|e| {
            tracing::warn!("Inference request failed: {}", e);
            LenslateError::Inference(format!("request failed: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Inference service returned {}: {}", status, body);
            return Err(LenslateError::Inference(format!("service returned {}", status)).into());
        }

        let parsed: GenerateResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse inference response: {}", e);
            LenslateError::Inference(format!("failed to parse response: {}", e))
        })?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .map(|c| {
                c.content
                    .parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        Ok(text.trim().to_string())
    }
}

#[async_trait]
impl InferenceService for GeminiService {
    async fn extract_text(&self, image: &TransportImage) -> Result<String> {
        tracing::debug!("Requesting text extraction");
        self.generate(vec![
            Part::text(prompts::EXTRACTION_INSTRUCTION),
            Part::inline_image(image),
        ])
        .await
    }

    async fn translate(&self, text: &str, language: Language) -> Result<String> {
        tracing::debug!(language = %language, "Requesting translation");
        self.generate(vec![Part::text(prompts::translation_prompt(text, language))])
            .await
    }

    async fn contextualize(&self, text: &str) -> Result<String> {
        tracing::debug!("Requesting contextual note");
        self.generate(vec![Part::text(prompts::context_prompt(text))])
            .await
    }
}
