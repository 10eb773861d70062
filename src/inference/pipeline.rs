//! Translation pipeline state machine
//!
//! Sequences the three inference calls strictly in order: extract, then
//! translate, then contextualize. Extraction and translation failures are
//! fatal and abort the run; contextualization failures degrade to a fixed
//! placeholder. Contextualize runs after translate on purpose, so a
//! translation reaches the user as early as possible.

use std::sync::Arc;

use crate::error::{LenslateError, Result};
use crate::imaging::TransportImage;
use crate::inference::InferenceService;
use crate::language::Language;

/// Minimum extracted length (in characters) for a run to proceed
pub const MIN_EXTRACTED_CHARS: usize = 2;

/// Sentinel the service produces when an image carries no readable text
pub const NO_TEXT_SENTINEL: &str = "No text could be extracted";

/// Placeholder substituted when the contextualize stage fails
pub const CONTEXT_PLACEHOLDER: &str = "No additional context available.";

/// Generic user-facing message for a fatal extraction failure
const EXTRACTION_RETRY_MESSAGE: &str = "the image could not be read, please try again";

/// Generic user-facing message for a fatal translation failure
const TRANSLATION_RETRY_MESSAGE: &str = "the text could not be translated, please try again";

/// Stages of a pipeline run, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Idle,
    Extracting,
    Translating,
    Contextualizing,
    Done,
    Aborted,
}

/// Result of a completed (non-aborted) pipeline run
///
/// Fields populate monotonically as stages complete. A run that found no
/// text ends Done with `translated_text` and `contextual_info` unset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineOutcome {
    /// Raw text the service read from the image
    pub extracted_text: Option<String>,
    /// Translation into the requested language
    pub translated_text: Option<String>,
    /// Short cultural note, or the placeholder if the stage failed
    pub contextual_info: Option<String>,
}

impl PipelineOutcome {
    /// Whether this run produced a translation worth rendering/persisting
    pub fn has_translation(&self) -> bool {
        self.translated_text.is_some()
    }
}

/// Whether an extraction result is a terminal "no text" outcome
fn is_empty_extraction(text: &str) -> bool {
    text.chars().count() < MIN_EXTRACTED_CHARS || text.contains(NO_TEXT_SENTINEL)
}

/// The extract -> translate -> contextualize orchestrator
///
/// Stateless apart from its service handle; each [`run`](Self::run) is an
/// independent pipeline execution.
pub struct InferencePipeline {
    service: Arc<dyn InferenceService>,
}

impl InferencePipeline {
    /// Create a pipeline over the given inference service
    pub fn new(service: Arc<dyn InferenceService>) -> Self {
        Self { service }
    }

    /// Run the pipeline without stage observation
    pub async fn run(
        &self,
        image: &TransportImage,
        language: Language,
    ) -> Result<PipelineOutcome> {
        self.run_observed(image, language, |_| {}).await
    }

    /// Run the pipeline, reporting each stage transition to `observe`
    ///
    /// Stages execute strictly sequentially; no stage begins before the
    /// prior one's result (or degrade value) is available.
    ///
    /// # Errors
    ///
    /// Returns `ExtractionFailed` or `TranslationFailed` when the
    /// corresponding stage hits a transport/service failure; the original
    /// error detail is logged, not surfaced.
    pub async fn run_observed<F>(
        &self,
        image: &TransportImage,
        language: Language,
        mut observe: F,
    ) -> Result<PipelineOutcome>
    where
        F: FnMut(PipelineStage) + Send,
    {
        observe(PipelineStage::Extracting);
        let extracted = match self.service.extract_text(image).await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!("Extraction failed: {:#}", e);
                observe(PipelineStage::Aborted);
                return Err(
                    LenslateError::ExtractionFailed(EXTRACTION_RETRY_MESSAGE.to_string()).into(),
                );
            }
        };
        tracing::debug!(chars = extracted.chars().count(), "Extraction complete");

        if is_empty_extraction(&extracted) {
            tracing::info!("No usable text in image, ending run without translation");
            observe(PipelineStage::Done);
            return Ok(PipelineOutcome {
                extracted_text: (!extracted.is_empty()).then(|| extracted),
                translated_text: None,
                contextual_info: None,
            });
        }

        observe(PipelineStage::Translating);
        let translated = match self.service.translate(&extracted, language).await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!("Translation failed: {:#}", e);
                observe(PipelineStage::Aborted);
                return Err(
                    LenslateError::TranslationFailed(TRANSLATION_RETRY_MESSAGE.to_string()).into(),
                );
            }
        };

        observe(PipelineStage::Contextualizing);
        let contextual_info = match self.service.contextualize(&extracted).await {
            Ok(note) if !note.trim().is_empty() => Some(note),
            Ok(_) => None,
            Err(e) => {
                // Never aborts a run that already produced a translation.
                let degraded = LenslateError::ContextUnavailable(e.to_string());
                tracing::warn!("{}; substituting placeholder", degraded);
                Some(CONTEXT_PLACEHOLDER.to_string())
            }
        };

        observe(PipelineStage::Done);
        Ok(PipelineOutcome {
            extracted_text: Some(extracted),
            translated_text: Some(translated),
            contextual_info,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::codec;
    use crate::inference::MockInferenceService;

    fn image() -> TransportImage {
        codec::encode(&[0xFF, 0xD8, 0xFF, 0xE0])
    }

    fn pipeline(mock: MockInferenceService) -> InferencePipeline {
        InferencePipeline::new(Arc::new(mock))
    }

    #[tokio::test]
    async fn test_full_run_populates_all_fields() {
        let mut mock = MockInferenceService::new();
        mock.expect_extract_text()
            .returning(|_| Ok("OPEN".to_string()));
        mock.expect_translate()
            .withf(|text, language| text == "OPEN" && *language == Language::Spanish)
            .returning(|_, _| Ok("ABIERTO".to_string()));
        mock.expect_contextualize()
            .withf(|text| text == "OPEN")
            .returning(|_| Ok("Commonly posted on shop entrances.".to_string()));

        let outcome = pipeline(mock)
            .run(&image(), Language::Spanish)
            .await
            .unwrap();
        assert_eq!(outcome.extracted_text.as_deref(), Some("OPEN"));
        assert_eq!(outcome.translated_text.as_deref(), Some("ABIERTO"));
        assert_eq!(
            outcome.contextual_info.as_deref(),
            Some("Commonly posted on shop entrances.")
        );
        assert!(outcome.has_translation());
    }

    #[tokio::test]
    async fn test_stage_order_is_sequential() {
        let mut mock = MockInferenceService::new();
        mock.expect_extract_text().returning(|_| Ok("OPEN".into()));
        mock.expect_translate().returning(|_, _| Ok("OUVERT".into()));
        mock.expect_contextualize().returning(|_| Ok("note".into()));

        let mut stages = Vec::new();
        pipeline(mock)
            .run_observed(&image(), Language::French, |s| stages.push(s))
            .await
            .unwrap();
        assert_eq!(
            stages,
            vec![
                PipelineStage::Extracting,
                PipelineStage::Translating,
                PipelineStage::Contextualizing,
                PipelineStage::Done,
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_extraction_is_terminal_non_error() {
        let mut mock = MockInferenceService::new();
        mock.expect_extract_text().returning(|_| Ok(String::new()));
        mock.expect_translate().never();
        mock.expect_contextualize().never();

        let outcome = pipeline(mock)
            .run(&image(), Language::Spanish)
            .await
            .unwrap();
        assert!(outcome.extracted_text.is_none());
        assert!(outcome.translated_text.is_none());
        assert!(outcome.contextual_info.is_none());
    }

    #[tokio::test]
    async fn test_single_character_extraction_is_terminal() {
        let mut mock = MockInferenceService::new();
        mock.expect_extract_text().returning(|_| Ok("A".to_string()));
        mock.expect_translate().never();
        mock.expect_contextualize().never();

        let outcome = pipeline(mock)
            .run(&image(), Language::German)
            .await
            .unwrap();
        assert_eq!(outcome.extracted_text.as_deref(), Some("A"));
        assert!(!outcome.has_translation());
    }

    #[tokio::test]
    async fn test_two_character_extraction_proceeds() {
        let mut mock = MockInferenceService::new();
        mock.expect_extract_text().returning(|_| Ok("OK".to_string()));
        mock.expect_translate().returning(|_, _| Ok("VALE".into()));
        mock.expect_contextualize().returning(|_| Ok("note".into()));

        let outcome = pipeline(mock)
            .run(&image(), Language::Spanish)
            .await
            .unwrap();
        assert!(outcome.has_translation());
    }

    #[tokio::test]
    async fn test_sentinel_extraction_is_terminal() {
        let mut mock = MockInferenceService::new();
        mock.expect_extract_text().returning(|_| {
            Ok("No text could be extracted from the image. Please try a clearer image.".into())
        });
        mock.expect_translate().never();

        let outcome = pipeline(mock)
            .run(&image(), Language::Spanish)
            .await
            .unwrap();
        assert!(outcome.extracted_text.is_some());
        assert!(!outcome.has_translation());
    }

    #[tokio::test]
    async fn test_extraction_failure_aborts_with_generic_message() {
        let mut mock = MockInferenceService::new();
        mock.expect_extract_text()
            .returning(|_| Err(LenslateError::Inference("500 from upstream".into()).into()));
        mock.expect_translate().never();

        let mut stages = Vec::new();
        let err = pipeline(mock)
            .run_observed(&image(), Language::Spanish, |s| stages.push(s))
            .await
            .unwrap_err();

        let lenslate = err.downcast_ref::<LenslateError>().unwrap();
        assert!(matches!(lenslate, LenslateError::ExtractionFailed(_)));
        // Provider detail is logged, never surfaced verbatim.
        assert!(!err.to_string().contains("500 from upstream"));
        assert_eq!(stages.last(), Some(&PipelineStage::Aborted));
    }

    #[tokio::test]
    async fn test_translation_failure_aborts() {
        let mut mock = MockInferenceService::new();
        mock.expect_extract_text().returning(|_| Ok("OPEN".into()));
        mock.expect_translate()
            .returning(|_, _| Err(LenslateError::Inference("boom".into()).into()));
        mock.expect_contextualize().never();

        let err = pipeline(mock)
            .run(&image(), Language::Spanish)
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LenslateError>().unwrap(),
            LenslateError::TranslationFailed(_)
        ));
    }

    #[tokio::test]
    async fn test_context_failure_degrades_to_placeholder() {
        let mut mock = MockInferenceService::new();
        mock.expect_extract_text().returning(|_| Ok("OPEN".into()));
        mock.expect_translate().returning(|_, _| Ok("ABIERTO".into()));
        mock.expect_contextualize()
            .returning(|_| Err(LenslateError::Inference("502".into()).into()));

        let outcome = pipeline(mock)
            .run(&image(), Language::Spanish)
            .await
            .unwrap();
        assert_eq!(outcome.translated_text.as_deref(), Some("ABIERTO"));
        assert_eq!(outcome.contextual_info.as_deref(), Some(CONTEXT_PLACEHOLDER));
    }

    #[tokio::test]
    async fn test_empty_context_success_stays_unset() {
        let mut mock = MockInferenceService::new();
        mock.expect_extract_text().returning(|_| Ok("OPEN".into()));
        mock.expect_translate().returning(|_, _| Ok("ABIERTO".into()));
        mock.expect_contextualize().returning(|_| Ok("  ".into()));

        let outcome = pipeline(mock)
            .run(&image(), Language::Spanish)
            .await
            .unwrap();
        assert!(outcome.contextual_info.is_none());
    }
}
