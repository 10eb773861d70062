//! Pipeline integration tests against a mock inference server
//!
//! Each pipeline stage is selected by a distinct prompt substring, which
//! lets one mock server answer all three generateContent call shapes
//! differently.

mod common;

use std::sync::Arc;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{gemini_body, inference_config, mount_stage, tiny_jpeg, GEMINI_PATH};
use lenslate::error::LenslateError;
use lenslate::imaging;
use lenslate::inference::{GeminiService, InferencePipeline, CONTEXT_PLACEHOLDER};
use lenslate::language::Language;

const EXTRACT_MARKER: &str = "Extract all visible text";
const TRANSLATE_MARKER: &str = "Translate the following text into";
const CONTEXT_MARKER: &str = "cultural context";

fn pipeline(server: &MockServer) -> InferencePipeline {
    let service = GeminiService::new(inference_config(server)).unwrap();
    InferencePipeline::new(Arc::new(service))
}

#[tokio::test]
async fn test_full_run_over_http() {
    let server = MockServer::start().await;
    mount_stage(
        &server,
        EXTRACT_MARKER,
        ResponseTemplate::new(200).set_body_json(gemini_body("OPEN")),
    )
    .await;
    mount_stage(
        &server,
        TRANSLATE_MARKER,
        ResponseTemplate::new(200).set_body_json(gemini_body("ABIERTO")),
    )
    .await;
    mount_stage(
        &server,
        CONTEXT_MARKER,
        ResponseTemplate::new(200)
            .set_body_json(gemini_body("Commonly posted on shop entrances.")),
    )
    .await;

    let image = imaging::encode(&tiny_jpeg(64, 48));
    let outcome = pipeline(&server)
        .run(&image, Language::Spanish)
        .await
        .unwrap();

    assert_eq!(outcome.extracted_text.as_deref(), Some("OPEN"));
    assert_eq!(outcome.translated_text.as_deref(), Some("ABIERTO"));
    assert_eq!(
        outcome.contextual_info.as_deref(),
        Some("Commonly posted on shop entrances.")
    );
}

#[tokio::test]
async fn test_extraction_request_carries_image_payload() {
    let server = MockServer::start().await;
    let image = imaging::encode(&tiny_jpeg(32, 32));

    // The extract call must inline the base64 image data.
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .and(body_string_contains(EXTRACT_MARKER))
        .and(body_string_contains(&image.data))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_body("")))
        .expect(1)
        .mount(&server)
        .await;

    pipeline(&server)
        .run(&image, Language::Spanish)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_extraction_http_error_is_fatal() {
    let server = MockServer::start().await;
    mount_stage(
        &server,
        EXTRACT_MARKER,
        ResponseTemplate::new(500).set_body_string("upstream exploded"),
    )
    .await;

    let image = imaging::encode(&tiny_jpeg(32, 32));
    let err = pipeline(&server)
        .run(&image, Language::Spanish)
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<LenslateError>().unwrap(),
        LenslateError::ExtractionFailed(_)
    ));
    // Raw upstream detail is logged, never surfaced.
    assert!(!err.to_string().contains("upstream exploded"));
}

#[tokio::test]
async fn test_no_candidates_means_no_text() {
    let server = MockServer::start().await;
    mount_stage(
        &server,
        EXTRACT_MARKER,
        ResponseTemplate::new(200).set_body_json(serde_json::json!({ "candidates": [] })),
    )
    .await;

    let image = imaging::encode(&tiny_jpeg(32, 32));
    let outcome = pipeline(&server)
        .run(&image, Language::Spanish)
        .await
        .unwrap();

    assert!(outcome.extracted_text.is_none());
    assert!(outcome.translated_text.is_none());
    assert!(outcome.contextual_info.is_none());
}

#[tokio::test]
async fn test_sentinel_extraction_ends_run_quietly() {
    let server = MockServer::start().await;
    mount_stage(
        &server,
        EXTRACT_MARKER,
        ResponseTemplate::new(200).set_body_json(gemini_body(
            "No text could be extracted from the image. Please try a clearer image.",
        )),
    )
    .await;

    let image = imaging::encode(&tiny_jpeg(32, 32));
    let outcome = pipeline(&server)
        .run(&image, Language::Japanese)
        .await
        .unwrap();

    assert!(!outcome.has_translation());
}

#[tokio::test]
async fn test_translation_http_error_is_fatal() {
    let server = MockServer::start().await;
    mount_stage(
        &server,
        EXTRACT_MARKER,
        ResponseTemplate::new(200).set_body_json(gemini_body("OPEN")),
    )
    .await;
    mount_stage(
        &server,
        TRANSLATE_MARKER,
        ResponseTemplate::new(503).set_body_string("overloaded"),
    )
    .await;

    let image = imaging::encode(&tiny_jpeg(32, 32));
    let err = pipeline(&server)
        .run(&image, Language::Spanish)
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<LenslateError>().unwrap(),
        LenslateError::TranslationFailed(_)
    ));
}

#[tokio::test]
async fn test_context_http_error_degrades_to_placeholder() {
    let server = MockServer::start().await;
    mount_stage(
        &server,
        EXTRACT_MARKER,
        ResponseTemplate::new(200).set_body_json(gemini_body("OPEN")),
    )
    .await;
    mount_stage(
        &server,
        TRANSLATE_MARKER,
        ResponseTemplate::new(200).set_body_json(gemini_body("ABIERTO")),
    )
    .await;
    mount_stage(&server, CONTEXT_MARKER, ResponseTemplate::new(500)).await;

    let image = imaging::encode(&tiny_jpeg(32, 32));
    let outcome = pipeline(&server)
        .run(&image, Language::Spanish)
        .await
        .unwrap();

    assert_eq!(outcome.translated_text.as_deref(), Some("ABIERTO"));
    assert_eq!(outcome.contextual_info.as_deref(), Some(CONTEXT_PLACEHOLDER));
}

#[tokio::test]
async fn test_candidate_text_is_trimmed() {
    let server = MockServer::start().await;
    mount_stage(
        &server,
        EXTRACT_MARKER,
        ResponseTemplate::new(200).set_body_json(gemini_body("  OPEN\n")),
    )
    .await;
    mount_stage(
        &server,
        TRANSLATE_MARKER,
        ResponseTemplate::new(200).set_body_json(gemini_body("\nABIERTO  ")),
    )
    .await;
    mount_stage(
        &server,
        CONTEXT_MARKER,
        ResponseTemplate::new(200).set_body_json(gemini_body("note")),
    )
    .await;

    let image = imaging::encode(&tiny_jpeg(32, 32));
    let outcome = pipeline(&server)
        .run(&image, Language::Spanish)
        .await
        .unwrap();

    assert_eq!(outcome.extracted_text.as_deref(), Some("OPEN"));
    assert_eq!(outcome.translated_text.as_deref(), Some("ABIERTO"));
}
