//! Inference module for Lenslate
//!
//! The InferenceService trait covering the three call shapes (extract,
//! translate, contextualize), the Gemini HTTP implementation, and the
//! pipeline that sequences them.

pub mod client;
pub mod pipeline;

pub use client::{GeminiService, InferenceService};
pub use pipeline::{
    InferencePipeline, PipelineOutcome, PipelineStage, CONTEXT_PLACEHOLDER, MIN_EXTRACTED_CHARS,
    NO_TEXT_SENTINEL,
};

#[cfg(test)]
pub use client::MockInferenceService;
