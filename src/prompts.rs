//! Fixed instructions sent to the inference service
//!
//! The three prompt shapes used by the pipeline. Keeping them in one place
//! makes the service contract auditable and keeps the pipeline free of
//! string literals.

use crate::language::Language;

/// Instruction sent alongside the image for the extraction stage
///
/// Asks for all visible text, itemized when multiple distinct blocks exist,
/// and nothing else.
pub const EXTRACTION_INSTRUCTION: &str = "Extract all visible text from this image. \
If there are multiple distinct blocks of text (e.g., separate signs, lists, \
different paragraphs), please list them individually, perhaps with numbering or \
bullet points. Do not include any descriptions of the image, only the extracted text.";

/// Build the translation prompt for the given text and target language
pub fn translation_prompt(text: &str, language: Language) -> String {
    format!(
        "Translate the following text into {}: \"{}\"",
        language.display_name(),
        text
    )
}

/// Build the contextual-annotation prompt for the given text
///
/// Asks for a brief cultural note about the extracted (source) text, not the
/// translation.
pub fn context_prompt(text: &str) -> String {
    format!(
        "Provide a brief cultural context or additional relevant information \
(e.g., common usage, related items, cultural nuances) for the following text: \
\"{}\". If it's a common word, explain its typical usage. If it's a food item, \
describe it briefly. Keep it concise.",
        text
    )
}
