//! Speech synthesis seam
//!
//! Speech playback is a one-shot collaborator call: speak this text in
//! this locale. Locale tags come from [`Language::speech_locale`]. The
//! bundled implementation only logs the utterance; platform backends slot
//! in behind the trait.

use async_trait::async_trait;

use crate::error::Result;
use crate::language::Language;

/// One-shot text-to-speech collaborator
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Speak `text` using the voice for `locale` (a BCP 47 tag)
    async fn speak(&self, text: &str, locale: &str) -> Result<()>;
}

/// Speak a translation in the voice of its target language
pub async fn speak_translation(
    synthesizer: &dyn SpeechSynthesizer,
    text: &str,
    language: Language,
) -> Result<()> {
    synthesizer.speak(text, language.speech_locale()).await
}

/// Logging-only speech backend
#[derive(Debug, Default)]
pub struct LoggingSpeech;

#[async_trait]
impl SpeechSynthesizer for LoggingSpeech {
    async fn speak(&self, text: &str, locale: &str) -> Result<()> {
        tracing::info!(locale = locale, "speak: {}", text);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSpeech {
        utterances: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl SpeechSynthesizer for RecordingSpeech {
        async fn speak(&self, text: &str, locale: &str) -> Result<()> {
            self.utterances
                .lock()
                .unwrap()
                .push((text.to_string(), locale.to_string()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_translation_uses_language_locale() {
        let speech = RecordingSpeech::default();
        speak_translation(&speech, "ABIERTO", Language::Spanish)
            .await
            .unwrap();
        let utterances = speech.utterances.lock().unwrap();
        assert_eq!(utterances[0], ("ABIERTO".to_string(), "es-ES".to_string()));
    }

    #[tokio::test]
    async fn test_unmapped_language_falls_back() {
        let speech = RecordingSpeech::default();
        speak_translation(&speech, "hello", Language::Kannada)
            .await
            .unwrap();
        assert_eq!(speech.utterances.lock().unwrap()[0].1, "en-US");
    }
}
