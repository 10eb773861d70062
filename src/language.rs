//! Supported target languages
//!
//! The product ships a fixed set of 21 target languages. Each maps to a
//! speech-synthesis locale tag; languages without a dedicated voice fall
//! back to `en-US`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::LenslateError;

/// Fallback speech locale for languages without a dedicated voice
pub const FALLBACK_SPEECH_LOCALE: &str = "en-US";

/// A supported target language for translation
///
/// Serialized under its display name (e.g. `"Chinese (Simplified)"`) so that
/// persisted history entries and config files stay human-readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    English,
    Spanish,
    French,
    German,
    Italian,
    Portuguese,
    Hindi,
    #[serde(rename = "Chinese (Simplified)")]
    ChineseSimplified,
    Japanese,
    Korean,
    Arabic,
    Russian,
    Bengali,
    Punjabi,
    Telugu,
    Marathi,
    Tamil,
    Urdu,
    Gujarati,
    Kannada,
    Malayalam,
}

impl Language {
    /// All supported languages, in the order they are presented to the user
    pub fn all() -> &'static [Language] {
        use Language::*;
        &[
            English,
            Spanish,
            French,
            German,
            Italian,
            Portuguese,
            Hindi,
            ChineseSimplified,
            Japanese,
            Korean,
            Arabic,
            Russian,
            Bengali,
            Punjabi,
            Telugu,
            Marathi,
            Tamil,
            Urdu,
            Gujarati,
            Kannada,
            Malayalam,
        ]
    }

    /// Human-readable name, as shown in prompts and stored in history
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Spanish => "Spanish",
            Language::French => "French",
            Language::German => "German",
            Language::Italian => "Italian",
            Language::Portuguese => "Portuguese",
            Language::Hindi => "Hindi",
            Language::ChineseSimplified => "Chinese (Simplified)",
            Language::Japanese => "Japanese",
            Language::Korean => "Korean",
            Language::Arabic => "Arabic",
            Language::Russian => "Russian",
            Language::Bengali => "Bengali",
            Language::Punjabi => "Punjabi",
            Language::Telugu => "Telugu",
            Language::Marathi => "Marathi",
            Language::Tamil => "Tamil",
            Language::Urdu => "Urdu",
            Language::Gujarati => "Gujarati",
            Language::Kannada => "Kannada",
            Language::Malayalam => "Malayalam",
        }
    }

    /// Speech-synthesis locale tag for this language
    ///
    /// Languages without a dedicated voice map to
    /// [`FALLBACK_SPEECH_LOCALE`].
    ///
    /// # Examples
    ///
    /// ```
    /// use lenslate::language::Language;
    ///
    /// assert_eq!(Language::Japanese.speech_locale(), "ja-JP");
    /// assert_eq!(Language::Telugu.speech_locale(), "en-US");
    /// ```
    pub fn speech_locale(&self) -> &'static str {
        match self {
            Language::ChineseSimplified => "zh-CN",
            Language::Japanese => "ja-JP",
            Language::Korean => "ko-KR",
            Language::Arabic => "ar-SA",
            Language::Russian => "ru-RU",
            Language::Hindi => "hi-IN",
            Language::Spanish => "es-ES",
            Language::French => "fr-FR",
            Language::German => "de-DE",
            Language::Italian => "it-IT",
            Language::Portuguese => "pt-PT",
            _ => FALLBACK_SPEECH_LOCALE,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Language {
    type Err = LenslateError;

    /// Parse a language from its display name, case-insensitively
    ///
    /// # Examples
    ///
    /// ```
    /// use lenslate::language::Language;
    ///
    /// let lang: Language = "spanish".parse().unwrap();
    /// assert_eq!(lang, Language::Spanish);
    /// assert!("Klingon".parse::<Language>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Language::all()
            .iter()
            .find(|lang| lang.display_name().eq_ignore_ascii_case(wanted))
            .copied()
            .ok_or_else(|| LenslateError::Config(format!("Unsupported language: {}", s)))
    }
}
