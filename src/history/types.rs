//! History record types and view ordering

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::language::Language;

/// One persisted record of a past translation
///
/// Entries are append-only plus in-place patches to `is_favorite` and
/// `notes`; the text fields are never mutated after creation and entries
/// are never deleted by this system. `created_at` is assigned by the store
/// and may be momentarily absent in a snapshot delivered right after a
/// write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Store-assigned document id
    pub id: String,
    /// Identity that owns this entry
    pub owner_id: String,
    /// Text as extracted from the image
    pub original_text: String,
    /// Translation shown to the user
    pub translated_text: String,
    /// Cultural note (possibly the degrade placeholder, possibly empty)
    #[serde(default)]
    pub contextual_info: String,
    /// Language the text was translated into
    pub target_language: Language,
    /// Base64 thumbnail of the source image, if rendering succeeded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    /// Whether the user starred this entry
    #[serde(default)]
    pub is_favorite: bool,
    /// Free-form user annotation
    #[serde(default)]
    pub notes: String,
    /// Store-assigned creation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A record to be appended, before the store assigns id and timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewHistoryEntry {
    pub original_text: String,
    pub translated_text: String,
    #[serde(default)]
    pub contextual_info: String,
    pub target_language: Language,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub notes: String,
}

impl NewHistoryEntry {
    /// Build a record with the defaults a fresh translation gets:
    /// not favorited, no notes.
    pub fn new(
        original_text: impl Into<String>,
        translated_text: impl Into<String>,
        contextual_info: impl Into<String>,
        target_language: Language,
        thumbnail: Option<String>,
    ) -> Self {
        Self {
            original_text: original_text.into(),
            translated_text: translated_text.into(),
            contextual_info: contextual_info.into(),
            target_language,
            thumbnail,
            is_favorite: false,
            notes: String::new(),
        }
    }

    /// Materialize this record into a full entry
    pub(crate) fn into_entry(
        self,
        id: String,
        owner_id: String,
        created_at: Option<DateTime<Utc>>,
    ) -> HistoryEntry {
        HistoryEntry {
            id,
            owner_id,
            original_text: self.original_text,
            translated_text: self.translated_text,
            contextual_info: self.contextual_info,
            target_language: self.target_language,
            thumbnail: self.thumbnail,
            is_favorite: self.is_favorite,
            notes: self.notes,
            created_at,
        }
    }
}

/// Partial update to a history entry
///
/// Only `is_favorite` and `notes` are patchable; the type makes anything
/// else unrepresentable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl HistoryPatch {
    /// Patch setting the favorite flag
    pub fn favorite(value: bool) -> Self {
        Self {
            is_favorite: Some(value),
            notes: None,
        }
    }

    /// Patch replacing the note text
    pub fn note(text: impl Into<String>) -> Self {
        Self {
            is_favorite: None,
            notes: Some(text.into()),
        }
    }

    /// Whether this patch changes nothing
    pub fn is_empty(&self) -> bool {
        self.is_favorite.is_none() && self.notes.is_none()
    }
}

/// Sort a snapshot into view order: descending by `created_at`, with
/// entries lacking a timestamp treated as epoch 0 (they sort last)
///
/// The sort is stable, so equal-key entries keep their delivery order.
pub fn sort_view(entries: &mut [HistoryEntry]) {
    entries.sort_by_key(|e| std::cmp::Reverse(e.created_at.unwrap_or(DateTime::UNIX_EPOCH)));
}
