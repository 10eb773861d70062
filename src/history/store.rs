//! Document store backends for history entries
//!
//! The DocumentStore trait is the seam to the realtime store that owns
//! history records. Two implementations ship with the crate: a SQLite
//! store used by the CLI and an in-memory store for tests and embedding.
//! Both deliver full-set snapshots through a watch channel after every
//! mutation; ordering is the subscriber's concern.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Mutex;
use tokio::sync::watch;

use crate::config::HISTORY_DB_ENV;
use crate::error::{LenslateError, Result};
use crate::history::types::{HistoryEntry, HistoryPatch, NewHistoryEntry};
use crate::language::Language;

/// The realtime document store seam
///
/// `create` assigns the id and timestamp; `update` applies a restricted
/// patch; `watch` yields a channel whose value is always the owner's full
/// current entry set. Watchers of an owner are notified after every
/// mutation for that owner, so a patch and a subsequent snapshot converge.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Persist a new entry, returning its assigned id
    async fn create(&self, owner_id: &str, entry: NewHistoryEntry) -> Result<String>;

    /// Apply a favorite/notes patch to an existing entry
    async fn update(&self, owner_id: &str, id: &str, patch: HistoryPatch) -> Result<()>;

    /// Watch the owner's full entry set; the receiver's current value is
    /// the latest snapshot and changes arrive after each mutation
    async fn watch(&self, owner_id: &str) -> Result<watch::Receiver<Vec<HistoryEntry>>>;
}

/// Per-owner snapshot broadcast used by both store implementations
#[derive(Default)]
struct SnapshotWatchers {
    senders: Mutex<HashMap<String, watch::Sender<Vec<HistoryEntry>>>>,
}

impl SnapshotWatchers {
    fn subscribe(
        &self,
        owner_id: &str,
        current: Vec<HistoryEntry>,
    ) -> watch::Receiver<Vec<HistoryEntry>> {
        let mut senders = self.senders.lock().expect("watcher lock poisoned");
        senders
            .entry(owner_id.to_string())
            .or_insert_with(|| watch::channel(current).0)
            .subscribe()
    }

    fn notify(&self, owner_id: &str, snapshot: Vec<HistoryEntry>) {
        let senders = self.senders.lock().expect("watcher lock poisoned");
        if let Some(sender) = senders.get(owner_id) {
            sender.send_replace(snapshot);
        }
    }
}

/// SQLite-backed document store
///
/// One table holds every owner's entries; all queries are scoped by
/// `owner_id`. Connections are opened per operation, mirroring the short
/// single-writer call pattern of the CLI.
pub struct SqliteDocumentStore {
    db_path: PathBuf,
    watchers: SnapshotWatchers,
}

impl SqliteDocumentStore {
    /// Create a store in the user's data directory
    ///
    /// The `LENSLATE_HISTORY_DB` environment variable overrides the path,
    /// which makes it easy to point the binary at a test database.
    ///
    /// # Errors
    ///
    /// Returns error if the data directory cannot be determined or the
    /// schema cannot be initialized.
    pub fn new(app_id: &str) -> Result<Self> {
        if let Ok(override_path) = std::env::var(HISTORY_DB_ENV) {
            return Self::new_with_path(override_path);
        }

        let proj_dirs = ProjectDirs::from("com", "lenslate", app_id).ok_or_else(|| {
            LenslateError::PersistenceFailed("could not determine data directory".to_string())
        })?;
        let data_dir = proj_dirs.data_dir();
        std::fs::create_dir_all(data_dir).map_err(|e| {
            LenslateError::PersistenceFailed(format!("failed to create data directory: {}", e))
        })?;

        Self::new_with_path(data_dir.join("history.db"))
    }

    /// Create a store at the given database path
    ///
    /// Primarily useful for tests with a temporary directory.
    pub fn new_with_path<P: Into<PathBuf>>(db_path: P) -> Result<Self> {
        let db_path = db_path.into();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                LenslateError::PersistenceFailed(format!(
                    "failed to create database directory: {}",
                    e
                ))
            })?;
        }

        let store = Self {
            db_path,
            watchers: SnapshotWatchers::default(),
        };
        store.init()?;
        Ok(store)
    }

    fn open(&self) -> Result<Connection> {
        Connection::open(&self.db_path)
            .map_err(|e| LenslateError::PersistenceFailed(format!("cannot open database: {}", e)).into())
    }

    fn init(&self) -> Result<()> {
        let conn = self.open()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS translations (
                id TEXT PRIMARY KEY,
                owner_id TEXT NOT NULL,
                original_text TEXT NOT NULL,
                translated_text TEXT NOT NULL,
                contextual_info TEXT NOT NULL DEFAULT '',
                target_language TEXT NOT NULL,
                thumbnail TEXT,
                is_favorite INTEGER NOT NULL DEFAULT 0,
                notes TEXT NOT NULL DEFAULT '',
                created_at TEXT
            )",
            [],
        )
        .map_err(|e| LenslateError::PersistenceFailed(format!("failed to create schema: {}", e)))?;
        Ok(())
    }

    /// Load every entry for an owner, unordered
    fn load_all(&self, owner_id: &str) -> Result<Vec<HistoryEntry>> {
        let conn = self.open()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, original_text, translated_text, contextual_info, target_language,
                        thumbnail, is_favorite, notes, created_at
                 FROM translations WHERE owner_id = ?1",
            )
            .map_err(|e| LenslateError::PersistenceFailed(format!("query failed: {}", e)))?;

        type Row = (
            String,
            String,
            String,
            String,
            String,
            Option<String>,
            i64,
            String,
            Option<String>,
        );
        let rows = stmt
            .query_map(params![owner_id], |row| {
                Ok::<Row, rusqlite::Error>((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                    row.get(6)?,
                    row.get(7)?,
                    row.get(8)?,
                ))
            })
            .map_err(|e| LenslateError::PersistenceFailed(format!("query failed: {}", e)))?
            .collect::<std::result::Result<Vec<Row>, _>>()
            .map_err(|e| LenslateError::PersistenceFailed(format!("row read failed: {}", e)))?;

        let mut entries = Vec::with_capacity(rows.len());
        for (id, original, translated, context, language, thumbnail, favorite, notes, created) in
            rows
        {
            let target_language = Language::from_str(&language).map_err(|e| {
                LenslateError::PersistenceFailed(format!("corrupt language column: {}", e))
            })?;
            let created_at = match created {
                Some(raw) => Some(
                    DateTime::parse_from_rfc3339(&raw)
                        .map_err(|e| {
                            LenslateError::PersistenceFailed(format!(
                                "corrupt timestamp column: {}",
                                e
                            ))
                        })?
                        .with_timezone(&Utc),
                ),
                None => None,
            };
            entries.push(HistoryEntry {
                id,
                owner_id: owner_id.to_string(),
                original_text: original,
                translated_text: translated,
                contextual_info: context,
                target_language,
                thumbnail,
                is_favorite: favorite != 0,
                notes,
                created_at,
            });
        }
        Ok(entries)
    }

    fn broadcast(&self, owner_id: &str) -> Result<()> {
        let snapshot = self.load_all(owner_id)?;
        self.watchers.notify(owner_id, snapshot);
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn create(&self, owner_id: &str, entry: NewHistoryEntry) -> Result<String> {
        let id = uuid::Uuid::new_v4().to_string();
        let created_at = Utc::now();

        let conn = self.open()?;
        conn.execute(
            "INSERT INTO translations
                (id, owner_id, original_text, translated_text, contextual_info,
                 target_language, thumbnail, is_favorite, notes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                id,
                owner_id,
                entry.original_text,
                entry.translated_text,
                entry.contextual_info,
                entry.target_language.display_name(),
                entry.thumbnail,
                entry.is_favorite as i64,
                entry.notes,
                created_at.to_rfc3339(),
            ],
        )
        .map_err(|e| LenslateError::PersistenceFailed(format!("insert failed: {}", e)))?;

        tracing::debug!(id = %id, "History entry created");
        self.broadcast(owner_id)?;
        Ok(id)
    }

    async fn update(&self, owner_id: &str, id: &str, patch: HistoryPatch) -> Result<()> {
        if patch.is_empty() {
            return Ok(());
        }

        let mut conn = self.open()?;
        let tx = conn
            .transaction()
            .map_err(|e| LenslateError::PersistenceFailed(format!("transaction failed: {}", e)))?;

        let mut changed = 0;
        if let Some(favorite) = patch.is_favorite {
            changed += tx
                .execute(
                    "UPDATE translations SET is_favorite = ?1 WHERE id = ?2 AND owner_id = ?3",
                    params![favorite as i64, id, owner_id],
                )
                .map_err(|e| {
                    LenslateError::PersistenceFailed(format!("favorite update failed: {}", e))
                })?;
        }
        if let Some(notes) = &patch.notes {
            changed += tx
                .execute(
                    "UPDATE translations SET notes = ?1 WHERE id = ?2 AND owner_id = ?3",
                    params![notes, id, owner_id],
                )
                .map_err(|e| {
                    LenslateError::PersistenceFailed(format!("notes update failed: {}", e))
                })?;
        }
        tx.commit()
            .map_err(|e| LenslateError::PersistenceFailed(format!("commit failed: {}", e)))?;

        if changed == 0 {
            return Err(
                LenslateError::PersistenceFailed(format!("no history entry with id {}", id)).into(),
            );
        }

        self.broadcast(owner_id)?;
        Ok(())
    }

    async fn watch(&self, owner_id: &str) -> Result<watch::Receiver<Vec<HistoryEntry>>> {
        let current = self.load_all(owner_id)?;
        Ok(self.watchers.subscribe(owner_id, current))
    }
}

/// In-memory document store for tests and embedding
///
/// Matches the SQLite store's observable behavior, with one extra
/// capability: [`seed`](Self::seed) replaces an owner's entries wholesale,
/// which lets tests deliver snapshots with arbitrary content, order, and
/// missing timestamps.
#[derive(Default)]
pub struct MemoryDocumentStore {
    entries: Mutex<HashMap<String, Vec<HistoryEntry>>>,
    watchers: SnapshotWatchers,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace an owner's entry set and notify watchers
    pub fn seed(&self, owner_id: &str, entries: Vec<HistoryEntry>) {
        self.entries
            .lock()
            .expect("entry lock poisoned")
            .insert(owner_id.to_string(), entries.clone());
        self.watchers.notify(owner_id, entries);
    }

    fn snapshot(&self, owner_id: &str) -> Vec<HistoryEntry> {
        self.entries
            .lock()
            .expect("entry lock poisoned")
            .get(owner_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn create(&self, owner_id: &str, entry: NewHistoryEntry) -> Result<String> {
        let id = uuid::Uuid::new_v4().to_string();
        let full = entry.into_entry(id.clone(), owner_id.to_string(), Some(Utc::now()));
        self.entries
            .lock()
            .expect("entry lock poisoned")
            .entry(owner_id.to_string())
            .or_default()
            .push(full);

        self.watchers.notify(owner_id, self.snapshot(owner_id));
        Ok(id)
    }

    async fn update(&self, owner_id: &str, id: &str, patch: HistoryPatch) -> Result<()> {
        if patch.is_empty() {
            return Ok(());
        }

        {
            let mut entries = self.entries.lock().expect("entry lock poisoned");
            let owned = entries.entry(owner_id.to_string()).or_default();
            let entry = owned.iter_mut().find(|e| e.id == id).ok_or_else(|| {
                LenslateError::PersistenceFailed(format!("no history entry with id {}", id))
            })?;
            if let Some(favorite) = patch.is_favorite {
                entry.is_favorite = favorite;
            }
            if let Some(notes) = patch.notes {
                entry.notes = notes;
            }
        }

        self.watchers.notify(owner_id, self.snapshot(owner_id));
        Ok(())
    }

    async fn watch(&self, owner_id: &str) -> Result<watch::Receiver<Vec<HistoryEntry>>> {
        Ok(self.watchers.subscribe(owner_id, self.snapshot(owner_id)))
    }
}
