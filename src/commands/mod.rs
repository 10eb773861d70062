//! Command handlers for the Lenslate CLI

pub mod history;
pub mod languages;
pub mod translate;

use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::history::{DocumentStore, HistoryStore, SqliteDocumentStore};

/// Build the history store configured for this invocation
pub(crate) fn open_history(config: &Config) -> Result<HistoryStore> {
    let store: Arc<dyn DocumentStore> = match &config.history.db_path {
        Some(path) => Arc::new(SqliteDocumentStore::new_with_path(path)?),
        None => Arc::new(SqliteDocumentStore::new(&config.app.app_id)?),
    };
    Ok(HistoryStore::new(store))
}
