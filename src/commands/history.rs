//! History commands: list, favorite, note

use colored::Colorize;
use prettytable::{format, Table};

use crate::auth::{AnonymousAuth, AuthProvider};
use crate::cli::HistoryCommand;
use crate::commands::open_history;
use crate::config::Config;
use crate::error::{LenslateError, Result};
use crate::history::{HistoryEntry, HistoryPatch};

/// Handle history commands
pub async fn run_history(config: Config, command: HistoryCommand) -> Result<()> {
    let history = open_history(&config)?;
    // History is blocked without an identity; the error surfaces here.
    let identity = AnonymousAuth::new(&config.app.app_id)
        .current_identity()
        .await?;

    match command {
        HistoryCommand::List {
            favorites,
            json,
            limit,
        } => {
            let subscription = history.subscribe(&identity.uid).await?;
            let mut entries = subscription.current();
            if favorites {
                entries.retain(|e| e.is_favorite);
            }
            if let Some(limit) = limit {
                entries.truncate(limit);
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
                return Ok(());
            }

            if entries.is_empty() {
                println!("{}", "No translation history yet.".yellow());
                return Ok(());
            }

            let mut table = Table::new();
            table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
            table.add_row(prettytable::row![
                "ID".bold(),
                "When".bold(),
                "Fav".bold(),
                "Original".bold(),
                "Translated".bold(),
                "Language".bold(),
                "Note".bold()
            ]);

            for entry in &entries {
                let when = entry
                    .created_at
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "-".to_string());
                let fav = if entry.is_favorite { "*" } else { "" };
                table.add_row(prettytable::row![
                    short_id(&entry.id).cyan(),
                    when,
                    fav,
                    clip(&entry.original_text, 30),
                    clip(&entry.translated_text, 30),
                    entry.target_language,
                    clip(&entry.notes, 24)
                ]);
            }

            println!("\nTranslation History:");
            table.printstd();
            println!();
        }
        HistoryCommand::Favorite { id } => {
            let subscription = history.subscribe(&identity.uid).await?;
            let entries = subscription.current();
            let entry = find_entry(&entries, &id)?;
            let favorite = !entry.is_favorite;
            history
                .patch(&identity.uid, &entry.id, HistoryPatch::favorite(favorite))
                .await?;
            let verb = if favorite { "Favorited" } else { "Unfavorited" };
            println!("{}", format!("{} entry {}", verb, short_id(&entry.id)).green());
        }
        HistoryCommand::Note { id, text } => {
            let subscription = history.subscribe(&identity.uid).await?;
            let entries = subscription.current();
            let entry = find_entry(&entries, &id)?;
            history
                .patch(&identity.uid, &entry.id, HistoryPatch::note(text))
                .await?;
            println!(
                "{}",
                format!("Note saved on entry {}", short_id(&entry.id)).green()
            );
        }
    }

    Ok(())
}

/// Resolve an entry by full id or unique prefix
fn find_entry<'a>(entries: &'a [HistoryEntry], id: &str) -> Result<&'a HistoryEntry> {
    if let Some(exact) = entries.iter().find(|e| e.id == id) {
        return Ok(exact);
    }
    let mut matches = entries.iter().filter(|e| e.id.starts_with(id));
    match (matches.next(), matches.next()) {
        (Some(entry), None) => Ok(entry),
        (Some(_), Some(_)) => Err(LenslateError::PersistenceFailed(format!(
            "history id prefix {} is ambiguous",
            id
        ))
        .into()),
        (None, _) => Err(LenslateError::PersistenceFailed(format!(
            "no history entry matches {}",
            id
        ))
        .into()),
    }
}

fn short_id(id: &str) -> &str {
    &id[..id.len().min(8)]
}

fn clip(text: &str, max: usize) -> String {
    let flattened = text.replace('\n', " ");
    if flattened.chars().count() > max {
        let clipped: String = flattened.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", clipped)
    } else {
        flattened
    }
}
