//! The `languages` command: list supported target languages

use colored::Colorize;
use prettytable::{format, Table};
use serde::Serialize;

use crate::error::Result;
use crate::language::Language;

#[derive(Serialize)]
struct LanguageRow {
    name: &'static str,
    speech_locale: &'static str,
}

/// Print the supported languages and their speech locales
pub fn run_languages(json: bool) -> Result<()> {
    let rows: Vec<LanguageRow> = Language::all()
        .iter()
        .map(|lang| LanguageRow {
            name: lang.display_name(),
            speech_locale: lang.speech_locale(),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(prettytable::row!["Language".bold(), "Speech Locale".bold()]);
    for row in rows {
        table.add_row(prettytable::row![row.name, row.speech_locale]);
    }
    table.printstd();
    Ok(())
}
