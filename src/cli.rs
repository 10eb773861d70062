//! Command-line interface definition for Lenslate
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for translating an image, inspecting history, and
//! listing supported languages.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Lenslate - translate text found in images
#[derive(Parser, Debug)]
#[command(name = "lenslate", version, about = "Extract, translate, and overlay text found in images")]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Override the history database path
    #[arg(long, global = true, env = "LENSLATE_HISTORY_DB")]
    pub history_db: Option<String>,

    /// Override the overlay font path
    #[arg(long, global = true)]
    pub font: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Translate the text found in an image
    Translate {
        /// Image file to read
        #[arg(short, long)]
        image: PathBuf,

        /// Target language, e.g. "Spanish" or "Chinese (Simplified)"
        #[arg(short, long, default_value = "English")]
        language: String,

        /// Write the overlay image to this path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Speak the translation in the target language's voice
        #[arg(long)]
        speak: bool,

        /// Print the session result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Inspect and annotate translation history
    History {
        #[command(subcommand)]
        command: HistoryCommand,
    },

    /// List supported target languages and their speech locales
    Languages {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

/// History subcommands
#[derive(Subcommand, Debug)]
pub enum HistoryCommand {
    /// List history entries, newest first
    List {
        /// Only show favorited entries
        #[arg(long)]
        favorites: bool,

        /// Print as JSON
        #[arg(long)]
        json: bool,

        /// Maximum number of entries to display
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Toggle an entry's favorite flag (full id or unique prefix)
    Favorite {
        /// Entry id
        id: String,
    },

    /// Set the note on an entry (full id or unique prefix)
    Note {
        /// Entry id
        id: String,

        /// Note text; an empty string clears the note
        text: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_translate_with_defaults() {
        let cli = Cli::try_parse_from(["lenslate", "translate", "--image", "sign.jpg"]).unwrap();
        match cli.command {
            Commands::Translate {
                image,
                language,
                output,
                speak,
                json,
            } => {
                assert_eq!(image, PathBuf::from("sign.jpg"));
                assert_eq!(language, "English");
                assert!(output.is_none());
                assert!(!speak);
                assert!(!json);
            }
            _ => panic!("expected translate command"),
        }
    }

    #[test]
    fn test_parse_translate_with_language_and_output() {
        let cli = Cli::try_parse_from([
            "lenslate",
            "translate",
            "--image",
            "sign.jpg",
            "--language",
            "Spanish",
            "--output",
            "out.jpg",
        ])
        .unwrap();
        match cli.command {
            Commands::Translate {
                language, output, ..
            } => {
                assert_eq!(language, "Spanish");
                assert_eq!(output, Some(PathBuf::from("out.jpg")));
            }
            _ => panic!("expected translate command"),
        }
    }

    #[test]
    fn test_parse_history_list_flags() {
        let cli = Cli::try_parse_from([
            "lenslate", "history", "list", "--favorites", "--limit", "5",
        ])
        .unwrap();
        match cli.command {
            Commands::History {
                command:
                    HistoryCommand::List {
                        favorites,
                        json,
                        limit,
                    },
            } => {
                assert!(favorites);
                assert!(!json);
                assert_eq!(limit, Some(5));
            }
            _ => panic!("expected history list command"),
        }
    }

    #[test]
    fn test_parse_history_note() {
        let cli =
            Cli::try_parse_from(["lenslate", "history", "note", "abc123", "seen in Lisbon"])
                .unwrap();
        match cli.command {
            Commands::History {
                command: HistoryCommand::Note { id, text },
            } => {
                assert_eq!(id, "abc123");
                assert_eq!(text, "seen in Lisbon");
            }
            _ => panic!("expected history note command"),
        }
    }

    #[test]
    fn test_parse_global_overrides() {
        let cli = Cli::try_parse_from([
            "lenslate",
            "languages",
            "--config",
            "custom.yaml",
            "--font",
            "/tmp/font.ttf",
        ])
        .unwrap();
        assert_eq!(cli.config.as_deref(), Some("custom.yaml"));
        assert_eq!(cli.font.as_deref(), Some("/tmp/font.ttf"));
    }

    #[test]
    fn test_missing_image_is_an_error() {
        assert!(Cli::try_parse_from(["lenslate", "translate"]).is_err());
    }
}
