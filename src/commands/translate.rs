//! The `translate` command: run one end-to-end session and print the result

use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;

use crate::auth::AnonymousAuth;
use crate::capture::{CaptureSurface, FileCapture};
use crate::commands::open_history;
use crate::config::Config;
use crate::error::Result;
use crate::imaging::OverlayRenderer;
use crate::inference::GeminiService;
use crate::language::Language;
use crate::session::SessionController;
use crate::speech::{speak_translation, LoggingSpeech};

/// Run a translation session against the given image file
pub async fn run_translate(
    config: Config,
    image: PathBuf,
    language: String,
    output: Option<PathBuf>,
    speak: bool,
    json: bool,
) -> Result<()> {
    let language: Language = language.parse()?;

    let capture = FileCapture::new(&image);
    let bytes = capture.acquire_frame().await?;

    let service = Arc::new(GeminiService::new(config.inference.clone())?);
    let renderer = match OverlayRenderer::from_font_path(&config.overlay.font_path) {
        Ok(renderer) => Some(renderer),
        Err(e) => {
            tracing::warn!("Overlay disabled: {:#}", e);
            None
        }
    };
    let history = open_history(&config)?;
    let auth = Arc::new(AnonymousAuth::new(&config.app.app_id));

    let controller = SessionController::new(
        service,
        renderer,
        history,
        auth,
        config.app.thumbnail_width,
    );
    let snapshot = controller.start(Some(bytes), language).await?;

    if let (Some(path), Some(overlay)) = (&output, &snapshot.overlay_image) {
        std::fs::write(path, overlay.as_bytes()?)?;
        tracing::debug!("Overlay written to {}", path.display());
    }

    if speak {
        if let Some(translated) = &snapshot.translated_text {
            speak_translation(&LoggingSpeech, translated, language).await?;
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    match &snapshot.translated_text {
        Some(translated) => {
            if let Some(extracted) = &snapshot.extracted_text {
                println!("{}", "Extracted:".bold());
                println!("{}\n", extracted);
            }
            println!("{}", format!("Translated ({}):", language).bold());
            println!("{}", translated.green());
            if let Some(context) = &snapshot.contextual_info {
                println!("\n{}", "Context:".bold());
                println!("{}", context.dimmed());
            }
            if snapshot.overlay_image.is_some() {
                if let Some(path) = &output {
                    println!("\nOverlay written to {}", path.display().to_string().cyan());
                }
            } else {
                println!("\n{}", "No overlay produced for this run.".yellow());
            }
            if let Some(warning) = &snapshot.persistence_error {
                println!("{}", format!("History not saved: {}", warning).yellow());
            }
        }
        None => {
            println!(
                "{}",
                "No usable text could be found in the image. Try a clearer photo.".yellow()
            );
        }
    }

    Ok(())
}
