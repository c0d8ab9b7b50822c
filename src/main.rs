//! Application entry point — Image to Text.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Create [`tokio`] runtime (multi-thread, 2 workers).
//! 4. Probe the Tesseract engine and build the [`RecognitionClient`].
//! 5. Create the notification channel.
//! 6. Run [`eframe::run_native`] — the workflow and preview store are built
//!    inside the app creator, which blocks the main thread until the window
//!    is closed.

use std::sync::Arc;

use anyhow::{anyhow, Context as _};
use image_to_text::{
    app::{ImageToTextApp, TexturePreviewStore},
    clipboard::SystemClipboard,
    config::{AppConfig, UiConfig},
    notify::ChannelNotifier,
    ocr::{MissingEngine, OcrEngine, RecognitionClient, TesseractEngine},
    workflow::ConversionWorkflow,
};

use eframe::egui;

// ---------------------------------------------------------------------------
// Native options builder
// ---------------------------------------------------------------------------

fn native_options(config: &UiConfig) -> eframe::NativeOptions {
    let (width, height) = config.window_size;
    let vp = egui::ViewportBuilder::default()
        .with_title("Image to Text")
        .with_inner_size([width, height])
        .with_min_inner_size([560.0, 320.0])
        .with_drag_and_drop(true);

    eframe::NativeOptions {
        viewport: vp,
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Image to Text starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // 3. Tokio runtime (recognition runs on the blocking pool)
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    // 4. OCR engine (degrade gracefully when tesseract is not installed)
    let engine: Arc<dyn OcrEngine> = match TesseractEngine::new(&config.ocr) {
        Ok(engine) => {
            log::info!("Tesseract ready: {}", engine.version());
            Arc::new(engine)
        }
        Err(e) => {
            log::warn!("Tesseract unavailable ({e}). Conversions will fail.");
            Arc::new(MissingEngine::new(e.to_string()))
        }
    };
    let client = RecognitionClient::new(engine).with_language(config.ocr.language.trim());

    // 5. Notifications → toasts
    let (notifier, notifications_rx) = ChannelNotifier::channel(16);

    // 6. Build the egui app and run it (blocks until the window is closed)
    let options = native_options(&config.ui);
    let handle = rt.handle().clone();
    let ui_config = config.ui.clone();

    eframe::run_native(
        "Image to Text",
        options,
        Box::new(move |cc| {
            let previews = Arc::new(TexturePreviewStore::new(
                cc.egui_ctx.clone(),
                handle.clone(),
            ));
            let workflow = ConversionWorkflow::new(
                handle,
                client,
                Arc::new(SystemClipboard),
                Arc::new(notifier),
                previews.clone(),
            );
            Ok(Box::new(ImageToTextApp::new(
                workflow,
                previews,
                notifications_rx,
                ui_config,
            )))
        }),
    )
    .map_err(|e| anyhow!("window error: {e}"))?;

    log::info!("Image to Text shut down");
    Ok(())
}
