//! Image-to-Text window — egui/eframe application.
//!
//! # Architecture
//!
//! [`ImageToTextApp`] is the top-level [`eframe::App`].  It holds a
//! [`ConversionWorkflow`] and never mutates workflow state itself: each frame
//! it takes a [`WorkflowView`] snapshot, draws it, and turns clicks into
//! workflow commands.  Notifications arrive over the receiver paired with the
//! workflow's [`ChannelNotifier`](crate::notify::ChannelNotifier) and are
//! shown as toasts.
//!
//! | Phase | Visual |
//! |-------|--------|
//! | `Idle` | "No Image Selected" placeholder, "Upload an Image" button |
//! | `Selected` | Preview, "Convert to Text" button |
//! | `Running` | "Processing: N%" label and bar (once N > 0) |
//! | `Completed` | Extracted text block and "Copy Text" button |

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use eframe::egui;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::UiConfig;
use crate::notify::{Notification, NotificationKind};
use crate::workflow::{ConversionWorkflow, ImageSource, PreviewId, PreviewStore, WorkflowView};

const PREVIEW_SIZE: f32 = 256.0;

// ---------------------------------------------------------------------------
// TexturePreviewStore
// ---------------------------------------------------------------------------

/// Longest edge of a decoded preview, in pixels.  Larger images are
/// downscaled before upload.
const PREVIEW_MAX_EDGE: u32 = 512;

enum Slot {
    /// Decode in flight on the blocking pool.
    Pending,
    Ready(egui::TextureHandle),
}

struct PreviewSlots {
    ctx: egui::Context,
    slots: Mutex<HashMap<PreviewId, Slot>>,
    next_id: AtomicU64,
}

impl PreviewSlots {
    fn lock(&self) -> MutexGuard<'_, HashMap<PreviewId, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Read, decode and upload one preview.  Runs on the blocking pool.
    fn finish(&self, id: PreviewId, source: &ImageSource) {
        let texture = load_preview(source).map(|image| {
            self.ctx
                .load_texture(format!("preview-{}", id.0), image, egui::TextureOptions::LINEAR)
        });

        let mut slots = self.lock();
        if !matches!(slots.get(&id), Some(Slot::Pending)) {
            log::debug!("app: preview {} released before decode finished", id.0);
            return;
        }
        match texture {
            Some(texture) => {
                slots.insert(id, Slot::Ready(texture));
                drop(slots);
                self.ctx.request_repaint();
            }
            None => {
                slots.remove(&id);
            }
        }
    }
}

/// Preview store that decodes selections into egui textures.
///
/// [`PreviewStore::acquire`] only reserves an id; the file is read, decoded
/// and uploaded on the runtime's blocking pool so a large photo never stalls
/// the UI thread.  Until the texture is ready (or when decoding fails) the
/// placeholder is drawn.  Textures are freed when their
/// [`egui::TextureHandle`] is dropped, which happens in
/// [`PreviewStore::release`].
pub struct TexturePreviewStore {
    inner: Arc<PreviewSlots>,
    runtime: Handle,
}

impl TexturePreviewStore {
    pub fn new(ctx: egui::Context, runtime: Handle) -> Self {
        Self {
            inner: Arc::new(PreviewSlots {
                ctx,
                slots: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(1),
            }),
            runtime,
        }
    }

    /// Texture for `id`, once decoded and while still held.
    pub fn texture(&self, id: PreviewId) -> Option<egui::TextureHandle> {
        match self.inner.lock().get(&id) {
            Some(Slot::Ready(texture)) => Some(texture.clone()),
            _ => None,
        }
    }

    /// Reserve an id and start decoding `source` in the background.
    fn start_decode(&self, source: &ImageSource) -> (PreviewId, JoinHandle<()>) {
        let id = PreviewId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        self.inner.lock().insert(id, Slot::Pending);

        let inner = Arc::clone(&self.inner);
        let source = source.clone();
        let task = self
            .runtime
            .spawn_blocking(move || inner.finish(id, &source));
        (id, task)
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.inner.lock().len()
    }
}

impl PreviewStore for TexturePreviewStore {
    fn acquire(&self, source: &ImageSource) -> Option<PreviewId> {
        let (id, _task) = self.start_decode(source);
        Some(id)
    }

    fn release(&self, id: PreviewId) {
        if self.inner.lock().remove(&id).is_none() {
            log::debug!("app: preview {} already released", id.0);
        }
    }
}

fn load_preview(source: &ImageSource) -> Option<egui::ColorImage> {
    match source {
        ImageSource::Path(path) => match std::fs::read(path) {
            Ok(bytes) => decode_preview(&bytes),
            Err(e) => {
                log::warn!("app: cannot read {} for preview: {e}", path.display());
                None
            }
        },
        ImageSource::Bytes { data, .. } => decode_preview(data),
    }
}

/// Decode any format the `image` crate understands into an egui image,
/// downscaled to [`PREVIEW_MAX_EDGE`].
fn decode_preview(bytes: &[u8]) -> Option<egui::ColorImage> {
    let mut image = match image::load_from_memory(bytes) {
        Ok(image) => image,
        Err(e) => {
            log::debug!("app: no preview, cannot decode image: {e}");
            return None;
        }
    };
    if image.width() > PREVIEW_MAX_EDGE || image.height() > PREVIEW_MAX_EDGE {
        image = image.thumbnail(PREVIEW_MAX_EDGE, PREVIEW_MAX_EDGE);
    }
    let rgba = image.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Some(egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
}

/// Selection for a file dropped onto the window.
fn dropped_source(file: &egui::DroppedFile) -> Option<ImageSource> {
    if let Some(path) = &file.path {
        return Some(ImageSource::from_path(path.clone()));
    }
    file.bytes.as_ref().map(|bytes| ImageSource::Bytes {
        name: file.name.clone(),
        data: Arc::clone(bytes),
    })
}

// ---------------------------------------------------------------------------
// Toasts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Toast {
    notification: Notification,
    shown_at: Instant,
}

fn expire_toasts(toasts: &mut Vec<Toast>, now: Instant, ttl: Duration) {
    toasts.retain(|t| now.duration_since(t.shown_at) < ttl);
}

// ---------------------------------------------------------------------------
// ImageToTextApp
// ---------------------------------------------------------------------------

/// eframe application — the image-to-text converter window.
pub struct ImageToTextApp {
    workflow: ConversionWorkflow,
    previews: Arc<TexturePreviewStore>,
    /// Notifications emitted by the workflow.
    notifications_rx: mpsc::Receiver<Notification>,
    toasts: Vec<Toast>,
    /// Contents of the file path field.
    path_input: String,
    config: UiConfig,
}

impl ImageToTextApp {
    /// * `workflow`         — the conversion workflow, built with `previews`.
    /// * `previews`         — texture store used to draw the selection.
    /// * `notifications_rx` — receiver paired with the workflow's notifier.
    /// * `config`           — UI settings.
    pub fn new(
        workflow: ConversionWorkflow,
        previews: Arc<TexturePreviewStore>,
        notifications_rx: mpsc::Receiver<Notification>,
        config: UiConfig,
    ) -> Self {
        Self {
            workflow,
            previews,
            notifications_rx,
            toasts: Vec::new(),
            path_input: String::new(),
            config,
        }
    }

    // ── Input ────────────────────────────────────────────────────────────

    /// Drain pending notifications into the toast list (non-blocking).
    fn poll_notifications(&mut self) {
        while let Ok(notification) = self.notifications_rx.try_recv() {
            self.toasts.push(Toast {
                notification,
                shown_at: Instant::now(),
            });
        }
        expire_toasts(
            &mut self.toasts,
            Instant::now(),
            Duration::from_secs(self.config.toast_secs),
        );
    }

    /// Select the first file dropped onto the window this frame.
    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        if dropped.len() > 1 {
            log::info!("app: {} files dropped, using the first", dropped.len());
        }
        if let Some(source) = dropped.first().and_then(dropped_source) {
            if let ImageSource::Path(path) = &source {
                self.path_input = path.display().to_string();
            }
            self.workflow.select_file(source);
        }
    }

    fn select_typed_path(&mut self) {
        let path = self.path_input.trim();
        if path.is_empty() {
            return;
        }
        self.workflow.select_file(ImageSource::from_path(path));
    }

    // ── Panels ───────────────────────────────────────────────────────────

    /// Preview image, or the placeholder when there is none.
    fn draw_preview(&self, ui: &mut egui::Ui, view: &WorkflowView) {
        let texture = view.preview.and_then(|id| self.previews.texture(id));
        let size = egui::vec2(PREVIEW_SIZE, PREVIEW_SIZE);

        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.set_min_size(size);
            ui.set_max_size(size);
            match texture {
                Some(texture) => {
                    ui.centered_and_justified(|ui| {
                        ui.add(
                            egui::Image::new(egui::load::SizedTexture::from_handle(&texture))
                                .max_size(size),
                        );
                    });
                }
                None => {
                    ui.centered_and_justified(|ui| {
                        ui.label(egui::RichText::new("No Image Selected").color(egui::Color32::GRAY));
                    });
                }
            }
        });
    }

    /// File field, convert button, progress and extracted text.
    fn draw_controls(&mut self, ui: &mut egui::Ui, view: &WorkflowView) {
        ui.vertical_centered(|ui| {
            ui.heading("Image to Text Converter");
        });
        ui.add_space(8.0);

        ui.horizontal(|ui| {
            let field = ui.add(
                egui::TextEdit::singleline(&mut self.path_input)
                    .hint_text("Image path, or drop a file on the window"),
            );
            let submitted = field.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if ui.button("Select").clicked() || submitted {
                self.select_typed_path();
            }
        });
        if let Some(name) = &view.file_name {
            ui.label(egui::RichText::new(name).small().color(egui::Color32::GRAY));
        }

        ui.add_space(8.0);
        let convert = egui::Button::new(egui::RichText::new(view.convert_label).strong())
            .min_size(egui::vec2(ui.available_width(), 32.0));
        if ui.add_enabled(view.can_convert, convert).clicked() {
            // Errors are already surfaced through the notifier or the log.
            let _ = self.workflow.start_conversion();
        }

        if let Some(percent) = view.progress {
            ui.add_space(8.0);
            ui.vertical_centered(|ui| {
                ui.label(format!("Processing: {percent}%"));
            });
            ui.add(egui::ProgressBar::new(f32::from(percent) / 100.0));
        }

        if let Some(text) = &view.text {
            ui.add_space(12.0);
            egui::Frame::group(ui.style()).show(ui, |ui| {
                ui.label(egui::RichText::new("Extracted Text:").strong());
                egui::ScrollArea::vertical()
                    .max_height(180.0)
                    .show(ui, |ui| {
                        ui.label(text.as_str());
                    });
                ui.add_space(4.0);
                if ui
                    .add_enabled(view.can_copy, egui::Button::new("Copy Text"))
                    .clicked()
                {
                    let _ = self.workflow.copy_result();
                }
            });
        }
    }

    fn draw_toasts(&self, ctx: &egui::Context) {
        if self.toasts.is_empty() {
            return;
        }
        egui::Area::new(egui::Id::new("toasts"))
            .anchor(egui::Align2::CENTER_TOP, egui::vec2(0.0, 12.0))
            .show(ctx, |ui| {
                for toast in &self.toasts {
                    let color = match toast.notification.kind {
                        NotificationKind::Success => egui::Color32::from_rgb(80, 200, 120),
                        NotificationKind::Error => egui::Color32::from_rgb(255, 100, 100),
                    };
                    egui::Frame::popup(ui.style()).show(ui, |ui| {
                        ui.colored_label(color, &toast.notification.message);
                    });
                }
            });
    }
}

// ---------------------------------------------------------------------------
// eframe::App impl
// ---------------------------------------------------------------------------

impl eframe::App for ImageToTextApp {
    /// Called every frame by eframe.  Polls input, then renders a snapshot of
    /// the workflow state.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_notifications();
        self.handle_dropped_files(ctx);

        let view = self.workflow.view();

        // Progress arrives from runtime threads; keep repainting while it can.
        if view.phase.is_busy() || !self.toasts.is_empty() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal_top(|ui| {
                self.draw_preview(ui, &view);
                ui.add_space(12.0);
                ui.vertical(|ui| self.draw_controls(ui, &view));
            });
        });

        self.draw_toasts(ctx);
    }

    /// Release the selection's preview before the window goes away.
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.workflow.shutdown();
        log::info!("app: window closing");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
