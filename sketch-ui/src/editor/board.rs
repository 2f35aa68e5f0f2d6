// Drawing board: owns one history, one stroke accumulator and the surface,
// turns input events into history changes and publishes an export per change.

use sketch_core::{History, Point, StrokeAccumulator, ToolKind, ToolSet};
use tracing::{debug, info, warn};

use super::render::{RasterSurface, RenderSurface};
use super::tools;
use crate::config::BoardConfig;

/// Input consumed by the board.
#[derive(Debug, Clone, PartialEq)]
pub enum BoardEvent {
    PointerDown {
        x: f32,
        y: f32,
        tool: ToolKind,
        color: String,
        width: f32,
    },
    PointerMove {
        x: f32,
        y: f32,
    },
    PointerUp,
    Undo,
    Redo,
    Clear,
    /// A user-supplied image replaces the canvas content.
    UploadImage(String),
    /// A previously generated result sent back in as the new base layer.
    FeedbackImage(String),
    Resize {
        width: u32,
        height: u32,
    },
}

type ChangeCallback = Box<dyn FnMut(&str)>;

pub struct DrawingBoard<S: RenderSurface = RasterSurface> {
    history: History,
    strokes: StrokeAccumulator,
    surface: S,
    on_change: Option<ChangeCallback>,
    last_export: Option<String>,
}

impl DrawingBoard<RasterSurface> {
    pub fn from_config(config: &BoardConfig) -> Self {
        let background = tools::resolve_color(&config.background, egui::Color32::TRANSPARENT);
        let default_color = tools::resolve_color(&config.default_color, egui::Color32::BLACK);
        let surface = RasterSurface::new(config.width, config.height, background, default_color);
        Self::with_surface(surface, config.tools)
    }
}

impl<S: RenderSurface> DrawingBoard<S> {
    pub fn with_surface(surface: S, tools: ToolSet) -> Self {
        let (width, height) = surface.size();
        info!(width, height, ?tools, "Creating drawing board");
        Self {
            history: History::new(),
            strokes: StrokeAccumulator::new(tools),
            surface,
            on_change: None,
            last_export: None,
        }
    }

    /// Register the callback invoked with the encoded surface after every
    /// history change.
    pub fn set_on_change(&mut self, callback: impl FnMut(&str) + 'static) {
        self.on_change = Some(Box::new(callback));
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn tools(&self) -> ToolSet {
        self.strokes.tools()
    }

    pub fn is_drawing(&self) -> bool {
        self.strokes.is_active()
    }

    /// The most recent successful export, i.e. the form's current image value.
    pub fn last_export(&self) -> Option<&str> {
        self.last_export.as_deref()
    }

    /// Apply one input event. Returns `true` when history changed.
    pub fn handle(&mut self, event: BoardEvent) -> bool {
        match event {
            BoardEvent::PointerDown {
                x,
                y,
                tool,
                color,
                width,
            } => {
                let base = self.history.current().clone();
                if self
                    .strokes
                    .begin_stroke(tool, Point::new(x, y), color, width, &base)
                {
                    self.render_working();
                }
                false
            }
            BoardEvent::PointerMove { x, y } => {
                if self.strokes.extend_stroke(Point::new(x, y)) {
                    self.render_working();
                }
                false
            }
            BoardEvent::PointerUp => match self.strokes.end_stroke() {
                Some(state) => {
                    let changed = self.history.commit(state);
                    self.publish(changed)
                }
                None => false,
            },
            BoardEvent::Undo => {
                self.abandon_gesture("undo");
                let changed = self.history.undo();
                self.publish(changed)
            }
            BoardEvent::Redo => {
                self.abandon_gesture("redo");
                let changed = self.history.redo();
                self.publish(changed)
            }
            BoardEvent::Clear => {
                self.abandon_gesture("clear");
                let changed = self.history.clear();
                self.publish(changed)
            }
            BoardEvent::UploadImage(image) => {
                if !self.strokes.tools().image_upload {
                    debug!("Image upload not offered on this surface; ignored");
                    return false;
                }
                self.abandon_gesture("upload");
                info!("Inserting uploaded image");
                let changed = self.history.insert_image(image);
                self.publish(changed)
            }
            BoardEvent::FeedbackImage(image) => {
                self.abandon_gesture("feedback");
                info!("Inserting generated image as base layer");
                let changed = self.history.insert_image(image);
                self.publish(changed)
            }
            BoardEvent::Resize { width, height } => {
                if self.surface.size() != (width, height) {
                    self.surface.resize(width, height);
                    self.render_working();
                }
                false
            }
        }
    }

    fn abandon_gesture(&mut self, reason: &str) {
        if self.strokes.cancel() {
            warn!(reason, "Active stroke dropped by history action");
        }
    }

    /// Render the in-progress stroke over its base, or the visible state.
    fn render_working(&mut self) {
        match self.strokes.working_state() {
            Some(working) => self.surface.render(working.ops()),
            None => self.surface.render(self.history.current().ops()),
        }
    }

    /// Render and export once for a history change. Export failures skip the
    /// callback.
    fn publish(&mut self, changed: bool) -> bool {
        if !changed {
            return false;
        }
        self.surface.render(self.history.current().ops());
        match self.surface.export() {
            Ok(encoded) => {
                debug!(
                    step = self.history.step(),
                    len = self.history.len(),
                    bytes = encoded.len(),
                    "Publishing canvas change"
                );
                if let Some(callback) = self.on_change.as_mut() {
                    callback(&encoded);
                }
                self.last_export = Some(encoded);
            }
            Err(err) => {
                warn!(error = %err, "Surface export failed; change not published");
            }
        }
        true
    }
}
