// egui host for a drawing board: pointer drags become board events and the
// raster surface is shown as a texture.

use egui::{Color32, ColorImage, Pos2, Rect, Sense, TextureHandle, TextureOptions};
use sketch_core::ToolKind;

use super::board::{BoardEvent, DrawingBoard};
use super::render::{RasterSurface, RenderSurface};
use crate::config::BoardConfig;

/// Per-page pen settings plus the uploaded texture.
pub struct SketchPad {
    pub tool: ToolKind,
    pub color: String,
    pub width: f32,
    texture: Option<TextureHandle>,
    uploaded_generation: Option<u64>,
}

impl SketchPad {
    pub fn new(config: &BoardConfig) -> Self {
        Self {
            tool: ToolKind::Pen,
            color: config.default_color.clone(),
            width: config.default_width,
            texture: None,
            uploaded_generation: None,
        }
    }

    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        board: &mut DrawingBoard<RasterSurface>,
    ) -> egui::Response {
        let (width, height) = board.surface().size();
        let (response, painter) =
            ui.allocate_painter(egui::vec2(width as f32, height as f32), Sense::drag());
        let rect = response.rect;
        let to_surface = |pos: Pos2| pos - rect.min;

        if response.drag_started() {
            let origin = ui
                .input(|i| i.pointer.press_origin())
                .or_else(|| response.interact_pointer_pos());
            if let Some(pos) = origin {
                let local = to_surface(pos);
                board.handle(BoardEvent::PointerDown {
                    x: local.x,
                    y: local.y,
                    tool: self.tool,
                    color: self.color.clone(),
                    width: self.width,
                });
            }
        }
        if response.dragged() {
            if let Some(pos) = response.interact_pointer_pos() {
                let local = to_surface(pos);
                board.handle(BoardEvent::PointerMove {
                    x: local.x,
                    y: local.y,
                });
            }
        }
        if response.drag_stopped() {
            board.handle(BoardEvent::PointerUp);
        }

        let surface = board.surface();
        if self.uploaded_generation != Some(surface.generation()) || self.texture.is_none() {
            let canvas = surface.canvas();
            let image = ColorImage::from_rgba_unmultiplied(
                [canvas.width as usize, canvas.height as usize],
                &canvas.to_rgba_bytes(),
            );
            match &mut self.texture {
                Some(texture) => texture.set(image, TextureOptions::NEAREST),
                None => {
                    self.texture =
                        Some(ui.ctx().load_texture("sketch-pad", image, TextureOptions::NEAREST))
                }
            }
            self.uploaded_generation = Some(surface.generation());
        }

        if let Some(texture) = &self.texture {
            painter.image(
                texture.id(),
                rect,
                Rect::from_min_max(Pos2::ZERO, egui::pos2(1.0, 1.0)),
                Color32::WHITE,
            );
        }

        response
    }
}
