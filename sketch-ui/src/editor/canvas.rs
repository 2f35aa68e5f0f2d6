// Pixel buffer behind the sketch surface.
// Strokes and inserted images are rasterized into it and it is what gets exported.

use egui::Color32;
use tracing::{debug, info, trace};

#[derive(Debug, Clone)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color32>,
}

impl Canvas {
    pub fn new(width: u32, height: u32, background: Color32) -> Self {
        info!(
            "Creating new canvas of size {}x{} with background color {:?}",
            width, height, background
        );

        let pixels = vec![background; (width as usize) * (height as usize)];
        Self {
            width,
            height,
            pixels,
        }
    }

    fn is_valid_coordinate(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }

    fn coord_to_index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Color32> {
        if !self.is_valid_coordinate(x, y) {
            return None;
        }
        Some(self.pixels[self.coord_to_index(x, y)])
    }

    /// Out-of-bounds writes are dropped; strokes routinely run off the edge.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color32) -> bool {
        if !self.is_valid_coordinate(x, y) {
            trace!(x, y, "Pixel write outside canvas dropped");
            return false;
        }

        let index = self.coord_to_index(x, y);
        self.pixels[index] = color;
        true
    }

    pub fn fill(&mut self, color: Color32) {
        trace!("Filling canvas {:?}", color);
        self.pixels.fill(color);
    }

    /// Reallocate for new dimensions. Contents are discarded; callers re-render.
    /// Returns `false` when the size is unchanged.
    pub fn resize(&mut self, width: u32, height: u32, background: Color32) -> bool {
        if self.width == width && self.height == height {
            return false;
        }
        debug!(
            from_width = self.width,
            from_height = self.height,
            width,
            height,
            "Resizing canvas"
        );
        self.width = width;
        self.height = height;
        self.pixels = vec![background; (width as usize) * (height as usize)];
        true
    }

    /// Straight-alpha RGBA bytes, row-major.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|p| p.to_srgba_unmultiplied())
            .collect()
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Canvas::new(512, 512, Color32::TRANSPARENT)
    }
}
