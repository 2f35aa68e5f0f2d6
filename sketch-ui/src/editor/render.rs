// Rendering/export adapter between the drawing model and a pixel surface.

use egui::Color32;
use image::imageops::{self, FilterType};
use image::RgbaImage;
use sketch_core::Operation;
use tracing::{debug, warn};

use super::canvas::Canvas;
use super::export::{self, ExportError};
use super::tools;

/// What the board needs from the host's drawing surface.
pub trait RenderSurface {
    /// Recompute pixel dimensions. Calling it again with the same size is a no-op.
    fn resize(&mut self, width: u32, height: u32);

    fn size(&self) -> (u32, u32);

    /// Clear the surface and draw `ops` in order.
    fn render(&mut self, ops: &[Operation]);

    /// Encode the rendered surface as an image data URI.
    fn export(&self) -> Result<String, ExportError>;
}

/// Last inserted image, decoded once and kept scaled to the surface size.
#[derive(Debug, Clone)]
struct ImageCache {
    image_data: String,
    source: RgbaImage,
    scaled: Option<RgbaImage>,
}

impl ImageCache {
    fn fitted(&mut self, width: u32, height: u32) -> &RgbaImage {
        if self.source.dimensions() == (width, height) {
            return &self.source;
        }
        let stale = self
            .scaled
            .as_ref()
            .map_or(true, |s| s.dimensions() != (width, height));
        if stale {
            debug!(width, height, "Scaling inserted image");
            self.scaled = Some(imageops::resize(&self.source, width, height, FilterType::Triangle));
        }
        self.scaled.as_ref().unwrap_or(&self.source)
    }
}

/// Software surface backed by a [`Canvas`].
#[derive(Debug, Clone)]
pub struct RasterSurface {
    canvas: Canvas,
    background: Color32,
    default_color: Color32,
    decoded: Option<ImageCache>,
    generation: u64,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32, background: Color32, default_color: Color32) -> Self {
        Self {
            canvas: Canvas::new(width, height, background),
            background,
            default_color,
            decoded: None,
            generation: 0,
        }
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Bumped on every render and resize; lets hosts skip redundant uploads.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Stretch the image over the whole surface. Pixels replace what is below
    /// them rather than blending; only fully transparent pixels are skipped.
    fn draw_image(&mut self, image_data: &str) {
        if self.canvas.pixels.is_empty() {
            return;
        }
        let cached = matches!(&self.decoded, Some(c) if c.image_data == image_data);
        if !cached {
            match export::decode_image(image_data) {
                Ok(source) => {
                    self.decoded = Some(ImageCache {
                        image_data: image_data.to_string(),
                        source,
                        scaled: None,
                    })
                }
                Err(err) => {
                    warn!(error = %err, "Inserted image could not be decoded; skipped");
                    return;
                }
            }
        }
        let Some(cache) = &mut self.decoded else {
            return;
        };

        let source = cache.fitted(self.canvas.width, self.canvas.height);
        for (x, y, pixel) in source.enumerate_pixels() {
            let [r, g, b, a] = pixel.0;
            if a == 0 {
                continue;
            }
            self.canvas
                .set_pixel(x, y, Color32::from_rgba_unmultiplied(r, g, b, a));
        }
    }
}

impl Default for RasterSurface {
    fn default() -> Self {
        Self::new(512, 512, Color32::TRANSPARENT, Color32::BLACK)
    }
}

impl RenderSurface for RasterSurface {
    fn resize(&mut self, width: u32, height: u32) {
        if self.canvas.resize(width, height, self.background) {
            self.generation += 1;
        }
    }

    fn size(&self) -> (u32, u32) {
        (self.canvas.width, self.canvas.height)
    }

    fn render(&mut self, ops: &[Operation]) {
        self.canvas.fill(self.background);
        for op in ops {
            match op {
                Operation::Stroke(stroke) => {
                    tools::paint_stroke(&mut self.canvas, stroke, self.default_color, self.background)
                }
                Operation::ImageInsert { image_data } => self.draw_image(image_data),
            }
        }
        self.generation += 1;
        debug!(ops = ops.len(), generation = self.generation, "Rendered surface");
    }

    fn export(&self) -> Result<String, ExportError> {
        export::encode_png_data_uri(&self.canvas)
    }
}
