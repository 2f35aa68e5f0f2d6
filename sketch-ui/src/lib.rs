//! sketch-ui: hosts the drawing core on a pixel surface.
//!
//! A `DrawingBoard` owns one history and one stroke accumulator, feeds every
//! input event through them and, after each history change, renders the
//! visible canvas and publishes it as a PNG data URI.

pub mod config;
pub mod editor;
pub mod telemetry;

pub use config::{load_config, BoardConfig};
pub use editor::{
    BoardEvent, Canvas, DrawingBoard, ExportError, RasterSurface, RenderSurface, SketchPad,
};
