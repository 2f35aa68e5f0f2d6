// Editor module for the sketch surface.

pub mod board;
pub mod canvas;
pub mod export;
pub mod render;
pub mod tools;
pub mod widget;

pub use board::{BoardEvent, DrawingBoard};
pub use canvas::Canvas;
pub use export::{decode_image, encode_png_data_uri, ExportError, PNG_DATA_URI_PREFIX};
pub use render::{RasterSurface, RenderSurface};
pub use tools::{Brush, Eraser, Tool};
pub use widget::SketchPad;
