//! sketch-core: the drawing model behind every sketch surface.
//!
//! - A canvas state is an immutable list of operations (strokes, image inserts).
//! - `History` is a linear undo/redo stack of canvas states with branch cutting.
//! - `StrokeAccumulator` builds one stroke from a pointer gesture and hands the
//!   resulting state to history on pointer-up.
//! - Nothing here can fail: boundary undo/redo and stray pointer events are no-ops.

pub mod accumulator;
pub mod color;
pub mod history;
pub mod model;
pub mod tools;

pub use accumulator::{StrokeAccumulator, WorkingStroke};
pub use color::{ColorError, Rgba};
pub use history::{CanvasPhase, History};
pub use model::{CanvasState, Operation, Point, Stroke, ToolKind};
pub use tools::ToolSet;
