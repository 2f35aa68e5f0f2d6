//! Canvas data model: points, strokes, operations and immutable canvas states.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A position in raw surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn distance(self, other: Point) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

/// Which drawing tool produced a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    Pen,
    Eraser,
}

impl ToolKind {
    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::Pen => "pen",
            ToolKind::Eraser => "eraser",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A finished freehand stroke. Color and width are carried per stroke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub kind: ToolKind,
    pub points: Vec<Point>,
    pub color: String,
    pub width: f32,
}

impl Stroke {
    pub fn is_eraser(&self) -> bool {
        self.kind == ToolKind::Eraser
    }
}

/// One discrete edit on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operation {
    Stroke(Stroke),
    /// `image_data` is an opaque encoded image, normally a data URI.
    ImageInsert { image_data: String },
}

impl Operation {
    pub fn image(image_data: impl Into<String>) -> Self {
        Operation::ImageInsert {
            image_data: image_data.into(),
        }
    }

    pub fn as_stroke(&self) -> Option<&Stroke> {
        match self {
            Operation::Stroke(stroke) => Some(stroke),
            Operation::ImageInsert { .. } => None,
        }
    }
}

/// Everything drawn up to one point in time.
///
/// Storage is shared, so cloning a state is cheap and a state stored in
/// history can never be changed through another handle. Appending produces a
/// new state.
#[derive(Clone, PartialEq)]
pub struct CanvasState {
    ops: Arc<[Operation]>,
}

impl CanvasState {
    /// The empty canvas.
    pub fn empty() -> Self {
        Self::from_ops(Vec::new())
    }

    pub fn from_ops(ops: Vec<Operation>) -> Self {
        Self { ops: ops.into() }
    }

    /// A new state holding this state's operations followed by `op`.
    pub fn with_op(&self, op: Operation) -> Self {
        let mut ops = Vec::with_capacity(self.ops.len() + 1);
        ops.extend(self.ops.iter().cloned());
        ops.push(op);
        Self::from_ops(ops)
    }

    pub fn ops(&self) -> &[Operation] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Whether both handles point at the same stored state.
    pub fn ptr_eq(&self, other: &CanvasState) -> bool {
        Arc::ptr_eq(&self.ops, &other.ops)
    }
}

impl fmt::Debug for CanvasState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.ops.iter()).finish()
    }
}

impl Default for CanvasState {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Vec<Operation>> for CanvasState {
    fn from(ops: Vec<Operation>) -> Self {
        Self::from_ops(ops)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pen(points: &[(f32, f32)]) -> Operation {
        Operation::Stroke(Stroke {
            kind: ToolKind::Pen,
            points: points.iter().copied().map(Point::from).collect(),
            color: "#000000".into(),
            width: 2.0,
        })
    }

    #[test]
    fn with_op_leaves_original_untouched() {
        let base = CanvasState::from_ops(vec![pen(&[(0.0, 0.0)])]);
        let next = base.with_op(pen(&[(1.0, 1.0)]));

        assert_eq!(base.len(), 1);
        assert_eq!(next.len(), 2);
        assert_eq!(next.ops()[0], base.ops()[0]);
    }

    #[test]
    fn equality_is_by_value() {
        let a = CanvasState::from_ops(vec![pen(&[(3.0, 4.0)])]);
        let b = CanvasState::from_ops(vec![pen(&[(3.0, 4.0)])]);
        assert_eq!(a, b);
        assert!(!a.ptr_eq(&b));
        assert!(a.ptr_eq(&a.clone()));
    }

    #[test]
    fn operation_json_is_tagged() {
        let json = serde_json::to_value(Operation::image("data:image/png;base64,AAAA")).unwrap();
        assert_eq!(json["type"], "image_insert");
        assert_eq!(json["image_data"], "data:image/png;base64,AAAA");

        let stroke: Operation = serde_json::from_value(serde_json::json!({
            "type": "stroke",
            "kind": "eraser",
            "points": [{"x": 1.0, "y": 2.0}],
            "color": "#fff",
            "width": 8.0
        }))
        .unwrap();
        assert!(stroke.as_stroke().unwrap().is_eraser());
    }

    #[test]
    fn point_distance() {
        assert_eq!(Point::new(0.0, 0.0).distance(Point::new(3.0, 4.0)), 5.0);
    }
}
