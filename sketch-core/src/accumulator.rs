// Collects pointer positions into one stroke between pointer-down and pointer-up.

use tracing::{debug, trace, warn};

use crate::{CanvasState, Operation, Point, Stroke, ToolKind, ToolSet};

/// Mutable buffer for the stroke being drawn. Only turned into an immutable
/// `Stroke` when the gesture ends.
#[derive(Debug, Clone)]
pub struct WorkingStroke {
    kind: ToolKind,
    points: Vec<Point>,
    color: String,
    width: f32,
}

impl WorkingStroke {
    fn new(kind: ToolKind, origin: Point, color: String, width: f32) -> Self {
        Self {
            kind,
            points: vec![origin],
            color,
            width,
        }
    }

    pub fn kind(&self) -> ToolKind {
        self.kind
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    /// Snapshot of the in-progress stroke, for live previews.
    pub fn to_stroke(&self) -> Stroke {
        Stroke {
            kind: self.kind,
            points: self.points.clone(),
            color: self.color.clone(),
            width: self.width,
        }
    }

    fn into_stroke(self) -> Stroke {
        Stroke {
            kind: self.kind,
            points: self.points,
            color: self.color,
            width: self.width,
        }
    }
}

#[derive(Debug, Clone)]
struct Gesture {
    base: CanvasState,
    stroke: WorkingStroke,
}

/// Single-gesture stroke builder. Gestures are strictly sequential: a new
/// stroke cannot begin until the active one ends or is cancelled.
#[derive(Debug, Clone, Default)]
pub struct StrokeAccumulator {
    tools: ToolSet,
    active: Option<Gesture>,
}

impl StrokeAccumulator {
    pub fn new(tools: ToolSet) -> Self {
        Self {
            tools,
            active: None,
        }
    }

    pub fn tools(&self) -> ToolSet {
        self.tools
    }

    /// Start a stroke drawn over `base`. Returns `false` and changes nothing
    /// when a stroke is already active or the tool is not offered.
    pub fn begin_stroke(
        &mut self,
        kind: ToolKind,
        origin: Point,
        color: impl Into<String>,
        width: f32,
        base: &CanvasState,
    ) -> bool {
        if self.active.is_some() {
            warn!(tool = %kind, "Pointer down during an active stroke ignored");
            return false;
        }
        if !self.tools.allows(kind) {
            debug!(tool = %kind, "Tool not offered on this surface; stroke ignored");
            return false;
        }
        if !(origin.is_finite() && width.is_finite()) {
            debug!(tool = %kind, x = origin.x, y = origin.y, width, "Non-finite stroke input ignored");
            return false;
        }
        let color = color.into();
        debug!(
            tool = %kind,
            x = origin.x,
            y = origin.y,
            color = %color,
            width,
            "Begin stroke"
        );
        self.active = Some(Gesture {
            base: base.clone(),
            stroke: WorkingStroke::new(kind, origin, color, width),
        });
        true
    }

    /// Append a point to the active stroke. Ignored when no stroke is active
    /// or the point is not finite.
    pub fn extend_stroke(&mut self, point: Point) -> bool {
        match &mut self.active {
            Some(_) if !point.is_finite() => {
                debug!(x = point.x, y = point.y, "Non-finite pointer position ignored");
                false
            }
            Some(gesture) => {
                trace!(x = point.x, y = point.y, "Extend stroke");
                gesture.stroke.points.push(point);
                true
            }
            None => {
                trace!("Pointer move without active stroke ignored");
                false
            }
        }
    }

    /// Finish the gesture and return the state to commit: the base state
    /// followed by the finished stroke.
    pub fn end_stroke(&mut self) -> Option<CanvasState> {
        let gesture = self.active.take()?;
        let stroke = gesture.stroke.into_stroke();
        debug!(
            tool = %stroke.kind,
            points = stroke.points.len(),
            "End stroke"
        );
        Some(gesture.base.with_op(Operation::Stroke(stroke)))
    }

    /// Drop the active stroke without producing a state.
    pub fn cancel(&mut self) -> bool {
        let cancelled = self.active.take().is_some();
        if cancelled {
            debug!("Active stroke cancelled");
        }
        cancelled
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn preview(&self) -> Option<&WorkingStroke> {
        self.active.as_ref().map(|g| &g.stroke)
    }

    /// The working copy of the canvas: base operations plus the in-progress stroke.
    pub fn working_state(&self) -> Option<CanvasState> {
        self.active
            .as_ref()
            .map(|g| g.base.with_op(Operation::Stroke(g.stroke.to_stroke())))
    }
}
