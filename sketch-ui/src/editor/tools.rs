// Stroke rasterization for the sketch surface.

use egui::Color32;
use sketch_core::{Point, Rgba, Stroke, ToolKind};
use tracing::{debug, trace, warn};

use super::canvas::Canvas;

/// A round stamp applied along a stroke's path.
pub trait Tool {
    fn apply(&self, canvas: &mut Canvas, x: f32, y: f32);

    fn name(&self) -> &str;

    fn cursor_size(&self) -> f32 {
        1.0
    }
}

#[derive(Debug, Clone)]
pub struct Brush {
    pub size: f32,
    pub color: Color32,
}

impl Brush {
    pub fn new(size: f32, color: Color32) -> Self {
        Self { size, color }
    }
}

impl Tool for Brush {
    fn apply(&self, canvas: &mut Canvas, x: f32, y: f32) {
        stamp_disc(canvas, x, y, self.size, self.color);
    }

    fn name(&self) -> &str {
        "Brush"
    }

    fn cursor_size(&self) -> f32 {
        self.size
    }
}

/// Restores pixels to the surface's cleared color instead of painting.
#[derive(Debug, Clone)]
pub struct Eraser {
    pub size: f32,
    pub erase_color: Color32,
}

impl Eraser {
    pub fn new(size: f32) -> Self {
        Self {
            size,
            erase_color: Color32::TRANSPARENT,
        }
    }

    pub fn with_color(size: f32, color: Color32) -> Self {
        Self {
            size,
            erase_color: color,
        }
    }
}

impl Tool for Eraser {
    fn apply(&self, canvas: &mut Canvas, x: f32, y: f32) {
        stamp_disc(canvas, x, y, self.size, self.erase_color);
    }

    fn name(&self) -> &str {
        "Eraser"
    }

    fn cursor_size(&self) -> f32 {
        self.size
    }
}

fn stamp_disc(canvas: &mut Canvas, x: f32, y: f32, size: f32, color: Color32) {
    if !(x.is_finite() && y.is_finite() && size.is_finite()) {
        trace!(x, y, size, "Non-finite stamp skipped");
        return;
    }
    let radius = (size / 2.0).max(0.5);
    let reach = radius.ceil() as i64;
    let cx = x.floor() as i64;
    let cy = y.floor() as i64;
    let r2 = radius * radius;

    // Only visit the part of the disc's bounding box that lies on the canvas.
    let x0 = cx.saturating_sub(reach).max(0);
    let y0 = cy.saturating_sub(reach).max(0);
    let x1 = cx.saturating_add(reach).min(canvas.width as i64 - 1);
    let y1 = cy.saturating_add(reach).min(canvas.height as i64 - 1);

    for py in y0..=y1 {
        let dy = (py - cy) as f32;
        for px in x0..=x1 {
            let dx = (px - cx) as f32;
            if dx * dx + dy * dy > r2 {
                continue;
            }
            canvas.set_pixel(px as u32, py as u32, color);
        }
    }
}

/// Liang-Barsky clip of the segment `from`..`to` against the box
/// `[min_x, max_x] x [min_y, max_y]`.
fn clip_segment(from: Point, to: Point, min: Point, max: Point) -> Option<(Point, Point)> {
    let (dx, dy) = (to.x - from.x, to.y - from.y);
    let mut t0 = 0.0_f32;
    let mut t1 = 1.0_f32;

    for (p, q) in [
        (-dx, from.x - min.x),
        (dx, max.x - from.x),
        (-dy, from.y - min.y),
        (dy, max.y - from.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }

    let at = |t: f32| Point::new(from.x + dx * t, from.y + dy * t);
    Some((at(t0), at(t1)))
}

/// Stamp `tool` along the segment from `from` to `to`, one pixel apart.
///
/// The segment is first clipped to the stretch whose stamps can reach the
/// canvas, so far-off points cost nothing.
pub fn draw_line(tool: &dyn Tool, canvas: &mut Canvas, from: Point, to: Point) {
    let finite = |p: Point| p.x.is_finite() && p.y.is_finite();
    let reach = (tool.cursor_size() / 2.0).max(0.5);
    if !(finite(from) && finite(to) && reach.is_finite()) {
        debug!("Non-finite segment skipped");
        return;
    }

    let (w, h) = (canvas.width as f32, canvas.height as f32);
    let Some((from, to)) = clip_segment(
        from,
        to,
        Point::new(-reach - 1.0, -reach - 1.0),
        Point::new(w + reach, h + reach),
    ) else {
        trace!("Segment misses the canvas");
        return;
    };

    // Wide stamps overlap heavily, so a cap tied to the canvas size keeps
    // long clipped runs bounded without opening gaps.
    let max_steps = 2.0 * (w + h) + 8.0;
    let steps = from.distance(to).ceil().clamp(1.0, max_steps) as u32;
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        tool.apply(
            canvas,
            from.x + (to.x - from.x) * t,
            from.y + (to.y - from.y) * t,
        );
    }
}

/// Rasterize one stroke as connected segments. A single-point stroke is a dot.
pub fn paint_stroke(canvas: &mut Canvas, stroke: &Stroke, fallback: Color32, background: Color32) {
    let tool: Box<dyn Tool> = match stroke.kind {
        ToolKind::Pen => Box::new(Brush::new(stroke.width, resolve_color(&stroke.color, fallback))),
        ToolKind::Eraser => Box::new(Eraser::with_color(stroke.width, background)),
    };
    trace!(
        tool = tool.name(),
        points = stroke.points.len(),
        "Painting stroke"
    );

    match stroke.points.as_slice() {
        [] => debug!("Stroke without points skipped"),
        [only] => tool.apply(canvas, only.x, only.y),
        points => {
            for pair in points.windows(2) {
                draw_line(tool.as_ref(), canvas, pair[0], pair[1]);
            }
        }
    }
}

/// Parse a stroke color string, falling back when it is not understood.
pub fn resolve_color(color: &str, fallback: Color32) -> Color32 {
    match Rgba::parse(color) {
        Ok(rgba) => to_color32(rgba),
        Err(err) => {
            warn!(error = %err, "Unparseable stroke color; using default");
            fallback
        }
    }
}

pub fn to_color32(rgba: Rgba) -> Color32 {
    Color32::from_rgba_unmultiplied(rgba.r, rgba.g, rgba.b, rgba.a)
}
