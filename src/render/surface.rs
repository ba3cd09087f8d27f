//! Drawing-surface seam between the core and the widget toolkit
//!
//! The annotation engine emits primitive draw calls through the
//! `DrawingSurface` trait; the toolkit layer implements it over whatever
//! canvas the map or network view paints on. `RecordingSurface` is the
//! in-process backend used by tests and the textual export.

use crate::config::RgbColor;
use crate::domain::geometry::Point;

/// Vertical placement of label text relative to its anchor point
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextAnchor {
    #[default]
    Above,
    Below,
}

impl TextAnchor {
    /// The opposite placement, for de-conflicting co-located labels
    pub fn flipped(self) -> Self {
        match self {
            TextAnchor::Above => TextAnchor::Below,
            TextAnchor::Below => TextAnchor::Above,
        }
    }
}

/// Primitive drawing operations a view's canvas must support
pub trait DrawingSurface {
    fn set_color(&mut self, color: RgbColor);
    fn set_line_width(&mut self, width: f64);
    fn set_font(&mut self, family: &str, size: f64);
    /// Draw a marker symbol centered on `center`
    fn draw_symbol(&mut self, center: Point, size: f64);
    /// Draw label text anchored above or below `pos`
    fn draw_text(&mut self, pos: Point, text: &str, anchor: TextAnchor);
    fn draw_line(&mut self, a: Point, b: Point);
    fn draw_polyline(&mut self, points: &[Point]);
}

/// One recorded draw operation
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    SetColor(RgbColor),
    SetLineWidth(f64),
    SetFont { family: String, size: f64 },
    Symbol { center: Point, size: f64 },
    Text {
        pos: Point,
        text: String,
        anchor: TextAnchor,
    },
    Line { a: Point, b: Point },
    Polyline(Vec<Point>),
}

impl DrawOp {
    /// Whether this operation actually marks the surface
    pub fn is_drawing(&self) -> bool {
        !matches!(
            self,
            DrawOp::SetColor(_) | DrawOp::SetLineWidth(_) | DrawOp::SetFont { .. }
        )
    }
}

/// Surface backend that records operations instead of painting
#[derive(Debug, Default)]
pub struct RecordingSurface {
    ops: Vec<DrawOp>,
}

impl RecordingSurface {
    /// Create an empty recording surface
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded operations, in call order
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Recorded operations that mark the surface (state changes skipped)
    pub fn drawing_ops(&self) -> impl Iterator<Item = &DrawOp> {
        self.ops.iter().filter(|op| op.is_drawing())
    }

    /// Take the recorded operations, leaving the surface empty
    pub fn take_ops(&mut self) -> Vec<DrawOp> {
        std::mem::take(&mut self.ops)
    }
}

impl DrawingSurface for RecordingSurface {
    fn set_color(&mut self, color: RgbColor) {
        self.ops.push(DrawOp::SetColor(color));
    }

    fn set_line_width(&mut self, width: f64) {
        self.ops.push(DrawOp::SetLineWidth(width));
    }

    fn set_font(&mut self, family: &str, size: f64) {
        self.ops.push(DrawOp::SetFont {
            family: family.to_owned(),
            size,
        });
    }

    fn draw_symbol(&mut self, center: Point, size: f64) {
        self.ops.push(DrawOp::Symbol { center, size });
    }

    fn draw_text(&mut self, pos: Point, text: &str, anchor: TextAnchor) {
        self.ops.push(DrawOp::Text {
            pos,
            text: text.to_owned(),
            anchor,
        });
    }

    fn draw_line(&mut self, a: Point, b: Point) {
        self.ops.push(DrawOp::Line { a, b });
    }

    fn draw_polyline(&mut self, points: &[Point]) {
        self.ops.push(DrawOp::Polyline(points.to_vec()));
    }
}
