//! Annotation projection engine
//!
//! Turns a selected record plus a label into drawable geometry for one of
//! two views: the geographic map (`map`) or the schematic network diagram
//! (`network`). Missing spatial data is never an error; endpoints that
//! cannot be resolved are skipped and the rest of the annotation still
//! renders. Within one render call the z-order is fixed: connecting lines,
//! then symbols, then label text.

mod map;
mod network;

use crate::config::{BasinViewConfig, RgbColor};
use crate::domain::dataset::SharedDataset;
use crate::domain::geometry::{Crs, Point, Rect};
use crate::domain::record::{AnnotatableRecord, EndpointRole};
use crate::network::NetworkGraph;
use crate::render::projection::Reprojector;
use crate::render::surface::{DrawingSurface, TextAnchor};

/// A resolved drawable position with its composed label
///
/// Either fully formed or not produced at all; resolution never yields a
/// partial anchor.
#[derive(Clone, Debug, PartialEq)]
pub struct Anchor {
    /// Position in the target view's coordinates
    pub position: Point,
    /// Coordinate reference of `position`
    pub crs: Crs,
    /// Composed display label
    pub label: String,
    /// Vertical label placement relative to the symbol
    pub placement: TextAnchor,
}

/// One annotation request: a record, its label, and optional hints
///
/// Transient; created per user action and consumed immediately.
#[derive(Clone, Debug)]
pub struct AnnotationRequest {
    pub record: AnnotatableRecord,
    pub label: String,
    /// Viewport hint the extent calculation starts from
    pub bounding_hint: Option<Rect>,
    /// Fallback CRS for shapes that do not carry their own
    pub source_crs: Option<Crs>,
}

impl AnnotationRequest {
    /// Create a request with no hints
    pub fn new(record: AnnotatableRecord, label: impl Into<String>) -> Self {
        Self {
            record,
            label: label.into(),
            bounding_hint: None,
            source_crs: None,
        }
    }

    /// Set the fallback CRS for shapes without one
    pub fn with_source_crs(mut self, crs: Crs) -> Self {
        self.source_crs = Some(crs);
        self
    }

    /// Seed the returned extent with a viewport hint
    pub fn with_bounding_hint(mut self, hint: Rect) -> Self {
        self.bounding_hint = Some(hint);
        self
    }
}

/// Style knobs for annotation drawing, sourced from the app config
#[derive(Clone, Debug, PartialEq)]
pub struct AnnotationStyle {
    pub symbol_size: f64,
    pub line_width: f64,
    pub line_color: RgbColor,
    pub symbol_color: RgbColor,
    pub text_color: RgbColor,
    pub font_family: String,
    pub font_size: f64,
}

impl Default for AnnotationStyle {
    fn default() -> Self {
        Self::from(&BasinViewConfig::default())
    }
}

impl From<&BasinViewConfig> for AnnotationStyle {
    fn from(config: &BasinViewConfig) -> Self {
        Self {
            symbol_size: config.symbol_size,
            line_width: config.line_width,
            line_color: config.line_color,
            symbol_color: config.symbol_color,
            text_color: config.text_color,
            font_family: config.label_font.clone(),
            font_size: config.label_font_size,
        }
    }
}

/// Projects records into annotations on the map and network views
pub struct AnnotationEngine {
    dataset: SharedDataset,
    reprojector: Box<dyn Reprojector>,
    style: AnnotationStyle,
}

impl AnnotationEngine {
    /// Create an engine over the shared dataset
    pub fn new(dataset: SharedDataset, reprojector: Box<dyn Reprojector>) -> Self {
        Self {
            dataset,
            reprojector,
            style: AnnotationStyle::default(),
        }
    }

    /// Override the default drawing style
    pub fn with_style(mut self, style: AnnotationStyle) -> Self {
        self.style = style;
        self
    }

    /// Current drawing style
    pub fn style(&self) -> &AnnotationStyle {
        &self.style
    }

    /// Swap the dataset reference (follows a registry dataset swap)
    pub fn set_dataset(&mut self, dataset: SharedDataset) {
        self.dataset = dataset;
    }

    /// Render an annotation for `request` onto the geographic map view
    ///
    /// Returns the extent covering everything drawn (seeded from the
    /// request's bounding hint), or `None` when nothing could be resolved.
    pub fn render_on_map(
        &self,
        surface: &mut dyn DrawingSurface,
        view_crs: &Crs,
        request: &AnnotationRequest,
    ) -> Option<Rect> {
        map::render(self, surface, view_crs, request)
    }

    /// Render an annotation for `request` onto the network diagram view
    ///
    /// Endpoints resolve to network nodes; connecting geometry follows the
    /// graph's topological node sequence rather than straight lines.
    pub fn render_on_network(
        &self,
        surface: &mut dyn DrawingSurface,
        graph: &NetworkGraph,
        request: &AnnotationRequest,
    ) -> Option<Rect> {
        network::render(self, surface, graph, request)
    }

    pub(crate) fn dataset(&self) -> &SharedDataset {
        &self.dataset
    }

    pub(crate) fn reprojector(&self) -> &dyn Reprojector {
        self.reprojector.as_ref()
    }
}

/// Compose the role-qualified label for one endpoint of a multi-endpoint
/// record
pub(crate) fn endpoint_label(base: &str, role: EndpointRole, id: &str, name: &str) -> String {
    format!("{base}\n({}: {id} - {name})", role.label())
}

/// Buffered draw calls for one annotation, grouped by z-order stage
#[derive(Debug, Default)]
pub(crate) struct RenderPlan {
    /// Connecting geometry, drawn first (under everything)
    pub polylines: Vec<Vec<Point>>,
    /// Marker symbols with per-symbol size, drawn over lines
    pub symbols: Vec<(Point, f64)>,
    /// Label text, drawn last (on top)
    pub texts: Vec<(Point, String, TextAnchor)>,
}

impl RenderPlan {
    pub fn is_empty(&self) -> bool {
        self.polylines.is_empty() && self.symbols.is_empty() && self.texts.is_empty()
    }

    /// Emit the plan onto a surface in z-order and compute the extent
    ///
    /// Produces no draw calls at all when the plan is empty.
    pub fn emit(
        &self,
        surface: &mut dyn DrawingSurface,
        style: &AnnotationStyle,
        hint: Option<Rect>,
    ) -> Option<Rect> {
        if self.is_empty() {
            return None;
        }

        if !self.polylines.is_empty() {
            surface.set_color(style.line_color);
            surface.set_line_width(style.line_width);
            for line in &self.polylines {
                match line.as_slice() {
                    [a, b] => surface.draw_line(*a, *b),
                    points => surface.draw_polyline(points),
                }
            }
        }

        if !self.symbols.is_empty() {
            surface.set_color(style.symbol_color);
            for &(center, size) in &self.symbols {
                surface.draw_symbol(center, size);
            }
        }

        if !self.texts.is_empty() {
            surface.set_color(style.text_color);
            surface.set_font(&style.font_family, style.font_size);
            for (pos, text, anchor) in &self.texts {
                surface.draw_text(*pos, text, *anchor);
            }
        }

        let mut extent = hint;
        let mut cover = |p: Point| {
            extent = Some(match extent {
                Some(r) => r.expand_to(p),
                None => Rect::at_point(p),
            });
        };
        for line in &self.polylines {
            for &p in line {
                cover(p);
            }
        }
        for &(p, _) in &self.symbols {
            cover(p);
        }
        for (p, _, _) in &self.texts {
            cover(*p);
        }
        extent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::surface::{DrawOp, RecordingSurface};

    #[test]
    fn test_endpoint_label_format() {
        let label = endpoint_label("Right 42", EndpointRole::Destination, "div9", "Town Ditch");
        assert_eq!(label, "Right 42\n(destination: div9 - Town Ditch)");
    }

    #[test]
    fn test_empty_plan_emits_nothing() {
        let plan = RenderPlan::default();
        let mut surface = RecordingSurface::new();
        let extent = plan.emit(&mut surface, &AnnotationStyle::default(), None);
        assert!(extent.is_none());
        assert!(surface.ops().is_empty());
    }

    #[test]
    fn test_emit_z_order_and_extent() {
        let plan = RenderPlan {
            polylines: vec![vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)]],
            symbols: vec![(Point::new(0.0, 0.0), 6.0), (Point::new(10.0, 0.0), 6.0)],
            texts: vec![(Point::new(0.0, 0.0), "A".into(), TextAnchor::Above)],
        };
        let mut surface = RecordingSurface::new();
        let extent = plan
            .emit(&mut surface, &AnnotationStyle::default(), None)
            .unwrap();
        assert_eq!(extent, Rect::new(0.0, 0.0, 10.0, 0.0));

        let drawing: Vec<&DrawOp> = surface.drawing_ops().collect();
        assert!(matches!(drawing[0], DrawOp::Line { .. }));
        assert!(matches!(drawing[1], DrawOp::Symbol { .. }));
        assert!(matches!(drawing[2], DrawOp::Symbol { .. }));
        assert!(matches!(drawing[3], DrawOp::Text { .. }));
    }

    #[test]
    fn test_extent_seeded_by_hint() {
        let plan = RenderPlan {
            symbols: vec![(Point::new(5.0, 5.0), 6.0)],
            ..Default::default()
        };
        let mut surface = RecordingSurface::new();
        let hint = Rect::new(-100.0, -100.0, -90.0, -90.0);
        let extent = plan
            .emit(&mut surface, &AnnotationStyle::default(), Some(hint))
            .unwrap();
        assert_eq!(extent, Rect::new(-100.0, -100.0, 5.0, 5.0));
    }
}
