//! Map-view annotation pass
//!
//! Endpoints resolve through the dataset to geo shapes, get reprojected
//! into the view CRS when needed, and connect with straight lines.

use crate::domain::dataset::Dataset;
use crate::domain::geometry::{Crs, Point, Rect};
use crate::domain::record::{AnnotatableRecord, EndpointRole};
use crate::render::surface::{DrawingSurface, TextAnchor};

use super::{Anchor, AnnotationEngine, AnnotationRequest, RenderPlan, endpoint_label};

/// One resolved endpoint, pre-collapse
struct ResolvedEndpoint {
    anchor: Anchor,
    role: Option<EndpointRole>,
}

pub(super) fn render(
    engine: &AnnotationEngine,
    surface: &mut dyn DrawingSurface,
    view_crs: &Crs,
    request: &AnnotationRequest,
) -> Option<Rect> {
    let dataset = engine.dataset().borrow();
    let mut resolved = Vec::new();

    match &request.record {
        AnnotatableRecord::Point { id, .. } => {
            if let Some(position) = resolve_shape(engine, &dataset, id, view_crs, request) {
                resolved.push(ResolvedEndpoint {
                    anchor: Anchor {
                        position,
                        crs: view_crs.clone(),
                        label: request.label.clone(),
                        placement: TextAnchor::Above,
                    },
                    role: None,
                });
            }
        }
        record => {
            for (role, id) in record.endpoints() {
                let Some(position) = resolve_shape(engine, &dataset, id, view_crs, request) else {
                    continue;
                };
                let name = dataset.lookup(id).map_or(id, |r| r.name.as_str());
                resolved.push(ResolvedEndpoint {
                    anchor: Anchor {
                        position,
                        crs: view_crs.clone(),
                        label: endpoint_label(&request.label, role, id, name),
                        placement: TextAnchor::Above,
                    },
                    role: Some(role),
                });
            }
        }
    }
    drop(dataset);

    if resolved.is_empty() {
        return None;
    }

    // Degenerate case: distinct logical endpoints on one physical anchor
    // collapse to a single plain-label annotation.
    if resolved.len() >= 2 && all_coincident(&resolved) {
        log::debug!(
            "endpoints of {} coincide; collapsing to one anchor",
            request.record.id()
        );
        let collapsed = Anchor {
            label: request.label.clone(),
            ..resolved[0].anchor.clone()
        };
        resolved = vec![ResolvedEndpoint {
            anchor: collapsed,
            role: None,
        }];
    }

    let mut plan = RenderPlan::default();

    // Straight connecting lines: each source/upstream to the primary
    // endpoint (destination/downstream), when both resolved.
    if let Some(primary) = resolved
        .iter()
        .find(|r| r.role.is_some_and(EndpointRole::is_primary))
    {
        let target = primary.anchor.position;
        for r in &resolved {
            if r.role.is_some_and(|role| !role.is_primary())
                && !r.anchor.position.coincident(target)
            {
                plan.polylines.push(vec![r.anchor.position, target]);
            }
        }
    }

    for r in &resolved {
        plan.symbols
            .push((r.anchor.position, engine.style().symbol_size));
        plan.texts
            .push((r.anchor.position, r.anchor.label.clone(), r.anchor.placement));
    }

    plan.emit(surface, engine.style(), request.bounding_hint)
}

/// Resolve one record id to a map position in the view CRS
///
/// Returns `None` (skip the endpoint) when the record is unknown, has no
/// geo shape, or its shape cannot be reprojected into the view.
fn resolve_shape(
    engine: &AnnotationEngine,
    dataset: &Dataset,
    id: &str,
    view_crs: &Crs,
    request: &AnnotationRequest,
) -> Option<Point> {
    let record = dataset.lookup(id)?;
    let shape = record.shape.as_ref()?;
    // A shape without a CRS falls back to the request's, then to the
    // view's own reference.
    let native = shape
        .crs
        .clone()
        .or_else(|| request.source_crs.clone())
        .unwrap_or_else(|| view_crs.clone());
    if !engine.reprojector().needs_reprojection(&native, view_crs) {
        return Some(shape.position);
    }
    match engine.reprojector().reproject(shape.position, &native, view_crs) {
        Ok(position) => Some(position),
        Err(err) => {
            log::warn!("skipping endpoint {id}: {err:#}");
            None
        }
    }
}

fn all_coincident(resolved: &[ResolvedEndpoint]) -> bool {
    let first = resolved[0].anchor.position;
    resolved[1..]
        .iter()
        .all(|r| r.anchor.position.coincident(first))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dataset::{Dataset, GeoRecord, StructureKind, shared};
    use crate::render::projection::{AffineTransform, IdentityReprojector, TableReprojector};
    use crate::render::surface::{DrawOp, RecordingSurface};

    fn view_crs() -> Crs {
        Crs::new("EPSG:4326")
    }

    fn dataset() -> Dataset {
        let mut d = Dataset::new("basin");
        d.insert(
            GeoRecord::new("gage1", "Canyon Gage", StructureKind::StreamGage)
                .with_shape(Point::new(10.0, 20.0), Some(view_crs())),
        );
        d.insert(
            GeoRecord::new("res1", "Blue Mesa", StructureKind::Reservoir)
                .with_shape(Point::new(0.0, 0.0), Some(view_crs())),
        );
        d.insert(
            GeoRecord::new("div9", "Town Ditch", StructureKind::Diversion)
                .with_shape(Point::new(30.0, 40.0), Some(view_crs())),
        );
        // No spatial data at all
        d.insert(GeoRecord::new("dry1", "Paper Right", StructureKind::Plan));
        d
    }

    fn engine() -> AnnotationEngine {
        AnnotationEngine::new(shared(dataset()), Box::new(IdentityReprojector))
    }

    fn point_record(id: &str) -> AnnotatableRecord {
        AnnotatableRecord::Point {
            id: id.into(),
            name: String::new(),
        }
    }

    fn right(source1: &str, destination: &str) -> AnnotatableRecord {
        AnnotatableRecord::OperationalRight {
            id: "op1".into(),
            name: "Exchange".into(),
            source1: Some(source1.into()),
            source2: None,
            destination: Some(destination.into()),
            intervening: Vec::new(),
        }
    }

    #[test]
    fn test_single_anchor_plain_label() {
        let engine = engine();
        let mut surface = RecordingSurface::new();
        let request = AnnotationRequest::new(point_record("gage1"), "Foo");
        let extent = engine.render_on_map(&mut surface, &view_crs(), &request);

        assert_eq!(extent, Some(Rect::at_point(Point::new(10.0, 20.0))));
        let drawing: Vec<&DrawOp> = surface.drawing_ops().collect();
        assert_eq!(drawing.len(), 2);
        assert!(matches!(drawing[0], DrawOp::Symbol { .. }));
        assert!(
            matches!(drawing[1], DrawOp::Text { text, .. } if text == "Foo"),
            "single-anchor label must have no role qualifier"
        );
    }

    #[test]
    fn test_two_endpoint_line_under_symbols() {
        let engine = engine();
        let mut surface = RecordingSurface::new();
        let request = AnnotationRequest::new(right("res1", "div9"), "Right 42");
        engine.render_on_map(&mut surface, &view_crs(), &request).unwrap();

        let drawing: Vec<&DrawOp> = surface.drawing_ops().collect();
        assert!(
            matches!(
                drawing[0],
                DrawOp::Line { a, b }
                    if a.coincident(Point::new(0.0, 0.0)) && b.coincident(Point::new(30.0, 40.0))
            ),
            "connecting line must be drawn first"
        );
        assert!(matches!(drawing[1], DrawOp::Symbol { .. }));
        assert!(matches!(drawing[2], DrawOp::Symbol { .. }));
        assert!(
            matches!(drawing[3], DrawOp::Text { text, .. } if text.contains("source 1: res1 - Blue Mesa"))
        );
        assert!(
            matches!(drawing[4], DrawOp::Text { text, .. } if text.contains("destination: div9 - Town Ditch"))
        );
    }

    #[test]
    fn test_partial_resolution_still_renders() {
        let engine = engine();
        let mut surface = RecordingSurface::new();
        // Source has no geo shape; only the destination should render.
        let request = AnnotationRequest::new(right("dry1", "div9"), "Right 42");
        engine.render_on_map(&mut surface, &view_crs(), &request).unwrap();

        let drawing: Vec<&DrawOp> = surface.drawing_ops().collect();
        assert_eq!(drawing.len(), 2, "no line when only one endpoint resolves");
        assert!(matches!(drawing[0], DrawOp::Symbol { .. }));
        assert!(
            matches!(drawing[1], DrawOp::Text { text, .. } if text.contains("destination")),
            "surviving endpoint keeps its role qualifier"
        );
    }

    #[test]
    fn test_unresolvable_record_draws_nothing() {
        let engine = engine();
        let mut surface = RecordingSurface::new();
        let request = AnnotationRequest::new(right("dry1", "unknown"), "Right 42");
        let extent = engine.render_on_map(&mut surface, &view_crs(), &request);
        assert!(extent.is_none());
        assert!(surface.ops().is_empty());
    }

    #[test]
    fn test_coincident_endpoints_collapse_to_plain_label() {
        let mut d = dataset();
        d.insert(
            GeoRecord::new("up1", "Reach Head", StructureKind::InstreamFlow)
                .with_shape(Point::new(5.0, 5.0), Some(view_crs())),
        );
        d.insert(
            GeoRecord::new("down1", "Reach Foot", StructureKind::InstreamFlow)
                .with_shape(Point::new(5.0, 5.0), Some(view_crs())),
        );
        let engine = AnnotationEngine::new(shared(d), Box::new(IdentityReprojector));

        let reach = AnnotatableRecord::InstreamReach {
            id: "ifr1".into(),
            name: "Minimum flow".into(),
            upstream: Some("up1".into()),
            downstream: Some("down1".into()),
        };
        let mut surface = RecordingSurface::new();
        engine
            .render_on_map(&mut surface, &view_crs(), &AnnotationRequest::new(reach, "Reach"))
            .unwrap();

        let drawing: Vec<&DrawOp> = surface.drawing_ops().collect();
        assert_eq!(drawing.len(), 2, "one symbol and one text, no line");
        assert!(matches!(drawing[0], DrawOp::Symbol { .. }));
        assert!(matches!(drawing[1], DrawOp::Text { text, .. } if text == "Reach"));
    }

    #[test]
    fn test_reprojection_applied_per_endpoint() {
        let local = Crs::new("LOCAL");
        let mut d = Dataset::new("basin");
        d.insert(
            GeoRecord::new("res1", "Blue Mesa", StructureKind::Reservoir)
                .with_shape(Point::new(1.0, 2.0), Some(view_crs())),
        );
        // Destination is in an unregistered CRS and must be skipped.
        d.insert(
            GeoRecord::new("div9", "Town Ditch", StructureKind::Diversion)
                .with_shape(Point::new(9.0, 9.0), Some(Crs::new("EPSG:9999"))),
        );

        let mut table = TableReprojector::new();
        table.register(
            view_crs(),
            local.clone(),
            AffineTransform::scale_offset(100.0, 100.0, 0.0, 0.0),
        );
        let engine = AnnotationEngine::new(shared(d), Box::new(table));

        let mut surface = RecordingSurface::new();
        engine
            .render_on_map(
                &mut surface,
                &local,
                &AnnotationRequest::new(right("res1", "div9"), "Right 42"),
            )
            .unwrap();

        let drawing: Vec<&DrawOp> = surface.drawing_ops().collect();
        assert_eq!(drawing.len(), 2, "unreprojectable endpoint skipped, no line");
        assert!(
            matches!(drawing[0], DrawOp::Symbol { center, .. } if center.coincident(Point::new(100.0, 200.0)))
        );
    }

    #[test]
    fn test_shape_without_crs_uses_request_fallback() {
        let local = Crs::new("LOCAL");
        let mut d = Dataset::new("basin");
        d.insert(
            GeoRecord::new("gage1", "Canyon Gage", StructureKind::StreamGage)
                .with_shape(Point::new(2.0, 2.0), None),
        );
        let mut table = TableReprojector::new();
        table.register(
            view_crs(),
            local.clone(),
            AffineTransform::scale_offset(10.0, 10.0, 0.0, 0.0),
        );
        let engine = AnnotationEngine::new(shared(d), Box::new(table));

        let mut surface = RecordingSurface::new();
        let request =
            AnnotationRequest::new(point_record("gage1"), "Foo").with_source_crs(view_crs());
        engine.render_on_map(&mut surface, &local, &request).unwrap();

        assert!(
            matches!(
                surface.drawing_ops().next().unwrap(),
                DrawOp::Symbol { center, .. } if center.coincident(Point::new(20.0, 20.0))
            ),
            "fallback CRS from the request must drive reprojection"
        );
    }
}
