//! Network-diagram annotation pass
//!
//! Endpoints resolve to network nodes by identifier; connecting geometry
//! follows the graph's topological node sequence through every
//! intermediate node. Label placement honors each node's layout hint, with
//! co-located endpoint labels flipped apart.

use crate::domain::geometry::{Crs, Rect};
use crate::domain::record::{AnnotatableRecord, EndpointRole};
use crate::network::{LabelPosition, NetworkGraph};
use crate::render::surface::{DrawingSurface, TextAnchor};

use super::{Anchor, AnnotationEngine, AnnotationRequest, RenderPlan, endpoint_label};

/// Coordinate reference of the diagram's paper space
pub const DIAGRAM_CRS: &str = "diagram";

/// One endpoint resolved to a network node
struct ResolvedNode {
    anchor: Anchor,
    node_id: String,
    symbol_size: f64,
    role: Option<EndpointRole>,
}

pub(super) fn render(
    engine: &AnnotationEngine,
    surface: &mut dyn DrawingSurface,
    graph: &NetworkGraph,
    request: &AnnotationRequest,
) -> Option<Rect> {
    let dataset = engine.dataset().borrow();
    let display_name =
        |id: &str| -> String { dataset.lookup(id).map_or(id, |r| r.name.as_str()).to_owned() };

    let mut resolved: Vec<ResolvedNode> = Vec::new();
    match &request.record {
        AnnotatableRecord::Point { id, .. } => {
            push_endpoint(graph, &mut resolved, id, request.label.clone(), None);
        }
        record => {
            for (role, id) in record.endpoints() {
                let label = endpoint_label(&request.label, role, id, &display_name(id));
                push_endpoint(graph, &mut resolved, id, label, Some(role));
            }
        }
    }
    drop(dataset);

    let mut plan = RenderPlan::default();

    // Connecting paths through the topology, one per source/upstream
    // endpoint paired with the primary endpoint.
    if let Some(primary) = resolved
        .iter()
        .find(|r| r.role.is_some_and(EndpointRole::is_primary))
    {
        for r in &resolved {
            let is_source = r.role.is_some_and(|role| !role.is_primary());
            if !is_source || r.node_id == primary.node_id {
                continue;
            }
            let sequence = graph.node_sequence(&r.node_id, &primary.node_id);
            if sequence.len() < 2 {
                // Unconnected endpoints annotate without a path
                log::debug!(
                    "no network path between {} and {}",
                    r.node_id,
                    primary.node_id
                );
                continue;
            }
            plan.polylines
                .push(sequence.iter().map(|n| n.position).collect());
        }
    }

    for r in &resolved {
        plan.symbols.push((r.anchor.position, r.symbol_size));
        plan.texts
            .push((r.anchor.position, r.anchor.label.clone(), r.anchor.placement));
    }

    // Intervening structures along an operational right's water path get a
    // symbol only: no label, no connecting line.
    for id in request.record.intervening() {
        if let Some(node) = graph.find_node(id) {
            plan.symbols.push((node.position, node.symbol_size));
        }
    }

    plan.emit(surface, engine.style(), request.bounding_hint)
}

/// Resolve one endpoint id to a network node anchor
///
/// Placement comes from the node's layout hint; a later endpoint landing
/// on an already-used node flips to the opposite side so co-located labels
/// do not overlap.
fn push_endpoint(
    graph: &NetworkGraph,
    resolved: &mut Vec<ResolvedNode>,
    id: &str,
    label: String,
    role: Option<EndpointRole>,
) {
    let Some(node) = graph.find_node(id) else {
        return;
    };
    let placement = match resolved.iter().rev().find(|r| r.node_id == node.id) {
        Some(prior) => prior.anchor.placement.flipped(),
        None => placement_hint(node.label_position),
    };
    resolved.push(ResolvedNode {
        anchor: Anchor {
            position: node.position,
            crs: Crs::new(DIAGRAM_CRS),
            label,
            placement,
        },
        node_id: node.id.clone(),
        symbol_size: node.symbol_size,
        role,
    });
}

fn placement_hint(hint: LabelPosition) -> TextAnchor {
    match hint {
        LabelPosition::Auto | LabelPosition::Above => TextAnchor::Above,
        LabelPosition::Below => TextAnchor::Below,
    }
}
