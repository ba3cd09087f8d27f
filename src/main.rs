//! Headless demonstration harness
//!
//! Stands in for the toolkit layer during development: builds (or loads) a
//! dataset, opens windows through the registry, and dumps the draw calls
//! an annotation produces on both views.

use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;

use basinview::annotate::{AnnotationEngine, AnnotationRequest, AnnotationStyle};
use basinview::config::BasinViewConfig;
use basinview::domain::dataset::{Dataset, GeoRecord, SharedDataset, StructureKind, shared};
use basinview::domain::geometry::{Crs, Point};
use basinview::domain::record::AnnotatableRecord;
use basinview::network::{LabelPosition, NetworkGraph, NetworkNode};
use basinview::registry::{WindowFactory, WindowHandle, WindowKind, WindowRegistry};
use basinview::render::projection::IdentityReprojector;
use basinview::render::surface::RecordingSurface;

/// Window stand-in that logs its lifecycle
struct LoggingWindow {
    kind: WindowKind,
    dataset: SharedDataset,
    visible: Cell<bool>,
}

impl WindowHandle for LoggingWindow {
    fn kind(&self) -> WindowKind {
        self.kind
    }

    fn bring_to_front(&self) {
        log::debug!(
            "[{}] to front (visible: {})",
            self.kind.label(),
            self.visible.get()
        );
    }

    fn set_visible(&self, visible: bool) {
        self.visible.set(visible);
    }

    fn dispose(&self) {
        log::debug!("[{}] disposed", self.kind.label());
    }

    fn refresh_display_state(&self) {
        log::info!("[{}] title -> {}", self.kind.label(), self.dataset.borrow().title());
    }
}

struct LoggingFactory;

impl WindowFactory for LoggingFactory {
    fn create(&self, kind: WindowKind, dataset: SharedDataset) -> Rc<dyn WindowHandle> {
        Rc::new(LoggingWindow {
            kind,
            dataset,
            visible: Cell::new(true),
        })
    }
}

/// Build the sample Gunnison-style demo dataset
fn sample_dataset(crs: &Crs) -> Dataset {
    let mut dataset = Dataset::new("demo basin");
    dataset.insert(
        GeoRecord::new("res1", "Blue Mesa Reservoir", StructureKind::Reservoir)
            .with_shape(Point::new(-107.34, 38.45), Some(crs.clone())),
    );
    dataset.insert(
        GeoRecord::new("gage1", "Canyon Gage", StructureKind::StreamGage)
            .with_shape(Point::new(-107.10, 38.52), Some(crs.clone())),
    );
    dataset.insert(
        GeoRecord::new("div9", "Town Ditch", StructureKind::Diversion)
            .with_shape(Point::new(-106.85, 38.60), Some(crs.clone())),
    );
    dataset
}

/// Build the matching schematic network: res1 -> gage1 -> div9
fn sample_network() -> anyhow::Result<NetworkGraph> {
    let mut graph = NetworkGraph::new();
    graph.add_node(NetworkNode::new("res1", Point::new(0.0, 0.0)))?;
    graph.add_node(NetworkNode::new("gage1", Point::new(40.0, 10.0)))?;
    graph.add_node(
        NetworkNode::new("div9", Point::new(80.0, 0.0)).with_label_position(LabelPosition::Below),
    )?;
    graph.set_downstream("res1", "gage1")?;
    graph.set_downstream("gage1", "div9")?;
    Ok(graph)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = BasinViewConfig::load();
    let view_crs = Crs::new(config.map_crs.clone());

    let dataset = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => shared(Dataset::load(&path)?),
        None => shared(sample_dataset(&view_crs)),
    };
    let graph = sample_network()?;

    let mut registry = WindowRegistry::new(Box::new(LoggingFactory), Rc::clone(&dataset));
    registry.open(WindowKind::Main);
    registry.open(WindowKind::OperationalRight);
    registry.open(WindowKind::Map);
    registry.open(WindowKind::Network);
    registry.notify_status_changed(WindowKind::Main);

    let engine = AnnotationEngine::new(registry.dataset(), Box::new(IdentityReprojector))
        .with_style(AnnotationStyle::from(&config));

    // The selection an operational-right editor would hand to the engine
    let record = AnnotatableRecord::OperationalRight {
        id: "op1".into(),
        name: "Blue Mesa exchange".into(),
        source1: Some("res1".into()),
        source2: None,
        destination: Some("div9".into()),
        intervening: vec!["gage1".into()],
    };
    let request = AnnotationRequest::new(record, "Right 42");

    let mut map_surface = RecordingSurface::new();
    if let Some(extent) = engine.render_on_map(&mut map_surface, &view_crs, &request) {
        log::info!(
            "map annotation extent: ({:.2}, {:.2}) - ({:.2}, {:.2})",
            extent.left,
            extent.top,
            extent.right,
            extent.bottom
        );
    }
    println!("map view draw calls:");
    for op in map_surface.ops() {
        println!("  {op:?}");
    }

    let mut net_surface = RecordingSurface::new();
    engine.render_on_network(&mut net_surface, &graph, &request);
    println!("network view draw calls:");
    for op in net_surface.ops() {
        println!("  {op:?}");
    }

    registry.close_all();
    registry.close(WindowKind::Main);
    Ok(())
}
