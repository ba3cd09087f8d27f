//! Core state management for a hydrology dataset editor
//!
//! Two cooperating components: the window lifecycle registry
//! ([`registry::WindowRegistry`]), which enforces one live window per
//! category over a shared mutable dataset, and the annotation projection
//! engine ([`annotate::AnnotationEngine`]), which turns a selected record
//! into drawable geometry on the geographic map view or the schematic
//! network diagram. The widget toolkit, text rendering, and file-format
//! parsers stay behind the trait seams in [`render`] and [`registry`].

pub mod annotate;
pub mod config;
pub mod domain;
pub mod network;
pub mod registry;
pub mod render;

pub use annotate::{Anchor, AnnotationEngine, AnnotationRequest, AnnotationStyle};
pub use config::BasinViewConfig;
pub use domain::{AnnotatableRecord, Crs, Dataset, EndpointRole, Point, Rect, SharedDataset};
pub use network::{NetworkGraph, NetworkNode};
pub use registry::{WindowFactory, WindowHandle, WindowKind, WindowRegistry};
pub use render::{DrawingSurface, RecordingSurface, Reprojector};
