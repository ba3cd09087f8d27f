//! Domain types: geometry, the shared dataset, and annotatable records

pub mod dataset;
pub mod geometry;
pub mod record;

pub use dataset::{Dataset, GeoRecord, GeoShape, SharedDataset, StructureKind, shared};
pub use geometry::{Crs, Point, Rect};
pub use record::{AnnotatableRecord, EndpointRole};
