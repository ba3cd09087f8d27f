//! Rendering seams: the drawing surface trait and coordinate reprojection

pub mod projection;
pub mod surface;

pub use projection::{AffineTransform, IdentityReprojector, Reprojector, TableReprojector};
pub use surface::{DrawOp, DrawingSurface, RecordingSurface, TextAnchor};
