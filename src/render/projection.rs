//! Coordinate reprojection seam
//!
//! Record shapes carry their native CRS; the map view displays in its own.
//! The engine asks a `Reprojector` to bridge the two. A failed lookup is a
//! recoverable condition: the engine skips that endpoint and keeps going.

use anyhow::anyhow;
use std::collections::HashMap;

use crate::domain::geometry::{Crs, Point};

/// Transforms positions between coordinate reference systems
pub trait Reprojector {
    /// Whether a transform is required between two references
    fn needs_reprojection(&self, from: &Crs, to: &Crs) -> bool {
        from != to
    }

    /// Transform a point from one reference to another
    fn reproject(&self, point: Point, from: &Crs, to: &Crs) -> anyhow::Result<Point>;
}

/// Reprojector for datasets already in the view's reference
///
/// Passes same-CRS points through and reports any genuine mismatch as an
/// error (there is no transform to apply).
#[derive(Debug, Default)]
pub struct IdentityReprojector;

impl Reprojector for IdentityReprojector {
    fn reproject(&self, point: Point, from: &Crs, to: &Crs) -> anyhow::Result<Point> {
        if from == to {
            Ok(point)
        } else {
            Err(anyhow!("no transform available from {from} to {to}"))
        }
    }
}

/// Affine plane transform: x' = a*x + b*y + tx, y' = c*x + d*y + ty
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AffineTransform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub tx: f64,
    pub ty: f64,
}

impl AffineTransform {
    /// Pure scale-and-offset transform
    pub fn scale_offset(scale_x: f64, scale_y: f64, tx: f64, ty: f64) -> Self {
        Self {
            a: scale_x,
            b: 0.0,
            c: 0.0,
            d: scale_y,
            tx,
            ty,
        }
    }

    /// Apply the transform to a point
    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.b * p.y + self.tx,
            self.c * p.x + self.d * p.y + self.ty,
        )
    }
}

/// Reprojector backed by a table of registered CRS-pair transforms
#[derive(Debug, Default)]
pub struct TableReprojector {
    transforms: HashMap<(Crs, Crs), AffineTransform>,
}

impl TableReprojector {
    /// Create an empty transform table
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a transform for a (from, to) CRS pair
    pub fn register(&mut self, from: Crs, to: Crs, transform: AffineTransform) {
        self.transforms.insert((from, to), transform);
    }
}

impl Reprojector for TableReprojector {
    fn reproject(&self, point: Point, from: &Crs, to: &Crs) -> anyhow::Result<Point> {
        if from == to {
            return Ok(point);
        }
        let transform = self
            .transforms
            .get(&(from.clone(), to.clone()))
            .ok_or_else(|| anyhow!("no registered transform from {from} to {to}"))?;
        Ok(transform.apply(point))
    }
}
