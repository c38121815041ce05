// ─────────────────────────────────────────────────────────────────────
// SCPN Particle Source — Triangle Mesh
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Closed triangle mesh with a ray-parity point-in-solid test.

use crate::bbox::BoundingBox;
use crate::triangle::Triangle;
use source_types::error::{SourceError, SourceResult};
use source_types::state::{cross, dot, sub, Vec3};

/// Fixed, deliberately non-axis-aligned ray direction for parity counting.
/// Axis-aligned rays graze the diagonals of box-shaped STL faces.
const PARITY_RAY: Vec3 = [1.0, 0.318_309_886_183_790_7, 0.159_154_943_091_895_3];

/// Determinant below which a triangle counts as parallel to the ray.
const PARALLEL_EPS: f64 = 1e-14;

/// Simulation geometry as seen by particle sources.
///
/// Surface sources iterate the triangles once at construction and look them
/// up by index when sampling, so the order must stay fixed for the lifetime
/// of the source.
pub trait Geometry {
    fn triangles(&self) -> &[Triangle];

    fn in_solid(&self, p: Vec3) -> bool;

    /// Precomputed area of triangle `index`.
    fn triangle_area(&self, index: usize) -> f64 {
        self.triangles()[index].area()
    }
}

#[derive(Debug, Clone)]
pub struct TriangleMesh {
    triangles: Vec<Triangle>,
    areas: Vec<f64>,
    bbox: BoundingBox,
}

impl TriangleMesh {
    pub fn from_triangles(triangles: Vec<Triangle>) -> SourceResult<Self> {
        if triangles.is_empty() {
            return Err(SourceError::DegenerateGeometry(
                "triangle mesh is empty".to_string(),
            ));
        }
        if triangles
            .iter()
            .any(|t| t.vertices.iter().flatten().any(|c| !c.is_finite()))
        {
            return Err(SourceError::DegenerateGeometry(
                "triangle mesh contains non-finite vertex coordinates".to_string(),
            ));
        }
        let bbox = BoundingBox::from_points(triangles.iter().flat_map(|t| t.vertices.iter()));
        let areas = triangles.iter().map(Triangle::area).collect();
        Ok(TriangleMesh {
            triangles,
            areas,
            bbox,
        })
    }

    /// Closed, outward-wound box `[min, max]` made of 12 triangles.
    pub fn cuboid(min: Vec3, max: Vec3) -> SourceResult<Self> {
        if (0..3).any(|axis| !(min[axis] < max[axis])) {
            return Err(SourceError::PhysicsViolation(format!(
                "cuboid mesh needs min < max on every axis, got {min:?} / {max:?}"
            )));
        }
        let c = |i: usize, j: usize, k: usize| -> Vec3 {
            [
                if i == 0 { min[0] } else { max[0] },
                if j == 0 { min[1] } else { max[1] },
                if k == 0 { min[2] } else { max[2] },
            ]
        };
        let faces = [
            // -x, +x
            [c(0, 0, 0), c(0, 0, 1), c(0, 1, 1)],
            [c(0, 0, 0), c(0, 1, 1), c(0, 1, 0)],
            [c(1, 0, 0), c(1, 1, 0), c(1, 1, 1)],
            [c(1, 0, 0), c(1, 1, 1), c(1, 0, 1)],
            // -y, +y
            [c(0, 0, 0), c(1, 0, 0), c(1, 0, 1)],
            [c(0, 0, 0), c(1, 0, 1), c(0, 0, 1)],
            [c(0, 1, 0), c(0, 1, 1), c(1, 1, 1)],
            [c(0, 1, 0), c(1, 1, 1), c(1, 1, 0)],
            // -z, +z
            [c(0, 0, 0), c(0, 1, 0), c(1, 1, 0)],
            [c(0, 0, 0), c(1, 1, 0), c(1, 0, 0)],
            [c(0, 0, 1), c(1, 0, 1), c(1, 1, 1)],
            [c(0, 0, 1), c(1, 1, 1), c(0, 1, 1)],
        ];
        Self::from_triangles(
            faces
                .iter()
                .map(|[a, b, c]| Triangle::new(*a, *b, *c))
                .collect(),
        )
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.bbox
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn total_area(&self) -> f64 {
        self.areas.iter().sum()
    }

    /// Parity count of crossings along [`PARITY_RAY`] (Möller–Trumbore).
    pub fn in_solid(&self, p: Vec3) -> bool {
        if !self.bbox.contains(p) {
            return false;
        }
        let dir = PARITY_RAY;
        let mut inside = false;
        for tri in &self.triangles {
            let [a, b, c] = tri.vertices;
            let e1 = sub(b, a);
            let e2 = sub(c, a);
            let pvec = cross(dir, e2);
            let det = dot(e1, pvec);
            if det.abs() < PARALLEL_EPS {
                continue;
            }
            let inv_det = 1.0 / det;
            let tvec = sub(p, a);
            let u = dot(tvec, pvec) * inv_det;
            if !(0.0..=1.0).contains(&u) {
                continue;
            }
            let qvec = cross(tvec, e1);
            let v = dot(dir, qvec) * inv_det;
            if v < 0.0 || u + v > 1.0 {
                continue;
            }
            if dot(e2, qvec) * inv_det >= 0.0 {
                inside = !inside;
            }
        }
        inside
    }
}

impl Geometry for TriangleMesh {
    fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    fn in_solid(&self, p: Vec3) -> bool {
        TriangleMesh::in_solid(self, p)
    }

    fn triangle_area(&self, index: usize) -> f64 {
        self.areas[index]
    }
}
