//! Single mesh triangle.

use source_types::state::{add, cross, dot, norm, scale, sub, Vec3};
use std::ops::Index;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub vertices: [Vec3; 3],
}

impl Triangle {
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Triangle {
            vertices: [a, b, c],
        }
    }

    /// Twice-area cross product (b - a) × (c - a); direction follows winding.
    fn edge_cross(&self) -> Vec3 {
        let [a, b, c] = self.vertices;
        cross(sub(b, a), sub(c, a))
    }

    pub fn squared_area(&self) -> f64 {
        let n = self.edge_cross();
        0.25 * dot(n, n)
    }

    pub fn area(&self) -> f64 {
        self.squared_area().sqrt()
    }

    /// Unit normal from the vertex winding; zero for degenerate triangles.
    pub fn normal(&self) -> Vec3 {
        let n = self.edge_cross();
        let len = norm(n);
        if len > 0.0 {
            scale(n, 1.0 / len)
        } else {
            [0.0; 3]
        }
    }

    /// Point `v0 + a (v1 - v0) + b (v2 - v0)`; inside the triangle for
    /// `a, b >= 0` and `a + b <= 1`.
    pub fn point_at(&self, a: f64, b: f64) -> Vec3 {
        let [v0, v1, v2] = self.vertices;
        add(v0, add(scale(sub(v1, v0), a), scale(sub(v2, v0), b)))
    }

    pub fn centroid(&self) -> Vec3 {
        self.point_at(1.0 / 3.0, 1.0 / 3.0)
    }
}

impl Index<usize> for Triangle {
    type Output = Vec3;

    fn index(&self, i: usize) -> &Vec3 {
        &self.vertices[i]
    }
}
