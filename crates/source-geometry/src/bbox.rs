//! Axis-aligned bounding box.

use source_types::state::Vec3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    /// Inverted box that any `extend` call overwrites.
    pub fn empty() -> Self {
        BoundingBox {
            min: [f64::INFINITY; 3],
            max: [f64::NEG_INFINITY; 3],
        }
    }

    pub fn new(min: Vec3, max: Vec3) -> Self {
        BoundingBox { min, max }
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vec3>) -> Self {
        let mut bbox = Self::empty();
        for p in points {
            bbox.extend(*p);
        }
        bbox
    }

    pub fn extend(&mut self, p: Vec3) {
        for axis in 0..3 {
            self.min[axis] = self.min[axis].min(p[axis]);
            self.max[axis] = self.max[axis].max(p[axis]);
        }
    }

    pub fn is_empty(&self) -> bool {
        (0..3).any(|axis| self.min[axis] > self.max[axis])
    }

    pub fn extent(&self, axis: usize) -> f64 {
        self.max[axis] - self.min[axis]
    }

    pub fn volume(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.extent(0) * self.extent(1) * self.extent(2)
    }

    /// Inclusive containment.
    pub fn contains(&self, p: Vec3) -> bool {
        (0..3).all(|axis| p[axis] >= self.min[axis] && p[axis] <= self.max[axis])
    }

    /// Point at fractional coordinates `u ∈ [0, 1]³` inside the box.
    pub fn lerp(&self, u: Vec3) -> Vec3 {
        [
            self.min[0] + u[0] * self.extent(0),
            self.min[1] + u[1] * self.extent(1),
            self.min[2] + u[2] * self.extent(2),
        ]
    }
}
