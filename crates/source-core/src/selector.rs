//! Area-weighted triangle selection over a subset of a mesh.

use rand::Rng;
use source_geometry::{Geometry, Triangle};
use source_types::error::{SourceError, SourceResult};
use source_types::state::Vec3;

/// Prefix sums of eligible triangle areas, one entry per geometry triangle.
///
/// Excluded triangles repeat the previous cumulative value, so they occupy
/// zero width and can never be drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaSelector {
    area_sum: Vec<f64>,
}

impl AreaSelector {
    /// Walk every triangle once, accumulating the area of those accepted by
    /// `is_member`.
    pub fn build<G, F>(geometry: &G, mut is_member: F) -> Self
    where
        G: Geometry + ?Sized,
        F: FnMut(&Triangle) -> bool,
    {
        let mut acc = 0.0;
        let area_sum = geometry
            .triangles()
            .iter()
            .enumerate()
            .map(|(i, tri)| {
                if is_member(tri) {
                    acc += geometry.triangle_area(i);
                }
                acc
            })
            .collect();
        AreaSelector { area_sum }
    }

    pub fn area_sum(&self) -> &[f64] {
        &self.area_sum
    }

    pub fn total_area(&self) -> f64 {
        self.area_sum.last().copied().unwrap_or(0.0)
    }

    pub fn is_usable(&self) -> bool {
        self.total_area() > 0.0
    }

    /// Index of the triangle owning cumulative position `target ∈ (0, total]`
    /// (first entry >= target).
    pub fn locate(&self, target: f64) -> usize {
        self.area_sum
            .partition_point(|&s| s < target)
            .min(self.area_sum.len().saturating_sub(1))
    }

    /// Draw a triangle index with probability proportional to its eligible area.
    pub fn select<R: Rng + ?Sized>(&self, rng: &mut R) -> SourceResult<usize> {
        let total = self.total_area();
        if total <= 0.0 {
            return Err(SourceError::DegenerateGeometry(
                "surface source has zero eligible area".to_string(),
            ));
        }
        // (0, total] keeps zero-width leading entries out of reach.
        let u: f64 = rng.gen();
        Ok(self.locate(total * (1.0 - u)))
    }

    /// Select a triangle and return `(index, uniformly distributed point on it)`.
    pub fn sample_point<G, R>(&self, geometry: &G, rng: &mut R) -> SourceResult<(usize, Vec3)>
    where
        G: Geometry + ?Sized,
        R: Rng + ?Sized,
    {
        let index = self.select(rng)?;
        let tri = geometry.triangles().get(index).ok_or_else(|| {
            SourceError::DegenerateGeometry(format!(
                "geometry changed after source construction: triangle {index} missing"
            ))
        })?;
        Ok((index, uniform_point_on_triangle(tri, rng)))
    }
}

/// Uniform-by-area point: reflect `(a, b)` back into the unit simplex.
pub fn uniform_point_on_triangle<R: Rng + ?Sized>(tri: &Triangle, rng: &mut R) -> Vec3 {
    let mut a: f64 = rng.gen();
    let mut b: f64 = rng.gen();
    if a + b > 1.0 {
        a = 1.0 - a;
        b = 1.0 - b;
    }
    tri.point_at(a, b)
}
