// ─────────────────────────────────────────────────────────────────────
// SCPN Particle Source — Volume Shapes
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Uniform point generators for source volumes.
//!
//! Cuboids and cylindrical shells are sampled parametrically; STL solids by
//! rejection inside their bounding box.

use crate::distribution::Linear;
use rand::Rng;
use rand_distr::Distribution;
use source_geometry::{BoundingBox, TriangleMesh};
use source_types::config::SourceConfig;
use source_types::constants::DEG_TO_RAD;
use source_types::error::{SourceError, SourceResult};
use source_types::state::Vec3;
use std::f64::consts::PI;

/// Default cap on rejection-loop iterations; `0` in the config lifts it.
pub const DEFAULT_MAX_ATTEMPTS: u64 = 10_000_000;

/// Map `phi` into `[phimin, phimin + 2π)` so ranges may straddle ±180°.
pub(crate) fn wrap_azimuth(phi: f64, phimin: f64) -> f64 {
    phimin + (phi - phimin).rem_euclid(2.0 * PI)
}

fn check_range(label: &str, lo: f64, hi: f64) -> SourceResult<()> {
    if !(lo <= hi) {
        return Err(SourceError::PhysicsViolation(format!(
            "{label} range is inverted: {lo} > {hi}"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cuboid {
    bounds: BoundingBox,
}

impl Cuboid {
    pub fn new(min: Vec3, max: Vec3) -> SourceResult<Self> {
        for (axis, label) in ["x", "y", "z"].iter().enumerate() {
            check_range(label, min[axis], max[axis])?;
        }
        Ok(Cuboid {
            bounds: BoundingBox::new(min, max),
        })
    }

    /// `parameters = xmin xmax ymin ymax zmin zmax`
    pub fn from_config(config: &SourceConfig) -> SourceResult<Self> {
        let p = config.parameters(6)?;
        Self::new([p[0], p[2], p[4]], [p[1], p[3], p[5]])
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        self.bounds.lerp([rng.gen(), rng.gen(), rng.gen()])
    }
}

/// Annular cylinder sector in cylindrical coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct CylindricalVolume {
    pub rmin: f64,
    pub rmax: f64,
    /// Radians.
    pub phimin: f64,
    pub phimax: f64,
    pub zmin: f64,
    pub zmax: f64,
    radius: Linear,
}

impl CylindricalVolume {
    /// Angles in radians.
    pub fn new(rmin: f64, rmax: f64, phimin: f64, phimax: f64, zmin: f64, zmax: f64) -> SourceResult<Self> {
        check_range("phi", phimin, phimax)?;
        check_range("z", zmin, zmax)?;
        Ok(CylindricalVolume {
            rmin,
            rmax,
            phimin,
            phimax,
            zmin,
            zmax,
            radius: Linear::new(rmin, rmax)?,
        })
    }

    /// `parameters = rmin rmax phimin phimax zmin zmax`, angles in degrees.
    pub fn from_config(config: &SourceConfig) -> SourceResult<Self> {
        let p = config.parameters(6)?;
        Self::new(p[0], p[1], p[2] * DEG_TO_RAD, p[3] * DEG_TO_RAD, p[4], p[5])
    }

    /// Radius ∝ r (area element r dr dφ), azimuth and z uniform.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        let r = self.radius.sample(rng);
        let phi = self.phimin + rng.gen::<f64>() * (self.phimax - self.phimin);
        let z = self.zmin + rng.gen::<f64>() * (self.zmax - self.zmin);
        [r * phi.cos(), r * phi.sin(), z]
    }

    pub fn contains(&self, p: Vec3) -> bool {
        let r = p[0].hypot(p[1]);
        let in_phi = self.phimax - self.phimin >= 2.0 * PI
            || wrap_azimuth(p[1].atan2(p[0]), self.phimin) <= self.phimax;
        r >= self.rmin && r <= self.rmax && in_phi && p[2] >= self.zmin && p[2] <= self.zmax
    }

    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::new(
            [-self.rmax, -self.rmax, self.zmin],
            [self.rmax, self.rmax, self.zmax],
        )
    }
}

/// Solid read from an STL file, independent of the simulation geometry.
#[derive(Debug, Clone)]
pub struct StlVolume {
    mesh: TriangleMesh,
}

impl StlVolume {
    pub fn new(mesh: TriangleMesh) -> SourceResult<Self> {
        if mesh.bounding_box().volume() <= 0.0 {
            return Err(SourceError::DegenerateGeometry(
                "STL source volume has a flat bounding box".to_string(),
            ));
        }
        Ok(StlVolume { mesh })
    }

    pub fn mesh(&self) -> &TriangleMesh {
        &self.mesh
    }

    /// Draw in the bounding box until the point lies inside the solid.
    /// Returns the point and the number of draws it took.
    pub fn rejection_sample<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        max_attempts: u64,
    ) -> SourceResult<(Vec3, u64)> {
        let bbox = self.mesh.bounding_box();
        let mut attempts = 0u64;
        loop {
            attempts += 1;
            let p = bbox.lerp([rng.gen(), rng.gen(), rng.gen()]);
            if self.mesh.in_solid(p) {
                return Ok((p, attempts));
            }
            if max_attempts > 0 && attempts >= max_attempts {
                return Err(SourceError::SamplingExhausted {
                    attempts,
                    stage: "STL volume rejection sampling",
                });
            }
        }
    }
}

/// Closed set of volume shapes a source can draw positions from.
#[derive(Debug, Clone)]
pub enum VolumeShape {
    Cuboid(Cuboid),
    Cylindrical(CylindricalVolume),
    Stl(StlVolume),
}

impl VolumeShape {
    /// Uniformly distributed point inside the shape.
    pub fn sample_position<R: Rng + ?Sized>(&self, rng: &mut R, max_attempts: u64) -> SourceResult<Vec3> {
        match self {
            VolumeShape::Cuboid(c) => Ok(c.sample(rng)),
            VolumeShape::Cylindrical(c) => Ok(c.sample(rng)),
            VolumeShape::Stl(s) => s.rejection_sample(rng, max_attempts).map(|(p, _)| p),
        }
    }

    pub fn is_member(&self, p: Vec3) -> bool {
        match self {
            VolumeShape::Cuboid(c) => c.bounds.contains(p),
            VolumeShape::Cylindrical(c) => c.contains(p),
            VolumeShape::Stl(s) => s.mesh.in_solid(p),
        }
    }

    pub fn bounds(&self) -> BoundingBox {
        match self {
            VolumeShape::Cuboid(c) => c.bounds,
            VolumeShape::Cylindrical(c) => c.bounds(),
            VolumeShape::Stl(s) => s.mesh.bounding_box(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use source_geometry::{Geometry, Triangle};

    #[test]
    fn test_unit_cuboid_mean() {
        let shape = VolumeShape::Cuboid(Cuboid::new([0.0; 3], [1.0; 3]).unwrap());
        let mut rng = StdRng::seed_from_u64(2024);
        let n = 100_000;
        let mut sum = [0.0; 3];
        for _ in 0..n {
            let p = shape.sample_position(&mut rng, 0).unwrap();
            assert!(shape.is_member(p));
            for axis in 0..3 {
                sum[axis] += p[axis];
            }
        }
        for (axis, s) in sum.iter().enumerate() {
            let mean = s / n as f64;
            // σ/√n ≈ 0.0009; allow ~5σ.
            assert!((mean - 0.5).abs() < 5e-3, "axis {axis} mean = {mean}");
        }
    }

    #[test]
    fn test_cuboid_from_config() {
        let cfg = SourceConfig::new().with("parameters", "0 1 -2 2 5 6");
        let c = Cuboid::from_config(&cfg).unwrap();
        assert_eq!(c.bounds.min, [0.0, -2.0, 5.0]);
        assert_eq!(c.bounds.max, [1.0, 2.0, 6.0]);

        let inverted = SourceConfig::new().with("parameters", "1 0 0 1 0 1");
        assert!(matches!(
            Cuboid::from_config(&inverted),
            Err(SourceError::PhysicsViolation(_))
        ));
        let short = SourceConfig::new().with("parameters", "0 1 0 1");
        assert!(matches!(
            Cuboid::from_config(&short),
            Err(SourceError::ConfigError(_))
        ));
    }

    #[test]
    fn test_cylinder_radius_density_is_linear() {
        let cyl = CylindricalVolume::new(0.0, 2.0, 0.0, 2.0 * PI, -1.0, 1.0).unwrap();
        let mut rng = StdRng::seed_from_u64(31);
        let n = 200_000;
        let bins = 10;
        let mut hist = vec![0usize; bins];
        for _ in 0..n {
            let p = cyl.sample(&mut rng);
            assert!(cyl.contains(p));
            let r = p[0].hypot(p[1]);
            hist[((r / 2.0 * bins as f64) as usize).min(bins - 1)] += 1;
        }
        // Triangular density: bin k holds (2k + 1) / bins² of the mass.
        for (k, &count) in hist.iter().enumerate() {
            let expected = (2 * k + 1) as f64 / (bins * bins) as f64;
            let observed = count as f64 / n as f64;
            assert!(
                (observed - expected).abs() < 0.1 * expected + 2e-3,
                "bin {k}: observed {observed}, expected {expected}"
            );
        }
        assert!(hist[bins - 1] > 10 * hist[0]);
    }

    #[test]
    fn test_cylinder_sector_from_config() {
        let cfg = SourceConfig::new().with("parameters", "0.1 0.5 0 90 0 1");
        let cyl = CylindricalVolume::from_config(&cfg).unwrap();
        assert!((cyl.phimax - PI / 2.0).abs() < 1e-12);
        let mut rng = StdRng::seed_from_u64(8);
        for _ in 0..1_000 {
            let p = cyl.sample(&mut rng);
            assert!(p[0] >= -1e-12 && p[1] >= -1e-12);
            assert!(cyl.contains(p));
        }
        assert!(!cyl.contains([-0.3, 0.0, 0.5]));
        assert!(CylindricalVolume::new(0.5, 0.1, 0.0, 1.0, 0.0, 1.0).is_err());
    }

    #[test]
    fn test_wrapped_sector_contains() {
        // 270°..450° covers the right half-plane across the ±180° seam.
        let cyl = CylindricalVolume::new(0.0, 1.0, 1.5 * PI, 2.5 * PI, 0.0, 1.0).unwrap();
        assert!(cyl.contains([0.5, 0.1, 0.5]));
        assert!(cyl.contains([0.5, -0.1, 0.5]));
        assert!(!cyl.contains([-0.5, 0.1, 0.5]));
    }

    fn two_box_mesh() -> TriangleMesh {
        let mut tris = TriangleMesh::cuboid([0.0; 3], [1.0; 3])
            .unwrap()
            .triangles()
            .to_vec();
        tris.extend_from_slice(
            TriangleMesh::cuboid([2.0, 0.0, 0.0], [3.0, 1.0, 1.0])
                .unwrap()
                .triangles(),
        );
        TriangleMesh::from_triangles(tris).unwrap()
    }

    #[test]
    fn test_stl_rejection_acceptance_rate() {
        let vol = StlVolume::new(two_box_mesh()).unwrap();
        let mut rng = StdRng::seed_from_u64(4);
        let n = 20_000;
        let mut draws = 0u64;
        for _ in 0..n {
            let (p, attempts) = vol.rejection_sample(&mut rng, 0).unwrap();
            assert!(vol.mesh().in_solid(p));
            assert!(!(p[0] > 1.0 && p[0] < 2.0), "point in the gap: {p:?}");
            draws += attempts;
        }
        // Solid volume 2 inside a bounding box of volume 3.
        let rate = n as f64 / draws as f64;
        assert!((rate - 2.0 / 3.0).abs() < 0.015, "acceptance rate = {rate}");
    }

    #[test]
    fn test_stl_rejection_budget() {
        // Open surface: about half the draws miss, so a one-draw budget must fail.
        let tris = vec![
            Triangle::new([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            Triangle::new([0.0, 0.0, 1.0], [1.0, 1.0, 1.0], [1.0, 0.0, 1.0]),
        ];
        let vol = StlVolume::new(TriangleMesh::from_triangles(tris).unwrap()).unwrap();
        let mut rng = StdRng::seed_from_u64(6);
        let result = (0..50).find_map(|_| vol.rejection_sample(&mut rng, 1).err());
        assert!(matches!(
            result,
            Some(SourceError::SamplingExhausted { attempts: 1, .. })
        ));
    }
}
