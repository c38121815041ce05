// ─────────────────────────────────────────────────────────────────────
// SCPN Particle Source — Property-Based Tests (proptest) for source-core
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Property-based and scenario tests for particle sources.
//!
//! Covers: cuboid bounds, cylindrical surface area selection, STL-backed
//! volume and surface sources loaded from configuration files.

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use source_core::field::NoField;
use source_core::selector::AreaSelector;
use source_core::source::SurfaceRegion;
use source_core::{create_particle_source, ParticleSource, SourceKind};
use source_geometry::stl::to_ascii_stl;
use source_geometry::{Geometry, Triangle, TriangleMesh};
use source_types::config::SourceConfig;
use source_types::error::SourceError;

fn neutron_config() -> SourceConfig {
    SourceConfig::new()
        .with("particle", "neutron")
        .with("ActiveTime", "1")
        .with("spectrum", "0 1 1e-7 1")
}

/// Open cylinder wall of radius 1, z in [-1, 1]; vertices sit at
/// `offset_deg + k * 360 / segments` degrees.
fn cylinder_wall(segments: usize, offset_deg: f64) -> TriangleMesh {
    let node = |k: usize, z: f64| {
        let phi = (offset_deg + 360.0 * k as f64 / segments as f64).to_radians();
        [phi.cos(), phi.sin(), z]
    };
    let tris = (0..segments)
        .flat_map(|k| {
            let (a, b) = (node(k, -1.0), node(k + 1, -1.0));
            let (c, d) = (node(k + 1, 1.0), node(k, 1.0));
            [Triangle::new(a, b, c), Triangle::new(a, c, d)]
        })
        .collect();
    TriangleMesh::from_triangles(tris).unwrap()
}

// ── Cuboid Volume Source ─────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Every sampled start point lies inside the configured box.
    #[test]
    fn cuboid_samples_stay_in_box(
        lo in [-10.0f64..10.0, -10.0f64..10.0, -10.0f64..10.0],
        size in [0.0f64..5.0, 0.0f64..5.0, 0.0f64..5.0],
        seed in any::<u64>(),
    ) {
        let params = format!(
            "{} {} {} {} {} {}",
            lo[0], lo[0] + size[0], lo[1], lo[1] + size[1], lo[2], lo[2] + size[2]
        );
        let cfg = neutron_config().with("parameters", params);
        let geometry = TriangleMesh::cuboid([0.0; 3], [1.0; 3]).unwrap();
        let mut source = create_particle_source("boxvolume", &cfg, &geometry).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        for _ in 0..200 {
            let p = source.create_particle(&mut rng, &geometry, &NoField).unwrap();
            for axis in 0..3 {
                let x = p.state.position[axis];
                prop_assert!(x >= lo[axis] - 1e-9 && x <= lo[axis] + size[axis] + 1e-9);
            }
            prop_assert!((0.0..=1.0).contains(&p.state.time));
        }
        prop_assert_eq!(source.particle_count(), 200);
    }
}

#[test]
fn cuboid_marginal_means_converge() {
    let cfg = neutron_config().with("parameters", "0 1 0 1 0 1");
    let geometry = TriangleMesh::cuboid([0.0; 3], [1.0; 3]).unwrap();
    let mut source = create_particle_source("CuboidVolumeSource", &cfg, &geometry).unwrap();
    let mut rng = StdRng::seed_from_u64(100);
    let n = 100_000;
    let mut sum = [0.0; 3];
    for _ in 0..n {
        let p = source.create_particle(&mut rng, &geometry, &NoField).unwrap();
        for axis in 0..3 {
            sum[axis] += p.state.position[axis];
        }
    }
    for s in sum {
        assert!((s / n as f64 - 0.5).abs() < 5e-3);
    }
    assert_eq!(source.particle_count(), n);
}

// ── Surface Area Selection ───────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// The cumulative area never decreases and ends at the summed area of
    /// exactly the accepted triangles.
    #[test]
    fn area_sum_matches_accepted_triangles(
        phimin in 0.0f64..180.0,
        width in 0.0f64..360.0,
        zlo in -1.5f64..0.0,
        zhi in 0.0f64..1.5,
    ) {
        let mesh = cylinder_wall(72, 0.25);
        let params = format!("0.5 1.5 {} {} {} {}", phimin, phimin + width, zlo, zhi);
        let region = SurfaceRegion::cylindrical_from_config(
            &SourceConfig::new().with("parameters", params),
        ).unwrap();
        let selector = AreaSelector::build(&mesh, |t| region.accepts(t));
        let sums = selector.area_sum();
        prop_assert_eq!(sums.len(), mesh.triangles().len());
        prop_assert!(sums.windows(2).all(|w| w[0] <= w[1]));
        let expected: f64 = mesh
            .triangles()
            .iter()
            .filter(|t| region.accepts(t))
            .map(Triangle::area)
            .sum();
        prop_assert!((selector.total_area() - expected).abs() < 1e-9);
    }
}

#[test]
fn quarter_cylinder_selects_quarter_of_area() {
    let mesh = cylinder_wall(360, 0.5);
    let cfg = neutron_config().with("parameters", "0.5 1.5 0 90 -2 2");
    let source = create_particle_source("cylsurface", &cfg, &mesh).unwrap();
    let fraction = source.surface_area().unwrap() / mesh.total_area();
    assert!((fraction - 0.25).abs() < 0.01, "eligible fraction = {fraction}");
}

#[test]
fn surface_samples_land_on_eligible_triangles() {
    let mesh = cylinder_wall(36, 5.0);
    let cfg = neutron_config().with("parameters", "0.5 1.5 0 90 -2 2");
    let mut source = create_particle_source("cylsurface", &cfg, &mesh).unwrap();
    let mut rng = StdRng::seed_from_u64(101);
    for _ in 0..5_000 {
        let p = source.create_particle(&mut rng, &mesh, &NoField).unwrap();
        let [x, y, z] = p.state.position;
        assert!(x > 0.0 && y > 0.0, "start point outside 0..90 deg: {x} {y}");
        assert!(z.abs() <= 1.0 + 1e-12);
    }
}

// ── STL-Backed Sources ───────────────────────────────────────────────

fn write_box_stl(dir: &std::path::Path, name: &str, min: [f64; 3], max: [f64; 3]) {
    let mesh = TriangleMesh::cuboid(min, max).unwrap();
    std::fs::write(dir.join(name), to_ascii_stl(name, mesh.triangles())).unwrap();
}

#[test]
fn stl_volume_source_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    write_box_stl(dir.path(), "box.stl", [0.0, 0.0, 0.0], [2.0, 1.0, 0.5]);
    let cfg_path = dir.path().join("source.json");
    std::fs::write(
        &cfg_path,
        r#"{
            "sourcemode": "STLvolume",
            "STLfile": "box.stl",
            "particle": "mercury",
            "ActiveTime": 5,
            "polarization": 1,
            "spectrum": [0, 1, 1e-7, 1],
            "phi_v": [0, 1, 360, 1]
        }"#,
    )
    .unwrap();
    let cfg = SourceConfig::from_file(&cfg_path).unwrap();
    let geometry = TriangleMesh::cuboid([-5.0; 3], [5.0; 3]).unwrap();
    let mut source = ParticleSource::from_config(&cfg, &geometry).unwrap();
    assert!(matches!(source.source_kind(), SourceKind::Volume(_)));

    let mut rng = StdRng::seed_from_u64(102);
    for _ in 0..2_000 {
        let p = source.create_particle(&mut rng, &geometry, &NoField).unwrap();
        let [x, y, z] = p.state.position;
        assert!((0.0..=2.0).contains(&x));
        assert!((0.0..=1.0).contains(&y));
        assert!((0.0..=0.5).contains(&z));
        assert_eq!(p.state.polarisation, 1.0);
    }
}

#[test]
fn stl_surface_source_selects_enclosed_face() {
    // Auxiliary solid encloses only the z = 0 face of the unit cube.
    let dir = tempfile::tempdir().unwrap();
    write_box_stl(dir.path(), "floor.stl", [-0.5, -0.5, -0.5], [1.5, 1.5, 0.5]);
    let cfg = neutron_config()
        .with("STLfile", "floor.stl")
        .with("Enormal", "1e-8")
        .with_base_dir(dir.path());
    let geometry = TriangleMesh::cuboid([0.0; 3], [1.0; 3]).unwrap();
    let mut source = create_particle_source("STLSurfaceSource", &cfg, &geometry).unwrap();
    assert!((source.surface_area().unwrap() - 1.0).abs() < 1e-12);

    let mut rng = StdRng::seed_from_u64(103);
    for _ in 0..1_000 {
        let p = source.create_particle(&mut rng, &geometry, &NoField).unwrap();
        assert!(p.state.position[2].abs() < 1e-12);
        // Boost along the outward (-z) normal of the floor.
        assert!(p.velocity[2] < 0.0, "velocity {:?}", p.velocity);
        assert!(p.state.energy >= 1e-8 && p.state.energy <= 1e-7 + 1e-8 + 1e-20);
    }
}

#[test]
fn stl_file_resolves_against_config_dir() {
    let dir = tempfile::tempdir().unwrap();
    write_box_stl(dir.path(), "box.stl", [0.0; 3], [1.0; 3]);
    let geometry = TriangleMesh::cuboid([0.0; 3], [1.0; 3]).unwrap();
    // Without the base directory the relative name does not resolve.
    let cfg = neutron_config().with("STLfile", "box.stl");
    assert!(matches!(
        create_particle_source("stlvolume", &cfg, &geometry),
        Err(SourceError::ConfigError(_))
    ));
    let cfg = cfg.with_base_dir(dir.path());
    assert!(create_particle_source("stlvolume", &cfg, &geometry).is_ok());
}

#[test]
fn bounded_stl_sampling_reports_exhaustion() {
    // Open, non-solid STL: the rejection loop finds no interior with a one-draw budget.
    let dir = tempfile::tempdir().unwrap();
    let tris = vec![
        Triangle::new([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        Triangle::new([0.0, 0.0, 1.0], [1.0, 1.0, 1.0], [1.0, 0.0, 1.0]),
    ];
    std::fs::write(dir.path().join("open.stl"), to_ascii_stl("open", &tris)).unwrap();
    let cfg = neutron_config()
        .with("STLfile", "open.stl")
        .with("MaxSamplingAttempts", "1")
        .with_base_dir(dir.path());
    let geometry = TriangleMesh::cuboid([0.0; 3], [1.0; 3]).unwrap();
    let mut source = create_particle_source("stlvolume", &cfg, &geometry).unwrap();
    let mut rng = StdRng::seed_from_u64(104);
    let err = (0..50).find_map(|_| source.create_particle(&mut rng, &geometry, &NoField).err());
    assert!(matches!(
        err,
        Some(SourceError::SamplingExhausted { attempts: 1, .. })
    ));
}

#[test]
fn unknown_source_type_is_config_error() {
    let cfg = neutron_config().with("sourcemode", "pencilbeam");
    let geometry = TriangleMesh::cuboid([0.0; 3], [1.0; 3]).unwrap();
    assert!(matches!(
        ParticleSource::from_config(&cfg, &geometry),
        Err(SourceError::ConfigError(_))
    ));
}
