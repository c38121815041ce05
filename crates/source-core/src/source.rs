// ─────────────────────────────────────────────────────────────────────
// SCPN Particle Source — Particle Sources
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Volume and surface particle sources.
//!
//! Every source owns its kinematic distributions, polarisation and creation
//! counter. A closed [`SourceKind`] decides where start positions come from:
//! a [`VolumeShape`] (optionally filtered by phase-space weighting) or the
//! subset of simulation-geometry triangles accepted by a [`SurfaceRegion`].

use crate::distribution::Kinematics;
use crate::field::PotentialField;
use crate::particle::{InitialState, Particle, ParticleKind};
use crate::selector::AreaSelector;
use crate::volume::{wrap_azimuth, VolumeShape, DEFAULT_MAX_ATTEMPTS};
use crate::weighting::{PhaseSpaceWeighting, DEFAULT_MIN_POTENTIAL_SAMPLES};
use rand::Rng;
use rand_distr::Distribution;
use source_geometry::{Geometry, Triangle, TriangleMesh};
use source_types::config::SourceConfig;
use source_types::constants::DEG_TO_RAD;
use source_types::error::{SourceError, SourceResult};
use source_types::state::{add, direction, dot, scale, sub, to_spherical, Vec3};
use std::f64::consts::PI;

/// Position part of a volume source.
#[derive(Debug, Clone)]
pub struct VolumeSource {
    pub shape: VolumeShape,
    /// `Some` when `PhaseSpaceWeighting` is enabled.
    pub weighting: Option<PhaseSpaceWeighting>,
}

impl VolumeSource {
    pub fn new(shape: VolumeShape, weighting: Option<PhaseSpaceWeighting>) -> Self {
        VolumeSource { shape, weighting }
    }

    /// Reads `PhaseSpaceWeighting` and `MinPotentialSamples`.
    pub fn from_config(shape: VolumeShape, config: &SourceConfig) -> SourceResult<Self> {
        let weighting = if config.bool_or("PhaseSpaceWeighting", false)? {
            let samples = config.u64_or("MinPotentialSamples", DEFAULT_MIN_POTENTIAL_SAMPLES)?;
            Some(PhaseSpaceWeighting::new(samples))
        } else {
            None
        };
        Ok(Self::new(shape, weighting))
    }

    /// Start position and kinetic energy. Without weighting the first
    /// candidate is taken and `kinetic_energy` passes through unchanged.
    fn sample<F, R>(
        &mut self,
        field: &F,
        t: f64,
        kinetic_energy: f64,
        rng: &mut R,
        max_attempts: u64,
    ) -> SourceResult<(Vec3, f64)>
    where
        F: PotentialField + ?Sized,
        R: Rng + ?Sized,
    {
        match self.weighting.as_mut() {
            Some(weighting) => {
                weighting.resolve_minimum(&self.shape, field, rng, max_attempts)?;
                weighting.sample(&self.shape, field, t, kinetic_energy, rng, max_attempts)
            }
            None => Ok((
                self.shape.sample_position(rng, max_attempts)?,
                kinetic_energy,
            )),
        }
    }
}

/// Region selecting geometry triangles for a surface source.
#[derive(Debug, Clone)]
pub enum SurfaceRegion {
    /// Open cylindrical coordinate range; angles in radians.
    Cylindrical {
        rmin: f64,
        rmax: f64,
        phimin: f64,
        phimax: f64,
        zmin: f64,
        zmax: f64,
    },
    /// Inside of an auxiliary solid read from an STL file.
    Stl(TriangleMesh),
}

impl SurfaceRegion {
    /// `parameters = rmin rmax phimin phimax zmin zmax`, angles in degrees.
    pub fn cylindrical_from_config(config: &SourceConfig) -> SourceResult<Self> {
        let p = config.parameters(6)?;
        let (phimin, phimax) = (p[2] * DEG_TO_RAD, p[3] * DEG_TO_RAD);
        for (label, lo, hi) in [("r", p[0], p[1]), ("phi", phimin, phimax), ("z", p[4], p[5])] {
            if !(lo <= hi) {
                return Err(SourceError::PhysicsViolation(format!(
                    "{label} range is inverted: {lo} > {hi}"
                )));
            }
        }
        Ok(SurfaceRegion::Cylindrical {
            rmin: p[0],
            rmax: p[1],
            phimin,
            phimax,
            zmin: p[4],
            zmax: p[5],
        })
    }

    /// Point membership. The cylindrical range is open on every side.
    pub fn contains(&self, p: Vec3) -> bool {
        match self {
            SurfaceRegion::Cylindrical {
                rmin,
                rmax,
                phimin,
                phimax,
                zmin,
                zmax,
            } => {
                let r = p[0].hypot(p[1]);
                let in_phi = *phimax - *phimin >= 2.0 * PI || {
                    let phi = wrap_azimuth(p[1].atan2(p[0]), *phimin);
                    phi > *phimin && phi < *phimax
                };
                r > *rmin && r < *rmax && in_phi && p[2] > *zmin && p[2] < *zmax
            }
            SurfaceRegion::Stl(mesh) => mesh.in_solid(p),
        }
    }

    /// A triangle belongs to the source only if all three vertices do.
    pub fn accepts(&self, tri: &Triangle) -> bool {
        tri.vertices.iter().all(|&v| self.contains(v))
    }
}

/// Position part of a surface source.
#[derive(Debug, Clone)]
pub struct SurfaceSource {
    pub region: SurfaceRegion,
    /// Energy boost along the emitting triangle's normal [eV].
    pub enormal: f64,
    selector: AreaSelector,
}

impl SurfaceSource {
    /// Accumulate eligible area over `geometry`. A zero total is reported but
    /// not fatal; sampling from such a source fails with `DegenerateGeometry`.
    pub fn new<G: Geometry + ?Sized>(
        region: SurfaceRegion,
        enormal: f64,
        geometry: &G,
    ) -> SourceResult<Self> {
        if !enormal.is_finite() || enormal < 0.0 {
            return Err(SourceError::PhysicsViolation(format!(
                "Enormal must be finite and >= 0, got {enormal}"
            )));
        }
        let selector = AreaSelector::build(geometry, |tri| region.accepts(tri));
        let area = selector.total_area();
        log::info!("Source area: {area:e} m^2");
        if area <= 0.0 {
            log::warn!("surface source selects no geometry triangles; it cannot emit particles");
        }
        Ok(SurfaceSource {
            region,
            enormal,
            selector,
        })
    }

    pub fn area(&self) -> f64 {
        self.selector.total_area()
    }

    pub fn selector(&self) -> &AreaSelector {
        &self.selector
    }

    /// Start point on the selected triangle together with its unit normal.
    fn sample<G, R>(&self, geometry: &G, rng: &mut R) -> SourceResult<(Vec3, Vec3)>
    where
        G: Geometry + ?Sized,
        R: Rng + ?Sized,
    {
        if geometry.triangles().len() != self.selector.area_sum().len() {
            return Err(SourceError::DegenerateGeometry(format!(
                "geometry has {} triangles, surface source was built for {}",
                geometry.triangles().len(),
                self.selector.area_sum().len()
            )));
        }
        let (index, position) = self.selector.sample_point(geometry, rng)?;
        Ok((position, geometry.triangles()[index].normal()))
    }
}

/// Add `enormal` to the kinetic energy carried along the unit `normal`.
///
/// The normal speed becomes `sqrt(E cos²α + Enormal)` directed along
/// `normal` while the tangential part `sqrt(E) sin α` is kept, so the
/// result leaves the surface with energy exactly `E + Enormal`.
/// Returns the new `(energy, phi, theta)`.
pub fn apply_normal_boost(energy: f64, phi: f64, theta: f64, enormal: f64, normal: Vec3) -> (f64, f64, f64) {
    if enormal <= 0.0 {
        return (energy, phi, theta);
    }
    let energy = energy.max(0.0);
    let d = direction(phi, theta);
    let cos_alpha = dot(d, normal);
    let tangential = scale(sub(d, scale(normal, cos_alpha)), energy.sqrt());
    let normal_speed = (energy * cos_alpha * cos_alpha + enormal).sqrt();
    let (_, phi, theta) = to_spherical(add(tangential, scale(normal, normal_speed)));
    (energy + enormal, phi, theta)
}

#[derive(Debug, Clone)]
pub enum SourceKind {
    Volume(VolumeSource),
    Surface(SurfaceSource),
}

/// Configured particle source.
#[derive(Debug, Clone)]
pub struct ParticleSource {
    kind: ParticleKind,
    active_time: f64,
    kinematics: Kinematics,
    polarization: f64,
    particle_counter: u64,
    max_attempts: u64,
    source: SourceKind,
}

impl ParticleSource {
    /// Read the settings common to every source: `particle`, `ActiveTime`,
    /// `polarization`, `spectrum`, `phi_v`, `theta_v`, `MaxSamplingAttempts`.
    pub fn with_kind(config: &SourceConfig, source: SourceKind) -> SourceResult<Self> {
        let name = config
            .get("particle")
            .ok_or_else(|| SourceError::ConfigError("particle is not set".to_string()))?;
        let kind = ParticleKind::from_name(name)?;

        let active_time = config.f64_or("ActiveTime", 0.0)?;
        if !active_time.is_finite() || active_time < 0.0 {
            return Err(SourceError::PhysicsViolation(format!(
                "ActiveTime must be finite and >= 0, got {active_time}"
            )));
        }
        let polarization = config.f64_or("polarization", 0.0)?;
        if !(-1.0..=1.0).contains(&polarization) {
            return Err(SourceError::PhysicsViolation(format!(
                "polarization must lie in [-1, 1], got {polarization}"
            )));
        }

        Ok(ParticleSource {
            kind,
            active_time,
            kinematics: Kinematics::from_config(config)?,
            polarization,
            particle_counter: 0,
            max_attempts: config.u64_or("MaxSamplingAttempts", DEFAULT_MAX_ATTEMPTS)?,
            source,
        })
    }

    pub fn kind(&self) -> ParticleKind {
        self.kind
    }

    pub fn active_time(&self) -> f64 {
        self.active_time
    }

    pub fn polarization(&self) -> f64 {
        self.polarization
    }

    pub fn kinematics(&self) -> &Kinematics {
        &self.kinematics
    }

    /// Number of particles created so far.
    pub fn particle_count(&self) -> u64 {
        self.particle_counter
    }

    /// Rejection-loop budget; 0 means unbounded.
    pub fn max_attempts(&self) -> u64 {
        self.max_attempts
    }

    pub fn source_kind(&self) -> &SourceKind {
        &self.source
    }

    /// Eligible area of a surface source, `None` for volume sources.
    pub fn surface_area(&self) -> Option<f64> {
        match &self.source {
            SourceKind::Surface(s) => Some(s.area()),
            SourceKind::Volume(_) => None,
        }
    }

    /// Cached potential minimum of a weighted volume source, once resolved.
    pub fn min_potential(&self) -> Option<f64> {
        match &self.source {
            SourceKind::Volume(v) => v.weighting.as_ref().and_then(|w| w.min_potential()),
            SourceKind::Surface(_) => None,
        }
    }

    /// Assemble a particle from an already sampled state. The counter only
    /// advances when the particle is actually built.
    pub fn create_particle_at(&mut self, state: InitialState) -> SourceResult<Particle> {
        let particle = Particle::new(self.particle_counter + 1, self.kind, state)?;
        self.particle_counter = particle.number;
        log::debug!(
            target: self.kind.log_target(),
            "created {} #{} at t = {} s, E = {:e} eV",
            self.kind.name(),
            particle.number,
            state.time,
            state.energy
        );
        log::trace!(
            target: self.kind.log_target(),
            "#{} x = {:?}, phi = {}, theta = {}, pol = {}",
            particle.number,
            state.position,
            state.phi,
            state.theta,
            state.polarisation
        );
        Ok(particle)
    }

    /// Sample a full start state and assemble the particle.
    ///
    /// `geometry` must be the geometry the source was built with; `field` is
    /// only queried by weighted volume sources.
    pub fn create_particle<G, F, R>(
        &mut self,
        rng: &mut R,
        geometry: &G,
        field: &F,
    ) -> SourceResult<Particle>
    where
        G: Geometry + ?Sized,
        F: PotentialField + ?Sized,
        R: Rng + ?Sized,
    {
        let time = rng.gen::<f64>() * self.active_time;
        let energy = self.kinematics.spectrum.sample(rng);
        let phi = self.kinematics.phi_v.sample(rng);
        let theta = self.kinematics.theta_v.sample(rng);

        let state = match &mut self.source {
            SourceKind::Volume(volume) => {
                let (position, energy) = volume.sample(field, time, energy, rng, self.max_attempts)?;
                InitialState {
                    time,
                    position,
                    energy,
                    phi,
                    theta,
                    polarisation: self.polarization,
                }
            }
            SourceKind::Surface(surface) => {
                let (position, normal) = surface.sample(geometry, rng)?;
                let (energy, phi, theta) =
                    apply_normal_boost(energy, phi, theta, surface.enormal, normal);
                InitialState {
                    time,
                    position,
                    energy,
                    phi,
                    theta,
                    polarisation: self.polarization,
                }
            }
        };
        self.create_particle_at(state)
    }
}
