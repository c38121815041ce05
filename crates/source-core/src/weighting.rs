//! Phase-space weighting of volume-source start points.
//!
//! A particle emitted with kinetic energy `E` at the potential minimum `Umin`
//! carries total energy `H = Umin + E`. Candidate positions are accepted with
//! probability `sqrt((H - U) / (H - Umin))`, so potential wells are populated
//! more densely than a flat distribution would.

use crate::field::PotentialField;
use crate::volume::VolumeShape;
use rand::Rng;
use source_types::error::{SourceError, SourceResult};
use source_types::state::Vec3;

pub const DEFAULT_MIN_POTENTIAL_SAMPLES: u64 = 100_000;

/// Pattern-search stop criterion, relative to the bounding-box diagonal.
const PATTERN_SEARCH_REL_TOL: f64 = 1e-9;

/// Initial pattern-search step, relative to the largest box extent.
const PATTERN_SEARCH_REL_STEP: f64 = 0.1;

const PATTERN_SEARCH_MAX_ITER: usize = 100_000;

/// `sqrt((H - U) / (H - Umin))` clamped to `[0, 1]`; zero whenever `U >= H`
/// or no phase space is available at all (`H <= Umin`).
pub fn acceptance_probability(total_energy: f64, potential: f64, min_potential: f64) -> f64 {
    let available = total_energy - min_potential;
    let local = total_energy - potential;
    if !(available > 0.0) || !(local > 0.0) {
        return 0.0;
    }
    (local / available).sqrt().clamp(0.0, 1.0)
}

#[derive(Debug, Clone)]
pub struct PhaseSpaceWeighting {
    min_potential: f64,
    samples: u64,
}

impl PhaseSpaceWeighting {
    pub fn new(samples: u64) -> Self {
        PhaseSpaceWeighting {
            min_potential: f64::INFINITY,
            samples: samples.max(1),
        }
    }

    /// Cached minimum, `None` until [`Self::resolve_minimum`] has run.
    pub fn min_potential(&self) -> Option<f64> {
        self.min_potential.is_finite().then_some(self.min_potential)
    }

    /// One-time search for the lowest potential energy inside `shape`:
    /// dense uniform sampling followed by a compass search that stays inside
    /// the shape. The result is cached for the lifetime of the source.
    pub fn resolve_minimum<F, R>(
        &mut self,
        shape: &VolumeShape,
        field: &F,
        rng: &mut R,
        max_attempts: u64,
    ) -> SourceResult<f64>
    where
        F: PotentialField + ?Sized,
        R: Rng + ?Sized,
    {
        if let Some(u) = self.min_potential() {
            return Ok(u);
        }

        let mut best_p: Vec3 = [0.0; 3];
        let mut best_u = f64::INFINITY;
        for _ in 0..self.samples {
            let p = shape.sample_position(rng, max_attempts)?;
            let u = field.potential_energy(0.0, p);
            if u < best_u {
                best_u = u;
                best_p = p;
            }
        }
        if !best_u.is_finite() {
            return Err(SourceError::PhysicsViolation(
                "potential energy is not finite anywhere in the source volume".to_string(),
            ));
        }

        let bounds = shape.bounds();
        let largest = (0..3).map(|a| bounds.extent(a)).fold(0.0_f64, f64::max);
        let diagonal = (0..3)
            .map(|a| bounds.extent(a).powi(2))
            .sum::<f64>()
            .sqrt();
        let tol = PATTERN_SEARCH_REL_TOL * diagonal.max(f64::MIN_POSITIVE);
        let mut step = PATTERN_SEARCH_REL_STEP * largest;
        let mut iter = 0;
        while step > tol && iter < PATTERN_SEARCH_MAX_ITER {
            iter += 1;
            let mut improved = false;
            for axis in 0..3 {
                for sign in [-1.0, 1.0] {
                    let mut q = best_p;
                    q[axis] += sign * step;
                    if !shape.is_member(q) {
                        continue;
                    }
                    let u = field.potential_energy(0.0, q);
                    if u < best_u {
                        best_u = u;
                        best_p = q;
                        improved = true;
                    }
                }
            }
            if !improved {
                step *= 0.5;
            }
        }

        log::info!(
            "Minimal potential energy in source volume: {best_u:e} eV at {best_p:?} ({iter} refinement steps)"
        );
        self.min_potential = best_u;
        Ok(best_u)
    }

    /// Draw a position accepted by the weighting filter and return it with
    /// the local kinetic energy `H - U`.
    ///
    /// Blocks until acceptance when `max_attempts == 0`; an energy that fits
    /// nowhere in the volume then never returns.
    pub fn sample<F, R>(
        &self,
        shape: &VolumeShape,
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
        let min_potential = self.min_potential().ok_or_else(|| {
            SourceError::PhysicsViolation(
                "potential minimum must be resolved before weighted sampling".to_string(),
            )
        })?;
        let total_energy = min_potential + kinetic_energy;
        let mut attempts = 0u64;
        loop {
            attempts += 1;
            let p = shape.sample_position(rng, max_attempts)?;
            let u = field.potential_energy(t, p);
            let prob = acceptance_probability(total_energy, u, min_potential);
            if rng.gen::<f64>() < prob {
                return Ok((p, total_energy - u));
            }
            if max_attempts > 0 && attempts >= max_attempts {
                return Err(SourceError::SamplingExhausted {
                    attempts,
                    stage: "phase-space weighting",
                });
            }
        }
    }
}
