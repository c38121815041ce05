//! Potential-energy queries used by phase-space weighting.

use source_types::constants::G_STANDARD;
use source_types::state::Vec3;

/// Scalar potential energy `U(t, x, y, z)` [eV] seen by the emitted particle.
pub trait PotentialField {
    fn potential_energy(&self, t: f64, position: Vec3) -> f64;
}

impl<F> PotentialField for F
where
    F: Fn(f64, Vec3) -> f64,
{
    fn potential_energy(&self, t: f64, position: Vec3) -> f64 {
        self(t, position)
    }
}

/// Field-free region.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoField;

impl PotentialField for NoField {
    fn potential_energy(&self, _t: f64, _position: Vec3) -> f64 {
        0.0
    }
}

/// Gravitational potential `m g z`, expressed in eV.
#[derive(Debug, Clone, Copy)]
pub struct UniformGravity {
    /// `m g` in eV per metre.
    pub ev_per_metre: f64,
}

impl UniformGravity {
    pub fn for_mass(mass_kg: f64) -> Self {
        UniformGravity {
            ev_per_metre: mass_kg * G_STANDARD / source_types::constants::Q_ELECTRON,
        }
    }
}

impl PotentialField for UniformGravity {
    fn potential_energy(&self, _t: f64, position: Vec3) -> f64 {
        self.ev_per_metre * position[2]
    }
}
