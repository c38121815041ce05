//! Particle species and the start state handed to trajectory integration.
//!
//! The source only assembles particles; integration, boundary physics and
//! per-species output live downstream. Per-species logging goes through the
//! `log` facade with one target per species instead of shared file streams.

use source_types::constants::{
    C_LIGHT, M_ELECTRON, M_MERCURY_199, M_NEUTRON, M_PROTON, M_XENON_129, Q_ELECTRON,
};
use source_types::error::{SourceError, SourceResult};
use source_types::state::{direction, scale, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParticleKind {
    Neutron,
    Proton,
    Electron,
    /// Hg-199 comagnetometer atom.
    Mercury,
    /// Xe-129 comagnetometer atom.
    Xenon,
}

impl ParticleKind {
    pub const ALL: [ParticleKind; 5] = [
        ParticleKind::Neutron,
        ParticleKind::Proton,
        ParticleKind::Electron,
        ParticleKind::Mercury,
        ParticleKind::Xenon,
    ];

    /// Case-insensitive lookup of the configured `particle` name.
    pub fn from_name(name: &str) -> SourceResult<Self> {
        let lower = name.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|k| k.name() == lower)
            .ok_or_else(|| SourceError::ConfigError(format!("unknown particle type '{name}'")))
    }

    pub fn name(&self) -> &'static str {
        match self {
            ParticleKind::Neutron => "neutron",
            ParticleKind::Proton => "proton",
            ParticleKind::Electron => "electron",
            ParticleKind::Mercury => "mercury",
            ParticleKind::Xenon => "xenon",
        }
    }

    pub fn mass_kg(&self) -> f64 {
        match self {
            ParticleKind::Neutron => M_NEUTRON,
            ParticleKind::Proton => M_PROTON,
            ParticleKind::Electron => M_ELECTRON,
            ParticleKind::Mercury => M_MERCURY_199,
            ParticleKind::Xenon => M_XENON_129,
        }
    }

    /// Charge in units of the elementary charge.
    pub fn charge_number(&self) -> i32 {
        match self {
            ParticleKind::Proton => 1,
            ParticleKind::Electron => -1,
            ParticleKind::Neutron | ParticleKind::Mercury | ParticleKind::Xenon => 0,
        }
    }

    /// Rest energy [eV].
    pub fn rest_energy_ev(&self) -> f64 {
        self.mass_kg() * C_LIGHT * C_LIGHT / Q_ELECTRON
    }

    /// `log` target carrying this species' creation records.
    pub fn log_target(&self) -> &'static str {
        match self {
            ParticleKind::Neutron => "particle::neutron",
            ParticleKind::Proton => "particle::proton",
            ParticleKind::Electron => "particle::electron",
            ParticleKind::Mercury => "particle::mercury",
            ParticleKind::Xenon => "particle::xenon",
        }
    }
}

/// Sampled phase-space point of a new particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InitialState {
    /// Start time [s].
    pub time: f64,
    /// Start position [m].
    pub position: Vec3,
    /// Kinetic energy [eV].
    pub energy: f64,
    /// Azimuth of the velocity [rad].
    pub phi: f64,
    /// Polar angle of the velocity [rad].
    pub theta: f64,
    /// Spin projection, -1 ..= 1.
    pub polarisation: f64,
}

impl InitialState {
    pub fn validate(&self) -> SourceResult<()> {
        if !self.time.is_finite() {
            return Err(SourceError::PhysicsViolation(
                "start time must be finite".to_string(),
            ));
        }
        if self.position.iter().any(|c| !c.is_finite()) {
            return Err(SourceError::PhysicsViolation(
                "start position components must be finite".to_string(),
            ));
        }
        if !self.energy.is_finite() || self.energy < 0.0 {
            return Err(SourceError::PhysicsViolation(format!(
                "kinetic energy must be finite and >= 0, got {}",
                self.energy
            )));
        }
        if !self.phi.is_finite() || !self.theta.is_finite() {
            return Err(SourceError::PhysicsViolation(
                "velocity angles must be finite".to_string(),
            ));
        }
        if !(-1.0..=1.0).contains(&self.polarisation) {
            return Err(SourceError::PhysicsViolation(format!(
                "polarisation must lie in [-1, 1], got {}",
                self.polarisation
            )));
        }
        Ok(())
    }
}

/// Newly created particle. Ownership passes to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub number: u64,
    pub kind: ParticleKind,
    pub state: InitialState,
    /// Cartesian velocity [m/s].
    pub velocity: Vec3,
}

impl Particle {
    pub fn new(number: u64, kind: ParticleKind, state: InitialState) -> SourceResult<Self> {
        state.validate()?;
        let speed = speed_from_kinetic_energy(state.energy, kind.rest_energy_ev());
        Ok(Particle {
            number,
            kind,
            state,
            velocity: scale(direction(state.phi, state.theta), speed),
        })
    }

    pub fn speed(&self) -> f64 {
        source_types::state::norm(self.velocity)
    }
}

/// Relativistic speed for kinetic energy `ekin` and rest energy `mc2` (both eV).
///
/// β² = x (2 + x) / (1 + x)² with x = ekin / mc², which stays accurate at the
/// neV energies of ultracold neutrons where 1 - 1/γ² cancels catastrophically.
pub fn speed_from_kinetic_energy(ekin: f64, mc2: f64) -> f64 {
    let x = ekin / mc2;
    let beta2 = x * (2.0 + x) / ((1.0 + x) * (1.0 + x));
    C_LIGHT * beta2.max(0.0).sqrt()
}
