// ─────────────────────────────────────────────────────────────────────
// SCPN Particle Source — Source Core
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Initial phase-space sampling for particle sources.
//!
//! A source is configured once from a key-value block (see
//! [`factory::create_particle_source`]) and then asked for particles with a
//! caller-owned random generator, the simulation geometry and a potential
//! field.

pub mod distribution;
pub mod factory;
pub mod field;
pub mod particle;
pub mod selector;
pub mod source;
pub mod volume;
pub mod weighting;

pub use factory::{create_particle_source, SourceTag};
pub use field::PotentialField;
pub use particle::{InitialState, Particle, ParticleKind};
pub use source::{ParticleSource, SourceKind};
