// ─────────────────────────────────────────────────────────────────────
// SCPN Particle Source — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
/// Elementary charge (C), also the J/eV conversion factor.
pub const Q_ELECTRON: f64 = 1.602176634e-19;

/// Speed of light (m/s)
pub const C_LIGHT: f64 = 299_792_458.0;

/// Standard gravity (m/s²)
pub const G_STANDARD: f64 = 9.80665;

/// Atomic mass unit (kg)
pub const AMU: f64 = 1.66053906660e-27;

/// Neutron mass (kg)
pub const M_NEUTRON: f64 = 1.67492749804e-27;

/// Proton mass (kg)
pub const M_PROTON: f64 = 1.67262192369e-27;

/// Electron mass (kg)
pub const M_ELECTRON: f64 = 9.1093837015e-31;

/// Mercury-199 mass (kg)
pub const M_MERCURY_199: f64 = 198.968_280_6 * AMU;

/// Xenon-129 mass (kg)
pub const M_XENON_129: f64 = 128.904_780_9 * AMU;

/// Degrees to radians.
pub const DEG_TO_RAD: f64 = std::f64::consts::PI / 180.0;
