// ─────────────────────────────────────────────────────────────────────
// SCPN Particle Source — State
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Plain `[f64; 3]` vector helpers shared by geometry and sampling code.

pub type Vec3 = [f64; 3];

#[inline]
pub fn add(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

#[inline]
pub fn sub(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
pub fn scale(a: Vec3, s: f64) -> Vec3 {
    [a[0] * s, a[1] * s, a[2] * s]
}

#[inline]
pub fn dot(a: Vec3, b: Vec3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
pub fn cross(a: Vec3, b: Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

#[inline]
pub fn norm(a: Vec3) -> f64 {
    dot(a, a).sqrt()
}

/// Unit vector from spherical angles (azimuth `phi`, polar angle `theta`).
#[inline]
pub fn direction(phi: f64, theta: f64) -> Vec3 {
    [theta.sin() * phi.cos(), theta.sin() * phi.sin(), theta.cos()]
}

/// Inverse of [`direction`] for a non-zero vector: returns `(norm, phi, theta)`.
pub fn to_spherical(v: Vec3) -> (f64, f64, f64) {
    let n = norm(v);
    if n == 0.0 {
        return (0.0, 0.0, 0.0);
    }
    let phi = v[1].atan2(v[0]);
    let theta = (v[2] / n).clamp(-1.0, 1.0).acos();
    (n, phi, theta)
}
