// ─────────────────────────────────────────────────────────────────────
// SCPN Particle Source — Distributions
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! One-dimensional sampling distributions for source kinematics.
//!
//! Piecewise-linear densities are configured as `x0 w0 x1 w1 ...` node/weight
//! pairs; a single number configures a fixed value. Angles are given in
//! degrees and stored in radians.

use rand::Rng;
use rand_distr::Distribution;
use source_types::config::SourceConfig;
use source_types::constants::DEG_TO_RAD;
use source_types::error::{SourceError, SourceResult};
use std::f64::consts::PI;

/// Spacing of the default isotropic polar-angle nodes [deg].
const ISOTROPIC_NODE_STEP_DEG: f64 = 5.0;

/// Relative weight difference below which a segment is sampled as flat.
const FLAT_SEGMENT_TOL: f64 = 1e-12;

/// Density linear between nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct PiecewiseLinear {
    nodes: Vec<f64>,
    weights: Vec<f64>,
    /// Cumulative trapezoid area through segment `i`.
    cumulative: Vec<f64>,
}

impl PiecewiseLinear {
    pub fn new(nodes: Vec<f64>, weights: Vec<f64>) -> SourceResult<Self> {
        if nodes.len() < 2 || nodes.len() != weights.len() {
            return Err(SourceError::ConfigError(format!(
                "piecewise-linear distribution needs >= 2 nodes with one weight each, got {} nodes / {} weights",
                nodes.len(),
                weights.len()
            )));
        }
        if nodes.windows(2).any(|w| !(w[0] < w[1])) {
            return Err(SourceError::ConfigError(
                "distribution nodes must be strictly increasing".to_string(),
            ));
        }
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(SourceError::ConfigError(
                "distribution weights must be finite and >= 0".to_string(),
            ));
        }
        let mut cumulative = Vec::with_capacity(nodes.len() - 1);
        let mut acc = 0.0;
        for i in 0..nodes.len() - 1 {
            acc += 0.5 * (weights[i] + weights[i + 1]) * (nodes[i + 1] - nodes[i]);
            cumulative.push(acc);
        }
        if acc <= 0.0 {
            return Err(SourceError::ConfigError(
                "distribution has zero total weight".to_string(),
            ));
        }
        Ok(PiecewiseLinear {
            nodes,
            weights,
            cumulative,
        })
    }

    /// Degenerate distribution that always returns `value`.
    pub fn fixed(value: f64) -> Self {
        PiecewiseLinear {
            nodes: vec![value],
            weights: vec![1.0],
            cumulative: Vec::new(),
        }
    }

    pub fn uniform(lo: f64, hi: f64) -> SourceResult<Self> {
        Self::new(vec![lo, hi], vec![1.0, 1.0])
    }

    /// Isotropic polar angle on `[0, π]`: density ∝ sin θ on 5° nodes.
    pub fn isotropic_polar() -> Self {
        let n = (180.0 / ISOTROPIC_NODE_STEP_DEG) as usize;
        let nodes: Vec<f64> = (0..=n)
            .map(|i| i as f64 * ISOTROPIC_NODE_STEP_DEG * DEG_TO_RAD)
            .collect();
        let weights: Vec<f64> = nodes.iter().map(|t| t.sin().max(0.0)).collect();
        PiecewiseLinear {
            cumulative: Self::cumulative_of(&nodes, &weights),
            nodes,
            weights,
        }
    }

    fn cumulative_of(nodes: &[f64], weights: &[f64]) -> Vec<f64> {
        let mut acc = 0.0;
        (0..nodes.len() - 1)
            .map(|i| {
                acc += 0.5 * (weights[i] + weights[i + 1]) * (nodes[i + 1] - nodes[i]);
                acc
            })
            .collect()
    }

    /// Build from a parsed value list, multiplying node positions by `unit`.
    pub fn from_values(values: &[f64], unit: f64) -> SourceResult<Self> {
        match values.len() {
            1 => Ok(Self::fixed(values[0] * unit)),
            n if n >= 4 && n % 2 == 0 => {
                let nodes = values.iter().step_by(2).map(|x| x * unit).collect();
                let weights = values.iter().skip(1).step_by(2).copied().collect();
                Self::new(nodes, weights)
            }
            n => Err(SourceError::ConfigError(format!(
                "expected one value or >= 2 'x weight' pairs, got {n} numbers"
            ))),
        }
    }

    pub fn min(&self) -> f64 {
        self.nodes[0]
    }

    pub fn max(&self) -> f64 {
        self.nodes[self.nodes.len() - 1]
    }

    pub fn mean(&self) -> f64 {
        let Some(&total) = self.cumulative.last() else {
            return self.nodes[0];
        };
        let mut first_moment = 0.0;
        for i in 0..self.nodes.len() - 1 {
            let (x0, x1) = (self.nodes[i], self.nodes[i + 1]);
            let (w0, w1) = (self.weights[i], self.weights[i + 1]);
            first_moment += (x1 - x0) * (w0 * (2.0 * x0 + x1) + w1 * (x0 + 2.0 * x1)) / 6.0;
        }
        first_moment / total
    }
}

impl Distribution<f64> for PiecewiseLinear {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let Some(&total) = self.cumulative.last() else {
            return self.nodes[0];
        };
        let target = rng.gen::<f64>() * total;
        let last = self.cumulative.len() - 1;
        // First segment whose cumulative area exceeds the target; skips empty segments.
        let i = self.cumulative.partition_point(|&c| c <= target).min(last);
        let prev = if i == 0 { 0.0 } else { self.cumulative[i - 1] };
        let seg_area = self.cumulative[i] - prev;
        let u = if seg_area > 0.0 {
            ((target - prev) / seg_area).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let (x0, x1) = (self.nodes[i], self.nodes[i + 1]);
        let (w0, w1) = (self.weights[i], self.weights[i + 1]);
        let t = if (w1 - w0).abs() <= FLAT_SEGMENT_TOL * (w0 + w1) {
            u
        } else {
            (-w0 + (w0 * w0 + u * (w1 * w1 - w0 * w0)).max(0.0).sqrt()) / (w1 - w0)
        };
        x0 + t.clamp(0.0, 1.0) * (x1 - x0)
    }
}

/// Density ∝ x on `[a, b]`, equivalent to the `linear_distribution` used for
/// radii in cylindrical volumes (area element `r dr dφ`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Linear {
    a: f64,
    b: f64,
}

impl Linear {
    pub fn new(a: f64, b: f64) -> SourceResult<Self> {
        if !a.is_finite() || !b.is_finite() || a < 0.0 || a > b {
            return Err(SourceError::PhysicsViolation(format!(
                "linear distribution needs 0 <= a <= b, got a={a}, b={b}"
            )));
        }
        Ok(Linear { a, b })
    }
}

impl Distribution<f64> for Linear {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let u: f64 = rng.gen();
        (self.a * self.a + u * (self.b * self.b - self.a * self.a)).sqrt()
    }
}

/// Energy and velocity-direction distributions shared by every source.
#[derive(Debug, Clone)]
pub struct Kinematics {
    pub spectrum: PiecewiseLinear,
    pub phi_v: PiecewiseLinear,
    pub theta_v: PiecewiseLinear,
}

impl Kinematics {
    /// Reads `spectrum` (required, eV), `phi_v` and `theta_v` (degrees).
    pub fn from_config(config: &SourceConfig) -> SourceResult<Self> {
        let spectrum_values = config.numbers("spectrum")?;
        if spectrum_values.is_empty() {
            return Err(SourceError::ConfigError("spectrum is not set".to_string()));
        }
        let spectrum = PiecewiseLinear::from_values(&spectrum_values, 1.0)
            .map_err(|e| prefix_error("spectrum", e))?;
        if spectrum.min() < 0.0 {
            return Err(SourceError::PhysicsViolation(format!(
                "spectrum must not extend below zero energy, starts at {}",
                spectrum.min()
            )));
        }

        let phi_values = config.numbers("phi_v")?;
        let phi_v = if phi_values.is_empty() {
            PiecewiseLinear::uniform(0.0, 2.0 * PI)?
        } else {
            PiecewiseLinear::from_values(&phi_values, DEG_TO_RAD)
                .map_err(|e| prefix_error("phi_v", e))?
        };

        let theta_values = config.numbers("theta_v")?;
        let theta_v = if theta_values.is_empty() {
            PiecewiseLinear::isotropic_polar()
        } else {
            PiecewiseLinear::from_values(&theta_values, DEG_TO_RAD)
                .map_err(|e| prefix_error("theta_v", e))?
        };
        if theta_v.min() < 0.0 || theta_v.max() > PI + 1e-12 {
            return Err(SourceError::PhysicsViolation(
                "theta_v must lie within 0..180 degrees".to_string(),
            ));
        }

        Ok(Kinematics {
            spectrum,
            phi_v,
            theta_v,
        })
    }
}

fn prefix_error(key: &str, err: SourceError) -> SourceError {
    match err {
        SourceError::ConfigError(msg) => SourceError::ConfigError(format!("{key}: {msg}")),
        other => other,
    }
}
