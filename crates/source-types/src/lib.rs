// ─────────────────────────────────────────────────────────────────────
// SCPN Particle Source — Source Types
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Shared types for particle sources: errors, key-value configuration,
//! physical constants and small 3-vector helpers.

pub mod config;
pub mod constants;
pub mod error;
pub mod state;
