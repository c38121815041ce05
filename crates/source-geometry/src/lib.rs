// ─────────────────────────────────────────────────────────────────────
// SCPN Particle Source — Source Geometry
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Geometric primitives consumed by particle sources.
//!
//! Triangles, axis-aligned boxes, closed triangle meshes with a
//! point-in-solid predicate, and an STL reader for source volumes.

pub mod bbox;
pub mod mesh;
pub mod stl;
pub mod triangle;

pub use bbox::BoundingBox;
pub use mesh::{Geometry, TriangleMesh};
pub use triangle::Triangle;
