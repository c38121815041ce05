//! STL input (ASCII and binary) for source volumes.

use crate::mesh::TriangleMesh;
use crate::triangle::Triangle;
use source_types::error::{SourceError, SourceResult};
use source_types::state::Vec3;
use std::path::Path;

const BINARY_HEADER_LEN: usize = 80;
const BINARY_RECORD_LEN: usize = 50;

/// Read an STL file into a [`TriangleMesh`].
///
/// Binary files are recognized by their exact size (`84 + 50 n` bytes);
/// everything else is parsed as ASCII.
pub fn read_stl(path: impl AsRef<Path>) -> SourceResult<TriangleMesh> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let triangles = if is_binary(&bytes) {
        parse_binary(&bytes)?
    } else {
        let text = std::str::from_utf8(&bytes).map_err(|_| {
            SourceError::DegenerateGeometry(format!(
                "{}: neither binary nor ASCII STL",
                path.display()
            ))
        })?;
        parse_ascii(text)?
    };
    log::debug!("Read {} triangles from {}", triangles.len(), path.display());
    TriangleMesh::from_triangles(triangles).map_err(|e| match e {
        SourceError::DegenerateGeometry(msg) => {
            SourceError::DegenerateGeometry(format!("{}: {msg}", path.display()))
        }
        other => other,
    })
}

fn is_binary(bytes: &[u8]) -> bool {
    if bytes.len() < BINARY_HEADER_LEN + 4 {
        return false;
    }
    let mut count = [0u8; 4];
    count.copy_from_slice(&bytes[BINARY_HEADER_LEN..BINARY_HEADER_LEN + 4]);
    let n = u32::from_le_bytes(count) as usize;
    bytes.len() == BINARY_HEADER_LEN + 4 + n * BINARY_RECORD_LEN
}

fn parse_binary(bytes: &[u8]) -> SourceResult<Vec<Triangle>> {
    let records = &bytes[BINARY_HEADER_LEN + 4..];
    let read_f32 = |chunk: &[u8], offset: usize| -> f64 {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&chunk[offset..offset + 4]);
        f32::from_le_bytes(raw) as f64
    };
    let triangles = records
        .chunks_exact(BINARY_RECORD_LEN)
        .map(|rec| {
            // 12 bytes facet normal, then three vertices, then 2 attribute bytes.
            let vertex = |k: usize| -> Vec3 {
                let base = 12 + 12 * k;
                [
                    read_f32(rec, base),
                    read_f32(rec, base + 4),
                    read_f32(rec, base + 8),
                ]
            };
            Triangle::new(vertex(0), vertex(1), vertex(2))
        })
        .collect();
    Ok(triangles)
}

fn parse_ascii(text: &str) -> SourceResult<Vec<Triangle>> {
    let mut vertices: Vec<Vec3> = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let mut tokens = line.split_whitespace();
        if tokens.next() != Some("vertex") {
            continue;
        }
        let mut v = [0.0; 3];
        for c in v.iter_mut() {
            *c = tokens
                .next()
                .and_then(|t| t.parse::<f64>().ok())
                .ok_or_else(|| {
                    SourceError::DegenerateGeometry(format!(
                        "malformed STL vertex on line {}",
                        lineno + 1
                    ))
                })?;
        }
        vertices.push(v);
    }
    if vertices.len() % 3 != 0 {
        return Err(SourceError::DegenerateGeometry(format!(
            "STL vertex count {} is not a multiple of 3",
            vertices.len()
        )));
    }
    Ok(vertices
        .chunks_exact(3)
        .map(|v| Triangle::new(v[0], v[1], v[2]))
        .collect())
}

/// Serialize a mesh as ASCII STL. Used to produce fixtures for source volumes.
pub fn to_ascii_stl(name: &str, triangles: &[Triangle]) -> String {
    let mut out = format!("solid {name}\n");
    for tri in triangles {
        let n = tri.normal();
        out.push_str(&format!("  facet normal {} {} {}\n    outer loop\n", n[0], n[1], n[2]));
        for v in &tri.vertices {
            out.push_str(&format!("      vertex {} {} {}\n", v[0], v[1], v[2]));
        }
        out.push_str("    endloop\n  endfacet\n");
    }
    out.push_str(&format!("endsolid {name}\n"));
    out
}
