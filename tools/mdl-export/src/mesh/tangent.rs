//! Per-vertex tangent generation for normal mapping
//!
//! Tangents follow the direction of increasing U, bitangents increasing V.
//! Each triangle's UV-gradient tangent is either summed into its corners
//! (smooth faces) or overwrites them (flat faces), then every vertex is
//! orthogonalized against its normal and given a handedness sign.

use glam::{Vec2, Vec3};
use serde::Deserialize;
use tracing::debug;

use crate::formats::MdlVertex;

/// Tunables for [`generate_tangents_with`]
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct TangentOptions {
    /// A triangle is flat when both `n0·n1` and `n1·n2` exceed this.
    /// Heuristic; 0.999 is roughly 2.5 degrees.
    pub flat_threshold: f32,
    /// Triangles whose UV-space determinant is below this are skipped
    pub uv_epsilon: f32,
}

impl Default for TangentOptions {
    fn default() -> Self {
        Self {
            flat_threshold: 0.999,
            uv_epsilon: 1e-6,
        }
    }
}

/// Compute tangents in place with the default options
pub fn generate_tangents(vertices: &mut [MdlVertex], indices: &[u16]) {
    generate_tangents_with(vertices, indices, &TangentOptions::default());
}

/// Compute tangents in place.
///
/// Flat faces overwrite their corners' running tangent, so where several
/// flat faces share a vertex the last one wins. Vertices that no usable
/// triangle touches get an arbitrary unit tangent orthogonal to the normal.
pub fn generate_tangents_with(vertices: &mut [MdlVertex], indices: &[u16], options: &TangentOptions) {
    let mut tangents = vec![Vec3::ZERO; vertices.len()];
    let mut bitangents = vec![Vec3::ZERO; vertices.len()];
    let mut skipped = 0usize;

    for tri in indices.chunks_exact(3) {
        let [i0, i1, i2] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let (Some(v0), Some(v1), Some(v2)) = (vertices.get(i0), vertices.get(i1), vertices.get(i2))
        else {
            skipped += 1;
            continue;
        };

        let duv1 = Vec2::from(v1.texcoord) - Vec2::from(v0.texcoord);
        let duv2 = Vec2::from(v2.texcoord) - Vec2::from(v0.texcoord);
        let det = duv1.x * duv2.y - duv2.x * duv1.y;
        if det.abs() < options.uv_epsilon {
            skipped += 1;
            continue;
        }
        let r = 1.0 / det;

        let p0 = Vec3::from(v0.position);
        let e1 = Vec3::from(v1.position) - p0;
        let e2 = Vec3::from(v2.position) - p0;

        let t = (e1 * duv2.y - e2 * duv1.y) * r;
        let b = (e2 * duv1.x - e1 * duv2.x) * r;

        let [n0, n1, n2] = [v0, v1, v2].map(|v| Vec3::from(v.normal));
        let flat = n0.dot(n1) > options.flat_threshold && n1.dot(n2) > options.flat_threshold;

        for i in [i0, i1, i2] {
            if flat {
                tangents[i] = t;
                bitangents[i] = b;
            } else {
                tangents[i] += t;
                bitangents[i] += b;
            }
        }
    }

    for ((vertex, t), b) in vertices.iter_mut().zip(&tangents).zip(&bitangents) {
        let n = Vec3::from(vertex.normal);
        let t = orthonormal_tangent(n, *t);
        let w = if n.cross(t).dot(*b) < 0.0 { -1.0 } else { 1.0 };
        vertex.tangent = [t.x, t.y, t.z, w];
    }

    debug!(
        "Generated tangents for {} vertices ({} triangles skipped)",
        vertices.len(),
        skipped
    );
}

/// Gram-Schmidt `t` against `n`. A zero result (no contribution, or `t`
/// parallel to `n`) is replaced by some unit vector orthogonal to `n`.
fn orthonormal_tangent(n: Vec3, t: Vec3) -> Vec3 {
    (t - n * n.dot(t))
        .try_normalize()
        .unwrap_or_else(|| n.try_normalize().unwrap_or(Vec3::Z).any_orthonormal_vector())
}
