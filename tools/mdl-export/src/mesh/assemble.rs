//! Vertex deduplication and draw-range assembly

use glam::{Vec2, Vec3};
use hashbrown::HashMap;
use tracing::{debug, warn};

use super::face::FaceVertexRef;
use super::material::MaterialLibrary;
use super::scene::{Scene, VertexStreams};
use super::types::FALLBACK_NORMAL;
use crate::error::{AttributeKind, ConvertError, Location};
use crate::formats::{MdlVertex, MeshInfo};

/// Indexed geometry ready for tangent generation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssembledMesh {
    /// One draw range per submesh, in file order
    pub mesh_infos: Vec<MeshInfo>,
    /// Unique vertices (tangents still zero)
    pub vertices: Vec<MdlVertex>,
    /// Three entries per triangle
    pub indices: Vec<u16>,
}

/// Walk every submesh and build the shared vertex and index buffers.
///
/// Corners with an identical (position, texcoord, normal) triple share one
/// vertex. Fails when a submesh names an undeclared material or when the
/// unique vertex count no longer fits u16 indices.
pub fn assemble(scene: &Scene, library: &MaterialLibrary) -> Result<AssembledMesh, ConvertError> {
    let mut out = AssembledMesh::default();
    let mut slots: HashMap<FaceVertexRef, u16> = HashMap::new();

    for mesh in &scene.meshes {
        if mesh.submeshes.is_empty() {
            warn!("Object '{}' has no material groups, nothing to draw", mesh.name);
        }

        for submesh in &mesh.submeshes {
            let material_index =
                library
                    .lookup(&submesh.material)
                    .ok_or_else(|| ConvertError::MaterialNotFound {
                        name: submesh.material.clone(),
                    })?;

            out.mesh_infos.push(MeshInfo {
                material_index,
                material_name_index: material_index,
                start_index: out.indices.len() as u32,
                primitive_count: submesh.triangles.len() as u32,
            });

            for corner in submesh.triangles.iter().flat_map(|t| &t.0) {
                let slot = match slots.get(corner) {
                    Some(&slot) => slot,
                    None => {
                        let slot = u16::try_from(out.vertices.len()).map_err(|_| {
                            ConvertError::IndexOverflow {
                                vertices: out.vertices.len() + 1,
                            }
                        })?;
                        out.vertices.push(make_vertex(&scene.streams, corner)?);
                        slots.insert(*corner, slot);
                        slot
                    }
                };
                out.indices.push(slot);
            }
        }
    }

    debug!(
        "Assembled {} draw ranges, {} unique vertices, {} indices",
        out.mesh_infos.len(),
        out.vertices.len(),
        out.indices.len()
    );

    Ok(out)
}

/// Output vertex for one corner. A missing (or zero-length) normal falls
/// back to +Z and a missing texcoord to the origin.
fn make_vertex(streams: &VertexStreams, corner: &FaceVertexRef) -> Result<MdlVertex, ConvertError> {
    let out_of_range = |kind, index: u32, size| ConvertError::IndexOutOfRange {
        kind,
        index: i64::from(index) + 1,
        size,
        location: Location::default(),
    };

    let position = streams
        .positions
        .get(corner.position as usize)
        .copied()
        .ok_or_else(|| {
            out_of_range(AttributeKind::Position, corner.position, streams.positions.len())
        })?;

    let normal = match corner.normal {
        Some(i) => {
            let n = streams
                .normals
                .get(i as usize)
                .ok_or_else(|| out_of_range(AttributeKind::Normal, i, streams.normals.len()))?;
            Vec3::from(*n).try_normalize().unwrap_or(FALLBACK_NORMAL)
        }
        None => FALLBACK_NORMAL,
    };

    let texcoord = match corner.texcoord {
        Some(i) => Vec2::from(*streams.texcoords.get(i as usize).ok_or_else(|| {
            out_of_range(AttributeKind::Texcoord, i, streams.texcoords.len())
        })?),
        None => Vec2::ZERO,
    };

    Ok(MdlVertex::new(
        position,
        normal.to_array(),
        texcoord.to_array(),
    ))
}
