//! OBJ geometry parsing
//!
//! Builds the raw attribute streams plus the object / submesh hierarchy.
//! Faces are resolved and triangulated as they are read, so every stored
//! triangle only references attributes declared above it.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use tracing::{debug, trace};

use super::face::{parse_face, triangulate, StreamSizes, Triangle};
use crate::error::{ConvertError, Location};

/// Raw vertex attributes in file order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexStreams {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    /// Texture coordinates with V already flipped (`1 - v`)
    pub texcoords: Vec<[f32; 2]>,
}

impl VertexStreams {
    pub fn sizes(&self) -> StreamSizes {
        StreamSizes {
            positions: self.positions.len(),
            texcoords: self.texcoords.len(),
            normals: self.normals.len(),
        }
    }
}

/// Triangles drawn with one material
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Submesh {
    pub material: String,
    pub triangles: Vec<Triangle>,
}

/// Object (`o` record) and its submeshes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub submeshes: Vec<Submesh>,
}

/// Parsed geometry file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub streams: VertexStreams,
    pub meshes: Vec<Mesh>,
    /// Last `mtllib` reference, as written in the file
    pub material_library: Option<String>,
}

impl Scene {
    pub fn submesh_count(&self) -> usize {
        self.meshes.iter().map(|m| m.submeshes.len()).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes
            .iter()
            .flat_map(|m| &m.submeshes)
            .map(|s| s.triangles.len())
            .sum()
    }
}

/// Parse an OBJ file from disk
pub fn parse_scene_file(path: &Path) -> Result<Scene, ConvertError> {
    let file = File::open(path).map_err(|source| ConvertError::InputNotFound {
        path: path.to_path_buf(),
        referenced_by: None,
        source,
    })?;
    parse_scene(BufReader::new(file)).map_err(|err| match err {
        ConvertError::Io { source, .. } => ConvertError::Io {
            path: path.to_path_buf(),
            source,
        },
        other => other.in_file(path),
    })
}

/// Parse OBJ text held in memory
pub fn parse_scene_str(contents: &str) -> Result<Scene, ConvertError> {
    parse_scene(io::Cursor::new(contents))
}

/// Parse OBJ records from any buffered reader
pub fn parse_scene<R: BufRead>(reader: R) -> Result<Scene, ConvertError> {
    let mut scene = Scene::default();
    // Whether a `usemtl` is active; faces go to the last submesh of the last mesh
    let mut has_target = false;
    let mut object_name = String::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| ConvertError::Io {
            path: Default::default(),
            source,
        })?;
        let line_no = line_no + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut parts = trimmed.split_whitespace();
        let Some(tag) = parts.next() else {
            continue;
        };

        let record = |err: ConvertError| err.at_line(line_no, trimmed);

        match tag {
            "v" => {
                let p = parse_floats::<3>(parts).map_err(record)?;
                scene.streams.positions.push(p);
            }
            "vn" => {
                let n = parse_floats::<3>(parts).map_err(record)?;
                scene.streams.normals.push(n);
            }
            "vt" => {
                // Flip V so the origin is the top-left corner
                let [u, v] = parse_floats::<2>(parts).map_err(record)?;
                scene.streams.texcoords.push([u, 1.0 - v]);
            }
            "o" => {
                object_name = parts.next().unwrap_or_default().to_owned();
                scene.meshes.push(Mesh {
                    name: object_name.clone(),
                    submeshes: Vec::new(),
                });
                has_target = false;
            }
            "usemtl" => {
                if scene.meshes.is_empty() {
                    trace!("usemtl before any object, opening an unnamed mesh");
                    scene.meshes.push(Mesh::default());
                }
                let material = parts.next().unwrap_or_default().to_owned();
                if let Some(mesh) = scene.meshes.last_mut() {
                    mesh.submeshes.push(Submesh {
                        material,
                        triangles: Vec::new(),
                    });
                    has_target = true;
                }
            }
            "mtllib" => {
                if let Some(library) = parts.next() {
                    scene.material_library = Some(library.to_owned());
                }
            }
            "f" => {
                let submesh = scene
                    .meshes
                    .last_mut()
                    .and_then(|mesh| mesh.submeshes.last_mut())
                    .filter(|_| has_target)
                    .ok_or_else(|| {
                        record(ConvertError::MissingMaterialBinding {
                            object: object_name.clone(),
                            location: Location::default(),
                        })
                    })?;

                let corners = parse_face(parts, scene.streams.sizes()).map_err(record)?;
                let triangles = triangulate(&corners).map_err(record)?;
                submesh.triangles.extend(triangles);
            }
            other => trace!("line {}: ignoring '{}' record", line_no, other),
        }
    }

    debug!(
        "Parsed OBJ: {} positions, {} normals, {} texcoords, {} meshes, {} submeshes, {} triangles",
        scene.streams.positions.len(),
        scene.streams.normals.len(),
        scene.streams.texcoords.len(),
        scene.meshes.len(),
        scene.submesh_count(),
        scene.triangle_count()
    );

    Ok(scene)
}

/// Read up to `N` floats. Missing trailing components read as 0.0; a token
/// that is present but not a number is malformed.
pub(crate) fn parse_floats<'a, const N: usize>(
    parts: impl Iterator<Item = &'a str>,
) -> Result<[f32; N], ConvertError> {
    let mut values = [0.0f32; N];
    for (value, token) in values.iter_mut().zip(parts) {
        *value = token.parse().map_err(|_| ConvertError::malformed(token))?;
    }
    Ok(values)
}
