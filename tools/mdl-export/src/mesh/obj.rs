//! OBJ model conversion

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::assemble::assemble;
use super::material::{parse_material_file, MaterialLibrary};
use super::scene::{parse_scene_file, Scene};
use super::tangent::generate_tangents_with;
use super::types::{ConvertOptions, ConvertedModel};
use crate::error::ConvertError;
use crate::formats::MdlModel;

/// Location of the scene's `mtllib`, resolved next to the OBJ file
pub fn material_library_path(input: &Path, scene: &Scene) -> Option<PathBuf> {
    let library = scene.material_library.as_deref()?;
    let dir = input.parent().unwrap_or_else(|| Path::new(""));
    Some(dir.join(library))
}

/// Run assembly and tangent generation on already parsed inputs
pub fn convert_scene(
    scene: &Scene,
    library: &MaterialLibrary,
    options: &ConvertOptions,
) -> Result<ConvertedModel, ConvertError> {
    let mut mesh = assemble(scene, library)?;
    generate_tangents_with(&mut mesh.vertices, &mesh.indices, &options.tangents);

    Ok(ConvertedModel {
        model: MdlModel {
            textures: library.textures.names().to_vec(),
            material_names: library.names(),
            materials: library.records(),
            mesh_infos: mesh.mesh_infos,
            indices: mesh.indices,
            vertices: mesh.vertices,
        },
        material_layout: options.material_layout,
    })
}

/// Convert an OBJ file (and its MTL) to in-memory model data
pub fn convert_obj_to_memory(
    input: &Path,
    options: &ConvertOptions,
) -> Result<ConvertedModel, ConvertError> {
    let scene = parse_scene_file(input)?;

    let library = match material_library_path(input, &scene) {
        Some(path) => parse_material_file(&path, input)?,
        None => {
            warn!("{:?} has no mtllib record, no materials available", input);
            MaterialLibrary::default()
        }
    };

    convert_scene(&scene, &library, options)
}

/// Convert an OBJ file to an .mdl file.
///
/// The output is only created once the whole model has been converted and
/// written out, so a failed conversion leaves no file behind.
pub fn convert_obj(input: &Path, output: &Path, options: &ConvertOptions) -> Result<(), ConvertError> {
    let converted = convert_obj_to_memory(input, options)?;
    let io_err = |source: io::Error| ConvertError::Io {
        path: output.to_path_buf(),
        source,
    };
    let bytes = converted.to_bytes().map_err(io_err)?;
    write_whole_file(output, &bytes).map_err(io_err)?;

    let model = &converted.model;
    info!(
        "Converted OBJ model: {} textures, {} materials, {} draw ranges, {} indices, {} vertices, layout={}, {} bytes",
        model.textures.len(),
        model.materials.len(),
        model.mesh_infos.len(),
        model.indices.len(),
        model.vertices.len(),
        converted.material_layout,
        bytes.len()
    );

    Ok(())
}

/// Write into a temp file beside `output`, then rename it into place.
/// The temp file is removed if any step fails.
fn write_whole_file(output: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = match output.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(bytes)?;
    file.as_file().sync_all()?;
    file.persist(output).map_err(|err| err.error)?;
    Ok(())
}
