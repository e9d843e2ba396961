//! Model converter (OBJ + MTL -> .mdl)

mod assemble;
mod face;
mod material;
mod obj;
mod scene;
mod tangent;
mod types;

// Re-export public API
pub use assemble::{assemble, AssembledMesh};
pub use face::{
    parse_face, parse_face_vertex, resolve_index, triangulate, FaceCorners, FaceVertexRef,
    StreamSizes, Triangle,
};
pub use material::{
    parse_material_file, parse_materials, parse_materials_str, texture_basename, Material,
    MaterialLibrary, TextureRegistry,
};
pub use obj::{convert_obj, convert_obj_to_memory, convert_scene, material_library_path};
pub use scene::{parse_scene, parse_scene_file, parse_scene_str, Mesh, Scene, Submesh, VertexStreams};
pub use tangent::{generate_tangents, generate_tangents_with, TangentOptions};
pub use types::{ConvertOptions, ConvertedModel};
