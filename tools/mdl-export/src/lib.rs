//! mdl-export library
//!
//! Converts Wavefront OBJ/MTL scenes into .mdl engine models. Exposed as a
//! library so other tools can convert straight to memory.

pub mod error;
pub mod formats;
pub mod manifest;
pub mod mesh;

pub use error::{AttributeKind, ConvertError, Location};

// Re-export format types from mdl-common
pub use mdl_common::{MaterialLayout, MdlMaterial, MdlModel, MdlVertex, MeshInfo, MDL_EXT};

// Re-export key types for model conversion
pub use mesh::{convert_obj, convert_obj_to_memory, ConvertOptions, ConvertedModel, TangentOptions};
