//! Shared types for the MDL model format
//!
//! This crate is used by:
//! - `mdl-export` (asset pipeline, writes .mdl files)
//! - runtime loaders that read .mdl files back
//!
//! # Modules
//!
//! - [`formats`] - MDL records, writer and reader

pub mod formats;

pub use formats::{
    MaterialLayout, MdlMaterial, MdlModel, MdlVertex, MeshInfo, NO_TEXTURE, ReadError,
    vertex_floats,
};

/// File extension for exported models (without dot)
pub const MDL_EXT: &str = "mdl";

/// Largest vertex count addressable by the u16 index buffer
pub const MAX_VERTICES: usize = u16::MAX as usize + 1;
