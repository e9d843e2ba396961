//! Types and constants for model conversion

use glam::Vec3;

use super::tangent::TangentOptions;
use crate::formats::{MaterialLayout, MdlModel};

/// Normal written for corners that reference no (or a zero-length) normal
pub(crate) const FALLBACK_NORMAL: Vec3 = Vec3::Z;

/// Knobs for a single conversion
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConvertOptions {
    /// Material record shape written to the file
    pub material_layout: MaterialLayout,
    pub tangents: TangentOptions,
}

/// Result of in-memory model conversion
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedModel {
    pub model: MdlModel,
    /// Layout the material table will be written with
    pub material_layout: MaterialLayout,
}

impl ConvertedModel {
    /// Serialized .mdl bytes
    pub fn to_bytes(&self) -> std::io::Result<Vec<u8>> {
        self.model.to_bytes(self.material_layout)
    }
}
