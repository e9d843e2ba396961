//! Fixed-layout MDL records
//!
//! POD records stored back to back in the MDL file. All fields are
//! little-endian with no padding between them.
//!
//! # Layouts
//! ```text
//! MeshInfo (16 bytes)
//! 0x00: material_index u32
//! 0x04: material_name_index u32
//! 0x08: start_index u32
//! 0x0C: primitive_count u32
//!
//! MdlVertex (48 bytes)
//! 0x00: position f32x3
//! 0x0C: normal f32x3
//! 0x18: texcoord f32x2
//! 0x20: tangent f32x4 (xyz = tangent, w = handedness)
//!
//! MdlMaterial (v1: 56 bytes, v2: 60 bytes)
//! 0x00: ambient f32x3
//! 0x0C: diffuse f32x3
//! 0x18: specular f32x3
//! 0x24: specular_power f32
//! 0x28: emissive f32x3
//! 0x34: texture_index i32 (base color, -1 = none)
//! 0x38: normal_map_index i32 (v2 only, -1 = none)
//! ```

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Texture slot value meaning "no texture bound"
pub const NO_TEXTURE: i32 = -1;

/// On-disk shape of the material record.
///
/// `V1` carries a single texture slot (base color). `V2` appends the
/// normal-map slot. The file does not record which one was used, so reader
/// and writer must agree out of band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialLayout {
    #[default]
    V1,
    V2,
}

impl MaterialLayout {
    /// Size of one material record in bytes
    pub const fn record_size(self) -> usize {
        match self {
            MaterialLayout::V1 => 56,
            MaterialLayout::V2 => 60,
        }
    }

    /// Parse a layout name ("v1" / "v2", case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "v1" | "1" => Some(MaterialLayout::V1),
            "v2" | "2" => Some(MaterialLayout::V2),
            _ => None,
        }
    }
}

impl std::fmt::Display for MaterialLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MaterialLayout::V1 => f.write_str("v1"),
            MaterialLayout::V2 => f.write_str("v2"),
        }
    }
}

/// Material record. Holds both texture slots in memory; how many of them
/// reach the file depends on the [`MaterialLayout`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MdlMaterial {
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub specular_power: f32,
    pub emissive: [f32; 3],
    /// Base color texture index into the texture table
    pub texture_index: i32,
    /// Normal map texture index into the texture table
    pub normal_map_index: i32,
}

impl Default for MdlMaterial {
    fn default() -> Self {
        Self {
            ambient: [0.0, 0.0, 0.0],
            diffuse: [1.0, 1.0, 1.0],
            specular: [1.0, 1.0, 1.0],
            specular_power: 100.0,
            emissive: [0.0, 0.0, 0.0],
            texture_index: NO_TEXTURE,
            normal_map_index: NO_TEXTURE,
        }
    }
}

impl MdlMaterial {
    /// Serialize with the given layout
    pub fn to_bytes(&self, layout: MaterialLayout) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(layout.record_size());
        for v in self.ambient {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        for v in self.diffuse {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        for v in self.specular {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        bytes.extend_from_slice(&self.specular_power.to_le_bytes());
        for v in self.emissive {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        bytes.extend_from_slice(&self.texture_index.to_le_bytes());
        if layout == MaterialLayout::V2 {
            bytes.extend_from_slice(&self.normal_map_index.to_le_bytes());
        }
        bytes
    }

    /// Read a record written with `layout`
    ///
    /// A `V1` record has no normal-map slot, so it reads back as [`NO_TEXTURE`].
    pub fn from_bytes(bytes: &[u8], layout: MaterialLayout) -> Option<Self> {
        if bytes.len() < layout.record_size() {
            return None;
        }
        let word = |at: usize| [bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]];
        let f = |at: usize| f32::from_le_bytes(word(at));
        let i = |at: usize| i32::from_le_bytes(word(at));
        Some(Self {
            ambient: [f(0x00), f(0x04), f(0x08)],
            diffuse: [f(0x0C), f(0x10), f(0x14)],
            specular: [f(0x18), f(0x1C), f(0x20)],
            specular_power: f(0x24),
            emissive: [f(0x28), f(0x2C), f(0x30)],
            texture_index: i(0x34),
            normal_map_index: match layout {
                MaterialLayout::V1 => NO_TEXTURE,
                MaterialLayout::V2 => i(0x38),
            },
        })
    }
}

/// Draw range for one submesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
#[repr(C)]
pub struct MeshInfo {
    pub material_index: u32,
    pub material_name_index: u32,
    /// First entry of this submesh in the index buffer
    pub start_index: u32,
    /// Triangle count
    pub primitive_count: u32,
}

impl MeshInfo {
    pub const SIZE: usize = 16;

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&self.material_index.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.material_name_index.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.start_index.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.primitive_count.to_le_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        let u = |i: usize| u32::from_le_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);
        Some(Self {
            material_index: u(0),
            material_name_index: u(4),
            start_index: u(8),
            primitive_count: u(12),
        })
    }
}

/// Interleaved vertex: position, normal, texcoord, tangent
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
#[repr(C)]
pub struct MdlVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub texcoord: [f32; 2],
    /// xyz = tangent, w = bitangent handedness (+1 / -1)
    pub tangent: [f32; 4],
}

const _: () = assert!(std::mem::size_of::<MdlVertex>() == MdlVertex::SIZE);
const _: () = assert!(std::mem::size_of::<MeshInfo>() == MeshInfo::SIZE);

impl MdlVertex {
    pub const SIZE: usize = 48;

    pub fn new(position: [f32; 3], normal: [f32; 3], texcoord: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            texcoord,
            tangent: [0.0; 4],
        }
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        let floats = self
            .position
            .iter()
            .chain(&self.normal)
            .chain(&self.texcoord)
            .chain(&self.tangent);
        for (chunk, v) in bytes.chunks_exact_mut(4).zip(floats) {
            chunk.copy_from_slice(&v.to_le_bytes());
        }
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        let mut floats = [0.0f32; Self::SIZE / 4];
        for (v, chunk) in floats.iter_mut().zip(bytes.chunks_exact(4)) {
            *v = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Some(Self {
            position: [floats[0], floats[1], floats[2]],
            normal: [floats[3], floats[4], floats[5]],
            texcoord: [floats[6], floats[7]],
            tangent: [floats[8], floats[9], floats[10], floats[11]],
        })
    }
}

/// View a vertex slice as its flat list of floats
pub fn vertex_floats(vertices: &[MdlVertex]) -> &[f32] {
    bytemuck::cast_slice(vertices)
}
