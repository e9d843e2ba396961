//! Complete MDL file (.mdl)
//!
//! POD format - no magic bytes, no version field. Tables are written in a
//! fixed order, each prefixed with a u32 element count.
//!
//! # Layout
//! ```text
//! u32 texture_count        { u32 len, bytes[len] } * texture_count
//! u32 material_name_count  { u32 len, bytes[len] } * material_name_count
//! u32 material_count       MdlMaterial * material_count (layout-dependent size)
//! u32 mesh_info_count      MeshInfo * mesh_info_count
//! u32 index_count          u16 * index_count
//! u32 vertex_count         MdlVertex * vertex_count
//! ```
//!
//! Names are raw UTF-8 bytes without a terminator.

use std::io::{self, Write};

use super::records::{MaterialLayout, MdlMaterial, MdlVertex, MeshInfo};

/// Error raised while reading an MDL byte stream
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("unexpected end of data while reading {what} (offset {offset})")]
    Truncated { what: &'static str, offset: usize },

    #[error("{what} name at offset {offset} is not valid UTF-8")]
    InvalidName { what: &'static str, offset: usize },

    #[error("{0} trailing bytes after vertex table")]
    TrailingBytes(usize),
}

/// In-memory representation of a whole MDL file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MdlModel {
    pub textures: Vec<String>,
    pub material_names: Vec<String>,
    pub materials: Vec<MdlMaterial>,
    pub mesh_infos: Vec<MeshInfo>,
    pub indices: Vec<u16>,
    pub vertices: Vec<MdlVertex>,
}

impl MdlModel {
    /// Serialized size in bytes for the given material layout
    pub fn encoded_len(&self, layout: MaterialLayout) -> usize {
        let names = |list: &[String]| 4 + list.iter().map(|s| 4 + s.len()).sum::<usize>();
        names(&self.textures)
            + names(&self.material_names)
            + 4
            + self.materials.len() * layout.record_size()
            + 4
            + self.mesh_infos.len() * MeshInfo::SIZE
            + 4
            + self.indices.len() * 2
            + 4
            + self.vertices.len() * MdlVertex::SIZE
    }

    /// Write the model to `w`
    pub fn write_to<W: Write>(&self, w: &mut W, layout: MaterialLayout) -> io::Result<()> {
        write_names(w, &self.textures)?;
        write_names(w, &self.material_names)?;

        write_count(w, self.materials.len())?;
        for material in &self.materials {
            w.write_all(&material.to_bytes(layout))?;
        }

        write_count(w, self.mesh_infos.len())?;
        for info in &self.mesh_infos {
            w.write_all(&info.to_bytes())?;
        }

        // Index and vertex buffers are Pod; on little-endian hosts their
        // memory image is already the file layout
        write_count(w, self.indices.len())?;
        if cfg!(target_endian = "little") {
            w.write_all(bytemuck::cast_slice(&self.indices))?;
        } else {
            for i in &self.indices {
                w.write_all(&i.to_le_bytes())?;
            }
        }

        write_count(w, self.vertices.len())?;
        if cfg!(target_endian = "little") {
            w.write_all(bytemuck::cast_slice(&self.vertices))?;
        } else {
            for vertex in &self.vertices {
                w.write_all(&vertex.to_bytes())?;
            }
        }

        Ok(())
    }

    /// Serialize to a freshly allocated buffer.
    ///
    /// Fails only when a table holds more than `u32::MAX` entries.
    pub fn to_bytes(&self, layout: MaterialLayout) -> io::Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(self.encoded_len(layout));
        self.write_to(&mut bytes, layout)?;
        Ok(bytes)
    }

    /// Parse a complete MDL file. The whole slice must be consumed.
    pub fn from_bytes(bytes: &[u8], layout: MaterialLayout) -> Result<Self, ReadError> {
        let mut cursor = Cursor { bytes, offset: 0 };

        let textures = cursor.names("texture")?;
        let material_names = cursor.names("material")?;

        let material_count = cursor.count("material count")?;
        let mut materials = Vec::with_capacity(material_count.min(bytes.len()));
        for _ in 0..material_count {
            let record = cursor.take(layout.record_size(), "material record")?;
            materials.extend(MdlMaterial::from_bytes(record, layout));
        }

        let mesh_count = cursor.count("mesh info count")?;
        let mut mesh_infos = Vec::with_capacity(mesh_count.min(bytes.len()));
        for _ in 0..mesh_count {
            let record = cursor.take(MeshInfo::SIZE, "mesh info")?;
            mesh_infos.extend(MeshInfo::from_bytes(record));
        }

        let index_count = cursor.count("index count")?;
        let raw = cursor.take(index_count * 2, "index buffer")?;
        let indices = raw
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect();

        let vertex_count = cursor.count("vertex count")?;
        let raw = cursor.take(vertex_count * MdlVertex::SIZE, "vertex buffer")?;
        let vertices = raw
            .chunks_exact(MdlVertex::SIZE)
            .filter_map(MdlVertex::from_bytes)
            .collect();

        let remaining = bytes.len() - cursor.offset;
        if remaining != 0 {
            return Err(ReadError::TrailingBytes(remaining));
        }

        Ok(Self {
            textures,
            material_names,
            materials,
            mesh_infos,
            indices,
            vertices,
        })
    }
}

fn write_count<W: Write>(w: &mut W, count: usize) -> io::Result<()> {
    let count = u32::try_from(count)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "table exceeds u32 count"))?;
    w.write_all(&count.to_le_bytes())
}

fn write_names<W: Write>(w: &mut W, names: &[String]) -> io::Result<()> {
    write_count(w, names.len())?;
    for name in names {
        write_count(w, name.len())?;
        w.write_all(name.as_bytes())?;
    }
    Ok(())
}

struct Cursor<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, len: usize, what: &'static str) -> Result<&'a [u8], ReadError> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|&end| end <= self.bytes.len())
            .ok_or(ReadError::Truncated {
                what,
                offset: self.offset,
            })?;
        let slice = &self.bytes[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    fn count(&mut self, what: &'static str) -> Result<usize, ReadError> {
        let b = self.take(4, what)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]) as usize)
    }

    fn names(&mut self, what: &'static str) -> Result<Vec<String>, ReadError> {
        let count = self.count(what)?;
        let mut names = Vec::with_capacity(count.min(self.bytes.len()));
        for _ in 0..count {
            let len = self.count(what)?;
            let offset = self.offset;
            let raw = self.take(len, what)?;
            let name = std::str::from_utf8(raw).map_err(|_| ReadError::InvalidName { what, offset })?;
            names.push(name.to_owned());
        }
        Ok(names)
    }
}
