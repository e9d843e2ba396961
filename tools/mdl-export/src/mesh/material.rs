//! MTL material parsing and texture registry

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use hashbrown::HashMap;
use tracing::{debug, warn};

use super::scene::parse_floats;
use crate::error::ConvertError;
use crate::formats::{MdlMaterial, NO_TEXTURE};

/// Insertion-ordered set of texture basenames
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextureRegistry {
    names: Vec<String>,
    lookup: HashMap<String, u32>,
}

impl TextureRegistry {
    /// Register a texture path. The directory part is dropped; registering
    /// a basename that is already present returns its existing index.
    pub fn register(&mut self, path: &str) -> u32 {
        let name = texture_basename(path);
        if let Some(&index) = self.lookup.get(name) {
            return index;
        }
        let index = self.names.len() as u32;
        self.names.push(name.to_owned());
        self.lookup.insert(name.to_owned(), index);
        index
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// File name component of a texture path. Both `/` and `\` separate
/// directories, since MTL files are often authored on Windows.
pub fn texture_basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// One `newmtl` block
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub specular_power: f32,
    pub emissive: [f32; 3],
    /// `map_Kd` texture
    pub base_color_texture: Option<u32>,
    /// `map_Bump` texture
    pub normal_map_texture: Option<u32>,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        let defaults = MdlMaterial::default();
        Self {
            name: name.into(),
            ambient: defaults.ambient,
            diffuse: defaults.diffuse,
            specular: defaults.specular,
            specular_power: defaults.specular_power,
            emissive: defaults.emissive,
            base_color_texture: None,
            normal_map_texture: None,
        }
    }

    /// Fixed-layout record for the output file
    pub fn to_record(&self) -> MdlMaterial {
        let slot = |t: Option<u32>| t.map_or(NO_TEXTURE, |i| i as i32);
        MdlMaterial {
            ambient: self.ambient,
            diffuse: self.diffuse,
            specular: self.specular,
            specular_power: self.specular_power,
            emissive: self.emissive,
            texture_index: slot(self.base_color_texture),
            normal_map_index: slot(self.normal_map_texture),
        }
    }
}

/// Materials in file order plus the shared texture table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialLibrary {
    pub materials: Vec<Material>,
    pub textures: TextureRegistry,
    index_by_name: HashMap<String, u32>,
}

impl MaterialLibrary {
    /// Index of the material bound to `name`
    pub fn lookup(&self, name: &str) -> Option<u32> {
        self.index_by_name.get(name).copied()
    }

    /// Material name table, one entry per material in file order
    pub fn names(&self) -> Vec<String> {
        self.materials.iter().map(|m| m.name.clone()).collect()
    }

    pub fn records(&self) -> Vec<MdlMaterial> {
        self.materials.iter().map(Material::to_record).collect()
    }

    fn push(&mut self, name: &str) {
        let index = self.materials.len() as u32;
        if let Some(previous) = self.index_by_name.insert(name.to_owned(), index) {
            warn!(
                "Material '{}' declared twice (index {} and {}), using the later one",
                name, previous, index
            );
        }
        self.materials.push(Material::new(name));
    }
}

/// Parse an MTL file. `referenced_by` names the geometry file that pointed
/// at it, for the error message when it cannot be opened.
pub fn parse_material_file(
    path: &Path,
    referenced_by: &Path,
) -> Result<MaterialLibrary, ConvertError> {
    let file = File::open(path).map_err(|source| ConvertError::InputNotFound {
        path: path.to_path_buf(),
        referenced_by: Some(referenced_by.to_path_buf()),
        source,
    })?;
    parse_materials(BufReader::new(file)).map_err(|err| match err {
        ConvertError::Io { source, .. } => ConvertError::Io {
            path: path.to_path_buf(),
            source,
        },
        other => other.in_file(path),
    })
}

/// Parse MTL text held in memory
pub fn parse_materials_str(contents: &str) -> Result<MaterialLibrary, ConvertError> {
    parse_materials(io::Cursor::new(contents))
}

/// Parse MTL records from any buffered reader
pub fn parse_materials<R: BufRead>(reader: R) -> Result<MaterialLibrary, ConvertError> {
    let mut library = MaterialLibrary::default();

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

        if tag == "newmtl" {
            library.push(parts.next().unwrap_or_default());
            continue;
        }

        let record = |err: ConvertError| err.at_line(line_no, trimmed);
        let Some(material) = library.materials.last_mut() else {
            debug!("line {}: '{}' before any newmtl, ignored", line_no, tag);
            continue;
        };

        match tag {
            "Ka" => material.ambient = parse_floats::<3>(parts).map_err(record)?,
            "Kd" => material.diffuse = parse_floats::<3>(parts).map_err(record)?,
            "Ks" => material.specular = parse_floats::<3>(parts).map_err(record)?,
            "Ke" => material.emissive = parse_floats::<3>(parts).map_err(record)?,
            "Ns" => material.specular_power = parse_floats::<1>(parts).map_err(record)?[0],
            "map_Kd" => {
                // Options such as `-bm 1.0` may precede the file name
                material.base_color_texture = parts.last().map(|f| library.textures.register(f));
            }
            "map_Bump" => {
                material.normal_map_texture = parts.last().map(|f| library.textures.register(f));
            }
            _ => {}
        }
    }

    debug!(
        "Parsed MTL: {} materials, {} textures",
        library.materials.len(),
        library.textures.len()
    );

    Ok(library)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basename_strips_directories() {
        assert_eq!(texture_basename("tex.png"), "tex.png");
        assert_eq!(texture_basename("textures/wood/tex.png"), "tex.png");
        assert_eq!(texture_basename("C:\\art\\tex.png"), "tex.png");
    }

    #[test]
    fn test_registry_dedups_by_basename() {
        let mut registry = TextureRegistry::default();
        assert_eq!(registry.register("a/brick.png"), 0);
        assert_eq!(registry.register("stone.png"), 1);
        assert_eq!(registry.register("b/brick.png"), 0);
        assert_eq!(registry.names(), ["brick.png", "stone.png"]);
    }

    #[test]
    fn test_parse_material_fields() {
        let library = parse_materials_str(
            "newmtl wood\nKa 0.1 0.2 0.3\nKd 0.5 0.5 0.5\nKs 0 0 0\nNs 32\nKe 1 0 0\n",
        )
        .unwrap();
        let wood = &library.materials[0];
        assert_eq!(wood.name, "wood");
        assert_eq!(wood.ambient, [0.1, 0.2, 0.3]);
        assert_eq!(wood.diffuse, [0.5, 0.5, 0.5]);
        assert_eq!(wood.specular, [0.0, 0.0, 0.0]);
        assert_eq!(wood.specular_power, 32.0);
        assert_eq!(wood.emissive, [1.0, 0.0, 0.0]);
        assert_eq!(wood.base_color_texture, None);
    }

    #[test]
    fn test_defaults_for_unset_fields() {
        let library = parse_materials_str("newmtl plain\n").unwrap();
        let record = library.materials[0].to_record();
        assert_eq!(record, MdlMaterial::default());
    }

    #[test]
    fn test_texture_last_token_is_file() {
        let library = parse_materials_str(
            "newmtl a\nmap_Kd -bm 0.5 maps/albedo.png\nmap_Bump maps/normal.png\n\
             newmtl b\nmap_Kd other/albedo.png\n",
        )
        .unwrap();
        assert_eq!(library.textures.names(), ["albedo.png", "normal.png"]);
        assert_eq!(library.materials[0].base_color_texture, Some(0));
        assert_eq!(library.materials[0].normal_map_texture, Some(1));
        assert_eq!(library.materials[1].base_color_texture, Some(0));
    }

    #[test]
    fn test_directives_before_newmtl_ignored() {
        let library = parse_materials_str("Kd 1 0 0\nmap_Kd lost.png\nnewmtl m\n").unwrap();
        assert_eq!(library.materials.len(), 1);
        assert_eq!(library.materials[0].diffuse, [1.0, 1.0, 1.0]);
        assert!(library.textures.is_empty());
    }

    #[test]
    fn test_lookup_and_name_table() {
        let library = parse_materials_str("newmtl first\nnewmtl second\n").unwrap();
        assert_eq!(library.lookup("first"), Some(0));
        assert_eq!(library.lookup("second"), Some(1));
        assert_eq!(library.lookup("third"), None);
        assert_eq!(library.names(), ["first", "second"]);
    }

    #[test]
    fn test_duplicate_name_rebinds() {
        let library = parse_materials_str("newmtl m\nKd 1 0 0\nnewmtl m\nKd 0 1 0\n").unwrap();
        assert_eq!(library.materials.len(), 2);
        assert_eq!(library.lookup("m"), Some(1));
        assert_eq!(library.names(), ["m", "m"]);
    }

    #[test]
    fn test_malformed_color() {
        let err = parse_materials_str("newmtl m\nKd 1 green 0\n").unwrap_err();
        assert!(matches!(err, ConvertError::MalformedRecord { .. }));
    }

    #[test]
    fn test_record_texture_slots() {
        let library = parse_materials_str("newmtl m\nmap_Bump n.png\n").unwrap();
        let record = library.materials[0].to_record();
        assert_eq!(record.texture_index, NO_TEXTURE);
        assert_eq!(record.normal_map_index, 0);
    }
}
