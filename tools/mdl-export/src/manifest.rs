//! Manifest parsing and build orchestration
//!
//! Parses assets.toml and converts every model it lists. Model paths are
//! relative to the manifest's directory.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::mesh::{convert_obj, ConvertOptions, TangentOptions};
use crate::{MaterialLayout, MDL_EXT};

/// Root manifest structure
#[derive(Debug, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub tangents: TangentOptions,
    /// Models by output name; sorted so builds run in a stable order
    #[serde(default)]
    pub models: BTreeMap<String, ModelEntry>,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    #[serde(default)]
    pub material_layout: MaterialLayout,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            material_layout: MaterialLayout::default(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("assets/")
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ModelEntry {
    Simple(PathBuf),
    Detailed {
        path: PathBuf,
        #[serde(default)]
        material_layout: Option<MaterialLayout>,
    },
}

impl ModelEntry {
    pub fn path(&self) -> &Path {
        match self {
            ModelEntry::Simple(p) => p,
            ModelEntry::Detailed { path, .. } => path,
        }
    }

    pub fn material_layout(&self) -> Option<MaterialLayout> {
        match self {
            ModelEntry::Simple(_) => None,
            ModelEntry::Detailed {
                material_layout, ..
            } => *material_layout,
        }
    }
}

impl Manifest {
    /// Conversion options for one entry (entry settings override `[output]`)
    pub fn options_for(&self, entry: &ModelEntry) -> ConvertOptions {
        ConvertOptions {
            material_layout: entry
                .material_layout()
                .unwrap_or(self.output.material_layout),
            tangents: self.tangents,
        }
    }
}

/// Load and parse a manifest file
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest: {:?}", path))?;
    let manifest: Manifest = toml::from_str(&content)
        .with_context(|| format!("Failed to parse manifest: {:?}", path))?;
    Ok(manifest)
}

/// Directory model paths in `manifest_path` are relative to
pub fn manifest_dir(manifest_path: &Path) -> &Path {
    manifest_path.parent().unwrap_or_else(|| Path::new(""))
}

/// Validate a manifest without building
pub fn validate(manifest: &Manifest, base_dir: &Path) -> Result<()> {
    for (name, entry) in &manifest.models {
        let source = base_dir.join(entry.path());
        if !source.exists() {
            anyhow::bail!("Model '{}' source not found: {:?}", name, source);
        }
        let ext = source
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_lowercase())
            .unwrap_or_default();
        if ext != "obj" {
            anyhow::bail!("Unsupported model format for '{}': {:?} (use .obj)", name, source);
        }
    }
    if !(0.0..=1.0).contains(&manifest.tangents.flat_threshold) {
        anyhow::bail!(
            "tangents.flat_threshold must be within 0..=1, got {}",
            manifest.tangents.flat_threshold
        );
    }
    if manifest.tangents.uv_epsilon < 0.0 {
        anyhow::bail!(
            "tangents.uv_epsilon must not be negative, got {}",
            manifest.tangents.uv_epsilon
        );
    }
    Ok(())
}

/// Build all models from a manifest. Returns the written output paths.
pub fn build_all(
    manifest: &Manifest,
    base_dir: &Path,
    output_override: Option<&Path>,
) -> Result<Vec<PathBuf>> {
    validate(manifest, base_dir)?;

    let output_dir = match output_override {
        Some(dir) => dir.to_path_buf(),
        None => base_dir.join(&manifest.output.dir),
    };
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output dir: {:?}", output_dir))?;

    let mut written = Vec::with_capacity(manifest.models.len());
    for (name, entry) in &manifest.models {
        let input = base_dir.join(entry.path());
        let output = output_dir.join(format!("{}.{}", name, MDL_EXT));
        tracing::info!("Converting model: {} -> {:?}", name, output);

        convert_obj(&input, &output, &manifest.options_for(entry))
            .with_context(|| format!("Failed to convert model '{}'", name))?;
        written.push(output);
    }

    tracing::info!("Built {} models into {:?}", written.len(), output_dir);
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_manifest() {
        let manifest: Manifest = toml::from_str(
            r#"
            [output]
            dir = "build/models"
            material_layout = "v2"

            [tangents]
            flat_threshold = 0.99

            [models]
            crate = "models/crate.obj"
            tree = { path = "models/tree.obj", material_layout = "v1" }
            "#,
        )
        .unwrap();

        assert_eq!(manifest.output.dir, PathBuf::from("build/models"));
        assert_eq!(manifest.tangents.flat_threshold, 0.99);
        assert_eq!(manifest.tangents.uv_epsilon, 1e-6);

        let names: Vec<_> = manifest.models.keys().cloned().collect();
        assert_eq!(names, ["crate", "tree"]);

        let crate_entry = &manifest.models["crate"];
        assert_eq!(crate_entry.path(), Path::new("models/crate.obj"));
        assert_eq!(
            manifest.options_for(crate_entry).material_layout,
            MaterialLayout::V2
        );
        assert_eq!(
            manifest.options_for(&manifest.models["tree"]).material_layout,
            MaterialLayout::V1
        );
    }

    #[test]
    fn test_defaults() {
        let manifest: Manifest = toml::from_str("").unwrap();
        assert_eq!(manifest.output.dir, PathBuf::from("assets/"));
        assert_eq!(manifest.output.material_layout, MaterialLayout::V1);
        assert_eq!(manifest.tangents, TangentOptions::default());
        assert!(manifest.models.is_empty());
    }

    #[test]
    fn test_unknown_layout_rejected() {
        let result: Result<Manifest, _> = toml::from_str("[output]\nmaterial_layout = \"v9\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_missing_source() {
        let manifest: Manifest = toml::from_str("[models]\nghost = \"nowhere/ghost.obj\"\n").unwrap();
        let err = validate(&manifest, Path::new(".")).unwrap_err();
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn test_validate_threshold_range() {
        let manifest: Manifest = toml::from_str("[tangents]\nflat_threshold = 1.5\n").unwrap();
        assert!(validate(&manifest, Path::new(".")).is_err());
    }

    #[test]
    fn test_manifest_dir() {
        assert_eq!(manifest_dir(Path::new("game/assets.toml")), Path::new("game"));
        assert_eq!(manifest_dir(Path::new("assets.toml")), Path::new(""));
    }
}
