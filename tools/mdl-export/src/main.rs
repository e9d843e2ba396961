//! mdl-export - OBJ to MDL model export tool
//!
//! Converts Wavefront OBJ scenes (plus their MTL material files) into
//! engine-ready .mdl models with deduplicated vertices and tangents.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use mdl_export::formats::MdlModel;
use mdl_export::{manifest, mesh, MaterialLayout, MDL_EXT};

#[derive(Parser)]
#[command(name = "mdl-export")]
#[command(about = "OBJ to MDL model export tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a single OBJ model
    Model {
        /// Input .obj file (its mtllib is resolved next to it)
        input: PathBuf,

        /// Output .mdl file (defaults to the input with an .mdl extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Material record layout (v1 = base color only, v2 = + normal map)
        #[arg(short, long, value_parser = parse_layout)]
        material_layout: Option<MaterialLayout>,
    },

    /// Build models from a manifest file
    Build {
        /// Path to assets.toml manifest
        #[arg(default_value = "assets.toml")]
        manifest: PathBuf,

        /// Output directory (overrides manifest)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Validate manifest without building
    Check {
        /// Path to assets.toml manifest
        #[arg(default_value = "assets.toml")]
        manifest: PathBuf,
    },

    /// Print the table sizes of an .mdl file
    Info {
        /// Input .mdl file
        input: PathBuf,

        /// Material record layout the file was written with
        #[arg(short, long, value_parser = parse_layout)]
        material_layout: Option<MaterialLayout>,
    },
}

fn parse_layout(s: &str) -> Result<MaterialLayout, String> {
    MaterialLayout::from_name(s).ok_or_else(|| format!("unknown material layout '{s}' (use v1 or v2)"))
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Model {
            input,
            output,
            material_layout,
        } => {
            let output = output.unwrap_or_else(|| input.with_extension(MDL_EXT));
            tracing::info!("Converting {:?} -> {:?}", input, output);

            let options = mesh::ConvertOptions {
                material_layout: material_layout.unwrap_or_default(),
                ..Default::default()
            };
            mesh::convert_obj(&input, &output, &options)?;
            tracing::info!("Done!");
        }

        Commands::Build {
            manifest,
            output,
            verbose,
        } => {
            if verbose {
                tracing::info!("Building models from {:?}", manifest);
            }
            let config = manifest::load_manifest(&manifest)?;
            let base_dir = manifest::manifest_dir(&manifest);
            manifest::build_all(&config, base_dir, output.as_deref())?;
            tracing::info!("Build complete!");
        }

        Commands::Check { manifest } => {
            tracing::info!("Checking manifest {:?}", manifest);
            let config = manifest::load_manifest(&manifest)?;
            manifest::validate(&config, manifest::manifest_dir(&manifest))?;
            tracing::info!("Manifest is valid!");
        }

        Commands::Info {
            input,
            material_layout,
        } => {
            let layout = material_layout.unwrap_or_default();
            let bytes =
                std::fs::read(&input).with_context(|| format!("Failed to read {:?}", input))?;
            let model = MdlModel::from_bytes(&bytes, layout)
                .with_context(|| format!("Failed to parse {:?} as layout {}", input, layout))?;

            println!("{}", input.display());
            println!("  textures:       {}", model.textures.len());
            for (i, name) in model.textures.iter().enumerate() {
                println!("    [{i}] {name}");
            }
            println!("  materials:      {}", model.materials.len());
            for (i, name) in model.material_names.iter().enumerate() {
                println!("    [{i}] {name}");
            }
            println!("  draw ranges:    {}", model.mesh_infos.len());
            for info in &model.mesh_infos {
                println!(
                    "    material {} start {} triangles {}",
                    info.material_index, info.start_index, info.primitive_count
                );
            }
            println!("  indices:        {}", model.indices.len());
            println!("  vertices:       {}", model.vertices.len());
        }
    }

    Ok(())
}
