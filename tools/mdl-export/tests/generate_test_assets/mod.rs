//! Test asset generators for mdl-export integration tests

#![allow(dead_code)]

use std::io::Write;
use std::path::Path;

fn write_file(path: &Path, contents: &str) -> std::io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    file.write_all(contents.as_bytes())
}

/// Single textured quad bound to `mat0`, with `quad.mtl` next to it
pub fn generate_quad(dir: &Path) -> std::io::Result<std::path::PathBuf> {
    let obj = dir.join("quad.obj");
    write_file(
        &obj,
        "\
# quad
mtllib quad.mtl
v -1 -1 0
v 1 -1 0
v 1 1 0
v -1 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
o Quad
usemtl mat0
f 1/1/1 2/2/1 3/3/1 4/4/1
",
    )?;
    write_file(
        &dir.join("quad.mtl"),
        "newmtl mat0\nKd 0.8 0.8 0.8\nmap_Kd tex.png\n",
    )?;
    Ok(obj)
}

/// Unit cube with one flat normal per face and two materials.
/// Every corner is unique: 24 vertices, 12 triangles.
pub fn generate_cube(dir: &Path) -> std::io::Result<std::path::PathBuf> {
    let obj = dir.join("cube.obj");
    write_file(
        &obj,
        "\
mtllib materials/cube.mtl
v -1 -1 -1
v 1 -1 -1
v 1 1 -1
v -1 1 -1
v -1 -1 1
v 1 -1 1
v 1 1 1
v -1 1 1
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 -1
vn 0 0 1
vn -1 0 0
vn 1 0 0
vn 0 -1 0
vn 0 1 0
o Cube
usemtl painted
f 1/1/1 4/2/1 3/3/1 2/4/1
f 5/1/2 6/2/2 7/3/2 8/4/2
f 1/1/3 5/2/3 8/3/3 4/4/3
usemtl metal
f 2/1/4 3/2/4 7/3/4 6/4/4
f 1/1/5 2/2/5 6/3/5 5/4/5
f -5/-4/-1 -1/-3/-1 -2/-2/-1 -6/-1/-1
",
    )?;
    std::fs::create_dir_all(dir.join("materials"))?;
    write_file(
        &dir.join("materials/cube.mtl"),
        "\
# two materials sharing one albedo
newmtl painted
Ka 0.1 0.1 0.1
Kd 0.9 0.2 0.2
Ks 0.5 0.5 0.5
Ns 64
map_Kd textures/cube_albedo.png
map_Bump textures/cube_normal.png

newmtl metal
Kd 0.6 0.6 0.6
Ke 0 0 0
map_Kd other/cube_albedo.png
",
    )?;
    Ok(obj)
}

/// Triangle bound to a material that the MTL file does not declare
pub fn generate_missing_material(dir: &Path) -> std::io::Result<std::path::PathBuf> {
    let obj = dir.join("broken.obj");
    write_file(
        &obj,
        "mtllib broken.mtl\nv 0 0 0\nv 1 0 0\nv 0 1 0\no Tri\nusemtl ghost\nf 1 2 3\n",
    )?;
    write_file(&dir.join("broken.mtl"), "newmtl real\n")?;
    Ok(obj)
}

/// Geometry whose mtllib points at a file that does not exist
pub fn generate_dangling_mtllib(dir: &Path) -> std::io::Result<std::path::PathBuf> {
    let obj = dir.join("dangling.obj");
    write_file(
        &obj,
        "mtllib nowhere.mtl\nv 0 0 0\nv 1 0 0\nv 0 1 0\nusemtl m\nf 1 2 3\n",
    )?;
    Ok(obj)
}

/// Manifest building the quad and cube fixtures
pub fn generate_manifest(dir: &Path) -> std::io::Result<std::path::PathBuf> {
    generate_quad(dir)?;
    generate_cube(dir)?;
    let manifest = dir.join("assets.toml");
    write_file(
        &manifest,
        "\
[output]
dir = \"out\"

[models]
quad = \"quad.obj\"
cube = { path = \"cube.obj\", material_layout = \"v2\" }
",
    )?;
    Ok(manifest)
}
