//! sodium - Sodium Scene File tool
//!
//! Inspects scene files and rewrites them through the in-memory host, which
//! normalizes parent inverses and produces sorted, diff-friendly output.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sodium_core::host::{HostScene, MeshId, ObjectData, ObjectId};
use sodium_core::{export_scene_file, import_scene_file, CodecConfig, MemoryScene};
use sodium_math::Vec3;

#[derive(Parser)]
#[command(name = "sodium")]
#[command(about = "Sodium Scene File tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a scene file and print what it contains
    Inspect {
        /// Scene file to read
        file: PathBuf,
    },

    /// Import a scene file and export it again
    Roundtrip {
        /// Scene file to read
        input: PathBuf,

        /// Scene file to write
        output: PathBuf,

        /// Spaces per indentation level
        #[arg(long, default_value_t = 4)]
        indent: usize,

        /// Largest deviation from identity a parent inverse may have
        #[arg(long, default_value_t = 0.001)]
        tolerance: f32,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Inspect { file } => inspect(&file),
        Commands::Roundtrip {
            input,
            output,
            indent,
            tolerance,
        } => {
            let config = CodecConfig::default()
                .with_indent(indent)
                .with_parent_inverse_tolerance(tolerance);
            roundtrip(&input, &output, &config)
        }
    }
}

fn load(path: &Path) -> Result<MemoryScene> {
    let mut scene = MemoryScene::new();
    import_scene_file(path, &mut scene)
        .with_context(|| format!("Failed to import {}", path.display()))?;
    Ok(scene)
}

fn inspect(path: &Path) -> Result<()> {
    println!("Loading scene file: {}", path.display());
    let scene = load(path)?;

    println!("\n=== Scene ===");
    println!("Frame rate: {} ({:.3} fps)", scene.frame_rate(), scene.frame_rate().fps());
    println!("Objects: {}", scene.object_count());
    println!("Meshes: {}", scene.mesh_count());
    println!("Lights: {}", scene.light_count());

    println!("\n--- Meshes ---");
    for index in 0..scene.mesh_count() {
        let id = MeshId(index);
        let mesh = scene.mesh(id)?;
        println!(
            "  [{}] {} - {} vertices, {} polygons, {} material slots",
            index,
            scene.mesh_name(id)?,
            mesh.vertex_count(),
            mesh.polygon_count(),
            mesh.material_slots.len()
        );
    }

    println!("\n--- Objects ---");
    for line in describe_tree(&scene)? {
        println!("{line}");
    }
    Ok(())
}

/// One indented line per object, roots first, children below their parent.
fn describe_tree<H: HostScene>(host: &H) -> Result<Vec<String>> {
    fn walk<H: HostScene>(host: &H, objects: &[ObjectId], depth: usize, lines: &mut Vec<String>) -> Result<()> {
        for &object in objects {
            let data = match host.object_data(object)? {
                ObjectData::Mesh(mesh) => format!(" -> mesh \"{}\"", host.mesh_name(mesh)?),
                ObjectData::Light(light) => format!(" -> light \"{}\"", host.light_name(light)?),
                _ => String::new(),
            };
            let pos = host.world_matrix(object)?.transform_point3(Vec3::ZERO);
            lines.push(format!(
                "{}{}{} at ({:.2}, {:.2}, {:.2})",
                "  ".repeat(depth + 1),
                host.object_name(object)?,
                data,
                pos.x,
                pos.y,
                pos.z
            ));
            walk(host, &host.children(object)?, depth + 1, lines)?;
        }
        Ok(())
    }

    let mut lines = Vec::new();
    walk(host, &host.root_objects(), 0, &mut lines)?;
    Ok(lines)
}

fn roundtrip(input: &Path, output: &Path, config: &CodecConfig) -> Result<()> {
    let mut scene = load(input)?;
    export_scene_file(output, &mut scene, config)
        .with_context(|| format!("Failed to export {}", output.display()))?;
    println!("Wrote {} objects to {}", scene.object_count(), output.display());
    Ok(())
}
