use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::error::ErrorKind;
use clap::Parser;

use isomesh_core::SurfaceMesh;
use isomesh_extraction::polygonize;
use isomesh_io::{write_mesh, Volume};

/// Isosurface extraction from volumetric image stacks
#[derive(Parser, Debug)]
#[command(name = "isomesh", version, about)]
struct Cli {
    /// Directory containing the TIFF slice sequence
    volume_path: PathBuf,

    /// Isosurface threshold value
    isolevel: f32,

    /// Output mesh file (.obj and .stl select those formats, anything else PLY)
    output_file: PathBuf,
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(_) => {
            eprintln!("usage: <volume_path> <isolevel> <output_file>");
            return ExitCode::FAILURE;
        }
    };

    let volume = match Volume::load(&cli.volume_path) {
        Ok(volume) => volume,
        Err(e) => {
            eprintln!("failed to load volume: {}", e);
            return ExitCode::FAILURE;
        }
    };
    log::info!(
        "loaded {}x{}x{} volume at {} bits per voxel",
        volume.width,
        volume.height,
        volume.depth,
        volume.bits_per_voxel
    );

    let mut mesh = SurfaceMesh::new();
    let start = Instant::now();
    polygonize(
        cli.isolevel,
        volume.sampler(),
        volume.width,
        volume.height,
        volume.depth,
        &mut mesh,
    );
    log::info!(
        "extracted {} vertices, {} triangles in {:.1}ms",
        mesh.vertex_count(),
        mesh.triangle_count(),
        start.elapsed().as_secs_f64() * 1000.0
    );

    if let Err(e) = write_mesh(&mesh, &cli.output_file) {
        eprintln!("failed to open output file: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
