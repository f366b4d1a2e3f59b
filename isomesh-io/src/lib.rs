//! I/O operations for isomesh
//!
//! This crate loads voxel volumes from TIFF image stacks and serializes
//! extracted surfaces to Wavefront OBJ, Stanford PLY, and binary STL.

pub mod volume;
pub mod obj;
pub mod ply;
pub mod stl;

pub use volume::Volume;
pub use obj::ObjWriter;
pub use ply::PlyWriter;
pub use stl::StlWriter;

use isomesh_core::{Result, SurfaceMesh};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Trait for writing meshes to a byte stream
pub trait MeshWriter {
    fn write_mesh<W: Write>(mesh: &SurfaceMesh, writer: &mut W) -> Result<()>;
}

/// Write a mesh to a file, selecting the format from the extension
///
/// `.obj` selects Wavefront text and `.stl` binary STL; any other extension
/// selects binary PLY. The match is case-sensitive.
pub fn write_mesh<P: AsRef<Path>>(mesh: &SurfaceMesh, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    match path.extension().and_then(|e| e.to_str()) {
        Some("obj") => ObjWriter::write_mesh(mesh, &mut writer)?,
        Some("stl") => StlWriter::write_mesh(mesh, &mut writer)?,
        _ => PlyWriter::write_mesh(mesh, &mut writer)?,
    }

    writer.flush()?;
    Ok(())
}
