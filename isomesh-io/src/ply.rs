//! Stanford PLY mesh writing

use crate::MeshWriter;
use byteorder::{NativeEndian, WriteBytesExt};
use isomesh_core::{Result, SurfaceMesh};
use std::io::Write;

/// Writes meshes as binary PLY in host byte order
///
/// The header declares the host endianness, six float properties per vertex
/// (position then normal), and uchar-counted uint32 index lists per face.
/// Vertex records match the in-memory vertex layout, so they are written in
/// one pass without conversion.
pub struct PlyWriter;

impl MeshWriter for PlyWriter {
    fn write_mesh<W: Write>(mesh: &SurfaceMesh, writer: &mut W) -> Result<()> {
        let order = if cfg!(target_endian = "big") {
            "big"
        } else {
            "little"
        };
        write!(
            writer,
            "ply\n\
             format binary_{}_endian 1.0\n\
             element vertex {}\n\
             property float x\n\
             property float y\n\
             property float z\n\
             property float nx\n\
             property float ny\n\
             property float nz\n\
             element face {}\n\
             property list uchar uint32 vertex_indices\n\
             end_header\n",
            order,
            mesh.vertex_count(),
            mesh.triangle_count(),
        )?;

        writer.write_all(bytemuck::cast_slice(&mesh.vertices))?;

        for triangle in &mesh.triangles {
            writer.write_u8(3)?;
            for &index in triangle {
                writer.write_u32::<NativeEndian>(index)?;
            }
        }
        Ok(())
    }
}
