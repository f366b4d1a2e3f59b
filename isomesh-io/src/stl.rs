//! Binary STL mesh writing

use crate::MeshWriter;
use byteorder::{LittleEndian, WriteBytesExt};
use isomesh_core::{Result, SurfaceMesh};
use std::io::Write;

/// Writes meshes as binary STL
///
/// STL stores one normal per facet, so face normals are recomputed from the
/// triangle geometry; the per-vertex gradient normals do not survive this
/// format. All numeric fields are little-endian regardless of host order.
pub struct StlWriter;

impl MeshWriter for StlWriter {
    fn write_mesh<W: Write>(mesh: &SurfaceMesh, writer: &mut W) -> Result<()> {
        writer.write_all(&[0u8; 80])?;
        writer.write_u32::<LittleEndian>(mesh.triangle_count() as u32)?;

        for &triangle in &mesh.triangles {
            let normal = mesh.face_normal(triangle);
            for value in [normal.x, normal.y, normal.z] {
                writer.write_f32::<LittleEndian>(value)?;
            }
            for &index in &triangle {
                let p = mesh.vertices[index as usize].position;
                for value in [p.x, p.y, p.z] {
                    writer.write_f32::<LittleEndian>(value)?;
                }
            }
            writer.write_u16::<LittleEndian>(0)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::ReadBytesExt;
    use isomesh_core::{Point3f, Vector3f, Vertex};

    #[test]
    fn test_stl_round_trip_positions() {
        let mut mesh = SurfaceMesh::new();
        mesh.add_vertex(Vertex::new(
            Point3f::new(0.0, 0.0, 0.0),
            Vector3f::new(1.0, 0.0, 0.0),
        ));
        mesh.add_vertex(Vertex::new(
            Point3f::new(1.0, 0.0, 0.0),
            Vector3f::new(0.0, 1.0, 0.0),
        ));
        mesh.add_vertex(Vertex::new(
            Point3f::new(0.0, 1.0, 0.0),
            Vector3f::new(0.0, 0.0, 1.0),
        ));
        mesh.add_triangle([0, 1, 2]);

        let mut buffer = Vec::new();
        StlWriter::write_mesh(&mesh, &mut buffer).unwrap();
        assert_eq!(buffer.len(), 84 + 50);

        let mut body = &buffer[80..];
        assert_eq!(body.read_u32::<LittleEndian>().unwrap(), 1);

        // The facet normal is recomputed from the winding, not taken from
        // the vertex normals.
        let normal: Vec<f32> = (0..3)
            .map(|_| body.read_f32::<LittleEndian>().unwrap())
            .collect();
        assert_eq!(normal, [0.0, 0.0, 1.0]);

        for &index in &mesh.triangles[0] {
            let p = mesh.vertices[index as usize].position;
            for expected in [p.x, p.y, p.z] {
                let value = body.read_f32::<LittleEndian>().unwrap();
                assert_eq!(value.to_bits(), expected.to_bits());
            }
        }
        assert_eq!(body.read_u16::<LittleEndian>().unwrap(), 0);
        assert!(body.is_empty());
    }

    #[test]
    fn test_stl_degenerate_triangle_zero_normal() {
        let mut mesh = SurfaceMesh::new();
        for _ in 0..3 {
            mesh.add_vertex(Vertex::new(Point3f::origin(), Vector3f::zeros()));
        }
        mesh.add_triangle([0, 1, 2]);

        let mut buffer = Vec::new();
        StlWriter::write_mesh(&mesh, &mut buffer).unwrap();

        let mut body = &buffer[84..];
        for _ in 0..3 {
            assert_eq!(body.read_f32::<LittleEndian>().unwrap(), 0.0);
        }
    }

    #[test]
    fn test_stl_empty_mesh() {
        let mut buffer = Vec::new();
        StlWriter::write_mesh(&SurfaceMesh::new(), &mut buffer).unwrap();
        assert_eq!(buffer.len(), 84);
        assert!(buffer[..84].iter().take(80).all(|&b| b == 0));
        assert_eq!(&buffer[80..], [0, 0, 0, 0]);
    }
}
