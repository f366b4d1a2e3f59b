//! Wavefront OBJ mesh writing

use crate::MeshWriter;
use isomesh_core::{Result, SurfaceMesh};
use std::io::Write;

/// Writes meshes as Wavefront OBJ text
///
/// One `v` line per vertex, then one `vn` line per vertex in the same
/// order, then one `f` face line per triangle with 1-based
/// position//normal index pairs.
pub struct ObjWriter;

impl MeshWriter for ObjWriter {
    fn write_mesh<W: Write>(mesh: &SurfaceMesh, writer: &mut W) -> Result<()> {
        for vertex in &mesh.vertices {
            let p = vertex.position;
            writeln!(writer, "v {} {} {}", p.x, p.y, p.z)?;
        }
        for vertex in &mesh.vertices {
            let n = vertex.normal;
            writeln!(writer, "vn {} {} {}", n.x, n.y, n.z)?;
        }
        for &[a, b, c] in &mesh.triangles {
            writeln!(writer, "f {0}//{0} {1}//{1} {2}//{2}", a + 1, b + 1, c + 1)?;
        }
        Ok(())
    }
}
