//! Streaming Marching Cubes sweep
//!
//! Extraction walks the grid in Z-major, Y-major, X-major order. For each
//! cube it classifies the eight corner samples against the isolevel, looks
//! up the crossed edges, and either reuses the mesh vertex already created
//! on a shared edge or interpolates a new one. Triangles come out of the
//! packed case table with degenerate entries dropped.

use isomesh_core::{Point3f, SurfaceMesh, Vector3f, Vertex};

use crate::cache::{VertexCache, VoxelCache, INVALID_INDEX};
use crate::tables::{corner_offset, edge_corners, edge_direction, EDGE_TABLE, TRIANGLE_TABLE};

/// Extracts an isosurface from a scalar field.
///
/// Sweeps the `width` x `height` x `depth` sample lattice and appends the
/// extracted vertices and triangles to `mesh`. The sampler must be total
/// over `[0, width) x [0, height) x [0, depth)` and is never called outside
/// that range. The output is mapped into the cube `[-1, 1]` along the
/// longest axis, with the same scale on the shorter axes so aspect ratio is
/// preserved.
///
/// Vertex normals are unit-length interpolated field gradients; in regions
/// where the gradient vanishes the normal is the zero vector. Output is
/// deterministic: identical inputs produce identical vertex and triangle
/// sequences. Auxiliary memory is proportional to one slice area,
/// independent of `depth`.
///
/// See Bourke, P. (1994), "Polygonising a scalar field".
pub fn polygonize<S>(
    isolevel: f32,
    sample: S,
    width: u32,
    height: u32,
    depth: u32,
    mesh: &mut SurfaceMesh,
) where
    S: Fn(u32, u32, u32) -> f32,
{
    let max = [width.max(1) - 1, height.max(1) - 1, depth.max(1) - 1];

    let scale = 2.0 / max[0].max(max[1]).max(max[2]) as f32;
    let transform = |v: u32| v as f32 * scale - 1.0;

    let mut voxels = VoxelCache::new(width, height);
    let mut vertex_cache = VertexCache::new(width, height);

    // The window must hold a cube's base slice and its successor before
    // classification can begin.
    if depth > 0 {
        voxels.fill_slice(0, &sample);
    }
    if depth > 1 {
        voxels.fill_slice(1, &sample);
    }

    // Transformed Z of the top corners of the most recently completed
    // layer. Cache hits referencing vertices below this are expired.
    let mut min_cached_vertex_z = f32::NEG_INFINITY;

    // Lattice and transformed coordinates of the current cube's corners.
    // Y and Z components are invariant across the inner loops and updated
    // per row and per layer; X components are filled in the edge pass for
    // just the two corners an edge needs.
    let mut corners = [[0u32; 3]; 8];
    let mut transformed = [[0f32; 3]; 8];

    for z in 0..max[2] {
        if z + 2 < depth {
            voxels.fill_slice(z + 2, &sample);
        }

        for i in 0..8u32 {
            let (_, _, dz) = corner_offset(i);
            corners[i as usize][2] = z + dz;
            transformed[i as usize][2] = transform(z + dz);
        }

        for y in 0..max[1] {
            for i in 0..8u32 {
                let (_, dy, _) = corner_offset(i);
                corners[i as usize][1] = y + dy;
                transformed[i as usize][1] = transform(y + dy);
            }

            for x in 0..max[0] {
                let mut cube_config = 0usize;
                for i in 0..8u32 {
                    let (dx, dy, dz) = corner_offset(i);
                    let value = voxels.get(x + dx, y + dy, z + dz);
                    cube_config |= usize::from(value < isolevel) << i;
                }

                let edge_case = EDGE_TABLE[cube_config];
                if edge_case == 0 {
                    continue;
                }

                let mut edge_vertices = [INVALID_INDEX; 12];
                for edge in 0..12u32 {
                    if edge_case & (1 << edge) == 0 {
                        continue;
                    }

                    let (v1, v2) = edge_corners(edge);

                    // The edge is owned by its first corner's lattice
                    // vertex; together with the edge axis that identifies
                    // the crossing uniquely across neighboring cubes.
                    let (dx1, dy1, dz1) = corner_offset(v1);
                    let lattice_index = (x + dx1) as usize
                        + width as usize * ((y + dy1) as usize + height as usize * (z + dz1) as usize);
                    let direction = edge_direction(edge);

                    let cached = vertex_cache.get(lattice_index, direction);
                    if cached != INVALID_INDEX
                        && mesh.vertices[cached as usize].position.z >= min_cached_vertex_z
                    {
                        edge_vertices[edge as usize] = cached;
                        continue;
                    }

                    // No live cache entry: interpolate a new vertex. Only
                    // the two endpoint corners need X coordinates.
                    for corner in [v1, v2] {
                        let (dx, _, _) = corner_offset(corner);
                        corners[corner as usize][0] = x + dx;
                        transformed[corner as usize][0] = transform(x + dx);
                    }

                    let c1 = corners[v1 as usize];
                    let c2 = corners[v2 as usize];
                    let p1 = transformed[v1 as usize];
                    let p2 = transformed[v2 as usize];

                    let value1 = voxels.get(c1[0], c1[1], c1[2]);
                    let value2 = voxels.get(c2[0], c2[1], c2[2]);

                    let t = if (value1 - value2).abs() < 1e-6 {
                        0.5
                    } else {
                        (isolevel - value1) / (value2 - value1)
                    };

                    let position = Point3f::new(
                        (p2[0] - p1[0]) * t + p1[0],
                        (p2[1] - p1[1]) * t + p1[1],
                        (p2[2] - p1[2]) * t + p1[2],
                    );

                    let g1 = voxels.gradient(c1[0], c1[1], c1[2], max);
                    let g2 = voxels.gradient(c2[0], c2[1], c2[2], max);
                    let gradient = g1 + (g2 - g1) * t;

                    let sqr_len = gradient.norm_squared();
                    let normal = if sqr_len > 1e-6 {
                        gradient / sqr_len.sqrt()
                    } else {
                        Vector3f::zeros()
                    };

                    let index = mesh.add_vertex(Vertex::new(position, normal));
                    vertex_cache.insert(lattice_index, direction, index);
                    edge_vertices[edge as usize] = index;
                }

                let mut triangulation = TRIANGLE_TABLE[cube_config];
                let mut nibbles = 0;
                while triangulation & 0xf != 0xf && nibbles < 15 {
                    let a = edge_vertices[(triangulation & 0xf) as usize];
                    let b = edge_vertices[(triangulation >> 4 & 0xf) as usize];
                    let c = edge_vertices[(triangulation >> 8 & 0xf) as usize];
                    triangulation >>= 12;
                    nibbles += 3;

                    if a != b && a != c && b != c {
                        mesh.add_triangle([a, b, c]);
                    }
                }
            }
        }

        // Everything below the top corners of the finished layer is final;
        // older cache entries that alias a slot from here on are stale.
        min_cached_vertex_z = transformed[7][2];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn extract<S>(isolevel: f32, sample: S, dims: (u32, u32, u32)) -> SurfaceMesh
    where
        S: Fn(u32, u32, u32) -> f32,
    {
        let mut mesh = SurfaceMesh::new();
        polygonize(isolevel, sample, dims.0, dims.1, dims.2, &mut mesh);
        mesh
    }

    fn assert_mesh_invariants(mesh: &SurfaceMesh) {
        for triangle in &mesh.triangles {
            for &index in triangle {
                assert!((index as usize) < mesh.vertex_count());
            }
            assert!(triangle[0] != triangle[1]);
            assert!(triangle[0] != triangle[2]);
            assert!(triangle[1] != triangle[2]);
        }
        for vertex in &mesh.vertices {
            let len = vertex.normal.norm();
            assert!(len == 0.0 || (len - 1.0).abs() < 1e-5, "normal length {}", len);
        }
    }

    #[test]
    fn test_field_below_isolevel_emits_nothing() {
        let mesh = extract(0.5, |_, _, _| 0.0, (4, 4, 4));
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.triangle_count(), 0);
    }

    #[test]
    fn test_field_above_isolevel_emits_nothing() {
        let mesh = extract(0.5, |_, _, _| 1.0, (4, 4, 4));
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.triangle_count(), 0);
    }

    #[test]
    fn test_degenerate_dimensions_emit_nothing() {
        // A sweep needs two slices per axis; anything thinner is empty.
        // The sampler must still never be called out of range.
        for dims in [(0, 0, 0), (1, 1, 1), (4, 4, 1), (1, 4, 4), (16, 1, 16)] {
            let mesh = extract(
                0.5,
                |x, y, z| {
                    assert!(x < dims.0 && y < dims.1 && z < dims.2);
                    1.0
                },
                dims,
            );
            assert!(mesh.vertices.is_empty() && mesh.triangles.is_empty());
        }
    }

    #[test]
    fn test_plane_shares_vertices_across_cubes() {
        // The plane x = 0.5 crosses one +X edge per (y, z) lattice vertex:
        // sharing must yield exactly height * depth vertices, two triangles
        // per crossed cube.
        let mesh = extract(0.5, |x, _, _| x as f32, (4, 3, 5));
        assert_eq!(mesh.vertex_count(), 3 * 5);
        assert_eq!(mesh.triangle_count(), 2 * 2 * 4);
        assert_mesh_invariants(&mesh);

        // Every vertex sits strictly inside its X edge, at lattice Y and Z.
        let scale = 2.0 / 4.0;
        for vertex in &mesh.vertices {
            assert_relative_eq!(vertex.position.x, 0.5 * scale - 1.0, epsilon = 1e-5);
            let y = (vertex.position.y + 1.0) / scale;
            let z = (vertex.position.z + 1.0) / scale;
            assert_relative_eq!(y, y.round(), epsilon = 1e-5);
            assert_relative_eq!(z, z.round(), epsilon = 1e-5);
            assert_relative_eq!(vertex.normal.x, -1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_half_space_plane() {
        let mesh = extract(1.5, |x, _, _| x as f32, (4, 4, 4));

        // A 3x3 quad grid on the plane x = 1.5: 16 shared vertices, 18
        // triangles.
        assert_eq!(mesh.vertex_count(), 16);
        assert_eq!(mesh.triangle_count(), 18);
        assert_mesh_invariants(&mesh);

        let scale = 2.0 / 3.0;
        for vertex in &mesh.vertices {
            assert_relative_eq!(vertex.position.x, 1.5 * scale - 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_single_voxel_blob() {
        // One hot voxel in a 3^3 grid produces an octahedron around the
        // center: six shared vertices, one triangle per surrounding cube.
        let hot = |x: u32, y: u32, z: u32| ((x, y, z) == (1, 1, 1)) as u32 as f32;
        let mesh = extract(0.5, hot, (3, 3, 3));

        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.triangle_count(), 8);
        assert_mesh_invariants(&mesh);

        // The center maps to the origin; crossings sit halfway out along
        // each axis with normals pointing away from the center.
        for vertex in &mesh.vertices {
            let p = vertex.position;
            let sorted = {
                let mut a = [p.x.abs(), p.y.abs(), p.z.abs()];
                a.sort_by(f32::total_cmp);
                a
            };
            assert_relative_eq!(sorted[0], 0.0, epsilon = 1e-5);
            assert_relative_eq!(sorted[1], 0.0, epsilon = 1e-5);
            assert_relative_eq!(sorted[2], 0.5, epsilon = 1e-5);

            let outward = vertex.normal.dot(&(p - Point3f::origin()));
            assert!(outward > 0.0, "normal points inward at {:?}", p);
        }
    }

    #[test]
    fn test_diagonal_ramp_normals() {
        let mesh = extract(3.0, |x, y, z| (x + y + z) as f32, (5, 5, 5));
        assert!(!mesh.is_empty());
        assert_mesh_invariants(&mesh);

        let expected = Vector3f::new(-1.0, -1.0, -1.0).normalize();
        for vertex in &mesh.vertices {
            assert!(
                vertex.normal.dot(&expected) > 0.9,
                "normal {:?} deviates from the ramp direction",
                vertex.normal
            );
        }
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let field = |x: u32, y: u32, z: u32| {
            let dx = x as f32 - 3.0;
            let dy = y as f32 - 3.0;
            let dz = z as f32 - 3.0;
            (dx * dx + dy * dy + dz * dz).sqrt()
        };

        let first = extract(2.5, field, (7, 7, 7));
        let second = extract(2.5, field, (7, 7, 7));
        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn test_sphere_is_closed() {
        // On a closed surface every undirected edge borders exactly two
        // triangles.
        let field = |x: u32, y: u32, z: u32| {
            let dx = x as f32 - 4.0;
            let dy = y as f32 - 4.0;
            let dz = z as f32 - 4.0;
            dx * dx + dy * dy + dz * dz
        };
        let mesh = extract(6.0, field, (9, 9, 9));
        assert!(!mesh.is_empty());
        assert_mesh_invariants(&mesh);

        let mut edge_uses = std::collections::HashMap::new();
        for triangle in &mesh.triangles {
            for i in 0..3 {
                let a = triangle[i];
                let b = triangle[(i + 1) % 3];
                *edge_uses.entry((a.min(b), a.max(b))).or_insert(0u32) += 1;
            }
        }
        for (edge, uses) in edge_uses {
            assert_eq!(uses, 2, "open edge {:?}", edge);
        }
    }
}
