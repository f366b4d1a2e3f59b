//! Mesh data structures and functionality

use crate::{Point3f, Vector3f};
use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// A surface vertex with position and normal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[repr(C)]
pub struct Vertex {
    pub position: Point3f,
    pub normal: Vector3f,
}

unsafe impl Pod for Vertex {}
unsafe impl Zeroable for Vertex {}

impl Vertex {
    /// Create a new vertex from position and normal
    pub fn new(position: Point3f, normal: Vector3f) -> Self {
        Self { position, normal }
    }
}

/// An indexed triangle surface with per-vertex normals
///
/// Triangle entries index into `vertices`; indices are `u32` because that is
/// what the binary mesh formats store and what the extraction caches hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceMesh {
    pub vertices: Vec<Vertex>,
    pub triangles: Vec<[u32; 3]>,
}

impl SurfaceMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            triangles: Vec::new(),
        }
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of triangles
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Check if the mesh is empty
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.triangles.is_empty()
    }

    /// Add a vertex and return its index
    pub fn add_vertex(&mut self, vertex: Vertex) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(vertex);
        index
    }

    /// Add a triangle
    pub fn add_triangle(&mut self, triangle: [u32; 3]) {
        self.triangles.push(triangle);
    }

    /// Calculate the faceted normal of one triangle
    ///
    /// Cross product of the triangle edges, unit-normalized. Degenerate
    /// triangles (squared area below 1e-6) yield the zero vector.
    pub fn face_normal(&self, triangle: [u32; 3]) -> Vector3f {
        let a = self.vertices[triangle[0] as usize].position;
        let b = self.vertices[triangle[1] as usize].position;
        let c = self.vertices[triangle[2] as usize].position;

        let n = (b - a).cross(&(c - a));
        let sqr_len = n.norm_squared();
        if sqr_len > 1e-6 {
            n / sqr_len.sqrt()
        } else {
            Vector3f::zeros()
        }
    }

    /// Clear the mesh
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.triangles.clear();
    }
}

impl Default for SurfaceMesh {
    fn default() -> Self {
        Self::new()
    }
}
