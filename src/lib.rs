//! # Isomesh
//!
//! Isosurface extraction from volumetric image stacks.
//!
//! This is the umbrella crate that provides convenient access to all isomesh
//! functionality. You can use this crate to get everything in one place, or
//! use individual crates for more granular control over dependencies.
//!
//! ## Quick Start
//!
//! ```rust
//! use isomesh::prelude::*;
//!
//! // A sphere of squared distances around the grid center
//! let field = |x: u32, y: u32, z: u32| {
//!     let d = |v: u32| v as f32 - 8.0;
//!     d(x) * d(x) + d(y) * d(y) + d(z) * d(z)
//! };
//!
//! let mut mesh = SurfaceMesh::new();
//! polygonize(25.0, field, 17, 17, 17, &mut mesh);
//! assert!(!mesh.is_empty());
//! ```

// Re-export core functionality
pub use isomesh_core::*;

// Re-export sub-crates
pub use isomesh_extraction as extraction;
pub use isomesh_io as io;

/// Convenient imports for common use cases
pub mod prelude {
    pub use isomesh_core::*;
    pub use isomesh_extraction::polygonize;
    pub use isomesh_io::{write_mesh, MeshWriter, Volume};
}
