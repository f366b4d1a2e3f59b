//! # Isomesh Extraction
//!
//! Streaming Marching Cubes isosurface extraction.
//!
//! The polygonizer sweeps a scalar field in slice order, classifies each
//! voxel cube against an isolevel, and emits an indexed triangle mesh with
//! smooth gradient-derived normals. Only a bounded window of slices is held
//! in memory, so extraction cost is independent of volume depth.

mod cache;
mod tables;

pub mod polygonize;

pub use polygonize::polygonize;
