//! Core data structures for isomesh
//!
//! This crate provides the fundamental types shared by the extraction and
//! I/O crates: mesh vertices, indexed triangle surfaces, and error types.

pub mod mesh;
pub mod error;

pub use mesh::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3};

/// A 3D point with floating point coordinates
pub type Point3f = Point3<f32>;

/// A 3D vector with floating point components
pub type Vector3f = Vector3<f32>;

/// Common result type for isomesh operations
pub type Result<T> = std::result::Result<T, Error>;
