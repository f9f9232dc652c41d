#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Removal of degenerate zero-coordinate points.
pub mod clean;

/// Error types shared by the point cloud algorithms.
pub mod error;

/// Affine transform estimation from point correspondences.
pub mod estimate;

/// I/O utilities for reading and writing point clouds and their side files.
pub mod io;

/// Linear algebra utilities.
pub mod linalg;

/// Point cloud container with per-point attributes.
pub mod pointcloud;

/// 3D transform types.
pub mod transforms;

mod utils;

pub use error::Cloud3dError;
