#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use lidarpost_3d as l3d;

/// File level processing steps built on top of [`l3d`].
pub mod workflows;
