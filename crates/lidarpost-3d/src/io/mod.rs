/// LAS/LAZ point cloud reader and writer.
pub mod las;

/// Scan metadata (`*_meta.txt`) reader.
pub mod metadata;

/// Plain text transformation matrix and picking list files.
pub mod text;
