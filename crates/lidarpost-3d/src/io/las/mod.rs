mod dimensions;
mod extra_bytes;
mod reader;
mod writer;

use std::path::{Path, PathBuf};

pub use dimensions::StandardDimension;
pub use reader::*;
pub use writer::*;

use crate::error::Cloud3dError;

/// Error types for the LAS module.
#[derive(Debug, thiserror::Error)]
pub enum LasError {
    /// Failed to read or write the file
    #[error("Failed to manipulate the file. {0}")]
    Io(#[from] std::io::Error),

    /// The las crate failed to encode or decode the file
    #[error("Failed to process LAS data. {0}")]
    Las(#[from] ::las::Error),

    /// The input file does not exist
    #[error("File does not exist: {0}")]
    FileDoesNotExist(PathBuf),

    /// Invalid LAS file extension
    #[error("Invalid LAS file extension. Got:{0}")]
    InvalidFileExtension(String),

    /// A format needs support that was not compiled in
    #[error("Missing dependency: support for `{0}` is not enabled in this build")]
    MissingDependency(&'static str),

    /// Unsupported extra bytes data type
    #[error("Unsupported extra bytes data type {0}")]
    UnsupportedExtraBytes(u8),

    /// Malformed extra bytes record
    #[error("Malformed extra bytes record")]
    MalformedExtraBytes,

    /// An extra bytes attribute name does not fit into its 32 byte descriptor field
    #[error("Attribute name `{0}` is longer than 32 bytes")]
    AttributeNameTooLong(String),

    /// Too many attributes to fit into the point record
    #[error("Too many extra attributes: {0}")]
    TooManyAttributes(usize),

    /// The point cloud is inconsistent
    #[error(transparent)]
    Cloud(#[from] Cloud3dError),
}

/// The container variant selected by the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LasCompression {
    /// Plain `.las`
    None,
    /// Compressed `.laz`
    Laz,
}

/// Check that a path names a LAS container this build can handle.
///
/// # Errors
///
/// * [`LasError::InvalidFileExtension`] if the extension is neither `las` nor `laz`.
/// * [`LasError::MissingDependency`] if the path is a `.laz` file and the crate was
///   built without the `laz` feature.
pub fn ensure_format_supported(path: impl AsRef<Path>) -> Result<LasCompression, LasError> {
    let ext = path
        .as_ref()
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase());

    match ext.as_deref() {
        Some("las") => Ok(LasCompression::None),
        Some("laz") if cfg!(feature = "laz") => Ok(LasCompression::Laz),
        Some("laz") => Err(LasError::MissingDependency("laz")),
        Some(other) => Err(LasError::InvalidFileExtension(other.to_string())),
        None => Err(LasError::InvalidFileExtension("".into())),
    }
}

/// Check whether a path has a `.las` or `.laz` extension.
pub fn is_las_path(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .extension()
        .map(|ext| {
            let ext = ext.to_string_lossy().to_ascii_lowercase();
            ext == "las" || ext == "laz"
        })
        .unwrap_or(false)
}
