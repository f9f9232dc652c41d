use std::path::Path;

use super::dimensions::StandardDimension;
use super::extra_bytes;
use super::{ensure_format_supported, LasCompression, LasError};
use crate::pointcloud::PointCloud;
use crate::utils;

/// Coordinate scale used when writing, on all axes.
pub const DEFAULT_SCALE: f64 = 0.00025;

/// The point format of written files: LAS 1.4 format 6 (extended, GPS time).
pub const OUTPUT_POINT_FORMAT: u8 = 6;

/// Quantization of the coordinates stored in a LAS file.
///
/// Each coordinate is stored as the integer `(value - offset) / scale`.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantizationParams {
    /// Scale on all axes.
    pub scale: f64,
    /// Offset per axis. `None` uses [`quantization_offset`] of the written cloud.
    pub offset: Option<[f64; 3]>,
}

impl Default for QuantizationParams {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            offset: None,
        }
    }
}

/// Compute the default offset of a set of points: the integer part of the mean.
///
/// The mean is truncated toward zero on each axis; an empty set yields zeros.
pub fn quantization_offset(points: &[[f64; 3]]) -> [f64; 3] {
    utils::centroid(points).map_or([0.0; 3], |mean| mean.map(f64::trunc))
}

/// Write a point cloud to a LAS or LAZ file.
///
/// The file is a LAS 1.4 point format 6 file; a `.laz` extension selects
/// compression. Attributes named after a format 6 dimension (see
/// [`StandardDimension`]) are stored natively, any other attribute is stored as an
/// `f64` extra bytes dimension declared in an Extra Bytes VLR.
///
/// # Arguments
///
/// * `path` - Path to the output `.las` or `.laz` file.
/// * `cloud` - The point cloud to write.
/// * `quantization` - Scale and offset of the stored coordinates.
///
/// # Errors
///
/// Nothing is written if an extra bytes attribute name is longer than 32 bytes
/// ([`LasError::AttributeNameTooLong`]).
pub fn write_las(
    path: impl AsRef<Path>,
    cloud: &PointCloud,
    quantization: &QuantizationParams,
) -> Result<(), LasError> {
    let path = path.as_ref();
    let compression = ensure_format_supported(path)?;

    let mut format = ::las::point::Format::new(OUTPUT_POINT_FORMAT)?;
    format.is_compressed = compression == LasCompression::Laz;

    // split the attributes between native dimensions and extra bytes
    let mut native = Vec::new();
    let mut extra = Vec::new();
    for (name, values) in cloud.attributes().into_iter().flatten() {
        match StandardDimension::from_name(name).filter(|dim| dim.is_in(&format)) {
            Some(dim) => native.push((dim, values)),
            None => extra.push((name.as_str(), values)),
        }
    }

    format.extra_bytes = u16::try_from(extra.len() * std::mem::size_of::<f64>())
        .map_err(|_| LasError::TooManyAttributes(extra.len()))?;

    let offset = quantization
        .offset
        .unwrap_or_else(|| quantization_offset(cloud.points()));
    let transform = |offset: f64| ::las::Transform {
        scale: quantization.scale,
        offset,
    };

    let mut builder = ::las::Builder::from((1, 4));
    builder.point_format = format;
    builder.transforms = ::las::Vector {
        x: transform(offset[0]),
        y: transform(offset[1]),
        z: transform(offset[2]),
    };
    if !extra.is_empty() {
        builder
            .vlrs
            .push(extra_bytes::extra_bytes_vlr(extra.iter().map(|(name, _)| *name))?);
    }
    let header = builder.into_header()?;

    log::debug!(
        "writing {} points to {} (offset {:?}, {} extra attributes)",
        cloud.len(),
        path.display(),
        offset,
        extra.len()
    );

    let mut writer = ::las::Writer::from_path(path, header)?;
    for (i, xyz) in cloud.points().iter().enumerate() {
        let mut point = ::las::Point {
            x: xyz[0],
            y: xyz[1],
            z: xyz[2],
            gps_time: Some(0.0),
            ..Default::default()
        };
        for (dim, values) in native.iter() {
            dim.write(&mut point, values[i])?;
        }
        if !extra.is_empty() {
            point.extra_bytes = extra
                .iter()
                .flat_map(|(_, values)| values[i].to_le_bytes())
                .collect();
        }
        writer.write_point(point)?;
    }
    writer.close()?;

    Ok(())
}
