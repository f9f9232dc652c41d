use std::path::Path;

use super::dimensions::StandardDimension;
use super::extra_bytes::{self, ExtraBytesDimension};
use super::{ensure_format_supported, LasError};
use crate::pointcloud::{PointAttributes, PointCloud};

/// Options for [`read_las`].
#[derive(Debug, Clone)]
pub struct LasReadOptions {
    /// Read every per-point dimension besides X, Y and Z as an attribute.
    pub with_attributes: bool,
    /// Keep every n-th point only (1 keeps all points).
    pub use_every: usize,
}

impl Default for LasReadOptions {
    fn default() -> Self {
        Self {
            with_attributes: false,
            use_every: 1,
        }
    }
}

impl LasReadOptions {
    /// Options reading coordinates and all attributes.
    pub fn with_attributes() -> Self {
        Self {
            with_attributes: true,
            ..Default::default()
        }
    }
}

// Column-wise accumulation of the attributes of the kept points.
struct AttributeColumns {
    standard: Vec<(StandardDimension, Vec<f64>)>,
    extra: Vec<(ExtraBytesDimension, Vec<f64>)>,
}

impl AttributeColumns {
    fn push(&mut self, point: &::las::Point) -> Result<(), LasError> {
        for (dim, values) in self.standard.iter_mut() {
            values.push(dim.read(point));
        }
        for (dim, values) in self.extra.iter_mut() {
            values.push(dim.decode(&point.extra_bytes)?);
        }
        Ok(())
    }

    fn into_attributes(self) -> PointAttributes {
        let standard = self
            .standard
            .into_iter()
            .map(|(dim, values)| (dim.name().to_string(), values));
        let extra = self
            .extra
            .into_iter()
            .map(|(dim, values)| (dim.name, values));
        standard.chain(extra).collect()
    }
}

/// Read a LAS or LAZ file.
///
/// # Arguments
///
/// * `path` - Path to a `.las` or `.laz` file.
/// * `options` - Whether to read attributes and the subsampling step.
///
/// # Returns
///
/// A [`PointCloud`] containing:
/// - 3D points with the scale and offset of the header applied (always)
/// - the standard dimensions of the point format and every dimension declared in
///   the Extra Bytes VLR, keyed by name (if `options.with_attributes`)
pub fn read_las(
    path: impl AsRef<Path>,
    options: &LasReadOptions,
) -> Result<PointCloud, LasError> {
    let path = path.as_ref();
    ensure_format_supported(path)?;

    if !path.exists() {
        return Err(LasError::FileDoesNotExist(path.to_path_buf()));
    }

    let mut reader = ::las::Reader::from_path(path)?;
    let header = reader.header().clone();
    let use_every = options.use_every.max(1);

    let num_points = header.number_of_points() as usize;
    log::debug!(
        "reading {} points from {} (point format {:?})",
        num_points,
        path.display(),
        header.point_format()
    );

    let mut columns = if options.with_attributes {
        let format = header.point_format();
        let standard = StandardDimension::ALL
            .into_iter()
            .filter(|dim| dim.is_in(format))
            .map(|dim| (dim, Vec::with_capacity(num_points / use_every + 1)))
            .collect();
        let extra = extra_bytes::parse_extra_bytes(header.vlrs().iter().chain(header.evlrs()))?
            .into_iter()
            .map(|dim| (dim, Vec::with_capacity(num_points / use_every + 1)))
            .collect();
        Some(AttributeColumns { standard, extra })
    } else {
        None
    };

    let mut points = Vec::with_capacity(num_points / use_every + 1);
    for (i, point) in reader.points().enumerate() {
        let point = point?;
        if i % use_every != 0 {
            continue;
        }
        points.push([point.x, point.y, point.z]);
        if let Some(columns) = columns.as_mut() {
            columns.push(&point)?;
        }
    }

    let attributes = columns.map(AttributeColumns::into_attributes);
    Ok(PointCloud::new(points, attributes)?)
}
