use std::path::{Path, PathBuf};

use lidarpost_3d::clean::remove_zero_points;
use lidarpost_3d::error::Cloud3dError;
use lidarpost_3d::estimate::{fit_affine_transform, AffineFit};
use lidarpost_3d::io::las::{
    is_las_path, read_las, write_las, LasError, LasReadOptions, QuantizationParams,
};
use lidarpost_3d::io::metadata::{
    read_scan_metadata, MetadataError, ScanMetadata, DEFAULT_HIGHRES_INCREMENT,
};
use lidarpost_3d::io::text::{
    read_picking_list, read_transform_matrix, write_transform_matrix, TextIoError,
};
use lidarpost_3d::linalg::transform_pointcloud;
use lidarpost_3d::pointcloud::PointCloud;

/// Suffix of the scan metadata file next to a point cloud.
pub const METADATA_SUFFIX: &str = "_meta.txt";

/// Suffix of the transformation matrix file next to a point cloud.
pub const TRAFOMAT_SUFFIX: &str = "_trafomat.txt";

/// Suffix inserted before the extension of cleaned point clouds.
pub const CORRECTED_SUFFIX: &str = "_corr";

/// Error types for the workflows.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// Failed to list a directory
    #[error("Failed to manipulate the file. {0}")]
    Io(#[from] std::io::Error),

    /// The input point cloud does not exist
    #[error("Specified input point cloud cannot be accessed: {0}")]
    InputDoesNotExist(PathBuf),

    /// The path has no file name to derive a sibling from
    #[error("Cannot derive a file name from {0}")]
    InvalidPath(PathBuf),

    /// Reading or writing a point cloud failed
    #[error(transparent)]
    Las(#[from] LasError),

    /// Reading or writing a text file failed
    #[error(transparent)]
    Text(#[from] TextIoError),

    /// Reading the scan metadata failed
    #[error(transparent)]
    Metadata(#[from] MetadataError),

    /// A point cloud computation failed
    #[error(transparent)]
    Cloud(#[from] Cloud3dError),
}

/// Derive a file next to `input` by replacing its extension with `suffix`.
///
/// `scans/161113_000123.laz` with suffix `_meta.txt` gives
/// `scans/161113_000123_meta.txt`.
pub fn sibling_path(input: impl AsRef<Path>, suffix: &str) -> Result<PathBuf, WorkflowError> {
    let input = input.as_ref();
    let stem = input
        .file_stem()
        .ok_or_else(|| WorkflowError::InvalidPath(input.to_path_buf()))?;

    let mut file_name = stem.to_os_string();
    file_name.push(suffix);
    Ok(input.with_file_name(file_name))
}

/// The scan metadata file of a point cloud, `<stem>_meta.txt`.
pub fn metadata_path(input: impl AsRef<Path>) -> Result<PathBuf, WorkflowError> {
    sibling_path(input, METADATA_SUFFIX)
}

/// The transformation matrix file of a point cloud, `<stem>_trafomat.txt`.
pub fn trafomat_path(input: impl AsRef<Path>) -> Result<PathBuf, WorkflowError> {
    sibling_path(input, TRAFOMAT_SUFFIX)
}

/// The output of cleaning a point cloud, `<stem>_corr.<ext>`.
pub fn corrected_path(input: impl AsRef<Path>) -> Result<PathBuf, WorkflowError> {
    let input = input.as_ref();
    match input.extension() {
        Some(ext) => sibling_path(
            input,
            &format!("{CORRECTED_SUFFIX}.{}", ext.to_string_lossy()),
        ),
        None => sibling_path(input, CORRECTED_SUFFIX),
    }
}

fn ensure_input_exists(input: &Path) -> Result<(), WorkflowError> {
    if !input.is_file() {
        return Err(WorkflowError::InputDoesNotExist(input.to_path_buf()));
    }
    Ok(())
}

/// Remove the zero points of a LAS or LAZ file.
///
/// All attributes are read and kept aligned with the remaining points.
///
/// # Arguments
///
/// * `input` - Path to the point cloud to clean.
/// * `output` - Where to write the cleaned cloud, if anywhere.
///
/// # Returns
///
/// The cleaned point cloud.
pub fn clean_las_file(
    input: impl AsRef<Path>,
    output: Option<&Path>,
) -> Result<PointCloud, WorkflowError> {
    let input = input.as_ref();
    ensure_input_exists(input)?;

    let cloud = read_las(input, &LasReadOptions::with_attributes())?;
    let cleaned = remove_zero_points(&cloud);
    log::debug!(
        "{}: kept {} of {} points",
        input.display(),
        cleaned.len(),
        cloud.len()
    );

    if let Some(output) = output {
        write_las(output, &cleaned, &QuantizationParams::default())?;
    }

    Ok(cleaned)
}

/// The outcome of cleaning one file of a directory.
#[derive(Debug)]
pub struct CleanedFile {
    /// The input point cloud.
    pub input: PathBuf,
    /// The written cleaned point cloud, or the reason it was not written.
    pub result: Result<PathBuf, WorkflowError>,
}

/// Clean every `.las` and `.laz` file of a directory.
///
/// Each file is written to its [`corrected_path`]. Files that already carry the
/// `_corr` suffix are skipped. A failure on one file is logged and recorded in
/// its [`CleanedFile`] while the remaining files are still processed.
///
/// # Errors
///
/// Only listing the directory itself can fail.
pub fn clean_directory(dir: impl AsRef<Path>) -> Result<Vec<CleanedFile>, WorkflowError> {
    let mut inputs = std::fs::read_dir(dir.as_ref())?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<Result<Vec<_>, _>>()?;
    inputs.retain(|path| path.is_file() && is_las_path(path));
    inputs.sort();

    let mut cleaned = Vec::with_capacity(inputs.len());
    for input in inputs {
        let is_corrected = input
            .file_stem()
            .map(|stem| stem.to_string_lossy().ends_with(CORRECTED_SUFFIX))
            .unwrap_or(false);
        if is_corrected {
            log::debug!("skipping already cleaned file {}", input.display());
            continue;
        }

        let result = corrected_path(&input).and_then(|output| {
            clean_las_file(&input, Some(&output))?;
            Ok(output)
        });
        if let Err(err) = &result {
            log::warn!("failed to clean {}: {}", input.display(), err);
        }
        cleaned.push(CleanedFile { input, result });
    }

    Ok(cleaned)
}

/// Options of [`transform_las_file`].
#[derive(Debug, Clone)]
pub struct TransformOptions {
    /// Scan metadata file. Defaults to the [`metadata_path`] of the input.
    pub metadata: Option<PathBuf>,
    /// Transformation matrix file. Defaults to the [`trafomat_path`] of the input.
    pub trafomat: Option<PathBuf>,
    /// Angular increment of the high resolution setting.
    pub highres_increment: f64,
    /// How to read the input point cloud.
    pub read: LasReadOptions,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            metadata: None,
            trafomat: None,
            highres_increment: DEFAULT_HIGHRES_INCREMENT,
            read: LasReadOptions::with_attributes(),
        }
    }
}

/// Summary of a [`transform_las_file`] run.
#[derive(Debug, Clone)]
pub struct TransformReport {
    /// The scan parameters of the input.
    pub metadata: ScanMetadata,
    /// Number of points read from the input.
    pub points_read: usize,
    /// The written point cloud.
    pub output: PathBuf,
}

/// Transform a LAS or LAZ file into another coordinate frame.
///
/// Reads the scan metadata, the point cloud and the transformation matrix, applies
/// the matrix to every point and writes the result with the attributes that were
/// read.
///
/// # Arguments
///
/// * `input` - The point cloud to transform.
/// * `output` - Path to the output `.las` or `.laz` file.
/// * `options` - Side file locations and read options.
pub fn transform_las_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    options: &TransformOptions,
) -> Result<TransformReport, WorkflowError> {
    let (input, output) = (input.as_ref(), output.as_ref());
    ensure_input_exists(input)?;

    let metadata_file = match &options.metadata {
        Some(path) => path.clone(),
        None => metadata_path(input)?,
    };
    let metadata = read_scan_metadata(&metadata_file, options.highres_increment)?;

    let cloud = read_las(input, &options.read)?;
    let points_read = cloud.len();

    let trafomat_file = match &options.trafomat {
        Some(path) => path.clone(),
        None => trafomat_path(input)?,
    };
    let transform = read_transform_matrix(&trafomat_file)?;
    log::debug!("transforming {} points with {:?}", points_read, transform);

    let transformed = transform_pointcloud(&cloud, &transform)?;
    write_las(output, &transformed, &QuantizationParams::default())?;

    Ok(TransformReport {
        metadata,
        points_read,
        output: output.to_path_buf(),
    })
}

/// Estimate the transform between two picking lists and save it.
///
/// # Arguments
///
/// * `source_list` - Picking list of the points in the source frame.
/// * `target_list` - Picking list of the same points in the target frame.
/// * `output` - Where to write the 4x4 transformation matrix.
///
/// # Returns
///
/// The fit, including its singular values, rank and residual.
pub fn compute_transformation_matrix(
    source_list: impl AsRef<Path>,
    target_list: impl AsRef<Path>,
    output: impl AsRef<Path>,
) -> Result<AffineFit, WorkflowError> {
    let points_in_src = read_picking_list(source_list)?;
    let points_in_dst = read_picking_list(target_list)?;

    let fit = fit_affine_transform(&points_in_src, &points_in_dst)?;
    log::debug!("fit rmse {:.6} over {} points", fit.rmse, points_in_src.len());

    write_transform_matrix(output, &fit.transform)?;
    Ok(fit)
}
