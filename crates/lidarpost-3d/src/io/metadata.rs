use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Angular increment (degrees) of the high resolution scan setting.
pub const DEFAULT_HIGHRES_INCREMENT: f64 = 0.013;

/// Tolerance of the high resolution check.
pub const HIGHRES_TOLERANCE: f64 = 0.001;

/// Error types for the metadata module.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    /// Failed to read the file
    #[error("Failed to read metadata file. {0}")]
    Io(#[from] std::io::Error),

    /// The metadata file does not exist
    #[error("File does not exist: {0}")]
    FileDoesNotExist(PathBuf),

    /// The file has too few lines
    #[error("Metadata is missing line {0}")]
    MissingLine(usize),

    /// Names and values are not aligned
    #[error("Metadata has {names} column names but {values} values")]
    ColumnMismatch {
        /// Number of column names.
        names: usize,
        /// Number of values.
        values: usize,
    },

    /// A value is not a decimal number
    #[error("Cannot parse `{token}` as value of `{name}`")]
    ParseFloat {
        /// The column name.
        name: String,
        /// The offending token.
        token: String,
    },

    /// A required parameter is missing
    #[error("Metadata has no `{0}` column")]
    MissingField(&'static str),
}

/// Scan parameters read from a `*_meta.txt` file.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanMetadata {
    values: BTreeMap<String, f64>,
    phi_incr: f64,
    highres: bool,
}

impl ScanMetadata {
    /// Parse the content of a metadata file.
    ///
    /// Line 2 holds the whitespace separated parameter names and line 3 the values,
    /// aligned by position. The scan is flagged as high resolution when its angular
    /// increment `phi_incr` is below `highres_increment` plus [`HIGHRES_TOLERANCE`].
    pub fn parse(text: &str, highres_increment: f64) -> Result<Self, MetadataError> {
        let mut lines = text.lines().skip(1);
        let names = lines.next().ok_or(MetadataError::MissingLine(2))?;
        let values = lines.next().ok_or(MetadataError::MissingLine(3))?;

        let names = names.split_whitespace().collect::<Vec<_>>();
        let tokens = values.split_whitespace().collect::<Vec<_>>();
        if names.len() != tokens.len() {
            return Err(MetadataError::ColumnMismatch {
                names: names.len(),
                values: tokens.len(),
            });
        }

        let values = names
            .iter()
            .zip(&tokens)
            .map(|(name, token)| {
                token
                    .parse::<f64>()
                    .map(|value| (name.to_string(), value))
                    .map_err(|_| MetadataError::ParseFloat {
                        name: name.to_string(),
                        token: token.to_string(),
                    })
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        let phi_incr = *values
            .get("phi_incr")
            .ok_or(MetadataError::MissingField("phi_incr"))?;
        let highres = phi_incr - highres_increment < HIGHRES_TOLERANCE;

        Ok(Self {
            values,
            phi_incr,
            highres,
        })
    }

    /// Get a scan parameter by name.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// All scan parameters keyed by name.
    pub fn values(&self) -> &BTreeMap<String, f64> {
        &self.values
    }

    /// The angular increment of the scan.
    pub fn phi_incr(&self) -> f64 {
        self.phi_incr
    }

    /// Whether the scan was acquired at high resolution.
    pub fn highres(&self) -> bool {
        self.highres
    }
}

/// Read a scan metadata file, see [`ScanMetadata::parse`].
pub fn read_scan_metadata(
    path: impl AsRef<Path>,
    highres_increment: f64,
) -> Result<ScanMetadata, MetadataError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(MetadataError::FileDoesNotExist(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path)?;
    ScanMetadata::parse(&text, highres_increment)
}
