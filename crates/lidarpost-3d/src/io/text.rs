use std::path::{Path, PathBuf};

use crate::error::Cloud3dError;
use crate::transforms::TransformMatrix;

/// Error types for the plain text formats.
#[derive(Debug, thiserror::Error)]
pub enum TextIoError {
    /// Failed to read or write the file
    #[error("Failed to manipulate the file. {0}")]
    Io(#[from] std::io::Error),

    /// The input file does not exist
    #[error("File does not exist: {0}")]
    FileDoesNotExist(PathBuf),

    /// A value is not a decimal number
    #[error("Line {line}: cannot parse `{token}` as a number")]
    ParseFloat {
        /// 1-based line number.
        line: usize,
        /// The offending token.
        token: String,
    },

    /// A line has fewer columns than needed
    #[error("Line {line}: expected at least {expected} columns, got {actual}")]
    MissingColumns {
        /// 1-based line number.
        line: usize,
        /// The number of columns needed.
        expected: usize,
        /// The number of columns found.
        actual: usize,
    },

    /// The matrix has the wrong shape
    #[error(transparent)]
    Cloud(#[from] Cloud3dError),
}

fn parse_value(token: &str, line: usize) -> Result<f64, TextIoError> {
    token.trim().parse::<f64>().map_err(|_| TextIoError::ParseFloat {
        line,
        token: token.trim().to_string(),
    })
}

fn read_to_string(path: &Path) -> Result<String, TextIoError> {
    if !path.exists() {
        return Err(TextIoError::FileDoesNotExist(path.to_path_buf()));
    }
    Ok(std::fs::read_to_string(path)?)
}

// Non-empty lines with `#` comments stripped, paired with their 1-based number.
fn data_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.split('#').next().unwrap_or("").trim()))
        .filter(|(_, line)| !line.is_empty())
}

/// Parse the rows of a whitespace and/or comma delimited numeric matrix.
pub fn parse_matrix_rows(text: &str) -> Result<Vec<Vec<f64>>, TextIoError> {
    data_lines(text)
        .map(|(line_no, line)| {
            line.split(|c: char| c == ',' || c.is_whitespace())
                .filter(|token| !token.is_empty())
                .map(|token| parse_value(token, line_no))
                .collect::<Result<Vec<_>, _>>()
        })
        .collect()
}

/// Parse a transformation matrix from text.
///
/// At least 3 rows of at least 4 values are needed; further rows and columns
/// are ignored, so the 4x4 homogeneous form is accepted.
pub fn parse_transform_matrix(text: &str) -> Result<TransformMatrix, TextIoError> {
    let rows = parse_matrix_rows(text)?;
    Ok(TransformMatrix::try_from_rows(&rows)?)
}

/// Read a transformation matrix file (e.g. `*_trafomat.txt`).
pub fn read_transform_matrix(path: impl AsRef<Path>) -> Result<TransformMatrix, TextIoError> {
    let text = read_to_string(path.as_ref())?;
    parse_transform_matrix(&text)
}

/// Format a transform as its 4x4 homogeneous matrix.
///
/// One row per line, values separated by a single space with 15 decimals.
pub fn format_transform_matrix(transform: &TransformMatrix) -> String {
    transform
        .to_homogeneous()
        .iter()
        .map(|row| {
            let cols = row.iter().map(|v| format!("{v:.15}")).collect::<Vec<_>>();
            cols.join(" ") + "\n"
        })
        .collect()
}

/// Write a transform to a text file, see [`format_transform_matrix`].
pub fn write_transform_matrix(
    path: impl AsRef<Path>,
    transform: &TransformMatrix,
) -> Result<(), TextIoError> {
    std::fs::write(path, format_transform_matrix(transform))?;
    Ok(())
}

/// Parse a comma delimited picking list.
///
/// Every line holds a point identifier in column 0 followed by the x, y and z
/// coordinates in columns 1 to 3; further columns are ignored.
pub fn parse_picking_list(text: &str) -> Result<Vec<[f64; 3]>, TextIoError> {
    data_lines(text)
        .map(|(line_no, line)| {
            let cols = line.split(',').collect::<Vec<_>>();
            if cols.len() < 4 {
                return Err(TextIoError::MissingColumns {
                    line: line_no,
                    expected: 4,
                    actual: cols.len(),
                });
            }
            Ok([
                parse_value(cols[1], line_no)?,
                parse_value(cols[2], line_no)?,
                parse_value(cols[3], line_no)?,
            ])
        })
        .collect()
}

/// Read a picking list file, see [`parse_picking_list`].
pub fn read_picking_list(path: impl AsRef<Path>) -> Result<Vec<[f64; 3]>, TextIoError> {
    let text = read_to_string(path.as_ref())?;
    parse_picking_list(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_transform_matrix() -> Result<(), Box<dyn std::error::Error>> {
        let text = "# riegl <- livox\n\
                    0.5 0.0, 0.0 10.0\n\
                    \n\
                    0.0 1.0 0.0 -2.5 7.0\n\
                    0.0 0.0 1.0 3.0\n\
                    0.0 0.0 0.0 1.0\n";
        let transform = parse_transform_matrix(text)?;
        assert_eq!(transform.rows()[0], [0.5, 0.0, 0.0, 10.0]);
        assert_eq!(transform.translation(), [10.0, -2.5, 3.0]);
        Ok(())
    }

    #[test]
    fn test_parse_transform_matrix_errors() {
        assert!(matches!(
            parse_transform_matrix("1 0 0 0\n0 1 0 0\n"),
            Err(TextIoError::Cloud(Cloud3dError::DimensionMismatch {
                expected: 3,
                actual: 2
            }))
        ));
        assert!(matches!(
            parse_transform_matrix("1 0 0\n0 1 0\n0 0 1\n"),
            Err(TextIoError::Cloud(Cloud3dError::DimensionMismatch {
                expected: 4,
                actual: 3
            }))
        ));
        assert!(matches!(
            parse_transform_matrix("1 0 0 0\n0 one 0 0\n0 0 1 0\n"),
            Err(TextIoError::ParseFloat { line: 2, token }) if token == "one"
        ));
    }

    #[test]
    fn test_format_transform_matrix() {
        let transform = TransformMatrix::new([
            [1.0, 0.0, 0.0, 5.0],
            [0.0, 1.0, 0.0, -0.125],
            [0.0, 0.0, 1.0, 1.0 / 3.0],
        ]);
        let text = format_transform_matrix(&transform);
        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[0],
            "1.000000000000000 0.000000000000000 0.000000000000000 5.000000000000000"
        );
        assert!(lines[1].ends_with(" -0.125000000000000"));
        assert!(lines[2].ends_with(" 0.333333333333333"));
        assert_eq!(
            lines[3],
            "0.000000000000000 0.000000000000000 0.000000000000000 1.000000000000000"
        );
    }

    #[test]
    fn test_write_read_transform_matrix() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("scan_trafomat.txt");
        let transform = TransformMatrix::from_axis_angle(&[0.0, 0.0, 1.0], 0.25)?
            .compose(&TransformMatrix::new([
                [1.0, 0.0, 0.0, 100.0],
                [0.0, 1.0, 0.0, 200.0],
                [0.0, 0.0, 1.0, 3.0],
            ]));
        write_transform_matrix(&path, &transform)?;

        let read = read_transform_matrix(&path)?;
        for (a, b) in read.rows().iter().zip(transform.rows()) {
            for (va, vb) in a.iter().zip(b) {
                assert!((va - vb).abs() < 1e-12);
            }
        }
        Ok(())
    }

    #[test]
    fn test_read_transform_matrix_missing_file() {
        assert!(matches!(
            read_transform_matrix("/tmp/does_not_exist_trafomat.txt"),
            Err(TextIoError::FileDoesNotExist(_))
        ));
    }

    #[test]
    fn test_parse_picking_list() -> Result<(), Box<dyn std::error::Error>> {
        let text = "p1, 1.5, 2.5, 3.5\np2,4.0,5.0,6.0,ignored\n\n";
        let points = parse_picking_list(text)?;
        assert_eq!(points, vec![[1.5, 2.5, 3.5], [4.0, 5.0, 6.0]]);

        assert!(matches!(
            parse_picking_list("p1,1.0,2.0\n"),
            Err(TextIoError::MissingColumns {
                line: 1,
                expected: 4,
                actual: 3
            })
        ));
        Ok(())
    }
}
