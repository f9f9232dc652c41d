/// An error type for the point cloud algorithms.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum Cloud3dError {
    /// Two arrays that must agree in shape do not.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// The expected length.
        expected: usize,
        /// The length that was provided.
        actual: usize,
    },

    /// An attribute does not have one value per point.
    #[error("Attribute `{name}` has {actual} values but the cloud has {expected} points")]
    AttributeLengthMismatch {
        /// The attribute name.
        name: String,
        /// The number of points in the cloud.
        expected: usize,
        /// The number of values in the attribute.
        actual: usize,
    },

    /// The source points do not constrain all affine degrees of freedom.
    #[error("Source points are degenerate: numerical rank {rank} of {required}")]
    RankDeficient {
        /// The numerical rank of the homogeneous source matrix.
        rank: usize,
        /// The rank needed for a unique solution.
        required: usize,
    },

    /// The linear block of a transform cannot be inverted.
    #[error("Transform is singular (determinant {0:e})")]
    Singular(f64),

    /// A rotation axis of zero length was given.
    #[error("Cannot compute rotation matrix from a zero vector")]
    ZeroAxis,
}
