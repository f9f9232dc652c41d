use std::collections::BTreeMap;

use crate::error::Cloud3dError;
use crate::utils;

/// Named per-point scalar attributes, one value per point in point order.
pub type PointAttributes = BTreeMap<String, Vec<f64>>;

/// A point cloud with points and optional per-point attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloud {
    // The points in the point cloud.
    points: Vec<[f64; 3]>,
    // The attributes of the points, keyed by name.
    attributes: Option<PointAttributes>,
}

impl PointCloud {
    /// Create a new point cloud from points and attributes (optional).
    ///
    /// # Errors
    ///
    /// Returns [`Cloud3dError::AttributeLengthMismatch`] if any attribute does not
    /// carry exactly one value per point.
    pub fn new(
        points: Vec<[f64; 3]>,
        attributes: Option<PointAttributes>,
    ) -> Result<Self, Cloud3dError> {
        if let Some(attributes) = &attributes {
            for (name, values) in attributes {
                if values.len() != points.len() {
                    return Err(Cloud3dError::AttributeLengthMismatch {
                        name: name.clone(),
                        expected: points.len(),
                        actual: values.len(),
                    });
                }
            }
        }
        Ok(Self { points, attributes })
    }

    /// Create a point cloud holding coordinates only.
    pub fn from_points(points: Vec<[f64; 3]>) -> Self {
        Self {
            points,
            attributes: None,
        }
    }

    /// Get the number of points in the point cloud.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the point cloud is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Get as reference the points in the point cloud.
    pub fn points(&self) -> &[[f64; 3]] {
        &self.points
    }

    /// Get as reference the attributes of the points in the point cloud.
    pub fn attributes(&self) -> Option<&PointAttributes> {
        self.attributes.as_ref()
    }

    /// Get the values of a single attribute.
    pub fn attribute(&self, name: &str) -> Option<&[f64]> {
        self.attributes
            .as_ref()
            .and_then(|attributes| attributes.get(name))
            .map(Vec::as_slice)
    }

    /// Consume the cloud and return its points and attributes.
    pub fn into_parts(self) -> (Vec<[f64; 3]>, Option<PointAttributes>) {
        (self.points, self.attributes)
    }

    /// Replace the points keeping the attributes.
    ///
    /// # Errors
    ///
    /// Returns [`Cloud3dError::DimensionMismatch`] if the number of points changes.
    pub fn with_points(self, points: Vec<[f64; 3]>) -> Result<Self, Cloud3dError> {
        if points.len() != self.points.len() {
            return Err(Cloud3dError::DimensionMismatch {
                expected: self.points.len(),
                actual: points.len(),
            });
        }
        Ok(Self {
            points,
            attributes: self.attributes,
        })
    }

    /// Keep the points (and their attribute values) whose mask entry is `true`.
    ///
    /// # Errors
    ///
    /// Returns [`Cloud3dError::DimensionMismatch`] if the mask length differs from
    /// the number of points.
    pub fn select(&self, mask: &[bool]) -> Result<Self, Cloud3dError> {
        if mask.len() != self.points.len() {
            return Err(Cloud3dError::DimensionMismatch {
                expected: self.points.len(),
                actual: mask.len(),
            });
        }

        Ok(self.masked(mask))
    }

    // Filter points and attributes with a mask of matching length.
    pub(crate) fn masked(&self, mask: &[bool]) -> Self {
        let points = self
            .points
            .iter()
            .zip(mask)
            .filter_map(|(p, &keep)| keep.then_some(*p))
            .collect();

        let attributes = self.attributes.as_ref().map(|attributes| {
            attributes
                .iter()
                .map(|(name, values)| {
                    let kept = values
                        .iter()
                        .zip(mask)
                        .filter_map(|(v, &keep)| keep.then_some(*v))
                        .collect();
                    (name.clone(), kept)
                })
                .collect()
        });

        Self { points, attributes }
    }

    /// Keep every n-th point starting with the first one.
    ///
    /// A step of 0 is treated as 1.
    pub fn subsample(&self, every: usize) -> Self {
        let every = every.max(1);
        let points = self.points.iter().step_by(every).copied().collect();
        let attributes = self.attributes.as_ref().map(|attributes| {
            attributes
                .iter()
                .map(|(name, values)| {
                    (name.clone(), values.iter().step_by(every).copied().collect())
                })
                .collect()
        });
        Self { points, attributes }
    }

    /// Compute the mean of the points, `None` for an empty cloud.
    pub fn centroid(&self) -> Option<[f64; 3]> {
        utils::centroid(&self.points)
    }

    /// Get the minimum bound of the point cloud.
    pub fn get_min_bound(&self) -> Option<[f64; 3]> {
        let first = *self.points.first()?;
        Some(self.points.iter().fold(first, |a, b| {
            [a[0].min(b[0]), a[1].min(b[1]), a[2].min(b[2])]
        }))
    }

    /// Get the maximum bound of the point cloud.
    pub fn get_max_bound(&self) -> Option<[f64; 3]> {
        let first = *self.points.first()?;
        Some(self.points.iter().fold(first, |a, b| {
            [a[0].max(b[0]), a[1].max(b[1]), a[2].max(b[2])]
        }))
    }
}
