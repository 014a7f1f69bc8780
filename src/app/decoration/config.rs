//! Grid spacing configuration
//!
//! Gap values are signed pixels so they share arithmetic with the signed
//! corrective offsets they feed into.

use serde::{Deserialize, Serialize};

use crate::errors::{LayoutError, LayoutResult};

/// Immutable spacing configuration for a grid of `column_count` columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSpacingConfig {
    column_count: i32,
    /// Gap between adjacent columns
    pub horizontal_gap: i32,
    /// Gap between adjacent rows
    pub vertical_gap: i32,
    /// Gap before the first row
    pub first_row_leading_gap: i32,
    /// Gap after the last row
    pub last_row_trailing_gap: i32,
    /// Gap before the first column
    pub first_column_leading_gap: i32,
    /// Gap after the last column
    pub last_column_trailing_gap: i32,
}

impl GridSpacingConfig {
    /// Gaps between items only, no extra edge gaps
    ///
    /// # Errors
    ///
    /// Returns `LayoutError::InvalidConfiguration` if `column_count <= 0`
    pub fn new(column_count: i32, horizontal_gap: i32, vertical_gap: i32) -> LayoutResult<Self> {
        Self::with_row_edges(column_count, 0, 0, horizontal_gap, vertical_gap)
    }

    /// Gaps between items plus a gap before the first row and after the last
    ///
    /// # Errors
    ///
    /// Returns `LayoutError::InvalidConfiguration` if `column_count <= 0`
    pub fn with_row_edges(
        column_count: i32,
        first_row_leading_gap: i32,
        last_row_trailing_gap: i32,
        horizontal_gap: i32,
        vertical_gap: i32,
    ) -> LayoutResult<Self> {
        Self::with_edges(
            column_count,
            first_row_leading_gap,
            last_row_trailing_gap,
            0,
            0,
            horizontal_gap,
            vertical_gap,
        )
    }

    /// Fully specified configuration
    ///
    /// # Errors
    ///
    /// Returns `LayoutError::InvalidConfiguration` if `column_count <= 0`
    pub fn with_edges(
        column_count: i32,
        first_row_leading_gap: i32,
        last_row_trailing_gap: i32,
        first_column_leading_gap: i32,
        last_column_trailing_gap: i32,
        horizontal_gap: i32,
        vertical_gap: i32,
    ) -> LayoutResult<Self> {
        if column_count <= 0 {
            return Err(LayoutError::InvalidConfiguration { column_count });
        }

        Ok(Self {
            column_count,
            horizontal_gap,
            vertical_gap,
            first_row_leading_gap,
            last_row_trailing_gap,
            first_column_leading_gap,
            last_column_trailing_gap,
        })
    }

    /// Number of columns, always positive
    pub fn column_count(&self) -> i32 {
        self.column_count
    }

    /// Swap the row and column roles: row edges become column edges and the
    /// horizontal gap becomes the vertical gap
    pub fn transposed(&self) -> Self {
        Self {
            column_count: self.column_count,
            horizontal_gap: self.vertical_gap,
            vertical_gap: self.horizontal_gap,
            first_row_leading_gap: self.first_column_leading_gap,
            last_row_trailing_gap: self.last_column_trailing_gap,
            first_column_leading_gap: self.first_row_leading_gap,
            last_column_trailing_gap: self.last_row_trailing_gap,
        }
    }

    /// Reject configs built through deserialization with a bad column count
    pub fn validate(&self) -> LayoutResult<()> {
        if self.column_count <= 0 {
            return Err(LayoutError::InvalidConfiguration {
                column_count: self.column_count,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_fill_defaults() {
        let config = GridSpacingConfig::new(3, 10, 20).unwrap();
        assert_eq!(config.column_count(), 3);
        assert_eq!(config.horizontal_gap, 10);
        assert_eq!(config.vertical_gap, 20);
        assert_eq!(config.first_row_leading_gap, 0);
        assert_eq!(config.last_column_trailing_gap, 0);

        let config = GridSpacingConfig::with_row_edges(2, 5, 6, 10, 20).unwrap();
        assert_eq!(config.first_row_leading_gap, 5);
        assert_eq!(config.last_row_trailing_gap, 6);
        assert_eq!(config.first_column_leading_gap, 0);
    }

    #[test]
    fn test_non_positive_column_count_rejected() {
        assert_eq!(
            GridSpacingConfig::new(0, 1, 1),
            Err(LayoutError::InvalidConfiguration { column_count: 0 })
        );
        assert_eq!(
            GridSpacingConfig::with_edges(-3, 0, 0, 0, 0, 1, 1),
            Err(LayoutError::InvalidConfiguration { column_count: -3 })
        );
    }

    #[test]
    fn test_transpose_swaps_roles() {
        let config = GridSpacingConfig::with_edges(4, 1, 2, 3, 4, 5, 6).unwrap();
        let t = config.transposed();
        assert_eq!(t.column_count(), 4);
        assert_eq!(t.first_row_leading_gap, 3);
        assert_eq!(t.last_row_trailing_gap, 4);
        assert_eq!(t.first_column_leading_gap, 1);
        assert_eq!(t.last_column_trailing_gap, 2);
        assert_eq!(t.horizontal_gap, 6);
        assert_eq!(t.vertical_gap, 5);
        assert_eq!(t.transposed(), config);
    }

    #[test]
    fn test_validate_catches_deserialized_zero() {
        let config: GridSpacingConfig = serde_json::from_str(
            r#"{"column_count":0,"horizontal_gap":0,"vertical_gap":0,
                "first_row_leading_gap":0,"last_row_trailing_gap":0,
                "first_column_leading_gap":0,"last_column_trailing_gap":0}"#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }
}
