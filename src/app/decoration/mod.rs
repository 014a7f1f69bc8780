//! Item spacing for list and grid rendering surfaces
//!
//! A rendering surface asks an [`ItemDecoration`] for the margins of each
//! visible item right before positioning it. [`GridSpacing`] computes those
//! margins so that a fixed number of columns tiles the container exactly,
//! with configurable gaps between items and around the edges.
//!
//! # Examples
//!
//! ```rust
//! use commonlib::app::decoration::{GridSpacing, GridSpacingConfig, LayoutContext};
//!
//! # fn example() -> Result<(), commonlib::errors::LayoutError> {
//! let config = GridSpacingConfig::with_row_edges(3, 5, 5, 10, 20)?;
//! let spacing = GridSpacing::vertical(config);
//!
//! let margins = spacing.margins(&LayoutContext::new(7, 300, 6))?;
//! assert_eq!((margins.top, margins.bottom), (10, 5));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod spacing;

pub use config::GridSpacingConfig;
pub use spacing::{GridSpacing, Orientation};

use serde::{Deserialize, Serialize};

use crate::errors::LayoutResult;

/// Host state read immediately before one margin computation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutContext {
    /// Items in the adapter right now
    pub item_count: i32,
    /// Viewport width (vertical grids) or height (horizontal grids) in pixels
    pub container_extent: i32,
    /// Zero-based adapter position of the item being measured
    pub item_index: i32,
}

impl LayoutContext {
    pub fn new(item_count: i32, container_extent: i32, item_index: i32) -> Self {
        Self {
            item_count,
            container_extent,
            item_index,
        }
    }
}

/// Pixel offsets applied around one item
///
/// Values may be negative: on the primary axis they are corrections to the
/// layout manager's equal-division cell, not plain insets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemMargins {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl ItemMargins {
    pub const ZERO: Self = Self {
        left: 0,
        top: 0,
        right: 0,
        bottom: 0,
    };

    /// Rotate by 90 degrees: top/bottom become left/right and vice versa
    pub fn transposed(self) -> Self {
        Self {
            left: self.top,
            top: self.left,
            right: self.bottom,
            bottom: self.right,
        }
    }
}

/// Per-item margin provider consumed by a rendering surface
pub trait ItemDecoration: Send + Sync {
    /// Write the margins for the item described by `ctx` into `out`
    fn item_offsets(&self, out: &mut ItemMargins, ctx: &LayoutContext) -> LayoutResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transpose_is_involution() {
        let m = ItemMargins {
            left: 1,
            top: 2,
            right: 3,
            bottom: 4,
        };
        let t = m.transposed();
        assert_eq!((t.left, t.top, t.right, t.bottom), (2, 1, 4, 3));
        assert_eq!(t.transposed(), m);
    }

    #[test]
    fn test_decoration_is_object_safe() {
        let config = GridSpacingConfig::new(2, 4, 4).unwrap();
        let decorations: Vec<Box<dyn ItemDecoration>> = vec![
            Box::new(GridSpacing::vertical(config)),
            Box::new(GridSpacing::horizontal(config)),
        ];

        let mut out = ItemMargins::default();
        for decoration in &decorations {
            decoration
                .item_offsets(&mut out, &LayoutContext::new(4, 100, 3))
                .unwrap();
        }
    }
}
