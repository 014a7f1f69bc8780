//! Per-item margin computation for vertical and horizontal grids
//!
//! The host layout manager splits the container into `column_count` equal
//! cells. The margins returned here are corrective offsets that move each
//! cell onto its gap-aware position, so every column ends up the same width
//! with exactly `horizontal_gap` between neighbours and the configured edge
//! gaps on the outside. Rows contribute half of `vertical_gap` on each
//! shared edge.

use serde::{Deserialize, Serialize};

use crate::errors::{LayoutError, LayoutResult};

use super::config::GridSpacingConfig;
use super::{ItemDecoration, ItemMargins, LayoutContext};

/// Scroll orientation of the host list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Items fill rows left to right, rows stack downwards
    Vertical,
    /// Items fill columns top to bottom, columns stack rightwards
    Horizontal,
}

/// Grid spacing calculator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSpacing {
    /// Fed to the vertical arithmetic as is; horizontal grids rotate the
    /// result
    config: GridSpacingConfig,
    orientation: Orientation,
}

impl GridSpacing {
    /// Calculator for a vertically scrolling grid
    pub fn vertical(config: GridSpacingConfig) -> Self {
        Self {
            config,
            orientation: Orientation::Vertical,
        }
    }

    /// Calculator for a horizontally scrolling grid
    ///
    /// The vertical arithmetic runs on `config` unchanged and only the
    /// output is rotated: the computed top/bottom land on left/right and
    /// the computed left/right land on top/bottom.
    pub fn horizontal(config: GridSpacingConfig) -> Self {
        Self {
            config,
            orientation: Orientation::Horizontal,
        }
    }

    /// Fully specified horizontal grid
    ///
    /// Gaps are named by the side they end up on screen. `column_count` is
    /// the number of rows visible across the container height.
    ///
    /// # Errors
    ///
    /// Returns `LayoutError::InvalidConfiguration` if `column_count <= 0`
    pub fn horizontal_with_edges(
        column_count: i32,
        first_row_top_gap: i32,
        last_row_bottom_gap: i32,
        first_column_left_gap: i32,
        last_column_right_gap: i32,
        horizontal_gap: i32,
        vertical_gap: i32,
    ) -> LayoutResult<Self> {
        let on_screen = GridSpacingConfig::with_edges(
            column_count,
            first_row_top_gap,
            last_row_bottom_gap,
            first_column_left_gap,
            last_column_right_gap,
            horizontal_gap,
            vertical_gap,
        )?;
        // rotating the output back puts every gap on its named side
        Ok(Self::horizontal(on_screen.transposed()))
    }

    /// Calculator for the given orientation, see [`GridSpacing::horizontal`]
    pub fn with_orientation(config: GridSpacingConfig, orientation: Orientation) -> Self {
        match orientation {
            Orientation::Vertical => Self::vertical(config),
            Orientation::Horizontal => Self::horizontal(config),
        }
    }

    /// Orientation this calculator was built for
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Configuration handed to the vertical arithmetic
    pub fn config(&self) -> &GridSpacingConfig {
        &self.config
    }

    /// Margins for one item
    ///
    /// # Errors
    ///
    /// Returns `LayoutError::IndexOutOfRange` if the index is not in
    /// `[0, item_count)` for a non-empty grid
    pub fn margins(&self, ctx: &LayoutContext) -> LayoutResult<ItemMargins> {
        let margins = vertical_margins(&self.config, ctx)?;
        Ok(match self.orientation {
            Orientation::Vertical => margins,
            Orientation::Horizontal => margins.transposed(),
        })
    }

    /// Margins for every item of a grid, in adapter order
    pub fn all_margins(
        &self,
        item_count: i32,
        container_extent: i32,
    ) -> LayoutResult<Vec<ItemMargins>> {
        (0..item_count.max(0))
            .map(|index| self.margins(&LayoutContext::new(item_count, container_extent, index)))
            .collect()
    }

    /// Width (or height, horizontally) each item ends up with after margins
    pub fn item_extent(&self, container_extent: i32) -> i32 {
        let c = &self.config;
        let available = i64::from(container_extent)
            - i64::from(c.first_column_leading_gap)
            - i64::from(c.last_column_trailing_gap);
        let columns = i64::from(c.column_count());
        if columns > 1 {
            saturate((available - (columns - 1) * i64::from(c.horizontal_gap)) / columns)
        } else {
            saturate(available)
        }
    }
}

impl ItemDecoration for GridSpacing {
    fn item_offsets(&self, out: &mut ItemMargins, ctx: &LayoutContext) -> LayoutResult<()> {
        *out = self.margins(ctx)?;
        Ok(())
    }
}

/// Vertical-grid arithmetic shared by both orientations
fn vertical_margins(config: &GridSpacingConfig, ctx: &LayoutContext) -> LayoutResult<ItemMargins> {
    if ctx.item_count == 0 {
        return Ok(ItemMargins::ZERO);
    }
    if ctx.item_count < 0 || ctx.item_index < 0 || ctx.item_index >= ctx.item_count {
        return Err(LayoutError::IndexOutOfRange {
            index: ctx.item_index,
            item_count: ctx.item_count,
        });
    }

    let columns = config.column_count();
    let row = ctx.item_index / columns;
    let column = ctx.item_index % columns;
    let row_count = ctx.item_count / columns + i32::from(ctx.item_count % columns != 0);

    let half_gap = config.vertical_gap / 2;
    let (top, bottom) = if row_count == 1 {
        (config.first_row_leading_gap, config.last_row_trailing_gap)
    } else if row == 0 {
        (config.first_row_leading_gap, half_gap)
    } else if row == row_count - 1 {
        (half_gap, config.last_row_trailing_gap)
    } else {
        (half_gap, half_gap)
    };

    let (left, right) = if columns == 1 {
        (
            config.first_column_leading_gap,
            config.last_column_trailing_gap,
        )
    } else {
        // Widened so extreme gaps or extents cannot overflow
        let extent = i64::from(ctx.container_extent);
        let columns = i64::from(columns);
        let column = i64::from(column);
        let first_gap = i64::from(config.first_column_leading_gap);
        let horizontal_gap = i64::from(config.horizontal_gap);
        let item_width = (extent
            - first_gap
            - i64::from(config.last_column_trailing_gap)
            - (columns - 1) * horizontal_gap)
            / columns;
        let average_width = extent / columns;

        // Where the layout manager puts the cell
        let old_left = column * average_width;
        let old_right = old_left + average_width;

        // Where the cell should be once gaps are honoured
        let new_left = first_gap + column * (horizontal_gap + item_width);
        let new_right = new_left + item_width;

        (saturate(new_left - old_left), saturate(old_right - new_right))
    };

    Ok(ItemMargins {
        left,
        top,
        right,
        bottom,
    })
}

fn saturate(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(item_count: i32, extent: i32, index: i32) -> LayoutContext {
        LayoutContext::new(item_count, extent, index)
    }

    fn scenario_config() -> GridSpacingConfig {
        GridSpacingConfig::with_edges(3, 5, 5, 0, 0, 10, 20).unwrap()
    }

    #[test]
    fn test_scenario_multi_row_cross_axis() {
        let spacing = GridSpacing::vertical(scenario_config());

        for index in 0..3 {
            let m = spacing.margins(&ctx(7, 300, index)).unwrap();
            assert_eq!((m.top, m.bottom), (5, 10), "item {}", index);
        }
        for index in 3..6 {
            let m = spacing.margins(&ctx(7, 300, index)).unwrap();
            assert_eq!((m.top, m.bottom), (10, 10), "item {}", index);
        }
        let last = spacing.margins(&ctx(7, 300, 6)).unwrap();
        assert_eq!((last.top, last.bottom), (10, 5));
    }

    #[test]
    fn test_scenario_single_row_uses_edges() {
        let spacing = GridSpacing::vertical(scenario_config());
        for index in 0..3 {
            let m = spacing.margins(&ctx(3, 300, index)).unwrap();
            assert_eq!((m.top, m.bottom), (5, 5));
        }
    }

    #[test]
    fn test_scenario_primary_axis_offsets() {
        // item width = (300 - 2 * 10) / 3 = 93, naive cell = 100
        let spacing = GridSpacing::vertical(scenario_config());
        let expected = [(0, 7), (3, 4), (6, 1)];
        for (index, (left, right)) in expected.iter().enumerate() {
            let m = spacing.margins(&ctx(7, 300, index as i32)).unwrap();
            assert_eq!((m.left, m.right), (*left, *right), "column {}", index);
            assert_eq!(100 - m.left - m.right, 93);
        }
        assert_eq!(spacing.item_extent(300), 93);
    }

    #[test]
    fn test_single_column_uses_column_edges() {
        let config = GridSpacingConfig::with_edges(1, 0, 0, 12, 7, 30, 8).unwrap();
        let spacing = GridSpacing::vertical(config);
        for extent in [0, 99, 1080] {
            for index in 0..4 {
                let m = spacing.margins(&ctx(4, extent, index)).unwrap();
                assert_eq!((m.left, m.right), (12, 7));
            }
        }
    }

    #[test]
    fn test_empty_grid_is_zero() {
        let spacing = GridSpacing::vertical(scenario_config());
        assert_eq!(spacing.margins(&ctx(0, 300, 0)).unwrap(), ItemMargins::ZERO);
        assert_eq!(spacing.margins(&ctx(0, 0, 5)).unwrap(), ItemMargins::ZERO);
        assert!(spacing.all_margins(0, 300).unwrap().is_empty());
    }

    #[test]
    fn test_out_of_range_index() {
        let spacing = GridSpacing::vertical(scenario_config());
        assert_eq!(
            spacing.margins(&ctx(3, 300, 3)),
            Err(LayoutError::IndexOutOfRange {
                index: 3,
                item_count: 3
            })
        );
        assert!(spacing.margins(&ctx(3, 300, -1)).is_err());
    }

    #[test]
    fn test_negative_offsets_with_wide_edges() {
        // item width = (100 - 30 - 30 - 10) / 2 = 15, naive cell = 50
        let config = GridSpacingConfig::with_edges(2, 0, 0, 30, 30, 10, 0).unwrap();
        let spacing = GridSpacing::vertical(config);
        let second = spacing.margins(&ctx(2, 100, 1)).unwrap();
        // new left = 30 + 25 = 55, old left = 50
        assert_eq!(second.left, 5);
        assert_eq!(second.right, 100 - 70);

        let config = GridSpacingConfig::new(2, 80, 0).unwrap();
        let first = GridSpacing::vertical(config).margins(&ctx(2, 100, 0)).unwrap();
        // item width = 10, new right = 10, old right = 50
        assert_eq!(first.right, 40);
        let second = GridSpacing::vertical(config).margins(&ctx(2, 100, 1)).unwrap();
        // new left = 90, old left = 50, new right = 100, old right = 100
        assert_eq!((second.left, second.right), (40, 0));
    }

    #[test]
    fn test_horizontal_rotates_vertical_result() {
        let config = GridSpacingConfig::with_edges(2, 4, 6, 8, 2, 10, 20).unwrap();
        let horizontal = GridSpacing::horizontal(config);
        let vertical = GridSpacing::vertical(config);

        for index in 0..5 {
            let h = horizontal.margins(&ctx(5, 400, index)).unwrap();
            let v = vertical.margins(&ctx(5, 400, index)).unwrap();
            assert_eq!(h.left, v.top);
            assert_eq!(h.right, v.bottom);
            assert_eq!(h.top, v.left);
            assert_eq!(h.bottom, v.right);
        }
    }

    #[test]
    fn test_horizontal_short_form_keeps_gaps() {
        // rows 4/10 and columns 0/5 in vertical terms, then rotated
        let config = GridSpacingConfig::with_row_edges(2, 4, 6, 10, 20).unwrap();
        let spacing = GridSpacing::horizontal(config);
        assert_eq!(spacing.orientation(), Orientation::Horizontal);
        assert_eq!(spacing.config(), &config);

        assert_eq!(
            spacing.margins(&ctx(6, 400, 0)).unwrap(),
            ItemMargins {
                left: 4,
                top: 0,
                right: 10,
                bottom: 5
            }
        );
        assert_eq!(
            spacing.margins(&ctx(6, 400, 5)).unwrap(),
            ItemMargins {
                left: 10,
                top: 5,
                right: 6,
                bottom: 0
            }
        );
        assert_eq!(
            GridSpacing::with_orientation(config, Orientation::Horizontal),
            spacing
        );
    }

    #[test]
    fn test_horizontal_edges_land_on_expected_sides() {
        // two rows on screen, columns stack rightwards
        let spacing = GridSpacing::horizontal_with_edges(2, 4, 6, 8, 2, 10, 20).unwrap();
        assert_eq!(spacing.orientation(), Orientation::Horizontal);
        assert_eq!(
            spacing.config(),
            &GridSpacingConfig::with_edges(2, 8, 2, 4, 6, 20, 10).unwrap()
        );

        // first column of a three-column strip: left edge is the first-column gap
        let first = spacing.margins(&ctx(6, 400, 0)).unwrap();
        assert_eq!(first.left, 8);
        assert_eq!(first.right, 5);
        // first row on screen starts at the first-row gap
        assert_eq!(first.top, 4);

        let last = spacing.margins(&ctx(6, 400, 5)).unwrap();
        assert_eq!(last.left, 5);
        assert_eq!(last.right, 2);

        assert!(GridSpacing::horizontal_with_edges(0, 0, 0, 0, 0, 1, 1).is_err());
    }

    #[test]
    fn test_huge_item_count_does_not_overflow() {
        let spacing = GridSpacing::vertical(scenario_config());
        let first = spacing.margins(&ctx(i32::MAX, 300, 0)).unwrap();
        assert_eq!(first, ItemMargins { left: 0, top: 5, right: 7, bottom: 10 });

        let last = spacing
            .margins(&ctx(i32::MAX, 300, i32::MAX - 1))
            .unwrap();
        assert_eq!((last.top, last.bottom), (10, 5));
    }

    #[test]
    fn test_extreme_gaps_do_not_overflow() {
        let config =
            GridSpacingConfig::with_edges(3, 0, 0, i32::MAX, i32::MIN, i32::MAX, 0).unwrap();
        let spacing = GridSpacing::vertical(config);
        for index in 0..3 {
            assert!(spacing.margins(&ctx(3, i32::MAX, index)).is_ok());
        }
        assert_eq!(spacing.item_extent(i32::MIN), -i32::MAX);

        // item width = (300 - 2147483646) / 3 = -715827782
        let config = GridSpacingConfig::new(3, i32::MAX / 2, 0).unwrap();
        let first = GridSpacing::vertical(config).margins(&ctx(3, 300, 0)).unwrap();
        assert_eq!((first.left, first.right), (0, 100 + 715_827_782));
    }

    #[test]
    fn test_item_offsets_writes_into_output() {
        let spacing = GridSpacing::vertical(scenario_config());
        let mut out = ItemMargins {
            left: 1,
            top: 2,
            right: 3,
            bottom: 4,
        };
        spacing.item_offsets(&mut out, &ctx(0, 300, 0)).unwrap();
        assert_eq!(out, ItemMargins::ZERO);

        spacing.item_offsets(&mut out, &ctx(7, 300, 6)).unwrap();
        assert_eq!((out.top, out.bottom), (10, 5));
    }
}
