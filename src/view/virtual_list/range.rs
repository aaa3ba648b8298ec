use super::heights::RowHeights;
use std::ops::RangeInclusive;

/// Scroll position and geometry of the list viewport
///
/// Derived state, recomputed whenever the collection or the scroll position
/// changes. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    /// Distance scrolled from the top of the list
    pub scroll_offset: f64,
    /// Height of the visible area
    pub viewport_height: f64,
    /// Height assumed for rows that have not been measured
    pub estimated_row_height: f64,
    /// Extra rows rendered beyond each visible edge
    pub overscan: usize,
}

impl ViewportState {
    pub fn new(viewport_height: f64, estimated_row_height: f64, overscan: usize) -> Self {
        Self {
            scroll_offset: 0.0,
            viewport_height,
            estimated_row_height,
            overscan,
        }
    }
}

/// A row inside the rendered window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleRow {
    pub index: usize,
    pub offset_top: f64,
    pub height: f64,
}

/// Rows currently (or nearly) within the viewport
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisibleRange {
    pub rows: Vec<VisibleRow>,
}

impl VisibleRange {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// First rendered index
    pub fn first(&self) -> Option<usize> {
        self.rows.first().map(|r| r.index)
    }

    /// Last rendered index
    pub fn last(&self) -> Option<usize> {
        self.rows.last().map(|r| r.index)
    }

    /// Rendered indices as an inclusive range
    pub fn indices(&self) -> Option<RangeInclusive<usize>> {
        Some(self.first()?..=self.last()?)
    }

    pub fn contains(&self, index: usize) -> bool {
        self.indices().is_some_and(|r| r.contains(&index))
    }
}

/// Compute the overscanned window for the given viewport
///
/// With `s` the scroll offset, `v` the viewport height and `K` the overscan:
/// first = `row_at(s) - K`, last = `first_row_at_or_after(s + v) + K`, both
/// clamped to the list. For unmeasured rows of height `H` this is
/// `[floor(s/H) - K, ceil((s+v)/H) + K]`.
pub fn compute_visible_range(heights: &RowHeights, viewport: &ViewportState) -> VisibleRange {
    let len = heights.len();
    if len == 0 {
        return VisibleRange::default();
    }

    let scroll = viewport.scroll_offset.max(0.0);
    let bottom = scroll + viewport.viewport_height.max(0.0);

    let last = (heights.first_row_at_or_after(bottom) + viewport.overscan).min(len - 1);
    let first = heights
        .row_at_offset(scroll)
        .saturating_sub(viewport.overscan)
        .min(last);

    let mut offset_top = heights.offset_of(first);
    let rows = (first..=last)
        .map(|index| {
            let height = heights.height(index);
            let row = VisibleRow {
                index,
                offset_top,
                height,
            };
            offset_top += height;
            row
        })
        .collect();

    VisibleRange { rows }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range_for(len: usize, scroll: f64, height: f64, row: f64, overscan: usize) -> VisibleRange {
        let heights = RowHeights::new(len, row);
        let mut viewport = ViewportState::new(height, row, overscan);
        viewport.scroll_offset = scroll;
        compute_visible_range(&heights, &viewport)
    }

    #[test]
    fn test_top_of_large_list() {
        let range = range_for(1000, 0.0, 800.0, 56.0, 10);
        // ceil(800 / 56) = 15, plus 10 rows of overscan
        assert_eq!(range.indices(), Some(0..=25));
    }

    #[test]
    fn test_scrolled_to_row_100() {
        let range = range_for(1000, 5600.0, 800.0, 56.0, 10);
        // floor(5600 / 56) - 10 = 90, ceil(6400 / 56) + 10 = 125
        assert_eq!(range.indices(), Some(90..=125));
        assert_eq!(range.rows[0].offset_top, 90.0 * 56.0);
    }

    #[test]
    fn test_empty_list_renders_nothing() {
        let range = range_for(0, 0.0, 800.0, 56.0, 10);
        assert!(range.is_empty());
        assert_eq!(range.indices(), None);
    }

    #[test]
    fn test_short_list_clamps_to_end() {
        let range = range_for(3, 0.0, 800.0, 56.0, 10);
        assert_eq!(range.indices(), Some(0..=2));
    }

    #[test]
    fn test_zero_overscan() {
        let range = range_for(100, 100.0, 200.0, 50.0, 0);
        assert_eq!(range.indices(), Some(2..=6));
    }

    #[test]
    fn test_rows_are_positioned_by_cumulative_height() {
        let mut heights = RowHeights::new(5, 10.0);
        heights.set(1, 40.0);
        let viewport = ViewportState::new(1000.0, 10.0, 0);

        let range = compute_visible_range(&heights, &viewport);
        let tops: Vec<f64> = range.rows.iter().map(|r| r.offset_top).collect();
        assert_eq!(tops, vec![0.0, 10.0, 50.0, 60.0, 70.0]);
    }

    #[test]
    fn test_scroll_past_end_still_renders_last_row() {
        let range = range_for(10, 10_000.0, 100.0, 10.0, 0);
        assert_eq!(range.indices(), Some(9..=9));
    }
}
