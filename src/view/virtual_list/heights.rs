/// Row heights with O(log n) prefix sums
///
/// Rows start at the estimated height and are corrected individually as they
/// get measured. Backed by a Fenwick tree so that offset lookups stay cheap
/// for very long lists.
///
/// # Invariants
///
/// 1. `offset_of(i)` == sum of heights `[0..i)`
/// 2. `rows_ending_within(x)` returns the largest `k` with `offset_of(k) <= x`
/// 3. Heights are never negative
#[derive(Debug, Clone)]
pub struct RowHeights {
    /// 1-based Fenwick tree of heights
    tree: Vec<f64>,
    /// Plain heights, kept for O(1) reads
    heights: Vec<f64>,
    /// Height of rows that were never measured
    estimated: f64,
}

impl RowHeights {
    /// Create `len` rows, all at the estimated height
    pub fn new(len: usize, estimated: f64) -> Self {
        let estimated = sanitize(estimated);
        let mut heights = Self {
            tree: Vec::new(),
            heights: Vec::new(),
            estimated,
        };
        heights.rebuild(vec![estimated; len]);
        heights
    }

    /// Number of rows tracked
    pub fn len(&self) -> usize {
        self.heights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    /// Height used for unmeasured rows
    pub fn estimated(&self) -> f64 {
        self.estimated
    }

    /// Height of a row (estimated height when out of range)
    pub fn height(&self, index: usize) -> f64 {
        self.heights.get(index).copied().unwrap_or(self.estimated)
    }

    /// Set the height of one row. O(log n).
    ///
    /// Returns the height difference applied, `0.0` when out of range.
    pub fn set(&mut self, index: usize, height: f64) -> f64 {
        let Some(current) = self.heights.get_mut(index) else {
            return 0.0;
        };
        let height = sanitize(height);
        let delta = height - *current;
        if delta == 0.0 {
            return 0.0;
        }
        *current = height;

        let mut i = index + 1;
        while i < self.tree.len() {
            self.tree[i] += delta;
            i += lowbit(i);
        }
        delta
    }

    /// Offset of the top edge of row `index` (sum of all rows before it)
    ///
    /// `index` is clamped to `len()`, so `offset_of(len())` is the total height.
    pub fn offset_of(&self, index: usize) -> f64 {
        let mut i = index.min(self.len());
        let mut sum = 0.0;
        while i > 0 {
            sum += self.tree[i];
            i -= lowbit(i);
        }
        sum
    }

    /// Total height of all rows
    pub fn total_height(&self) -> f64 {
        self.offset_of(self.len())
    }

    /// Largest `k` such that rows `[0..k)` all end at or before `offset`.
    ///
    /// Also returns what is left of `offset` past the end of those rows.
    fn rows_ending_within(&self, offset: f64) -> (usize, f64) {
        let n = self.len();
        if n == 0 || offset <= 0.0 {
            return (0, offset.max(0.0));
        }

        let mut pos = 0;
        let mut remaining = offset;
        let mut step = 1usize << (usize::BITS - 1 - n.leading_zeros());
        while step > 0 {
            let next = pos + step;
            if next <= n && self.tree[next] <= remaining {
                pos = next;
                remaining -= self.tree[next];
            }
            step >>= 1;
        }
        (pos, remaining)
    }

    /// Index of the row containing `offset` (`floor(offset / H)` for uniform rows)
    ///
    /// May return `len()` when `offset` lies past the last row.
    pub fn row_at_offset(&self, offset: f64) -> usize {
        self.rows_ending_within(offset).0
    }

    /// Index of the first row whose top edge is at or after `offset`
    /// (`ceil(offset / H)` for uniform rows)
    pub fn first_row_at_or_after(&self, offset: f64) -> usize {
        let (rows, remaining) = self.rows_ending_within(offset);
        if remaining.abs() < 1e-9 {
            rows
        } else {
            rows + 1
        }
    }

    /// Grow or shrink to `new_len` rows, new rows at the estimated height
    pub fn resize(&mut self, new_len: usize) {
        if new_len == self.len() {
            return;
        }
        let mut heights = std::mem::take(&mut self.heights);
        heights.resize(new_len, self.estimated);
        self.rebuild(heights);
    }

    /// Replace all heights. O(n).
    pub fn rebuild(&mut self, heights: Vec<f64>) {
        let heights: Vec<f64> = heights.into_iter().map(sanitize).collect();
        let mut tree = vec![0.0; heights.len() + 1];
        for (i, h) in heights.iter().enumerate() {
            let idx = i + 1;
            tree[idx] += h;
            let parent = idx + lowbit(idx);
            if parent < tree.len() {
                let value = tree[idx];
                tree[parent] += value;
            }
        }
        self.tree = tree;
        self.heights = heights;
    }
}

fn lowbit(i: usize) -> usize {
    i & i.wrapping_neg()
}

fn sanitize(height: f64) -> f64 {
    if height.is_finite() && height > 0.0 {
        height
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_offsets() {
        let heights = RowHeights::new(10, 20.0);

        assert_eq!(heights.len(), 10);
        assert_eq!(heights.offset_of(0), 0.0);
        assert_eq!(heights.offset_of(3), 60.0);
        assert_eq!(heights.offset_of(100), 200.0);
        assert_eq!(heights.total_height(), 200.0);
    }

    #[test]
    fn test_row_at_offset_matches_floor() {
        let heights = RowHeights::new(1000, 56.0);

        assert_eq!(heights.row_at_offset(0.0), 0);
        assert_eq!(heights.row_at_offset(55.9), 0);
        assert_eq!(heights.row_at_offset(56.0), 1);
        assert_eq!(heights.row_at_offset(5600.0), 100);
        assert_eq!(heights.row_at_offset(1_000_000.0), 1000);
    }

    #[test]
    fn test_first_row_at_or_after_matches_ceil() {
        let heights = RowHeights::new(1000, 56.0);

        assert_eq!(heights.first_row_at_or_after(0.0), 0);
        assert_eq!(heights.first_row_at_or_after(800.0), 15);
        assert_eq!(heights.first_row_at_or_after(5600.0), 100);
        assert_eq!(heights.first_row_at_or_after(6400.0), 115);
    }

    #[test]
    fn test_measurement_updates_prefix_sums() {
        let mut heights = RowHeights::new(5, 10.0);

        let delta = heights.set(1, 30.0);

        assert_eq!(delta, 20.0);
        assert_eq!(heights.height(1), 30.0);
        assert_eq!(heights.offset_of(2), 40.0);
        assert_eq!(heights.total_height(), 70.0);
        assert_eq!(heights.row_at_offset(35.0), 1);
        assert_eq!(heights.row_at_offset(40.0), 2);
    }

    #[test]
    fn test_set_out_of_range_is_ignored() {
        let mut heights = RowHeights::new(2, 10.0);
        assert_eq!(heights.set(5, 99.0), 0.0);
        assert_eq!(heights.total_height(), 20.0);
    }

    #[test]
    fn test_resize_keeps_measurements() {
        let mut heights = RowHeights::new(3, 10.0);
        heights.set(0, 25.0);

        heights.resize(5);
        assert_eq!(heights.len(), 5);
        assert_eq!(heights.height(0), 25.0);
        assert_eq!(heights.total_height(), 65.0);

        heights.resize(1);
        assert_eq!(heights.total_height(), 25.0);
    }

    #[test]
    fn test_empty() {
        let heights = RowHeights::new(0, 10.0);

        assert!(heights.is_empty());
        assert_eq!(heights.total_height(), 0.0);
        assert_eq!(heights.row_at_offset(50.0), 0);
    }

    #[test]
    fn test_invalid_heights_become_zero() {
        let mut heights = RowHeights::new(2, 10.0);
        heights.set(0, f64::NAN);
        heights.set(1, -5.0);
        assert_eq!(heights.total_height(), 0.0);
    }
}
