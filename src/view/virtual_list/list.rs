use super::heights::RowHeights;
use super::range::{compute_visible_range, ViewportState, VisibleRange};
use crate::config::ListConfig;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

/// Reported when the rendered window reaches the end of the loaded rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NearEnd {
    /// Last rendered index at the time of the crossing
    pub last_index: usize,
    /// Number of rows loaded at the time of the crossing
    pub len: usize,
}

/// Callback invoked once per near-end crossing
pub type NearEndCallback = Box<dyn FnMut(NearEnd) + Send>;

/// Debounces near-end notifications
///
/// Fires when the last rendered index reaches `len - offset`. While the window
/// stays past that threshold nothing fires again for the same `len`; moving back
/// above the threshold re-arms it, and a new `len` counts as a new crossing.
#[derive(Debug, Clone)]
struct NearEndTrigger {
    offset: usize,
    fired_for_len: Option<usize>,
}

impl NearEndTrigger {
    fn new(offset: usize) -> Self {
        Self {
            // An offset of 0 would never fire; treat it as "last row rendered"
            offset: offset.max(1),
            fired_for_len: None,
        }
    }

    fn check(&mut self, last_index: Option<usize>, len: usize) -> Option<NearEnd> {
        let Some(last_index) = last_index else {
            self.fired_for_len = None;
            return None;
        };

        if last_index >= len.saturating_sub(self.offset) {
            if self.fired_for_len == Some(len) {
                return None;
            }
            self.fired_for_len = Some(len);
            Some(NearEnd { last_index, len })
        } else {
            self.fired_for_len = None;
            None
        }
    }
}

/// A row produced by [`VirtualList::render`]
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedRow<R> {
    pub index: usize,
    pub offset_top: f64,
    pub height: f64,
    pub content: R,
}

/// Output of [`VirtualList::render`]: a scroll container of `total_height`
/// holding absolutely positioned rows
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedList<R> {
    pub total_height: f64,
    pub rows: Vec<RenderedRow<R>>,
}

/// Windowed renderer for long ordered collections
///
/// The list owns no item data. It tracks the row keys of the collection it is
/// shown (`set_keys`/`set_len`), the viewport, row measurements and the
/// near-end trigger. Only rows in the overscanned window are rendered.
///
/// Keys are used to keep measurements and the scroll anchor attached to the
/// same rows when the collection is replaced. `VirtualList<usize>` (the
/// default) uses row indices as keys, which is right for append-only lists.
pub struct VirtualList<K = usize> {
    keys: Vec<K>,
    heights: RowHeights,
    measured: HashMap<K, f64>,
    viewport: ViewportState,
    range: VisibleRange,
    near_end: NearEndTrigger,
    on_near_end: Option<NearEndCallback>,
}

impl<K> fmt::Debug for VirtualList<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualList")
            .field("len", &self.keys.len())
            .field("viewport", &self.viewport)
            .field("range", &self.range.indices())
            .field("measured", &self.measured.len())
            .field("on_near_end", &self.on_near_end.as_ref().map(|_| "<callback>"))
            .finish()
    }
}

impl<K: Clone + Eq + Hash> VirtualList<K> {
    /// Create an empty list with the configured geometry
    pub fn new(config: &ListConfig) -> Self {
        Self {
            keys: Vec::new(),
            heights: RowHeights::new(0, config.estimated_row_height),
            measured: HashMap::new(),
            viewport: ViewportState::new(
                config.viewport_height,
                config.estimated_row_height,
                config.overscan,
            ),
            range: VisibleRange::default(),
            near_end: NearEndTrigger::new(config.near_end_offset),
            on_near_end: None,
        }
    }

    /// Builder form of [`Self::on_near_end`]
    pub fn with_near_end(mut self, callback: impl FnMut(NearEnd) + Send + 'static) -> Self {
        self.on_near_end(callback);
        self
    }

    /// Set the callback invoked when the window approaches the end of the rows
    pub fn on_near_end(&mut self, callback: impl FnMut(NearEnd) + Send + 'static) {
        self.on_near_end = Some(Box::new(callback));
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Current viewport state
    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    /// Current scroll offset
    pub fn scroll_offset(&self) -> f64 {
        self.viewport.scroll_offset
    }

    /// The window computed by the last recompute
    pub fn visible_range(&self) -> &VisibleRange {
        &self.range
    }

    /// Height of the whole scrollable content
    pub fn total_height(&self) -> f64 {
        self.heights.total_height()
    }

    /// Largest valid scroll offset
    pub fn max_scroll_offset(&self) -> f64 {
        (self.total_height() - self.viewport.viewport_height).max(0.0)
    }

    /// Top offset and height of a row
    pub fn row_bounds(&self, index: usize) -> Option<(f64, f64)> {
        (index < self.len()).then(|| (self.heights.offset_of(index), self.heights.height(index)))
    }

    /// Set the viewport height (should be called when the container resizes)
    pub fn set_viewport_height(&mut self, height: f64) {
        self.viewport.viewport_height = height.max(0.0);
        self.clamp_scroll();
        self.recompute();
    }

    /// Scroll to an absolute offset, clamped to the content
    pub fn scroll_to(&mut self, offset: f64) {
        self.viewport.scroll_offset = offset;
        self.clamp_scroll();
        self.recompute();
    }

    /// Scroll by a relative amount
    pub fn scroll_by(&mut self, delta: f64) {
        self.scroll_to(self.viewport.scroll_offset + delta);
    }

    /// Scroll the minimum amount needed for row `index` to be fully visible
    pub fn scroll_to_index(&mut self, index: usize) {
        let Some((top, height)) = self.row_bounds(index) else {
            return;
        };
        let scroll = self.viewport.scroll_offset;
        let view = self.viewport.viewport_height;

        if top < scroll {
            self.scroll_to(top);
        } else if top + height > scroll + view {
            self.scroll_to(top + height - view);
        }
    }

    /// Announce the rows of the collection being shown
    ///
    /// Measurements follow their keys. If the list was scrolled, the row at
    /// the top of the viewport stays at the same screen position as long as
    /// its key is still present.
    pub fn set_keys(&mut self, keys: impl IntoIterator<Item = K>) {
        let anchor = self.anchor();
        let keys: Vec<K> = keys.into_iter().collect();

        let estimated = self.heights.estimated();
        let heights = keys
            .iter()
            .map(|k| self.measured.get(k).copied().unwrap_or(estimated))
            .collect();
        self.heights.rebuild(heights);

        if !self.measured.is_empty() {
            let present: HashSet<&K> = keys.iter().collect();
            self.measured.retain(|k, _| present.contains(k));
        }

        if let Some((key, within_row)) = anchor {
            if let Some(index) = keys.iter().position(|k| *k == key) {
                self.viewport.scroll_offset = self.heights.offset_of(index) + within_row;
            }
        }

        self.keys = keys;
        self.clamp_scroll();
        self.recompute();
    }

    /// Record the real height of a row
    ///
    /// Corrections to rows above the top of the viewport shift the scroll
    /// offset by the same amount so the visible rows do not jump.
    pub fn measure(&mut self, index: usize, height: f64) {
        let Some(key) = self.keys.get(index).cloned() else {
            return;
        };
        let anchor_row = self.heights.row_at_offset(self.viewport.scroll_offset);
        let delta = self.heights.set(index, height);
        self.measured.insert(key, self.heights.height(index));

        if delta == 0.0 {
            return;
        }
        if index < anchor_row && self.viewport.scroll_offset > 0.0 {
            self.viewport.scroll_offset += delta;
        }
        self.clamp_scroll();
        self.recompute();
    }

    /// Render the rows of the current window
    ///
    /// `items` must be the collection last announced via `set_keys`/`set_len`;
    /// rows past the end of `items` are skipped.
    pub fn render<T, R>(
        &self,
        items: &[T],
        mut row: impl FnMut(&T, usize) -> R,
    ) -> RenderedList<R> {
        if items.len() != self.len() {
            tracing::debug!(
                "Rendering {} items with a window computed for {}",
                items.len(),
                self.len()
            );
        }

        self.render_window(|index| items.get(index).map(|item| row(item, index)))
    }

    /// Render the rows of the current window by index
    ///
    /// Rows for which `row` returns `None` are skipped. Only indices inside
    /// the window are asked for.
    pub fn render_window<R>(&self, mut row: impl FnMut(usize) -> Option<R>) -> RenderedList<R> {
        let rows = self
            .range
            .rows
            .iter()
            .filter_map(|visible| {
                row(visible.index).map(|content| RenderedRow {
                    index: visible.index,
                    offset_top: visible.offset_top,
                    height: visible.height,
                    content,
                })
            })
            .collect();

        RenderedList {
            total_height: self.total_height(),
            rows,
        }
    }

    /// Key and in-row offset of the row at the top of the viewport
    fn anchor(&self) -> Option<(K, f64)> {
        let scroll = self.viewport.scroll_offset;
        if scroll <= 0.0 {
            return None;
        }
        let index = self.heights.row_at_offset(scroll).min(self.len().checked_sub(1)?);
        let key = self.keys.get(index)?.clone();
        Some((key, scroll - self.heights.offset_of(index)))
    }

    fn clamp_scroll(&mut self) {
        let max = self.max_scroll_offset();
        let offset = self.viewport.scroll_offset;
        self.viewport.scroll_offset = if offset.is_finite() {
            offset.clamp(0.0, max)
        } else {
            0.0
        };
    }

    fn recompute(&mut self) {
        self.range = compute_visible_range(&self.heights, &self.viewport);

        if let Some(event) = self.near_end.check(self.range.last(), self.len()) {
            tracing::debug!(
                "List window reached row {} of {}",
                event.last_index,
                event.len
            );
            if let Some(callback) = self.on_near_end.as_mut() {
                callback(event);
            }
        }
    }
}

impl VirtualList<usize> {
    /// Announce a collection of `len` rows keyed by index
    ///
    /// Appending rows keeps the scroll position.
    pub fn set_len(&mut self, len: usize) {
        if len == self.len() {
            return;
        }
        self.set_keys(0..len);
    }
}
