// Windowed rendering of long ordered collections
//
// Only the rows inside the viewport (plus overscan) are rendered, so render
// cost does not depend on the number of items. Row heights start at an
// estimate and are corrected as rows get measured.

pub mod heights;
pub mod list;
pub mod range;

pub use heights::RowHeights;
pub use list::{NearEnd, NearEndCallback, RenderedList, RenderedRow, VirtualList};
pub use range::{compute_visible_range, ViewportState, VisibleRange, VisibleRow};
