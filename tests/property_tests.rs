// Property tests for the windowed range and the folder tree builder

use docshelf::config::ListConfig;
use docshelf::model::Item;
use docshelf::view::folder_tree::{build_tree, count_nodes, flatten_tree, TreeNode};
use docshelf::view::virtual_list::{compute_visible_range, RowHeights, ViewportState, VirtualList};
use proptest::prelude::*;
use std::sync::{Arc, Mutex};

/// Items `0..n` whose parents are random ids (some missing, some self, cycles allowed)
fn arb_items(max_len: usize) -> impl Strategy<Value = Vec<Item>> {
    prop::collection::vec(prop::option::of(0..max_len + 5), 0..max_len).prop_map(|parents| {
        parents
            .into_iter()
            .enumerate()
            .map(|(i, parent)| {
                let item = Item::folder(i.to_string(), format!("folder {i}"));
                match parent {
                    Some(p) => item.with_parent(p.to_string()),
                    None => item,
                }
            })
            .collect()
    })
}

fn index_of(node: &TreeNode) -> usize {
    node.id().as_str().parse().unwrap()
}

proptest! {
    /// For uniform rows the window is [floor(s/H) - K, ceil((s+v)/H) + K], clamped
    #[test]
    fn prop_range_matches_formula(
        len in 1usize..5000,
        row in 1usize..200,
        viewport in 1usize..2000,
        overscan in 0usize..20,
        scroll_fraction in 0.0f64..=1.0,
    ) {
        let max_scroll = (len * row).saturating_sub(viewport);
        let scroll = (max_scroll as f64 * scroll_fraction).floor() as usize;

        let heights = RowHeights::new(len, row as f64);
        let mut state = ViewportState::new(viewport as f64, row as f64, overscan);
        state.scroll_offset = scroll as f64;
        let range = compute_visible_range(&heights, &state);

        let last = ((scroll + viewport).div_ceil(row) + overscan).min(len - 1);
        let first = (scroll / row).saturating_sub(overscan).min(last);
        prop_assert_eq!(range.indices(), Some(first..=last));
    }

    /// Render cost depends on the viewport, not on the number of rows
    #[test]
    fn prop_window_size_is_bounded(
        len in 0usize..100_000,
        scroll_fraction in 0.0f64..=1.0,
    ) {
        let config = ListConfig::default();
        let mut list: VirtualList = VirtualList::new(&config);
        list.set_len(len);
        list.scroll_to(list.max_scroll_offset() * scroll_fraction);

        let per_viewport = (config.viewport_height / config.estimated_row_height).ceil() as usize;
        prop_assert!(list.visible_range().len() <= per_viewport + 2 * config.overscan + 2);
    }

    /// Scrolling down a list of fixed length reports the end at most once
    #[test]
    fn prop_near_end_fires_once_per_length(
        len in 1usize..2000,
        steps in prop::collection::vec(0.0f64..400.0, 1..60),
    ) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let mut list: VirtualList = VirtualList::new(&ListConfig::default())
            .with_near_end(move |e| sink.lock().unwrap().push(e));
        list.set_len(len);

        for step in steps {
            list.scroll_by(step);
        }
        list.scroll_to(list.max_scroll_offset());

        let events = events.lock().unwrap();
        prop_assert_eq!(events.len(), 1);
        prop_assert_eq!(events[0].len, len);
    }

    /// No item is lost, whatever the parent references look like
    #[test]
    fn prop_build_tree_keeps_every_item(items in arb_items(200)) {
        let roots = build_tree(&items);
        prop_assert_eq!(count_nodes(&roots), items.len());

        let rows = flatten_tree(&roots, |_| true);
        prop_assert_eq!(rows.len(), items.len());
    }

    /// Every edge comes from a parent reference, and siblings keep input order
    #[test]
    fn prop_build_tree_edges_follow_parents(items in arb_items(200)) {
        let roots = build_tree(&items);

        let root_indices: Vec<usize> = roots.iter().map(index_of).collect();
        prop_assert!(root_indices.windows(2).all(|w| w[0] < w[1]));

        let mut stack: Vec<&TreeNode> = roots.iter().collect();
        while let Some(node) = stack.pop() {
            let child_indices: Vec<usize> = node.children.iter().map(index_of).collect();
            prop_assert!(child_indices.windows(2).all(|w| w[0] < w[1]));
            for child in &node.children {
                prop_assert_eq!(child.item.parent_id.as_ref(), Some(node.id()));
            }
            stack.extend(node.children.iter());
        }
    }

    /// Building twice gives the same forest and leaves the input untouched
    #[test]
    fn prop_build_tree_is_idempotent(items in arb_items(100)) {
        let snapshot = items.clone();
        prop_assert_eq!(build_tree(&items), build_tree(&items));
        prop_assert_eq!(items, snapshot);
    }
}
