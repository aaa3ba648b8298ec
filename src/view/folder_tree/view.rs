use super::flatten::TreeRow;
use super::node::{find_node, node_at_path, TreeNode};
use crate::config::ListConfig;
use crate::model::ItemId;
use crate::view::virtual_list::{RenderedList, VirtualList};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// A visible row, owned so it survives tree replacement
#[derive(Debug, Clone, PartialEq, Eq)]
struct VisibleNode {
    id: ItemId,
    /// Row of the parent node
    parent: Option<usize>,
    depth: usize,
    expanded: bool,
    /// Child indices from the roots down to the node
    path: Vec<usize>,
}

/// View state for folder tree navigation
///
/// Holds the built tree, which folders are expanded, the selection, and a
/// windowed list over the visible rows so only the rows on screen are
/// rendered.
///
/// Expansion and selection are keyed by item id. If the collection repeats
/// an id, only its first occurrence has children, and selecting the id
/// selects its first visible row.
#[derive(Debug)]
pub struct FolderTreeView {
    /// The built forest
    roots: Arc<Vec<TreeNode>>,
    /// Expanded folders
    expanded: HashSet<ItemId>,
    /// Currently selected node
    selected: Option<ItemId>,
    /// Visible rows in display order
    visible: Vec<VisibleNode>,
    /// First visible row of each id
    positions: HashMap<ItemId, usize>,
    list: VirtualList<ItemId>,
}

impl FolderTreeView {
    /// Create a view over `roots` with every folder collapsed
    pub fn new(roots: Arc<Vec<TreeNode>>, config: &ListConfig) -> Self {
        let mut view = Self {
            roots,
            expanded: HashSet::new(),
            selected: None,
            visible: Vec::new(),
            positions: HashMap::new(),
            list: VirtualList::new(config),
        };
        view.refresh();
        view.selected = view.visible.first().map(|row| row.id.clone());
        view
    }

    /// Replace the tree (e.g. after a refetch)
    ///
    /// Expansion and selection are kept for nodes that still exist; the
    /// scroll position stays anchored to the row at the top.
    pub fn set_roots(&mut self, roots: Arc<Vec<TreeNode>>) {
        if Arc::ptr_eq(&self.roots, &roots) {
            return;
        }
        self.roots = roots;
        let roots = Arc::clone(&self.roots);
        self.expanded.retain(|id| find_node(&roots, id).is_some());
        self.refresh();

        let selection_visible = self
            .selected
            .as_ref()
            .is_some_and(|id| self.position_of(id).is_some());
        if !selection_visible {
            self.selected = self.visible.first().map(|row| row.id.clone());
        }
    }

    pub fn roots(&self) -> &Arc<Vec<TreeNode>> {
        &self.roots
    }

    /// Get the underlying windowed list
    pub fn list(&self) -> &VirtualList<ItemId> {
        &self.list
    }

    pub fn list_mut(&mut self) -> &mut VirtualList<ItemId> {
        &mut self.list
    }

    /// Get currently visible rows with their depths
    pub fn rows(&self) -> Vec<TreeRow<'_>> {
        self.visible
            .iter()
            .filter_map(|entry| self.tree_row(entry))
            .collect()
    }

    /// Get the number of visible rows
    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    pub fn is_expanded(&self, id: &ItemId) -> bool {
        self.expanded.contains(id)
    }

    /// Expand a node that has children; returns whether anything changed
    pub fn expand(&mut self, id: &ItemId) -> bool {
        let has_children = find_node(&self.roots, id).is_some_and(|n| !n.is_leaf());
        if !has_children || !self.expanded.insert(id.clone()) {
            return false;
        }
        self.refresh();
        true
    }

    /// Collapse a node; a selection hidden by the collapse moves to the node
    pub fn collapse(&mut self, id: &ItemId) -> bool {
        if !self.expanded.remove(id) {
            return false;
        }

        let selection_hidden = match (&self.selected, find_node(&self.roots, id)) {
            (Some(selected), Some(node)) => selected != id && node.find(selected).is_some(),
            _ => false,
        };
        if selection_hidden {
            self.selected = Some(id.clone());
        }

        self.refresh();
        true
    }

    pub fn toggle(&mut self, id: &ItemId) -> bool {
        if self.is_expanded(id) {
            self.collapse(id)
        } else {
            self.expand(id)
        }
    }

    /// Expand every node that has children
    pub fn expand_all(&mut self) {
        let mut stack: Vec<&TreeNode> = self.roots.iter().collect();
        while let Some(node) = stack.pop() {
            if !node.is_leaf() {
                self.expanded.insert(node.id().clone());
                stack.extend(node.children.iter());
            }
        }
        self.refresh();
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
        // Keep the selection on its top-level ancestor
        if let Some(selected) = &self.selected {
            self.selected = self
                .roots
                .iter()
                .find(|root| root.find(selected).is_some())
                .map(|root| root.id().clone());
        }
        self.refresh();
    }

    /// Get the currently selected node ID
    pub fn selected(&self) -> Option<&ItemId> {
        self.selected.as_ref()
    }

    /// Get the currently selected node
    pub fn selected_node(&self) -> Option<&TreeNode> {
        self.selected
            .as_ref()
            .and_then(|id| find_node(&self.roots, id))
    }

    /// Select a visible node; returns false if it is not visible
    pub fn set_selected(&mut self, id: &ItemId) -> bool {
        if self.position_of(id).is_none() {
            return false;
        }
        self.selected = Some(id.clone());
        true
    }

    /// Get the index of the selected node in the visible rows
    pub fn selected_index(&self) -> Option<usize> {
        self.selected.as_ref().and_then(|id| self.position_of(id))
    }

    /// Select the next visible node
    pub fn select_next(&mut self) {
        self.select_relative(1);
    }

    /// Select the previous visible node
    pub fn select_prev(&mut self) {
        self.select_relative(-1);
    }

    /// Move selection down by one viewport of rows
    pub fn select_page_down(&mut self) {
        self.select_relative(self.page_rows() as isize);
    }

    /// Move selection up by one viewport of rows
    pub fn select_page_up(&mut self) {
        self.select_relative(-(self.page_rows() as isize));
    }

    /// Select the first visible node
    pub fn select_first(&mut self) {
        if let Some(first) = self.visible.first() {
            self.selected = Some(first.id.clone());
        }
    }

    /// Select the last visible node
    pub fn select_last(&mut self) {
        if let Some(last) = self.visible.last() {
            self.selected = Some(last.id.clone());
        }
    }

    /// Select the parent of the currently selected node
    pub fn select_parent(&mut self) {
        let parent = self
            .selected_index()
            .and_then(|pos| self.visible[pos].parent)
            .map(|row| self.visible[row].id.clone());
        if let Some(parent) = parent {
            self.selected = Some(parent);
        }
    }

    /// Scroll the minimum amount needed to show the selected row
    pub fn ensure_visible(&mut self) {
        if let Some(pos) = self.selected_index() {
            self.list.scroll_to_index(pos);
        }
    }

    /// Render the rows of the current window
    ///
    /// Only rows inside the window are resolved, so the cost follows the
    /// viewport rather than the size of the tree.
    pub fn render<R>(&self, mut row: impl FnMut(&TreeRow<'_>, bool) -> R) -> RenderedList<R> {
        let selected = self.selected.as_ref();
        self.list.render_window(|index| {
            let entry = self.visible.get(index)?;
            let tree_row = self.tree_row(entry)?;
            Some(row(&tree_row, Some(&entry.id) == selected))
        })
    }

    fn select_relative(&mut self, delta: isize) {
        if self.visible.is_empty() {
            return;
        }
        let last = self.visible.len() - 1;
        let pos = match self.selected_index() {
            Some(pos) => pos.saturating_add_signed(delta).min(last),
            None => 0,
        };
        self.selected = Some(self.visible[pos].id.clone());
    }

    fn page_rows(&self) -> usize {
        let viewport = self.list.viewport();
        if viewport.estimated_row_height <= 0.0 {
            return 1;
        }
        ((viewport.viewport_height / viewport.estimated_row_height).floor() as usize).max(1)
    }

    fn position_of(&self, id: &ItemId) -> Option<usize> {
        self.positions.get(id).copied()
    }

    fn tree_row(&self, entry: &VisibleNode) -> Option<TreeRow<'_>> {
        node_at_path(&self.roots, &entry.path).map(|node| TreeRow {
            depth: entry.depth,
            node,
            expanded: entry.expanded,
        })
    }

    /// Recompute the visible rows and hand their keys to the list
    fn refresh(&mut self) {
        let mut visible: Vec<VisibleNode> = Vec::new();
        let mut stack: Vec<(&TreeNode, usize, Option<usize>, Vec<usize>)> = self
            .roots
            .iter()
            .enumerate()
            .rev()
            .map(|(i, node)| (node, 0, None, vec![i]))
            .collect();

        while let Some((node, depth, parent, path)) = stack.pop() {
            let expanded = self.expanded.contains(node.id());
            let row = visible.len();
            if expanded {
                stack.extend(node.children.iter().enumerate().rev().map(|(i, child)| {
                    let mut child_path = path.clone();
                    child_path.push(i);
                    (child, depth + 1, Some(row), child_path)
                }));
            }
            visible.push(VisibleNode {
                id: node.id().clone(),
                parent,
                depth,
                expanded,
                path,
            });
        }

        let mut positions = HashMap::with_capacity(visible.len());
        for (row, entry) in visible.iter().enumerate() {
            positions.entry(entry.id.clone()).or_insert(row);
        }

        self.list.set_keys(visible.iter().map(|row| row.id.clone()));
        self.visible = visible;
        self.positions = positions;
    }
}
