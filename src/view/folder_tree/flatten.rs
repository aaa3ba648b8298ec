use super::node::TreeNode;
use crate::model::ItemId;

/// A visible row of a flattened tree
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeRow<'a> {
    /// Zero-based depth (`0` for roots)
    pub depth: usize,
    pub node: &'a TreeNode,
    /// Whether the node's children are shown below it
    pub expanded: bool,
}

impl TreeRow<'_> {
    pub fn id(&self) -> &ItemId {
        self.node.id()
    }

    pub fn has_children(&self) -> bool {
        !self.node.children.is_empty()
    }
}

/// Flatten a forest into depth-first rows, descending only into expanded nodes
///
/// Sibling order is kept as is. The walk uses an explicit stack, so deep
/// trees are fine.
pub fn flatten_tree<'a>(
    roots: &'a [TreeNode],
    is_expanded: impl Fn(&ItemId) -> bool,
) -> Vec<TreeRow<'a>> {
    let mut rows = Vec::new();
    let mut stack: Vec<(&TreeNode, usize)> = roots.iter().rev().map(|n| (n, 0)).collect();

    while let Some((node, depth)) = stack.pop() {
        let expanded = is_expanded(node.id());
        rows.push(TreeRow {
            depth,
            node,
            expanded,
        });
        if expanded {
            stack.extend(node.children.iter().rev().map(|c| (c, depth + 1)));
        }
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Item;
    use crate::view::folder_tree::build_tree;
    use std::collections::HashSet;

    fn forest() -> Vec<TreeNode> {
        build_tree(&[
            Item::folder("a", "a"),
            Item::folder("a1", "a1").with_parent("a"),
            Item::document("a1x", "a1x").with_parent("a1"),
            Item::document("a2", "a2").with_parent("a"),
            Item::folder("b", "b"),
            Item::document("b1", "b1").with_parent("b"),
        ])
    }

    fn ids_and_depths(rows: &[TreeRow<'_>]) -> Vec<(String, usize)> {
        rows.iter().map(|r| (r.id().to_string(), r.depth)).collect()
    }

    #[test]
    fn test_collapsed_forest_shows_roots() {
        let roots = forest();
        let rows = flatten_tree(&roots, |_| false);

        assert_eq!(
            ids_and_depths(&rows),
            vec![("a".to_string(), 0), ("b".to_string(), 0)]
        );
        assert!(rows.iter().all(|r| !r.expanded));
        assert!(rows[0].has_children());
    }

    #[test]
    fn test_expanded_nodes_show_children_in_order() {
        let roots = forest();
        let expanded: HashSet<ItemId> = ["a", "a1"].into_iter().map(ItemId::from).collect();
        let rows = flatten_tree(&roots, |id| expanded.contains(id));

        assert_eq!(
            ids_and_depths(&rows),
            vec![
                ("a".to_string(), 0),
                ("a1".to_string(), 1),
                ("a1x".to_string(), 2),
                ("a2".to_string(), 1),
                ("b".to_string(), 0),
            ]
        );
    }

    #[test]
    fn test_children_of_collapsed_parent_stay_hidden() {
        let roots = forest();
        // a1 is expanded but its parent is not
        let rows = flatten_tree(&roots, |id| id.as_str() == "a1");
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_empty_forest() {
        assert!(flatten_tree(&[], |_| true).is_empty());
    }
}
