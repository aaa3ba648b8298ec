use super::node::TreeNode;
use crate::model::{Item, ItemId};
use std::collections::HashMap;
use std::sync::Arc;

/// Build a forest from a flat collection of items referencing their parents
///
/// - Items whose parent is missing from the collection become roots (orphans
///   are promoted, never dropped).
/// - Children keep the relative order of the input; nothing is sorted.
/// - Never fails. Parent cycles are broken at their earliest member in input
///   order, which becomes a root; an item naming itself as parent is a root.
/// - With duplicate ids, the first occurrence receives the children.
///
/// Runs in O(n) time and space and never recurses on the input.
pub fn build_tree(items: &[Item]) -> Vec<TreeNode> {
    let n = items.len();

    // Pass 1: index items by id
    let mut index: HashMap<&ItemId, usize> = HashMap::with_capacity(n);
    for (i, item) in items.iter().enumerate() {
        index.entry(&item.id).or_insert(i);
    }

    // Pass 2: resolve each item's parent to a position
    let mut parents: Vec<Option<usize>> = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            item.parent_id
                .as_ref()
                .and_then(|p| index.get(p).copied())
                .filter(|&p| p != i)
        })
        .collect();

    break_cycles(&mut parents);

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut roots = Vec::new();
    for (i, parent) in parents.iter().enumerate() {
        match parent {
            Some(p) => children[*p].push(i),
            None => roots.push(i),
        }
    }

    materialize(items, &roots, &children)
}

/// Detach the earliest member of every parent cycle
fn break_cycles(parents: &mut [Option<usize>]) {
    const UNVISITED: u8 = 0;
    const ON_PATH: u8 = 1;
    const DONE: u8 = 2;

    let mut state = vec![UNVISITED; parents.len()];
    let mut path = Vec::new();

    for start in 0..parents.len() {
        if state[start] != UNVISITED {
            continue;
        }

        path.clear();
        let mut current = Some(start);
        while let Some(node) = current {
            match state[node] {
                UNVISITED => {
                    state[node] = ON_PATH;
                    path.push(node);
                    current = parents[node];
                }
                ON_PATH => {
                    // `node` closes a cycle: everything on the path from it
                    let cycle_start = path.iter().position(|&p| p == node).unwrap_or(0);
                    if let Some(&earliest) = path[cycle_start..].iter().min() {
                        tracing::warn!("Breaking parent cycle at item #{}", earliest);
                        parents[earliest] = None;
                    }
                    break;
                }
                _ => break,
            }
        }

        for &node in &path {
            state[node] = DONE;
        }
    }
}

/// Turn index lists into owned nodes, children before parents
fn materialize(items: &[Item], roots: &[usize], children: &[Vec<usize>]) -> Vec<TreeNode> {
    let mut post_order = Vec::with_capacity(items.len());
    let mut stack: Vec<(usize, bool)> = roots.iter().map(|&r| (r, false)).collect();
    while let Some((node, children_done)) = stack.pop() {
        if children_done {
            post_order.push(node);
        } else {
            stack.push((node, true));
            stack.extend(children[node].iter().map(|&c| (c, false)));
        }
    }

    let mut built: Vec<Option<TreeNode>> = vec![None; items.len()];
    for node in post_order {
        let node_children = children[node]
            .iter()
            .filter_map(|&c| built[c].take())
            .collect();
        built[node] = Some(TreeNode {
            item: items[node].clone(),
            children: node_children,
        });
    }

    roots.iter().filter_map(|&r| built[r].take()).collect()
}

/// Memoizes [`build_tree`] on the identity of the collection
///
/// The tree is a pure function of the flat collection. Collections are
/// replaced wholesale (a new `Arc`) on every refetch, so pointer equality is
/// enough to know whether the cached tree is still current.
#[derive(Debug, Default)]
pub struct TreeCache {
    source: Option<Arc<Vec<Item>>>,
    roots: Arc<Vec<TreeNode>>,
    builds: usize,
}

impl TreeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tree for `items`, rebuilt only when `items` is a different collection
    pub fn get(&mut self, items: &Arc<Vec<Item>>) -> Arc<Vec<TreeNode>> {
        if let Some(source) = &self.source {
            if Arc::ptr_eq(source, items) {
                return Arc::clone(&self.roots);
            }
        }

        self.roots = Arc::new(build_tree(items));
        self.source = Some(Arc::clone(items));
        self.builds += 1;
        Arc::clone(&self.roots)
    }

    /// Number of times the tree was rebuilt
    pub fn build_count(&self) -> usize {
        self.builds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::folder_tree::node::count_nodes;

    fn ids(nodes: &[TreeNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.id().as_str()).collect()
    }

    #[test]
    fn test_empty_collection() {
        assert!(build_tree(&[]).is_empty());
    }

    #[test]
    fn test_one_root_two_children_in_order() {
        let items = vec![
            Item::folder("1", "one"),
            Item::document("2", "two").with_parent("1"),
            Item::document("3", "three").with_parent("1"),
        ];

        let roots = build_tree(&items);

        assert_eq!(ids(&roots), vec!["1"]);
        assert_eq!(ids(&roots[0].children), vec!["2", "3"]);
    }

    #[test]
    fn test_children_before_parent_in_input() {
        let items = vec![
            Item::document("c", "c").with_parent("b"),
            Item::folder("b", "b").with_parent("a"),
            Item::folder("a", "a"),
        ];

        let roots = build_tree(&items);

        assert_eq!(ids(&roots), vec!["a"]);
        assert_eq!(ids(&roots[0].children), vec!["b"]);
        assert_eq!(ids(&roots[0].children[0].children), vec!["c"]);
    }

    #[test]
    fn test_orphans_are_promoted() {
        let items = vec![
            Item::folder("a", "a"),
            Item::document("x", "x").with_parent("gone"),
            Item::document("b", "b").with_parent("a"),
        ];

        let roots = build_tree(&items);

        assert_eq!(ids(&roots), vec!["a", "x"]);
        assert_eq!(count_nodes(&roots), 3);
    }

    #[test]
    fn test_self_parent_is_root() {
        let items = vec![Item::folder("a", "a").with_parent("a")];
        let roots = build_tree(&items);
        assert_eq!(ids(&roots), vec!["a"]);
    }

    #[test]
    fn test_cycle_is_broken_at_earliest_member() {
        let items = vec![
            Item::folder("top", "top"),
            Item::folder("a", "a").with_parent("c"),
            Item::folder("b", "b").with_parent("a"),
            Item::folder("c", "c").with_parent("b"),
            Item::document("d", "d").with_parent("b"),
        ];

        let roots = build_tree(&items);

        assert_eq!(ids(&roots), vec!["top", "a"]);
        assert_eq!(count_nodes(&roots), 5);
        let b = &roots[1].children[0];
        assert_eq!(b.id().as_str(), "b");
        assert_eq!(ids(&b.children), vec!["c", "d"]);
    }

    #[test]
    fn test_duplicate_ids_keep_every_item() {
        let items = vec![
            Item::folder("a", "first"),
            Item::folder("a", "second"),
            Item::document("k", "kid").with_parent("a"),
        ];

        let roots = build_tree(&items);

        assert_eq!(count_nodes(&roots), 3);
        assert_eq!(roots[0].item.name, "first");
        assert_eq!(ids(&roots[0].children), vec!["k"]);
    }

    #[test]
    fn test_idempotent_and_input_untouched() {
        let items = vec![
            Item::folder("r", "r"),
            Item::folder("s", "s").with_parent("r"),
            Item::document("t", "t").with_parent("s"),
        ];
        let snapshot = items.clone();

        assert_eq!(build_tree(&items), build_tree(&items));
        assert_eq!(items, snapshot);
    }

    #[test]
    fn test_deep_chain_does_not_recurse() {
        let mut items = vec![Item::folder("0", "0")];
        for i in 1..2_000 {
            items.push(Item::folder(i.to_string(), i.to_string()).with_parent((i - 1).to_string()));
        }

        let roots = build_tree(&items);

        assert_eq!(roots.len(), 1);
        assert_eq!(count_nodes(&roots), 2_000);
    }

    #[test]
    fn test_tree_cache_rebuilds_only_for_new_collections() {
        let mut cache = TreeCache::new();
        let items = Arc::new(vec![Item::folder("a", "a")]);

        let first = cache.get(&items);
        let second = cache.get(&items);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.build_count(), 1);

        // Equal contents, new collection
        let refetched = Arc::new((*items).clone());
        let third = cache.get(&refetched);
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(*first, *third);
        assert_eq!(cache.build_count(), 2);
    }
}
