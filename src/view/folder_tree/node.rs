use crate::model::{Item, ItemId};

/// An item together with its children, in input order
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub item: Item,
    /// Children (empty for leaves)
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Create a leaf node
    pub fn new(item: Item) -> Self {
        Self {
            item,
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> &ItemId {
        &self.item.id
    }

    /// Check if this node has no children
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Check if this node is a folder
    pub fn is_folder(&self) -> bool {
        self.item.is_folder()
    }

    /// Number of nodes in this subtree, including this one
    pub fn subtree_len(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }

    /// Find a node in this subtree
    pub fn find(&self, id: &ItemId) -> Option<&TreeNode> {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if node.id() == id {
                return Some(node);
            }
            stack.extend(node.children.iter().rev());
        }
        None
    }

    /// Ids of all nodes below this one (depth-first, excluding this node)
    pub fn descendant_ids(&self) -> Vec<ItemId> {
        let mut ids = Vec::new();
        let mut stack: Vec<&TreeNode> = self.children.iter().rev().collect();
        while let Some(node) = stack.pop() {
            ids.push(node.id().clone());
            stack.extend(node.children.iter().rev());
        }
        ids
    }
}

/// Find a node among a list of roots
pub fn find_node<'a>(roots: &'a [TreeNode], id: &ItemId) -> Option<&'a TreeNode> {
    roots.iter().find_map(|root| root.find(id))
}

/// Follow child indices from the roots down to a node
pub fn node_at_path<'a>(roots: &'a [TreeNode], path: &[usize]) -> Option<&'a TreeNode> {
    let (first, rest) = path.split_first()?;
    rest.iter()
        .try_fold(roots.get(*first)?, |node, &index| node.children.get(index))
}

/// Total number of nodes in a forest
pub fn count_nodes(roots: &[TreeNode]) -> usize {
    roots.iter().map(TreeNode::subtree_len).sum()
}
