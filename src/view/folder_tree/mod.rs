// Folder tree built from a flat collection of items
//
// The tree is a pure function of the collection: items point at their parent
// by id, and the forest is rebuilt (or served from a cache) whenever the
// collection is replaced. The view flattens the expanded part of the tree
// into rows for windowed rendering.

pub mod build;
pub mod flatten;
pub mod node;
pub mod view;

pub use build::{build_tree, TreeCache};
pub use flatten::{flatten_tree, TreeRow};
pub use node::{count_nodes, find_node, node_at_path, TreeNode};
pub use view::FolderTreeView;
