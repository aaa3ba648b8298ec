//! View layer
//!
//! Windowed list rendering and the folder tree built on top of it.

pub mod folder_tree;
pub mod virtual_list;
