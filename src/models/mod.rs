//! 数据模型层

pub mod decoration;
pub mod tree;

pub use decoration::{Decoration, DecorationSet, DecorationsManager};
pub use tree::{NodeId, NodeKind, TreeCommand, TreeError, TreeModel, TreeViewItem};
