//! File tree node entities.

pub mod model;
pub mod patch;
pub mod tree;

pub use model::{FOLDER_TYPE, FileNode, NewFileNode};
pub use patch::NodePatch;
pub use tree::FileTreeNode;
